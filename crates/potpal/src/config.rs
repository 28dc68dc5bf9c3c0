//! Flag-aware configuration resolution: config file + env + CLI overrides.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use potpal_api::{CareGuideClient, CloudClient, GenAiClient, GenAiParams, TransportConfig};
use potpal_config::{Config, Defaults, Profile};
use potpal_core::SessionConfig;
use potpal_local::LocalStore;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// A profile resolved against the config file and CLI overrides.
pub struct Resolved {
    pub profile_name: String,
    pub profile: Profile,
    pub defaults: Defaults,
}

/// The active profile name: `--profile` flag, then the config default.
pub fn active_profile_name(global: &GlobalOpts, cfg: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| cfg.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Load the config file and resolve the active profile, applying CLI
/// overrides. A missing profile resolves to defaults so flag/env-only
/// invocations work without a config file.
pub fn resolve(global: &GlobalOpts) -> Resolved {
    let cfg = potpal_config::load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let mut profile = cfg
        .profiles
        .get(&profile_name)
        .cloned()
        .unwrap_or_default();

    if let Some(ref url) = global.cloud_url {
        profile.cloud_url = url.clone();
    }
    if let Some(ref email) = global.email {
        profile.email = Some(email.clone());
    }
    if global.timeout != 30 {
        profile.timeout = Some(global.timeout);
    }

    Resolved {
        profile_name,
        profile,
        defaults: cfg.defaults,
    }
}

fn transport(resolved: &Resolved, global: &GlobalOpts) -> TransportConfig {
    let secs = resolved
        .profile
        .timeout
        .unwrap_or_else(|| global.timeout.max(1));
    TransportConfig {
        timeout: Duration::from_secs(secs),
    }
}

/// Build the cloud client for the resolved profile.
pub fn cloud_client(resolved: &Resolved, global: &GlobalOpts) -> Result<CloudClient, CliError> {
    let url = potpal_config::cloud_url(&resolved.profile)?;
    Ok(CloudClient::new(url, &transport(resolved, global))?)
}

/// The session tuning for the resolved profile.
pub fn session_config(resolved: &Resolved) -> SessionConfig {
    potpal_config::profile_to_session_config(&resolved.profile, &resolved.defaults)
}

/// Resolve account credentials, honoring the `--email` override.
pub fn credentials(resolved: &Resolved) -> Result<(String, SecretString), CliError> {
    potpal_config::resolve_credentials(&resolved.profile, &resolved.profile_name)
        .map_err(|_| CliError::NoCredentials {
            profile: resolved.profile_name.clone(),
        })
}

/// Build the generative-text client for the resolved profile.
pub fn genai_client(resolved: &Resolved, global: &GlobalOpts) -> Result<GenAiClient, CliError> {
    let key = potpal_config::resolve_genai_key(&resolved.profile, &resolved.profile_name)
        .map_err(|_| CliError::NoGenAiKey {
            profile: resolved.profile_name.clone(),
        })?;

    let url: Url = resolved
        .profile
        .genai_url
        .as_deref()
        .unwrap_or(potpal_config::DEFAULT_GENAI_URL)
        .parse()
        .map_err(|_| CliError::Validation {
            field: "genai_url".into(),
            reason: "invalid URL".into(),
        })?;

    let model = resolved
        .profile
        .genai_model
        .clone()
        .unwrap_or_else(|| potpal_config::DEFAULT_GENAI_MODEL.into());

    Ok(GenAiClient::new(
        url,
        model,
        key,
        GenAiParams::default(),
        &transport(resolved, global),
    )?)
}

/// Build the care-guide client when the profile configures one.
pub fn care_guide_client(
    resolved: &Resolved,
    global: &GlobalOpts,
) -> Result<Option<CareGuideClient>, CliError> {
    let Some(ref raw) = resolved.profile.care_guide_url else {
        return Ok(None);
    };
    let url: Url = raw.parse().map_err(|_| CliError::Validation {
        field: "care_guide_url".into(),
        reason: "invalid URL".into(),
    })?;
    Ok(Some(CareGuideClient::new(url, &transport(resolved, global))?))
}

/// Open the on-device store at the platform data path.
pub async fn local_store() -> Result<LocalStore, CliError> {
    Ok(LocalStore::open(&potpal_config::data_path()).await?)
}
