//! Shared configuration for the PotPal CLI.
//!
//! TOML profiles, credential resolution (keyring + env + plaintext), and
//! translation to `potpal_core::SessionConfig`. The CLI adds flag-aware
//! wrappers on top.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use potpal_core::SessionConfig;

/// Default cloud endpoint baked into fresh profiles.
pub const DEFAULT_CLOUD_URL: &str = "https://cloud.potpal.app";

/// Default generative-text backend and model.
pub const DEFAULT_GENAI_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GENAI_MODEL: &str = "gemini-1.5-pro";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("no generative-backend API key configured for profile '{profile}'")]
    NoGenAiKey { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named account profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Listener poll interval in seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            poll_interval: default_poll_interval(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_poll_interval() -> u64 {
    10
}

/// A named account profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Cloud base URL.
    #[serde(default = "default_cloud_url")]
    pub cloud_url: String,

    /// Care-guide lookup service URL, when one is deployed.
    pub care_guide_url: Option<String>,

    /// Generative-text backend URL (defaults to the hosted backend).
    pub genai_url: Option<String>,

    /// Generative model name.
    pub genai_model: Option<String>,

    /// Environment variable holding the generative-backend API key.
    pub genai_key_env: Option<String>,

    /// Account email.
    pub email: Option<String>,

    /// Account password (plaintext -- prefer keyring or env).
    pub password: Option<String>,

    /// Override request timeout (seconds).
    pub timeout: Option<u64>,

    /// Override listener poll interval (seconds).
    pub poll_interval: Option<u64>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            cloud_url: default_cloud_url(),
            care_guide_url: None,
            genai_url: None,
            genai_model: None,
            genai_key_env: None,
            email: None,
            password: None,
            timeout: None,
            poll_interval: None,
        }
    }
}

fn default_cloud_url() -> String {
    DEFAULT_CLOUD_URL.into()
}

// ── Paths ───────────────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "potpal", "potpal").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Resolve the on-device database path.
pub fn data_path() -> PathBuf {
    ProjectDirs::from("com", "potpal", "potpal").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("potpal.db");
            p
        },
        |dirs| dirs.data_dir().join("potpal.db"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("potpal");
    p
}

// ── Config loading / saving ─────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    let path = config_path();

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("POTPAL_").split("_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the account email + password for a profile.
///
/// Password chain: `POTPAL_PASSWORD` env var, then the system keyring,
/// then plaintext in the config file.
pub fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<(String, SecretString), ConfigError> {
    let email = profile
        .email
        .clone()
        .or_else(|| std::env::var("POTPAL_EMAIL").ok())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })?;

    // 1. Env var
    if let Ok(pw) = std::env::var("POTPAL_PASSWORD") {
        return Ok((email, SecretString::from(pw)));
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new("potpal", &format!("{profile_name}/password")) {
        if let Ok(pw) = entry.get_password() {
            return Ok((email, SecretString::from(pw)));
        }
    }

    // 3. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok((email, SecretString::from(pw.clone())));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Store a password in the system keyring for a profile.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new("potpal", &format!("{profile_name}/password")).map_err(
        |e| ConfigError::Validation {
            field: "keyring".into(),
            reason: e.to_string(),
        },
    )?;
    entry
        .set_password(password)
        .map_err(|e| ConfigError::Validation {
            field: "keyring".into(),
            reason: e.to_string(),
        })
}

/// Resolve the generative-backend API key for a profile.
///
/// Chain: the env var named by `genai_key_env`, then `POTPAL_GENAI_KEY`,
/// then the system keyring.
pub fn resolve_genai_key(
    profile: &Profile,
    profile_name: &str,
) -> Result<SecretString, ConfigError> {
    if let Some(ref env_name) = profile.genai_key_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    if let Ok(val) = std::env::var("POTPAL_GENAI_KEY") {
        return Ok(SecretString::from(val));
    }

    if let Ok(entry) = keyring::Entry::new("potpal", &format!("{profile_name}/genai-key")) {
        if let Ok(key) = entry.get_password() {
            return Ok(SecretString::from(key));
        }
    }

    Err(ConfigError::NoGenAiKey {
        profile: profile_name.into(),
    })
}

// ── Translation to core config ──────────────────────────────────────

/// Build a `SessionConfig` from a profile and the global defaults.
pub fn profile_to_session_config(profile: &Profile, defaults: &Defaults) -> SessionConfig {
    SessionConfig {
        poll_interval: Duration::from_secs(profile.poll_interval.unwrap_or(defaults.poll_interval)),
    }
}

/// Validate a profile's cloud URL, returning it parsed.
pub fn cloud_url(profile: &Profile) -> Result<url::Url, ConfigError> {
    profile
        .cloud_url
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "cloud_url".into(),
            reason: format!("invalid URL: {}", profile.cloud_url),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_points_at_hosted_cloud() {
        let profile = Profile::default();
        assert_eq!(profile.cloud_url, DEFAULT_CLOUD_URL);
        assert!(cloud_url(&profile).is_ok());
    }

    #[test]
    fn invalid_cloud_url_is_rejected() {
        let profile = Profile {
            cloud_url: "not a url".into(),
            ..Profile::default()
        };
        assert!(matches!(
            cloud_url(&profile),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn session_config_prefers_profile_overrides() {
        let defaults = Defaults::default();
        let mut profile = Profile::default();

        let cfg = profile_to_session_config(&profile, &defaults);
        assert_eq!(cfg.poll_interval, Duration::from_secs(defaults.poll_interval));

        profile.poll_interval = Some(3);
        let cfg = profile_to_session_config(&profile, &defaults);
        assert_eq!(cfg.poll_interval, Duration::from_secs(3));
    }

    #[test]
    fn config_round_trips_through_toml() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "home".into(),
            Profile {
                email: Some("gardener@example.com".into()),
                ..Profile::default()
            },
        );

        let text = toml::to_string_pretty(&cfg).expect("serializes");
        let back: Config = toml::from_str(&text).expect("parses");
        assert_eq!(back.profiles["home"].email.as_deref(), Some("gardener@example.com"));
    }
}
