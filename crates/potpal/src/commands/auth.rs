//! Login, registration, and account deletion.

use secrecy::SecretString;
use tracing::warn;

use potpal_core::{SessionConfig, SyncSession};

use crate::cli::{AccountCommand, GlobalOpts, LoginArgs, RegisterArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

/// Verify credentials against the cloud and remember them for the profile:
/// the email goes to the config file, the password to the system keyring.
pub async fn login(args: LoginArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let resolved = config::resolve(global);
    let email = requested_email(args.email, global, &resolved)?;
    let password = prompt_password()?;

    let client = config::cloud_client(&resolved, global)?;
    let session = SyncSession::new(client, SessionConfig::default());
    session.login(&email, &password).await?;
    session.logout().await.ok();

    remember_credentials(&resolved.profile_name, &email, &password);
    output::ok_line(
        output::should_color(global.color),
        &format!("Signed in as {email}"),
    );
    Ok(())
}

/// Create a new account, then remember the credentials like `login`.
pub async fn register(args: RegisterArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let resolved = config::resolve(global);
    let email = requested_email(args.email, global, &resolved)?;
    let password = prompt_password()?;

    let client = config::cloud_client(&resolved, global)?;
    let session = SyncSession::new(client, SessionConfig::default());
    session.register(&email, &password).await?;
    session.logout().await.ok();

    remember_credentials(&resolved.profile_name, &email, &password);
    output::ok_line(
        output::should_color(global.color),
        &format!("Account created for {email}"),
    );
    Ok(())
}

pub async fn account(cmd: AccountCommand, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        AccountCommand::Delete { yes } => {
            if !yes {
                let confirmed = dialoguer::Confirm::new()
                    .with_prompt("Permanently delete this account and all its cloud data?")
                    .default(false)
                    .interact()
                    .map_err(|e| CliError::Validation {
                        field: "prompt".into(),
                        reason: e.to_string(),
                    })?;
                if !confirmed {
                    return Err(CliError::Cancelled);
                }
            }

            super::with_session(global, |session| async move {
                session.delete_account().await?;
                Ok(())
            })
            .await?;

            output::ok_line(output::should_color(global.color), "Account deleted");
            Ok(())
        }
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

fn requested_email(
    arg: Option<String>,
    global: &GlobalOpts,
    resolved: &config::Resolved,
) -> Result<String, CliError> {
    arg.or_else(|| global.email.clone())
        .or_else(|| resolved.profile.email.clone())
        .ok_or_else(|| CliError::NoCredentials {
            profile: resolved.profile_name.clone(),
        })
}

fn prompt_password() -> Result<SecretString, CliError> {
    if let Ok(pw) = std::env::var("POTPAL_PASSWORD") {
        return Ok(SecretString::from(pw));
    }
    let pw = rpassword::prompt_password("Password: ")?;
    Ok(SecretString::from(pw))
}

/// Persist verified credentials. Keyring failures are non-fatal: the user
/// can still export POTPAL_PASSWORD.
fn remember_credentials(profile_name: &str, email: &str, password: &SecretString) {
    use secrecy::ExposeSecret;

    let mut cfg = potpal_config::load_config_or_default();
    let profile = cfg.profiles.entry(profile_name.to_owned()).or_default();
    profile.email = Some(email.to_owned());

    if let Err(e) = potpal_config::save_config(&cfg) {
        warn!(error = %e, "could not save config file");
    }
    if let Err(e) = potpal_config::store_password(profile_name, password.expose_secret()) {
        warn!(error = %e, "could not store password in the keyring");
    }
}
