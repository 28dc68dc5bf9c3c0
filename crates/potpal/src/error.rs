//! CLI error types with miette diagnostics.
//!
//! Maps core error taxonomies into user-facing errors with actionable
//! help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use potpal_core::{AuthError, ChatError, DeviceError, SyncError};
use potpal_local::LocalStoreError;

/// Exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const DEVICE: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Configuration ────────────────────────────────────────────────
    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(potpal::no_credentials),
        help(
            "Set an email with `potpal login <email>` (the password goes to the system \
             keyring), or export POTPAL_EMAIL and POTPAL_PASSWORD."
        )
    )]
    NoCredentials { profile: String },

    #[error("No generative-backend API key configured for profile '{profile}'")]
    #[diagnostic(
        code(potpal::no_genai_key),
        help("Export POTPAL_GENAI_KEY, or set genai_key_env in your profile.")
    )]
    NoGenAiKey { profile: String },

    #[error("Invalid {field}: {reason}")]
    #[diagnostic(code(potpal::validation))]
    Validation { field: String, reason: String },

    #[error(transparent)]
    #[diagnostic(code(potpal::config))]
    Config(#[from] potpal_config::ConfigError),

    // ── Cloud session ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(potpal::auth),
        help("Check the email and password for this profile, then retry `potpal login`.")
    )]
    Auth(#[from] AuthError),

    #[error(transparent)]
    #[diagnostic(code(potpal::sync))]
    Sync(#[from] SyncError),

    #[error(transparent)]
    #[diagnostic(code(potpal::api))]
    Api(#[from] potpal_api::Error),

    // ── Device ───────────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(potpal::device))]
    Device(#[from] DeviceError),

    #[error("Timed out waiting for {what}")]
    #[diagnostic(code(potpal::timeout))]
    Timeout { what: String },

    // ── Chat ─────────────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(potpal::chat))]
    Chat(#[from] ChatError),

    // ── Local store ──────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(potpal::local))]
    Local(#[from] LocalStoreError),

    // ── Lookup ───────────────────────────────────────────────────────
    #[error("{what} not found: {id}")]
    #[diagnostic(code(potpal::not_found))]
    NotFound { what: String, id: String },

    #[error("Cancelled")]
    #[diagnostic(code(potpal::cancelled))]
    Cancelled,

    #[error("IO error: {0}")]
    #[diagnostic(code(potpal::io))]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// The process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Auth(_) | Self::NoCredentials { .. } | Self::NoGenAiKey { .. } => {
                exit_code::AUTH
            }
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Device(_) => exit_code::DEVICE,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Api(e) if e.is_transient() => exit_code::CONNECTION,
            Self::Sync(SyncError::Store(e)) if e.is_transient() => exit_code::CONNECTION,
            _ => exit_code::GENERAL,
        }
    }
}
