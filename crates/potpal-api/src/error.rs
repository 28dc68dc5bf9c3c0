use thiserror::Error;

/// Top-level error type for the `potpal-api` crate.
///
/// Covers every failure mode across the cloud, care-guide, and
/// generative-text surfaces. `potpal-core` maps these into its
/// user-facing taxonomies (`AuthError`, `SyncError`, `ChatError`).
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Sign-in / sign-up rejected, or a bearer token was refused.
    ///
    /// `code` carries the backend's machine-readable error code when one
    /// was present (e.g. `INVALID_PASSWORD`, `EMAIL_NOT_FOUND`).
    #[error("Authentication failed: {message}")]
    Authentication {
        message: String,
        code: Option<String>,
    },

    /// An operation that requires an active account session was called
    /// without one.
    #[error("Not signed in")]
    NotSignedIn,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    // ── Backend ─────────────────────────────────────────────────────
    /// Rate limited by the backend.
    #[error("Rate limited by the backend")]
    RateLimited { retry_after_secs: Option<u64> },

    /// Non-success response from a backend endpoint.
    #[error("API error: {message}")]
    Api {
        message: String,
        status: Option<u16>,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::RateLimited { .. } => true,
            Self::Api { status, .. } => matches!(status, Some(s) if *s >= 500),
            _ => false,
        }
    }

    /// The backend's machine-readable auth error code, if present.
    pub fn auth_code(&self) -> Option<&str> {
        match self {
            Self::Authentication { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Returns `true` if this error indicates missing or rejected credentials.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::NotSignedIn)
    }
}
