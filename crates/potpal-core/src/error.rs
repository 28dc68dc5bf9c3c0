// ── Core error taxonomies ──
//
// User-facing errors, one taxonomy per concern. These are NOT
// transport-specific -- consumers never see HTTP status codes or JSON
// parse failures directly. The `From<potpal_api::Error>` impls translate
// transport-layer errors into domain-appropriate variants.

use thiserror::Error;

use crate::device::AdapterState;
use crate::model::PotId;

// ── Authentication ──────────────────────────────────────────────────

/// Sign-in / registration failures, mapped from the backend's error codes.
///
/// Display strings are the user-visible messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Please enter a valid email address.")]
    InvalidFormat,

    #[error("Incorrect password. Please try again.")]
    WrongSecret,

    #[error("No user found with this email.")]
    UnknownIdentifier,

    #[error("This email address is already in use.")]
    AlreadyInUse,

    #[error("The password is too weak. It must be at least 6 characters long.")]
    WeakSecret,

    #[error("An internal error occurred: {0}")]
    Other(String),
}

impl From<potpal_api::Error> for AuthError {
    fn from(err: potpal_api::Error) -> Self {
        match err.auth_code() {
            Some("INVALID_EMAIL") => Self::InvalidFormat,
            Some("INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS") => Self::WrongSecret,
            Some("EMAIL_NOT_FOUND") => Self::UnknownIdentifier,
            Some("EMAIL_EXISTS") => Self::AlreadyInUse,
            Some("WEAK_PASSWORD") => Self::WeakSecret,
            _ => Self::Other(err.to_string()),
        }
    }
}

// ── Synchronization ─────────────────────────────────────────────────

/// Errors from the session's CRUD passthrough and live mirrors.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The operation requires a signed-in session.
    #[error("Not signed in")]
    NotSignedIn,

    /// A required field failed local validation; nothing was sent.
    #[error("Validation failed: {field} {reason}")]
    Validation {
        field: &'static str,
        reason: &'static str,
    },

    /// A snapshot delivery failed. Transient: the previous snapshot stays
    /// cached and the subscription keeps running.
    #[error("Snapshot delivery failed: {0}")]
    ListenerFailure(String),

    /// The cloud store rejected a CRUD call. No local state was touched,
    /// so there is nothing to roll back.
    #[error("Cloud store error: {0}")]
    Store(#[from] potpal_api::Error),
}

// ── Device link ─────────────────────────────────────────────────────

/// Failures from the smart-pot link (radio and simulated Wi-Fi paths).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    /// The radio adapter is not powered on.
    #[error("Radio adapter unavailable (state: {0})")]
    AdapterUnavailable(AdapterState),

    /// A connection is already active or pending; disconnect first.
    #[error("Already connected to pot {0}")]
    AlreadyConnected(PotId),

    /// The operation requires an active connection.
    #[error("No pot connected")]
    NotConnected,

    /// The pot refused or dropped the connection attempt.
    #[error("Connection failed: {reason}")]
    ConnectFailed { reason: String },

    /// Radio permissions were denied by the platform.
    #[error("Radio access unauthorized")]
    Unauthorized,

    /// The platform has no usable radio.
    #[error("Radio unsupported on this device")]
    Unsupported,

    /// The Wi-Fi channel address failed validation.
    #[error("Invalid pot address: {reason}")]
    InvalidAddress { reason: &'static str },
}

// ── Chat ────────────────────────────────────────────────────────────

/// Failures from the generative-text relay.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("The helper backend is unavailable: {0}")]
    BackendUnavailable(String),

    #[error("The helper backend quota is exhausted -- try again later")]
    QuotaExceeded,

    #[error("The helper backend rejected the API key")]
    AuthFailed,

    #[error("Helper error: {0}")]
    Unknown(String),
}

impl From<potpal_api::Error> for ChatError {
    fn from(err: potpal_api::Error) -> Self {
        match &err {
            potpal_api::Error::RateLimited { .. } => Self::QuotaExceeded,
            potpal_api::Error::Authentication { .. } | potpal_api::Error::NotSignedIn => {
                Self::AuthFailed
            }
            _ if err.is_transient() => Self::BackendUnavailable(err.to_string()),
            _ => Self::Unknown(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth_err(code: &str) -> potpal_api::Error {
        potpal_api::Error::Authentication {
            message: code.to_owned(),
            code: Some(code.to_owned()),
        }
    }

    #[test]
    fn auth_codes_map_to_variants() {
        assert_eq!(AuthError::from(auth_err("INVALID_PASSWORD")), AuthError::WrongSecret);
        assert_eq!(AuthError::from(auth_err("EMAIL_NOT_FOUND")), AuthError::UnknownIdentifier);
        assert_eq!(AuthError::from(auth_err("EMAIL_EXISTS")), AuthError::AlreadyInUse);
        assert_eq!(AuthError::from(auth_err("WEAK_PASSWORD")), AuthError::WeakSecret);
        assert_eq!(AuthError::from(auth_err("INVALID_EMAIL")), AuthError::InvalidFormat);
    }

    #[test]
    fn unknown_auth_code_falls_back_to_other() {
        let err = AuthError::from(auth_err("USER_DISABLED"));
        assert!(matches!(err, AuthError::Other(_)));
    }

    #[test]
    fn chat_errors_map_by_kind() {
        let quota = potpal_api::Error::RateLimited {
            retry_after_secs: None,
        };
        assert_eq!(ChatError::from(quota), ChatError::QuotaExceeded);

        let key = potpal_api::Error::Authentication {
            message: "bad key".into(),
            code: None,
        };
        assert_eq!(ChatError::from(key), ChatError::AuthFailed);
    }
}
