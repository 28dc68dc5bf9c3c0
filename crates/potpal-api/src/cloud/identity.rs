// Account identity flows
//
// Email/password sign-in, sign-up, sign-out, and account deletion against
// the identity-toolkit-style `/v1/accounts:*` endpoints. A successful
// sign-in stores the bearer token in the client's session cell; document
// requests use it automatically.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::cloud::client::{AccountSession, CloudClient};
use crate::cloud::Account;
use crate::error::Error;

// ── Wire types ──────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    email: String,
    id_token: String,
}

/// Error envelope: `{"error": {"message": "INVALID_PASSWORD", ...}}`.
#[derive(Deserialize)]
struct IdentityErrorEnvelope {
    error: Option<IdentityErrorInner>,
}

#[derive(Deserialize)]
struct IdentityErrorInner {
    message: Option<String>,
}

/// Extract the machine-readable code from an identity error message.
///
/// The backend sometimes appends detail after the code
/// (`"WEAK_PASSWORD : Password should be at least 6 characters"`), so the
/// code is everything up to the first whitespace or colon.
fn error_code(message: &str) -> String {
    message
        .split([' ', ':'])
        .next()
        .unwrap_or(message)
        .to_owned()
}

impl CloudClient {
    /// Sign in with email and password.
    ///
    /// On success the account session (bearer token) is stored in the
    /// client and used for all subsequent document requests.
    pub async fn sign_in(&self, email: &str, password: &SecretString) -> Result<Account, Error> {
        self.identity_request("signInWithPassword", email, password)
            .await
    }

    /// Register a new account. Signs the new account in on success.
    pub async fn sign_up(&self, email: &str, password: &SecretString) -> Result<Account, Error> {
        self.identity_request("signUp", email, password).await
    }

    /// Discard the active account session.
    ///
    /// The cloud uses bearer tokens, so sign-out is a client-side session
    /// discard. Idempotent: signing out without a session is a no-op.
    pub fn sign_out(&self) -> Result<(), Error> {
        if self.clear_session() {
            debug!("account session discarded");
        }
        Ok(())
    }

    /// Permanently delete the signed-in account, then discard the session.
    pub async fn delete_account(&self) -> Result<(), Error> {
        let session = self.session().ok_or(Error::NotSignedIn)?;

        let url = self.accounts_url("delete")?;
        debug!(user = %session.account.user_id, "deleting account");

        let body = json!({ "idToken": session.id_token.expose_secret() });
        let resp = self
            .http()
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(identity_error(status, &body));
        }

        self.clear_session();
        debug!("account deleted");
        Ok(())
    }

    // ── Shared flow ──────────────────────────────────────────────────

    async fn identity_request(
        &self,
        action: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<Account, Error> {
        let url = self.accounts_url(action)?;
        debug!(%url, "identity request");

        let body = json!({
            "email": email,
            "password": password.expose_secret(),
            "returnSecureToken": true,
        });

        let resp = self
            .http()
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;

        if !status.is_success() {
            return Err(identity_error(status, &body));
        }

        let parsed: SignInResponse = serde_json::from_str(&body).map_err(|e| {
            let preview = &body[..body.len().min(200)];
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })?;

        let account = Account {
            user_id: parsed.local_id,
            email: parsed.email,
        };
        self.set_session(AccountSession {
            account: account.clone(),
            id_token: SecretString::from(parsed.id_token),
        });

        debug!(user = %account.user_id, "signed in");
        Ok(account)
    }
}

/// Parse an identity error body into [`Error::Authentication`].
fn identity_error(status: reqwest::StatusCode, body: &str) -> Error {
    if let Ok(envelope) = serde_json::from_str::<IdentityErrorEnvelope>(body) {
        if let Some(inner) = envelope.error {
            if let Some(message) = inner.message {
                let code = error_code(&message);
                return Error::Authentication {
                    message,
                    code: Some(code),
                };
            }
        }
    }

    Error::Authentication {
        message: format!("identity request failed (HTTP {status})"),
        code: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_strips_trailing_detail() {
        assert_eq!(
            error_code("WEAK_PASSWORD : Password should be at least 6 characters"),
            "WEAK_PASSWORD"
        );
    }

    #[test]
    fn error_code_passes_bare_codes_through() {
        assert_eq!(error_code("EMAIL_NOT_FOUND"), "EMAIL_NOT_FOUND");
    }
}
