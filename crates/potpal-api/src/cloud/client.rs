// Cloud HTTP client
//
// Wraps `reqwest::Client` with PotPal-specific URL construction, response
// parsing, and the in-memory account session. Endpoint groups (identity,
// documents) are implemented as inherent methods in sibling modules to keep
// this one focused on transport mechanics.

use std::sync::{Arc, RwLock};

use secrecy::SecretString;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::cloud::Account;
use crate::error::Error;
use crate::transport::TransportConfig;

/// An active session: the signed-in account plus its bearer token.
#[derive(Clone)]
pub(crate) struct AccountSession {
    pub(crate) account: Account,
    pub(crate) id_token: SecretString,
}

/// Client for the PotPal cloud (identity + document store).
///
/// Cheaply cloneable: all clones share one HTTP connection pool and one
/// account session, so signing in through any clone signs in all of them.
/// The session cell is interior state (like a cookie jar) -- every document
/// request reads the current bearer token from it.
#[derive(Clone)]
pub struct CloudClient {
    inner: Arc<ClientInner>,
}

pub(crate) struct ClientInner {
    http: reqwest::Client,
    base_url: Url,
    session: RwLock<Option<AccountSession>>,
}

impl CloudClient {
    /// Create a new cloud client from a `TransportConfig`. Does NOT
    /// authenticate -- call [`sign_in`](Self::sign_in) first.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url))
    }

    /// Create a cloud client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                session: RwLock::new(None),
            }),
        }
    }

    /// The cloud base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    // ── Session cell ─────────────────────────────────────────────────

    pub(crate) fn set_session(&self, session: AccountSession) {
        debug!(user = %session.account.user_id, "storing account session");
        *self.inner.session.write().expect("session lock poisoned") = Some(session);
    }

    pub(crate) fn clear_session(&self) -> bool {
        self.inner
            .session
            .write()
            .expect("session lock poisoned")
            .take()
            .is_some()
    }

    pub(crate) fn session(&self) -> Option<AccountSession> {
        self.inner
            .session
            .read()
            .expect("session lock poisoned")
            .clone()
    }

    /// The currently signed-in account, if any.
    pub fn current_account(&self) -> Option<Account> {
        self.session().map(|s| s.account)
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// `{base}/v1/accounts:{action}`
    pub(crate) fn accounts_url(&self, action: &str) -> Result<Url, Error> {
        let base = self.inner.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/v1/accounts:{action}"))?)
    }

    /// `{base}/v1/users/{uid}/{collection}`
    pub(crate) fn collection_url(&self, user_id: &str, collection: &str) -> Result<Url, Error> {
        let base = self.inner.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/v1/users/{user_id}/{collection}"))?)
    }

    /// `{base}/v1/users/{uid}/{collection}/{id}`
    pub(crate) fn document_url(
        &self,
        user_id: &str,
        collection: &str,
        id: &str,
    ) -> Result<Url, Error> {
        let base = self.inner.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!(
            "{base}/v1/users/{user_id}/{collection}/{id}"
        ))?)
    }

    // ── Response handling ────────────────────────────────────────────

    /// Map a non-success document-API response to an [`Error`], or return
    /// the response untouched.
    pub(crate) async fn check_status(
        &self,
        resp: reqwest::Response,
    ) -> Result<reqwest::Response, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: "session expired or token rejected".into(),
                code: None,
            });
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = resp
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(Error::RateLimited { retry_after_secs });
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api {
                message: format!("HTTP {status}: {}", &body[..body.len().min(200)]),
                status: Some(status.as_u16()),
            });
        }

        Ok(resp)
    }

    /// Read a successful response body as JSON, preserving the raw body in
    /// the error on parse failure.
    pub(crate) async fn parse_json<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let body = resp.text().await.map_err(Error::Transport)?;
        serde_json::from_str(&body).map_err(|e| {
            let preview = &body[..body.len().min(200)];
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })
    }
}
