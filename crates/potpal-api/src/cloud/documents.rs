// Per-user document collection endpoints
//
// CRUD against `/v1/users/{uid}/{collection}`. List responses use the
// `{"documents": [...]}` envelope with each document's store-assigned id
// alongside its payload fields; the envelope is stripped before the caller
// sees it.

use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::cloud::client::CloudClient;
use crate::cloud::{Document, OrderBy};
use crate::error::Error;

// ── Wire types ──────────────────────────────────────────────────────

/// A document as it appears on the wire: id plus flattened payload fields.
#[derive(Deserialize)]
struct RawDocument {
    id: String,
    #[serde(flatten)]
    data: Value,
}

#[derive(Deserialize)]
struct DocumentsEnvelope {
    #[serde(default)]
    documents: Vec<RawDocument>,
}

impl From<RawDocument> for Document {
    fn from(raw: RawDocument) -> Self {
        Self {
            id: raw.id,
            data: raw.data,
        }
    }
}

impl CloudClient {
    /// List a user's collection, optionally with server-side ordering.
    ///
    /// `GET /v1/users/{uid}/{collection}[?orderBy=field dir]`
    pub async fn list_documents(
        &self,
        user_id: &str,
        collection: &str,
        order: Option<&OrderBy>,
    ) -> Result<Vec<Document>, Error> {
        let mut url = self.collection_url(user_id, collection)?;
        if let Some(order) = order {
            url.query_pairs_mut()
                .append_pair("orderBy", &order.query_value());
        }

        debug!(%url, "listing documents");
        let resp = self.authed(self.http().get(url)).send().await?;
        let resp = self.check_status(resp).await?;
        let envelope: DocumentsEnvelope = self.parse_json(resp).await?;
        Ok(envelope.documents.into_iter().map(Document::from).collect())
    }

    /// Create a document; the store assigns the id.
    ///
    /// `POST /v1/users/{uid}/{collection}`
    pub async fn add_document(
        &self,
        user_id: &str,
        collection: &str,
        data: &Value,
    ) -> Result<Document, Error> {
        let url = self.collection_url(user_id, collection)?;
        debug!(%url, "adding document");

        let resp = self.authed(self.http().post(url).json(data)).send().await?;
        let resp = self.check_status(resp).await?;
        let raw: RawDocument = self.parse_json(resp).await?;
        Ok(raw.into())
    }

    /// Merge `patch` into an existing document's fields.
    ///
    /// `PATCH /v1/users/{uid}/{collection}/{id}`
    pub async fn update_document(
        &self,
        user_id: &str,
        collection: &str,
        id: &str,
        patch: &Value,
    ) -> Result<(), Error> {
        let url = self.document_url(user_id, collection, id)?;
        debug!(%url, "updating document");

        let resp = self
            .authed(self.http().patch(url).json(patch))
            .send()
            .await?;
        self.check_status(resp).await?;
        Ok(())
    }

    /// Delete a document.
    ///
    /// `DELETE /v1/users/{uid}/{collection}/{id}`
    pub async fn delete_document(
        &self,
        user_id: &str,
        collection: &str,
        id: &str,
    ) -> Result<(), Error> {
        let url = self.document_url(user_id, collection, id)?;
        debug!(%url, "deleting document");

        let resp = self.authed(self.http().delete(url)).send().await?;
        self.check_status(resp).await?;
        Ok(())
    }

    /// Apply the active session's bearer token to a request builder.
    /// Requests without a session go out unauthenticated and the backend
    /// rejects them with 401, which maps to [`Error::Authentication`].
    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.session() {
            Some(session) => builder.bearer_auth(session.id_token.expose_secret()),
            None => builder,
        }
    }
}
