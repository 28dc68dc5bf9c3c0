// Plant care-guide lookup client
//
// One endpoint: `POST /plantinfo` with `{"plant": name}`, returning a
// care sheet. Used to prefill watering/sunlight/care fields when a plant
// is added by name.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Care sheet for a single plant, as returned by the lookup service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareGuide {
    pub plant: String,
    pub sun: String,
    pub water: String,
    pub soil: String,
    #[serde(default)]
    pub harvest: String,
    #[serde(default)]
    pub extra_care: String,
}

/// Client for the care-guide lookup service.
pub struct CareGuideClient {
    http: reqwest::Client,
    base_url: Url,
}

impl CareGuideClient {
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
            base_url,
        })
    }

    /// Look up the care sheet for a plant by name.
    pub async fn plant_info(&self, plant: &str) -> Result<CareGuide, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let url = Url::parse(&format!("{base}/plantinfo"))?;
        debug!(plant, "looking up care guide");

        let resp = self
            .http
            .post(url)
            .json(&json!({ "plant": plant }))
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api {
                message: format!("care-guide lookup failed (HTTP {status}): {body}"),
                status: Some(status.as_u16()),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }
}
