use async_trait::async_trait;
use channel_loop::{LiveSourceProbe, ProbeError, ReferenceId};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// HTTP implementation of the live source probe. Queries
/// `{base}/live/{source}`; a 200 carries `{"referenceId": "..."}` (or null),
/// a 404 means "not live", anything else is a probe failure. Every request
/// is bounded by the client-level timeout so a dead upstream cannot stall a
/// poll cycle past it.
pub struct HttpProbe {
	client: reqwest::Client,
	base_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProbeResponse {
	reference_id: Option<ReferenceId>,
}

impl HttpProbe {
	pub fn new(base_url: impl Into<String>, timeout: Duration) -> crate::error::Result<Self> {
		let client = reqwest::Client::builder().timeout(timeout).build()?;
		Ok(Self {
			client,
			base_url: base_url.into(),
		})
	}
}

#[async_trait]
impl LiveSourceProbe for HttpProbe {
	async fn probe(&self, source_name: &str) -> std::result::Result<Option<ReferenceId>, ProbeError> {
		let url = format!("{}/live/{}", self.base_url, source_name);
		debug!(source = source_name, %url, "probing live source");

		let response = self.client.get(&url).send().await.map_err(|e| ProbeError::new(source_name, e.to_string()))?;

		if response.status() == StatusCode::NOT_FOUND {
			return Ok(None);
		}

		let response = response.error_for_status().map_err(|e| ProbeError::new(source_name, e.to_string()))?;
		let body: ProbeResponse = response.json().await.map_err(|e| ProbeError::new(source_name, e.to_string()))?;

		Ok(body.reference_id)
	}
}
