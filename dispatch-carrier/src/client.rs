use std::time::Duration;

use serde::Serialize;

use crate::error::CarrierError;

/// Connection settings for the carrier API.
#[derive(Debug, Clone)]
pub struct CarrierConfig {
    pub base_url: String,
    pub token: String,
    /// Fixed deadline per individual call, not across a retry sequence.
    pub timeout_ms: u64,
}

/// HTTP client for the carrier API. Constructed once with its base URL and
/// bearer token and passed into the gateway; no ambient singleton.
#[derive(Clone)]
pub struct CarrierClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl CarrierClient {
    pub fn new(config: &CarrierConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    /// POST a JSON body and decode the JSON response. Transport problems and
    /// undecodable bodies surface as `Transport`; non-2xx responses surface
    /// as `Status` with the raw payload attached when one was sent.
    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<serde_json::Value, CarrierError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let body = response.json::<serde_json::Value>().await.ok();
            Err(CarrierError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}
