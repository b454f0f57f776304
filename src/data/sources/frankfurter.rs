//! Frankfurter (frankfurter.app) time-series source
//!
//! Free ECB reference rates, no API key required.

use super::{FetchRequest, RateSource};
use crate::data::payload::RawRatePayload;
use crate::error::{FxError, Result};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

const FRANKFURTER_BASE_URL: &str = "https://api.frankfurter.app";

/// Frankfurter rate source
pub struct FrankfurterSource {
    base_url: String,
    client: Client,
}

impl FrankfurterSource {
    /// Create a source against the public endpoint
    pub fn new() -> Result<Self> {
        Self::with_base_url(FRANKFURTER_BASE_URL)
    }

    /// Create a source against another endpoint (mirrors, tests)
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| FxError::FetchError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// `{base_url}/{start}..{end}?from=BASE[&to=A,B]`
    pub fn timeseries_url(&self, request: &FetchRequest) -> String {
        let mut url = format!(
            "{}/{}..{}?from={}",
            self.base_url,
            request.start.format("%Y-%m-%d"),
            request.end.format("%Y-%m-%d"),
            request.base
        );
        if !request.symbols.is_empty() {
            let to: Vec<&str> = request.symbols.iter().map(|s| s.as_str()).collect();
            url.push_str("&to=");
            url.push_str(&to.join(","));
        }
        url
    }
}

impl RateSource for FrankfurterSource {
    async fn fetch_timeseries(&self, request: &FetchRequest) -> Result<RawRatePayload> {
        let url = self.timeseries_url(request);
        log::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FxError::FetchError(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(FxError::FetchError(format!(
                "Frankfurter returned error: {}",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| FxError::FetchError(format!("JSON parse error: {}", e)))?;

        let mut payload = RawRatePayload::from_value(body);
        payload.base = Some(request.base.to_string());
        log::debug!("Frankfurter returned {} dates", payload.date_count());
        Ok(payload)
    }

    fn name(&self) -> &str {
        "frankfurter"
    }
}
