use super::config;
use super::models::{CandleResponse, OptionChainResponse, StrikeData};
use super::window::Candle;
use crate::error::FetchError;
use crate::utility::timing::Timer;
use anyhow::{Context, Result};
use reqwest::{Client, header};
use std::time::Duration;
use tracing::debug;

// -----------------------------------------------
// CLIENT WRAPPER
// -----------------------------------------------
pub struct UpstoxClient {
    client: Client,
    base_url: String,
}

impl UpstoxClient {
    /// Client for `base_url` with the default request timeout
    pub fn with_base_url(access_token: &str, base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(access_token, base_url, config::HTTP_TIMEOUT)
    }

    /// Every request is abandoned with `FetchError::Request` once `timeout` elapses
    pub fn with_timeout(
        access_token: &str,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            client: build_client(access_token, timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// GET a URL and return the body if it looks like JSON
    async fn fetch_json(&self, url: &str, query: &[(&str, &str)]) -> Result<String, FetchError> {
        let res = self.client.get(url).query(query).send().await?;
        let status = res.status();

        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            let preview: String = body.chars().take(200).collect();
            return Err(FetchError::Status { status, preview });
        }

        let text = res.text().await?;
        let trimmed = text.trim();
        if !trimmed.starts_with('{') && !trimmed.starts_with('[') {
            let preview: String = text.chars().take(200).collect();
            return Err(FetchError::NonJson(preview));
        }

        Ok(text)
    }

    fn check_status(status: Option<&str>) -> Result<(), FetchError> {
        match status {
            None | Some("success") => Ok(()),
            Some(other) => Err(FetchError::Api(other.to_string())),
        }
    }

    // -----------------------------------------------
    // OPTION CHAIN SNAPSHOT
    // -----------------------------------------------
    pub async fn fetch_option_chain(
        &self,
        instrument_key: &str,
        expiry: &str,
    ) -> Result<Vec<StrikeData>, FetchError> {
        let timer = Timer::start_with_threshold("option_chain", config::SLOW_REQUEST_THRESHOLD_MS);

        let url = config::option_chain_url(&self.base_url);
        let text = self
            .fetch_json(&url, &[("instrument_key", instrument_key), ("expiry_date", expiry)])
            .await?;
        let parsed: OptionChainResponse = serde_json::from_str(&text)?;
        Self::check_status(parsed.status.as_deref())?;

        timer.stop();
        debug!(strikes = parsed.data.len(), "Option chain fetched");
        Ok(parsed.data)
    }

    // -----------------------------------------------
    // INTRADAY 1-MINUTE CANDLES
    // -----------------------------------------------
    pub async fn fetch_intraday_candles(&self, instrument_key: &str) -> Result<Vec<Candle>, FetchError> {
        let url = config::intraday_candle_url(&self.base_url, instrument_key);
        let text = self.fetch_json(&url, &[]).await?;
        let parsed: CandleResponse = serde_json::from_str(&text)?;
        Self::check_status(parsed.status.as_deref())?;

        let rows = parsed.data.map(|d| d.candles).unwrap_or_default();
        let candles: Vec<Candle> = rows.iter().filter_map(Candle::from_row).collect();

        if candles.len() < rows.len() {
            debug!(
                instrument = instrument_key,
                skipped = rows.len() - candles.len(),
                "Skipped malformed candle rows"
            );
        }
        Ok(candles)
    }
}

// -----------------------------------------------
// HTTP CLIENT BUILDER
// -----------------------------------------------
fn build_client(access_token: &str, timeout: Duration) -> Result<Client> {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        header::HeaderValue::from_static(config::HEADER_ACCEPT_JSON),
    );

    let mut auth = header::HeaderValue::from_str(&format!("Bearer {}", access_token))
        .context("Access token contains invalid header characters")?;
    auth.set_sensitive(true);
    headers.insert(header::AUTHORIZATION, auth);

    Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")
}
