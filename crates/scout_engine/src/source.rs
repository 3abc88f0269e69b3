use std::time::Duration;

use futures_util::StreamExt;
use scout_logging::{scout_debug, scout_info};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{SourceError, SourceFailure};

pub const DEFAULT_FIRECRAWL_ENDPOINT: &str = "https://api.firecrawl.dev/v1/scrape";
pub const DEFAULT_LISTING_URL: &str = "https://replit.com/bounties";

const EXTRACTION_PROMPT: &str = "Extract an array called bounties with objects containing \
title, reward, link, and posted_time (ISO8601 or RFC3339 format) from the replit.com bounties page. \
The posted_time should be the actual posting date/time of the bounty.";

#[derive(Debug, Clone)]
pub struct SourceSettings {
    pub endpoint: String,
    pub api_key: String,
    pub listing_url: String,
    pub prompt: String,
    /// Render delay requested from the scrape service.
    pub wait_for: Duration,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl SourceSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_FIRECRAWL_ENDPOINT.to_string(),
            api_key: api_key.into(),
            listing_url: DEFAULT_LISTING_URL.to_string(),
            prompt: EXTRACTION_PROMPT.to_string(),
            wait_for: Duration::from_millis(2000),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
            max_bytes: 5 * 1024 * 1024,
        }
    }
}

/// Supplies the raw, untyped listings of one fetch.
#[async_trait::async_trait]
pub trait SourceProvider: Send + Sync {
    async fn fetch_listings(&self) -> Result<Vec<Value>, SourceError>;
}

/// Scrapes the listing page through Firecrawl's JSON extraction.
#[derive(Debug, Clone)]
pub struct FirecrawlSource {
    settings: SourceSettings,
}

impl FirecrawlSource {
    pub fn new(settings: SourceSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self) -> Result<reqwest::Client, SourceError> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .build()
            .map_err(|err| SourceError::new(SourceFailure::Network, err.to_string()))
    }

    fn request_body(&self) -> Value {
        json!({
            "url": self.settings.listing_url,
            "formats": ["json"],
            "onlyMainContent": false,
            "waitFor": self.settings.wait_for.as_millis() as u64,
            "jsonOptions": { "prompt": self.settings.prompt },
        })
    }

    async fn read_body(&self, response: reqwest::Response) -> Result<Vec<u8>, SourceError> {
        let max_bytes = self.settings.max_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(too_large(max_bytes, content_len));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(too_large(max_bytes, next_len));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

#[async_trait::async_trait]
impl SourceProvider for FirecrawlSource {
    async fn fetch_listings(&self) -> Result<Vec<Value>, SourceError> {
        scout_info!("Fetching bounties from {}", self.settings.listing_url);
        let endpoint = reqwest::Url::parse(&self.settings.endpoint)
            .map_err(|err| SourceError::new(SourceFailure::InvalidUrl, err.to_string()))?;
        let client = self.build_client()?;

        let response = client
            .post(endpoint)
            .bearer_auth(&self.settings.api_key)
            .json(&self.request_body())
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::new(
                SourceFailure::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let bytes = self.read_body(response).await?;
        scout_debug!("Scrape response: {} bytes", bytes.len());
        let envelope: Value = serde_json::from_slice(&bytes)
            .map_err(|err| SourceError::new(SourceFailure::MalformedPayload, err.to_string()))?;
        let listings = extract_listings(envelope)?;
        scout_info!("Scrape returned {} listings", listings.len());
        Ok(listings)
    }
}

#[derive(Debug, Deserialize)]
struct ScrapeEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    data: Option<ScrapeData>,
}

#[derive(Debug, Deserialize)]
struct ScrapeData {
    #[serde(default)]
    json: Option<ExtractedJson>,
}

#[derive(Debug, Deserialize)]
struct ExtractedJson {
    #[serde(default)]
    bounties: Option<Vec<Value>>,
}

/// Pulls `data.json.bounties` out of a scrape response envelope.
pub fn extract_listings(envelope: Value) -> Result<Vec<Value>, SourceError> {
    let envelope: ScrapeEnvelope = serde_json::from_value(envelope)
        .map_err(|err| SourceError::new(SourceFailure::MalformedPayload, err.to_string()))?;

    if !envelope.success {
        let reason = envelope
            .error
            .unwrap_or_else(|| "success flag not set".to_string());
        return Err(SourceError::new(SourceFailure::Unsuccessful, reason));
    }

    let Some(data) = envelope.data else {
        return Err(SourceError::new(SourceFailure::Empty, "no data returned"));
    };

    let bounties = data
        .json
        .and_then(|json| json.bounties)
        .unwrap_or_default();
    if bounties.is_empty() {
        return Err(SourceError::new(
            SourceFailure::Empty,
            "no bounties extracted from json",
        ));
    }
    Ok(bounties)
}

fn too_large(max_bytes: u64, actual: u64) -> SourceError {
    SourceError::new(
        SourceFailure::TooLarge {
            max_bytes,
            actual: Some(actual),
        },
        "response too large",
    )
}

fn map_reqwest_error(err: reqwest::Error) -> SourceError {
    if err.is_timeout() {
        return SourceError::new(SourceFailure::Timeout, err.to_string());
    }
    SourceError::new(SourceFailure::Network, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::{FirecrawlSource, SourceSettings};

    #[test]
    fn request_body_targets_listing_page() {
        let source = FirecrawlSource::new(SourceSettings::new("key"));
        let body = source.request_body();

        assert_eq!(body["url"], "https://replit.com/bounties");
        assert_eq!(body["formats"][0], "json");
        assert_eq!(body["onlyMainContent"], false);
        assert_eq!(body["waitFor"], 2000);
        assert!(body["jsonOptions"]["prompt"]
            .as_str()
            .unwrap()
            .contains("posted_time"));
    }
}
