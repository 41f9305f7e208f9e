use std::time::Duration;
use async_trait::async_trait;
use reqwest::header::REFERER;
use serde::Deserialize;
use shared::{NomineeId, Nominees};
use time::OffsetDateTime;
use tracing::debug;
use crate::config::SourceConfig;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Provider returned status {0}")]
    Status(u16),
    #[error("Provider reported failure")]
    Rejected,
    #[error("Malformed payload: {0}")]
    Malformed(String),
}

/// Anything that can report the current vote count per nominee.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<(NomineeId, u64)>, SourceError>;
}

#[derive(Debug, Deserialize)]
struct ProviderResponse {
    #[serde(rename = "Success")]
    success: bool,
    #[serde(rename = "Data")]
    data: Option<Vec<ProviderEntry>>,
}

#[derive(Debug, Deserialize)]
struct ProviderEntry {
    m: u64,
    a: u64,
    list: Vec<ProviderCount>,
}

#[derive(Debug, Deserialize)]
struct ProviderCount {
    v: u64,
}

/// Decodes a provider response body. Any malformed entry rejects the whole
/// payload so a poll never records half a batch.
pub fn parse_payload(body: &str, nominees: &Nominees) -> Result<Vec<(NomineeId, u64)>, SourceError> {
    let response: ProviderResponse =
        serde_json::from_str(body).map_err(|e| SourceError::Malformed(e.to_string()))?;

    let entries = match response.data {
        Some(entries) if response.success && !entries.is_empty() => entries,
        _ => return Err(SourceError::Rejected),
    };

    let mut samples = Vec::with_capacity(entries.len());
    for entry in entries {
        let id = NomineeId::new(format!("w{}-{}", entry.a, entry.m));
        let count = entry
            .list
            .first()
            .ok_or_else(|| SourceError::Malformed(format!("no vote count for {}", id)))?;

        if nominees.contains(id.as_str()) {
            samples.push((id, count.v));
        } else {
            debug!("Dropping unrecognised nominee {} from provider payload", id);
        }
    }
    Ok(samples)
}

/// HTTP client for the contest's vote endpoint.
pub struct ProviderSource {
    client: reqwest::Client,
    config: SourceConfig,
    nominees: Nominees,
    id_list: String,
}

impl ProviderSource {
    pub fn new(config: SourceConfig, nominees: Nominees) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent("vote-tracker/0.1")
            .build()?;
        let id_list = nominees.iter().map(|n| n.id.as_str()).collect();

        Ok(Self { client, config, nominees, id_list })
    }
}

#[async_trait]
impl SnapshotSource for ProviderSource {
    async fn fetch(&self) -> Result<Vec<(NomineeId, u64)>, SourceError> {
        let cache_buster = (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000).to_string();
        let response = self
            .client
            .get(&self.config.endpoint)
            .header(REFERER, &self.config.referer)
            .query(&[
                ("m", "get-vote"),
                ("lstId", self.id_list.as_str()),
                ("_", cache_buster.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        parse_payload(&body, &self.nominees)
    }
}
