use crate::error::{Outcome, TranslatorError};
use crate::registry::BackendAddress;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A (source, target) language combination a backend claims to support
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LanguagePair {
    #[serde(rename = "sourceLanguage")]
    pub source: String,
    #[serde(rename = "targetLanguage")]
    pub target: String,
}

impl LanguagePair {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    /// Exact, case-sensitive comparison against a requested pair
    pub fn matches(&self, source: &str, target: &str) -> bool {
        self.source == source && self.target == target
    }
}

/// Pairs returned by one backend for one query, in backend order, duplicates included
pub type PairCatalog = Vec<LanguagePair>;

/// `/listPairs` response body
#[derive(Debug, Deserialize)]
struct ListPairsResponse {
    #[serde(rename = "responseData")]
    response_data: Vec<LanguagePair>,
}

/// Fetch the full pair catalog from exactly one backend
pub async fn fetch_all(client: &reqwest::Client, address: &BackendAddress) -> Outcome<PairCatalog> {
    let url = address.endpoint("listPairs");

    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| TranslatorError::Connection(format!("{}: {}", address, e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(TranslatorError::BackendStatus {
            code: status.as_u16(),
        });
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| TranslatorError::Connection(format!("{}: {}", address, e)))?;

    let parsed: ListPairsResponse = serde_json::from_slice(&body).map_err(|e| {
        TranslatorError::MalformedResponse(format!("listPairs from {}: {}", address, e))
    })?;

    debug!(
        "Fetched {} pair(s) from {}",
        parsed.response_data.len(),
        address
    );
    Ok(parsed.response_data)
}

/// Pairs whose source language is exactly `source`
pub async fn fetch_by_source(
    client: &reqwest::Client,
    address: &BackendAddress,
    source: &str,
) -> Outcome<PairCatalog> {
    let catalog = fetch_all(client, address).await?;
    Ok(catalog
        .into_iter()
        .filter(|pair| pair.source == source)
        .collect())
}

/// Pairs whose target language is exactly `target`
pub async fn fetch_by_target(
    client: &reqwest::Client,
    address: &BackendAddress,
    target: &str,
) -> Outcome<PairCatalog> {
    let catalog = fetch_all(client, address).await?;
    Ok(catalog
        .into_iter()
        .filter(|pair| pair.target == target)
        .collect())
}

/// Whether `address` currently lists the pair; the catalog is re-fetched on every call
pub async fn exists(
    client: &reqwest::Client,
    address: &BackendAddress,
    source: &str,
    target: &str,
) -> Outcome<bool> {
    let catalog = fetch_all(client, address).await?;
    Ok(catalog.iter().any(|pair| pair.matches(source, target)))
}
