//! Public facade: one registry and one HTTP client per instance.
//!
//! Independent `TranslatorClient`s never share state, so tests (or an
//! application juggling several backend sets) can run side by side.

use crate::catalog::{self, PairCatalog};
use crate::config::Config;
use crate::error::Outcome;
use crate::failover::{candidates, with_failover, BackendSelector};
use crate::probe::Prober;
use crate::registry::{Admission, BackendAddress, BackendRegistry};
use crate::translate::translate_on;
use anyhow::{Context, Result};
use tracing::info;

const USER_AGENT: &str = concat!("apy-failover/", env!("CARGO_PKG_VERSION"));

#[derive(Debug)]
pub struct TranslatorClient {
    http: reqwest::Client,
    registry: BackendRegistry,
}

impl TranslatorClient {
    /// Client with an empty registry over an existing HTTP client
    pub fn with_http_client(http: reqwest::Client) -> Self {
        Self {
            registry: BackendRegistry::new(Prober::new(http.clone())),
            http,
        }
    }

    /// Build the HTTP client from `config` and seed the registry from its backend list
    pub async fn from_config(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        let client = Self::with_http_client(http);
        let admission = if config.probe_on_load {
            Admission::Probed
        } else {
            Admission::Trusted
        };
        let count = client.seed(config.backends.clone(), admission).await;
        info!("Loaded {} backend(s) from configuration", count);

        Ok(client)
    }

    /// Replace the registry with previously saved addresses
    pub async fn seed<I, A>(&self, addresses: I, admission: Admission) -> usize
    where
        I: IntoIterator<Item = A>,
        A: Into<BackendAddress>,
    {
        self.registry.replace_all(addresses, admission).await
    }

    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    /// Current backend order, for the persistence layer to save
    pub fn addresses(&self) -> Vec<String> {
        self.registry
            .list()
            .into_iter()
            .map(|address| address.as_str().to_string())
            .collect()
    }

    /// Every pair offered by the first backend that answers
    pub async fn list_pairs(&self, selector: BackendSelector) -> Outcome<PairCatalog> {
        let http = &self.http;
        with_failover(
            &candidates(&self.registry, selector),
            "List pairs",
            |address| async move { catalog::fetch_all(http, &address).await },
        )
        .await
    }

    pub async fn pairs_by_source(
        &self,
        source: &str,
        selector: BackendSelector,
    ) -> Outcome<PairCatalog> {
        let http = &self.http;
        with_failover(
            &candidates(&self.registry, selector),
            &format!("List pairs from {}", source),
            |address| async move { catalog::fetch_by_source(http, &address, source).await },
        )
        .await
    }

    pub async fn pairs_by_target(
        &self,
        target: &str,
        selector: BackendSelector,
    ) -> Outcome<PairCatalog> {
        let http = &self.http;
        with_failover(
            &candidates(&self.registry, selector),
            &format!("List pairs into {}", target),
            |address| async move { catalog::fetch_by_target(http, &address, target).await },
        )
        .await
    }

    /// Whether the first backend that answers lists `source`-`target`
    pub async fn pair_exists(
        &self,
        source: &str,
        target: &str,
        selector: BackendSelector,
    ) -> Outcome<bool> {
        let http = &self.http;
        with_failover(
            &candidates(&self.registry, selector),
            &format!("Check pair {}-{}", source, target),
            |address| async move { catalog::exists(http, &address, source, target).await },
        )
        .await
    }

    /// Translate `text` on the first backend that offers the pair and answers.
    ///
    /// A backend lacking the pair is skipped like an unreachable one. If the
    /// last candidate lacks it the result is `PairNotFound`.
    pub async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
        selector: BackendSelector,
    ) -> Outcome<String> {
        let http = &self.http;
        with_failover(
            &candidates(&self.registry, selector),
            &format!("Translate {}-{}", source, target),
            |address| async move { translate_on(http, &address, text, source, target).await },
        )
        .await
    }
}
