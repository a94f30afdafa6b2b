use crate::registry::BackendAddress;
use tracing::debug;

/// Reachability check used to gate admission into the registry.
///
/// Only connectivity matters here: a backend answering `500` on `/listPairs`
/// is still reachable. Telling healthy and erroring backends apart is left to
/// failover at call time.
#[derive(Debug, Clone)]
pub struct Prober {
    client: reqwest::Client,
}

impl Prober {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Returns true if `address` answered the pair listing request at all
    pub async fn probe(&self, address: &BackendAddress) -> bool {
        let url = address.endpoint("listPairs");

        match self.client.get(&url).send().await {
            Ok(response) => {
                debug!("Probe of {} answered with {}", address, response.status());
                true
            }
            Err(e) => {
                debug!("Probe of {} failed: {}", address, e);
                false
            }
        }
    }
}
