//! Ordered list of translation backends.
//!
//! Order is the only prioritization signal: failover always walks the list
//! front to back, so a preferred backend simply goes first. Entries are
//! optionally admitted through a reachability probe.

use crate::error::{Outcome, TranslatorError};
use crate::probe::Prober;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{PoisonError, RwLock};
use tracing::{info, warn};

/// Connection string for one backend, `host[:port]` with an optional scheme.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackendAddress(String);

impl BackendAddress {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Join a host and an optional port into one address
    pub fn from_host_port(host: &str, port: Option<&str>) -> Self {
        match port {
            Some(port) => Self(format!("{}:{}", host, port)),
            None => Self(host.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build the URL of `path` on this backend.
    ///
    /// Addresses without a scheme are reached over plain HTTP.
    pub fn endpoint(&self, path: &str) -> String {
        let base = self.0.trim_end_matches('/');
        let path = path.trim_start_matches('/');

        if base.contains("://") {
            format!("{}/{}", base, path)
        } else {
            format!("http://{}/{}", base, path)
        }
    }
}

impl fmt::Display for BackendAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BackendAddress {
    fn from(address: &str) -> Self {
        Self::new(address)
    }
}

impl From<String> for BackendAddress {
    fn from(address: String) -> Self {
        Self(address)
    }
}

/// How a candidate address is admitted into the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Admission {
    /// Store only if the reachability probe succeeds
    #[default]
    Probed,
    /// Store unconditionally (addresses already validated when they were saved)
    Trusted,
}

/// Ordered, mutable set of backend addresses owned by one client.
///
/// Mutations take `&self` so the registry can be shared; readers always get
/// a copy through [`BackendRegistry::list`], never a live view.
#[derive(Debug)]
pub struct BackendRegistry {
    addresses: RwLock<Vec<BackendAddress>>,
    prober: Prober,
}

impl BackendRegistry {
    pub fn new(prober: Prober) -> Self {
        Self {
            addresses: RwLock::new(Vec::new()),
            prober,
        }
    }

    /// Append `address`, gated by `admission`.
    ///
    /// Returns the stored address, or `NotReachable` if the probe rejected it.
    pub async fn add(
        &self,
        address: impl Into<BackendAddress>,
        admission: Admission,
    ) -> Outcome<BackendAddress> {
        let address = address.into();
        self.admit(&address, admission).await?;

        self.write().push(address.clone());
        info!("Added backend {}", address);
        Ok(address)
    }

    /// Insert `address` at `position`, shifting later entries right.
    ///
    /// `position` may equal the current length (append); anything larger is
    /// `IndexOutOfRange` and leaves the registry untouched.
    pub async fn insert_at(
        &self,
        address: impl Into<BackendAddress>,
        position: usize,
        admission: Admission,
    ) -> Outcome<BackendAddress> {
        let address = address.into();

        let len = self.len();
        if position > len {
            return Err(TranslatorError::IndexOutOfRange {
                index: position,
                len,
            });
        }

        self.admit(&address, admission).await?;

        // The list may have shrunk while the probe was in flight
        let mut addresses = self.write();
        if position > addresses.len() {
            return Err(TranslatorError::IndexOutOfRange {
                index: position,
                len: addresses.len(),
            });
        }
        addresses.insert(position, address.clone());
        info!("Inserted backend {} at position {}", address, position);

        Ok(address)
    }

    /// Remove and return the entry at `index`
    pub fn remove_at(&self, index: usize) -> Outcome<BackendAddress> {
        let mut addresses = self.write();
        if index >= addresses.len() {
            return Err(TranslatorError::IndexOutOfRange {
                index,
                len: addresses.len(),
            });
        }

        let removed = addresses.remove(index);
        info!("Removed backend {} from position {}", removed, index);
        Ok(removed)
    }

    /// Discard the current list and admit each candidate in order.
    ///
    /// Candidates failing the probe are skipped silently. The swap happens
    /// only after every candidate was checked, so readers never observe a
    /// half-built list. Returns how many addresses were stored.
    pub async fn replace_all<I, A>(&self, candidates: I, admission: Admission) -> usize
    where
        I: IntoIterator<Item = A>,
        A: Into<BackendAddress>,
    {
        let mut admitted = Vec::new();
        for candidate in candidates {
            let candidate = candidate.into();
            if self.admit(&candidate, admission).await.is_ok() {
                admitted.push(candidate);
            }
        }

        let count = admitted.len();
        *self.write() = admitted;
        info!("Registry replaced with {} backend(s)", count);

        count
    }

    /// Snapshot of the current order
    pub fn list(&self) -> Vec<BackendAddress> {
        self.read().clone()
    }

    pub fn get(&self, index: usize) -> Option<BackendAddress> {
        self.read().get(index).cloned()
    }

    /// The address tried first by failover
    pub fn first(&self) -> Option<BackendAddress> {
        self.get(0)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    async fn admit(&self, address: &BackendAddress, admission: Admission) -> Outcome<()> {
        if admission == Admission::Trusted || self.prober.probe(address).await {
            return Ok(());
        }

        warn!("Backend {} failed the reachability probe", address);
        Err(TranslatorError::NotReachable(address.to_string()))
    }

    // The list is valid after every write, so a poisoned lock is still usable
    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<BackendAddress>> {
        self.addresses.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<BackendAddress>> {
        self.addresses.write().unwrap_or_else(PoisonError::into_inner)
    }
}
