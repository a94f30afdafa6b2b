use crate::error::{Outcome, TranslatorError};
use crate::registry::{BackendAddress, BackendRegistry};
use std::future::Future;
use tracing::{debug, warn};

/// Which backends an operation may be attempted against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendSelector {
    /// Walk the whole registry in order until one backend succeeds
    #[default]
    Failover,
    /// Use only the backend at this registry index; its failure is final
    Pinned(usize),
}

/// Resolve the candidate list for one call.
///
/// A pinned index outside the registry yields an empty list, which
/// [`with_failover`] reports as `NoBackendsConfigured`.
pub fn candidates(registry: &BackendRegistry, selector: BackendSelector) -> Vec<BackendAddress> {
    match selector {
        BackendSelector::Failover => registry.list(),
        BackendSelector::Pinned(index) => registry.get(index).into_iter().collect(),
    }
}

/// Run `operation` against each candidate in order until one succeeds.
///
/// Attempts are strictly sequential. Backend failures (transport, status,
/// malformed body, missing pair) advance to the next candidate; the last
/// candidate's failure is returned. Earlier failures are logged, not kept.
/// Any other error stops immediately.
pub async fn with_failover<T, F, Fut>(
    candidates: &[BackendAddress],
    operation_name: &str,
    mut operation: F,
) -> Outcome<T>
where
    F: FnMut(BackendAddress) -> Fut,
    Fut: Future<Output = Outcome<T>>,
{
    if candidates.is_empty() {
        warn!("{}: No backend configured", operation_name);
        return Err(TranslatorError::NoBackendsConfigured);
    }

    let total = candidates.len();
    let mut last_error = TranslatorError::NoBackendsConfigured;

    for (attempt, address) in candidates.iter().enumerate() {
        match operation(address.clone()).await {
            Ok(result) => {
                if attempt > 0 {
                    debug!(
                        "{}: Succeeded on backend {}/{} ({})",
                        operation_name,
                        attempt + 1,
                        total,
                        address
                    );
                }
                return Ok(result);
            }
            Err(e) => {
                if !e.is_backend_failure() {
                    debug!(
                        "{}: Error is not a backend failure, failing immediately: {}",
                        operation_name, e
                    );
                    return Err(e);
                }

                let remaining = total - attempt - 1;
                if remaining > 0 {
                    warn!(
                        "{}: Backend {}/{} ({}) failed ({}), {} backend(s) remaining",
                        operation_name,
                        attempt + 1,
                        total,
                        address,
                        e,
                        remaining
                    );
                } else {
                    warn!(
                        "{}: All {} backend(s) failed. Last error: {}",
                        operation_name, total, e
                    );
                }
                last_error = e;
            }
        }
    }

    Err(last_error)
}
