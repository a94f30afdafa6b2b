use thiserror::Error;

/// Result of every public client operation.
pub type Outcome<T> = std::result::Result<T, TranslatorError>;

/// Failure taxonomy shared by the registry, catalog, failover and translation layers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslatorError {
    /// Transport-level failure reaching a backend (DNS, refused connection, bad URL, timeout)
    #[error("Error on connection: {0}")]
    Connection(String),

    /// The backend answered with a non-success status
    #[error("Response {code} from backend")]
    BackendStatus { code: u16 },

    /// No attempted backend supports the requested pair
    #[error("Pair {source_lang}-{target_lang} does not exist")]
    PairNotFound {
        source_lang: String,
        target_lang: String,
    },

    /// Registry is empty, or a pinned index does not name a backend
    #[error("No translation backend configured")]
    NoBackendsConfigured,

    /// Response body did not have the expected shape
    #[error("Malformed backend response: {0}")]
    MalformedResponse(String),

    #[error("Index {index} out of range for registry of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Address rejected by the reachability probe
    #[error("Backend {0} is not reachable")]
    NotReachable(String),
}

impl TranslatorError {
    /// Whether this failure belongs to one backend, so failover may move on to the next.
    ///
    /// Registry usage errors are never produced by a backend attempt and are not advanced past.
    pub fn is_backend_failure(&self) -> bool {
        matches!(
            self,
            TranslatorError::Connection(_)
                | TranslatorError::BackendStatus { .. }
                | TranslatorError::PairNotFound { .. }
                | TranslatorError::MalformedResponse(_)
        )
    }
}
