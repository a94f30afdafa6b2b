//! Failover client for Apertium-APY style translation backends.
//!
//! A [`TranslatorClient`] owns an ordered [`BackendRegistry`] and runs every
//! pair lookup or translation against its backends one at a time, returning
//! the first success or the last failure.

pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod failover;
pub mod preferences;
pub mod probe;
pub mod registry;
pub mod translate;

pub use catalog::{LanguagePair, PairCatalog};
pub use client::TranslatorClient;
pub use config::Config;
pub use error::{Outcome, TranslatorError};
pub use failover::BackendSelector;
pub use preferences::{Direction, PreferenceError, PreferenceStore, UserPair};
pub use registry::{Admission, BackendAddress, BackendRegistry};
