pub mod fetcher;
pub mod provider;

pub use fetcher::{FetchError, HttpKeyFetcher, KeyFetcher};
pub use provider::{CachedKeyProvider, KeyProvider, VerificationKey};
