//! Lazily fetched, process-lifetime verification key.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::DecodingKey;
use std::{fmt, sync::Arc};
use tokio::sync::RwLock;

use crate::services::key::fetcher::{FetchError, KeyFetcher};

/// RSA public key used to check token signatures.
///
/// - Cheap to clone; clones share the parsed key.
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct VerificationKey {
    pem: Arc<str>,
    decoding_key: Arc<DecodingKey>,
    fetched_at: DateTime<Utc>,
}

impl VerificationKey {
    /// Parse PEM text (SPKI or PKCS#1) into an RSA verification key.
    pub fn from_pem(pem: &str) -> Result<Self, FetchError> {
        let decoding_key = DecodingKey::from_rsa_pem(pem.as_bytes())
            .map_err(|e| FetchError::InvalidKey(e.to_string()))?;

        Ok(Self {
            pem: Arc::from(pem),
            decoding_key: Arc::new(decoding_key),
            fetched_at: Utc::now(),
        })
    }

    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }

    pub fn pem(&self) -> &str {
        &self.pem
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// True when both handles point at the same cached key.
    pub fn same_instance(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.decoding_key, &other.decoding_key)
    }
}

impl fmt::Debug for VerificationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("VerificationKey")
            .field("fetched_at", &self.fetched_at)
            .finish()
    }
}

/// Supplies the verification key to the authorizer.
#[async_trait]
pub trait KeyProvider: Send + Sync {
    async fn key(&self) -> Result<VerificationKey, FetchError>;
}

/// Fetches the key on first use and keeps it for the rest of the process.
///
/// Concurrent first callers are serialized on the write lock, so exactly one
/// fetch happens and every caller gets the same instance. Failures are not
/// cached. There is no expiry and no refresh.
pub struct CachedKeyProvider {
    fetcher: Arc<dyn KeyFetcher>,
    cache: RwLock<Option<VerificationKey>>,
}

impl CachedKeyProvider {
    pub fn new(fetcher: Arc<dyn KeyFetcher>) -> Self {
        Self {
            fetcher,
            cache: RwLock::new(None),
        }
    }

    pub async fn is_cached(&self) -> bool {
        self.cache.read().await.is_some()
    }
}

impl fmt::Debug for CachedKeyProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedKeyProvider")
            .field("source", &self.fetcher.source())
            .finish()
    }
}

#[async_trait]
impl KeyProvider for CachedKeyProvider {
    async fn key(&self) -> Result<VerificationKey, FetchError> {
        {
            let cache = self.cache.read().await;
            if let Some(key) = cache.as_ref() {
                return Ok(key.clone());
            }
        }

        let mut cache = self.cache.write().await;

        // Another caller may have filled the cache while we waited.
        if let Some(key) = cache.as_ref() {
            return Ok(key.clone());
        }

        let pem = match self.fetcher.fetch().await {
            Ok(pem) => pem,
            Err(err) => {
                tracing::warn!(source = self.fetcher.source(), error = %err, "verification key fetch failed");
                return Err(err);
            }
        };

        let key = VerificationKey::from_pem(&pem).inspect_err(|err| {
            tracing::warn!(source = self.fetcher.source(), error = %err, "fetched key is not a usable RSA public key");
        })?;

        tracing::info!(source = self.fetcher.source(), "verification key fetched and cached");
        *cache = Some(key.clone());

        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const PUBLIC_KEY: &str = include_str!("../../../tests/fixtures/jwt_rs256.pub");

    /// Serves a scripted sequence of responses and counts calls.
    struct ScriptedFetcher {
        calls: AtomicUsize,
        fail_first: usize,
        body: String,
        delay: Duration,
    }

    impl ScriptedFetcher {
        fn ok(body: &str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_first: 0,
                body: body.to_string(),
                delay: Duration::ZERO,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl KeyFetcher for ScriptedFetcher {
        fn source(&self) -> &str {
            "test://key"
        }

        async fn fetch(&self) -> Result<String, FetchError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if n < self.fail_first {
                return Err(FetchError::Status(503));
            }
            Ok(self.body.clone())
        }
    }

    #[tokio::test]
    async fn fetches_once_across_sequential_calls() {
        let fetcher = Arc::new(ScriptedFetcher::ok(PUBLIC_KEY));
        let provider = CachedKeyProvider::new(fetcher.clone());

        let first = provider.key().await.unwrap();
        let second = provider.key().await.unwrap();

        assert_eq!(fetcher.calls(), 1);
        assert!(first.same_instance(&second));
        assert_eq!(first.pem(), PUBLIC_KEY);
    }

    #[tokio::test]
    async fn failed_fetch_is_not_cached() {
        let fetcher = Arc::new(ScriptedFetcher {
            fail_first: 1,
            ..ScriptedFetcher::ok(PUBLIC_KEY)
        });
        let provider = CachedKeyProvider::new(fetcher.clone());

        let err = provider.key().await.unwrap_err();
        assert!(matches!(err, FetchError::Status(503)));
        assert!(!provider.is_cached().await);

        provider.key().await.unwrap();
        provider.key().await.unwrap();
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn unparseable_key_text_is_not_cached() {
        let fetcher = Arc::new(ScriptedFetcher::ok("not a pem"));
        let provider = CachedKeyProvider::new(fetcher.clone());

        assert!(matches!(
            provider.key().await,
            Err(FetchError::InvalidKey(_))
        ));
        assert!(matches!(
            provider.key().await,
            Err(FetchError::InvalidKey(_))
        ));
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_first_calls_fetch_exactly_once() {
        let fetcher = Arc::new(ScriptedFetcher {
            delay: Duration::from_millis(50),
            ..ScriptedFetcher::ok(PUBLIC_KEY)
        });
        let provider = Arc::new(CachedKeyProvider::new(fetcher.clone()));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let provider = provider.clone();
                tokio::spawn(async move { provider.key().await })
            })
            .collect();

        let mut keys = Vec::new();
        for handle in handles {
            keys.push(handle.await.unwrap().unwrap());
        }

        assert_eq!(fetcher.calls(), 1);
        assert!(keys.iter().all(|k| k.same_instance(&keys[0])));
    }

    #[test]
    fn debug_does_not_print_key_material() {
        let key = VerificationKey::from_pem(PUBLIC_KEY).unwrap();
        let printed = format!("{:?}", key);
        assert!(!printed.contains("BEGIN PUBLIC KEY"));
    }
}
