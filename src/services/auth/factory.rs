//! Factory: build the `Authorizer` (and its key provider) from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::{Authorizer, AuthorizerOptions};
use crate::services::key::{CachedKeyProvider, FetchError, HttpKeyFetcher};

pub fn build_authorizer(config: &Config) -> Result<Arc<Authorizer>, FetchError> {
    let fetcher = HttpKeyFetcher::new(config.public_key_url.clone(), config.key_fetch_timeout)?;
    let keys = CachedKeyProvider::new(Arc::new(fetcher));

    let options = AuthorizerOptions {
        audience: config.audience.clone(),
        leeway_seconds: config.token_leeway_seconds,
    };

    Ok(Arc::new(Authorizer::new(Arc::new(keys), options)))
}
