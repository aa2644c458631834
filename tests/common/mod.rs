#![allow(dead_code)]

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{Value, json};

use gateway_authorizer::services::auth::{Authorizer, AuthorizerOptions};
use gateway_authorizer::services::key::{FetchError, KeyProvider, VerificationKey};

pub const PUBLIC_KEY: &str = include_str!("../fixtures/jwt_rs256.pub");
pub const PRIVATE_KEY: &str = include_str!("../fixtures/jwt_rs256.pem");
pub const OTHER_PRIVATE_KEY: &str = include_str!("../fixtures/other_rs256.pem");

pub const RESOURCE: &str = "1234";

pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Claims shaped like the identity provider's tokens.
pub fn claims_for(user: Value) -> Value {
    json!({
        "iat": now() - 3600,
        "exp": now() + 3600,
        "sub": "user_id",
        "iss": "ego",
        "aud": [],
        "context": {"user": user},
    })
}

pub fn sign_with(claims: &Value, private_pem: &str) -> String {
    let key = EncodingKey::from_rsa_pem(private_pem.as_bytes()).expect("fixture private key");
    jsonwebtoken::encode(&Header::new(Algorithm::RS256), claims, &key).expect("sign token")
}

pub fn sign(claims: &Value) -> String {
    sign_with(claims, PRIVATE_KEY)
}

pub fn token_for(user: Value) -> String {
    sign(&claims_for(user))
}

pub fn full_user(roles: &[&str]) -> Value {
    json!({
        "name": "user1@gmail.com",
        "email": "jecos.user1@gmail.com",
        "status": "Approved",
        "firstName": "John",
        "lastName": "Doe",
        "roles": roles,
    })
}

/// Always returns the fixture key and counts calls.
#[derive(Default)]
pub struct StaticKeyProvider {
    pub calls: AtomicUsize,
}

impl StaticKeyProvider {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeyProvider for StaticKeyProvider {
    async fn key(&self) -> Result<VerificationKey, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        VerificationKey::from_pem(PUBLIC_KEY)
    }
}

/// Key source that is down.
pub struct UnavailableKeyProvider;

#[async_trait]
impl KeyProvider for UnavailableKeyProvider {
    async fn key(&self) -> Result<VerificationKey, FetchError> {
        Err(FetchError::Status(502))
    }
}

pub fn authorizer() -> Authorizer {
    authorizer_with(AuthorizerOptions::default())
}

pub fn authorizer_with(options: AuthorizerOptions) -> Authorizer {
    Authorizer::new(Arc::new(StaticKeyProvider::default()), options)
}
