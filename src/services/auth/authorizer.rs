use jsonwebtoken::{Algorithm, Validation, errors::ErrorKind};
use std::{fmt, sync::Arc};
use thiserror::Error;

use crate::services::auth::claims::TokenClaims;
use crate::services::auth::policy::{Effect, PolicyDocument, build_policy};
use crate::services::key::{FetchError, KeyProvider, VerificationKey};

/// Errors returned by `Authorizer::decide`. All of them end the request.
#[derive(Debug, Error)]
pub enum AuthorizeError {
    #[error("verification key unavailable: {0}")]
    KeyUnavailable(#[from] FetchError),
    #[error("malformed token: {0}")]
    MalformedToken(#[source] jsonwebtoken::errors::Error),
    #[error("token expired")]
    ExpiredToken,
}

impl AuthorizeError {
    // Stable label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::KeyUnavailable(_) => "key_unavailable",
            Self::MalformedToken(_) => "malformed_token",
            Self::ExpiredToken => "expired_token",
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthorizeError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::ExpiredSignature => Self::ExpiredToken,
            _ => Self::MalformedToken(e),
        }
    }
}

/// Verification knobs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorizerOptions {
    /// Expected `aud` value. `None` skips audience validation entirely,
    /// which is what already-issued tokens rely on.
    pub audience: Option<String>,
    /// Clock skew tolerated on `exp`/`nbf`.
    pub leeway_seconds: u64,
}

/// RS256 token verifier + ADMIN-role decision + policy builder.
pub struct Authorizer {
    keys: Arc<dyn KeyProvider>,
    validation: Validation,
}

impl fmt::Debug for Authorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authorizer")
            .field("validation", &self.validation)
            .finish()
    }
}

impl Authorizer {
    pub fn new(keys: Arc<dyn KeyProvider>, options: AuthorizerOptions) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = options.leeway_seconds;

        match options.audience.as_deref() {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }

        Self { keys, validation }
    }

    /// Verify `token` and build the policy for `resource`.
    ///
    /// The key is obtained first, so a key outage is reported as
    /// `KeyUnavailable` even for garbage tokens.
    pub async fn decide(
        &self,
        token: &str,
        resource: &str,
    ) -> Result<PolicyDocument, AuthorizeError> {
        let key = self.keys.key().await.map_err(|err| {
            tracing::warn!(error = %err, "cannot authorize without verification key");
            AuthorizeError::from(err)
        })?;

        let claims = self.verify(token, &key).inspect_err(|err| {
            tracing::warn!(kind = err.kind(), error = %err, "token verification failed");
        })?;

        let effect = Effect::from_decision(claims.is_admin());
        let policy = build_policy(&claims.sub, resource, effect, claims.user());

        tracing::info!(
            principal_id = %policy.principal_id,
            effect = ?effect,
            resource = %resource,
            "authorization decided"
        );

        Ok(policy)
    }

    /// Signature, structure, required claims and expiry.
    pub fn verify(
        &self,
        token: &str,
        key: &VerificationKey,
    ) -> Result<TokenClaims, AuthorizeError> {
        let data =
            jsonwebtoken::decode::<TokenClaims>(token, key.decoding_key(), &self.validation)?;

        Ok(data.claims)
    }
}
