use serde::Deserialize;
use serde_json::{Map, Value};

/// The role that grants access.
pub const ADMIN_ROLE: &str = "ADMIN";

/// Verified identity-token claims.
///
/// `sub`, `iat` and `exp` are required (serde rejects tokens without them).
/// Everything under `context` is kept as raw JSON: the nested shape is not
/// trusted and every level is looked up explicitly.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub iat: u64,
    pub exp: u64,

    #[serde(default)]
    pub iss: Option<String>,
    // Only checked when an expected audience is configured.
    #[serde(default)]
    pub aud: Value,

    #[serde(default)]
    pub context: Value,
}

impl TokenClaims {
    /// `context.user`, if both levels are present and `user` is an object.
    pub fn user(&self) -> Option<&Map<String, Value>> {
        self.context.get("user").and_then(Value::as_object)
    }

    /// `context.user.roles`; any missing or mistyped level yields no roles.
    pub fn roles(&self) -> Vec<&str> {
        self.user()
            .and_then(|user| user.get("roles"))
            .and_then(Value::as_array)
            .map(|roles| roles.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    pub fn is_admin(&self) -> bool {
        has_admin_role(self.roles())
    }
}

/// Exact, case-sensitive membership test for `ADMIN`.
pub fn has_admin_role<'a>(roles: impl IntoIterator<Item = &'a str>) -> bool {
    roles.into_iter().any(|role| role == ADMIN_ROLE)
}
