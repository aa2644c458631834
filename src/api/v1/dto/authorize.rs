use serde::Deserialize;

/// Token-authorizer event as sent by the gateway.
///
/// ```json
/// {"type": "TOKEN", "authorizationToken": "<jwt>", "methodArn": "<resource>"}
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizeRequest {
    // Only "TOKEN" events exist; accepted but not checked.
    #[serde(default, rename = "type")]
    pub event_type: Option<String>,
    pub authorization_token: String,
    pub method_arn: String,
}

impl AuthorizeRequest {
    /// The raw token, with an optional `Bearer ` prefix removed.
    pub fn token(&self) -> &str {
        let raw = self.authorization_token.trim();
        raw.strip_prefix("Bearer ").unwrap_or(raw).trim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(token: &str) -> AuthorizeRequest {
        serde_json::from_value(serde_json::json!({
            "type": "TOKEN",
            "authorizationToken": token,
            "methodArn": "1234",
        }))
        .unwrap()
    }

    #[test]
    fn strips_bearer_prefix() {
        assert_eq!(request("Bearer abc.def.ghi").token(), "abc.def.ghi");
        assert_eq!(request("abc.def.ghi").token(), "abc.def.ghi");
        assert_eq!(request("  Bearer  abc.def.ghi ").token(), "abc.def.ghi");
    }

    #[test]
    fn type_is_optional() {
        let req: AuthorizeRequest = serde_json::from_value(serde_json::json!({
            "authorizationToken": "t",
            "methodArn": "arn",
        }))
        .unwrap();
        assert_eq!(req.event_type, None);
        assert_eq!(req.method_arn, "arn");
    }
}
