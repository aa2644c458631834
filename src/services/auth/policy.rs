//! Gateway policy document (the authorizer's output).
//!
//! Field names are fixed by the gateway that consumes the document and must
//! serialize exactly as:
//!
//! ```text
//! {"principalId": ..., "policyDocument": {"Version": ..., "Statement": [...]}, "context": {...}}
//! ```
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const POLICY_VERSION: &str = "2012-10-17";
pub const INVOKE_ACTION: &str = "execute-api:Invoke";

/// User attributes copied into `context`, in copy order.
pub const USER_ATTRIBUTES: [&str; 5] = ["name", "email", "status", "firstName", "lastName"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

impl Effect {
    pub fn from_decision(allowed: bool) -> Self {
        if allowed { Self::Allow } else { Self::Deny }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    pub action: String,
    pub effect: Effect,
    pub resource: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Policy {
    pub version: String,
    pub statement: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyDocument {
    pub principal_id: String,
    pub policy_document: Policy,
    // Never serialized empty: `build_policy` stores `None` instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Map<String, Value>>,
}

impl PolicyDocument {
    pub fn effect(&self) -> Option<Effect> {
        self.policy_document.statement.first().map(|s| s.effect)
    }
}

/// Assemble the document for one decision.
///
/// `resource` is passed through untouched.
pub fn build_policy(
    principal_id: &str,
    resource: &str,
    effect: Effect,
    user: Option<&Map<String, Value>>,
) -> PolicyDocument {
    PolicyDocument {
        principal_id: principal_id.to_string(),
        policy_document: Policy {
            version: POLICY_VERSION.to_string(),
            statement: vec![Statement {
                action: INVOKE_ACTION.to_string(),
                effect,
                resource: resource.to_string(),
            }],
        },
        context: user_context(user),
    }
}

/// Copy the recognized attributes present on `user` (presence, not
/// truthiness). `None` when none are present.
pub fn user_context(user: Option<&Map<String, Value>>) -> Option<Map<String, Value>> {
    let user = user?;

    let context: Map<String, Value> = USER_ATTRIBUTES
        .iter()
        .filter_map(|&key| user.get(key).map(|v| (key.to_string(), v.clone())))
        .collect();

    if context.is_empty() { None } else { Some(context) }
}
