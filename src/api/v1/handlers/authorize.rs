/*
 * Responsibility
 * - POST /authorize: decode the gateway event, run the Authorizer, return the policy
 * - Error mapping is AppError's job; nothing is decided here
 */
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};

use crate::{
    api::v1::dto::authorize::AuthorizeRequest, error::AppError,
    services::auth::PolicyDocument, state::AppState,
};

pub async fn authorize(
    State(state): State<AppState>,
    payload: Result<Json<AuthorizeRequest>, JsonRejection>,
) -> Result<Json<PolicyDocument>, AppError> {
    let Json(req) = payload.map_err(|e| AppError::bad_request("BAD_REQUEST", e.body_text()))?;

    let policy = state
        .authorizer
        .decide(req.token(), &req.method_arn)
        .await?;

    Ok(Json(policy))
}
