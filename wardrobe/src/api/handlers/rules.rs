//! Fashion rule endpoints. Rules are not persisted.

use axum::{
    Json,
    extract::{Path, rejection::JsonRejection},
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    api::models::rules::{FashionRuleCreate, FashionRuleCreated, FashionRulesResponse, RULE_CREATED_MESSAGE},
    catalog,
    errors::{ErrorBody, Result},
    types::abbrev_uuid,
};

#[utoipa::path(
    post,
    path = "/rules",
    tag = "rules",
    summary = "Create a fashion rule",
    description = "Accepts a fashion rule and returns a new rule id. The rule is not stored.",
    request_body = FashionRuleCreate,
    responses(
        (status = 200, description = "Rule created", body = FashionRuleCreated),
        (status = 400, description = "Malformed JSON body", body = ErrorBody),
        (status = 415, description = "Body is not JSON", body = ErrorBody),
        (status = 422, description = "Body is a JSON scalar instead of an object", body = ErrorBody)
    )
)]
#[instrument(skip_all)]
pub async fn create_rule(
    payload: std::result::Result<Json<Option<FashionRuleCreate>>, JsonRejection>,
) -> Result<Json<FashionRuleCreated>> {
    let Json(rule) = payload?;
    let rule = rule.unwrap_or_default();
    let rule_id = Uuid::new_v4();
    tracing::info!(rule_id = %abbrev_uuid(&rule_id), category = ?rule.category, "Fashion rule created");

    Ok(Json(FashionRuleCreated {
        success: true,
        rule_id,
        message: RULE_CREATED_MESSAGE.to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/rules/{user_id}",
    tag = "rules",
    summary = "List a user's fashion rules",
    params(
        ("user_id" = String, Path, description = "User whose rules to list")
    ),
    responses(
        (status = 200, description = "Fashion rules", body = FashionRulesResponse)
    )
)]
#[instrument]
pub async fn list_rules(Path(user_id): Path<String>) -> Json<FashionRulesResponse> {
    Json(FashionRulesResponse {
        success: true,
        rules: catalog::rules(),
    })
}
