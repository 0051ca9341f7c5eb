//! OpenAPI document for the public API, served at `/api-docs/openapi.json` and rendered at `/docs`.

use utoipa::OpenApi;

use crate::{analysis, api, catalog, errors};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Wardrobe API",
        description = "Photo intake, style analysis and outfit recommendations."
    ),
    paths(
        api::handlers::uploads::upload,
        api::handlers::analysis::analyze,
        api::handlers::recommendations::get_recommendations,
        api::handlers::rules::create_rule,
        api::handlers::rules::list_rules,
    ),
    components(
        schemas(
            api::models::uploads::UploadResponse,
            api::models::analysis::AnalysisResponse,
            api::models::recommendations::RecommendationsRequest,
            api::models::recommendations::RecommendationsResponse,
            api::models::rules::FashionRuleCreate,
            api::models::rules::FashionRuleCreated,
            api::models::rules::FashionRulesResponse,
            analysis::AnalysisResults,
            catalog::Recommendation,
            catalog::FashionRule,
            errors::ErrorBody,
        )
    ),
    tags(
        (name = "uploads", description = "Photo intake"),
        (name = "analysis", description = "Style analysis of uploaded photos"),
        (name = "recommendations", description = "Outfit recommendations"),
        (name = "rules", description = "User-defined fashion rules"),
    )
)]
pub struct ApiDoc;
