//! Fixed outfit recommendations and fashion rules served by the catalog endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Recommendation {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub image_url: String,
    pub brand: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FashionRule {
    pub id: u32,
    pub name: String,
    pub description: String,
    pub category: String,
    pub active: bool,
}

fn recommendation(id: u32, title: &str, description: &str, price: f64, image_url: &str, brand: &str) -> Recommendation {
    Recommendation {
        id,
        title: title.to_string(),
        description: description.to_string(),
        price,
        image_url: image_url.to_string(),
        brand: brand.to_string(),
    }
}

fn rule(id: u32, name: &str, description: &str, category: &str, active: bool) -> FashionRule {
    FashionRule {
        id,
        name: name.to_string(),
        description: description.to_string(),
        category: category.to_string(),
        active,
    }
}

/// The three outfits every recommendation request receives.
pub fn recommendations() -> Vec<Recommendation> {
    vec![
        recommendation(
            1,
            "Casual Summer Outfit",
            "Lightweight linen shirt with tailored shorts",
            89.99,
            "/static/images/outfit1.jpg",
            "Summer Essentials",
        ),
        recommendation(
            2,
            "Evening Elegance",
            "Flowy maxi dress with subtle patterns",
            129.99,
            "/static/images/outfit2.jpg",
            "Elegant Nights",
        ),
        recommendation(
            3,
            "Business Casual",
            "Structured blazer with comfortable trousers",
            159.99,
            "/static/images/outfit3.jpg",
            "Professional Wear",
        ),
    ]
}

/// The rules listed for every user.
pub fn rules() -> Vec<FashionRule> {
    vec![
        rule(
            1,
            "Always suggest warm colors",
            "Prioritize warm tones like reds, oranges, and yellows",
            "color_preferences",
            true,
        ),
        rule(
            2,
            "Avoid tight-fitting clothes",
            "Focus on loose, comfortable fits",
            "fit_style",
            false,
        ),
    ]
}
