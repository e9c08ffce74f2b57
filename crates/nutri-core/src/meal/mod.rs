//! Meal photo analysis on top of the LLM gateway.
//!
//! Sends a photo with [`FOOD_IDENTIFICATION_PROMPT`], decodes the model's JSON
//! into a [`DishAnalysis`], and scores it with [`compute_health_score`].

pub mod analysis;
pub mod health;
pub mod prompt;

pub use analysis::{DishAnalysis, Ingredient, Macronutrients, UNKNOWN_DISH};
pub use health::compute_health_score;
pub use prompt::FOOD_IDENTIFICATION_PROMPT;

use crate::error::GatewayResult;
use crate::llm::{ImageOptions, LlmGateway, LlmResponse};
use std::path::Path;

/// Identify the dish in the photo at `image_path`.
///
/// Returns `Ok(None)` when the call timed out or failed, or when the answer
/// did not contain a usable analysis. Results are served from the gateway's
/// cache when available.
pub async fn analyze_dish(
    gateway: &LlmGateway,
    image_path: impl AsRef<Path>,
) -> GatewayResult<Option<DishAnalysis>> {
    analyze_dish_with(gateway, image_path, ImageOptions::json()).await
}

/// [`analyze_dish`] with caller-chosen image options. JSON extraction is
/// always enabled.
pub async fn analyze_dish_with(
    gateway: &LlmGateway,
    image_path: impl AsRef<Path>,
    options: ImageOptions,
) -> GatewayResult<Option<DishAnalysis>> {
    let options = ImageOptions {
        wants_json: true,
        ..options
    };
    let response = gateway
        .ask_with_image(FOOD_IDENTIFICATION_PROMPT, image_path, options)
        .await?;
    Ok(parse_dish(&response))
}

/// Decode a dish analysis from a gateway response.
pub fn parse_dish(response: &LlmResponse) -> Option<DishAnalysis> {
    let value = response.parsed_json()?;
    match serde_json::from_value::<DishAnalysis>(value.clone()) {
        Ok(dish) if dish.is_blank() => {
            tracing::debug!("Model JSON names no dish, ingredients or macronutrients");
            None
        }
        Ok(dish) => Some(dish),
        Err(e) => {
            tracing::debug!("Model JSON is not a dish analysis: {e}");
            None
        }
    }
}
