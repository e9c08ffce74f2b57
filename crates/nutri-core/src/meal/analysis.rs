//! Structured dish analysis returned by the vision model.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Name used when the model identifies food but not the dish.
pub const UNKNOWN_DISH: &str = "Unknown Meal";

/// One identified ingredient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    /// Portions visible in the photo
    #[serde(default = "one")]
    pub portion_count: f32,
    /// Weight of a single portion
    #[serde(default)]
    pub grams: f32,
}

impl Ingredient {
    pub fn total_grams(&self) -> f32 {
        self.portion_count * self.grams
    }
}

fn one() -> f32 {
    1.0
}

/// Macronutrients for the whole dish. Masses are in grams, energy in kcal.
///
/// Models are inconsistent about key spelling, so both the plural and the
/// singular forms are accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Macronutrients {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbs: Option<f32>,
    #[serde(rename = "fats", alias = "fat", skip_serializing_if = "Option::is_none")]
    pub fat: Option<f32>,
    #[serde(rename = "fibers", alias = "fiber", skip_serializing_if = "Option::is_none")]
    pub fiber: Option<f32>,
    #[serde(
        rename = "saturated_fats",
        alias = "sat.fat",
        alias = "saturated_fat",
        skip_serializing_if = "Option::is_none"
    )]
    pub saturated_fat: Option<f32>,
}

impl Macronutrients {
    /// True when the model reported no macronutrients at all.
    pub fn is_empty(&self) -> bool {
        self.calories.is_none()
            && self.protein.is_none()
            && self.carbs.is_none()
            && self.fat.is_none()
            && self.fiber.is_none()
            && self.saturated_fat.is_none()
    }
}

/// Dish identified in a meal photo.
///
/// A missing or null `dish_name` falls back to [`UNKNOWN_DISH`]. Ingredient
/// entries the model flagged with an `error` key, or that don't parse, are
/// dropped instead of failing the whole analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DishAnalysis {
    #[serde(default = "unknown_dish", deserialize_with = "dish_name_or_unknown")]
    pub dish_name: String,
    #[serde(default, deserialize_with = "usable_ingredients")]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub macronutrients: Macronutrients,
    /// Score suggested by the model (1-10)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_score: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_explanation: Option<String>,
    #[serde(default)]
    pub health_benefits: Vec<String>,
}

fn unknown_dish() -> String {
    UNKNOWN_DISH.to_string()
}

fn dish_name_or_unknown<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let name = Option::<String>::deserialize(deserializer)?;
    Ok(name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(unknown_dish))
}

fn usable_ingredients<'de, D>(deserializer: D) -> Result<Vec<Ingredient>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(entries
        .into_iter()
        .filter_map(|entry| {
            if entry.get("error").is_some() {
                tracing::debug!(%entry, "Dropping ingredient flagged with an error");
                return None;
            }
            match serde_json::from_value::<Ingredient>(entry) {
                Ok(ingredient) => Some(ingredient),
                Err(e) => {
                    tracing::debug!("Dropping unparseable ingredient: {e}");
                    None
                }
            }
        })
        .collect())
}

impl DishAnalysis {
    /// True when nothing in the answer was recognized as a dish.
    pub fn is_blank(&self) -> bool {
        self.dish_name == UNKNOWN_DISH
            && self.ingredients.is_empty()
            && self.macronutrients.is_empty()
    }

    /// Estimated weight of the whole dish.
    pub fn total_grams(&self) -> f32 {
        self.ingredients.iter().map(Ingredient::total_grams).sum()
    }

    /// Score derived from the macronutrients rather than the model's opinion.
    pub fn computed_health_score(&self) -> f32 {
        super::health::compute_health_score(&self.macronutrients)
    }
}
