//! Deterministic health score for a dish.

use super::analysis::Macronutrients;

/// Score returned when the model reported no macronutrients.
pub const NEUTRAL_SCORE: f32 = 5.0;

const PROTEIN_WEIGHT: f32 = 0.4;
const FIBER_WEIGHT: f32 = 0.3;
const FAT_QUALITY_WEIGHT: f32 = 0.3;

/// Score a dish from 0 (least healthy) to 10, rounded to one decimal.
///
/// Three components, each on a 0-10 scale:
/// - protein share of calories (4 kcal per gram of protein)
/// - fiber per gram of carbohydrate
/// - saturated share of total fat, inverted
///
/// The weighted sum is scaled down for dishes above 1000 kcal, never below
/// half. Missing values count as zero; an entirely empty set of
/// macronutrients yields [`NEUTRAL_SCORE`].
pub fn compute_health_score(macros: &Macronutrients) -> f32 {
    if macros.is_empty() {
        return NEUTRAL_SCORE;
    }

    let calories = macros.calories.unwrap_or(0.0).max(1.0);
    let protein = macros.protein.unwrap_or(0.0);
    let carbs = macros.carbs.unwrap_or(0.0).max(1.0);
    let fat = macros.fat.unwrap_or(0.0).max(1.0);
    let fiber = macros.fiber.unwrap_or(0.0);
    let saturated = macros.saturated_fat.unwrap_or(0.0);

    let protein_score = ((protein * 4.0 / calories) * 50.0).min(10.0);
    let fiber_score = ((fiber / carbs) * 30.0).min(10.0);
    let fat_quality_score = (10.0 - (saturated / fat) * 15.0).max(0.0);

    let calorie_factor = (1000.0 / calories).clamp(0.5, 1.0);

    let score = (protein_score * PROTEIN_WEIGHT
        + fiber_score * FIBER_WEIGHT
        + fat_quality_score * FAT_QUALITY_WEIGHT)
        * calorie_factor;

    (score.clamp(0.0, 10.0) * 10.0).round() / 10.0
}
