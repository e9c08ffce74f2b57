//! Prompts sent with meal photos.

/// Asks a vision model to identify a dish and return its analysis as JSON.
///
/// The requested keys match [`DishAnalysis`](super::DishAnalysis).
pub const FOOD_IDENTIFICATION_PROMPT: &str = r#"You will receive a photo of a food dish.

1. Name the dish in English, even when it comes from another cuisine.

2. List the main ingredients. Skip negligible items such as seasonings, spices or garnishes.
   For each ingredient estimate:
   - portion_count: how many portions are visible
   - grams: the weight of one portion, as an integer

3. Estimate the macronutrients of the whole dish:
   - calories (kcal)
   - protein, carbs, fats, fibers, saturated_fats (grams)

4. Give a health score from 1 to 10 (10 is the healthiest) with a short explanation.

5. List 3 to 5 health benefits of the dish.

Answer with JSON only, using exactly this shape:

```json
{
  "dish_name": "Chicken Caesar Salad",
  "ingredients": [
    {"name": "chicken breast", "portion_count": 1, "grams": 100},
    {"name": "romaine lettuce", "portion_count": 1, "grams": 60},
    {"name": "parmesan", "portion_count": 1, "grams": 15}
  ],
  "macronutrients": {
    "calories": 320,
    "protein": 25,
    "carbs": 15,
    "fats": 18,
    "fibers": 3,
    "saturated_fats": 6
  },
  "health_score": 8,
  "health_explanation": "High in protein with leafy greens; the dressing adds saturated fat.",
  "health_benefits": [
    "High in protein for muscle maintenance",
    "Vitamin K from leafy greens",
    "Calcium from cheese"
  ]
}
```"#;
