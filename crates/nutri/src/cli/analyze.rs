//! The `nutri analyze` command: identify and score the dish in a meal photo.

use clap::Args;
use nutri_core::meal::{parse_dish, DishAnalysis, FOOD_IDENTIFICATION_PROMPT};
use nutri_core::{Config, ImageOptions};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Arguments for the `analyze` command.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Meal photo to analyze
    pub image: PathBuf,

    /// MIME type of the photo (guessed from the extension by default)
    #[arg(long, value_name = "TYPE")]
    pub mime: Option<String>,

    /// Skip the image result cache for this call
    #[arg(long)]
    pub no_cache: bool,

    /// Deadline for the call in seconds (defaults to llm.timeout_secs)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

/// Printed when the model returned a usable analysis.
#[derive(Serialize)]
struct AnalyzeOutput<'a> {
    #[serde(flatten)]
    dish: &'a DishAnalysis,
    computed_health_score: f32,
    total_grams: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    tokens: Option<u32>,
}

/// Execute the analyze command.
pub async fn execute(args: AnalyzeArgs) -> anyhow::Result<()> {
    if !args.image.exists() {
        anyhow::bail!(
            "Image does not exist: {:?}\n\n  Hint: Check the file path and try again.",
            args.image
        );
    }

    let config = Config::load()?;
    let cache = if args.no_cache {
        None
    } else {
        super::open_cache(&config)
    };
    let gateway = super::build_gateway(&config, cache)?;

    let mime = args
        .mime
        .clone()
        .unwrap_or_else(|| guess_mime(&args.image).to_string());
    let mut options = ImageOptions::json().with_mime(mime);
    if let Some(secs) = args.timeout {
        options = options.with_deadline(Duration::from_secs(secs));
    }

    let response = gateway
        .ask_with_image(FOOD_IDENTIFICATION_PROMPT, &args.image, options)
        .await?;

    match parse_dish(&response) {
        Some(dish) => super::print_json(&AnalyzeOutput {
            computed_health_score: dish.computed_health_score(),
            total_grams: dish.total_grams(),
            tokens: response.tokens(),
            dish: &dish,
        }),
        None => {
            super::print_json(&response)?;
            match response.error() {
                Some(err) => anyhow::bail!("Dish analysis failed: {err}"),
                None => anyhow::bail!("Model answer did not contain a dish analysis"),
            }
        }
    }
}

/// MIME type for common photo extensions; JPEG otherwise.
fn guess_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("heic") => "image/heic",
        _ => "image/jpeg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_mime() {
        assert_eq!(guess_mime(Path::new("lunch.jpg")), "image/jpeg");
        assert_eq!(guess_mime(Path::new("lunch.JPEG")), "image/jpeg");
        assert_eq!(guess_mime(Path::new("plate.PNG")), "image/png");
        assert_eq!(guess_mime(Path::new("bowl.webp")), "image/webp");
        assert_eq!(guess_mime(Path::new("no_extension")), "image/jpeg");
    }

    #[test]
    fn test_output_flattens_dish() {
        let dish: DishAnalysis =
            serde_json::from_value(serde_json::json!({"dish_name": "Oatmeal"})).unwrap();
        let out = AnalyzeOutput {
            dish: &dish,
            computed_health_score: 5.0,
            total_grams: 0.0,
            tokens: None,
        };
        let value = serde_json::to_value(&out).unwrap();
        assert_eq!(value["dish_name"], "Oatmeal");
        assert_eq!(value["computed_health_score"], 5.0);
        assert!(value.get("tokens").is_none());
    }
}
