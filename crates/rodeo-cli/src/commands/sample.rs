//! Sample command - preview predicted values for one table.

use std::path::PathBuf;
use std::sync::Arc;

use colored::Colorize;
use rodeo::predict::{AnnotationCache, CachedAnnotator, VisionClient};
use rodeo::{PredictorRegistry, Rodeo, RodeoConfig};
use tracing::warn;

#[allow(clippy::too_many_arguments)]
pub fn run(
    root: PathBuf,
    table: String,
    no_vision: bool,
    cache: PathBuf,
    out_dir: PathBuf,
    rows: usize,
    _verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !root.exists() {
        return Err(format!("Directory not found: {}", root.display()).into());
    }

    let annotator = if no_vision {
        None
    } else {
        match VisionClient::from_env() {
            Ok(client) => Some(Arc::new(CachedAnnotator::new(
                client,
                AnnotationCache::open(&cache)?,
            ))),
            Err(e) => {
                warn!(error = %e, "vision disabled; image fields will be placeholders");
                None
            }
        }
    };

    let registry = match &annotator {
        Some(a) => PredictorRegistry::with_image_annotator(a.clone()),
        None => PredictorRegistry::new(),
    };

    let rodeo = Rodeo::with_config(RodeoConfig::default().with_preview_rows(rows))
        .with_registry(registry);
    let catalog = rodeo.wrangle(&root)?;

    let preview = rodeo.sample_predictions(&catalog, &table);

    // Keep whatever was annotated, even if the preview itself failed.
    if let Some(a) = &annotator {
        a.flush()?;
    }

    let Some(preview) = preview? else {
        println!(
            "{} table '{}' has no predictor to sample",
            "Nothing to preview:".yellow().bold(),
            table
        );
        return Ok(());
    };

    println!("{} {}", "Sample predictions for".cyan().bold(), table.white());
    println!();
    print!("{}", preview.render());

    let path = preview.write_to(&out_dir)?;
    println!();
    println!("{} {}", "Wrote".green().bold(), path.display());

    Ok(())
}
