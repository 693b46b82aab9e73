pub mod types;
pub mod validation;

pub use types::{Catalog, Level, Module, ModuleKind, Preset, ScoreEntry, Subject};
pub use validation::validate_catalog;

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Load a preset dataset from disk
///
/// Files ending in `.yaml` or `.yml` are parsed as YAML, everything else as JSON.
///
/// # Errors
///
/// Returns an error if:
/// - The file does not exist
/// - The file cannot be read
/// - The contents do not match the dataset shape
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    if !path.exists() {
        anyhow::bail!("Preset data file not found at {}", path.display());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read preset data at {}", path.display()))?;

    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

    let catalog = if is_yaml {
        Catalog::from_yaml_str(&content)
            .with_context(|| format!("Failed to parse preset data: invalid YAML in {}", path.display()))?
    } else {
        Catalog::from_json_str(&content)
            .with_context(|| format!("Failed to parse preset data: invalid JSON in {}", path.display()))?
    };

    tracing::debug!(
        path = %path.display(),
        presets = catalog.presets.len(),
        "loaded preset data"
    );

    Ok(catalog)
}
