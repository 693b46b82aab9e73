use serde::{Deserialize, Serialize};

pub const DEFAULT_DECIMALS: usize = 3;

/// How a selected score is shown in the breakdown
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScoreDisplay {
    /// Letter grade, e.g. "B+"
    #[default]
    Letter,
    /// Percentage band, e.g. "87-89"
    Percentage,
}

/// User configuration.
///
/// Example YAML:
/// ```yaml
/// data: ~/grades/presets.json
/// preset: sample-hs
/// decimals: 2
/// log_level: info
/// score_display: percentage
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Path to the preset dataset (JSON or YAML)
    #[serde(default)]
    pub data: Option<String>,

    /// Preset used when none is given on the command line
    #[serde(default)]
    pub preset: Option<String>,

    /// Decimal places when printing a GPA (default: 3)
    #[serde(default)]
    pub decimals: Option<usize>,

    /// Tracing filter used when RUST_LOG is not set, e.g. "info" or "gpa_calc=debug"
    #[serde(default)]
    pub log_level: Option<String>,

    /// Score column in the breakdown: "letter" (default) or "percentage"
    #[serde(default)]
    pub score_display: Option<ScoreDisplay>,
}

impl Config {
    pub fn decimals(&self) -> usize {
        self.decimals.unwrap_or(DEFAULT_DECIMALS)
    }

    pub fn score_display(&self) -> ScoreDisplay {
        self.score_display.unwrap_or_default()
    }
}
