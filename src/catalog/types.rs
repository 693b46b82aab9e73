use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// One achievable score tier and its uncurved GPA value.
///
/// Entries form an ordered list; the position of an entry is the score index
/// used by selections (index 0 is usually the best score).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ScoreEntry {
    #[serde(rename = "percentageName")]
    pub percentage_name: String,

    #[serde(rename = "letterName")]
    pub letter_name: String,

    #[serde(rename = "baseGPA")]
    pub base_gpa: f64,
}

impl ScoreEntry {
    pub fn new(percentage_name: &str, letter_name: &str, base_gpa: f64) -> Self {
        Self {
            percentage_name: percentage_name.to_string(),
            letter_name: letter_name.to_string(),
            base_gpa,
        }
    }

    /// True when `name` matches either the letter or the percentage label (case-insensitive)
    pub fn matches_name(&self, name: &str) -> bool {
        let name = name.trim();
        self.letter_name.eq_ignore_ascii_case(name) || self.percentage_name.eq_ignore_ascii_case(name)
    }
}

/// Difficulty tier of a subject.
///
/// `offset` is a penalty in GPA units, measured against the subject's easiest
/// level. `weight_override` replaces the subject weight for the points side of
/// the average only; credits always use the subject weight.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Level {
    pub name: String,

    #[serde(default)]
    pub offset: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_override: Option<f64>,
}

impl Level {
    pub fn new(name: &str, offset: f64) -> Self {
        Self {
            name: name.to_string(),
            offset,
            weight_override: None,
        }
    }

    pub fn with_weight_override(mut self, weight: f64) -> Self {
        self.weight_override = Some(weight);
        self
    }
}

/// A course counted toward the GPA.
///
/// Example JSON:
/// ```json
/// {
///   "name": "Mathematics",
///   "weight": 1.0,
///   "levels": [
///     { "name": "AP", "offset": 0.0 },
///     { "name": "Regular", "offset": 1.0 }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Subject {
    pub name: String,

    pub weight: f64,

    pub levels: Vec<Level>,

    /// Subject-specific score map; when absent (or empty) the dataset's common map applies
    #[serde(
        rename = "customScoreToBaseGPAMap",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub custom_score_map: Option<Vec<ScoreEntry>>,
}

impl Subject {
    pub fn new(name: &str, weight: f64, levels: Vec<Level>) -> Self {
        Self {
            name: name.to_string(),
            weight,
            levels,
            custom_score_map: None,
        }
    }

    pub fn with_score_map(mut self, map: Vec<ScoreEntry>) -> Self {
        self.custom_score_map = Some(map);
        self
    }

    /// The score map selections index into: the custom map if non-empty, else `common`
    pub fn effective_score_map<'a>(&'a self, common: &'a [ScoreEntry]) -> &'a [ScoreEntry] {
        match self.custom_score_map.as_deref() {
            Some(custom) if !custom.is_empty() => custom,
            _ => common,
        }
    }

    /// Lowest offset across all levels, the subject's difficulty floor
    pub fn min_offset(&self) -> Option<f64> {
        self.levels.iter().map(|l| l.offset).reduce(f64::min)
    }

    /// Position of the level called `name` (case-insensitive)
    pub fn level_index(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.levels
            .iter()
            .position(|l| l.name.eq_ignore_ascii_case(name))
    }

    /// Position of the score tier labelled `name` in the subject's effective map
    pub fn score_index(&self, name: &str, common: &[ScoreEntry]) -> Option<usize> {
        self.effective_score_map(common)
            .iter()
            .position(|e| e.matches_name(name))
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    /// Every subject is always active
    Core,
    /// The user picks up to `selection_limit` subjects
    Choice,
}

/// Grouping of subjects inside a preset.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    #[serde(rename = "type")]
    pub kind: ModuleKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection_limit: Option<usize>,

    #[serde(default)]
    pub subjects: Vec<Subject>,
}

impl Module {
    /// Identity used to address this module in choices.
    /// Named modules use their name; unnamed ones use their 1-based position.
    pub fn key(&self, position: usize) -> String {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => format!("module-{}", position + 1),
        }
    }

    pub fn subject(&self, name: &str) -> Option<&Subject> {
        let name = name.trim();
        self.subjects
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }
}

/// A named curriculum.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Preset {
    pub id: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,

    #[serde(default)]
    pub modules: Vec<Module>,
}

impl Preset {
    /// Module keys paired with modules, in declaration order
    pub fn keyed_modules(&self) -> impl Iterator<Item = (String, &Module)> {
        self.modules
            .iter()
            .enumerate()
            .map(|(i, m)| (m.key(i), m))
    }
}

/// Root of a preset dataset file.
///
/// Example YAML:
/// ```yaml
/// commonScoreMap:
///   - { percentageName: "90-100", letterName: "A", baseGPA: 4.0 }
///   - { percentageName: "80-89", letterName: "B", baseGPA: 3.0 }
/// presets:
///   - id: demo
///     name: Demo School
///     modules:
///       - type: core
///         subjects:
///           - name: Mathematics
///             weight: 1
///             levels: [{ name: Regular, offset: 0 }]
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    #[serde(default)]
    pub common_score_map: Vec<ScoreEntry>,

    #[serde(default)]
    pub presets: Vec<Preset>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

impl Catalog {
    pub fn from_json_str(s: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_yaml_str(s: &str) -> anyhow::Result<Self> {
        Ok(serde_saphyr::from_str(s)?)
    }

    pub fn find_preset(&self, id: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.id == id)
    }

    /// Matching preset, or the first one when `id` is absent or no longer present
    pub fn preset_or_first(&self, id: Option<&str>) -> Option<&Preset> {
        id.and_then(|id| self.find_preset(id))
            .or_else(|| self.presets.first())
    }

    /// `lastUpdated` as a timestamp, if it is valid RFC 3339
    pub fn last_updated(&self) -> Option<DateTime<FixedOffset>> {
        self.last_updated
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok())
    }
}
