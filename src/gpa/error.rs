use thiserror::Error;

/// Malformed preset data detected while computing a GPA.
///
/// Out-of-range selections are never reported here; they are clamped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("subject '{subject}' has no score options (its score map and the common score map are both empty)")]
    EmptyScoreMap { subject: String },

    #[error("subject '{subject}' has no levels")]
    NoLevels { subject: String },
}

impl ConfigError {
    pub fn subject(&self) -> &str {
        match self {
            ConfigError::EmptyScoreMap { subject } | ConfigError::NoLevels { subject } => subject,
        }
    }
}
