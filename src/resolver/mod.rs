//! Turns a preset plus the user's elective picks into the ordered list of
//! subjects that count toward the GPA.

use std::collections::HashMap;

use thiserror::Error;

use crate::catalog::{ModuleKind, Preset, Subject};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("preset has no module '{module}'")]
    UnknownModule { module: String },

    #[error("module '{module}' has no subject '{subject}'")]
    UnknownSubject { module: String, subject: String },

    #[error("module '{module}' allows at most {limit} subject(s), {picked} picked")]
    SelectionLimitExceeded {
        module: String,
        limit: usize,
        picked: usize,
    },

    #[error("subject '{subject}' has no levels")]
    NoLevels { subject: String },
}

/// Subjects picked from each choice module, keyed by module key
/// (see [`crate::catalog::Module::key`]).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleChoices {
    picks: HashMap<String, Vec<String>>,
}

impl ModuleChoices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored key matching `module`, ignoring ASCII case
    fn existing_key(&self, module: &str) -> Option<&String> {
        let module = module.trim();
        self.picks.keys().find(|k| k.eq_ignore_ascii_case(module))
    }

    fn entry(&mut self, module: &str) -> &mut Vec<String> {
        let key = self
            .existing_key(module)
            .cloned()
            .unwrap_or_else(|| module.trim().to_string());
        self.picks.entry(key).or_default()
    }

    /// Record a pick. Picking the same subject twice has no extra effect.
    pub fn pick(&mut self, module: &str, subject: &str) {
        let picks = self.entry(module);
        if !picks.iter().any(|p| p.eq_ignore_ascii_case(subject)) {
            picks.push(subject.to_string());
        }
    }

    /// Replace all picks for one module
    pub fn set(&mut self, module: &str, subjects: Vec<String>) {
        *self.entry(module) = subjects;
    }

    /// Picks for `module`; module keys match case-insensitively
    pub fn get(&self, module: &str) -> Option<&[String]> {
        self.existing_key(module)
            .and_then(|k| self.picks.get(k))
            .map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }
}

/// Resolve the active subjects of `preset`.
///
/// Modules contribute in declaration order. Core modules contribute every
/// subject; choice modules contribute the picked subjects in the module's own
/// order, or the first `selection_limit` subjects when nothing was picked.
pub fn resolve_active_subjects(
    preset: &Preset,
    choices: &ModuleChoices,
) -> Result<Vec<Subject>, ResolveError> {
    // Every choice must point at a module of this preset
    for module_key in choices.picks.keys() {
        if !preset
            .keyed_modules()
            .any(|(key, _)| key.eq_ignore_ascii_case(module_key))
        {
            return Err(ResolveError::UnknownModule {
                module: module_key.clone(),
            });
        }
    }

    let mut active = Vec::new();

    for (key, module) in preset.keyed_modules() {
        match module.kind {
            ModuleKind::Core => active.extend(module.subjects.iter().cloned()),
            ModuleKind::Choice => {
                let limit = module.selection_limit.unwrap_or(module.subjects.len());

                match choices.get(&key) {
                    Some(picks) => {
                        let mut picked: Vec<&str> = Vec::new();
                        for name in picks {
                            let subject = module.subject(name).ok_or_else(|| {
                                ResolveError::UnknownSubject {
                                    module: key.clone(),
                                    subject: name.clone(),
                                }
                            })?;
                            if !picked.contains(&subject.name.as_str()) {
                                picked.push(subject.name.as_str());
                            }
                        }

                        if picked.len() > limit {
                            return Err(ResolveError::SelectionLimitExceeded {
                                module: key,
                                limit,
                                picked: picked.len(),
                            });
                        }

                        active.extend(
                            module
                                .subjects
                                .iter()
                                .filter(|s| picked.contains(&s.name.as_str()))
                                .cloned(),
                        );
                    }
                    None => {
                        tracing::debug!(
                            module = %key,
                            limit,
                            "no picks recorded, using leading subjects"
                        );
                        active.extend(module.subjects.iter().take(limit).cloned());
                    }
                }
            }
        }
    }

    if let Some(subject) = active.iter().find(|s| s.levels.is_empty()) {
        return Err(ResolveError::NoLevels {
            subject: subject.name.clone(),
        });
    }

    tracing::debug!(
        preset = %preset.id,
        subjects = active.len(),
        "resolved active subjects"
    );

    Ok(active)
}
