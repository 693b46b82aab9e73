//! Parsing of command-line choice and selection arguments.
//!
//! `--choose Science=Physics` picks an elective; `--select Physics=AP:B+`
//! selects a level and score. Levels and scores may be given by position or
//! by name. Positions are passed through unchecked so the engine can clamp.

use thiserror::Error;

use crate::catalog::{ScoreEntry, Subject};
use crate::gpa::SelectionMap;
use crate::resolver::ModuleChoices;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("invalid {flag} '{value}': expected {expected}")]
    Syntax {
        flag: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("'{0}' is not an active subject")]
    UnknownSubject(String),

    #[error("subject '{subject}' has no level '{level}'")]
    UnknownLevel { subject: String, level: String },

    #[error("subject '{subject}' has no score '{score}'")]
    UnknownScore { subject: String, score: String },
}

/// A level or score reference as typed by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexOrName {
    Index(i64),
    Name(String),
}

impl IndexOrName {
    fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            None
        } else if let Ok(idx) = s.parse::<i64>() {
            Some(IndexOrName::Index(idx))
        } else {
            Some(IndexOrName::Name(s.to_string()))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionArg {
    pub subject: String,
    pub level: Option<IndexOrName>,
    pub score: Option<IndexOrName>,
}

/// Parse "Module=Subject"
pub fn parse_choice(s: &str) -> Result<(String, String), InputError> {
    match s.split_once('=') {
        Some((module, subject)) if !module.trim().is_empty() && !subject.trim().is_empty() => {
            Ok((module.trim().to_string(), subject.trim().to_string()))
        }
        _ => Err(InputError::Syntax {
            flag: "--choose",
            value: s.to_string(),
            expected: "MODULE=SUBJECT",
        }),
    }
}

/// Parse "Subject=LEVEL:SCORE", "Subject=LEVEL" or "Subject=:SCORE".
///
/// The level/score split happens at the last ':' so level names may contain colons.
pub fn parse_selection(s: &str) -> Result<SelectionArg, InputError> {
    let syntax = || InputError::Syntax {
        flag: "--select",
        value: s.to_string(),
        expected: "SUBJECT=LEVEL:SCORE",
    };

    let (subject, rest) = s.split_once('=').ok_or_else(syntax)?;
    let subject = subject.trim();
    if subject.is_empty() {
        return Err(syntax());
    }

    let (level, score) = match rest.rsplit_once(':') {
        Some((level, score)) => (IndexOrName::parse(level), IndexOrName::parse(score)),
        None => (IndexOrName::parse(rest), None),
    };
    if level.is_none() && score.is_none() {
        return Err(syntax());
    }

    Ok(SelectionArg {
        subject: subject.to_string(),
        level,
        score,
    })
}

/// Collect parsed choices into [`ModuleChoices`]
pub fn build_choices(args: &[String]) -> Result<ModuleChoices, InputError> {
    let mut choices = ModuleChoices::new();
    for arg in args {
        let (module, subject) = parse_choice(arg)?;
        choices.pick(&module, &subject);
    }
    Ok(choices)
}

/// Resolve parsed selections against the active subjects.
///
/// Names are looked up in the subject's levels and effective score map;
/// later arguments for the same subject override earlier ones field by field.
pub fn build_selections(
    args: &[SelectionArg],
    active_subjects: &[Subject],
    common_score_map: &[ScoreEntry],
) -> Result<SelectionMap, InputError> {
    let mut selections = SelectionMap::new();

    for arg in args {
        let subject = active_subjects
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(&arg.subject))
            .ok_or_else(|| InputError::UnknownSubject(arg.subject.clone()))?;

        if let Some(ref level) = arg.level {
            let idx = match level {
                IndexOrName::Index(i) => *i,
                IndexOrName::Name(name) => {
                    subject
                        .level_index(name)
                        .ok_or_else(|| InputError::UnknownLevel {
                            subject: subject.name.clone(),
                            level: name.clone(),
                        })? as i64
                }
            };
            selections.set_level(&subject.name, idx);
        }

        if let Some(ref score) = arg.score {
            let idx = match score {
                IndexOrName::Index(i) => *i,
                IndexOrName::Name(name) => {
                    subject
                        .score_index(name, common_score_map)
                        .ok_or_else(|| InputError::UnknownScore {
                            subject: subject.name.clone(),
                            score: name.clone(),
                        })? as i64
                }
            };
            selections.set_score(&subject.name, idx);
        }
    }

    Ok(selections)
}
