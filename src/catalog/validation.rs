use std::collections::HashSet;

use super::types::{Catalog, ModuleKind, ScoreEntry, Subject};

/// Validate a preset dataset after loading.
/// Returns all validation errors at once (not just the first).
pub fn validate_catalog(catalog: &Catalog) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if catalog.common_score_map.is_empty() {
        errors.push("commonScoreMap: must contain at least one entry".to_string());
    }
    validate_score_map("commonScoreMap", &catalog.common_score_map, &mut errors);

    if catalog.presets.is_empty() {
        errors.push("presets: must contain at least one preset".to_string());
    }

    let mut seen_ids = HashSet::new();
    for (p, preset) in catalog.presets.iter().enumerate() {
        let path = format!("presets[{}]", p);

        if preset.id.trim().is_empty() {
            errors.push(format!("{}.id: must not be empty", path));
        } else if !seen_ids.insert(preset.id.as_str()) {
            errors.push(format!("{}.id: duplicate preset id '{}'", path, preset.id));
        }

        // Subjects share a selection key by name, so names must be unique per preset
        let mut seen_subjects = HashSet::new();
        // Choices address modules by key, case-insensitively
        let mut seen_modules = HashSet::new();

        for (m, (key, module)) in preset.keyed_modules().enumerate() {
            let module_path = format!("{}.modules[{}]", path, m);

            if !seen_modules.insert(key.to_ascii_lowercase()) {
                errors.push(format!(
                    "{}.name: duplicate module key '{}' in preset '{}'",
                    module_path, key, preset.id
                ));
            }

            if module.kind == ModuleKind::Choice && module.selection_limit == Some(0) {
                errors.push(format!(
                    "{}.selectionLimit: must be at least 1",
                    module_path
                ));
            }

            for (s, subject) in module.subjects.iter().enumerate() {
                let subject_path = format!("{}.subjects[{}]", module_path, s);
                validate_subject(&subject_path, subject, &mut errors);

                if !seen_subjects.insert(subject.name.to_lowercase()) {
                    errors.push(format!(
                        "{}.name: duplicate subject '{}' in preset '{}'",
                        subject_path, subject.name, preset.id
                    ));
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_subject(path: &str, subject: &Subject, errors: &mut Vec<String>) {
    if !subject.weight.is_finite() {
        errors.push(format!("{}.weight: must be a finite number", path));
    } else if subject.weight < 0.0 {
        errors.push(format!("{}.weight: must be non-negative", path));
    }

    if subject.levels.is_empty() {
        errors.push(format!(
            "{}.levels: subject '{}' must have at least one level",
            path, subject.name
        ));
    }

    for (l, level) in subject.levels.iter().enumerate() {
        if !level.offset.is_finite() {
            errors.push(format!("{}.levels[{}].offset: must be a finite number", path, l));
        }
        if let Some(weight) = level.weight_override {
            if !weight.is_finite() {
                errors.push(format!(
                    "{}.levels[{}].weightOverride: must be a finite number",
                    path, l
                ));
            }
        }
    }

    if let Some(ref map) = subject.custom_score_map {
        validate_score_map(
            &format!("{}.customScoreToBaseGPAMap", path),
            map,
            errors,
        );
    }
}

fn validate_score_map(path: &str, map: &[ScoreEntry], errors: &mut Vec<String>) {
    for (i, entry) in map.iter().enumerate() {
        if !entry.base_gpa.is_finite() {
            errors.push(format!("{}[{}].baseGPA: must be a finite number", path, i));
        }
    }
}
