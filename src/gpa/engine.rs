use super::error::ConfigError;
use super::selection::{clamp_index, SelectionMap};
use crate::catalog::{ScoreEntry, Subject};

#[derive(Debug, Clone, PartialEq)]
pub struct SubjectContribution {
    pub subject: String,
    pub level_idx: usize,
    pub level: String,         // e.g. "AP", "Regular"
    pub score_idx: usize,
    pub letter: String,        // e.g. "A-"
    pub percentage: String,    // e.g. "90-92"
    pub base_gpa: f64,         // Uncurved GPA of the selected score
    pub effective_offset: f64, // Selected level offset minus the subject's easiest offset
    pub subject_gpa: f64,      // base_gpa - effective_offset, floored at zero
    pub points_weight: f64,    // Level override or subject weight
    pub credits_weight: f64,   // Always the subject weight
    pub level_clamped: bool,
    pub score_clamped: bool,
}

impl SubjectContribution {
    pub fn points(&self) -> f64 {
        self.subject_gpa * self.points_weight
    }

    pub fn clamped(&self) -> bool {
        self.level_clamped || self.score_clamped
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GpaResult {
    pub gpa: f64,
    pub total_weighted_points: f64,
    pub total_weight: f64,
    /// One entry per active subject, in input order
    pub breakdown: Vec<SubjectContribution>,
}

/// Compute the weighted GPA for a resolved list of active subjects.
///
/// Missing selections default to the first level and first score; indices out
/// of range are clamped. A zero total weight yields 0. The only failures are
/// malformed subjects: no levels, or no score options at all.
pub fn compute_gpa(
    active_subjects: &[Subject],
    selections: &SelectionMap,
    common_score_map: &[ScoreEntry],
) -> Result<GpaResult, ConfigError> {
    let mut total_weighted_points = 0.0;
    let mut total_weight = 0.0;
    let mut breakdown = Vec::with_capacity(active_subjects.len());

    for subject in active_subjects {
        let contribution = contribute(subject, selections, common_score_map)?;

        tracing::debug!(
            subject = %contribution.subject,
            level_name = %contribution.level,
            score = %contribution.letter,
            base_gpa = contribution.base_gpa,
            effective_offset = contribution.effective_offset,
            subject_gpa = contribution.subject_gpa,
            points_weight = contribution.points_weight,
            credits_weight = contribution.credits_weight,
            "subject contribution"
        );

        total_weighted_points += contribution.points();
        total_weight += contribution.credits_weight;
        breakdown.push(contribution);
    }

    // Zero active subjects or all-zero weights
    let gpa = if total_weight > 0.0 {
        total_weighted_points / total_weight
    } else {
        0.0
    };

    Ok(GpaResult {
        gpa,
        total_weighted_points,
        total_weight,
        breakdown,
    })
}

/// Like [`compute_gpa`] but returns only the GPA value
pub fn calculate_gpa(
    active_subjects: &[Subject],
    selections: &SelectionMap,
    common_score_map: &[ScoreEntry],
) -> Result<f64, ConfigError> {
    compute_gpa(active_subjects, selections, common_score_map).map(|r| r.gpa)
}

fn contribute(
    subject: &Subject,
    selections: &SelectionMap,
    common_score_map: &[ScoreEntry],
) -> Result<SubjectContribution, ConfigError> {
    let min_offset = subject.min_offset().ok_or_else(|| ConfigError::NoLevels {
        subject: subject.name.clone(),
    })?;

    let score_map = subject.effective_score_map(common_score_map);
    if score_map.is_empty() {
        return Err(ConfigError::EmptyScoreMap {
            subject: subject.name.clone(),
        });
    }

    let selection = selections.selection_for(&subject.name);
    let (level_idx, level_clamped) = clamp_index(selection.level_idx, subject.levels.len());
    let (score_idx, score_clamped) = clamp_index(selection.score_idx, score_map.len());

    if level_clamped || score_clamped {
        tracing::debug!(
            subject = %subject.name,
            requested_level = selection.level_idx,
            requested_score = selection.score_idx,
            level_idx,
            score_idx,
            "selection out of range, clamped"
        );
    }

    let level = &subject.levels[level_idx];
    let entry = &score_map[score_idx];

    let effective_offset = (level.offset - min_offset).max(0.0);
    let subject_gpa = (entry.base_gpa - effective_offset).max(0.0);

    Ok(SubjectContribution {
        subject: subject.name.clone(),
        level_idx,
        level: level.name.clone(),
        score_idx,
        letter: entry.letter_name.clone(),
        percentage: entry.percentage_name.clone(),
        base_gpa: entry.base_gpa,
        effective_offset,
        subject_gpa,
        points_weight: level.weight_override.unwrap_or(subject.weight),
        credits_weight: subject.weight,
        level_clamped,
        score_clamped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Level;
    use crate::gpa::Selection;

    fn map(gpas: &[f64]) -> Vec<ScoreEntry> {
        gpas.iter()
            .enumerate()
            .map(|(i, g)| ScoreEntry::new(&format!("tier {}", i), &format!("L{}", i), *g))
            .collect()
    }

    fn subject(name: &str, weight: f64, offsets: &[f64]) -> Subject {
        let levels = offsets
            .iter()
            .enumerate()
            .map(|(i, o)| Level::new(&format!("level {}", i), *o))
            .collect();
        Subject::new(name, weight, levels)
    }

    fn select(pairs: &[(&str, i64, i64)]) -> SelectionMap {
        pairs
            .iter()
            .map(|(name, l, s)| (name.to_string(), Selection::new(*l, *s)))
            .collect()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_no_subjects_is_zero() {
        let result = compute_gpa(&[], &SelectionMap::new(), &map(&[4.0])).unwrap();
        assert_eq!(result.gpa, 0.0);
        assert!(result.breakdown.is_empty());
    }

    #[test]
    fn test_all_zero_weights_is_zero() {
        let subjects = vec![subject("A", 0.0, &[0.0]), subject("B", 0.0, &[0.0])];
        let gpa = calculate_gpa(&subjects, &SelectionMap::new(), &map(&[4.0])).unwrap();
        assert_eq!(gpa, 0.0);
        assert!(!gpa.is_nan());
    }

    #[test]
    fn test_single_subject_top_score() {
        let subjects = vec![subject("Math", 4.0, &[0.0])];
        let selections = select(&[("Math", 0, 0)]);
        let gpa = calculate_gpa(&subjects, &selections, &map(&[4.0, 3.0])).unwrap();
        assert_eq!(gpa, 4.0);
    }

    #[test]
    fn test_equal_weights_average() {
        let subjects = vec![subject("A", 3.0, &[0.0]), subject("B", 3.0, &[0.0])];
        let common = map(&[4.0, 3.0, 2.0]);
        let selections = select(&[("A", 0, 0), ("B", 0, 2)]);
        let result = compute_gpa(&subjects, &selections, &common).unwrap();
        assert!(approx(result.gpa, 3.0));
        assert!(approx(result.total_weighted_points, 18.0));
        assert!(approx(result.total_weight, 6.0));
    }

    #[test]
    fn test_harder_level_offset_subtracted() {
        let subjects = vec![subject("Physics", 1.0, &[0.0, 2.0])];
        let selections = select(&[("Physics", 1, 0)]);
        let result = compute_gpa(&subjects, &selections, &map(&[4.0])).unwrap();
        let c = &result.breakdown[0];
        assert_eq!(c.effective_offset, 2.0);
        assert_eq!(c.subject_gpa, 2.0);
        assert_eq!(result.gpa, 2.0);
    }

    #[test]
    fn test_easiest_level_has_no_offset() {
        // Absolute offsets don't matter, only the distance from the easiest level
        let subjects = vec![subject("Physics", 1.0, &[5.0, 6.0, 7.0])];
        let selections = select(&[("Physics", 0, 0)]);
        let result = compute_gpa(&subjects, &selections, &map(&[3.5])).unwrap();
        assert_eq!(result.breakdown[0].effective_offset, 0.0);
        assert_eq!(result.gpa, 3.5);
    }

    #[test]
    fn test_easiest_level_need_not_be_first() {
        let subjects = vec![subject("Physics", 1.0, &[1.0, 0.0, 2.0])];
        let common = map(&[4.0]);

        let first = compute_gpa(&subjects, &select(&[("Physics", 0, 0)]), &common).unwrap();
        assert_eq!(first.breakdown[0].effective_offset, 1.0);
        assert_eq!(first.gpa, 3.0);

        let second = compute_gpa(&subjects, &select(&[("Physics", 1, 0)]), &common).unwrap();
        assert_eq!(second.gpa, 4.0);
    }

    #[test]
    fn test_subject_gpa_floors_at_zero() {
        let subjects = vec![subject("Physics", 1.0, &[0.0, 3.0])];
        let selections = select(&[("Physics", 1, 1)]);
        let result = compute_gpa(&subjects, &selections, &map(&[4.0, 1.0])).unwrap();
        assert_eq!(result.breakdown[0].subject_gpa, 0.0);
        assert_eq!(result.gpa, 0.0);
    }

    #[test]
    fn test_level_index_clamped_high() {
        let subjects = vec![subject("Physics", 1.0, &[0.0, 1.0])];
        let common = map(&[4.0]);
        let clamped = compute_gpa(&subjects, &select(&[("Physics", 99, 0)]), &common).unwrap();
        let exact = compute_gpa(&subjects, &select(&[("Physics", 1, 0)]), &common).unwrap();
        assert_eq!(clamped.gpa, exact.gpa);
        assert_eq!(clamped.breakdown[0].level_idx, 1);
        assert!(clamped.breakdown[0].level_clamped);
        assert!(!exact.breakdown[0].clamped());
    }

    #[test]
    fn test_negative_indices_clamped_to_zero() {
        let subjects = vec![subject("Physics", 1.0, &[0.0, 1.0])];
        let result =
            compute_gpa(&subjects, &select(&[("Physics", -3, -1)]), &map(&[4.0, 2.0])).unwrap();
        let c = &result.breakdown[0];
        assert_eq!((c.level_idx, c.score_idx), (0, 0));
        assert!(c.level_clamped && c.score_clamped);
        assert_eq!(result.gpa, 4.0);
    }

    #[test]
    fn test_score_index_clamped_high() {
        let subjects = vec![subject("Math", 1.0, &[0.0])];
        let result = compute_gpa(&subjects, &select(&[("Math", 0, 42)]), &map(&[4.0, 3.0, 1.0]))
            .unwrap();
        assert_eq!(result.breakdown[0].score_idx, 2);
        assert_eq!(result.gpa, 1.0);
    }

    #[test]
    fn test_missing_selection_uses_first_level_and_score() {
        let subjects = vec![subject("Math", 1.0, &[0.0, 1.0])];
        let result = compute_gpa(&subjects, &SelectionMap::new(), &map(&[4.0, 3.0])).unwrap();
        let c = &result.breakdown[0];
        assert_eq!((c.level_idx, c.score_idx), (0, 0));
        assert!(!c.clamped());
        assert_eq!(result.gpa, 4.0);
    }

    #[test]
    fn test_weight_override_zero_keeps_credits() {
        let audit = Subject::new(
            "Project",
            2.0,
            vec![
                Level::new("Credit", 0.0),
                Level::new("Audit", 0.0).with_weight_override(0.0),
            ],
        );
        let subjects = vec![subject("Math", 2.0, &[0.0]), audit];
        let selections = select(&[("Math", 0, 0), ("Project", 1, 0)]);
        let result = compute_gpa(&subjects, &selections, &map(&[4.0])).unwrap();

        assert_eq!(result.breakdown[1].points(), 0.0);
        assert_eq!(result.breakdown[1].credits_weight, 2.0);
        assert!(approx(result.total_weight, 4.0));
        // (4*2 + 0) / (2 + 2)
        assert!(approx(result.gpa, 2.0));
    }

    #[test]
    fn test_weight_override_only_affects_points() {
        let hl = Subject::new(
            "Physics",
            1.0,
            vec![Level::new("HL", 0.0).with_weight_override(1.5)],
        );
        let result = compute_gpa(&[hl], &SelectionMap::new(), &map(&[4.0])).unwrap();
        assert!(approx(result.total_weighted_points, 6.0));
        assert!(approx(result.total_weight, 1.0));
        assert!(approx(result.gpa, 6.0));
    }

    #[test]
    fn test_custom_score_map_preferred() {
        let pass_fail = subject("Seminar", 1.0, &[0.0])
            .with_score_map(vec![ScoreEntry::new("Pass", "P", 3.0)]);
        let result = compute_gpa(&[pass_fail], &SelectionMap::new(), &map(&[4.0])).unwrap();
        assert_eq!(result.breakdown[0].letter, "P");
        assert_eq!(result.gpa, 3.0);
    }

    #[test]
    fn test_empty_custom_map_falls_back_to_common() {
        let seminar = subject("Seminar", 1.0, &[0.0]).with_score_map(vec![]);
        let gpa = calculate_gpa(&[seminar], &SelectionMap::new(), &map(&[3.7])).unwrap();
        assert_eq!(gpa, 3.7);
    }

    #[test]
    fn test_empty_score_map_is_config_error() {
        let subjects = vec![subject("Math", 1.0, &[0.0])];
        let err = compute_gpa(&subjects, &SelectionMap::new(), &[]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::EmptyScoreMap {
                subject: "Math".to_string()
            }
        );
        assert!(err.to_string().contains("Math"));
    }

    #[test]
    fn test_subject_without_levels_is_config_error() {
        let subjects = vec![subject("Math", 1.0, &[0.0]), Subject::new("Art", 1.0, vec![])];
        let err = compute_gpa(&subjects, &SelectionMap::new(), &map(&[4.0])).unwrap_err();
        assert_eq!(err.subject(), "Art");
        assert!(matches!(err, ConfigError::NoLevels { .. }));
    }

    #[test]
    fn test_first_config_error_in_input_order_wins() {
        let subjects = vec![
            Subject::new("Broken", 1.0, vec![]),
            subject("Also Broken", 1.0, &[0.0]),
        ];
        let err = compute_gpa(&subjects, &SelectionMap::new(), &[]).unwrap_err();
        assert_eq!(err.subject(), "Broken");
    }

    #[test]
    fn test_repeated_calls_identical() {
        let subjects = vec![subject("A", 1.5, &[0.0, 0.5]), subject("B", 0.5, &[0.0])];
        let common = map(&[4.0, 3.3, 2.7]);
        let selections = select(&[("A", 1, 1), ("B", 0, 2)]);
        let first = compute_gpa(&subjects, &selections, &common).unwrap();
        let second = compute_gpa(&subjects, &selections, &common).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_better_score_never_lowers_gpa() {
        let subjects = vec![subject("A", 1.0, &[0.0, 1.0]), subject("B", 2.0, &[0.0])];
        let common = map(&[4.0, 3.7, 3.3, 3.0, 2.0, 1.0, 0.0]);

        for level in 0..2 {
            let mut previous = f64::INFINITY;
            // Walk from the best score (index 0) to the worst
            for score in 0..common.len() as i64 {
                let selections = select(&[("A", level, score), ("B", 0, 3)]);
                let gpa = calculate_gpa(&subjects, &selections, &common).unwrap();
                assert!(gpa <= previous);
                previous = gpa;
            }
        }
    }

    #[test]
    fn test_breakdown_follows_input_order() {
        let subjects = vec![
            subject("Zoology", 1.0, &[0.0]),
            subject("Art", 1.0, &[0.0]),
            subject("Math", 1.0, &[0.0]),
        ];
        let result = compute_gpa(&subjects, &SelectionMap::new(), &map(&[4.0])).unwrap();
        let names: Vec<_> = result.breakdown.iter().map(|c| c.subject.as_str()).collect();
        assert_eq!(names, vec!["Zoology", "Art", "Math"]);
    }

    #[test]
    fn test_selections_follow_subject_not_position() {
        let common = map(&[4.0, 2.0]);
        let selections = select(&[("A", 0, 0), ("B", 0, 1)]);
        let forward = vec![subject("A", 1.0, &[0.0]), subject("B", 3.0, &[0.0])];
        let reversed = vec![subject("B", 3.0, &[0.0]), subject("A", 1.0, &[0.0])];

        let a = calculate_gpa(&forward, &selections, &common).unwrap();
        let b = calculate_gpa(&reversed, &selections, &common).unwrap();
        assert!(approx(a, b));
        // (4*1 + 2*3) / 4
        assert!(approx(a, 2.5));
    }

    #[test]
    fn test_sample_preset_end_to_end() {
        use crate::catalog::Catalog;
        use crate::resolver::{resolve_active_subjects, ModuleChoices};

        let catalog = Catalog::from_json_str(include_str!("../../data/presets.json")).unwrap();
        let preset = catalog.find_preset("sample-hs").unwrap();
        let active = resolve_active_subjects(preset, &ModuleChoices::new()).unwrap();

        let mut selections = SelectionMap::new();
        selections.set("English", Selection::new(1, 0)); // Honors, A: 4.0 - 0.5
        selections.set("Mathematics", Selection::new(0, 3)); // AP, B: 3.0
        selections.set("Research Project", Selection::new(1, 1)); // Audit: no points
        selections.set("Physics", Selection::new(1, 1)); // Regular, A-: 3.7 - 1.0

        let result = compute_gpa(&active, &selections, &catalog.common_score_map).unwrap();
        assert_eq!(result.breakdown.len(), 6);
        assert_eq!(result.breakdown[2].letter, "M");
        assert_eq!(result.breakdown[2].points(), 0.0);
        // (3.5 + 3.0 + 0 + 2.7 + 4.0*0.5 + 4.0*0.5) / (1 + 1 + 0.5 + 1 + 0.5 + 0.5)
        assert!(approx(result.total_weighted_points, 13.2));
        assert!(approx(result.total_weight, 4.5));
        assert!(approx(result.gpa, 13.2 / 4.5));
    }
}
