use std::io::IsTerminal;
use chrono::Duration;
use owo_colors::OwoColorize;
use terminal_size::{Width, terminal_size};

use crate::catalog::{Catalog, ModuleKind, Preset, ScoreEntry};
use crate::config::ScoreDisplay;
use crate::gpa::{GpaResult, SubjectContribution};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a GPA with a fixed number of decimals (3 -> "3.850")
pub fn format_gpa(gpa: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, gpa)
}

/// Format the one-line result: "GPA: 3.850"
pub fn format_gpa_line(result: &GpaResult, decimals: usize, use_colors: bool) -> String {
    let value = format_gpa(result.gpa, decimals);
    if use_colors {
        format!("GPA: {}", value.bold().green())
    } else {
        format!("GPA: {}", value)
    }
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a name to fit available width, accounting for Unicode
fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Format the per-subject breakdown of a GPA computation.
///
/// Columns: Index, Subject, Level, Score, Base, Offset, GPA, Weight (points/credits).
/// The Score column shows the letter or the percentage band, per `score_display`.
/// A trailing `*` marks a subject whose selection was clamped into range.
pub fn format_breakdown(
    result: &GpaResult,
    decimals: usize,
    score_display: ScoreDisplay,
    use_colors: bool,
) -> String {
    if result.breakdown.is_empty() {
        return "No active subjects.".to_string();
    }

    let name_cap = match get_terminal_width() {
        // Roughly 60 columns go to everything but the subject name
        Some(width) if width > 80 => width - 60,
        Some(_) => 20,
        None => usize::MAX,
    };
    let name_width = result
        .breakdown
        .iter()
        .map(|c| c.subject.chars().count())
        .max()
        .unwrap_or(0)
        .min(name_cap);
    let level_width = result
        .breakdown
        .iter()
        .map(|c| c.level.chars().count())
        .max()
        .unwrap_or(0);
    let score_of = |c: &SubjectContribution| -> String {
        match score_display {
            ScoreDisplay::Letter => c.letter.clone(),
            ScoreDisplay::Percentage => c.percentage.clone(),
        }
    };
    let score_width = result
        .breakdown
        .iter()
        .map(|c| score_of(c).chars().count())
        .max()
        .unwrap_or(0)
        .max(4);

    let mut lines: Vec<String> = result
        .breakdown
        .iter()
        .enumerate()
        .map(|(idx, c)| {
            let index_str = format!("{:>2}.", idx + 1);
            let name = format!(
                "{:<width$}",
                truncate_name(&c.subject, name_width),
                width = name_width
            );
            let level = format!("{:<width$}", c.level, width = level_width);
            let score = format!("{:<width$}", score_of(c), width = score_width);
            let figures = format!(
                "{:>5.2} -{:>4.2} = {:>5.2}  x{}/{}",
                c.base_gpa,
                c.effective_offset,
                c.subject_gpa,
                format_weight(c.points_weight),
                format_weight(c.credits_weight)
            );
            let marker = if c.clamped() { " *" } else { "" };

            if use_colors {
                format!(
                    "{} {}  {}  {}  {}{}",
                    index_str.dimmed(),
                    name.bold(),
                    level.cyan(),
                    score.yellow(),
                    figures,
                    marker.red()
                )
            } else {
                format!("{} {}  {}  {}  {}{}", index_str, name, level, score, figures, marker)
            }
        })
        .collect();

    lines.push(format!(
        "Total: {} points / {} credits = {}",
        format_weight(result.total_weighted_points),
        format_weight(result.total_weight),
        format_gpa(result.gpa, decimals)
    ));

    if result.breakdown.iter().any(|c| c.clamped()) {
        lines.push("* selection was out of range and has been clamped".to_string());
    }

    lines.join("\n")
}

/// Format a weight without trailing zeros (1.0 -> "1", 0.50 -> "0.5")
fn format_weight(weight: f64) -> String {
    let formatted = format!("{:.3}", weight);
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Format all presets, one per line
/// Format: " 1. {id}  {name} - {subtitle} ({N} modules, {M} subjects)"
pub fn format_preset_list(catalog: &Catalog, use_colors: bool) -> String {
    if catalog.presets.is_empty() {
        return "No presets found.".to_string();
    }

    let id_width = catalog
        .presets
        .iter()
        .map(|p| p.id.chars().count())
        .max()
        .unwrap_or(0);

    let mut lines: Vec<String> = catalog
        .presets
        .iter()
        .enumerate()
        .map(|(idx, preset)| {
            let index_str = format!("{:>2}.", idx + 1);
            let id = format!("{:<width$}", preset.id, width = id_width);
            let title = match preset.subtitle.as_deref() {
                Some(sub) => format!("{} - {}", preset.name, sub),
                None => preset.name.clone(),
            };
            let subjects: usize = preset.modules.iter().map(|m| m.subjects.len()).sum();
            let summary = format!("({} modules, {} subjects)", preset.modules.len(), subjects);

            if use_colors {
                format!(
                    "{} {}  {} {}",
                    index_str.dimmed(),
                    id.cyan(),
                    title.bold(),
                    summary.dimmed()
                )
            } else {
                format!("{} {}  {} {}", index_str, id, title, summary)
            }
        })
        .collect();

    if let Some(updated) = catalog.last_updated() {
        let age = chrono::Utc::now().signed_duration_since(updated);
        lines.push(format!(
            "Data updated {} ({})",
            updated.format("%Y-%m-%d"),
            format_age(age)
        ));
    }

    lines.join("\n")
}

/// Format one preset with its modules, subjects, levels and score options
pub fn format_preset_detail(preset: &Preset, common: &[ScoreEntry], use_colors: bool) -> String {
    let mut lines = Vec::new();

    let header = match preset.subtitle.as_deref() {
        Some(sub) => format!("{} - {} [{}]", preset.name, sub, preset.id),
        None => format!("{} [{}]", preset.name, preset.id),
    };
    lines.push(if use_colors {
        header.bold().to_string()
    } else {
        header
    });

    for (key, module) in preset.keyed_modules() {
        let kind = match module.kind {
            ModuleKind::Core => "core".to_string(),
            ModuleKind::Choice => match module.selection_limit {
                Some(limit) => format!("choose up to {}", limit),
                None => "choose any".to_string(),
            },
        };
        let module_line = format!("{} ({})", key, kind);
        lines.push(if use_colors {
            module_line.cyan().to_string()
        } else {
            module_line
        });

        for subject in &module.subjects {
            let levels = subject
                .levels
                .iter()
                .enumerate()
                .map(|(i, l)| {
                    let mut s = format!("{}:{}", i, l.name);
                    if l.offset != 0.0 {
                        s.push_str(&format!(" -{}", format_weight(l.offset)));
                    }
                    if let Some(w) = l.weight_override {
                        s.push_str(&format!(" x{}", format_weight(w)));
                    }
                    s
                })
                .collect::<Vec<_>>()
                .join(", ");
            lines.push(format!(
                "  {} (weight {}) levels: {}",
                subject.name,
                format_weight(subject.weight),
                levels
            ));
            if subject.custom_score_map.as_ref().is_some_and(|m| !m.is_empty()) {
                lines.push(format!(
                    "    scores: {}",
                    format_score_options(subject.effective_score_map(common))
                ));
            }
        }
    }

    lines.push(format!("Common scores: {}", format_score_options(common)));

    lines.join("\n")
}

/// "0:A (93-100) 4, 1:A- (90-92) 3.7, ..."
fn format_score_options(map: &[ScoreEntry]) -> String {
    if map.is_empty() {
        return "(none)".to_string();
    }
    map.iter()
        .enumerate()
        .map(|(i, e)| {
            format!(
                "{}:{} ({}) {}",
                i,
                e.letter_name,
                e.percentage_name,
                format_weight(e.base_gpa)
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Format a duration into a human-readable age string
/// "2h ago" for hours, "3d ago" for days, "1w ago" for weeks
pub fn format_age(duration: Duration) -> String {
    let hours = duration.num_hours();
    let days = duration.num_days();
    let weeks = days / 7;

    if weeks >= 1 {
        format!("{}w ago", weeks)
    } else if days >= 1 {
        format!("{}d ago", days)
    } else if hours >= 1 {
        format!("{}h ago", hours)
    } else {
        let minutes = duration.num_minutes();
        if minutes >= 1 {
            format!("{}m ago", minutes)
        } else {
            "just now".to_string()
        }
    }
}
