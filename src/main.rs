use clap::{Parser, Subcommand};
use std::path::PathBuf;

use gpa_calc::catalog::{Catalog, Preset};
use gpa_calc::config::ScoreDisplay;

const EXIT_SUCCESS: i32 = 0;
const EXIT_CONFIG: i32 = 2;
const EXIT_INPUT: i32 = 3;

#[derive(Subcommand, Debug)]
enum Commands {
    /// List available presets (default if no subcommand)
    Presets,
    /// Show the modules, subjects, levels and score options of a preset
    Show {
        /// Preset id (defaults to the configured preset, then the first one)
        preset: Option<String>,
    },
    /// Compute the GPA for a preset
    Calc {
        /// Preset id (defaults to the configured preset, then the first one)
        preset: Option<String>,

        /// Pick an elective, e.g. --choose "Science=Physics" (repeatable)
        #[arg(long = "choose", value_name = "MODULE=SUBJECT")]
        choices: Vec<String>,

        /// Select level and score, e.g. --select "Physics=AP:B+" or "Physics=0:2" (repeatable)
        #[arg(long = "select", value_name = "SUBJECT=LEVEL:SCORE")]
        selections: Vec<String>,

        /// Print the per-subject breakdown
        #[arg(long)]
        explain: bool,

        /// Show percentage bands instead of letters in the breakdown
        #[arg(long)]
        percent: bool,
    },
    /// Validate the preset data file and report every problem
    Check,
}

#[derive(Parser, Debug)]
#[command(name = "gpa-calc")]
#[command(about = "Weighted GPA calculator driven by curriculum presets", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/gpa-calc/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Path to the preset data file (JSON or YAML)
    #[arg(short, long, global = true)]
    data: Option<String>,

    /// Decimal places for the GPA
    #[arg(long, global = true)]
    decimals: Option<usize>,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn main() {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Presets);

    // Load config
    let config_path = cli.config.map(PathBuf::from);
    let config = match gpa_calc::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    let level = gpa_calc::telemetry::effective_level(cli.verbose, config.log_level.as_deref());
    if let Err(e) = gpa_calc::telemetry::init(&level) {
        eprintln!("Logging disabled: {}", e);
    }

    let decimals = cli.decimals.unwrap_or_else(|| config.decimals());

    // Load preset data
    let Some(data_path) = cli.data.as_deref().or(config.data.as_deref()) else {
        eprintln!("No preset data file given.");
        eprintln!("Pass --data <path> or add it to ~/.config/gpa-calc/config.yaml:");
        eprintln!("  data: ~/grades/presets.json");
        std::process::exit(EXIT_CONFIG);
    };
    let data_path = gpa_calc::config::expand_home(data_path);
    let catalog = match gpa_calc::catalog::load_catalog(&data_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Data error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Validate preset data at startup
    if let Err(errors) = gpa_calc::catalog::validate_catalog(&catalog) {
        eprintln!("Preset data errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let use_colors = gpa_calc::output::should_use_colors();

    match command {
        Commands::Presets => {
            println!("{}", gpa_calc::output::format_preset_list(&catalog, use_colors));
        }
        Commands::Check => {
            println!(
                "{}: {} presets, {} common score tiers, no problems found.",
                data_path.display(),
                catalog.presets.len(),
                catalog.common_score_map.len()
            );
        }
        Commands::Show { preset } => {
            let preset = pick_preset(&catalog, preset.as_deref(), config.preset.as_deref());
            println!(
                "{}",
                gpa_calc::output::format_preset_detail(preset, &catalog.common_score_map, use_colors)
            );
        }
        Commands::Calc {
            preset,
            choices,
            selections,
            explain,
            percent,
        } => {
            let preset = pick_preset(&catalog, preset.as_deref(), config.preset.as_deref());
            let score_display = if percent {
                ScoreDisplay::Percentage
            } else {
                config.score_display()
            };
            let display = Display {
                explain,
                decimals,
                score_display,
                use_colors,
            };
            run_calc(&catalog, preset, &choices, &selections, &display);
        }
    }

    std::process::exit(EXIT_SUCCESS);
}

/// An explicit preset id must exist; a configured one falls back to the first preset
fn pick_preset<'a>(catalog: &'a Catalog, explicit: Option<&str>, configured: Option<&str>) -> &'a Preset {
    if let Some(id) = explicit {
        match catalog.find_preset(id) {
            Some(p) => return p,
            None => {
                eprintln!("Unknown preset '{}'. Available presets:", id);
                for p in &catalog.presets {
                    eprintln!("  {}", p.id);
                }
                std::process::exit(EXIT_INPUT);
            }
        }
    }

    if let Some(id) = configured {
        if catalog.find_preset(id).is_none() {
            tracing::warn!(preset = %id, "configured preset no longer exists, using the first preset");
        }
    }

    match catalog.preset_or_first(configured) {
        Some(p) => p,
        None => {
            eprintln!("Preset data contains no presets.");
            std::process::exit(EXIT_CONFIG);
        }
    }
}

/// Output settings for `calc`
struct Display {
    explain: bool,
    decimals: usize,
    score_display: ScoreDisplay,
    use_colors: bool,
}

fn run_calc(
    catalog: &Catalog,
    preset: &Preset,
    choice_args: &[String],
    selection_args: &[String],
    display: &Display,
) {
    let choices = match gpa_calc::input::build_choices(choice_args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Input error: {}", e);
            std::process::exit(EXIT_INPUT);
        }
    };

    let active = match gpa_calc::resolver::resolve_active_subjects(preset, &choices) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Input error: {}", e);
            std::process::exit(EXIT_INPUT);
        }
    };

    let parsed: Result<Vec<_>, _> = selection_args
        .iter()
        .map(|s| gpa_calc::input::parse_selection(s))
        .collect();
    let selections = match parsed.and_then(|args| {
        gpa_calc::input::build_selections(&args, &active, &catalog.common_score_map)
    }) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Input error: {}", e);
            std::process::exit(EXIT_INPUT);
        }
    };

    tracing::info!(
        preset = %preset.id,
        subjects = active.len(),
        selections = selections.len(),
        "computing GPA"
    );

    let result = match gpa_calc::gpa::compute_gpa(&active, &selections, &catalog.common_score_map) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Preset data error: {}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if display.explain {
        println!(
            "{}",
            gpa_calc::output::format_breakdown(
                &result,
                display.decimals,
                display.score_display,
                display.use_colors
            )
        );
        println!();
    }
    println!(
        "{}",
        gpa_calc::output::format_gpa_line(&result, display.decimals, display.use_colors)
    );
}
