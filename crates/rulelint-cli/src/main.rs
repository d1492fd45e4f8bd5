//! rulelint CLI - lint skill rule files and plugin marketplaces

mod json;

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::*;
use rulelint_core::{
    config::LintConfig, validate_marketplace, validate_skills, validator_names, PluginFlavor,
    SkillReport, ValidationError,
};
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "rulelint")]
#[command(author, version, long_about = None)]
#[command(
    about = "Lint skill rule files and plugin marketplaces",
    long_about = "Validate the rule documents of agent skills and the Claude/Cursor plugin marketplaces that ship them.\n\nWith no subcommand, validates the default skill's rules."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path (defaults to <root>/.rulelint.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate rule files
    Rules(RulesArgs),

    /// Validate a plugin marketplace and its plugins
    Plugins {
        /// Marketplace layout to check
        #[arg(long, value_enum, default_value_t = Flavor::Claude)]
        flavor: Flavor,

        /// Repository root containing the marketplace directory
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// List registered validators
    Validators,

    /// Initialize config file
    Init {
        /// Output path for config
        #[arg(default_value = rulelint_core::config::CONFIG_FILE_NAME)]
        output: PathBuf,
    },

    /// Print the config file JSON schema
    Schema,
}

#[derive(Args)]
struct RulesArgs {
    /// Skill to validate (defaults to the configured default skill)
    #[arg(long, conflicts_with = "all")]
    skill: Option<String>,

    /// Validate every configured skill
    #[arg(long)]
    all: bool,

    /// Repository root containing the skills directory
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

impl Default for RulesArgs {
    fn default() -> Self {
        Self {
            skill: None,
            all: false,
            root: PathBuf::from("."),
            format: OutputFormat::Text,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Flavor {
    Claude,
    Cursor,
}

impl From<Flavor> for PluginFlavor {
    fn from(flavor: Flavor) -> Self {
        match flavor {
            Flavor::Claude => PluginFlavor::Claude,
            Flavor::Cursor => PluginFlavor::Cursor,
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    // Logs go to stderr so JSON on stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match &cli.command {
        Some(Commands::Rules(args)) => rules_command(args, &cli),
        Some(Commands::Plugins {
            flavor,
            root,
            format,
        }) => plugins_command((*flavor).into(), root, *format),
        Some(Commands::Validators) => validators_command(),
        Some(Commands::Init { output }) => init_command(output),
        Some(Commands::Schema) => schema_command(),
        None => rules_command(&RulesArgs::default(), &cli),
    };

    match result {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            process::exit(1);
        }
    }
}

/// Skills selected by `--skill` / `--all`, or the configured default
fn selected_skills(args: &RulesArgs, config: &LintConfig) -> Vec<String> {
    if args.all {
        config.skill_names()
    } else {
        vec![args
            .skill
            .clone()
            .unwrap_or_else(|| config.default_skill.clone())]
    }
}

/// Errors grouped by file, in order of first appearance
fn group_by_file(errors: &[ValidationError]) -> Vec<(&str, Vec<&ValidationError>)> {
    let mut groups: Vec<(&str, Vec<&ValidationError>)> = Vec::new();
    for error in errors {
        match groups.iter_mut().find(|(file, _)| *file == error.file) {
            Some((_, list)) => list.push(error),
            None => groups.push((error.file.as_str(), vec![error])),
        }
    }
    groups
}

fn print_skill_summary(report: &SkillReport, root: &Path, config: &LintConfig) {
    println!();
    println!("{} {}...", "Validating".cyan().bold(), report.skill);
    if let Ok(skill) = config.skill(&report.skill) {
        println!(
            "  Rules directory: {}",
            config.rules_dir(root, &report.skill, skill).display()
        );
    }
    println!("  Using validator: {}", report.validator);

    if report.rules_dir_missing {
        println!("  No rules directory found. Nothing to validate.");
    } else if report.rules_checked == 0 {
        println!("  No rule files found. Nothing to validate.");
    } else if report.is_ok() {
        println!(
            "  {}",
            format!("✓ All {} rule files are valid", report.rules_checked).green()
        );
    }
}

/// Returns `Ok(false)` when validation found errors.
fn rules_command(args: &RulesArgs, cli: &Cli) -> anyhow::Result<bool> {
    let config = LintConfig::load_or_default(cli.config.as_deref(), &args.root)?;
    let names = selected_skills(args, &config);
    let reports = validate_skills(&args.root, &names, &config)?;
    let total: usize = reports.iter().map(|r| r.errors.len()).sum();

    if args.format == OutputFormat::Json {
        let output = json::rules_to_json(&reports);
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(total == 0);
    }

    println!("{}", "Validating rule files...".bold());
    for report in &reports {
        print_skill_summary(report, &args.root, &config);
    }

    if total == 0 {
        println!();
        println!("{}", "✓ All validations passed".green().bold());
        return Ok(true);
    }

    let errors: Vec<ValidationError> = reports
        .into_iter()
        .flat_map(|r| r.errors)
        .collect();

    eprintln!();
    eprintln!("{}", "✗ Validation failed:".red().bold());
    eprintln!();
    for (file, file_errors) in group_by_file(&errors) {
        eprintln!("  {}:", file.bold());
        for error in file_errors {
            match (&error.rule_id, cli.verbose) {
                (Some(id), true) => eprintln!("    - [{}] {}", id.dimmed(), error.message),
                _ => eprintln!("    - {}", error.message),
            }
        }
    }
    eprintln!();
    eprintln!("  Total: {} error(s)", total);

    Ok(false)
}

/// Returns `Ok(false)` when the marketplace has errors.
fn plugins_command(flavor: PluginFlavor, root: &Path, format: OutputFormat) -> anyhow::Result<bool> {
    let report = validate_marketplace(root, flavor);

    if format == OutputFormat::Json {
        let output = json::plugins_to_json(flavor, &report);
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(report.is_ok());
    }

    println!();
    println!("=== {} Plugin Validation ===", flavor.display_name());
    println!();

    if !report.warnings.is_empty() {
        for warning in &report.warnings {
            println!("{}  {}", "⚠".yellow(), warning.message);
        }
        println!();
    }

    if !report.is_ok() {
        for error in &report.errors {
            println!("{}  {}", "✗".red(), error.message);
        }
        println!();
        println!(
            "{}",
            format!("✗ {} error(s) found", report.errors.len()).red().bold()
        );
        return Ok(false);
    }

    println!(
        "{}",
        format!(
            "✓ All {} plugin configurations are valid",
            flavor.display_name()
        )
        .green()
        .bold()
    );
    Ok(true)
}

fn validators_command() -> anyhow::Result<bool> {
    for name in validator_names() {
        println!("{}", name);
    }
    Ok(true)
}

fn init_command(output: &Path) -> anyhow::Result<bool> {
    let toml_content = LintConfig::default_toml()?;

    std::fs::write(output, toml_content)?;

    println!(
        "{} Created config file: {}",
        "✓".green().bold(),
        output.display()
    );

    Ok(true)
}

fn schema_command() -> anyhow::Result<bool> {
    let schema = schemars::schema_for!(LintConfig);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(true)
}
