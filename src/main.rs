use anyhow::{Context, Result};
use ccorrect::cli::output::{self, OutputFormat};
use ccorrect::corrector::ConfusionCorrector;
use ccorrect::normalize::{normalize, ModelOutput};
use ccorrect::{merge, Config, ConfusionDictionary, CorrectionResult, CorrectorRegistry};
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use colored::*;
use std::fs;
use std::io;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ccorrect")]
#[command(version, about = "Chinese text correction with position-exact error reporting", long_about = None)]
struct Cli {
    /// Files with one sentence per line
    #[arg(value_name = "FILES")]
    files: Vec<PathBuf>,

    /// Correct a literal text instead of reading files
    #[arg(short, long)]
    text: Vec<String>,

    /// Corrector to use (see config `models` for the ensemble order)
    #[arg(short, long)]
    model: Option<String>,

    /// Run every configured corrector and merge the results
    #[arg(short, long)]
    ensemble: bool,

    /// Confusion dictionary file (wrong/correct pairs, one per line)
    #[arg(long, env = "CCORRECT_CONFUSION", global = true)]
    confusion: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Exit with code 0 even if errors are found
    #[arg(long)]
    no_fail: bool,

    /// Output format (text, json)
    #[arg(short = 'o', long, default_value = "text", global = true)]
    format: OutputFormat,

    /// Generate shell completion script
    #[arg(long, value_name = "SHELL")]
    completion: Option<Shell>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Parser, Debug)]
enum Commands {
    /// Merge per-model result files (JSON arrays, weakest to strongest)
    Merge {
        /// One file per model, each a JSON array of correction results
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,
    },
    /// Normalize one model's raw output file against its source text
    Normalize {
        /// Raw model output (JSON: edit tuples, result object, or claims)
        file: PathBuf,

        /// The source text the model corrected
        #[arg(short, long)]
        source: String,
    },
    /// Confusion dictionary management
    Dict {
        #[command(subcommand)]
        action: DictCommands,
    },
}

#[derive(Parser, Debug)]
enum DictCommands {
    /// Show dictionary summary
    Info {
        /// Dictionary file
        path: PathBuf,
    },
    /// Validate dictionary entries
    Check {
        /// Dictionary file
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    // Handle shell completion generation
    if let Some(shell) = cli.completion {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "ccorrect", &mut io::stdout());
        return Ok(());
    }

    let config = Config::load(cli.confusion.clone(), Vec::new())?;

    if let Some(command) = cli.command {
        return handle_command(command, &config, !cli.no_color, &cli.format);
    }

    // Collect texts: literal --text arguments first, then file lines
    let mut texts: Vec<String> = cli.text.clone();
    for file_path in &cli.files {
        let content = fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read file: {}", file_path.display()))?;
        texts.extend(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from),
        );
    }

    if texts.is_empty() {
        anyhow::bail!("No input given. Pass files or --text; see --help for usage.");
    }

    let registry = build_registry(&config)?;

    let results = if cli.ensemble {
        registry.correct_ensemble(&texts)?
    } else {
        let name = cli.model.as_deref().unwrap_or(&config.default_model);
        let corrector = registry.get(name).with_context(|| {
            format!(
                "Unknown corrector '{}'. Available: {}",
                name,
                registry.names().join(", ")
            )
        })?;
        corrector.correct_batch(&texts)?
    };

    output::print_results(&results, !cli.no_color, &cli.format);

    let total_errors: usize = results.iter().map(|r| r.errors.len()).sum();
    if matches!(cli.format, OutputFormat::Text) {
        output::print_summary(total_errors, texts.len(), !cli.no_color);
    }

    if total_errors > 0 && !cli.no_fail {
        std::process::exit(1);
    }

    Ok(())
}

/// Build the corrector registry from config. In-process correctors only;
/// remote backends register here in the service composition layer.
fn build_registry(config: &Config) -> Result<CorrectorRegistry> {
    let mut registry = CorrectorRegistry::new();

    for name in &config.models {
        match name.as_str() {
            ConfusionCorrector::NAME => {
                let dictionary = load_dictionary(config)?;
                registry.register(Box::new(ConfusionCorrector::new(dictionary)));
            }
            other => {
                log::warn!("corrector '{}' is not built in, skipping", other);
            }
        }
    }

    if registry.is_empty() {
        anyhow::bail!("No usable correctors configured.");
    }

    Ok(registry)
}

fn load_dictionary(config: &Config) -> Result<ConfusionDictionary> {
    match &config.confusion_path {
        Some(path) => ConfusionDictionary::load(path),
        None => ConfusionDictionary::from_entries(std::iter::empty()),
    }
}

fn handle_command(
    command: Commands,
    config: &Config,
    colored: bool,
    format: &OutputFormat,
) -> Result<()> {
    match command {
        Commands::Merge { files } => {
            let mut per_model: Vec<Vec<CorrectionResult>> = Vec::new();
            for path in &files {
                let content = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read results file: {}", path.display()))?;
                let results: Vec<CorrectionResult> = serde_json::from_str(&content)
                    .with_context(|| format!("Failed to parse results file: {}", path.display()))?;
                per_model.push(results);
            }

            let merged = merge::merge_batch(&per_model)?;
            output::print_results(&merged, colored, format);
        }
        Commands::Normalize { file, source } => {
            let content = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read model output: {}", file.display()))?;
            let value: serde_json::Value = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse model output: {}", file.display()))?;

            let raw = ModelOutput::from_json(value)?;
            let dictionary = load_dictionary(config)?;
            let dict_ref = (!dictionary.is_empty()).then_some(&dictionary);
            let result = normalize(&source, raw, dict_ref)?;

            output::print_results(std::slice::from_ref(&result), colored, format);
        }
        Commands::Dict { action } => match action {
            DictCommands::Info { path } => {
                let dictionary = ConfusionDictionary::load(&path)?;
                println!("{}", format!("Dictionary: {}", path.display()).bold());
                println!("  Entries: {}", dictionary.len());
                for (wrong, correct) in dictionary.entries().take(10) {
                    println!("  {} {} {}", wrong.red(), "→".dimmed(), correct.green());
                }
                if dictionary.len() > 10 {
                    println!("  {}", format!("... and {} more", dictionary.len() - 10).dimmed());
                }
            }
            DictCommands::Check { path } => {
                let dictionary = ConfusionDictionary::load(&path)?;
                let mut suspect = 0;
                for (wrong, correct) in dictionary.entries() {
                    if wrong == correct {
                        suspect += 1;
                        println!(
                            "  {} entry maps to itself: {}",
                            "✗".red().bold(),
                            wrong.yellow()
                        );
                    }
                }
                if suspect == 0 {
                    println!(
                        "{} {} entries, no problems found",
                        "✓".green().bold(),
                        dictionary.len()
                    );
                } else {
                    anyhow::bail!("{} suspect entries found", suspect);
                }
            }
        },
    }
    Ok(())
}
