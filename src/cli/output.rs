use crate::CorrectionResult;
use colored::*;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonOutput<'a> {
    texts_corrected: usize,
    total_errors: usize,
    results: &'a [CorrectionResult],
}

pub fn print_results(results: &[CorrectionResult], colored_output: bool, format: &OutputFormat) {
    match format {
        OutputFormat::Text => print_text_results(results, colored_output),
        OutputFormat::Json => print_json_results(results),
    }
}

fn print_text_results(results: &[CorrectionResult], colored_output: bool) {
    for result in results {
        if colored_output {
            println!("{} {}", "source:".dimmed(), result.source);
            if result.errors.is_empty() {
                println!("{} {}", "target:".dimmed(), result.target.green());
            } else {
                println!("{} {}", "target:".dimmed(), result.target.cyan().bold());
            }
        } else {
            println!("source: {}", result.source);
            println!("target: {}", result.target);
        }

        for error in &result.errors {
            let fix = if error.corrected.is_empty() {
                "?".to_string()
            } else {
                error.corrected.clone()
            };

            if colored_output {
                println!(
                    "  {} {} {} {} [{}] {}",
                    error.position.to_string().blue().bold(),
                    error.original.red().bold(),
                    "→".dimmed(),
                    fix.green(),
                    error.category.to_string().yellow(),
                    error.explanation.dimmed()
                );
            } else {
                println!(
                    "  {} {} -> {} [{}] {}",
                    error.position, error.original, fix, error.category, error.explanation
                );
            }
        }
        println!();
    }
}

fn print_json_results(results: &[CorrectionResult]) {
    let output = JsonOutput {
        texts_corrected: results.len(),
        total_errors: results.iter().map(|r| r.errors.len()).sum(),
        results,
    };

    println!("{}", serde_json::to_string_pretty(&output).unwrap());
}

pub fn print_summary(total_errors: usize, text_count: usize, colored: bool) {
    let text_word = if text_count == 1 { "text" } else { "texts" };
    if total_errors == 0 {
        if colored {
            println!("{}", "✓ No corrections needed!".green().bold());
        } else {
            println!("✓ No corrections needed!");
        }
    } else {
        let error_word = if total_errors == 1 { "error" } else { "errors" };
        if colored {
            println!(
                "{} {} {} found in {} {}",
                "✗".red().bold(),
                total_errors.to_string().red().bold(),
                error_word,
                text_count,
                text_word
            );
        } else {
            println!(
                "✗ {} {} found in {} {}",
                total_errors, error_word, text_count, text_word
            );
        }
    }
}
