use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

mod change;
mod diff;
mod loader;
mod openapi;

use change::DiffResult;
use loader::SchemaKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Old schema file (JSON or YAML)
    old: PathBuf,
    /// New schema file (JSON or YAML)
    new: PathBuf,
    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
    /// Report only: exit 0 even when breaking changes are found
    #[arg(long)]
    no_fail_on_breaking: bool,
}

fn run(cli: &Cli) -> Result<i32, Box<dyn Error>> {
    let old = loader::load_file(&cli.old)?;
    let new = loader::load_file(&cli.new)?;

    if cli.format == OutputFormat::Text {
        println!("Old schema: {}  New schema: {}", old.kind, new.kind);
    }

    let result = if old.kind == SchemaKind::OpenApi && new.kind == SchemaKind::OpenApi {
        openapi::diff_openapi(&old.raw, &new.raw)?
    } else {
        diff::diff_values(&old.raw, &new.raw)
    };

    let exit_code = if cli.no_fail_on_breaking {
        0
    } else {
        result.exit_code()
    };

    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Text => render_text(&result),
    }

    Ok(exit_code)
}

fn render_text(result: &DiffResult) {
    if result.has_breaking_changes() {
        println!("\nBREAKING CHANGES FOUND\n");
        for change in &result.breaking {
            println!("  {change}");
        }
    } else {
        println!("\nNo breaking changes found.");
    }

    if !result.non_breaking.is_empty() {
        println!("\nNon-breaking changes:");
        for change in &result.non_breaking {
            println!("  {change}");
        }
    }
}

fn main() {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
    }
}
