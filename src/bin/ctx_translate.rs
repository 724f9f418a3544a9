//! Console Translation CLI
//!
//! Translates console expressions the way the console does before handing
//! them to the interpreter, and prints the result. Useful for checking which
//! calls receive the context argument.
//!
//! Usage:
//!   cargo run --features cli --bin ctx-translate -- "outer(inner('x'))"
//!   echo "print(status())" | cargo run --features cli --bin ctx-translate -- --report
//!
//! Configuration is read from `--config`, then CONSOLE_TRANSLATE_CONFIG, then
//! `console-translate.yaml` in the working directory.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use console_translate::{ConfigLoader, Diagnostic, Translator};

/// Inject the console context into command calls
#[derive(Parser, Debug)]
#[command(name = "ctx-translate")]
#[command(about = "Rewrite console expressions so every command call receives the context")]
struct Args {
    /// Expressions to translate; reads stdin line by line when empty
    expressions: Vec<String>,

    /// Configuration file (YAML)
    #[arg(long, short = 'c', env = "CONSOLE_TRANSLATE_CONFIG")]
    config: Option<PathBuf>,

    /// Context expression to inject (overrides the configuration)
    #[arg(long, short = 'p')]
    first_parameter: Option<String>,

    /// Print a JSON report per expression instead of the bare translation
    #[arg(long)]
    report: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    input: &'a str,
    /// Text the diagnostic spans point into
    source: String,
    text: String,
    rewritten: Vec<String>,
    skipped_builtins: Vec<String>,
    diagnostics: Vec<Diagnostic>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let args = Args::parse();

    let loader = match &args.config {
        Some(path) => ConfigLoader::new(path),
        None => ConfigLoader::from_env(),
    };
    let mut config = loader.load()?;
    if let Some(first_parameter) = args.first_parameter {
        config.first_parameter = first_parameter;
        config.validate().context("Invalid --first-parameter")?;
    }

    let translator = Translator::from_config(&config);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let mut emit = |input: &str| -> Result<()> {
        let translation = translator.translate_with_report(input, &config.first_parameter);
        if args.report {
            let report = Report {
                input,
                source: translation.source,
                text: translation.text,
                rewritten: translation.rewritten,
                skipped_builtins: translation.skipped_builtins,
                diagnostics: translation.diagnostics,
            };
            writeln!(out, "{}", serde_json::to_string(&report)?)?;
        } else {
            for diag in &translation.diagnostics {
                eprintln!("{}", diag.render(&translation.source));
            }
            writeln!(out, "{}", translation.text)?;
        }
        Ok(())
    };

    if args.expressions.is_empty() {
        for line in io::stdin().lock().lines() {
            let line = line.context("Failed to read stdin")?;
            emit(&line)?;
        }
    } else {
        for expression in &args.expressions {
            emit(expression)?;
        }
    }

    Ok(())
}
