//! vkgen
//!
//! Generates typed Rust client declarations from a VK API schema.

use std::path::{Path, PathBuf};

use clap::Parser;
use colored::Colorize;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use vkgen_gen::config::GeneratorConfig;
use vkgen_gen::errors::GeneratorError;
use vkgen_gen::output::generate_and_write_all;
use vkgen_gen::parser::load_schema_dir;

/// vkgen - lowers VK API schemas into typed Rust client code
#[derive(Parser, Debug)]
#[command(name = "vkgen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding objects.json, responses.json and methods.json
    #[arg(short, long, default_value = ".")]
    schema_dir: PathBuf,

    /// Output directory for generated code
    #[arg(short, long, default_value = "generated")]
    output: PathBuf,

    /// Print generated code without writing files
    #[arg(long)]
    dry_run: bool,

    /// TOML configuration file (patches, forced responses, renames)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Skip prettyplease formatting of the generated units
    #[arg(long)]
    no_fmt: bool,

    /// Keep raw schema names instead of casing identifiers
    #[arg(long)]
    no_case: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Initializes tracing on stderr.
///
/// `RUST_LOG` wins when set. Otherwise the verbosity picks the level:
/// - 0 (default): WARN
/// - 1 (-v): INFO, one line per unit
/// - 2 (-vv): DEBUG, per definition and per applied patch
/// - 3+ (-vvv): TRACE
fn init_tracing(verbose: u8) {
    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            0 => "warn".to_string(),
            1 => "warn,vkgen=info,vkgen_gen=info,vkgen_define=info".to_string(),
            2 => "info,vkgen=debug,vkgen_gen=debug,vkgen_define=debug".to_string(),
            _ => "debug,vkgen=trace,vkgen_gen=trace,vkgen_define=trace".to_string(),
        },
    };

    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_file(verbose >= 4)
                .with_line_number(verbose >= 4)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

fn run(cli: &Cli) -> Result<(), GeneratorError> {
    let mut config = match &cli.config {
        Some(path) => GeneratorConfig::load(path)?,
        None => GeneratorConfig::default(),
    };
    if cli.no_fmt {
        config.format = false;
    }
    if cli.no_case {
        config.casing = false;
    }

    info!(schema_dir = %cli.schema_dir.display(), output = %cli.output.display(), dry_run = cli.dry_run, "starting generation");

    let schema = load_schema_dir(&cli.schema_dir)?;
    let units = generate_and_write_all(&schema, &config, Path::new(&cli.output), cli.dry_run)?;

    if !cli.dry_run {
        eprintln!(
            "{} {} units to {}",
            "Generated".green().bold(),
            units.len(),
            cli.output.display()
        );
    }
    Ok(())
}

fn main() -> Result<(), GeneratorError> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    run(&cli).inspect_err(|e| {
        eprintln!("{} {}", "error:".red().bold(), e);
    })
}
