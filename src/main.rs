use cademycode_etl::{
    cli::{check_pipeline, run_pipeline},
    config::PipelineConfig,
    etl::PipelineReport,
};
use clap::{Parser, Subcommand, builder::styling};
use eyre::{Context, Result};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};

// CLI Styling
const STYLES: styling::Styles = styling::Styles::styled()
    .header(styling::AnsiColor::BrightWhite.on_default())
    .usage(styling::AnsiColor::BrightWhite.on_default())
    .literal(styling::AnsiColor::Green.on_default())
    .placeholder(styling::AnsiColor::Cyan.on_default());

/// Cademycode ETL: clean the raw student, job and course tables into a sink database and a flat export
#[derive(Parser)]
#[command(name = "ccetl", version, styles = STYLES)]
struct Cli {
    /// The dotenv file to source ETL_* settings from, if present
    #[arg(short, long, global = true, default_value = ".env")]
    env: String,

    /// YAML config file (defaults to etl.yml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// More verbose logging, including per-rule row counts
    #[arg(long, global = true)]
    debug: bool,

    /// Command to execute (defaults to run)
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract, clean and load: write the clean tables and the joined export
    Run {
        /// Raw SQLite database to read
        #[arg(long)]
        source: Option<PathBuf>,

        /// SQLite database to write the *_clean tables to
        #[arg(long)]
        sink: Option<PathBuf>,

        /// Flat file for the joined export
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Extract and clean only, reporting row counts without writing anything
    Check {
        /// Raw SQLite database to read
        #[arg(long)]
        source: Option<PathBuf>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if Path::new(&cli.env).is_file() {
        dotenvy::from_filename(&cli.env)
            .with_context(|| format!("Failed to load env file: {}", cli.env))?;
    }

    let log_level = match cli.debug {
        true => "debug",
        false => "info",
    };
    let env = env_logger::Env::default().filter_or("LOG_LEVEL", log_level);
    env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .init();

    let result = dispatch(cli).await;
    if let Err(e) = &result {
        log::error!("{:?}", e);
    }
    result
}

async fn dispatch(cli: Cli) -> Result<()> {
    let mut config = PipelineConfig::load(cli.config.as_deref())?;

    match cli.command.unwrap_or(Commands::Run {
        source: None,
        sink: None,
        export: None,
    }) {
        Commands::Run {
            source,
            sink,
            export,
        } => {
            if let Some(source) = source {
                config.source = source;
            }
            if let Some(sink) = sink {
                config.sink = sink;
            }
            if let Some(export) = export {
                config.export_path = export;
            }
            log::info!(
                "Cleaning {} into {} and {}",
                config.source.display().bright_black(),
                config.sink.display().bright_black(),
                config.export_path.display().bright_black()
            );
            let report = run_pipeline(&config).await?;
            print_counts(&report);
            if let Some(rows) = report.exported_rows {
                log::info!(
                    "✓ Exported {} joined row(s) to {}",
                    rows.green(),
                    config.export_path.display()
                );
            }
        }
        Commands::Check { source } => {
            if let Some(source) = source {
                config.source = source;
            }
            log::info!("Checking {}", config.source.display().bright_black());
            let report = check_pipeline(&config).await?;
            for step in &report.trace {
                log::info!("  {}", step);
            }
            print_counts(&report);
        }
    }

    Ok(())
}

fn print_counts(report: &PipelineReport) {
    for (entity, raw) in report.raw_counts.iter() {
        let clean = report.clean_counts.get(entity);
        log::info!(
            "{}: {} raw → {} clean",
            entity.name().cyan(),
            raw,
            clean.green()
        );
    }
}
