use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use volcano_stats::data::loader;
use volcano_stats::data::query::DEFAULT_TOP_AGENTS;
use volcano_stats::data::VolcanoQuery;
use volcano_stats::report::{Report, ReportOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
enum OutputFormat {
    Text,
    Json,
}

/// Print descriptive statistics for a volcanic eruption dataset.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Dataset to load (.json or .csv); defaults to the bundled volcano.json.
    #[arg(long, env = "VOLCANO_DATA")]
    data: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// First year of the decade to list.
    #[arg(long, default_value_t = 1980, allow_negative_numbers = true)]
    decade: i32,

    #[arg(long, default_value_t = 6, value_parser = clap::value_parser!(u8).range(0..=8))]
    min_vei: u8,

    /// Elevation threshold in meters.
    #[arg(long, default_value_t = 5000.0)]
    min_elevation: f64,

    /// Count eruptions for this country (exact match).
    #[arg(long)]
    country: Option<String>,

    /// How many of the deadliest eruptions to collect death agents from.
    #[arg(long, default_value_t = DEFAULT_TOP_AGENTS)]
    top_agents: usize,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let records = loader::load(cli.data.as_deref()).with_context(|| match &cli.data {
        Some(path) => format!("loading dataset {}", path.display()),
        None => "loading bundled dataset".to_string(),
    })?;
    let query = VolcanoQuery::new(records);

    let options = ReportOptions {
        decade_start: cli.decade,
        min_vei: cli.min_vei,
        min_elevation: cli.min_elevation,
        country: cli.country,
        top_agents: cli.top_agents,
    };
    let report = Report::build(&query, &options);

    let mut out = io::stdout().lock();
    match cli.format {
        OutputFormat::Text => write!(out, "{report}")?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &report).context("writing JSON report")?;
            writeln!(out)?;
        }
    }
    Ok(())
}
