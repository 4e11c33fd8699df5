//! Sales Statistics Tool
//!
//! Runs one report over a sales-transaction CSV export and prints it as JSON,
//! a table, or writes it as an SVG chart.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use tokio::runtime::Runtime;
use tracing::info;

use salestats::config::load_config;
use salestats::logger::init_logging;
use salestats::utils::report_table;
use salestats::{analyze_async, OutputFormat, RenderContext, RenderTarget, Report, ReportConfig};

#[derive(Debug, Parser)]
#[clap(version, about = "Sales report aggregation over transaction exports")]
struct Args {
    /// Configuration file (.toml or .json); defaults to ./salestats.toml when present
    #[arg(short, long, env = "SALESTATS_CONFIG")]
    config: Option<PathBuf>,

    /// Transaction CSV export
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output file; stdout when absent
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Report to run
    #[arg(short, long, value_enum)]
    report: Option<Report>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Spend-histogram bin width in VND
    #[arg(long = "bin-size")]
    bin_size: Option<f64>,

    /// Keep only the first N records of ranked reports
    #[arg(long = "top-n")]
    top_n: Option<usize>,

    /// Keep only the first N groups of per-group reports
    #[arg(long = "max-groups")]
    max_groups: Option<usize>,

    /// Chart width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Chart height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Flags given on the command line win over the configuration file.
    fn apply(self, mut config: ReportConfig) -> ReportConfig {
        if let Some(input) = self.input {
            config.input = Some(input);
        }
        if let Some(output) = self.output {
            config.output = Some(output);
        }
        if let Some(report) = self.report {
            config.report = report;
        }
        if let Some(format) = self.format {
            config.format = format;
        }
        if let Some(bin_size) = self.bin_size {
            config.bin_size = bin_size;
        }
        if let Some(top_n) = self.top_n {
            config.top_n = Some(top_n);
        }
        if let Some(max_groups) = self.max_groups {
            config.max_groups = Some(max_groups);
        }
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        config
    }
}

fn emit(config: &ReportConfig, text: &str) -> Result<()> {
    match &config.output {
        Some(path) => std::fs::write(path, text)
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
            Ok(())
        }
    }
}

async fn run(config: ReportConfig) -> Result<()> {
    let output = analyze_async(&config)
        .await
        .with_context(|| format!("report {:?} failed", config.report))?;

    match config.format {
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&output)?;
            json.push('\n');
            emit(&config, &json)
        }
        OutputFormat::Table => {
            let table = report_table(&output, &config.format_options);
            emit(&config, &format!("{}\n", table))
        }
        OutputFormat::Svg => {
            let path = config
                .output
                .clone()
                .context("svg output requires --output")?;
            let mut ctx = RenderContext::create(RenderTarget::File(path), &config);
            ctx.render(config.report, &output)?;
            ctx.finish()?;
            Ok(())
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = load_config(args.config.as_deref())
        .context("failed to load configuration")?
        .unwrap_or_default();
    let config = args.apply(config);
    info!(report = ?config.report, format = ?config.format, "starting");

    let rt = Runtime::new().context("failed to start tokio runtime")?;
    rt.block_on(run(config))
}
