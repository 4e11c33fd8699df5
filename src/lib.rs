//! # Sales Statistics Library
//!
//! `salestats` aggregates sales-transaction exports into the reports behind a
//! set of sales dashboards: revenue rankings, calendar averages, order
//! probabilities and customer distributions.
//!
//! ## Features
//!
//! - Load transaction rows from a CSV export with configurable headers
//! - Twelve reports built on six generic aggregation routines
//! - Deterministic first-seen ordering of groups
//! - Output as JSON, a plain-text table, or an SVG chart
//! - TOML/JSON configuration with CLI overrides
//!
//! ## Example
//!
//! ```no_run
//! use salestats::{analyze_async, Report, ReportConfig};
//!
//! # async fn run() -> salestats::SalesResult<()> {
//! let config = ReportConfig {
//!     input: Some("sales.csv".into()),
//!     report: Report::GroupProbability,
//!     ..Default::default()
//! };
//! let output = analyze_async(&config).await?;
//! println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod config;
pub mod error;
pub mod logger;
pub mod plotting;
pub mod source;
pub mod types;
pub mod utils;

// Re-export main types for convenience
pub use analysis::{analyze_async, run_report, Report};
pub use config::{load_config, OutputFormat, ReportConfig};
pub use error::{SalesError, SalesResult};
pub use plotting::{RenderContext, RenderTarget};
pub use source::{load_rows, load_rows_async};
pub use types::{ReportOutput, TransactionRow};
