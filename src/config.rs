//! # Configuration
//!
//! A typed replacement for per-chart option bags. Values come from an optional
//! TOML/JSON file and are overridden by CLI flags; `validate` is run once at
//! the boundary before any data is loaded.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::analysis::Report;
use crate::error::{SalesError, SalesResult};
use crate::utils::FormatOptions;

/// Default width of a spend-histogram bin, in VND.
pub const DEFAULT_BIN_SIZE: f64 = 50_000.0;

/// Panels drawn by the per-group item breakdown when `max_groups` is unset.
pub const DEFAULT_BREAKDOWN_GROUPS: usize = 5;

/// How a report is emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
    Svg,
}

/// Outer chart margins in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margin {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            top: 10,
            right: 20,
            bottom: 10,
            left: 10,
        }
    }
}

/// Header names of the input CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    pub order_id: String,
    pub item_code: String,
    pub item_name: String,
    pub group_code: String,
    pub group_name: String,
    pub customer_id: String,
    pub amount: String,
    /// Tried in order; the first non-empty value wins
    pub quantity: Vec<String>,
    pub ordered_at: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            order_id: "Mã đơn hàng".to_string(),
            item_code: "Mã mặt hàng".to_string(),
            item_name: "Tên mặt hàng".to_string(),
            group_code: "Mã nhóm hàng".to_string(),
            group_name: "Tên nhóm hàng".to_string(),
            customer_id: "Mã khách hàng".to_string(),
            amount: "Thành tiền".to_string(),
            quantity: vec![
                "SL".to_string(),
                "Số lượng bán".to_string(),
                "Số lượng".to_string(),
            ],
            ordered_at: "Thời gian tạo đơn".to_string(),
        }
    }
}

/// Everything one report run needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// CSV data source
    pub input: Option<PathBuf>,
    /// Output file; stdout when absent (required for SVG)
    pub output: Option<PathBuf>,
    pub report: Report,
    pub format: OutputFormat,
    /// Canvas width in pixels
    pub width: u32,
    /// Canvas height in pixels
    pub height: u32,
    pub margin: Margin,
    /// Spend-histogram bin width
    pub bin_size: f64,
    /// Keep only the first N records of ranked lists
    pub top_n: Option<usize>,
    /// Keep only the first N groups of per-group reports; the item breakdown
    /// falls back to [`DEFAULT_BREAKDOWN_GROUPS`]
    pub max_groups: Option<usize>,
    pub columns: ColumnMap,
    pub format_options: FormatOptions,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            input: None,
            output: None,
            report: Report::RevenueByItem,
            format: OutputFormat::Json,
            width: 1200,
            height: 600,
            margin: Margin::default(),
            bin_size: DEFAULT_BIN_SIZE,
            top_n: None,
            max_groups: None,
            columns: ColumnMap::default(),
            format_options: FormatOptions::default(),
        }
    }
}

impl ReportConfig {
    /// Checks the values the aggregation and rendering rely on.
    ///
    /// # Errors
    ///
    /// Returns `SalesError::Validation` naming the first offending field.
    pub fn validate(&self) -> SalesResult<()> {
        if !self.bin_size.is_finite() || self.bin_size <= 0.0 {
            return Err(SalesError::validation(format!(
                "bin_size must be > 0, got {}",
                self.bin_size
            )));
        }
        if self.top_n == Some(0) {
            return Err(SalesError::validation("top_n must be >= 1"));
        }
        if self.max_groups == Some(0) {
            return Err(SalesError::validation("max_groups must be >= 1"));
        }
        if self.margin.left.saturating_add(self.margin.right) >= self.width {
            return Err(SalesError::validation(format!(
                "horizontal margins ({} + {}) leave no room in width {}",
                self.margin.left, self.margin.right, self.width
            )));
        }
        if self.margin.top.saturating_add(self.margin.bottom) >= self.height {
            return Err(SalesError::validation(format!(
                "vertical margins ({} + {}) leave no room in height {}",
                self.margin.top, self.margin.bottom, self.height
            )));
        }
        if self.format == OutputFormat::Svg && self.output.is_none() {
            return Err(SalesError::validation("svg output requires an output path"));
        }
        if self.columns.quantity.is_empty() {
            return Err(SalesError::validation(
                "columns.quantity must name at least one column",
            ));
        }
        if self.format_options.billion_threshold <= 0.0 {
            return Err(SalesError::validation("billion_threshold must be > 0"));
        }
        Ok(())
    }
}

/// Loads a configuration file from the provided path, or `salestats.toml`
/// in the working directory when it exists.
///
/// # Errors
///
/// Returns an error when the file cannot be read or parsed.
pub fn load_config(path: Option<&Path>) -> SalesResult<Option<ReportConfig>> {
    if let Some(path) = path {
        return Ok(Some(load_config_file(path)?));
    }

    let default_path = PathBuf::from("salestats.toml");
    if default_path.exists() {
        return Ok(Some(load_config_file(&default_path)?));
    }

    Ok(None)
}

pub(crate) fn load_config_file(path: &Path) -> SalesResult<ReportConfig> {
    let content = std::fs::read_to_string(path).map_err(|source| SalesError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    let parse_error = |message: String| SalesError::ConfigParse {
        path: path.to_path_buf(),
        message,
    };
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => toml::from_str(&content).map_err(|err| parse_error(err.to_string())),
        Some("json") => serde_json::from_str(&content).map_err(|err| parse_error(err.to_string())),
        Some(ext) => Err(parse_error(format!(
            "unsupported extension '{}', use .toml or .json",
            ext
        ))),
        None => Err(parse_error("config file must have a .toml or .json extension".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        assert!(ReportConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = ReportConfig {
            bin_size: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ReportConfig {
            top_n: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ReportConfig {
            width: 25,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ReportConfig {
            margin: Margin {
                left: u32::MAX,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(SalesError::Validation(_))));

        let config = ReportConfig {
            margin: Margin {
                top: u32::MAX,
                bottom: u32::MAX,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(SalesError::Validation(_))));

        let config = ReportConfig {
            format: OutputFormat::Svg,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_toml_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("salestats.toml");
        std::fs::write(
            &path,
            r#"
report = "spend-histogram"
format = "table"
bin_size = 100000.0
top_n = 5

[margin]
left = 120

[columns]
amount = "Amount"
"#,
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(config.report, Report::SpendHistogram);
        assert_eq!(config.format, OutputFormat::Table);
        assert_eq!(config.bin_size, 100_000.0);
        assert_eq!(config.top_n, Some(5));
        assert_eq!(config.margin.left, 120);
        assert_eq!(config.margin.top, 10);
        assert_eq!(config.columns.amount, "Amount");
        assert_eq!(config.columns.order_id, "Mã đơn hàng");
    }

    #[test]
    fn test_load_config_errors() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            load_config(Some(&missing)),
            Err(SalesError::ConfigRead { .. })
        ));

        let bad = dir.path().join("config.yaml");
        std::fs::write(&bad, "report: x").unwrap();
        assert!(matches!(
            load_config(Some(&bad)),
            Err(SalesError::ConfigParse { .. })
        ));
    }
}
