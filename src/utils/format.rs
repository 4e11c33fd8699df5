//! Number formatting for labels, tables and tooltips-equivalent text.

use serde::{Deserialize, Serialize};

const MILLION: f64 = 1e6;
const BILLION: f64 = 1e9;

/// Currency and percentage display preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    /// Amounts at or above this are shown in billions ("tỷ")
    pub billion_threshold: f64,
    /// Decimal places for percentages
    pub percent_decimals: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            billion_threshold: BILLION,
            percent_decimals: 1,
        }
    }
}

impl FormatOptions {
    /// Amount in millions or billions depending on the threshold.
    pub fn currency(&self, value: f64) -> String {
        if value >= self.billion_threshold {
            format!("{:.1} tỷ", value / BILLION)
        } else {
            format_millions(value)
        }
    }

    pub fn currency_vnd(&self, value: f64) -> String {
        format!("{} VND", self.currency(value))
    }

    pub fn percent(&self, ratio: f64) -> String {
        format_percent(ratio, self.percent_decimals)
    }
}

/// Thousands-grouped integer, e.g. `1,234,567`.
pub fn format_int(value: f64) -> String {
    let rounded = value.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Amount in whole millions, e.g. `1,250 triệu`.
pub fn format_millions(value: f64) -> String {
    format!("{} triệu", format_int(value / MILLION))
}

pub fn format_percent(ratio: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, ratio * 100.0)
}

/// Compact axis label: `1.5M`, `12.0K`, `950`.
pub fn format_compact(value: f64) -> String {
    if value.abs() >= MILLION {
        format!("{:.1}M", value / MILLION)
    } else if value.abs() >= 1_000.0 {
        format!("{:.1}K", value / 1_000.0)
    } else {
        format!("{:.0}", value)
    }
}
