//! # Common Types
//!
//! This module contains the types shared by the loader, the aggregation
//! routines and the reports: the transaction row read from the data source
//! and the chart-ready records each report produces.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

/// One sales line item as read from the data source.
///
/// Numeric fields are already coerced (missing or unparseable values are `0.0`)
/// and the timestamp is `None` when it could not be parsed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionRow {
    /// Order identifier, trimmed
    pub order_id: String,
    /// Item code, e.g. `SET01`
    pub item_code: String,
    /// Item display name
    pub item_name: String,
    /// Item-group code, e.g. `BOT`
    pub group_code: String,
    /// Item-group display name
    pub group_name: String,
    /// Customer identifier
    pub customer_id: String,
    /// Line amount in VND
    pub amount: f64,
    /// Quantity sold on this line
    pub quantity: f64,
    /// Order creation time; date-only values resolve to midnight
    pub ordered_at: Option<NaiveDateTime>,
}

impl TransactionRow {
    /// `[code] name` label of the item.
    pub fn item_label(&self) -> String {
        format!("[{}] {}", self.item_code, self.item_name)
    }

    /// `[code] name` label of the item group.
    pub fn group_label(&self) -> String {
        format!("[{}] {}", self.group_code, self.group_name)
    }

    pub fn month(&self) -> Option<u32> {
        self.ordered_at.map(|t| t.month())
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.ordered_at.map(|t| t.date())
    }

    pub fn weekday(&self) -> Option<Weekday> {
        self.ordered_at.map(|t| t.weekday())
    }

    pub fn day_of_month(&self) -> Option<u32> {
        self.ordered_at.map(|t| t.day())
    }

    pub fn hour(&self) -> Option<u32> {
        self.ordered_at.map(|t| t.hour())
    }
}

/// Revenue and quantity summed over one category (item, group or month).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueRecord {
    /// Display label of the category
    pub label: String,
    /// Sum of amounts
    pub revenue: f64,
    /// Sum of quantities
    pub quantity: f64,
    /// Group code used for coloring, when the category belongs to one group
    pub group_code: Option<String>,
    /// Group display name, when the category belongs to one group
    pub group_name: Option<String>,
}

/// Per-day averages for one calendar bucket (weekday, day of month or hour).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarAverage {
    /// Natural sort key of the bucket (weekday index from Monday, day, hour)
    pub bucket: u32,
    pub label: String,
    pub average_revenue: f64,
    pub average_quantity: f64,
    pub total_revenue: f64,
    pub total_quantity: f64,
    /// Distinct calendar days that contributed at least one row
    pub day_count: usize,
}

/// Share of distinct orders that contain a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityRecord {
    pub label: String,
    /// Group code for coloring, if any
    pub group_code: Option<String>,
    /// Distinct orders containing the category
    pub orders: usize,
    /// Number of rows in the category
    pub rows: usize,
    /// `orders` over the distinct orders of the enclosing set
    pub probability: f64,
}

/// Probability list of the items within one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupBreakdown {
    pub group: String,
    pub items: Vec<ProbabilityRecord>,
}

/// One point of a monthly series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthPoint {
    /// Month number, 1 to 12
    pub month: u32,
    pub value: f64,
}

/// A gap-free series over months 1 to 12 for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySeries {
    pub category: String,
    pub points: Vec<MonthPoint>,
}

/// Monthly series of every item within one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSeries {
    pub group: String,
    pub series: Vec<MonthlySeries>,
}

/// Number of entities sharing one count value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyBucket {
    pub value: usize,
    pub entities: usize,
}

/// A half-open bin `[lower, upper)` and its member count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendBin {
    pub index: i64,
    pub lower: f64,
    pub upper: f64,
    pub label: String,
    pub count: usize,
}

/// Output of one report run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum ReportOutput {
    Revenue(Vec<RevenueRecord>),
    Calendar(Vec<CalendarAverage>),
    Probability(Vec<ProbabilityRecord>),
    MonthlyProbability(Vec<MonthlySeries>),
    GroupBreakdown(Vec<GroupBreakdown>),
    GroupMonthlyProbability(Vec<GroupSeries>),
    Frequency(Vec<FrequencyBucket>),
    Histogram(Vec<SpendBin>),
}

impl ReportOutput {
    /// Number of top-level records in the output.
    pub fn len(&self) -> usize {
        match self {
            Self::Revenue(v) => v.len(),
            Self::Calendar(v) => v.len(),
            Self::Probability(v) => v.len(),
            Self::MonthlyProbability(v) => v.len(),
            Self::GroupBreakdown(v) => v.len(),
            Self::GroupMonthlyProbability(v) => v.len(),
            Self::Frequency(v) => v.len(),
            Self::Histogram(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
