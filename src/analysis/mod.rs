//! # Reports
//!
//! Each report is a thin configuration of the generic routines in
//! [`crate::utils::aggregation`]. [`Report`] names them and [`run_report`]
//! dispatches a loaded row set to one of them.

mod basket;
mod calendar;
mod customer;
mod revenue;


use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{info, instrument};

pub use basket::{
    group_probability, group_probability_by_month, item_probability_by_group,
    item_probability_by_group_month,
};
pub use calendar::{day_of_month_average, hour_average, hour_label, weekday_average, BUSINESS_HOURS};
pub use customer::{purchase_frequency, spend_histogram};
pub use revenue::{month_label, revenue_by_group, revenue_by_item, revenue_by_month};

use crate::config::{ReportConfig, DEFAULT_BREAKDOWN_GROUPS};
use crate::error::{SalesError, SalesResult};
use crate::source::load_rows_async;
use crate::types::{ReportOutput, TransactionRow};
use crate::utils::aggregation::ValueFn;

fn amount(row: &TransactionRow) -> f64 {
    row.amount
}

fn quantity(row: &TransactionRow) -> f64 {
    row.quantity
}

pub(crate) const REVENUE_FIELDS: [ValueFn<TransactionRow>; 2] = [amount, quantity];
pub(crate) const SPEND_FIELD: [ValueFn<TransactionRow>; 1] = [amount];

/// The available reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Report {
    RevenueByItem,
    RevenueByGroup,
    RevenueByMonth,
    WeekdayAverage,
    DayOfMonthAverage,
    HourAverage,
    GroupProbability,
    GroupProbabilityByMonth,
    ItemProbabilityByGroup,
    ItemProbabilityByGroupMonth,
    PurchaseFrequency,
    SpendHistogram,
}

impl Report {
    pub const ALL: [Report; 12] = [
        Report::RevenueByItem,
        Report::RevenueByGroup,
        Report::RevenueByMonth,
        Report::WeekdayAverage,
        Report::DayOfMonthAverage,
        Report::HourAverage,
        Report::GroupProbability,
        Report::GroupProbabilityByMonth,
        Report::ItemProbabilityByGroup,
        Report::ItemProbabilityByGroupMonth,
        Report::PurchaseFrequency,
        Report::SpendHistogram,
    ];

    /// Chart caption.
    pub fn title(self) -> &'static str {
        match self {
            Report::RevenueByItem => "Doanh số bán hàng theo Mặt hàng",
            Report::RevenueByGroup => "Doanh số bán hàng theo Nhóm hàng",
            Report::RevenueByMonth => "Doanh số bán hàng theo Tháng",
            Report::WeekdayAverage => {
                "Doanh số bán hàng trung bình theo Ngày trong tuần"
            }
            Report::DayOfMonthAverage => {
                "Doanh số bán hàng trung bình theo Ngày trong tháng"
            }
            Report::HourAverage => "Doanh số bán hàng trung bình theo Khung giờ",
            Report::GroupProbability => "Xác suất bán hàng theo Nhóm hàng",
            Report::GroupProbabilityByMonth => {
                "Xác suất bán hàng của Nhóm hàng theo Tháng"
            }
            Report::ItemProbabilityByGroup => {
                "Xác suất bán hàng của Mặt hàng theo Nhóm hàng"
            }
            Report::ItemProbabilityByGroupMonth => {
                "Xác suất bán hàng của Mặt hàng theo Nhóm hàng trong từng Tháng"
            }
            Report::PurchaseFrequency => "Phân phối Lượt mua hàng",
            Report::SpendHistogram => "Phân phối Mức chi trả của Khách hàng",
        }
    }

    /// Whether the report needs order timestamps.
    pub fn is_time_bucketed(self) -> bool {
        matches!(
            self,
            Report::RevenueByMonth
                | Report::WeekdayAverage
                | Report::DayOfMonthAverage
                | Report::HourAverage
                | Report::GroupProbabilityByMonth
                | Report::ItemProbabilityByGroupMonth
        )
    }
}

/// Run one report over rows already in memory.
///
/// # Errors
///
/// Only the spend histogram can fail, on an invalid bin size.
pub fn run_report(
    report: Report,
    rows: &[TransactionRow],
    config: &ReportConfig,
) -> SalesResult<ReportOutput> {
    let output = match report {
        Report::RevenueByItem => ReportOutput::Revenue(revenue_by_item(rows, config.top_n)),
        Report::RevenueByGroup => ReportOutput::Revenue(revenue_by_group(rows, config.top_n)),
        Report::RevenueByMonth => ReportOutput::Revenue(revenue_by_month(rows)),
        Report::WeekdayAverage => ReportOutput::Calendar(weekday_average(rows)),
        Report::DayOfMonthAverage => ReportOutput::Calendar(day_of_month_average(rows)),
        Report::HourAverage => ReportOutput::Calendar(hour_average(rows)),
        Report::GroupProbability => {
            ReportOutput::Probability(group_probability(rows, config.top_n))
        }
        Report::GroupProbabilityByMonth => {
            ReportOutput::MonthlyProbability(group_probability_by_month(rows))
        }
        Report::ItemProbabilityByGroup => ReportOutput::GroupBreakdown(item_probability_by_group(
            rows,
            config.top_n,
            config.max_groups.or(Some(DEFAULT_BREAKDOWN_GROUPS)),
        )),
        Report::ItemProbabilityByGroupMonth => ReportOutput::GroupMonthlyProbability(
            item_probability_by_group_month(rows, config.max_groups),
        ),
        Report::PurchaseFrequency => ReportOutput::Frequency(purchase_frequency(rows)),
        Report::SpendHistogram => ReportOutput::Histogram(spend_histogram(rows, config.bin_size)?),
    };
    Ok(output)
}

/// Load the configured data source and run the configured report.
///
/// # Errors
///
/// Fails when the configuration is invalid, no input is set, or the data
/// source cannot be loaded. No partial output is produced.
#[instrument(skip(config), fields(report = ?config.report))]
pub async fn analyze_async(config: &ReportConfig) -> SalesResult<ReportOutput> {
    config.validate()?;
    let input = config
        .input
        .clone()
        .ok_or_else(|| SalesError::validation("no input data source configured"))?;

    let start_time = Instant::now();
    let rows = load_rows_async(input, config.columns.clone()).await?;

    if config.report.is_time_bucketed() {
        let undated = rows.iter().filter(|r| r.ordered_at.is_none()).count();
        if undated > 0 {
            info!(undated, "rows without a parseable timestamp are excluded from this report");
        }
    }

    let output = run_report(config.report, &rows, config)?;
    info!(
        rows = rows.len(),
        records = output.len(),
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "report complete"
    );
    Ok(output)
}
