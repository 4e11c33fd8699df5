//! Console tables of report outputs.

use tabled::builder::Builder;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::format::{format_int, FormatOptions};
use crate::types::{
    CalendarAverage, FrequencyBucket, MonthlySeries, ProbabilityRecord, ReportOutput,
    RevenueRecord, SpendBin,
};

#[derive(Debug, Clone, PartialEq, Tabled)]
pub struct RevenueRow {
    #[tabled(rename = "Nhãn")]
    pub label: String,
    #[tabled(rename = "Doanh thu")]
    pub revenue: String,
    #[tabled(rename = "Số lượng")]
    pub quantity: String,
}

#[derive(Debug, Clone, PartialEq, Tabled)]
pub struct CalendarRow {
    #[tabled(rename = "Nhãn")]
    pub label: String,
    #[tabled(rename = "TB doanh thu")]
    pub average_revenue: String,
    #[tabled(rename = "TB số lượng")]
    pub average_quantity: String,
    #[tabled(rename = "Số ngày")]
    pub days: usize,
}

#[derive(Debug, Clone, PartialEq, Tabled)]
pub struct ProbabilityRow {
    #[tabled(rename = "Nhãn")]
    pub label: String,
    #[tabled(rename = "Số đơn")]
    pub orders: usize,
    #[tabled(rename = "Số dòng")]
    pub rows: usize,
    #[tabled(rename = "Xác suất")]
    pub probability: String,
}

/// Item probability row prefixed with its group.
#[derive(Debug, Clone, PartialEq, Tabled)]
pub struct GroupItemRow {
    #[tabled(rename = "Nhóm")]
    pub group: String,
    #[tabled(inline)]
    pub item: ProbabilityRow,
}

#[derive(Debug, Clone, PartialEq, Tabled)]
pub struct FrequencyRow {
    #[tabled(rename = "Số lượt mua")]
    pub purchases: usize,
    #[tabled(rename = "Số khách hàng")]
    pub customers: usize,
}

#[derive(Debug, Clone, PartialEq, Tabled)]
pub struct SpendBinRow {
    #[tabled(rename = "Mức chi trả")]
    pub range: String,
    #[tabled(rename = "Số khách hàng")]
    pub customers: usize,
}

pub fn revenue_row(record: &RevenueRecord, format: &FormatOptions) -> RevenueRow {
    RevenueRow {
        label: record.label.clone(),
        revenue: format.currency_vnd(record.revenue),
        quantity: format_int(record.quantity),
    }
}

/// Averages keep one decimal, totals of whole units do not.
pub fn calendar_row(record: &CalendarAverage, format: &FormatOptions) -> CalendarRow {
    CalendarRow {
        label: record.label.clone(),
        average_revenue: format.currency_vnd(record.average_revenue),
        average_quantity: format!("{:.1}", record.average_quantity),
        days: record.day_count,
    }
}

pub fn probability_row(record: &ProbabilityRecord, format: &FormatOptions) -> ProbabilityRow {
    ProbabilityRow {
        label: record.label.clone(),
        orders: record.orders,
        rows: record.rows,
        probability: format.percent(record.probability),
    }
}

fn frequency_row(bucket: &FrequencyBucket) -> FrequencyRow {
    FrequencyRow {
        purchases: bucket.value,
        customers: bucket.entities,
    }
}

fn spend_bin_row(bin: &SpendBin) -> SpendBinRow {
    SpendBinRow {
        range: bin.label.clone(),
        customers: bin.count,
    }
}

/// Monthly series have one column per month, so they are built row by row.
fn series_table<'a, I>(leading: &[&str], series: I, format: &FormatOptions) -> Table
where
    I: IntoIterator<Item = (Option<&'a str>, &'a MonthlySeries)>,
{
    let mut builder = Builder::default();
    builder.push_record(
        leading
            .iter()
            .map(|h| h.to_string())
            .chain((1..=12).map(|m| format!("T{:02}", m))),
    );
    for (group, s) in series {
        builder.push_record(
            group
                .map(str::to_string)
                .into_iter()
                .chain(std::iter::once(s.category.clone()))
                .chain(s.points.iter().map(|p| format.percent(p.value))),
        );
    }
    builder.build()
}

/// Lay out a report output as a console table.
pub fn report_table(output: &ReportOutput, format: &FormatOptions) -> Table {
    let mut table = match output {
        ReportOutput::Revenue(records) => {
            Table::new(records.iter().map(|r| revenue_row(r, format)))
        }
        ReportOutput::Calendar(records) => {
            Table::new(records.iter().map(|r| calendar_row(r, format)))
        }
        ReportOutput::Probability(records) => {
            Table::new(records.iter().map(|r| probability_row(r, format)))
        }
        ReportOutput::MonthlyProbability(series) => {
            series_table(&["Nhãn"], series.iter().map(|s| (None, s)), format)
        }
        ReportOutput::GroupBreakdown(groups) => Table::new(groups.iter().flat_map(|g| {
            g.items.iter().map(move |r| GroupItemRow {
                group: g.group.clone(),
                item: probability_row(r, format),
            })
        })),
        ReportOutput::GroupMonthlyProbability(groups) => series_table(
            &["Nhóm", "Nhãn"],
            groups
                .iter()
                .flat_map(|g| g.series.iter().map(move |s| (Some(g.group.as_str()), s))),
            format,
        ),
        ReportOutput::Frequency(buckets) => Table::new(buckets.iter().map(frequency_row)),
        ReportOutput::Histogram(bins) => Table::new(bins.iter().map(spend_bin_row)),
    };
    table.with(Style::psql());
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GroupSeries, MonthPoint};
    use pretty_assertions::assert_eq;

    fn calendar(average_quantity: f64) -> CalendarAverage {
        CalendarAverage {
            bucket: 0,
            label: "Thứ Hai".to_string(),
            average_revenue: 1_500_000.0,
            average_quantity,
            total_revenue: 3_000_000.0,
            total_quantity: average_quantity * 2.0,
            day_count: 2,
        }
    }

    #[test]
    fn test_calendar_row_keeps_fractional_average() {
        let row = calendar_row(&calendar(2.5), &FormatOptions::default());
        assert_eq!(row.average_quantity, "2.5");
        assert_eq!(row.average_revenue, "2 triệu VND");
        assert_eq!(row.days, 2);

        let rendered = report_table(
            &ReportOutput::Calendar(vec![calendar(2.5)]),
            &FormatOptions::default(),
        )
        .to_string();
        assert!(rendered.contains("2.5"));
        assert!(!rendered.contains(" 3 "));
    }

    #[test]
    fn test_revenue_row_formats_currency() {
        let record = RevenueRecord {
            label: "[BOT] Bột".to_string(),
            revenue: 2_500_000.0,
            quantity: 1_200.0,
            group_code: Some("BOT".to_string()),
            group_name: Some("Bột".to_string()),
        };
        assert_eq!(
            revenue_row(&record, &FormatOptions::default()),
            RevenueRow {
                label: "[BOT] Bột".to_string(),
                revenue: "3 triệu VND".to_string(),
                quantity: "1,200".to_string(),
            }
        );
    }

    #[test]
    fn test_frequency_table_has_headers_and_rows() {
        let output = ReportOutput::Frequency(vec![
            FrequencyBucket {
                value: 1,
                entities: 12,
            },
            FrequencyBucket {
                value: 2,
                entities: 3,
            },
        ]);
        let rendered = report_table(&output, &FormatOptions::default()).to_string();
        let lines: Vec<&str> = rendered.lines().collect();

        assert!(lines[0].contains("Số lượt mua"));
        assert!(lines[0].contains("Số khách hàng"));
        // header, separator, two rows
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_group_series_table_has_month_columns() {
        let output = ReportOutput::GroupMonthlyProbability(vec![GroupSeries {
            group: "[BOT] Bột".to_string(),
            series: vec![MonthlySeries {
                category: "[BOT01] Bột sắn".to_string(),
                points: (1..=12)
                    .map(|month| MonthPoint {
                        month,
                        value: if month == 3 { 0.25 } else { 0.0 },
                    })
                    .collect(),
            }],
        }]);
        let rendered = report_table(&output, &FormatOptions::default()).to_string();

        assert!(rendered.contains("T01"));
        assert!(rendered.contains("T12"));
        assert!(rendered.contains("[BOT] Bột"));
        assert!(rendered.contains("25.0%"));
    }
}
