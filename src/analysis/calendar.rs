use super::REVENUE_FIELDS;
use crate::types::{CalendarAverage, TransactionRow};
use crate::utils::aggregation::{average_by_calendar_bucket, BucketAverage};

/// Business hours kept by the hourly report, inclusive.
pub const BUSINESS_HOURS: std::ops::RangeInclusive<u32> = 8..=23;

const WEEKDAY_LABELS: [&str; 7] = [
    "Thứ Hai",
    "Thứ Ba",
    "Thứ Tư",
    "Thứ Năm",
    "Thứ Sáu",
    "Thứ Bảy",
    "Chủ Nhật",
];

pub fn hour_label(hour: u32) -> String {
    format!("{:02}:00-{:02}:59", hour, hour)
}

fn into_records<F>(mut buckets: Vec<BucketAverage<u32, 2>>, label: F) -> Vec<CalendarAverage>
where
    F: Fn(u32) -> String,
{
    buckets.sort_by_key(|b| b.bucket);
    buckets
        .into_iter()
        .map(|b| CalendarAverage {
            bucket: b.bucket,
            label: label(b.bucket),
            average_revenue: b.averages[0],
            average_quantity: b.averages[1],
            total_revenue: b.totals[0],
            total_quantity: b.totals[1],
            day_count: b.days,
        })
        .collect()
}

/// Per-day average revenue and quantity by weekday, Monday first.
pub fn weekday_average(rows: &[TransactionRow]) -> Vec<CalendarAverage> {
    let buckets = average_by_calendar_bucket(
        rows,
        |r| r.weekday().map(|d| d.num_days_from_monday()),
        TransactionRow::date,
        REVENUE_FIELDS,
    );
    into_records(buckets, |index| WEEKDAY_LABELS[index as usize].to_string())
}

/// Per-day average revenue and quantity by day of month, 1 to 31.
pub fn day_of_month_average(rows: &[TransactionRow]) -> Vec<CalendarAverage> {
    let buckets = average_by_calendar_bucket(
        rows,
        TransactionRow::day_of_month,
        TransactionRow::date,
        REVENUE_FIELDS,
    );
    into_records(buckets, |day| format!("Ngày {:02}", day))
}

/// Per-day average revenue and quantity by hour of day. Hours outside
/// [`BUSINESS_HOURS`] are dropped.
pub fn hour_average(rows: &[TransactionRow]) -> Vec<CalendarAverage> {
    let buckets = average_by_calendar_bucket(
        rows,
        |r| r.hour().filter(|h| BUSINESS_HOURS.contains(h)),
        TransactionRow::date,
        REVENUE_FIELDS,
    );
    into_records(buckets, hour_label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::tests::row;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_weekday_average_by_distinct_days() {
        // 2024-01-01 and 2024-01-08 are Mondays, 2024-01-07 is a Sunday
        let rows = vec![
            row("O1", "A", "BOT", 100.0, 1.0, "2024-01-01 09:00:00"),
            row("O2", "A", "BOT", 100.0, 1.0, "2024-01-01 10:00:00"),
            row("O3", "A", "BOT", 400.0, 4.0, "2024-01-08 10:00:00"),
            row("O4", "A", "BOT", 70.0, 1.0, "2024-01-07 10:00:00"),
        ];

        let records = weekday_average(&rows);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].label, "Thứ Hai");
        assert_eq!(records[0].day_count, 2);
        assert_eq!(records[0].average_revenue, 300.0);
        assert_eq!(records[0].average_quantity, 3.0);
        assert_eq!(records[1].label, "Chủ Nhật");
        assert_eq!(records[1].average_revenue, 70.0);
    }

    #[test]
    fn test_day_of_month_average() {
        let rows = vec![
            row("O1", "A", "BOT", 100.0, 1.0, "2024-01-15"),
            row("O2", "A", "BOT", 300.0, 1.0, "2024-02-15"),
            row("O3", "A", "BOT", 50.0, 1.0, "2024-02-03"),
        ];

        let records = day_of_month_average(&rows);
        assert_eq!(records[0].bucket, 3);
        assert_eq!(records[1].bucket, 15);
        assert_eq!(records[1].day_count, 2);
        assert_eq!(records[1].average_revenue, 200.0);
        assert_eq!(records[1].total_revenue, 400.0);
    }

    #[test]
    fn test_hour_average_keeps_business_hours() {
        let rows = vec![
            row("O1", "A", "BOT", 100.0, 1.0, "2024-01-01 07:59:00"),
            row("O2", "A", "BOT", 100.0, 1.0, "2024-01-01 08:00:00"),
            row("O3", "A", "BOT", 100.0, 1.0, "2024-01-01 23:30:00"),
            row("O4", "A", "BOT", 100.0, 1.0, "2024-01-02 00:10:00"),
        ];

        let records = hour_average(&rows);
        let labels: Vec<&str> = records.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["08:00-08:59", "23:00-23:59"]);
    }

    #[test]
    fn test_undated_rows_are_excluded() {
        let rows = vec![row("O1", "A", "BOT", 100.0, 1.0, "n/a")];
        assert!(weekday_average(&rows).is_empty());
        assert!(day_of_month_average(&rows).is_empty());
        assert!(hour_average(&rows).is_empty());
    }
}
