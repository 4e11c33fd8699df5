//! Generic grouping routines shared by every report.
//!
//! Each routine is a single pass over borrowed rows, parameterised by key and
//! value extraction functions. Grouped outputs keep first-seen key order so
//! callers decide the final sort.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::Hash;

use crate::error::{SalesError, SalesResult};

/// Extracts one numeric field from a row.
pub type ValueFn<T> = fn(&T) -> f64;

/// Months covered by a monthly series.
pub const MONTHS: std::ops::RangeInclusive<u32> = 1..=12;

/// Sum `value_fns` per key, in first-seen key order.
pub fn sum_by_key<'a, T, K, I, F, const N: usize>(
    rows: I,
    key_fn: F,
    value_fns: [ValueFn<T>; N],
) -> Vec<(K, [f64; N])>
where
    T: 'a,
    I: IntoIterator<Item = &'a T>,
    K: Eq + Hash + Clone,
    F: Fn(&'a T) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, [f64; N])> = Vec::new();

    for row in rows {
        let key = key_fn(row);
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            groups.push((key, [0.0; N]));
            groups.len() - 1
        });
        let sums = &mut groups[slot].1;
        for (sum, value_fn) in sums.iter_mut().zip(value_fns.iter()) {
            *sum += value_fn(row);
        }
    }

    groups
}

/// Count the distinct values of `count_key_fn` within each group, in
/// first-seen group order.
pub fn distinct_count<'a, T, G, C, I, FC, FG>(
    rows: I,
    count_key_fn: FC,
    group_key_fn: FG,
) -> Vec<(G, usize)>
where
    T: 'a,
    I: IntoIterator<Item = &'a T>,
    G: Eq + Hash + Clone,
    C: Eq + Hash,
    FC: Fn(&'a T) -> C,
    FG: Fn(&'a T) -> G,
{
    let mut index: HashMap<G, usize> = HashMap::new();
    let mut groups: Vec<(G, HashSet<C>)> = Vec::new();

    for row in rows {
        let key = group_key_fn(row);
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            groups.push((key, HashSet::new()));
            groups.len() - 1
        });
        groups[slot].1.insert(count_key_fn(row));
    }

    groups
        .into_iter()
        .map(|(key, seen)| (key, seen.len()))
        .collect()
}

/// Distinct values of `count_key_fn` over all rows.
pub fn distinct_total<'a, T, C, I, FC>(rows: I, count_key_fn: FC) -> usize
where
    T: 'a,
    I: IntoIterator<Item = &'a T>,
    C: Eq + Hash,
    FC: Fn(&'a T) -> C,
{
    rows.into_iter().map(count_key_fn).collect::<HashSet<_>>().len()
}

/// `numerator / denominator`, or 0 when the denominator is 0.
pub fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Per-bucket sums divided by the distinct days contributing to the bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketAverage<B, const N: usize> {
    pub bucket: B,
    pub totals: [f64; N],
    pub averages: [f64; N],
    pub days: usize,
}

/// Sum `value_fns` per calendar bucket and divide by the number of distinct
/// days seen in that bucket. Rows without a bucket are skipped; a bucket with
/// no day keys averages to 0.
pub fn average_by_calendar_bucket<'a, T, B, D, I, FB, FD, const N: usize>(
    rows: I,
    bucket_fn: FB,
    day_key_fn: FD,
    value_fns: [ValueFn<T>; N],
) -> Vec<BucketAverage<B, N>>
where
    T: 'a,
    I: IntoIterator<Item = &'a T>,
    B: Eq + Hash + Clone,
    D: Eq + Hash,
    FB: Fn(&'a T) -> Option<B>,
    FD: Fn(&'a T) -> Option<D>,
{
    let mut index: HashMap<B, usize> = HashMap::new();
    let mut groups: Vec<(B, [f64; N], HashSet<D>)> = Vec::new();

    for row in rows {
        let Some(bucket) = bucket_fn(row) else {
            continue;
        };
        let slot = *index.entry(bucket.clone()).or_insert_with(|| {
            groups.push((bucket, [0.0; N], HashSet::new()));
            groups.len() - 1
        });
        let (_, sums, days) = &mut groups[slot];
        for (sum, value_fn) in sums.iter_mut().zip(value_fns.iter()) {
            *sum += value_fn(row);
        }
        if let Some(day) = day_key_fn(row) {
            days.insert(day);
        }
    }

    groups
        .into_iter()
        .map(|(bucket, totals, days)| {
            let days = days.len();
            let averages = totals.map(|total| if days > 0 { total / days as f64 } else { 0.0 });
            BucketAverage {
                bucket,
                totals,
                averages,
                days,
            }
        })
        .collect()
}

/// A half-open bin `[lower, upper)` of a fixed-width histogram.
#[derive(Debug, Clone, PartialEq)]
pub struct Bin {
    pub index: i64,
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Assign every value to bin `floor(value / bin_size)` and count members.
/// Bins come back ascending by lower bound; empty bins are not emitted and
/// non-finite values are ignored.
pub fn bin_by_fixed_width<I>(values: I, bin_size: f64) -> SalesResult<Vec<Bin>>
where
    I: IntoIterator<Item = f64>,
{
    if !bin_size.is_finite() || bin_size <= 0.0 {
        return Err(SalesError::validation(format!(
            "bin size must be a positive number, got {}",
            bin_size
        )));
    }

    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for value in values.into_iter().filter(|v| v.is_finite()) {
        let index = (value / bin_size).floor() as i64;
        *counts.entry(index).or_insert(0) += 1;
    }

    Ok(counts
        .into_iter()
        .map(|(index, count)| {
            let lower = index as f64 * bin_size;
            Bin {
                index,
                lower,
                upper: lower + bin_size,
                count,
            }
        })
        .collect())
}

/// Histogram of a per-entity count: `(count value, entities with that count)`
/// ascending by count value.
pub fn frequency_distribution<I>(counts: I) -> Vec<(usize, usize)>
where
    I: IntoIterator<Item = usize>,
{
    let mut distribution: BTreeMap<usize, usize> = BTreeMap::new();
    for count in counts {
        *distribution.entry(count).or_insert(0) += 1;
    }
    distribution.into_iter().collect()
}

/// Two-level month × category grouping with every category back-filled to a
/// complete 1..=12 series. Values landing on the same (month, category) are
/// summed; months outside 1..=12 are ignored. Categories keep first-seen order.
pub fn time_series_by_month_and_category<C, I>(points: I) -> Vec<(C, Vec<(u32, f64)>)>
where
    I: IntoIterator<Item = (u32, C, f64)>,
    C: Eq + Hash + Clone,
{
    let mut index: HashMap<C, usize> = HashMap::new();
    let mut series: Vec<(C, [f64; 12])> = Vec::new();

    for (month, category, value) in points {
        if !MONTHS.contains(&month) {
            continue;
        }
        let slot = *index.entry(category.clone()).or_insert_with(|| {
            series.push((category, [0.0; 12]));
            series.len() - 1
        });
        series[slot].1[(month - 1) as usize] += value;
    }

    series
        .into_iter()
        .map(|(category, values)| {
            let full = MONTHS.zip(values).collect();
            (category, full)
        })
        .collect()
}

/// Sort descending by `value_fn`, keeping input order on ties.
pub fn sort_descending_by<T, F>(records: &mut [T], value_fn: F)
where
    F: Fn(&T) -> f64,
{
    records.sort_by(|a, b| {
        value_fn(b)
            .partial_cmp(&value_fn(a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Keep the first `top_n` records when a cutoff is set.
pub fn truncate_top<T>(records: &mut Vec<T>, top_n: Option<usize>) {
    if let Some(n) = top_n.filter(|n| *n > 0) {
        records.truncate(n);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Clone)]
    struct Line {
        order: &'static str,
        item: &'static str,
        amount: f64,
        qty: f64,
        day: Option<u32>,
        bucket: Option<u32>,
    }

    fn line(order: &'static str, item: &'static str, amount: f64, qty: f64) -> Line {
        Line {
            order,
            item,
            amount,
            qty,
            day: Some(1),
            bucket: Some(1),
        }
    }

    fn amount(l: &Line) -> f64 {
        l.amount
    }

    fn qty(l: &Line) -> f64 {
        l.qty
    }

    #[test]
    fn test_sum_by_key_keeps_first_seen_order() {
        let rows = vec![
            line("O1", "X", 100.0, 2.0),
            line("O1", "X", 50.0, 1.0),
            line("O2", "Y", 200.0, 1.0),
        ];

        let sums = sum_by_key(&rows, |l| l.item, [amount as ValueFn<Line>, qty]);
        assert_eq!(sums, vec![("X", [150.0, 3.0]), ("Y", [200.0, 1.0])]);
    }

    #[test]
    fn test_sum_by_key_partition_sum() {
        let rows: Vec<Line> = (0..40)
            .map(|i| {
                let item = ["A", "B", "C"][i % 3];
                line("O", item, i as f64 * 1.5, 1.0)
            })
            .collect();

        let total: f64 = rows.iter().map(|l| l.amount).sum();
        let grouped: f64 = sum_by_key(&rows, |l| l.item, [amount as ValueFn<Line>])
            .iter()
            .map(|(_, [s])| s)
            .sum();
        assert!((total - grouped).abs() < 1e-9);
    }

    #[test]
    fn test_distinct_count_deduplicates_orders() {
        let rows = vec![
            line("O1", "X", 100.0, 2.0),
            line("O1", "X", 50.0, 1.0),
            line("O2", "Y", 200.0, 1.0),
        ];

        let counts = distinct_count(&rows, |l| l.order, |l| l.item);
        assert_eq!(counts, vec![("X", 1), ("Y", 1)]);
        assert_eq!(distinct_total(&rows, |l| l.order), 2);
    }

    #[test]
    fn test_distinct_count_idempotent_under_duplication() {
        let rows = vec![
            line("O1", "X", 1.0, 1.0),
            line("O2", "X", 1.0, 1.0),
            line("O3", "Y", 1.0, 1.0),
        ];
        let doubled: Vec<Line> = rows.iter().chain(rows.iter()).cloned().collect();

        assert_eq!(
            distinct_count(&rows, |l| l.order, |l| l.item),
            distinct_count(&doubled, |l| l.order, |l| l.item)
        );
    }

    #[test]
    fn test_ratio_with_zero_denominator() {
        assert_eq!(ratio(3, 0), 0.0);
        assert_eq!(ratio(1, 4), 0.25);
    }

    #[test]
    fn test_average_divides_by_distinct_days() {
        let mut rows = vec![
            line("O1", "X", 100.0, 1.0),
            line("O2", "X", 300.0, 3.0),
            line("O3", "X", 200.0, 2.0),
        ];
        rows[2].day = Some(2);

        let averages = average_by_calendar_bucket(
            &rows,
            |l| l.bucket,
            |l| l.day,
            [amount as ValueFn<Line>, qty],
        );
        assert_eq!(averages.len(), 1);
        assert_eq!(averages[0].days, 2);
        assert_eq!(averages[0].totals, [600.0, 6.0]);
        assert_eq!(averages[0].averages, [300.0, 3.0]);
    }

    #[test]
    fn test_average_without_days_is_zero() {
        let mut row = line("O1", "X", 100.0, 1.0);
        row.day = None;

        let averages = average_by_calendar_bucket(
            std::iter::once(&row),
            |l| l.bucket,
            |l| l.day,
            [amount as ValueFn<Line>],
        );
        assert_eq!(averages[0].days, 0);
        assert_eq!(averages[0].averages, [0.0]);
        assert_eq!(averages[0].totals, [100.0]);
    }

    #[test]
    fn test_average_skips_rows_without_bucket() {
        let mut row = line("O1", "X", 100.0, 1.0);
        row.bucket = None;

        let averages = average_by_calendar_bucket(
            std::iter::once(&row),
            |l| l.bucket,
            |l| l.day,
            [amount as ValueFn<Line>],
        );
        assert!(averages.is_empty());
    }

    #[test]
    fn test_bin_boundaries() {
        let bins = bin_by_fixed_width(vec![120_000.0, 50_000.0, 49_999.0], 50_000.0).unwrap();
        assert_eq!(
            bins,
            vec![
                Bin {
                    index: 0,
                    lower: 0.0,
                    upper: 50_000.0,
                    count: 1,
                },
                Bin {
                    index: 1,
                    lower: 50_000.0,
                    upper: 100_000.0,
                    count: 1,
                },
                Bin {
                    index: 2,
                    lower: 100_000.0,
                    upper: 150_000.0,
                    count: 1,
                },
            ]
        );
    }

    #[test]
    fn test_bin_rejects_non_positive_size() {
        assert!(bin_by_fixed_width(vec![1.0], 0.0).is_err());
        assert!(bin_by_fixed_width(vec![1.0], -5.0).is_err());
        assert!(bin_by_fixed_width(vec![1.0], f64::NAN).is_err());
    }

    #[test]
    fn test_frequency_distribution() {
        let distribution = frequency_distribution(vec![1, 3, 1, 2, 1, 3]);
        assert_eq!(distribution, vec![(1, 3), (2, 1), (3, 2)]);
    }

    #[test]
    fn test_time_series_backfills_months() {
        let series = time_series_by_month_and_category(vec![(3, "A", 0.5), (7, "A", 0.25)]);
        assert_eq!(series.len(), 1);

        let (category, points) = &series[0];
        assert_eq!(*category, "A");
        assert_eq!(points.len(), 12);
        for (month, value) in points {
            match month {
                3 => assert_eq!(*value, 0.5),
                7 => assert_eq!(*value, 0.25),
                _ => assert_eq!(*value, 0.0),
            }
        }
    }

    #[test]
    fn test_time_series_ignores_out_of_range_months() {
        let series = time_series_by_month_and_category(vec![(0, "A", 1.0), (13, "A", 1.0)]);
        assert!(series.is_empty());
    }

    #[test]
    fn test_sort_descending_is_stable() {
        let mut records = vec![("a", 1.0), ("b", 2.0), ("c", 1.0)];
        sort_descending_by(&mut records, |r| r.1);
        assert_eq!(records, vec![("b", 2.0), ("a", 1.0), ("c", 1.0)]);

        truncate_top(&mut records, Some(2));
        assert_eq!(records.len(), 2);
        truncate_top(&mut records, None);
        assert_eq!(records.len(), 2);
    }
}
