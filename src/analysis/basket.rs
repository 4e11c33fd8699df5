//! Order probabilities: the share of distinct orders that contain a group or
//! an item, relative to all orders or to the orders of the enclosing group.

use std::collections::HashMap;

use crate::types::{
    GroupBreakdown, GroupSeries, MonthPoint, MonthlySeries, ProbabilityRecord, TransactionRow,
};
use crate::utils::aggregation::{
    distinct_count, distinct_total, ratio, sort_descending_by, time_series_by_month_and_category,
    truncate_top,
};

fn order_id(row: &TransactionRow) -> &str {
    row.order_id.as_str()
}

fn row_counts<'a, K, F>(rows: &'a [TransactionRow], key_fn: F) -> HashMap<K, usize>
where
    K: Eq + std::hash::Hash,
    F: Fn(&'a TransactionRow) -> K,
{
    let mut counts = HashMap::new();
    for row in rows {
        *counts.entry(key_fn(row)).or_insert(0) += 1;
    }
    counts
}

fn into_series(series: Vec<(String, Vec<(u32, f64)>)>) -> Vec<MonthlySeries> {
    series
        .into_iter()
        .map(|(category, points)| MonthlySeries {
            category,
            points: points
                .into_iter()
                .map(|(month, value)| MonthPoint { month, value })
                .collect(),
        })
        .collect()
}

/// Share of all distinct orders containing each item group, most likely first.
pub fn group_probability(rows: &[TransactionRow], top_n: Option<usize>) -> Vec<ProbabilityRecord> {
    let total_orders = distinct_total(rows, order_id);
    let group_key = |r: &'_ TransactionRow| (r.group_code.clone(), r.group_name.clone());
    let lines = row_counts(rows, group_key);

    let mut records: Vec<ProbabilityRecord> = distinct_count(rows, order_id, group_key)
        .into_iter()
        .map(|((code, name), orders)| ProbabilityRecord {
            label: format!("[{}] {}", code, name),
            rows: lines.get(&(code.clone(), name)).copied().unwrap_or_default(),
            group_code: Some(code),
            orders,
            probability: ratio(orders, total_orders),
        })
        .collect();

    sort_descending_by(&mut records, |r| r.probability);
    truncate_top(&mut records, top_n);
    records
}

/// For every month, the share of that month's distinct orders containing each
/// group, as one 12-month series per group. Undated rows are left out.
pub fn group_probability_by_month(rows: &[TransactionRow]) -> Vec<MonthlySeries> {
    let dated: Vec<&TransactionRow> = rows.iter().filter(|r| r.ordered_at.is_some()).collect();
    let month_of = |r: &TransactionRow| r.month().unwrap_or_default();

    let month_totals: HashMap<u32, usize> =
        distinct_count(dated.iter().copied(), order_id, month_of).into_iter().collect();

    let points = distinct_count(dated.iter().copied(), order_id, |r| (month_of(r), r.group_label()))
        .into_iter()
        .map(|((month, group), orders)| {
            let denominator = month_totals.get(&month).copied().unwrap_or_default();
            (month, group, ratio(orders, denominator))
        });

    into_series(time_series_by_month_and_category(points))
}

/// Per item group, the share of the group's distinct orders containing each
/// item. Groups keep first-seen order; items are most likely first.
pub fn item_probability_by_group(
    rows: &[TransactionRow],
    top_n: Option<usize>,
    max_groups: Option<usize>,
) -> Vec<GroupBreakdown> {
    let group_totals: HashMap<String, usize> =
        distinct_count(rows, order_id, TransactionRow::group_label).into_iter().collect();
    let item_key = |r: &'_ TransactionRow| (r.group_label(), r.item_label());
    let lines = row_counts(rows, item_key);

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut breakdowns: Vec<GroupBreakdown> = Vec::new();
    for ((group, item), orders) in distinct_count(rows, order_id, item_key) {
        let denominator = group_totals.get(&group).copied().unwrap_or_default();
        let record = ProbabilityRecord {
            rows: lines.get(&(group.clone(), item.clone())).copied().unwrap_or_default(),
            label: item,
            group_code: None,
            orders,
            probability: ratio(orders, denominator),
        };
        let slot = *index.entry(group.clone()).or_insert_with(|| {
            breakdowns.push(GroupBreakdown {
                group,
                items: Vec::new(),
            });
            breakdowns.len() - 1
        });
        breakdowns[slot].items.push(record);
    }

    for breakdown in &mut breakdowns {
        sort_descending_by(&mut breakdown.items, |r| r.probability);
        truncate_top(&mut breakdown.items, top_n);
    }
    truncate_top(&mut breakdowns, max_groups);
    breakdowns
}

/// Per item group, one 12-month series per item: the share of the group's
/// distinct orders in that month that contain the item. Undated rows are left
/// out.
pub fn item_probability_by_group_month(
    rows: &[TransactionRow],
    max_groups: Option<usize>,
) -> Vec<GroupSeries> {
    let dated: Vec<&TransactionRow> = rows.iter().filter(|r| r.ordered_at.is_some()).collect();
    let month_of = |r: &TransactionRow| r.month().unwrap_or_default();

    let group_month_totals: HashMap<(u32, String), usize> =
        distinct_count(dated.iter().copied(), order_id, |r| (month_of(r), r.group_label()))
            .into_iter()
            .collect();

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut per_group: Vec<(String, Vec<(u32, String, f64)>)> = Vec::new();
    let counts = distinct_count(dated.iter().copied(), order_id, |r| {
        (month_of(r), r.group_label(), r.item_label())
    });
    for ((month, group, item), orders) in counts {
        let denominator = group_month_totals
            .get(&(month, group.clone()))
            .copied()
            .unwrap_or_default();
        let slot = *index.entry(group.clone()).or_insert_with(|| {
            per_group.push((group, Vec::new()));
            per_group.len() - 1
        });
        per_group[slot].1.push((month, item, ratio(orders, denominator)));
    }

    let mut groups: Vec<GroupSeries> = per_group
        .into_iter()
        .map(|(group, points)| GroupSeries {
            group,
            series: into_series(time_series_by_month_and_category(points)),
        })
        .collect();
    truncate_top(&mut groups, max_groups);
    groups
}
