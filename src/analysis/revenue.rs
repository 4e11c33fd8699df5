use std::collections::HashMap;

use super::REVENUE_FIELDS;
use crate::types::{RevenueRecord, TransactionRow};
use crate::utils::aggregation::{sort_descending_by, sum_by_key, truncate_top};

/// Revenue and quantity per item name, highest revenue first.
///
/// Code and group fields come from the first row seen for the item.
pub fn revenue_by_item(rows: &[TransactionRow], top_n: Option<usize>) -> Vec<RevenueRecord> {
    let mut first_seen: HashMap<&str, &TransactionRow> = HashMap::new();
    for row in rows {
        first_seen.entry(row.item_name.as_str()).or_insert(row);
    }

    let mut records: Vec<RevenueRecord> = sum_by_key(rows, |r| r.item_name.as_str(), REVENUE_FIELDS)
        .into_iter()
        .map(|(name, [revenue, quantity])| {
            let first = first_seen.get(name).copied();
            RevenueRecord {
                label: format!("[{}] {}", first.map_or("", |r| r.item_code.as_str()), name),
                revenue,
                quantity,
                group_code: first.map(|r| r.group_code.clone()),
                group_name: first.map(|r| r.group_name.clone()),
            }
        })
        .collect();

    sort_descending_by(&mut records, |r| r.revenue);
    truncate_top(&mut records, top_n);
    records
}

/// Revenue and quantity per item-group name, highest revenue first.
pub fn revenue_by_group(rows: &[TransactionRow], top_n: Option<usize>) -> Vec<RevenueRecord> {
    let mut codes: HashMap<&str, &str> = HashMap::new();
    for row in rows {
        codes.entry(row.group_name.as_str()).or_insert(row.group_code.as_str());
    }

    let sums = sum_by_key(rows, |r| r.group_name.as_str(), REVENUE_FIELDS);
    let mut records: Vec<RevenueRecord> = sums
        .into_iter()
        .map(|(name, [revenue, quantity])| RevenueRecord {
            label: name.to_string(),
            revenue,
            quantity,
            group_code: codes.get(name).map(|code| code.to_string()),
            group_name: Some(name.to_string()),
        })
        .collect();

    sort_descending_by(&mut records, |r| r.revenue);
    truncate_top(&mut records, top_n);
    records
}

/// Revenue and quantity per calendar month, January first. Rows without a
/// parseable timestamp are left out.
pub fn revenue_by_month(rows: &[TransactionRow]) -> Vec<RevenueRecord> {
    let dated = rows.iter().filter(|r| r.ordered_at.is_some());
    let mut sums = sum_by_key(dated, |r| r.month().unwrap_or_default(), REVENUE_FIELDS);
    sums.sort_by_key(|(month, _)| *month);

    sums.into_iter()
        .map(|(month, [revenue, quantity])| RevenueRecord {
            label: month_label(month),
            revenue,
            quantity,
            group_code: None,
            group_name: None,
        })
        .collect()
}

pub fn month_label(month: u32) -> String {
    format!("Tháng {:02}", month)
}
