use super::SPEND_FIELD;
use crate::error::SalesResult;
use crate::types::{FrequencyBucket, SpendBin, TransactionRow};
use crate::utils::aggregation::{
    bin_by_fixed_width, distinct_count, frequency_distribution, sum_by_key,
};

/// How many customers placed exactly N distinct orders, for every N seen.
pub fn purchase_frequency(rows: &[TransactionRow]) -> Vec<FrequencyBucket> {
    let per_customer = distinct_count(rows, |r| r.order_id.as_str(), |r| r.customer_id.as_str());

    frequency_distribution(per_customer.into_iter().map(|(_, orders)| orders))
        .into_iter()
        .map(|(value, entities)| FrequencyBucket { value, entities })
        .collect()
}

/// Customers bucketed by total spend into bins of `bin_size`.
///
/// # Errors
///
/// Fails when `bin_size` is not a positive number.
pub fn spend_histogram(rows: &[TransactionRow], bin_size: f64) -> SalesResult<Vec<SpendBin>> {
    let per_customer = sum_by_key(rows, |r| r.customer_id.as_str(), SPEND_FIELD);
    let bins = bin_by_fixed_width(per_customer.into_iter().map(|(_, [spend])| spend), bin_size)?;

    Ok(bins
        .into_iter()
        .map(|bin| SpendBin {
            label: format!("{}K–{}K", bin.lower / 1000.0, bin.upper / 1000.0),
            index: bin.index,
            lower: bin.lower,
            upper: bin.upper,
            count: bin.count,
        })
        .collect())
}
