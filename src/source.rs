//! # Data Source
//!
//! Reads sales transactions from CSV into [`TransactionRow`]s. Numeric fields
//! that are missing or unparseable become `0.0`; timestamps that match none of
//! the accepted layouts become `None`. Neither drops the row.

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use std::io::Read;
use std::path::{Path, PathBuf};
use tokio::task::spawn_blocking;
use tracing::{debug, error, info};

use crate::config::ColumnMap;
use crate::error::{SalesError, SalesResult};
use crate::types::TransactionRow;

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse an order timestamp, falling back to a date-only layout.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, DATE_FORMAT)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Parse a numeric field; `None` when missing or not a finite number.
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Column positions resolved against the CSV header row.
struct ColumnIndex {
    order_id: usize,
    amount: usize,
    item_code: Option<usize>,
    item_name: Option<usize>,
    group_code: Option<usize>,
    group_name: Option<usize>,
    customer_id: Option<usize>,
    quantity: Vec<usize>,
    ordered_at: Option<usize>,
}

impl ColumnIndex {
    fn resolve(headers: &StringRecord, columns: &ColumnMap, path: &Path) -> SalesResult<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let require = |name: &str| {
            find(name).ok_or_else(|| SalesError::MissingColumn {
                path: path.to_path_buf(),
                column: name.to_string(),
            })
        };

        Ok(Self {
            order_id: require(columns.order_id.as_str())?,
            amount: require(columns.amount.as_str())?,
            item_code: find(columns.item_code.as_str()),
            item_name: find(columns.item_name.as_str()),
            group_code: find(columns.group_code.as_str()),
            group_name: find(columns.group_name.as_str()),
            customer_id: find(columns.customer_id.as_str()),
            quantity: columns.quantity.iter().filter_map(|name| find(name.as_str())).collect(),
            ordered_at: find(columns.ordered_at.as_str()),
        })
    }
}

/// Per-load counters of coerced fields.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadStats {
    pub rows: usize,
    pub coerced_numbers: usize,
    pub unparsed_timestamps: usize,
}

fn field<'r>(record: &'r StringRecord, index: Option<usize>) -> &'r str {
    index.and_then(|i| record.get(i)).unwrap_or("")
}

fn convert_record(
    record: &StringRecord,
    index: &ColumnIndex,
    stats: &mut LoadStats,
) -> TransactionRow {
    let mut number = |raw: &str| {
        parse_number(raw).unwrap_or_else(|| {
            stats.coerced_numbers += 1;
            0.0
        })
    };

    let amount = number(field(record, Some(index.amount)));
    let quantity = index
        .quantity
        .iter()
        .map(|&i| field(record, Some(i)))
        .find(|raw| !raw.trim().is_empty())
        .map_or(0.0, &mut number);

    let ordered_at = parse_timestamp(field(record, index.ordered_at));
    if ordered_at.is_none() {
        stats.unparsed_timestamps += 1;
    }

    TransactionRow {
        order_id: field(record, Some(index.order_id)).trim().to_string(),
        item_code: field(record, index.item_code).to_string(),
        item_name: field(record, index.item_name).to_string(),
        group_code: field(record, index.group_code).to_string(),
        group_name: field(record, index.group_name).to_string(),
        customer_id: field(record, index.customer_id).to_string(),
        amount,
        quantity,
        ordered_at,
    }
}

/// Read rows from any CSV reader. `origin` only labels errors.
///
/// # Errors
///
/// Fails when the CSV is malformed or a required column is missing.
pub fn read_rows<R: Read>(
    reader: R,
    columns: &ColumnMap,
    origin: &Path,
) -> SalesResult<(Vec<TransactionRow>, LoadStats)> {
    let csv_error = |source: csv::Error| SalesError::Csv {
        path: origin.to_path_buf(),
        source,
    };

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers().map_err(csv_error)?.clone();
    debug!(headers = ?headers, "resolved CSV headers");
    let index = ColumnIndex::resolve(&headers, columns, origin)?;

    let mut stats = LoadStats::default();
    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(csv_error)?;
        rows.push(convert_record(&record, &index, &mut stats));
    }
    stats.rows = rows.len();

    debug!(
        rows = stats.rows,
        coerced_numbers = stats.coerced_numbers,
        unparsed_timestamps = stats.unparsed_timestamps,
        "converted CSV records"
    );
    Ok((rows, stats))
}

/// Load every row of a CSV file.
///
/// # Errors
///
/// Fails when the file cannot be opened, is malformed, or lacks a required
/// column. The failure is logged once.
pub fn load_rows(path: &Path, columns: &ColumnMap) -> SalesResult<Vec<TransactionRow>> {
    let result = std::fs::File::open(path)
        .map_err(|source| SalesError::Io {
            path: path.to_path_buf(),
            source,
        })
        .and_then(|file| read_rows(file, columns, path));

    match result {
        Ok((rows, stats)) => {
            info!(
                path = %path.display(),
                rows = stats.rows,
                unparsed_timestamps = stats.unparsed_timestamps,
                "loaded sales data"
            );
            Ok(rows)
        }
        Err(err) => {
            error!(path = %path.display(), error = %err, "failed to load sales data");
            Err(err)
        }
    }
}

/// Load a CSV file on the blocking pool.
pub async fn load_rows_async(
    path: PathBuf,
    columns: ColumnMap,
) -> SalesResult<Vec<TransactionRow>> {
    spawn_blocking(move || load_rows(&path, &columns)).await?
}
