pub mod aggregation;
pub mod format;
pub mod table;

pub use aggregation::{
    average_by_calendar_bucket, bin_by_fixed_width, distinct_count, distinct_total,
    frequency_distribution, sum_by_key, time_series_by_month_and_category,
};
pub use format::FormatOptions;
pub use table::report_table;
