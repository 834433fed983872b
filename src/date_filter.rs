//! Calendar filtering used by every list endpoint.

use chrono::{Datelike, Duration, NaiveDate};
use crate::errors::ServiceError;

/// Anything that lists under a date filter.
pub trait Dated {
    fn record_date(&self) -> NaiveDate;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateFilter {
    #[default]
    All,
    /// Same calendar day as today.
    Day,
    /// The seven days before today, plus today.
    Week,
    /// Same month and year as today.
    Month,
    Custom(NaiveDate),
}

impl DateFilter {
    /// Builds a filter from the `date_filter` / `custom_date` query pair.
    pub fn parse(mode: Option<&str>, custom_date: Option<NaiveDate>) -> Result<Self, ServiceError> {
        let mode = mode.map(str::trim).unwrap_or("all");
        match mode.to_ascii_lowercase().as_str() {
            "" | "all" => Ok(DateFilter::All),
            "day" | "today" => Ok(DateFilter::Day),
            "week" => Ok(DateFilter::Week),
            "month" => Ok(DateFilter::Month),
            "custom" => custom_date.map(DateFilter::Custom).ok_or_else(|| {
                ServiceError::InvalidInput("custom date filter requires custom_date".to_string())
            }),
            other => Err(ServiceError::InvalidInput(format!(
                "unknown date filter: {other}"
            ))),
        }
    }

    pub fn matches(&self, date: NaiveDate, today: NaiveDate) -> bool {
        match self {
            DateFilter::All => true,
            DateFilter::Day => date == today,
            DateFilter::Week => date >= today - Duration::days(7) && date <= today,
            DateFilter::Month => date.year() == today.year() && date.month() == today.month(),
            DateFilter::Custom(custom) => date == *custom,
        }
    }
}

/// Keeps the records whose date passes `filter`, preserving order.
pub fn filter_by_date<T, I>(records: I, filter: &DateFilter, today: NaiveDate) -> Vec<T>
where
    T: Dated,
    I: IntoIterator<Item = T>,
{
    records
        .into_iter()
        .filter(|record| filter.matches(record.record_date(), today))
        .collect()
}
