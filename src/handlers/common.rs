use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{date_filter::DateFilter, errors::ServiceError, PaginatedResponse};

/// The server's current calendar date, used as "today" by every date filter.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Pagination parameters for list operations
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PaginationParams {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl PaginationParams {
    /// Resolves to a one-based page and a limit within `1..=max_limit`.
    pub fn resolve(&self, default_limit: u32, max_limit: u32) -> (u64, u64) {
        let max_limit = u64::from(max_limit.max(1));
        let limit = self
            .limit
            .unwrap_or_else(|| u64::from(default_limit))
            .clamp(1, max_limit);
        (self.page.unwrap_or(1).max(1), limit)
    }
}

/// Slices an already filtered list into one page.
pub fn paginate<T>(items: Vec<T>, page: u64, limit: u64) -> PaginatedResponse<T> {
    let limit = limit.max(1);
    let total = items.len() as u64;
    let offset = page.saturating_sub(1).saturating_mul(limit);
    let items = items
        .into_iter()
        .skip(usize::try_from(offset).unwrap_or(usize::MAX))
        .take(usize::try_from(limit).unwrap_or(usize::MAX))
        .collect();

    PaginatedResponse {
        items,
        total,
        page,
        limit,
        total_pages: total.div_ceil(limit),
    }
}

/// `date_filter` / `custom_date` query pair shared by dated list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct DateQuery {
    pub date_filter: Option<String>,
    pub custom_date: Option<NaiveDate>,
}

impl DateQuery {
    pub fn to_filter(&self) -> Result<DateFilter, ServiceError> {
        DateFilter::parse(self.date_filter.as_deref(), self.custom_date)
    }
}

/// Parses an optional enum-valued query parameter; blank or `all` means no filter.
pub fn parse_filter<T: FromStr>(raw: Option<&str>, field: &str) -> Result<Option<T>, ServiceError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) if value.eq_ignore_ascii_case("all") => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ServiceError::InvalidInput(format!("invalid {}: {}", field, value))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaymentStatus;
    use assert_matches::assert_matches;

    #[test]
    fn limit_is_clamped_to_max() {
        let params = PaginationParams {
            page: Some(0),
            limit: Some(500),
        };
        assert_eq!(params.resolve(20, 100), (1, 100));
        assert_eq!(PaginationParams::default().resolve(20, 100), (1, 20));
    }

    #[test]
    fn paginate_slices_and_counts_pages() {
        let page = paginate((1..=7).collect::<Vec<u32>>(), 2, 3);
        assert_eq!(page.items, vec![4, 5, 6]);
        assert_eq!((page.total, page.total_pages), (7, 3));

        let past_end = paginate((1..=7).collect::<Vec<u32>>(), 5, 3);
        assert!(past_end.items.is_empty());

        let empty = paginate(Vec::<u32>::new(), 1, 10);
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn filters_accept_all_and_display_names() {
        assert_eq!(parse_filter::<PaymentStatus>(Some("all"), "status").unwrap(), None);
        assert_eq!(
            parse_filter::<PaymentStatus>(Some("partially paid"), "status").unwrap(),
            Some(PaymentStatus::PartiallyPaid)
        );
        assert_eq!(
            parse_filter::<PaymentStatus>(Some("fully_paid"), "status").unwrap(),
            Some(PaymentStatus::FullyPaid)
        );
        assert_matches!(
            parse_filter::<PaymentStatus>(Some("refunded"), "status"),
            Err(ServiceError::InvalidInput(_))
        );
    }

    #[test]
    fn custom_date_query_requires_date() {
        let query = DateQuery {
            date_filter: Some("custom".into()),
            custom_date: None,
        };
        assert!(query.to_filter().is_err());
    }
}
