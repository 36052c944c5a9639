//! # Pagination Calculator
//!
//! Turns a row count and the caller's raw `page`/`perPage` values into a
//! bounds-safe descriptor. This is the single place where page size policy
//! is enforced: every list endpoint goes through [`paginate`].

use serde::{Deserialize, Serialize};

/// Page used when the caller sends none (or garbage).
pub const DEFAULT_PAGE: u64 = 1;
/// Page size used when the caller sends none, garbage, or a value below 1.
pub const DEFAULT_PER_PAGE: u64 = 10;
/// Upper bound on page size.
pub const MAX_PER_PAGE: u64 = 100;

/// Normalized paging parameters for one list request.
///
/// `page` is never clamped to `total_pages`: an out-of-range page yields an
/// empty slice with honest totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationDescriptor {
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
    pub total_docs: u64,
    pub offset: u64,
}

/// Compute a paging descriptor.
///
/// - `page`: absent → 1; values below 1 clamp to 1.
/// - `per_page`: absent or below 1 → 10; values above 100 clamp to 100.
pub fn paginate(count: u64, page: Option<i64>, per_page: Option<i64>) -> PaginationDescriptor {
    let page = match page {
        Some(p) if p >= 1 => p as u64,
        _ => DEFAULT_PAGE,
    };
    let per_page = match per_page {
        Some(pp) if pp >= 1 => (pp as u64).min(MAX_PER_PAGE),
        _ => DEFAULT_PER_PAGE,
    };

    PaginationDescriptor {
        page,
        per_page,
        total_pages: count.div_ceil(per_page),
        total_docs: count,
        offset: (page - 1).saturating_mul(per_page),
    }
}

/// Parse a raw query-string number the lenient way list endpoints expect.
///
/// Anything that is not an integer is treated as absent, so `page=abc`
/// behaves exactly like a missing `page`.
pub fn parse_lenient(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
}

impl PaginationDescriptor {
    /// Slice an in-memory collection according to this descriptor.
    ///
    /// Used by aggregate reads that must load every leg (for totals) but
    /// return only one page of them.
    pub fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        let offset = usize::try_from(self.offset).unwrap_or(usize::MAX);
        let take = usize::try_from(self.per_page).unwrap_or(usize::MAX);
        items.into_iter().skip(offset).take(take).collect()
    }

    /// `LIMIT` value for SQL queries.
    pub fn limit_i64(&self) -> i64 {
        i64::try_from(self.per_page).unwrap_or(i64::MAX)
    }

    /// `OFFSET` value for SQL queries.
    pub fn offset_i64(&self) -> i64 {
        i64::try_from(self.offset).unwrap_or(i64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn third_page_of_twenty_five() {
        let d = paginate(25, Some(3), Some(10));
        assert_eq!(
            d,
            PaginationDescriptor {
                page: 3,
                per_page: 10,
                total_pages: 3,
                total_docs: 25,
                offset: 20,
            }
        );
    }

    #[test]
    fn empty_table() {
        let d = paginate(0, Some(1), Some(10));
        assert_eq!(d.page, 1);
        assert_eq!(d.per_page, 10);
        assert_eq!(d.total_pages, 0);
        assert_eq!(d.total_docs, 0);
        assert_eq!(d.offset, 0);
    }

    #[test]
    fn negative_and_zero_inputs_normalize_to_defaults() {
        let d = paginate(5, Some(-3), Some(0));
        assert_eq!(
            d,
            PaginationDescriptor {
                page: 1,
                per_page: 10,
                total_pages: 1,
                total_docs: 5,
                offset: 0,
            }
        );
    }

    #[test]
    fn absent_inputs_use_defaults() {
        let d = paginate(42, None, None);
        assert_eq!(d.page, 1);
        assert_eq!(d.per_page, 10);
        assert_eq!(d.total_pages, 5);
    }

    #[test]
    fn per_page_is_capped() {
        let d = paginate(1000, Some(2), Some(500));
        assert_eq!(d.per_page, MAX_PER_PAGE);
        assert_eq!(d.offset, 100);
        assert_eq!(d.total_pages, 10);
    }

    #[test]
    fn out_of_range_page_is_kept() {
        let d = paginate(12, Some(9), Some(5));
        assert_eq!(d.page, 9);
        assert_eq!(d.total_pages, 3);
        assert_eq!(d.offset, 40);
    }

    #[test]
    fn lenient_parse_treats_garbage_as_absent() {
        assert_eq!(parse_lenient(Some("3")), Some(3));
        assert_eq!(parse_lenient(Some(" 7 ")), Some(7));
        assert_eq!(parse_lenient(Some("-2")), Some(-2));
        assert_eq!(parse_lenient(Some("abc")), None);
        assert_eq!(parse_lenient(Some("")), None);
        assert_eq!(parse_lenient(None), None);
    }

    #[test]
    fn slice_returns_requested_window() {
        let d = paginate(12, Some(2), Some(5));
        let rows: Vec<u32> = (1..=12).collect();
        assert_eq!(d.slice(rows), vec![6, 7, 8, 9, 10]);
    }

    #[test]
    fn slice_past_end_is_empty() {
        let d = paginate(3, Some(4), Some(5));
        assert!(d.slice(vec![1, 2, 3]).is_empty());
    }

    #[test]
    fn descriptor_serializes_camel_case() {
        let json = serde_json::to_value(paginate(25, Some(3), Some(10))).unwrap();
        assert_eq!(json["perPage"], 10);
        assert_eq!(json["totalPages"], 3);
        assert_eq!(json["totalDocs"], 25);
    }
}
