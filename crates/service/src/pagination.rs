//! Pagination utilities for service layer
//!
//! Provides a simple `Pagination` struct and helpers to normalize inputs.

use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;
/// Keeps `page * limit` well inside a signed 64-bit SQL offset.
pub const MAX_PAGE: u64 = 1_000_000_000;

/// Pagination parameters as received from `page`/`limit` query strings.
#[derive(Clone, Copy, Debug)]
pub struct Pagination {
    /// 1-based page index
    pub page: u64,
    /// items per page
    pub limit: u64,
}

impl Pagination {
    pub fn new(page: Option<u64>, limit: Option<u64>) -> Self {
        Self { page: page.unwrap_or(1), limit: limit.unwrap_or(DEFAULT_LIMIT) }
    }

    /// Build from raw query-string values. Never fails: blank or non-numeric values fall back
    /// to the defaults, negatives become 0 and oversized numbers saturate before clamping.
    pub fn from_query(page: Option<&str>, limit: Option<&str>) -> Self {
        Self::new(page.and_then(parse_param), limit.and_then(parse_param)).normalize()
    }

    /// Page is clamped into `1..=MAX_PAGE`; limit is clamped into `1..=100`.
    pub fn normalize(self) -> Self {
        Self { page: self.page.clamp(1, MAX_PAGE), limit: self.limit.clamp(1, MAX_LIMIT) }
    }

    /// Zero-based page index for SeaORM's `fetch_page`.
    pub fn page_index(self) -> u64 { self.normalize().page - 1 }

    pub fn offset(self) -> u64 {
        let n = self.normalize();
        (n.page - 1).saturating_mul(n.limit)
    }
}

fn parse_param(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    let (negative, digits) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if negative {
        return Some(0);
    }
    Some(digits.parse::<u64>().unwrap_or(u64::MAX))
}

impl Default for Pagination {
    fn default() -> Self { Self { page: 1, limit: DEFAULT_LIMIT } }
}

/// Page metadata returned alongside list data.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageMeta {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl PageMeta {
    pub fn new(p: Pagination, total: u64) -> Self {
        let p = p.normalize();
        Self { page: p.page, limit: p.limit, total, total_pages: total.div_ceil(p.limit) }
    }
}

/// `{ "data": [...], "pagination": {...} }`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: PageMeta,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, p: Pagination, total: u64) -> Self {
        Self { data, pagination: PageMeta::new(p, total) }
    }
}

/// Slice an in-memory collection the same way the database would.
pub fn slice<T: Clone>(items: &[T], p: Pagination) -> Vec<T> {
    let n = p.normalize();
    items
        .iter()
        .skip(p.offset().min(usize::MAX as u64) as usize)
        .take(n.limit as usize)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_clamps_zero_to_minimums() {
        let n = Pagination { page: 0, limit: 0 }.normalize();
        assert_eq!(n.page, 1);
        assert_eq!(n.limit, 1);
    }

    #[test]
    fn normalize_clamps_upper_bound() {
        let p = Pagination { page: 5, limit: 1000 };
        assert_eq!(p.normalize().limit, 100);
        assert_eq!(p.page_index(), 4);
        assert_eq!(p.offset(), 400);
    }

    #[test]
    fn limit_always_within_bounds() {
        for limit in [0u64, 1, 2, 50, 99, 100, 101, 10_000, u64::MAX] {
            let n = Pagination { page: 1, limit }.normalize();
            assert!((1..=MAX_LIMIT).contains(&n.limit), "limit {limit} -> {}", n.limit);
        }
    }

    #[test]
    fn huge_page_does_not_overflow() {
        let p = Pagination { page: u64::MAX, limit: 100 };
        assert_eq!(p.normalize().page, MAX_PAGE);
        assert_eq!(p.offset(), (MAX_PAGE - 1) * 100);
        assert!(slice(&[1, 2, 3], p).is_empty());
    }

    #[test]
    fn default_values_are_sane() {
        let d = Pagination::default();
        assert_eq!(d.page, 1);
        assert_eq!(d.limit, 10);
        let from_none = Pagination::new(None, None);
        assert_eq!(from_none.limit, DEFAULT_LIMIT);
    }

    #[test]
    fn from_query_never_rejects() {
        let p = Pagination::from_query(Some("2"), Some("20"));
        assert_eq!((p.page, p.limit), (2, 20));

        let p = Pagination::from_query(Some("-3"), Some("99999999999999999999999"));
        assert_eq!((p.page, p.limit), (1, MAX_LIMIT));

        let p = Pagination::from_query(Some("abc"), Some(""));
        assert_eq!((p.page, p.limit), (1, DEFAULT_LIMIT));

        let p = Pagination::from_query(Some(" 3 "), Some("-"));
        assert_eq!((p.page, p.limit), (3, DEFAULT_LIMIT));

        let p = Pagination::from_query(Some("1.5"), Some("-0"));
        assert_eq!((p.page, p.limit), (1, 1));
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(PageMeta::new(Pagination { page: 1, limit: 10 }, 0).total_pages, 0);
        assert_eq!(PageMeta::new(Pagination { page: 1, limit: 10 }, 10).total_pages, 1);
        assert_eq!(PageMeta::new(Pagination { page: 1, limit: 10 }, 11).total_pages, 2);
    }

    #[test]
    fn slice_matches_offset() {
        let items: Vec<u32> = (1..=25).collect();
        assert_eq!(slice(&items, Pagination { page: 3, limit: 10 }), vec![21, 22, 23, 24, 25]);
    }
}
