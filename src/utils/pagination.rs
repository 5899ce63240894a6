// Pagination parameters and response envelope shared by all list endpoints
// Collections are served with a stable sort (created_at desc, id tiebreak)
// so windows never overlap or skip rows between pages.

use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

const DEFAULT_PER_PAGE: u32 = 20;
const MAX_PER_PAGE: u32 = 100;

/// Query parameters accepted by every list endpoint
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct Pagination {
    /// 1-based page number
    #[serde(default = "default_page")]
    pub page: u32,

    /// Rows per page (default 20, max 100)
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl Pagination {
    /// Clamp out-of-range values instead of erroring: page 0 becomes 1,
    /// per_page is capped at the maximum.
    pub fn normalized(&self) -> Self {
        Self {
            page: self.page.max(1),
            per_page: self.per_page.clamp(1, MAX_PER_PAGE),
        }
    }

    pub fn offset(&self) -> i64 {
        let p = self.normalized();
        ((p.page - 1) * p.per_page) as i64
    }

    pub fn limit(&self) -> i64 {
        self.normalized().per_page as i64
    }
}

/// Paginated response envelope
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, pagination: &Pagination, total: i64) -> Self {
        let p = pagination.normalized();
        Self {
            data,
            page: p.page,
            per_page: p.per_page,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_and_limit() {
        let p = Pagination {
            page: 2,
            per_page: 50,
        };
        assert_eq!(p.offset(), 50);
        assert_eq!(p.limit(), 50);
    }

    #[test]
    fn test_window_over_120_rows() {
        // Page 2 with per_page 50 over a 120-row collection must select
        // exactly rows 51..=100 of the ordered collection.
        let rows: Vec<u32> = (1..=120).collect();
        let p = Pagination {
            page: 2,
            per_page: 50,
        };

        let window: Vec<u32> = rows
            .iter()
            .skip(p.offset() as usize)
            .take(p.limit() as usize)
            .copied()
            .collect();

        assert_eq!(window.len(), 50);
        assert_eq!(window.first(), Some(&51));
        assert_eq!(window.last(), Some(&100));
    }

    #[test]
    fn test_normalization() {
        let p = Pagination {
            page: 0,
            per_page: 500,
        };
        let n = p.normalized();
        assert_eq!(n.page, 1);
        assert_eq!(n.per_page, MAX_PER_PAGE);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn test_last_partial_page() {
        let rows: Vec<u32> = (1..=120).collect();
        let p = Pagination {
            page: 3,
            per_page: 50,
        };

        let window: Vec<u32> = rows
            .iter()
            .skip(p.offset() as usize)
            .take(p.limit() as usize)
            .copied()
            .collect();

        assert_eq!(window.len(), 20);
        assert_eq!(window.first(), Some(&101));
        assert_eq!(window.last(), Some(&120));
    }
}
