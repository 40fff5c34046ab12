//! Page arithmetic for the owner's listing.

use serde::Serialize;
use utoipa::ToSchema;

/// Items shown per page.
pub const PAGE_SIZE: u32 = 10;

/// A validated 1-based page number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
}

impl PageRequest {
    /// Parse the raw `pagina` query value.
    ///
    /// Returns `None` for anything that is not an integer of at least one.
    ///
    /// # Examples
    /// ```
    /// use listings::domain::PageRequest;
    ///
    /// assert_eq!(PageRequest::parse("2").map(|p| p.offset()), Some(10));
    /// assert!(PageRequest::parse("0").is_none());
    /// assert!(PageRequest::parse("abc").is_none());
    /// ```
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let page = raw.trim().parse::<u32>().ok()?;
        (page >= 1).then_some(Self { page })
    }

    /// First page.
    #[must_use]
    pub const fn first() -> Self {
        Self { page: 1 }
    }

    /// 1-based page number.
    #[must_use]
    pub const fn page(self) -> u32 {
        self.page
    }

    /// Maximum number of items returned.
    #[must_use]
    pub const fn limit(self) -> u32 {
        PAGE_SIZE
    }

    /// Number of items skipped.
    #[must_use]
    pub const fn offset(self) -> u32 {
        (self.page - 1).saturating_mul(PAGE_SIZE)
    }
}

/// Pagination summary returned alongside a page of items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Current page.
    pub page: u32,
    /// Items per page.
    pub limit: u32,
    /// Items skipped.
    pub offset: u32,
    /// Total items across all pages.
    pub total: u64,
    /// Total number of pages.
    pub pages: u64,
}

impl PageInfo {
    /// Summarise `request` against a total item count.
    #[must_use]
    pub fn new(request: PageRequest, total: u64) -> Self {
        Self {
            page: request.page(),
            limit: request.limit(),
            offset: request.offset(),
            total,
            pages: total.div_ceil(u64::from(PAGE_SIZE)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1", Some(1))]
    #[case(" 3 ", Some(3))]
    #[case("0", None)]
    #[case("-1", None)]
    #[case("1.5", None)]
    #[case("", None)]
    fn parses_positive_integers_only(#[case] raw: &str, #[case] expected: Option<u32>) {
        assert_eq!(PageRequest::parse(raw).map(PageRequest::page), expected);
    }

    #[rstest]
    #[case(0, 0)]
    #[case(10, 1)]
    #[case(11, 2)]
    #[case(25, 3)]
    fn page_count_rounds_up(#[case] total: u64, #[case] pages: u64) {
        assert_eq!(PageInfo::new(PageRequest::first(), total).pages, pages);
    }
}
