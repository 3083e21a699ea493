//! This modules defines the common functionality for paging data.

use serde::Serialize;

/// The config for pagination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The number of records per page when not specified in a request.
    pub default_page_size: u64,
    /// The largest page size a client may ask for.
    pub max_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 10,
            max_page_size: 100,
        }
    }
}

/// Where a page sits in the full set of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_items: u64,
    pub items_per_page: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl PageInfo {
    /// Describe page `page` of `total_items` split into pages of `page_size`.
    ///
    /// `page_size` must be at least one.
    pub fn new(page: u64, page_size: u64, total_items: u64) -> Self {
        let total_pages = total_items.div_ceil(page_size.max(1));

        Self {
            current_page: page,
            total_pages,
            total_items,
            items_per_page: page_size,
            has_next_page: page < total_pages,
            has_prev_page: page > 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PageInfo;

    #[test]
    fn empty_result_has_no_pages() {
        let got = PageInfo::new(1, 10, 0);

        assert_eq!(
            got,
            PageInfo {
                current_page: 1,
                total_pages: 0,
                total_items: 0,
                items_per_page: 10,
                has_next_page: false,
                has_prev_page: false,
            }
        );
    }

    #[test]
    fn partial_last_page_counts_as_a_page() {
        let got = PageInfo::new(2, 10, 21);

        assert_eq!(got.total_pages, 3);
        assert!(got.has_next_page);
        assert!(got.has_prev_page);
    }

    #[test]
    fn last_page_has_no_next_page() {
        let got = PageInfo::new(3, 10, 21);

        assert!(!got.has_next_page);
    }

    #[test]
    fn page_bounds_hold_for_in_range_pages() {
        for total_items in 1..=50u64 {
            for page_size in 1..=12u64 {
                let total_pages = total_items.div_ceil(page_size);

                for page in 1..=total_pages {
                    let info = PageInfo::new(page, page_size, total_items);

                    assert!(
                        info.current_page * info.items_per_page
                            <= info.total_items + info.items_per_page - 1,
                        "page {page} of size {page_size} overflows {total_items} items"
                    );
                    assert_eq!(info.has_next_page, page < info.total_pages);
                }
            }
        }
    }

    #[test]
    fn serializes_in_camel_case() {
        let json = serde_json::to_value(PageInfo::new(1, 10, 5)).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "currentPage": 1,
                "totalPages": 1,
                "totalItems": 5,
                "itemsPerPage": 10,
                "hasNextPage": false,
                "hasPrevPage": false,
            })
        );
    }
}
