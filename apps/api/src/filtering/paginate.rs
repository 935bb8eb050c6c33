use serde::Serialize;
use tracing::debug;

/// Pagination metadata. All page math is based on `total_filtered`; `total`
/// is the caller's unfiltered count and is reported for display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationState {
    pub page: u32,
    pub limit: u32,
    pub total: usize,
    pub total_filtered: usize,
    pub total_pages: usize,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: PaginationState,
}

/// Slices `items` to the requested page.
///
/// `page` is never clamped: a page past the end yields no items with
/// consistent metadata. `total` is raised to `items.len()` if the caller
/// under-reports it.
pub fn paginate<T>(items: Vec<T>, page: u32, limit: u32, total: usize) -> Page<T> {
    let page = page.max(1);
    let limit = limit.max(1);
    let total_filtered = items.len();

    if total < total_filtered {
        debug!(total, total_filtered, "Unfiltered total below filtered count; raising it");
    }
    let total = total.max(total_filtered);

    let per_page = limit as usize;
    let total_pages = total_filtered.div_ceil(per_page);
    let offset = (page as usize - 1).saturating_mul(per_page);

    let items: Vec<T> = items.into_iter().skip(offset).take(per_page).collect();

    Page {
        items,
        pagination: PaginationState {
            page,
            limit,
            total,
            total_filtered,
            total_pages,
            has_next_page: (page as usize) < total_pages,
            has_prev_page: page > 1,
        },
    }
}
