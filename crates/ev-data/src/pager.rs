//! Fixed-size paging over a filtered record sequence.

use ev_core::config::DEFAULT_PAGE_SIZE;
use ev_core::models::Page;

/// Number of pages needed for `len` rows, 0 when there are no rows.
pub fn total_pages(len: usize, page_size: usize) -> usize {
    len.div_ceil(page_size.max(1))
}

/// Slice one page out of `records`.
///
/// `page` is 1-based and is clamped into `[1, max(total_pages, 1)]`; out of
/// range requests are corrected, never rejected. A `page_size` of 0 is treated
/// as 1.
pub fn paginate<T: Clone>(records: &[T], page: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_pages = total_pages(records.len(), page_size);
    let current_page = page.clamp(1, total_pages.max(1));

    let start = ((current_page - 1) * page_size).min(records.len());
    let end = (start + page_size).min(records.len());

    Page {
        rows: records[start..end].to_vec(),
        current_page,
        total_pages,
    }
}

/// Current listing position.
///
/// The owner of the filtered set must call [`Pager::on_filter_changed`]
/// whenever that set is replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    current_page: usize,
    page_size: usize,
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Pager {
    pub fn new(page_size: usize) -> Self {
        Self {
            current_page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Jump to `page`. The position is clamped the next time a page is taken.
    pub fn go_to(&mut self, page: usize) {
        self.current_page = page.max(1);
    }

    /// Move forward one page, stopping at `total_pages`.
    pub fn advance(&mut self, total_pages: usize) {
        let current = self.current_page.clamp(1, total_pages.max(1));
        self.current_page = if current < total_pages {
            current + 1
        } else {
            current
        };
    }

    /// Move back one page, stopping at 1.
    pub fn retreat(&mut self) {
        self.current_page = self.current_page.saturating_sub(1).max(1);
    }

    /// Back to the first page.
    pub fn on_filter_changed(&mut self) {
        self.current_page = 1;
    }

    /// Take the page at the current position, storing the clamped position.
    pub fn page<T: Clone>(&mut self, records: &[T]) -> Page<T> {
        let page = paginate(records, self.current_page, self.page_size);
        self.current_page = page.current_page;
        page
    }
}
