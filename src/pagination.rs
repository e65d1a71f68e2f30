use std::ops::Range;

use serde::Serialize;

/// Most page links shown at once.
const MAX_VISIBLE_PAGES: usize = 5;

/// Window of page numbers around `current_page`.
fn get_pages(total_pages: usize, current_page: usize) -> Vec<usize> {
    if total_pages <= MAX_VISIBLE_PAGES {
        return (1..=total_pages).collect();
    }

    let start = current_page.saturating_sub(2).max(1);
    let end = (start + MAX_VISIBLE_PAGES - 1).min(total_pages);
    (start..=end).collect()
}

/// Page position over an in-memory list.
///
/// `current` always stays within `[1, max(total_pages, 1)]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageState {
    per_page: usize,
    current: usize,
    total_pages: usize,
}

impl PageState {
    pub fn new(per_page: usize) -> Self {
        Self {
            per_page: per_page.max(1),
            current: 1,
            total_pages: 0,
        }
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    /// Back to the first page for a list of `len` items.
    pub fn reset(&mut self, len: usize) {
        self.current = 1;
        self.recalculate(len);
    }

    /// Recomputes the page count for `len` items and clamps the current page.
    pub fn recalculate(&mut self, len: usize) {
        self.total_pages = len.div_ceil(self.per_page);
        self.current = self.current.clamp(1, self.total_pages.max(1));
    }

    /// Moves to `page` when it exists; returns whether the page changed.
    pub fn go_to(&mut self, page: usize) -> bool {
        if (1..=self.total_pages).contains(&page) {
            self.current = page;
            true
        } else {
            false
        }
    }

    /// Index range of the current page within a list of `len` items.
    pub fn range(&self, len: usize) -> Range<usize> {
        let start = ((self.current - 1) * self.per_page).min(len);
        let end = (start + self.per_page).min(len);
        start..end
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.range(items.len())]
    }

    /// Page links to render.
    pub fn page_numbers(&self) -> Vec<usize> {
        get_pages(self.total_pages, self.current)
    }

    /// Position of the last item shown, for "showing up to N of M" counters.
    pub fn max_displayed(&self, len: usize) -> usize {
        (self.current * self.per_page).min(len)
    }
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pages: Vec<usize>,
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

impl<T: Clone> Paginated<T> {
    /// Copies the current page of `items` out of the full list.
    pub fn from_state(items: &[T], state: &PageState) -> Self {
        Self {
            items: state.slice(items).to_vec(),
            pages: state.page_numbers(),
            page: state.current(),
            total_pages: state.total_pages(),
            total_items: items.len(),
        }
    }
}
