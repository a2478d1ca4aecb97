use std::ops::Range;

/// Keeps a window of `columns * rows` entries scrolled over the switcher
/// list so the selection is always on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    columns: usize,
    rows: usize,
    offset: usize,
}

impl Pager {
    pub fn new(columns: usize, rows: usize) -> Pager {
        Pager {
            columns: columns.max(1),
            rows: rows.max(1),
            offset: 0,
        }
    }

    pub fn offset(&self) -> usize { self.offset }

    pub fn page_size(&self) -> usize { self.columns.saturating_mul(self.rows) }

    pub fn reset(&mut self) { self.offset = 0; }

    /// Scrolls just far enough to bring `selected` into view.
    pub fn follow(&mut self, selected: usize, count: usize) {
        let page = self.page_size();
        if selected < self.offset {
            self.offset = selected;
        } else if selected >= self.offset.saturating_add(page) {
            self.offset = selected + 1 - page;
        }
        self.offset = self.offset.min(count.saturating_sub(page));
    }

    pub fn visible(&self, count: usize) -> Range<usize> {
        let start = self.offset.min(count);
        start..start.saturating_add(self.page_size()).min(count)
    }

    /// The "Page X of Y" line, or `None` when everything fits on one page.
    pub fn indicator(&self, count: usize) -> Option<String> {
        let page = self.page_size();
        if count <= page {
            return None;
        }
        let current = self.offset / page + 1;
        let total = count.div_ceil(page);
        Some(format!("Page {current} of {total} • Use ← → to scroll"))
    }
}
