//! Paginated list with a selection cursor.
//!
//! Holds the items plus the cursor; drawing is done by the caller from
//! `page_items()`. Keyboard movement wraps around the ends, wheel movement
//! does not.

pub struct PagedList<T> {
    items: Vec<T>,
    selected: usize,
    per_page: usize,
}

impl<T> PagedList<T> {
    pub fn new(per_page: usize) -> Self {
        Self {
            items: Vec::new(),
            selected: 0,
            per_page: per_page.max(1),
        }
    }

    /// Replace all items. The cursor keeps its position when it still fits.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        if self.selected >= self.items.len() {
            self.selected = self.items.len().saturating_sub(1);
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut [T] {
        &mut self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn set_per_page(&mut self, per_page: usize) {
        self.per_page = per_page.max(1);
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_item(&self) -> Option<&T> {
        self.items.get(self.selected)
    }

    pub fn select(&mut self, index: usize) {
        if index < self.items.len() {
            self.selected = index;
        }
    }

    /// Keyboard up: wraps to the last item.
    pub fn cursor_up(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.selected = if self.selected == 0 {
            self.items.len() - 1
        } else {
            self.selected - 1
        };
    }

    /// Keyboard down: wraps to the first item.
    pub fn cursor_down(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.selected = (self.selected + 1) % self.items.len();
    }

    /// Wheel up: stops at the first item.
    pub fn scroll_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Wheel down: stops at the last item.
    pub fn scroll_down(&mut self) {
        if self.selected + 1 < self.items.len() {
            self.selected += 1;
        }
    }

    pub fn page(&self) -> usize {
        self.selected / self.per_page
    }

    pub fn total_pages(&self) -> usize {
        self.items.len().div_ceil(self.per_page).max(1)
    }

    pub fn next_page(&mut self) {
        if self.page() + 1 < self.total_pages() {
            self.selected = ((self.page() + 1) * self.per_page).min(self.items.len() - 1);
        }
    }

    pub fn prev_page(&mut self) {
        if self.page() > 0 {
            self.selected = (self.page() - 1) * self.per_page;
        }
    }

    /// `(index, item)` pairs on the cursor's page.
    pub fn page_items(&self) -> Vec<(usize, &T)> {
        let start = self.page() * self.per_page;
        let end = (start + self.per_page).min(self.items.len());
        (start..end).map(|i| (i, &self.items[i])).collect()
    }
}

/// Pagination dots, e.g. `○ ● ○`.
pub fn pagination_dots(page: usize, total: usize) -> String {
    (0..total)
        .map(|i| if i == page { "●" } else { "○" })
        .collect::<Vec<_>>()
        .join(" ")
}
