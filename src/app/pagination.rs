// src/app/pagination.rs
//! Page navigation control.
//!
//! A pure mapping from `(current page, total pages)` to the links the user
//! can click and the page-change events those clicks produce. Pages are
//! 1-indexed everywhere outside this module; the window arithmetic below
//! works on 0-indexed positions internally.

use crate::constants::{MARGIN_PAGES_DISPLAYED, PAGE_RANGE_DISPLAYED};

/// One clickable element of the control, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Previous { enabled: bool },
    Page { number: u32, active: bool },
    /// Elided pages. Selecting it jumps a window's width toward `target`.
    Break { target: u32 },
    Next { enabled: bool },
}

/// Request to show another page. `page` is 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageChange {
    pub page: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationControl {
    // 0-indexed, always < page_count
    selected: u32,
    page_count: u32,
    page_range: u32,
    margin: u32,
}

impl PaginationControl {
    /// The control for `current_page` of `total_pages`, or `None` when there
    /// is at most one page and the control is hidden.
    pub fn new(current_page: u32, total_pages: u32) -> Option<Self> {
        if total_pages <= 1 {
            return None;
        }
        let selected = current_page.clamp(1, total_pages) - 1;
        Some(Self {
            selected,
            page_count: total_pages,
            page_range: PAGE_RANGE_DISPLAYED,
            margin: MARGIN_PAGES_DISPLAYED,
        })
    }

    pub fn with_window(mut self, page_range: u32, margin: u32) -> Self {
        self.page_range = page_range;
        self.margin = margin;
        self
    }

    pub fn current_page(&self) -> u32 {
        self.selected + 1
    }

    pub fn total_pages(&self) -> u32 {
        self.page_count
    }

    /// Everything the control shows, previous link first and next link last.
    pub fn items(&self) -> Vec<PageItem> {
        let mut items = Vec::with_capacity(self.page_range as usize + 2 * self.margin as usize + 4);
        items.push(PageItem::Previous {
            enabled: self.selected > 0,
        });
        items.extend(self.page_items());
        items.push(PageItem::Next {
            enabled: self.selected + 1 < self.page_count,
        });
        items
    }

    /// The event produced by clicking `item`, if any.
    pub fn select(&self, item: &PageItem) -> Option<PageChange> {
        match *item {
            PageItem::Previous { .. } => self.previous(),
            PageItem::Next { .. } => self.next(),
            PageItem::Page { number, .. } => self.go_to(number),
            PageItem::Break { target } => self.go_to(target),
        }
    }

    pub fn previous(&self) -> Option<PageChange> {
        if self.selected == 0 {
            return None;
        }
        self.change_to(self.selected - 1)
    }

    pub fn next(&self) -> Option<PageChange> {
        if self.selected + 1 >= self.page_count {
            return None;
        }
        self.change_to(self.selected + 1)
    }

    /// Event for a 1-indexed page. Nothing for the current page or one out of range.
    pub fn go_to(&self, page: u32) -> Option<PageChange> {
        if page == 0 || page > self.page_count {
            return None;
        }
        self.change_to(page - 1)
    }

    fn change_to(&self, index: u32) -> Option<PageChange> {
        (index != self.selected).then_some(PageChange { page: index + 1 })
    }

    fn page_items(&self) -> Vec<PageItem> {
        let slots = if self.page_count <= self.page_range {
            (0..self.page_count).map(Slot::Page).collect()
        } else {
            self.windowed_slots()
        };

        slots
            .into_iter()
            .map(|slot| match slot {
                Slot::Page(index) => PageItem::Page {
                    number: index + 1,
                    active: index == self.selected,
                },
                Slot::Break(index) => PageItem::Break {
                    target: self.jump_from(index) + 1,
                },
            })
            .collect()
    }

    fn windowed_slots(&self) -> Vec<Slot> {
        let selected = f64::from(self.selected);
        let count = f64::from(self.page_count);
        let range = f64::from(self.page_range);

        let mut left_side = range / 2.0;
        let mut right_side = range - left_side;
        if selected > count - range / 2.0 {
            right_side = count - selected;
            left_side = range - right_side;
        } else if selected < range / 2.0 {
            left_side = selected;
            right_side = range - left_side;
        }
        // Starting at the first page would otherwise show one link too many.
        let right_side = if self.selected == 0 && self.page_range > 1 {
            right_side - 1.0
        } else {
            right_side
        };

        let mut slots: Vec<Slot> = Vec::new();
        for index in 0..self.page_count {
            let page = index + 1;
            let position = f64::from(index);
            let in_margin = page <= self.margin || page > self.page_count.saturating_sub(self.margin);
            let in_window = position >= selected - left_side && position <= selected + right_side;

            if in_margin || in_window {
                slots.push(Slot::Page(index));
            } else if matches!(slots.last(), Some(Slot::Page(_)))
                && (self.page_range > 0 || self.margin > 0)
            {
                slots.push(Slot::Break(index));
            }
        }

        // A break standing in for a single page is replaced by that page.
        let mut resolved = slots.clone();
        for i in 1..slots.len().saturating_sub(1) {
            if let (Slot::Page(before), Slot::Break(index), Slot::Page(after)) =
                (slots[i - 1], slots[i], slots[i + 1])
            {
                if after - before <= 2 {
                    resolved[i] = Slot::Page(index);
                }
            }
        }
        resolved
    }

    /// 0-indexed destination of a break at `index`.
    fn jump_from(&self, index: u32) -> u32 {
        if self.selected < index {
            (self.selected + self.page_range).min(self.page_count - 1)
        } else {
            self.selected.saturating_sub(self.page_range)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Page(u32),
    Break(u32),
}
