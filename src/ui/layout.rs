//! List paging and popup placement

use ratatui::layout::Rect;
use std::ops::Range;

/// Single-column paged list of order rows
#[derive(Debug, Clone, Copy)]
pub struct ListLayout {
    /// Rows visible at once
    pub visible_rows: u16,
}

impl Default for ListLayout {
    fn default() -> Self {
        Self { visible_rows: 10 }
    }
}

impl ListLayout {
    pub fn new(visible_rows: u16) -> Self {
        Self {
            visible_rows: visible_rows.max(1),
        }
    }

    /// Range of rows to display so that `selected` stays on screen
    pub fn visible_range(&self, selected: usize, total: usize) -> Range<usize> {
        if total == 0 {
            return 0..0;
        }

        let page_size = self.visible_rows as usize;
        let page = selected.min(total - 1) / page_size;
        let start = page * page_size;
        let end = (start + page_size).min(total);
        start..end
    }

    pub fn move_up(&self, current: usize) -> usize {
        current.saturating_sub(1)
    }

    pub fn move_down(&self, current: usize, total: usize) -> usize {
        if current + 1 < total {
            current + 1
        } else {
            current
        }
    }

    pub fn page_up(&self, current: usize) -> usize {
        current.saturating_sub(self.visible_rows as usize)
    }

    pub fn page_down(&self, current: usize, total: usize) -> usize {
        (current + self.visible_rows as usize).min(total.saturating_sub(1))
    }

    pub fn move_end(&self, total: usize) -> usize {
        total.saturating_sub(1)
    }
}

/// A `width` x `height` rect centered in `area`, shrunk to fit
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
