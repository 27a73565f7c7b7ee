use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Cursor and scroll window over whichever flat list is active.
///
/// Every operation takes the current list length and clamps against it, so
/// an empty or shrunken list never leaves the cursor dangling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    cursor: usize,
    scroll_offset: usize,
    visible_height: usize,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Viewport {
    pub fn new(visible_height: usize) -> Self {
        Self {
            cursor: 0,
            scroll_offset: 0,
            visible_height: visible_height.max(1),
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn visible_height(&self) -> usize {
        self.visible_height
    }

    /// Update the height after a resize. Zero is treated as one row.
    pub fn set_visible_height(&mut self, height: usize, len: usize) {
        self.visible_height = height.max(1);
        self.adjust_scroll(len);
    }

    /// Place the cursor on an absolute index, clamped
    pub fn set_cursor(&mut self, index: usize, len: usize) {
        self.cursor = index;
        self.clamp(len);
    }

    pub fn move_cursor(&mut self, delta: isize, len: usize) {
        let target = if delta.is_negative() {
            self.cursor.saturating_sub(delta.unsigned_abs())
        } else {
            self.cursor.saturating_add(delta as usize)
        };
        self.set_cursor(target, len);
    }

    /// Keep `cursor` inside `[scroll_offset, scroll_offset + visible_height)`
    /// and avoid scrolling past the end of the list.
    pub fn adjust_scroll(&mut self, len: usize) {
        if self.cursor < self.scroll_offset {
            self.scroll_offset = self.cursor;
        } else if self.cursor >= self.scroll_offset + self.visible_height {
            self.scroll_offset = self.cursor + 1 - self.visible_height;
        }
        self.scroll_offset = self
            .scroll_offset
            .min(len.saturating_sub(self.visible_height));
    }

    pub fn page_down(&mut self, len: usize) {
        self.move_cursor(self.visible_height as isize, len);
    }

    pub fn page_up(&mut self, len: usize) {
        self.move_cursor(-(self.visible_height as isize), len);
    }

    pub fn half_page_down(&mut self, len: usize) {
        self.move_cursor(self.half_page() as isize, len);
    }

    pub fn half_page_up(&mut self, len: usize) {
        self.move_cursor(-(self.half_page() as isize), len);
    }

    pub fn jump_top(&mut self, len: usize) {
        self.set_cursor(0, len);
    }

    pub fn jump_bottom(&mut self, len: usize) {
        self.set_cursor(len.saturating_sub(1), len);
    }

    /// Re-clamp after the active list changed size
    pub fn clamp(&mut self, len: usize) {
        self.cursor = self.cursor.min(len.saturating_sub(1));
        self.adjust_scroll(len);
    }

    /// Reset to the top of a fresh list
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.scroll_offset = 0;
    }

    /// Indices of the rows currently on screen
    pub fn visible_range(&self, len: usize) -> Range<usize> {
        let start = self.scroll_offset.min(len);
        let end = (self.scroll_offset + self.visible_height).min(len);
        start..end
    }

    fn half_page(&self) -> usize {
        (self.visible_height / 2).max(1)
    }
}
