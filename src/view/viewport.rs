//! Viewport management for scrolling.
//!
//! The [`Viewport`] tracks which rendered lines are visible and exposes its
//! state as a [`ScrollAdjustment`] for scroll-lock bookkeeping.

use std::ops::Range;

use super::scroll::ScrollAdjustment;

/// Manages the visible portion of the rendered document.
///
/// # Example
///
/// ```
/// use mdview::view::viewport::Viewport;
///
/// let mut vp = Viewport::new(80, 24, 100);
/// assert_eq!(vp.visible_range(), 0..24);
///
/// vp.scroll_down(10);
/// assert_eq!(vp.visible_range(), 10..34);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewport {
    width: u16,
    height: u16,
    offset: usize,
    total_lines: usize,
}

impl Viewport {
    pub const fn new(width: u16, height: u16, total_lines: usize) -> Self {
        Self {
            width,
            height,
            offset: 0,
            total_lines,
        }
    }

    pub const fn offset(&self) -> usize {
        self.offset
    }

    pub const fn width(&self) -> u16 {
        self.width
    }

    pub const fn height(&self) -> u16 {
        self.height
    }

    pub const fn total_lines(&self) -> usize {
        self.total_lines
    }

    /// Range of visible lines, clamped to the document bounds.
    pub fn visible_range(&self) -> Range<usize> {
        let start = self.offset.min(self.total_lines);
        let end = (self.offset + self.height as usize).min(self.total_lines);
        start..end
    }

    /// Scroll position as a percentage (0-100).
    pub fn scroll_percent(&self) -> u8 {
        let max_offset = self.max_offset();
        if max_offset == 0 {
            return 100;
        }
        // Percentage value always 0-100
        #[allow(
            clippy::cast_precision_loss,
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss
        )]
        {
            ((self.offset as f64 / max_offset as f64) * 100.0).round() as u8
        }
    }

    pub const fn scroll_up(&mut self, n: usize) {
        self.offset = self.offset.saturating_sub(n);
    }

    pub fn scroll_down(&mut self, n: usize) {
        self.offset = (self.offset + n).min(self.max_offset());
    }

    pub const fn page_up(&mut self) {
        self.scroll_up(self.height as usize);
    }

    pub fn page_down(&mut self) {
        self.scroll_down(self.height as usize);
    }

    pub const fn go_to_top(&mut self) {
        self.offset = 0;
    }

    pub const fn go_to_bottom(&mut self) {
        self.offset = self.max_offset();
    }

    /// Move the top of the viewport to `offset`, clamped to the bottom.
    pub fn set_offset(&mut self, offset: usize) {
        self.offset = offset.min(self.max_offset());
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.offset = self.offset.min(self.max_offset());
    }

    /// Update the total number of lines (e.g., after a relayout).
    pub fn set_total_lines(&mut self, total: usize) {
        self.total_lines = total;
        self.offset = self.offset.min(self.max_offset());
    }

    /// Largest offset that still fills the viewport.
    pub const fn max_offset(&self) -> usize {
        self.total_lines.saturating_sub(self.height as usize)
    }

    /// Vertical adjustment in lines.
    pub const fn adjustment(&self) -> ScrollAdjustment {
        ScrollAdjustment {
            value: self.offset,
            lower: 0,
            upper: self.total_lines,
            page_size: self.height as usize,
        }
    }
}
