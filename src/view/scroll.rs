//! Scroll position preservation across reloads.
//!
//! Loading new content resets the view to the top. Before a reload that
//! should not disturb the reader, the current position is captured as a
//! [`ScrollLock`]; when the view then reports that its offset dropped to
//! zero, the lock is consumed and the position restored.

/// Vertical scroll state, in rendered lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollAdjustment {
    pub value: usize,
    pub lower: usize,
    pub upper: usize,
    pub page_size: usize,
}

impl ScrollAdjustment {
    /// Offset at which the last page is fully visible.
    pub const fn bottom(&self) -> usize {
        let bottom = self.upper.saturating_sub(self.page_size);
        if bottom < self.lower { self.lower } else { bottom }
    }
}

/// Position recorded before a reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollLock {
    /// Return to this offset.
    Offset(usize),
    /// The view was at the bottom; pin it to the new bottom.
    StickToBottom,
}

impl ScrollLock {
    /// Record the position of `adj`, or `None` when it is at the top.
    pub const fn capture(adj: &ScrollAdjustment) -> Option<Self> {
        if adj.value <= adj.lower {
            return None;
        }
        if adj.value == adj.bottom() {
            Some(Self::StickToBottom)
        } else {
            Some(Self::Offset(adj.value))
        }
    }

    /// Offset to scroll to once new content is laid out in `adj`.
    pub const fn target(self, adj: &ScrollAdjustment) -> usize {
        match self {
            Self::Offset(value) => value,
            Self::StickToBottom => adj.bottom(),
        }
    }
}

/// Decide what to do when the offset changed, given a pending lock.
///
/// Only a change to offset zero consumes the lock; content must exist for
/// the position to be restored. Returns the offset to apply, if any.
pub fn on_value_changed(lock: &mut Option<ScrollLock>, adj: &ScrollAdjustment) -> Option<usize> {
    if adj.value != 0 {
        return None;
    }
    let pending = lock.take()?;
    (adj.upper > 0).then(|| pending.target(adj))
}
