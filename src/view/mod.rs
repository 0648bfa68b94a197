//! The document view.
//!
//! A restricted HTML surface: the converter's output is laid out as styled
//! terminal lines. There is no scripting and no plugin content. The view
//! owns its scroll state and reports offset changes so that the controller
//! can restore the reading position after a reload.

pub mod html;
pub mod scroll;
pub mod types;
pub mod viewport;

use std::ops::RangeInclusive;

pub use scroll::{ScrollAdjustment, ScrollLock};
pub use types::{InlineSpan, InlineStyle, LineType, Markup, RenderedLine};
pub use viewport::Viewport;

/// Zoom is kept in tenths so that repeated steps land on exact levels.
const ZOOM_DEFAULT: u16 = 10;
const ZOOM_MIN: u16 = 3;
const ZOOM_MAX: u16 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Selection {
    anchor: usize,
    cursor: usize,
}

impl Selection {
    fn range(self) -> RangeInclusive<usize> {
        self.anchor.min(self.cursor)..=self.anchor.max(self.cursor)
    }
}

#[derive(Debug, Clone)]
pub struct BrowserView {
    html: String,
    base_uri: Option<String>,
    lines: Vec<RenderedLine>,
    viewport: Viewport,
    zoom: u16,
    view_source: bool,
    selection: Option<Selection>,
    hovered_link: Option<String>,
    value_changed: bool,
}

impl BrowserView {
    pub const fn new(width: u16, height: u16) -> Self {
        Self {
            html: String::new(),
            base_uri: None,
            lines: Vec::new(),
            viewport: Viewport::new(width, height, 0),
            zoom: ZOOM_DEFAULT,
            view_source: false,
            selection: None,
            hovered_link: None,
            value_changed: false,
        }
    }

    /// Replace the content. The offset returns to the top, as a browser
    /// does on every document load, and the link bar is hidden.
    pub fn load_html(&mut self, html: &str, base_uri: &str) {
        html.clone_into(&mut self.html);
        self.base_uri = Some(base_uri.to_string());
        self.selection = None;
        self.hovered_link = None;
        self.relayout();
        if self.viewport.offset() != 0 {
            self.viewport.go_to_top();
            self.value_changed = true;
        }
        tracing::debug!(lines = self.lines.len(), base = base_uri, "document laid out");
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn base_uri(&self) -> Option<&str> {
        self.base_uri.as_deref()
    }

    pub fn has_content(&self) -> bool {
        !self.lines.is_empty()
    }

    pub fn lines(&self) -> &[RenderedLine] {
        &self.lines
    }

    /// Lines currently inside the viewport.
    pub fn visible_lines(&self) -> &[RenderedLine] {
        &self.lines[self.viewport.visible_range()]
    }

    pub const fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub const fn view_source_mode(&self) -> bool {
        self.view_source
    }

    pub fn set_view_source_mode(&mut self, enabled: bool) {
        if self.view_source != enabled {
            self.view_source = enabled;
            self.selection = None;
            self.relayout();
        }
    }

    pub fn zoom_level(&self) -> f64 {
        f64::from(self.zoom) / 10.0
    }

    /// Set the zoom level, rounded to a tenth and clamped to 0.3..=3.0.
    pub fn set_zoom_level(&mut self, level: f64) {
        // Clamped to ZOOM_MIN..=ZOOM_MAX before the cast
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let tenths = (level * 10.0)
            .round()
            .clamp(f64::from(ZOOM_MIN), f64::from(ZOOM_MAX)) as u16;
        if tenths != self.zoom {
            self.zoom = tenths;
            self.relayout();
        }
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom_level(f64::from(self.zoom + 1) / 10.0);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom_level(f64::from(self.zoom.saturating_sub(1)) / 10.0);
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        let before = self.viewport.offset();
        self.viewport.resize(width, height);
        self.relayout();
        if self.viewport.offset() != before {
            self.value_changed = true;
        }
    }

    /// Width used for wrapping: the viewport width divided by the zoom
    /// level, never wider than the viewport.
    pub fn wrap_width(&self) -> usize {
        let width = usize::from(self.viewport.width());
        let zoomed = width * 10 / usize::from(self.zoom);
        zoomed.clamp(1, width.max(1))
    }

    fn relayout(&mut self) {
        let width = self.wrap_width();
        self.lines = if self.view_source {
            html::source_lines(&self.html, width)
        } else {
            html::layout(&self.html, width)
        };
        let before = self.viewport.offset();
        self.viewport.set_total_lines(self.lines.len());
        if self.viewport.offset() != before {
            self.value_changed = true;
        }
        if let Some(selection) = &mut self.selection {
            let last = self.lines.len().saturating_sub(1);
            selection.anchor = selection.anchor.min(last);
            selection.cursor = selection.cursor.min(last);
            if self.lines.is_empty() {
                self.selection = None;
            }
        }
    }

    pub const fn adjustment(&self) -> ScrollAdjustment {
        self.viewport.adjustment()
    }

    /// Offset changes since the last call, as the current adjustment.
    pub const fn take_value_changed(&mut self) -> Option<ScrollAdjustment> {
        if self.value_changed {
            self.value_changed = false;
            Some(self.viewport.adjustment())
        } else {
            None
        }
    }

    fn scroll_with(&mut self, f: impl FnOnce(&mut Viewport)) {
        let before = self.viewport.offset();
        f(&mut self.viewport);
        if self.viewport.offset() != before {
            self.value_changed = true;
        }
    }

    pub fn set_scroll_value(&mut self, value: usize) {
        self.scroll_with(|vp| vp.set_offset(value));
    }

    pub fn scroll_up(&mut self, n: usize) {
        self.scroll_with(|vp| vp.scroll_up(n));
    }

    pub fn scroll_down(&mut self, n: usize) {
        self.scroll_with(|vp| vp.scroll_down(n));
    }

    pub fn page_up(&mut self) {
        self.scroll_with(Viewport::page_up);
    }

    pub fn page_down(&mut self) {
        self.scroll_with(Viewport::page_down);
    }

    pub fn go_to_top(&mut self) {
        self.scroll_with(Viewport::go_to_top);
    }

    pub fn go_to_bottom(&mut self) {
        self.scroll_with(Viewport::go_to_bottom);
    }

    pub fn select_all(&mut self) {
        if !self.lines.is_empty() {
            self.selection = Some(Selection {
                anchor: 0,
                cursor: self.lines.len() - 1,
            });
        }
    }

    /// Begin a selection at viewport row `row`.
    pub fn start_selection(&mut self, row: usize) {
        self.selection = self.line_index(row).map(|line| Selection {
            anchor: line,
            cursor: line,
        });
    }

    /// Extend the selection to viewport row `row`, clamped to the content.
    pub fn extend_selection(&mut self, row: usize) {
        let last = self.lines.len().saturating_sub(1);
        let line = (self.viewport.offset() + row).min(last);
        if let Some(selection) = &mut self.selection {
            selection.cursor = line;
        }
    }

    pub const fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub const fn has_selection(&self) -> bool {
        self.selection.is_some()
    }

    /// Selected document lines, inclusive.
    pub fn selection_range(&self) -> Option<RangeInclusive<usize>> {
        self.selection.map(Selection::range)
    }

    /// Text of the selected lines, trailing spaces trimmed.
    pub fn selected_text(&self) -> Option<String> {
        let range = self.selection_range()?;
        let text = self.lines[range]
            .iter()
            .map(|line| line.content().trim_end())
            .collect::<Vec<_>>()
            .join("\n");
        Some(text)
    }

    fn line_index(&self, row: usize) -> Option<usize> {
        let line = self.viewport.offset() + row;
        (line < self.lines.len()).then_some(line)
    }

    /// Link target at viewport `row` and display `column`.
    pub fn link_at(&self, row: usize, column: usize) -> Option<&str> {
        self.lines.get(self.line_index(row)?)?.link_at(column)
    }

    pub fn hovered_link(&self) -> Option<&str> {
        self.hovered_link.as_deref()
    }

    /// Update the hovered link; returns whether it changed.
    pub fn set_hovered_link(&mut self, link: Option<String>) -> bool {
        if self.hovered_link == link {
            return false;
        }
        self.hovered_link = link;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_html(paragraphs: usize) -> String {
        (0..paragraphs).map(|i| format!("<p>paragraph {i}</p>\n")).collect()
    }

    fn loaded(paragraphs: usize) -> BrowserView {
        let mut view = BrowserView::new(40, 10);
        view.load_html(&long_html(paragraphs), "file:///tmp/doc.md");
        view
    }

    #[test]
    fn test_load_resets_offset_and_reports_change() {
        let mut view = loaded(50);
        view.scroll_down(20);
        assert!(view.take_value_changed().is_some());

        view.load_html(&long_html(50), "file:///tmp/doc.md");
        let adj = view.take_value_changed().expect("offset reset is reported");
        assert_eq!(adj.value, 0);
        assert!(adj.upper > 0);
    }

    #[test]
    fn test_load_at_top_reports_nothing() {
        let mut view = loaded(50);
        let _ = view.take_value_changed();
        view.load_html(&long_html(10), "file:///tmp/doc.md");
        assert_eq!(view.take_value_changed(), None);
    }

    #[test]
    fn test_load_hides_hovered_link() {
        let mut view = loaded(3);
        assert!(view.set_hovered_link(Some("https://example.org".to_string())));
        view.load_html("<p>x</p>", "file:///tmp/doc.md");
        assert_eq!(view.hovered_link(), None);
    }

    #[test]
    fn test_zoom_steps_and_clamps() {
        let mut view = loaded(3);
        view.zoom_in();
        view.zoom_in();
        assert!((view.zoom_level() - 1.2).abs() < f64::EPSILON);
        view.set_zoom_level(10.0);
        assert!((view.zoom_level() - 3.0).abs() < f64::EPSILON);
        for _ in 0..50 {
            view.zoom_out();
        }
        assert!((view.zoom_level() - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zoom_narrows_wrap_width() {
        let mut view = loaded(3);
        assert_eq!(view.wrap_width(), 40);
        view.set_zoom_level(2.0);
        assert_eq!(view.wrap_width(), 20);
        view.set_zoom_level(0.5);
        assert_eq!(view.wrap_width(), 40);
    }

    #[test]
    fn test_view_source_shows_markup() {
        let mut view = BrowserView::new(80, 10);
        view.load_html("<h1>T</h1>\n<p>x</p>\n", "file:///tmp/doc.md");
        assert_eq!(view.lines()[0].content(), "T");
        view.set_view_source_mode(true);
        assert_eq!(view.lines()[0].content(), "<h1>T</h1>");
        assert_eq!(view.lines().len(), 2);
        view.set_view_source_mode(false);
        assert_eq!(view.lines()[0].content(), "T");
    }

    #[test]
    fn test_select_all_and_copy_text() {
        let mut view = BrowserView::new(80, 10);
        view.load_html("<p>one</p><p>two</p>", "file:///tmp/doc.md");
        assert!(!view.has_selection());
        view.select_all();
        assert_eq!(view.selected_text().as_deref(), Some("one\n\ntwo"));
    }

    #[test]
    fn test_drag_selection_is_ordered() {
        let mut view = loaded(10);
        view.start_selection(4);
        view.extend_selection(2);
        assert_eq!(view.selection_range(), Some(2..=4));
        view.clear_selection();
        assert!(!view.has_selection());
    }

    #[test]
    fn test_selection_outside_content_is_empty() {
        let mut view = BrowserView::new(80, 10);
        view.load_html("<p>only</p>", "file:///tmp/doc.md");
        view.start_selection(5);
        assert!(!view.has_selection());
    }

    #[test]
    fn test_link_at_viewport_position() {
        let mut view = BrowserView::new(80, 10);
        view.load_html(r#"<p><a href="b.md">next</a></p>"#, "file:///tmp/doc.md");
        assert_eq!(view.link_at(0, 1), Some("b.md"));
        assert_eq!(view.link_at(0, 10), None);
        assert_eq!(view.link_at(3, 0), None);
    }

    #[test]
    fn test_scroll_reports_only_real_changes() {
        let mut view = loaded(50);
        let _ = view.take_value_changed();
        view.scroll_up(5);
        assert_eq!(view.take_value_changed(), None);
        view.set_scroll_value(7);
        assert_eq!(view.take_value_changed().map(|a| a.value), Some(7));
    }
}
