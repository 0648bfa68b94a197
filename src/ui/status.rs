use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::{Model, ToastLevel};

use super::style::Theme;

pub fn render_hover_link_bar(model: &Model, frame: &mut Frame, area: Rect, theme: &Theme) {
    let Some(url) = model.view.hovered_link() else {
        return;
    };
    let bar = Paragraph::new(format!(" {url}")).style(theme.link_bar);
    frame.render_widget(bar, area);
}

/// Status line text: file name, position, zoom and mode.
pub fn status_text(model: &Model) -> String {
    let Some(path) = model.file() else {
        return " No document  Ctrl+O: open  F10: menu".to_string();
    };
    let filename = path
        .file_name()
        .map_or_else(|| "untitled".to_string(), |s| s.to_string_lossy().to_string());

    let viewport = model.view.viewport();
    let line_info = format!(
        "Line {}/{}",
        (viewport.offset() + 1).min(viewport.total_lines().max(1)),
        viewport.total_lines()
    );
    let zoom = (model.view.zoom_level() * 100.0).round();
    let source_indicator = if model.view.view_source_mode() {
        " [source]"
    } else {
        ""
    };
    let watch_indicator = if model.is_watching() {
        ""
    } else {
        " [not watching]"
    };

    format!(
        " {filename}  [{}%]  {line_info}  {zoom}%{source_indicator}{watch_indicator}  F10: menu",
        viewport.scroll_percent()
    )
}

pub fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect, theme: &Theme) {
    let status_bar = Paragraph::new(status_text(model)).style(theme.status_bar());
    frame.render_widget(status_bar, area);
}

pub fn render_toast_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some((message, level)) = model.active_toast() else {
        return;
    };
    let (prefix, style) = match level {
        ToastLevel::Info => (
            "[info]",
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
        ToastLevel::Warning => (
            "[warn]",
            Style::default().bg(Color::Yellow).fg(Color::Black),
        ),
        ToastLevel::Error => ("[error]", Style::default().bg(Color::Red).fg(Color::White)),
    };
    let toast = Paragraph::new(format!("{prefix} {message}")).style(style);
    frame.render_widget(toast, area);
}
