use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph, Wrap};

use crate::app::{DOCUMENT_LEFT_PADDING, Model};

use super::style::{Theme, style_for_inline, style_for_line_type};
use super::{menubar, overlays, status};

/// Render the complete UI.
///
/// Menu bar on top, status bar at the bottom, the document in between.
/// The link bar and notifications overlay the last document row.
pub fn render(model: &Model, frame: &mut Frame) {
    let area = frame.area();
    if area.height == 0 {
        return;
    }
    let theme = Theme::detect();

    let menu_area = Rect { height: 1, ..area };
    let status_area = Rect {
        y: area.y + area.height.saturating_sub(1),
        height: 1,
        ..area
    };
    let doc_area = Rect {
        y: area.y + 1,
        height: area.height.saturating_sub(2),
        ..area
    };
    let bottom_row = Rect {
        y: doc_area.y + doc_area.height.saturating_sub(1),
        height: doc_area.height.min(1),
        ..doc_area
    };

    render_document(model, frame, doc_area);

    if model.active_toast().is_some() {
        status::render_toast_bar(model, frame, bottom_row);
    } else {
        status::render_hover_link_bar(model, frame, bottom_row, &theme);
    }
    status::render_status_bar(model, frame, status_area, &theme);

    menubar::render_menu_bar(model, frame, menu_area, &theme);
    menubar::render_dropdown(model, frame, area, &theme);
    overlays::render_dialog(model, frame, area, &theme);
}

fn render_document(model: &Model, frame: &mut Frame, area: Rect) {
    frame.render_widget(Clear, area);

    if !model.view.has_content() {
        let hint = if model.file().is_some() {
            "(empty document)"
        } else {
            "Open a Markdown file with Ctrl+O, or drop one here."
        };
        let paragraph = Paragraph::new(Line::styled(hint, Style::default().fg(Color::Indexed(245))))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        let middle = Rect {
            y: area.y + area.height / 2,
            height: area.height.min(2),
            ..area
        };
        frame.render_widget(paragraph, middle);
        return;
    }

    let offset = model.view.viewport().offset();
    let selection = model.view.selection_range();

    let content: Vec<Line> = model
        .view
        .visible_lines()
        .iter()
        .enumerate()
        .map(|(idx, line)| {
            let line_style = style_for_line_type(line.line_type());
            let mut spans: Vec<Span<'static>> = match line.spans() {
                Some(spans) => spans
                    .iter()
                    .map(|span| {
                        Span::styled(
                            span.text().to_string(),
                            style_for_inline(line_style, span.style()),
                        )
                    })
                    .collect(),
                None => vec![Span::styled(line.content().to_string(), line_style)],
            };
            if selection
                .as_ref()
                .is_some_and(|range| range.contains(&(offset + idx)))
            {
                spans = apply_selection_bg(spans, Color::DarkGray);
            }
            Line::from(spans)
        })
        .collect();

    let doc_block = Block::default()
        .borders(Borders::NONE)
        .padding(Padding::left(DOCUMENT_LEFT_PADDING));
    frame.render_widget(Paragraph::new(content).block(doc_block), area);
}

fn apply_selection_bg(spans: Vec<Span<'static>>, bg: Color) -> Vec<Span<'static>> {
    spans
        .into_iter()
        .map(|span| {
            let mut style = span.style;
            if style.bg.is_none() || style.bg == Some(Color::Reset) {
                style = style.bg(bg);
            }
            Span::styled(span.content.to_string(), style)
        })
        .collect()
}
