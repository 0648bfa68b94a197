use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph, Wrap};

use crate::app::Model;
use crate::dialogs::{
    COPYRIGHT, ChooserMode, Dialog, FileChooser, LICENSE, PROGRAM_NAME, VERSION, WEBSITE, description,
};
use crate::options::OptionKey;

use super::style::Theme;

/// Draw the topmost dialog, if any.
pub fn render_dialog(model: &Model, frame: &mut Frame, area: Rect, theme: &Theme) {
    match model.top_dialog() {
        Some(Dialog::Error { message }) => render_error(message, frame, area, theme),
        Some(Dialog::About) => render_about(frame, area, theme),
        Some(Dialog::Preferences) => render_preferences(model, frame, area, theme),
        Some(Dialog::FileChooser(chooser)) => render_file_chooser(chooser, frame, area, theme),
        None => {}
    }
}

fn hint_style() -> Style {
    Style::default().fg(Color::Indexed(245))
}

fn render_error(message: &str, frame: &mut Frame, area: Rect, theme: &Theme) {
    let popup_width = area.width.saturating_sub(16).clamp(20, 72);
    let inner_width = usize::from(popup_width.saturating_sub(4)).max(1);
    // Rough wrapped height; the paragraph wraps for real
    let text_rows: usize = message
        .lines()
        .map(|line| line.chars().count().div_ceil(inner_width).max(1))
        .sum();
    let popup_height = u16::try_from(text_rows + 6).unwrap_or(u16::MAX);
    let popup = centered_popup_rect(popup_width, popup_height, area);

    let mut lines: Vec<Line> = message.lines().map(|l| Line::raw(l.to_string())).collect();
    lines.push(Line::raw(""));
    lines.push(Line::styled("Enter: close", hint_style()));

    let block = Block::default()
        .title(" Error ")
        .borders(Borders::ALL)
        .border_style(theme.error_border)
        .padding(Padding::horizontal(1))
        .style(theme.dialog);
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        popup,
    );
}

fn render_about(frame: &mut Frame, area: Rect, theme: &Theme) {
    let lines = vec![
        Line::styled(format!("{PROGRAM_NAME} {VERSION}"), theme.dialog_title),
        Line::raw(""),
        Line::raw(description()),
        Line::raw(""),
        Line::styled(WEBSITE, Style::default().fg(Color::Cyan)),
        Line::raw(COPYRIGHT),
        Line::raw(LICENSE),
        Line::raw(""),
        Line::styled("Enter: close", hint_style()),
    ];
    let popup_width = area.width.saturating_sub(8).clamp(20, 76);
    let popup = centered_popup_rect(popup_width, 13, area);
    let block = Block::default()
        .title(" About ")
        .borders(Borders::ALL)
        .padding(Padding::uniform(1))
        .style(theme.dialog);
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        popup,
    );
}

const fn option_label(key: OptionKey) -> &'static str {
    match key {
        OptionKey::OutputFormat => "Output format",
        OptionKey::SafeMode => "Safe mode",
        OptionKey::HtmlReplacementText => "Replacement text",
        OptionKey::TabLength => "Tab length",
        OptionKey::EnableAttributes => "Enable attributes",
        OptionKey::SmartEmphasis => "Smart emphasis",
        OptionKey::LazyOl => "Lazy ordered lists",
    }
}

fn render_preferences(model: &Model, frame: &mut Frame, area: Rect, theme: &Theme) {
    let prefs = &model.preferences;
    let focused = prefs.focused();
    let label_width = OptionKey::ALL
        .iter()
        .map(|key| option_label(*key).len())
        .max()
        .unwrap_or(0);

    let mut lines: Vec<Line> = OptionKey::ALL
        .iter()
        .map(|key| {
            let marker = if *key == focused { "> " } else { "  " };
            let mut value = prefs.value_label(*key);
            if *key == focused && prefs.is_text(*key) {
                value.push('_');
            }
            let text = format!("{marker}{:<label_width$}  {value}", option_label(*key));
            if *key == focused {
                Line::styled(text, theme.menu_selected)
            } else {
                Line::raw(text)
            }
        })
        .collect();

    let store = prefs
        .store()
        .map_or_else(|| "not saved".to_string(), |p| p.display().to_string());
    lines.push(Line::raw(""));
    lines.push(Line::styled(format!("Settings: {store}"), hint_style()));
    lines.push(Line::styled(
        "Up/Down: select  Left/Right/Space: change  Enter: close",
        hint_style(),
    ));

    let popup_width = area.width.saturating_sub(8).clamp(30, 64);
    let popup_height = u16::try_from(lines.len() + 4).unwrap_or(u16::MAX);
    let popup = centered_popup_rect(popup_width, popup_height, area);
    let block = Block::default()
        .title(" Preferences ")
        .borders(Borders::ALL)
        .padding(Padding::uniform(1))
        .style(theme.dialog);
    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

fn render_file_chooser(chooser: &FileChooser, frame: &mut Frame, area: Rect, theme: &Theme) {
    let popup_width = area.width.saturating_sub(8).clamp(30, 90);
    let popup = centered_popup_rect(popup_width, 7, area);
    let inner_width = usize::from(popup_width.saturating_sub(4));

    let chars: Vec<char> = chooser.input().chars().collect();
    let cursor = chooser.cursor().min(chars.len());
    // Keep the cursor in view on long paths
    let start = cursor.saturating_sub(inner_width.saturating_sub(1));
    let before: String = chars[start..cursor].iter().collect();
    let under = chars.get(cursor).map_or_else(|| " ".to_string(), char::to_string);
    let after: String = chars.get(cursor + 1..).map_or_else(String::new, |rest| {
        rest.iter().collect()
    });

    let hint = match chooser.mode() {
        ChooserMode::Open => "Enter: open (quote paths with spaces)  Esc: cancel",
        ChooserMode::Export => "Enter: export  Esc: cancel",
    };
    let lines = vec![
        Line::from(vec![
            Span::raw(before),
            Span::styled(under, Style::default().add_modifier(Modifier::REVERSED)),
            Span::raw(after),
        ]),
        Line::raw(""),
        Line::styled(hint, hint_style()),
    ];

    let block = Block::default()
        .title(format!(" {} ", chooser.mode().title()))
        .borders(Borders::ALL)
        .padding(Padding::new(1, 1, 1, 0))
        .style(theme.dialog);
    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

fn centered_popup_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w) / 2);
    let y = area.y + (area.height.saturating_sub(h) / 2);
    Rect::new(x, y, w, h)
}
