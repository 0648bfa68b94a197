//! The menu bar and its dropdowns.
//!
//! Titles sit side by side in the top row. An open dropdown hangs below its
//! title; nested submenus are listed inline under a heading.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::app::Model;
use crate::menu::{ActionKind, Menu, MenuRow};

use super::style::Theme;

fn title_width(title: &str) -> u16 {
    u16::try_from(title.width()).unwrap_or(u16::MAX).saturating_add(2)
}

/// Column where the title of menu `index` starts.
fn title_x(menu: &Menu, index: usize) -> u16 {
    menu.menus()
        .iter()
        .take(index)
        .map(|submenu| title_width(submenu.title))
        .fold(0, u16::saturating_add)
}

/// Index of the menu whose title covers `column`.
pub fn menu_title_at(menu: &Menu, column: u16) -> Option<usize> {
    let mut x = 0_u16;
    for (index, submenu) in menu.menus().iter().enumerate() {
        let width = title_width(submenu.title);
        if column >= x && column < x.saturating_add(width) {
            return Some(index);
        }
        x = x.saturating_add(width);
    }
    None
}

/// Label and accelerator text of a dropdown row.
fn row_text(menu: &Menu, row: MenuRow) -> (String, &'static str) {
    match row {
        MenuRow::Item { id, nested } => {
            let Some(action) = menu.action(id) else {
                return (String::new(), "");
            };
            let mark = match action.kind {
                ActionKind::Plain => "    ",
                ActionKind::Toggle if action.is_active() => "[x] ",
                ActionKind::Toggle => "[ ] ",
                ActionKind::Radio(_) if action.is_active() => "(*) ",
                ActionKind::Radio(_) => "( ) ",
            };
            let indent = if nested { "  " } else { "" };
            let accel = action.accel.map_or("", |accel| accel.label());
            (format!("{indent}{mark}{}", action.label), accel)
        }
        MenuRow::Label(label) => (format!("    {label}"), ""),
        MenuRow::Separator => (String::new(), ""),
    }
}

/// Screen area of the dropdown for menu `index`, borders included.
pub fn dropdown_rect(menu: &Menu, index: usize, area: Rect) -> Rect {
    let rows = menu.rows(index);
    let content = rows
        .iter()
        .map(|row| {
            let (label, accel) = row_text(menu, *row);
            if accel.is_empty() {
                label.width()
            } else {
                label.width() + 3 + accel.width()
            }
        })
        .max()
        .unwrap_or(0);
    // One space of margin on either side plus the borders
    let width = u16::try_from(content + 4)
        .unwrap_or(u16::MAX)
        .min(area.width);
    let height = u16::try_from(rows.len() + 2)
        .unwrap_or(u16::MAX)
        .min(area.height.saturating_sub(1));
    let x = title_x(menu, index).min(area.width.saturating_sub(width));
    Rect::new(area.x + x, area.y + 1, width, height)
}

pub fn render_menu_bar(model: &Model, frame: &mut Frame, area: Rect, theme: &Theme) {
    let open = model.menu.open_menu();
    let spans: Vec<Span> = model
        .menu
        .menus()
        .iter()
        .enumerate()
        .map(|(index, submenu)| {
            let style = if open == Some(index) {
                theme.menu_selected
            } else {
                theme.menu_bar()
            };
            Span::styled(format!(" {} ", submenu.title), style)
        })
        .collect();
    frame.render_widget(Paragraph::new(Line::from(spans)).style(theme.menu_bar()), area);
}

pub fn render_dropdown(model: &Model, frame: &mut Frame, area: Rect, theme: &Theme) {
    let Some(open) = model.menu.open_menu() else {
        return;
    };
    let popup = dropdown_rect(&model.menu, open, area);
    let inner_width = usize::from(popup.width.saturating_sub(2));
    let selected = model.menu.selected_row();

    let lines: Vec<Line> = model
        .menu
        .rows(open)
        .into_iter()
        .enumerate()
        .map(|(index, row)| match row {
            MenuRow::Separator => Line::styled("─".repeat(inner_width), theme.menu_disabled),
            MenuRow::Label(_) => {
                let (label, _) = row_text(&model.menu, row);
                Line::styled(format!(" {label}"), theme.menu_accel.add_modifier(Modifier::BOLD))
            }
            MenuRow::Item { id, .. } => {
                let (label, accel) = row_text(&model.menu, row);
                let (style, accel_style) = if index == selected {
                    (theme.menu_selected, theme.menu_selected)
                } else if !model.menu.is_sensitive(id) {
                    (theme.menu_disabled, theme.menu_disabled)
                } else {
                    (theme.menu_bar(), theme.menu_accel)
                };
                let gap = inner_width.saturating_sub(label.width() + accel.width() + 2);
                Line::from(vec![
                    Span::styled(format!(" {label}{}", " ".repeat(gap)), style),
                    Span::styled(format!("{accel} "), accel_style),
                ])
            }
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .style(theme.menu_bar());
    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}
