use crossterm::event::{self, Event, KeyCode, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::Frame;
use ratatui::layout::Rect;

use crate::app::model::DOCUMENT_LEFT_PADDING;
use crate::app::{App, Message, Model};
use crate::dialogs::Dialog;
use crate::menu::{ActionId, MenuRow};

use super::event_loop::ResizeDebouncer;

/// Lines scrolled per mouse wheel notch.
const WHEEL_LINES: usize = 3;

impl App {
    pub(super) fn handle_event(
        &self,
        event: Event,
        model: &Model,
        now_ms: u64,
        resize_debouncer: &mut ResizeDebouncer,
    ) -> Option<Message> {
        match event {
            Event::Key(key) => self.handle_key(key, model),
            Event::Mouse(mouse) => self.handle_mouse(mouse, model),
            Event::Paste(text) => Some(Self::handle_paste(text, model)),
            Event::Resize(w, h) => {
                tracing::trace!(width = w, height = h, "resize queued");
                resize_debouncer.queue(w, h, now_ms);
                None
            }
            _ => None,
        }
    }

    /// Pasted text is typed into an open file chooser, and otherwise
    /// treated as files dropped onto the window.
    fn handle_paste(text: String, model: &Model) -> Message {
        if matches!(model.top_dialog(), Some(Dialog::FileChooser(_))) {
            return Message::ChooserPaste(text);
        }
        Message::Drop(crate::uri::paths_from_drop(&text))
    }

    pub(super) fn handle_mouse(&self, mouse: MouseEvent, model: &Model) -> Option<Message> {
        // Dialogs are modal.
        if model.top_dialog().is_some() {
            return None;
        }

        let ctrl = mouse.modifiers.contains(KeyModifiers::CONTROL);
        match mouse.kind {
            MouseEventKind::ScrollUp if ctrl => return Some(Message::Action(ActionId::ZoomIn)),
            MouseEventKind::ScrollDown if ctrl => return Some(Message::Action(ActionId::ZoomOut)),
            MouseEventKind::ScrollUp => return Some(Message::ScrollUp(WHEEL_LINES)),
            MouseEventKind::ScrollDown => return Some(Message::ScrollDown(WHEEL_LINES)),
            _ => {}
        }

        let area = terminal_area(model);
        if mouse.row == 0 {
            return match mouse.kind {
                MouseEventKind::Down(MouseButton::Left) => {
                    match crate::ui::menu_title_at(&model.menu, mouse.column) {
                        Some(index) => Some(Message::OpenMenu(index)),
                        None => model.menu.open_menu().map(|_| Message::CloseMenu),
                    }
                }
                _ => None,
            };
        }

        if let Some(open) = model.menu.open_menu() {
            let popup = crate::ui::dropdown_rect(&model.menu, open, area);
            let row = dropdown_row(popup, mouse.column, mouse.row);
            return match (mouse.kind, row) {
                (MouseEventKind::Moved, Some(row)) => Some(Message::HoverMenuRow(row)),
                (MouseEventKind::Up(MouseButton::Left), Some(row)) => {
                    match model.menu.rows(open).get(row) {
                        Some(MenuRow::Item { id, .. }) if model.menu.is_sensitive(*id) => {
                            Some(Message::Action(*id))
                        }
                        _ => None,
                    }
                }
                (MouseEventKind::Down(MouseButton::Left), None) => Some(Message::CloseMenu),
                _ => None,
            };
        }

        let doc = document_rect(model);
        let in_doc = point_in_rect(mouse.column, mouse.row, doc);
        let row = usize::from(mouse.row.saturating_sub(doc.y));
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) if in_doc => Some(Message::StartSelection(row)),
            MouseEventKind::Drag(MouseButton::Left) => {
                let last = usize::from(doc.height.saturating_sub(1));
                Some(Message::ExtendSelection(row.min(last)))
            }
            MouseEventKind::Up(MouseButton::Left) => Some(Message::EndSelection),
            MouseEventKind::Moved => {
                let link = if in_doc {
                    let column = usize::from(mouse.column.saturating_sub(doc.x));
                    model.view.link_at(row, column).map(str::to_string)
                } else {
                    None
                };
                (link.as_deref() != model.view.hovered_link()).then_some(Message::HoverLink(link))
            }
            _ => None,
        }
    }

    pub(super) fn handle_key(&self, key: event::KeyEvent, model: &Model) -> Option<Message> {
        if key.kind != event::KeyEventKind::Press {
            return None;
        }

        if let Some(dialog) = model.top_dialog() {
            return Self::handle_dialog_key(key, dialog, model);
        }

        if model.menu.open_menu().is_some() {
            return match key.code {
                KeyCode::Left => Some(Message::PrevMenu),
                KeyCode::Right => Some(Message::NextMenu),
                KeyCode::Up => Some(Message::MenuUp),
                KeyCode::Down => Some(Message::MenuDown),
                KeyCode::Enter | KeyCode::Char(' ') => model.menu.highlighted().map(Message::Action),
                KeyCode::Esc | KeyCode::F(10) => Some(Message::CloseMenu),
                _ => None,
            };
        }

        if key.code == KeyCode::F(10) {
            return Some(Message::OpenMenu(0));
        }

        if let Some(id) = model.menu.action_for_key(&key) {
            return Some(Message::Action(id));
        }

        // Alt+<initial> opens the matching menu
        if key.modifiers.contains(KeyModifiers::ALT)
            && let KeyCode::Char(c) = key.code
        {
            let c = c.to_ascii_lowercase();
            return model
                .menu
                .menus()
                .iter()
                .position(|menu| menu.title.to_ascii_lowercase().starts_with(c))
                .map(Message::OpenMenu);
        }

        match key.code {
            KeyCode::Char('q') => Some(Message::Quit),
            KeyCode::Char('j') | KeyCode::Down => Some(Message::ScrollDown(1)),
            KeyCode::Char('k') | KeyCode::Up => Some(Message::ScrollUp(1)),
            KeyCode::Char(' ') | KeyCode::PageDown => Some(Message::PageDown),
            KeyCode::Char('b') | KeyCode::PageUp => Some(Message::PageUp),
            KeyCode::Char('g') | KeyCode::Home => Some(Message::GoToTop),
            KeyCode::Char('G') | KeyCode::End => Some(Message::GoToBottom),
            KeyCode::Char('r') => Some(Message::Redraw),
            KeyCode::Esc if model.view.has_selection() => Some(Message::ClearSelection),
            _ => None,
        }
    }

    fn handle_dialog_key(key: event::KeyEvent, dialog: &Dialog, model: &Model) -> Option<Message> {
        match dialog {
            Dialog::Error { .. } | Dialog::About => match key.code {
                KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') => Some(Message::DismissDialog),
                _ => None,
            },
            Dialog::FileChooser(_) => match key.code {
                KeyCode::Esc => Some(Message::DismissDialog),
                KeyCode::Enter => Some(Message::ChooserConfirm),
                KeyCode::Backspace => Some(Message::ChooserBackspace),
                KeyCode::Delete => Some(Message::ChooserDelete),
                KeyCode::Left => Some(Message::ChooserLeft),
                KeyCode::Right => Some(Message::ChooserRight),
                KeyCode::Home => Some(Message::ChooserHome),
                KeyCode::End => Some(Message::ChooserEnd),
                KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    Some(Message::ChooserInput(c))
                }
                _ => None,
            },
            Dialog::Preferences => {
                let text_field = model.preferences.is_text(model.preferences.focused());
                match key.code {
                    KeyCode::Esc | KeyCode::Enter => Some(Message::ClosePreferences),
                    KeyCode::Down | KeyCode::Tab => Some(Message::PreferencesNext),
                    KeyCode::Up | KeyCode::BackTab => Some(Message::PreferencesPrev),
                    KeyCode::Right => Some(Message::PreferencesCycle(true)),
                    KeyCode::Left => Some(Message::PreferencesCycle(false)),
                    KeyCode::Backspace if text_field => Some(Message::PreferencesBackspace),
                    KeyCode::Char(c) if text_field => Some(Message::PreferencesInput(c)),
                    KeyCode::Char(' ') => Some(Message::PreferencesCycle(true)),
                    _ => None,
                }
            }
        }
    }

    pub(super) fn view(&self, model: &Model, frame: &mut Frame) {
        crate::ui::render(model, frame);
    }
}

/// Whole terminal, reconstructed from the document area.
fn terminal_area(model: &Model) -> Rect {
    let doc = document_rect(model);
    Rect::new(0, 0, doc.x + doc.width, doc.y + doc.height + 1)
}

/// Screen area of the document, below the menu bar.
fn document_rect(model: &Model) -> Rect {
    let viewport = model.view.viewport();
    Rect::new(DOCUMENT_LEFT_PADDING, 1, viewport.width(), viewport.height())
}

fn point_in_rect(col: u16, row: u16, rect: Rect) -> bool {
    col >= rect.x && col < rect.x + rect.width && row >= rect.y && row < rect.y + rect.height
}

/// Dropdown row under the pointer, inside the popup's border.
fn dropdown_row(popup: Rect, col: u16, row: u16) -> Option<usize> {
    let inner = Rect::new(
        popup.x + 1,
        popup.y + 1,
        popup.width.saturating_sub(2),
        popup.height.saturating_sub(2),
    );
    point_in_rect(col, row, inner).then(|| usize::from(row - inner.y))
}
