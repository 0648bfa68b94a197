use std::path::PathBuf;

use crate::app::Model;
use crate::app::model::ToastLevel;
use crate::dialogs::Dialog;
use crate::menu::ActionId;
use crate::watcher::WatchEvent;

/// All possible events and actions in the application.
///
/// These represent user input, system events, and internal actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Navigation
    /// Scroll up by n lines
    ScrollUp(usize),
    /// Scroll down by n lines
    ScrollDown(usize),
    /// Scroll up one page
    PageUp,
    /// Scroll down one page
    PageDown,
    /// Go to beginning of document
    GoToTop,
    /// Go to end of document
    GoToBottom,

    // Menu bar
    /// Open the dropdown at this index
    OpenMenu(usize),
    CloseMenu,
    NextMenu,
    PrevMenu,
    MenuUp,
    MenuDown,
    /// Highlight a dropdown row under the mouse
    HoverMenuRow(usize),
    /// Activate a named action, from the menu or an accelerator
    Action(ActionId),

    // Document view
    /// Mouse pressed on a viewport row
    StartSelection(usize),
    /// Mouse dragged to a viewport row
    ExtendSelection(usize),
    /// Mouse released
    EndSelection,
    ClearSelection,
    /// Link under the mouse changed
    HoverLink(Option<String>),

    // Dialogs
    /// Close the top dialog
    DismissDialog,
    /// Close the preferences dialog and apply its values
    ClosePreferences,
    ChooserInput(char),
    ChooserPaste(String),
    ChooserBackspace,
    ChooserDelete,
    ChooserLeft,
    ChooserRight,
    ChooserHome,
    ChooserEnd,
    /// Accept the file chooser
    ChooserConfirm,
    PreferencesNext,
    PreferencesPrev,
    /// Step the focused preference forward (true) or back
    PreferencesCycle(bool),
    PreferencesInput(char),
    PreferencesBackspace,

    // Files
    /// Paths dropped or pasted onto the window
    Drop(Vec<PathBuf>),
    /// The watched file changed
    FileEvent(WatchEvent),

    // Window
    /// Terminal resized
    Resize(u16, u16),
    /// Force redraw
    Redraw,
    /// Quit application
    Quit,
}

/// Update the model based on a message.
///
/// Messages that touch the file system, the clipboard or the other
/// processes (actions, dropped files, watch events, accepting the file
/// chooser) are handled by the side effects instead.
pub fn update(mut model: Model, msg: Message) -> Model {
    match msg {
        // Navigation
        Message::ScrollUp(n) => model.view.scroll_up(n),
        Message::ScrollDown(n) => model.view.scroll_down(n),
        Message::PageUp => model.view.page_up(),
        Message::PageDown => model.view.page_down(),
        Message::GoToTop => model.view.go_to_top(),
        Message::GoToBottom => model.view.go_to_bottom(),

        // Menu bar
        Message::OpenMenu(index) => {
            if model.menu.open_menu() == Some(index) {
                model.menu.close();
            } else {
                model.menu.open_at(index);
            }
        }
        Message::CloseMenu => model.menu.close(),
        Message::NextMenu => model.menu.next_menu(),
        Message::PrevMenu => model.menu.prev_menu(),
        Message::MenuUp => model.menu.select_prev(),
        Message::MenuDown => model.menu.select_next(),
        Message::HoverMenuRow(row) => model.menu.hover_row(row),

        // Document view
        Message::StartSelection(row) => model.press_document(row),
        Message::ExtendSelection(row) => model.drag_document(row),
        Message::EndSelection => model.release_document(),
        Message::ClearSelection => {
            model.view.clear_selection();
            model.sync_selection();
        }
        Message::HoverLink(link) => {
            model.view.set_hovered_link(link);
        }

        // Dialogs
        Message::DismissDialog | Message::ClosePreferences => {
            model.dialogs.pop();
        }
        Message::ChooserInput(c) => with_chooser(&mut model, |chooser| chooser.insert_char(c)),
        Message::ChooserPaste(text) => with_chooser(&mut model, |chooser| chooser.insert_str(&text)),
        Message::ChooserBackspace => with_chooser(&mut model, |chooser| chooser.backspace()),
        Message::ChooserDelete => with_chooser(&mut model, |chooser| chooser.delete()),
        Message::ChooserLeft => with_chooser(&mut model, |chooser| chooser.move_left()),
        Message::ChooserRight => with_chooser(&mut model, |chooser| chooser.move_right()),
        Message::ChooserHome => with_chooser(&mut model, |chooser| chooser.move_home()),
        Message::ChooserEnd => with_chooser(&mut model, |chooser| chooser.move_end()),
        Message::PreferencesNext => model.preferences.focus_next(),
        Message::PreferencesPrev => model.preferences.focus_prev(),
        Message::PreferencesCycle(forward) => {
            let result = model.preferences.cycle(forward);
            note_preference_result(&mut model, result);
        }
        Message::PreferencesInput(c) => {
            let result = model.preferences.insert_char(c);
            note_preference_result(&mut model, result);
        }
        Message::PreferencesBackspace => {
            let result = model.preferences.backspace();
            note_preference_result(&mut model, result);
        }

        // Window
        Message::Resize(width, height) => model.resize(width, height),
        Message::Quit => model.should_quit = true,

        Message::Action(_)
        | Message::ChooserConfirm
        | Message::Drop(_)
        | Message::FileEvent(_)
        | Message::Redraw => {}
    }

    model.sync_scroll();
    model
}

fn with_chooser(model: &mut Model, f: impl FnOnce(&mut crate::dialogs::FileChooser)) {
    if let Some(Dialog::FileChooser(chooser)) = model.top_dialog_mut() {
        f(chooser);
    }
}

fn note_preference_result(model: &mut Model, result: anyhow::Result<()>) {
    if let Err(err) = result {
        tracing::warn!(error = %err, "failed to save preferences");
        model.show_toast(ToastLevel::Warning, format!("Preferences not saved: {err}"));
    }
}
