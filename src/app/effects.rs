use std::io::{Write, stdout};
use std::path::PathBuf;

use crate::app::{App, Message, Model, ToastLevel};
use crate::dialogs::{ChooserMode, Dialog, FileChooser};
use crate::menu::ActionId;
use base64::Engine;

impl App {
    pub(super) fn handle_message_side_effects(&self, model: &mut Model, msg: &Message) {
        match msg {
            Message::Action(id) => self.dispatch_action(model, *id),
            Message::ChooserConfirm => Self::confirm_file_chooser(model),
            Message::ClosePreferences => {
                if let Err(err) = model.on_preferences_changed() {
                    model.report(&err);
                }
            }
            Message::Drop(paths) => {
                tracing::debug!(count = paths.len(), "files dropped");
                model.open_files(paths);
            }
            Message::FileEvent(event) => {
                if let Err(err) = model.on_watch_event(event) {
                    model.report(&err);
                }
            }
            _ => {}
        }
    }

    fn dispatch_action(&self, model: &mut Model, id: ActionId) {
        model.menu.close();
        let Some(id) = model.menu.activate(id) else {
            tracing::debug!(action = ?id, "action not available");
            return;
        };
        tracing::debug!(action = ?id, "action activated");
        match id {
            ActionId::Open => {
                let chooser = FileChooser::open(model.file(), &self.working_dir());
                model.show_dialog(Dialog::FileChooser(chooser));
            }
            ActionId::Revert => model.revert(),
            ActionId::ExportHtml => {
                let chooser = FileChooser::export(model.file(), &self.working_dir());
                model.show_dialog(Dialog::FileChooser(chooser));
            }
            ActionId::Quit => model.should_quit = true,
            ActionId::Copy => Self::copy_selection(model),
            ActionId::SelectAll => {
                model.view.select_all();
                model.sync_selection();
            }
            ActionId::Preferences => model.show_dialog(Dialog::Preferences),
            ActionId::ZoomIn => model.view.zoom_in(),
            ActionId::ZoomOut => model.view.zoom_out(),
            ActionId::ZoomNormal => model.view.set_zoom_level(1.0),
            ActionId::ViewSource => model.on_view_source(),
            ActionId::EnableAttributes
            | ActionId::SmartEmphasis
            | ActionId::LazyOl
            | ActionId::OutputFormat(_)
            | ActionId::SafeMode(_) => {
                if let Err(err) = model.on_markdown_option(id) {
                    model.report(&err);
                }
            }
            ActionId::About => model.show_dialog(Dialog::About),
        }
        model.sync_scroll();
    }

    fn confirm_file_chooser(model: &mut Model) {
        let Some(Dialog::FileChooser(chooser)) = model.top_dialog().cloned() else {
            return;
        };
        match chooser.mode() {
            ChooserMode::Open => {
                let paths = chooser.selected_paths();
                if paths.is_empty() {
                    return;
                }
                model.dialogs.pop();
                model.open_files(&paths);
            }
            ChooserMode::Export => {
                let Some(path) = chooser.export_path() else {
                    return;
                };
                model.dialogs.pop();
                match model.export_html(&path) {
                    Ok(()) => model.show_toast(
                        ToastLevel::Info,
                        format!("Exported {}", path.display()),
                    ),
                    Err(err) => model.report(&err),
                }
            }
        }
    }

    fn copy_selection(model: &mut Model) {
        let Some(text) = model.view.selected_text() else {
            return;
        };
        let lines = text.lines().count().max(1);
        match copy_to_clipboard(&text) {
            Ok(()) => {
                let noun = if lines == 1 { "line" } else { "lines" };
                model.show_toast(ToastLevel::Info, format!("Copied {lines} {noun}"));
            }
            Err(err) => {
                tracing::warn!(error = %err, "clipboard write failed");
                model.show_toast(ToastLevel::Error, format!("Copy failed: {err}"));
            }
        }
    }

    fn working_dir(&self) -> PathBuf {
        self.working_dir
            .clone()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_default()
    }
}

fn copy_to_clipboard(text: &str) -> std::io::Result<()> {
    #[cfg(target_os = "macos")]
    {
        if copy_to_pbcopy(text).is_ok() {
            return Ok(());
        }
    }
    copy_to_clipboard_osc52(text)
}

#[cfg(target_os = "macos")]
fn copy_to_pbcopy(text: &str) -> std::io::Result<()> {
    use std::process::{Command, Stdio};

    let mut child = Command::new("pbcopy").stdin(Stdio::piped()).spawn()?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(text.as_bytes())?;
    }
    let status = child.wait()?;
    if status.success() {
        Ok(())
    } else {
        Err(std::io::Error::other("pbcopy failed"))
    }
}

fn copy_to_clipboard_osc52(text: &str) -> std::io::Result<()> {
    let osc = osc52_sequence(text);
    let mut out = stdout();
    out.write_all(osc.as_bytes())?;
    out.flush()
}

fn osc52_sequence(text: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(text.as_bytes());
    format!("\x1b]52;c;{encoded}\x07")
}
