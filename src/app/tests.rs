use std::cell::RefCell;
use std::fmt::Write as _;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use tempfile::{TempDir, tempdir};

use crate::dialogs::{ChooserMode, Dialog, Preferences};
use crate::menu::ActionId;
use crate::options::{OptionKey, OptionSchema, OptionValue, OutputFormat, SafeMode};
use crate::spawn::Spawner;
use crate::watcher::WatchEvent;

use super::event_loop::ResizeDebouncer;
use super::{App, Message, Model, ToastLevel, ViewerError, update, window_title};

#[derive(Debug, Clone, Default)]
struct RecordingSpawner {
    calls: Rc<RefCell<Vec<Vec<PathBuf>>>>,
}

impl Spawner for RecordingSpawner {
    fn spawn_instance(&mut self, paths: &[PathBuf]) -> io::Result<()> {
        self.calls.borrow_mut().push(paths.to_vec());
        Ok(())
    }
}

struct FailingSpawner;

impl Spawner for FailingSpawner {
    fn spawn_instance(&mut self, _paths: &[PathBuf]) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::NotFound, "no terminal emulator"))
    }
}

fn create_test_model() -> (Model, RecordingSpawner) {
    let spawner = RecordingSpawner::default();
    let preferences = Preferences::load(Arc::new(OptionSchema::markdown()), None);
    let model = Model::new((80, 24), preferences, Box::new(spawner.clone()));
    (model, spawner)
}

fn create_test_app(dir: &Path) -> App {
    App::new(Vec::new()).with_working_dir(dir.to_path_buf())
}

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn long_markdown(paragraphs: usize) -> String {
    let mut md = String::from("# Long document\n\n");
    for i in 1..=paragraphs {
        writeln!(md, "Line {i} of content.\n").unwrap();
    }
    md
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn ctrl(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
}

fn error_messages(model: &Model) -> Vec<String> {
    model
        .dialogs
        .iter()
        .rev()
        .filter_map(|dialog| match dialog {
            Dialog::Error { message } => Some(message.clone()),
            _ => None,
        })
        .collect()
}

// Loading

#[test]
fn test_load_shows_document() {
    let dir = tempdir().unwrap();
    let path = write_file(&dir, "readme.md", "# Title\n\nHello *world*\n");
    let (mut model, _) = create_test_model();

    let previous = model.load(&path, false).unwrap();

    assert_eq!(previous, None);
    assert_eq!(model.file(), Some(path.as_path()));
    assert!(model.html().unwrap().contains("<em>world</em>"));
    assert!(model.view.has_content());
    assert!(model.menu.document_available());
    assert_eq!(model.title, format!("readme.md ({}) - mdview", dir.path().display()));
    let base = model.view.base_uri().unwrap();
    assert_eq!(base, format!("file://{}", path.display()));
}

#[test]
fn test_load_missing_file_keeps_previous_state() {
    let dir = tempdir().unwrap();
    let good = write_file(&dir, "good.md", "good content\n");
    let missing = dir.path().join("missing.md");
    let (mut model, _) = create_test_model();

    let err = model.load(&missing, false).unwrap_err();
    assert!(matches!(err, ViewerError::Read { .. }));
    assert_eq!(model.file(), None);
    assert_eq!(model.html(), None);

    model.load(&good, false).unwrap();
    let html = model.html().unwrap().to_string();
    let err = model.load(&missing, true).unwrap_err();

    assert_eq!(err.to_string(), format!("Failed loading file {}", missing.display()));
    assert_eq!(model.file(), Some(good.as_path()));
    assert_eq!(model.html(), Some(html.as_str()));
    assert!(model.view.html().contains("good content"));
}

#[test]
fn test_load_returns_previous_path() {
    let dir = tempdir().unwrap();
    let a = write_file(&dir, "a.md", "a\n");
    let b = write_file(&dir, "b.md", "b\n");
    let (mut model, _) = create_test_model();

    model.load(&a, false).unwrap();
    assert_eq!(model.load(&b, false).unwrap(), Some(a));
}

#[test]
fn test_loading_same_path_twice_reloads() {
    let dir = tempdir().unwrap();
    let path = write_file(&dir, "doc.md", "first version\n");
    let (mut model, _) = create_test_model();
    model.load(&path, false).unwrap();
    model.view.zoom_in();

    std::fs::write(&path, "second version\n").unwrap();
    let previous = model.load(&path, false).unwrap();

    assert_eq!(previous.as_deref(), Some(path.as_path()));
    assert!(model.html().unwrap().contains("second version"));
    assert!((model.view.zoom_level() - 1.0).abs() < f64::EPSILON);
}

#[test]
fn test_load_leaves_view_source_mode() {
    let dir = tempdir().unwrap();
    let path = write_file(&dir, "doc.md", "text\n");
    let app = create_test_app(dir.path());
    let (mut model, _) = create_test_model();
    model.load(&path, false).unwrap();

    app.dispatch(&mut model, Message::Action(ActionId::ViewSource));
    assert!(model.view.view_source_mode());
    assert!(model.menu.is_active(ActionId::ViewSource));

    model.load(&path, false).unwrap();
    assert!(!model.view.view_source_mode());
    assert!(!model.menu.is_active(ActionId::ViewSource));
}

#[test]
fn test_revert_resets_zoom_without_reading() {
    let dir = tempdir().unwrap();
    let path = write_file(&dir, "doc.md", "original\n");
    let (mut model, _) = create_test_model();
    model.load(&path, false).unwrap();
    model.view.zoom_in();
    model.view.zoom_in();

    std::fs::write(&path, "changed on disk\n").unwrap();
    model.revert();

    assert!((model.view.zoom_level() - 1.0).abs() < f64::EPSILON);
    assert!(model.view.html().contains("original"));
}

#[test]
fn test_reload_without_file_is_noop() {
    let (mut model, _) = create_test_model();
    assert!(model.reload(true).is_ok());
    assert!(!model.view.has_content());
}

// Scroll preservation

#[test]
fn test_preserving_reload_restores_offset() {
    let dir = tempdir().unwrap();
    let path = write_file(&dir, "long.md", &long_markdown(60));
    let (mut model, _) = create_test_model();
    model.load(&path, false).unwrap();

    model = update(model, Message::ScrollDown(10));
    assert_eq!(model.view.viewport().offset(), 10);

    model.reload(true).unwrap();
    assert_eq!(model.view.viewport().offset(), 10);
    assert_eq!(model.scroll_lock(), None);
}

#[test]
fn test_plain_reload_returns_to_top() {
    let dir = tempdir().unwrap();
    let path = write_file(&dir, "long.md", &long_markdown(60));
    let (mut model, _) = create_test_model();
    model.load(&path, false).unwrap();
    model = update(model, Message::ScrollDown(10));

    model.reload(false).unwrap();
    assert_eq!(model.view.viewport().offset(), 0);
}

#[test]
fn test_preserving_reload_sticks_to_bottom() {
    let dir = tempdir().unwrap();
    let path = write_file(&dir, "long.md", &long_markdown(60));
    let (mut model, _) = create_test_model();
    model.load(&path, false).unwrap();
    model = update(model, Message::GoToBottom);
    let old_bottom = model.view.viewport().offset();
    assert_eq!(old_bottom, model.view.viewport().max_offset());

    std::fs::write(&path, long_markdown(80)).unwrap();
    model.on_watch_event(&WatchEvent::ChangesDone).unwrap();

    let viewport = model.view.viewport();
    assert!(viewport.offset() > old_bottom);
    assert_eq!(viewport.offset(), viewport.max_offset());
}

#[test]
fn test_lock_is_not_taken_at_top() {
    let dir = tempdir().unwrap();
    let path = write_file(&dir, "long.md", &long_markdown(60));
    let (mut model, _) = create_test_model();
    model.load(&path, false).unwrap();

    model.reload(true).unwrap();
    assert_eq!(model.scroll_lock(), None);
    assert_eq!(model.view.viewport().offset(), 0);
}

#[test]
fn test_failed_reload_keeps_position() {
    let dir = tempdir().unwrap();
    let path = write_file(&dir, "long.md", &long_markdown(60));
    let (mut model, _) = create_test_model();
    model.load(&path, false).unwrap();
    model = update(model, Message::ScrollDown(7));

    std::fs::remove_file(&path).unwrap();
    assert!(model.reload(true).is_err());
    assert_eq!(model.view.viewport().offset(), 7);
    assert_eq!(model.scroll_lock(), None);

    std::fs::write(&path, long_markdown(60)).unwrap();
    model.on_watch_event(&WatchEvent::Created).unwrap();
    assert_eq!(model.view.viewport().offset(), 7);
    assert_eq!(model.scroll_lock(), None);
}

// Several files

#[test]
fn test_load_files_keeps_first_and_spawns_rest() {
    let dir = tempdir().unwrap();
    let a = write_file(&dir, "a.md", "a\n");
    let b = write_file(&dir, "b.md", "b\n");
    let (mut model, spawner) = create_test_model();

    let errors = model.load_files(&[a.clone(), b.clone()]);

    assert!(errors.is_empty());
    assert_eq!(model.file(), Some(a.as_path()));
    assert_eq!(*spawner.calls.borrow(), vec![vec![b]]);
}

#[test]
fn test_load_files_reloads_current_in_place() {
    let dir = tempdir().unwrap();
    let a = write_file(&dir, "a.md", "old a\n");
    let b = write_file(&dir, "b.md", "b\n");
    let (mut model, spawner) = create_test_model();
    model.load(&a, false).unwrap();
    std::fs::write(&a, "new a\n").unwrap();

    let errors = model.load_files(&[b.clone(), a.clone()]);

    assert!(errors.is_empty());
    assert_eq!(model.file(), Some(a.as_path()));
    assert!(model.html().unwrap().contains("new a"));
    assert_eq!(*spawner.calls.borrow(), vec![vec![b]]);
}

#[test]
fn test_load_files_skips_unreadable() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing.md");
    let b = write_file(&dir, "b.md", "b\n");
    let (mut model, spawner) = create_test_model();

    let errors = model.load_files(&[missing, b.clone()]);

    assert_eq!(errors.len(), 1);
    assert_eq!(model.file(), Some(b.as_path()));
    assert!(spawner.calls.borrow().is_empty());
}

#[test]
fn test_load_files_absolutises_relative_paths() {
    let (mut model, _) = create_test_model();
    let errors = model.load_files(&[PathBuf::from("does-not-exist.md")]);
    let [ViewerError::Read { path, .. }] = errors.as_slice() else {
        panic!("expected one read error, got {errors:?}");
    };
    assert!(path.is_absolute());
}

#[test]
fn test_failed_spawn_is_reported() {
    let dir = tempdir().unwrap();
    let a = write_file(&dir, "a.md", "a\n");
    let b = write_file(&dir, "b.md", "b\n");
    let preferences = Preferences::load(Arc::new(OptionSchema::markdown()), None);
    let mut model = Model::new((80, 24), preferences, Box::new(FailingSpawner));

    model.open_files(&[a, b]);

    let messages = error_messages(&model);
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("Failed opening 1 file(s) in a new window"));
}

#[test]
fn test_errors_are_shown_in_order() {
    let dir = tempdir().unwrap();
    let first = dir.path().join("first.md");
    let second = dir.path().join("second.md");
    let (mut model, _) = create_test_model();

    model.open_files(&[first.clone(), second.clone()]);

    let messages = error_messages(&model);
    assert_eq!(messages.len(), 2);
    assert!(messages[0].contains(&first.display().to_string()));
    assert!(messages[1].contains(&second.display().to_string()));

    model = update(model, Message::DismissDialog);
    let messages = error_messages(&model);
    assert!(messages[0].contains(&second.display().to_string()));
}

#[test]
fn test_dropped_paths_open_files() {
    let dir = tempdir().unwrap();
    let path = write_file(&dir, "dropped file.md", "dropped\n");
    let app = create_test_app(dir.path());
    let (mut model, _) = create_test_model();

    let uri = format!("file://{}", path.display()).replace(' ', "%20");
    let msg = app.handle_event(Event::Paste(uri), &model, 0, &mut ResizeDebouncer::new(100));
    let Some(msg @ Message::Drop(_)) = msg else {
        panic!("expected drop message, got {msg:?}");
    };
    app.dispatch(&mut model, msg);

    assert_eq!(model.file(), Some(path.as_path()));
}

// Watch reaction

#[test]
fn test_moved_file_is_followed() {
    let dir = tempdir().unwrap();
    let old = write_file(&dir, "old.md", "content\n");
    let (mut model, _) = create_test_model();
    model.load(&old, false).unwrap();

    let new = dir.path().join("new.md");
    std::fs::rename(&old, &new).unwrap();
    model.on_watch_event(&WatchEvent::Moved(new.clone())).unwrap();

    assert_eq!(model.file(), Some(new.as_path()));
    assert!(model.title.starts_with("new.md"));
}

#[test]
fn test_watch_event_error_reaches_dialog() {
    let dir = tempdir().unwrap();
    let path = write_file(&dir, "doc.md", "content\n");
    let app = create_test_app(dir.path());
    let (mut model, _) = create_test_model();
    model.load(&path, false).unwrap();
    std::fs::remove_file(&path).unwrap();

    app.dispatch(&mut model, Message::FileEvent(WatchEvent::ChangesDone));

    let messages = error_messages(&model);
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with(&format!("Failed loading file {}", path.display())));
}

// Export

#[test]
fn test_export_writes_rendered_html() {
    let dir = tempdir().unwrap();
    let path = write_file(&dir, "doc.md", "# Export me\n\n* one\n* two\n");
    let target = dir.path().join("doc.html");
    let (mut model, _) = create_test_model();
    model.load(&path, false).unwrap();

    model.export_html(&target).unwrap();

    let written = std::fs::read_to_string(&target).unwrap();
    assert_eq!(written, model.html().unwrap());
}

#[test]
fn test_export_error_names_target() {
    let dir = tempdir().unwrap();
    let path = write_file(&dir, "doc.md", "text\n");
    let target = dir.path().join("no-such-dir").join("doc.html");
    let (mut model, _) = create_test_model();
    model.load(&path, false).unwrap();

    let err = model.export_html(&target).unwrap_err();
    assert!(matches!(err, ViewerError::Write { .. }));
    assert_eq!(err.to_string(), format!("Failed writing file {}", target.display()));
}

#[test]
fn test_export_dialog_writes_file() {
    let dir = tempdir().unwrap();
    let path = write_file(&dir, "notes.md", "notes\n");
    let app = create_test_app(dir.path());
    let (mut model, _) = create_test_model();
    model.load(&path, false).unwrap();

    app.dispatch(&mut model, Message::Action(ActionId::ExportHtml));
    let Some(Dialog::FileChooser(chooser)) = model.top_dialog() else {
        panic!("export dialog not shown");
    };
    assert_eq!(chooser.mode(), ChooserMode::Export);

    app.dispatch(&mut model, Message::ChooserConfirm);

    assert!(model.dialogs.is_empty());
    let written = std::fs::read_to_string(dir.path().join("notes.html")).unwrap();
    assert_eq!(written, model.html().unwrap());
    assert!(model.active_toast().is_some());
}

// Menu and options

#[test]
fn test_document_actions_need_a_document() {
    let dir = tempdir().unwrap();
    let path = write_file(&dir, "doc.md", "text\n");
    let app = create_test_app(dir.path());
    let (mut model, _) = create_test_model();

    app.dispatch(&mut model, Message::Action(ActionId::ZoomIn));
    assert!((model.view.zoom_level() - 1.0).abs() < f64::EPSILON);
    assert!(!model.menu.is_sensitive(ActionId::ExportHtml));

    model.load(&path, false).unwrap();
    app.dispatch(&mut model, Message::Action(ActionId::ZoomIn));
    assert!(model.view.zoom_level() > 1.0);
    assert!(model.menu.is_sensitive(ActionId::ExportHtml));
}

#[test]
fn test_copy_needs_a_selection() {
    let dir = tempdir().unwrap();
    let path = write_file(&dir, "doc.md", "one\n\ntwo\n");
    let app = create_test_app(dir.path());
    let (mut model, _) = create_test_model();
    model.load(&path, false).unwrap();
    assert!(!model.menu.is_sensitive(ActionId::Copy));

    app.dispatch(&mut model, Message::Action(ActionId::SelectAll));
    assert!(model.menu.is_sensitive(ActionId::Copy));

    model = update(model, Message::ClearSelection);
    assert!(!model.menu.is_sensitive(ActionId::Copy));
}

#[test]
fn test_mouse_drag_selects_lines() {
    let dir = tempdir().unwrap();
    let path = write_file(&dir, "doc.md", &long_markdown(10));
    let (mut model, _) = create_test_model();
    model.load(&path, false).unwrap();

    model = update(model, Message::StartSelection(0));
    assert!(!model.view.has_selection());
    model = update(model, Message::ExtendSelection(2));
    model = update(model, Message::EndSelection);

    assert_eq!(model.view.selection_range(), Some(0..=2));
    assert!(model.menu.is_sensitive(ActionId::Copy));
}

#[test]
fn test_radio_option_keeps_one_member_active() {
    let dir = tempdir().unwrap();
    let path = write_file(&dir, "doc.md", "text\n");
    let app = create_test_app(dir.path());
    let (mut model, _) = create_test_model();
    model.load(&path, false).unwrap();

    app.dispatch(&mut model, Message::Action(ActionId::OutputFormat(OutputFormat::Xhtml1)));

    let active = OutputFormat::ALL
        .iter()
        .filter(|format| model.menu.is_active(ActionId::OutputFormat(**format)))
        .count();
    assert_eq!(active, 1);
    assert_eq!(model.menu.output_format(), Some(OutputFormat::Xhtml1));
    assert_eq!(
        model.md_options().get(OptionKey::OutputFormat),
        Some(&OptionValue::from("xhtml1"))
    );
    assert_eq!(model.converter().config().output_format, OutputFormat::Xhtml1);
}

#[test]
fn test_safe_mode_change_reconverts() {
    let dir = tempdir().unwrap();
    let path = write_file(&dir, "doc.md", "<div>raw</div>\n");
    let app = create_test_app(dir.path());
    let (mut model, _) = create_test_model();
    model.load(&path, false).unwrap();
    assert!(model.html().unwrap().contains("&lt;div&gt;"));

    app.dispatch(&mut model, Message::Action(ActionId::SafeMode(SafeMode::Off)));

    assert_eq!(model.menu.safe_mode(), Some(SafeMode::Off));
    assert!(model.html().unwrap().contains("<div>raw</div>"));
}

#[test]
fn test_menu_follows_preferences() {
    let (model, _) = create_test_model();
    assert_eq!(model.menu.output_format(), Some(OutputFormat::Html5));
    assert_eq!(model.menu.safe_mode(), Some(SafeMode::Escape));
    assert!(model.menu.is_active(ActionId::SmartEmphasis));
    assert_eq!(model.converter().config().safe_mode, SafeMode::Escape);
}

#[test]
fn test_closing_preferences_applies_them() {
    let dir = tempdir().unwrap();
    let path = write_file(&dir, "doc.md", "<div>raw</div>\n");
    let app = create_test_app(dir.path());
    let (mut model, _) = create_test_model();
    model.load(&path, false).unwrap();

    app.dispatch(&mut model, Message::Action(ActionId::Preferences));
    assert_eq!(model.top_dialog(), Some(&Dialog::Preferences));
    model
        .preferences
        .set(OptionKey::SafeMode, SafeMode::Off.to_value())
        .unwrap();
    model
        .preferences
        .set(OptionKey::SmartEmphasis, OptionValue::Bool(false))
        .unwrap();
    app.dispatch(&mut model, Message::ClosePreferences);

    assert!(model.dialogs.is_empty());
    assert_eq!(model.menu.safe_mode(), Some(SafeMode::Off));
    assert!(!model.menu.is_active(ActionId::SmartEmphasis));
    assert!(model.html().unwrap().contains("<div>raw</div>"));
}

#[test]
fn test_preferences_are_written_through() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("settings");
    let app = App::new(Vec::new()).with_settings_path(Some(store.clone()));
    let mut model = app.initial_model((80, 24));

    app.dispatch(&mut model, Message::Action(ActionId::Preferences));
    app.dispatch(&mut model, Message::PreferencesCycle(true));

    let stored = crate::config::load_settings(&store).unwrap();
    assert_eq!(
        stored.get(&OptionKey::OutputFormat),
        Some(&OptionValue::from("xhtml1"))
    );
}

// Input mapping

#[test]
fn test_keys_map_to_messages() {
    let dir = tempdir().unwrap();
    let app = create_test_app(dir.path());
    let (model, _) = create_test_model();

    assert_eq!(app.handle_key(key(KeyCode::F(10)), &model), Some(Message::OpenMenu(0)));
    assert_eq!(
        app.handle_key(ctrl('o'), &model),
        Some(Message::Action(ActionId::Open))
    );
    assert_eq!(
        app.handle_key(ctrl('q'), &model),
        Some(Message::Action(ActionId::Quit))
    );
    assert_eq!(app.handle_key(key(KeyCode::Char('j')), &model), Some(Message::ScrollDown(1)));
}

#[test]
fn test_menu_keyboard_navigation() {
    let dir = tempdir().unwrap();
    let app = create_test_app(dir.path());
    let (mut model, _) = create_test_model();

    model = update(model, Message::OpenMenu(0));
    assert_eq!(model.menu.open_menu(), Some(0));
    assert_eq!(
        app.handle_key(key(KeyCode::Enter), &model),
        Some(Message::Action(ActionId::Open))
    );

    app.dispatch(&mut model, Message::Action(ActionId::Open));
    assert_eq!(model.menu.open_menu(), None);
    let Some(Dialog::FileChooser(chooser)) = model.top_dialog() else {
        panic!("open dialog not shown");
    };
    assert_eq!(chooser.mode(), ChooserMode::Open);
}

#[test]
fn test_dialog_keys_are_modal() {
    let dir = tempdir().unwrap();
    let app = create_test_app(dir.path());
    let (mut model, _) = create_test_model();
    app.dispatch(&mut model, Message::Action(ActionId::About));

    assert_eq!(app.handle_key(key(KeyCode::Char('j')), &model), None);
    assert_eq!(app.handle_key(ctrl('q'), &model), None);
    assert_eq!(app.handle_key(key(KeyCode::Esc), &model), Some(Message::DismissDialog));
}

#[test]
fn test_open_dialog_loads_typed_path() {
    let dir = tempdir().unwrap();
    let path = write_file(&dir, "typed.md", "typed\n");
    let app = create_test_app(dir.path());
    let (mut model, _) = create_test_model();

    app.dispatch(&mut model, Message::Action(ActionId::Open));
    for c in "typed.md".chars() {
        app.dispatch(&mut model, Message::ChooserInput(c));
    }
    app.dispatch(&mut model, Message::ChooserConfirm);

    assert!(model.dialogs.is_empty());
    assert_eq!(model.file(), Some(path.as_path()));
}

#[test]
fn test_paste_goes_to_open_chooser() {
    let dir = tempdir().unwrap();
    let app = create_test_app(dir.path());
    let (mut model, _) = create_test_model();
    app.dispatch(&mut model, Message::Action(ActionId::Open));

    let msg = app.handle_event(
        Event::Paste("x.md".to_string()),
        &model,
        0,
        &mut ResizeDebouncer::new(100),
    );
    assert_eq!(msg, Some(Message::ChooserPaste("x.md".to_string())));
}

#[test]
fn test_ctrl_wheel_zooms() {
    let dir = tempdir().unwrap();
    let app = create_test_app(dir.path());
    let (model, _) = create_test_model();
    let wheel = |kind, modifiers| MouseEvent {
        kind,
        column: 10,
        row: 5,
        modifiers,
    };

    assert_eq!(
        app.handle_mouse(wheel(MouseEventKind::ScrollUp, KeyModifiers::CONTROL), &model),
        Some(Message::Action(ActionId::ZoomIn))
    );
    assert_eq!(
        app.handle_mouse(wheel(MouseEventKind::ScrollDown, KeyModifiers::NONE), &model),
        Some(Message::ScrollDown(3))
    );
}

#[test]
fn test_click_on_menu_title_opens_it() {
    let dir = tempdir().unwrap();
    let app = create_test_app(dir.path());
    let (model, _) = create_test_model();
    let click = MouseEvent {
        kind: MouseEventKind::Down(MouseButton::Left),
        column: 2,
        row: 0,
        modifiers: KeyModifiers::NONE,
    };
    assert_eq!(app.handle_mouse(click, &model), Some(Message::OpenMenu(0)));
}

// Window chrome

#[test]
fn test_window_title_abbreviates_home() {
    let title = window_title(Path::new("/home/ann/docs/a.md"), Some(Path::new("/home/ann")));
    assert_eq!(title, "a.md (~/docs) - mdview");
    let title = window_title(Path::new("/srv/a.md"), Some(Path::new("/home/ann")));
    assert_eq!(title, "a.md (/srv) - mdview");
    let title = window_title(Path::new("/home/annie/a.md"), Some(Path::new("/home/ann")));
    assert_eq!(title, "a.md (/home/annie) - mdview");
}

#[test]
fn test_resize_changes_document_area() {
    let (model, _) = create_test_model();
    let model = update(model, Message::Resize(100, 40));
    assert_eq!(model.view.viewport().height(), 38);
    assert_eq!(model.view.viewport().width(), 99);
}

#[test]
fn test_quit_action() {
    let dir = tempdir().unwrap();
    let app = create_test_app(dir.path());
    let (mut model, _) = create_test_model();
    app.dispatch(&mut model, Message::Action(ActionId::Quit));
    assert!(model.should_quit);
}

#[test]
fn test_toast_expires() {
    let (mut model, _) = create_test_model();
    model.show_toast(ToastLevel::Info, "hello");
    assert_eq!(model.active_toast(), Some(("hello", ToastLevel::Info)));
    assert!(!model.expire_toast(Instant::now()));
    assert!(model.expire_toast(Instant::now() + Duration::from_secs(5)));
    assert_eq!(model.active_toast(), None);
}

#[test]
fn test_resize_debouncer_waits_for_delay() {
    let mut debouncer = ResizeDebouncer::new(100);
    debouncer.queue(120, 40, 1_000);
    assert!(debouncer.is_pending());
    assert_eq!(debouncer.take_ready(1_050), None);
    assert_eq!(debouncer.take_ready(1_100), Some((120, 40)));
    assert!(!debouncer.is_pending());
}
