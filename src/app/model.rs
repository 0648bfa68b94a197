use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::convert::MarkdownConverter;
use crate::dialogs::{Dialog, PROGRAM_NAME, Preferences};
use crate::menu::{ActionId, Menu};
use crate::options::{MarkdownOptions, OptionKey, OptionSchema, OptionValue, OutputFormat, SafeMode};
use crate::spawn::{ProcessSpawner, Spawner};
use crate::view::{BrowserView, ScrollLock, scroll};
use crate::watcher::{CHANGES_DONE_DEBOUNCE, FileWatcher, WatchEvent};

/// Columns kept free left of the document.
pub const DOCUMENT_LEFT_PADDING: u16 = 1;

/// Rows taken by the menu bar and the status bar.
const CHROME_ROWS: u16 = 2;

/// Failures of the document operations.
///
/// The display text is what the error dialog shows; the source, when there
/// is one, is appended as detail.
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("Failed loading file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed loading file {}", path.display())]
    Convert { path: PathBuf, message: String },
    #[error("Failed writing file {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed opening {count} file(s) in a new window")]
    Spawn {
        count: usize,
        #[source]
        source: std::io::Error,
    },
}

impl ViewerError {
    /// Message with the underlying cause, as shown to the user.
    pub fn detailed(&self) -> String {
        match self {
            Self::Convert { message, .. } => format!("{self}\n\n{message}"),
            Self::Read { source, .. } | Self::Write { source, .. } | Self::Spawn { source, .. } => {
                format!("{self}\n\n{source}")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

/// The complete application state.
///
/// One document per window. The model owns the view, the menu state, the
/// watch on the current file and the options used to convert it.
pub struct Model {
    pub view: BrowserView,
    pub menu: Menu,
    pub preferences: Preferences,
    /// Open dialogs; the last one is on top and receives input.
    pub dialogs: Vec<Dialog>,
    pub title: String,
    pub should_quit: bool,
    file: Option<PathBuf>,
    html: Option<String>,
    watcher: Option<FileWatcher>,
    md_options: MarkdownOptions,
    converter: MarkdownConverter,
    scroll_lock: Option<ScrollLock>,
    /// Set while menu state is synchronised to the preferences.
    menu_batch: bool,
    /// Row where a mouse drag started, until the selection is created.
    drag_anchor: Option<usize>,
    spawner: Box<dyn Spawner>,
    toast: Option<Toast>,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("file", &self.file)
            .field("title", &self.title)
            .field("dialogs", &self.dialogs)
            .field("scroll_lock", &self.scroll_lock)
            .finish_non_exhaustive()
    }
}

impl Model {
    /// Create the model for a terminal of `terminal_size` (columns, rows).
    ///
    /// The menu is synchronised to `preferences` right away.
    pub fn new(
        terminal_size: (u16, u16),
        preferences: Preferences,
        spawner: Box<dyn Spawner>,
    ) -> Self {
        let (width, height) = document_area(terminal_size.0, terminal_size.1);
        let schema = Arc::clone(preferences.options().schema());
        let mut model = Self {
            view: BrowserView::new(width, height),
            menu: Menu::new(),
            preferences,
            dialogs: Vec::new(),
            title: PROGRAM_NAME.to_string(),
            should_quit: false,
            file: None,
            html: None,
            watcher: None,
            md_options: MarkdownOptions::new(schema),
            converter: MarkdownConverter::default(),
            scroll_lock: None,
            menu_batch: false,
            drag_anchor: None,
            spawner,
            toast: None,
        };
        model.setup_markdown_menu();
        model
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// HTML of the last successful conversion.
    pub fn html(&self) -> Option<&str> {
        self.html.as_deref()
    }

    pub const fn md_options(&self) -> &MarkdownOptions {
        &self.md_options
    }

    pub const fn converter(&self) -> &MarkdownConverter {
        &self.converter
    }

    pub const fn scroll_lock(&self) -> Option<ScrollLock> {
        self.scroll_lock
    }

    pub const fn is_watching(&self) -> bool {
        self.watcher.is_some()
    }

    /// Next event from the watch on the current file.
    pub fn poll_watch(&mut self) -> Option<WatchEvent> {
        self.watcher.as_mut()?.poll()
    }

    // Document operations

    /// Make `path` the current document.
    ///
    /// Returns the previously shown path. On failure the previous path and
    /// HTML are kept and the view is left untouched.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or converted.
    pub fn load(
        &mut self,
        path: &Path,
        lock_scrolling: bool,
    ) -> Result<Option<PathBuf>, ViewerError> {
        let path = absolutize(path);
        let old_file = self.file.replace(path.clone());
        let old_html = self.html.take();

        if let Err(err) = self.reload(lock_scrolling) {
            self.file = old_file;
            self.html = old_html;
            return Err(err);
        }

        self.watch(&path);
        self.view.set_zoom_level(1.0);
        self.menu.set_document_available(true);
        self.set_view_source(false);
        self.title = window_title(&path, home_dir().as_deref());
        tracing::info!(path = %path.display(), "document loaded");
        Ok(old_file)
    }

    /// Read, convert and show the current file again.
    ///
    /// Does nothing without a current file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or converted; the shown
    /// document is kept in that case.
    pub fn reload(&mut self, lock_scrolling: bool) -> Result<(), ViewerError> {
        let Some(path) = self.file.clone() else {
            return Ok(());
        };
        let source = std::fs::read_to_string(&path).map_err(|source| ViewerError::Read {
            path: path.clone(),
            source,
        })?;
        let html = self
            .converter
            .convert(&source)
            .map_err(|err| ViewerError::Convert {
                path: path.clone(),
                message: err.to_string(),
            })?;
        tracing::debug!(path = %path.display(), bytes = html.len(), "document converted");
        self.html = Some(html);
        self.render(lock_scrolling);
        Ok(())
    }

    /// Reset the zoom and show the last HTML again, without reading the file.
    pub fn revert(&mut self) {
        self.view.set_zoom_level(1.0);
        self.render(false);
    }

    /// Write the last rendered HTML to `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn export_html(&self, path: &Path) -> Result<(), ViewerError> {
        let html = self.html.as_deref().unwrap_or_default();
        std::fs::write(path, html).map_err(|source| ViewerError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), "exported html");
        Ok(())
    }

    /// Open a batch of files.
    ///
    /// The current file in the batch is reloaded in place; otherwise the
    /// first file that loads is shown here. The rest go to a new instance.
    /// Every failure along the way is returned, in order.
    pub fn load_files(&mut self, paths: &[PathBuf]) -> Vec<ViewerError> {
        let mut files: Vec<PathBuf> = paths.iter().map(|p| absolutize(p)).collect();
        let mut errors = Vec::new();

        let current = self
            .file
            .as_ref()
            .and_then(|file| files.iter().position(|f| f == file));
        if let Some(index) = current {
            self.set_view_source(false);
            self.view.set_zoom_level(1.0);
            if let Err(err) = self.reload(false) {
                errors.push(err);
            }
            files.remove(index);
        } else {
            while !files.is_empty() {
                let path = files.remove(0);
                match self.load(&path, false) {
                    Ok(_) => break,
                    Err(err) => errors.push(err),
                }
            }
        }

        if !files.is_empty() {
            tracing::info!(count = files.len(), "opening remaining files in a new instance");
            if let Err(source) = self.spawner.spawn_instance(&files) {
                errors.push(ViewerError::Spawn {
                    count: files.len(),
                    source,
                });
            }
        }
        errors
    }

    /// [`Model::load_files`], reporting every failure.
    pub fn open_files(&mut self, paths: &[PathBuf]) {
        for err in self.load_files(paths) {
            self.report(&err);
        }
    }

    /// React to a change of the watched file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be loaded again.
    pub fn on_watch_event(&mut self, event: &WatchEvent) -> Result<(), ViewerError> {
        tracing::debug!(?event, "watch event");
        match event {
            WatchEvent::ChangesDone => self.reload(true),
            WatchEvent::Created => {
                if let Some(path) = self.file.clone() {
                    self.watch(&path);
                }
                self.reload(true)
            }
            WatchEvent::Moved(to) => self.load(to, true).map(|_| ()),
        }
    }

    fn watch(&mut self, path: &Path) {
        // Drop the old watch first so only one is ever installed.
        self.watcher = None;
        match FileWatcher::new(path, CHANGES_DONE_DEBOUNCE) {
            Ok(watcher) => self.watcher = Some(watcher),
            Err(err) => tracing::warn!(path = %path.display(), error = %err, "cannot watch file"),
        }
    }

    /// Put the last HTML into the view.
    fn render(&mut self, lock_scrolling: bool) {
        let Some(html) = self.html.as_deref() else {
            return;
        };
        if lock_scrolling && let Some(lock) = ScrollLock::capture(&self.view.adjustment()) {
            self.scroll_lock = Some(lock);
        }
        let base_uri = self
            .file
            .as_ref()
            .map(|path| format!("file://{}", path.display()))
            .unwrap_or_default();
        self.view.load_html(html, &base_uri);
        self.sync_scroll();
    }

    /// Feed offset changes of the view to the pending scroll lock.
    pub fn sync_scroll(&mut self) {
        while let Some(adjustment) = self.view.take_value_changed() {
            if let Some(target) = scroll::on_value_changed(&mut self.scroll_lock, &adjustment) {
                tracing::debug!(target, "restoring scroll position");
                self.view.set_scroll_value(target);
            }
        }
    }

    // Markdown options

    /// Bring the markdown menu in line with the preferences, then rebuild
    /// the converter once.
    pub fn setup_markdown_menu(&mut self) {
        let prefs = self.preferences.to_map();
        self.menu_batch = true;

        let toggles = [
            (OptionKey::EnableAttributes, ActionId::EnableAttributes),
            (OptionKey::SmartEmphasis, ActionId::SmartEmphasis),
            (OptionKey::LazyOl, ActionId::LazyOl),
        ];
        for (key, id) in toggles {
            let Some(value) = prefs.get(&key).and_then(OptionValue::as_bool) else {
                continue;
            };
            let changed = match id {
                ActionId::EnableAttributes => self.menu.set_enable_attributes(value),
                ActionId::SmartEmphasis => self.menu.set_smart_emphasis(value),
                _ => self.menu.set_lazy_ol(value),
            };
            if changed {
                self.markdown_option_changed(id);
            }
        }
        if let Some(format) = prefs
            .get(&OptionKey::OutputFormat)
            .and_then(OutputFormat::from_value)
            && self.menu.set_output_format(format)
        {
            self.markdown_option_changed(ActionId::OutputFormat(format));
        }
        if let Some(mode) = prefs.get(&OptionKey::SafeMode).and_then(SafeMode::from_value)
            && self.menu.set_safe_mode(mode)
        {
            self.markdown_option_changed(ActionId::SafeMode(mode));
        }

        self.menu_batch = false;
        self.setup_markdown();
    }

    fn markdown_option_changed(&mut self, id: ActionId) {
        if let Err(err) = self.on_markdown_option(id) {
            self.report(&err);
        }
    }

    /// Rebuild the converter from the preferences overlaid with the
    /// window's own options.
    pub fn setup_markdown(&mut self) {
        let map = self.md_options.to_map(Some(&self.preferences.to_map()));
        self.converter = MarkdownConverter::from_options(&map);
    }

    /// Record the menu state of a markdown option and, outside a menu
    /// synchronisation, convert the document again.
    ///
    /// # Errors
    /// Returns an error if the document cannot be reloaded.
    pub fn on_markdown_option(&mut self, id: ActionId) -> Result<(), ViewerError> {
        let active = self.menu.is_active(id);
        match id {
            ActionId::EnableAttributes => self.md_options.set_key(OptionKey::EnableAttributes, active),
            ActionId::SmartEmphasis => self.md_options.set_key(OptionKey::SmartEmphasis, active),
            ActionId::LazyOl => self.md_options.set_key(OptionKey::LazyOl, active),
            ActionId::OutputFormat(format) if active => {
                self.md_options.set_key(OptionKey::OutputFormat, format.to_value());
            }
            ActionId::SafeMode(mode) if active => {
                self.md_options.set_key(OptionKey::SafeMode, mode.to_value());
            }
            _ => return Ok(()),
        }
        if self.menu_batch {
            return Ok(());
        }
        self.setup_markdown();
        self.reload(true)
    }

    /// The preferences dialog was closed.
    ///
    /// # Errors
    /// Returns an error if the document cannot be reloaded.
    pub fn on_preferences_changed(&mut self) -> Result<(), ViewerError> {
        self.setup_markdown_menu();
        self.reload(true)
    }

    // View state

    /// Follow the view-source toggle of the menu.
    pub fn on_view_source(&mut self) {
        self.view
            .set_view_source_mode(self.menu.is_active(ActionId::ViewSource));
        self.render(false);
    }

    fn set_view_source(&mut self, view_source: bool) {
        if self.menu.set_view_source(view_source) {
            self.on_view_source();
        }
    }

    /// Keep the selection-dependent actions in step with the view.
    pub fn sync_selection(&mut self) {
        self.menu.set_selection_available(self.view.has_selection());
    }

    pub(super) fn press_document(&mut self, row: usize) {
        self.view.clear_selection();
        self.drag_anchor = Some(row);
        self.sync_selection();
    }

    pub(super) fn drag_document(&mut self, row: usize) {
        if !self.view.has_selection() {
            let Some(anchor) = self.drag_anchor else {
                return;
            };
            self.view.start_selection(anchor);
        }
        self.view.extend_selection(row);
        self.sync_selection();
    }

    pub(super) const fn release_document(&mut self) {
        self.drag_anchor = None;
    }

    /// Fit the view to a terminal of `width` x `height` cells.
    pub fn resize(&mut self, width: u16, height: u16) {
        let (width, height) = document_area(width, height);
        self.view.resize(width, height);
        self.sync_scroll();
    }

    // Dialogs and notifications

    pub fn top_dialog(&self) -> Option<&Dialog> {
        self.dialogs.last()
    }

    pub fn top_dialog_mut(&mut self) -> Option<&mut Dialog> {
        self.dialogs.last_mut()
    }

    pub fn show_dialog(&mut self, dialog: Dialog) {
        self.menu.close();
        self.dialogs.push(dialog);
    }

    /// Show `err` in an error dialog.
    ///
    /// Errors queue up behind each other, so a burst of failures is shown
    /// in the order they happened.
    pub fn report(&mut self, err: &ViewerError) {
        tracing::warn!(error = %err, detail = %err.detailed(), "operation failed");
        let at = self
            .dialogs
            .iter()
            .rposition(|dialog| !matches!(dialog, Dialog::Error { .. }))
            .map_or(0, |index| index + 1);
        self.menu.close();
        self.dialogs.insert(
            at,
            Dialog::Error {
                message: err.detailed(),
            },
        );
    }

    pub(super) fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(Toast {
            level,
            message: message.into(),
            expires_at: Instant::now() + Duration::from_secs(4),
        });
    }

    pub(super) fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }
}

// Implement Default for Model to allow std::mem::take
impl Default for Model {
    fn default() -> Self {
        Self::new(
            (80, 24),
            Preferences::load(Arc::new(OptionSchema::markdown()), None),
            Box::new(ProcessSpawner::default()),
        )
    }
}

/// Document size for a terminal of `width` x `height` cells.
pub(super) const fn document_area(width: u16, height: u16) -> (u16, u16) {
    (
        width.saturating_sub(DOCUMENT_LEFT_PADDING),
        height.saturating_sub(CHROME_ROWS),
    )
}

fn absolutize(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .map(PathBuf::from)
}

/// `"{name} ({dir}) - mdview"`, with `home` shown as `~`.
pub fn window_title(path: &Path, home: Option<&Path>) -> String {
    let shown = match home.and_then(|home| path.strip_prefix(home).ok()) {
        Some(rest) => Path::new("~").join(rest),
        None => path.to_path_buf(),
    };
    let name = shown
        .file_name()
        .map_or_else(String::new, |name| name.to_string_lossy().into_owned());
    let dir = shown
        .parent()
        .map_or_else(String::new, |dir| dir.display().to_string());
    format!("{name} ({dir}) - {PROGRAM_NAME}")
}
