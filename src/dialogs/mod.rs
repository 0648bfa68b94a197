//! Modal dialogs.
//!
//! Only one dialog is shown at a time. The preferences dialog keeps its
//! state between showings, so [`Dialog::Preferences`] only marks it open;
//! the state itself lives in [`Preferences`].

mod preferences;

use std::path::{Path, PathBuf};

pub use preferences::{Preferences, default_preferences};

pub const PROGRAM_NAME: &str = env!("CARGO_PKG_NAME");
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const WEBSITE: &str = "https://github.com/tynn/mdview-py";
pub const COPYRIGHT: &str = "Copyright © 2013 Christian Schmitz";
pub const LICENSE: &str = "GNU General Public License, version 3 or later (GPL-3.0-or-later)";

/// One-line program description shown in the about dialog.
pub fn description() -> String {
    format!("{PROGRAM_NAME} is a simple viewer for Markdown files.")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialog {
    Error { message: String },
    About,
    Preferences,
    FileChooser(FileChooser),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChooserMode {
    Open,
    Export,
}

impl ChooserMode {
    pub const fn title(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::Export => "Export HTML",
        }
    }
}

/// A path prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChooser {
    mode: ChooserMode,
    input: String,
    /// Cursor position in chars
    cursor: usize,
}

impl FileChooser {
    /// Prompt for files to open, starting at the current file or `cwd`.
    pub fn open(current: Option<&Path>, cwd: &Path) -> Self {
        let input = current.map_or_else(|| dir_prefix(cwd), |p| p.display().to_string());
        Self::with_input(ChooserMode::Open, input)
    }

    /// Prompt for an export target next to the current file, named after it.
    pub fn export(current: Option<&Path>, cwd: &Path) -> Self {
        let input = match current {
            Some(path) => {
                let dir = path.parent().unwrap_or(cwd);
                let stem = path
                    .file_stem()
                    .map_or_else(String::new, |s| s.to_string_lossy().into_owned());
                dir.join(format!("{stem}.html")).display().to_string()
            }
            None => dir_prefix(cwd),
        };
        Self::with_input(ChooserMode::Export, input)
    }

    fn with_input(mode: ChooserMode, input: String) -> Self {
        let cursor = input.chars().count();
        Self {
            mode,
            input,
            cursor,
        }
    }

    pub const fn mode(&self) -> ChooserMode {
        self.mode
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    fn byte_index(&self, cursor: usize) -> usize {
        self.input
            .char_indices()
            .nth(cursor)
            .map_or(self.input.len(), |(i, _)| i)
    }

    pub fn insert_char(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.input.insert(at, c);
        self.cursor += 1;
    }

    pub fn insert_str(&mut self, text: &str) {
        for c in text.chars().filter(|c| *c != '\n' && *c != '\r') {
            self.insert_char(c);
        }
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_index(self.cursor);
        self.input.remove(at);
    }

    pub fn delete(&mut self) {
        if self.cursor < self.input.chars().count() {
            let at = self.byte_index(self.cursor);
            self.input.remove(at);
        }
    }

    pub const fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.input.chars().count());
    }

    pub const fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.input.chars().count();
    }

    pub fn clear(&mut self) {
        self.input.clear();
        self.cursor = 0;
    }

    /// Paths named by the input. Several paths may be given, separated by
    /// whitespace and quoted where they contain spaces.
    pub fn selected_paths(&self) -> Vec<PathBuf> {
        crate::uri::paths_from_drop(&self.input)
    }

    /// The export target. A name without an extension gets `.html`.
    pub fn export_path(&self) -> Option<PathBuf> {
        let trimmed = self.input.trim();
        if trimmed.is_empty() || trimmed.ends_with(std::path::MAIN_SEPARATOR) {
            return None;
        }
        let mut path = PathBuf::from(trimmed);
        if path.extension().is_none() {
            path.set_extension("html");
        }
        Some(path)
    }
}

fn dir_prefix(dir: &Path) -> String {
    let mut text = dir.display().to_string();
    if !text.ends_with(std::path::MAIN_SEPARATOR) {
        text.push(std::path::MAIN_SEPARATOR);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_prefills_current_file() {
        let chooser = FileChooser::open(Some(Path::new("/docs/readme.md")), Path::new("/work"));
        assert_eq!(chooser.input(), "/docs/readme.md");
        assert_eq!(chooser.cursor(), chooser.input().chars().count());
    }

    #[test]
    fn test_open_without_file_starts_in_cwd() {
        let chooser = FileChooser::open(None, Path::new("/work"));
        assert_eq!(chooser.input(), "/work/");
        assert!(chooser.selected_paths().iter().all(|p| p == Path::new("/work/")));
    }

    #[test]
    fn test_open_accepts_several_paths() {
        let mut chooser = FileChooser::open(None, Path::new("/work"));
        chooser.clear();
        chooser.insert_str("a.md 'b c.md'");
        assert_eq!(
            chooser.selected_paths(),
            vec![PathBuf::from("a.md"), PathBuf::from("b c.md")]
        );
    }

    #[test]
    fn test_export_suggests_html_name() {
        let chooser = FileChooser::export(Some(Path::new("/docs/notes.md")), Path::new("/work"));
        assert_eq!(chooser.input(), "/docs/notes.html");
        assert_eq!(chooser.export_path(), Some(PathBuf::from("/docs/notes.html")));
    }

    #[test]
    fn test_export_appends_extension() {
        let mut chooser = FileChooser::export(None, Path::new("/work"));
        assert_eq!(chooser.export_path(), None);
        chooser.insert_str("out");
        assert_eq!(chooser.export_path(), Some(PathBuf::from("/work/out.html")));
        chooser.clear();
        chooser.insert_str("page.htm");
        assert_eq!(chooser.export_path(), Some(PathBuf::from("page.htm")));
    }

    #[test]
    fn test_editing_moves_cursor() {
        let mut chooser = FileChooser::open(None, Path::new("/w"));
        chooser.move_home();
        chooser.insert_char('x');
        assert_eq!(chooser.input(), "x/w/");
        chooser.move_end();
        chooser.backspace();
        assert_eq!(chooser.input(), "x/w");
        chooser.move_home();
        chooser.delete();
        assert_eq!(chooser.input(), "/w");
        chooser.move_left();
        chooser.move_right();
        assert_eq!(chooser.cursor(), 1);
    }

    #[test]
    fn test_about_text() {
        assert_eq!(PROGRAM_NAME, "mdview");
        assert!(description().starts_with("mdview is"));
        assert!(COPYRIGHT.contains("2013"));
    }
}
