//! Application state and main event loop.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: Pure function for state transitions
//! - [`App::run`]: Main event loop with rendering
//!
//! Document operations (load, reload, export, opening several files) live
//! on [`Model`] and return [`ViewerError`]; [`Model::report`] is where
//! those errors become error dialogs.

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use model::{DOCUMENT_LEFT_PADDING, Model, ToastLevel, ViewerError, window_title};
pub use update::{Message, update};

use std::path::PathBuf;

/// Main application struct that owns the terminal and runs the event loop.
pub struct App {
    files: Vec<PathBuf>,
    settings_path: Option<PathBuf>,
    working_dir: Option<PathBuf>,
}

impl App {
    /// Create a new application that opens `files` on start.
    pub const fn new(files: Vec<PathBuf>) -> Self {
        Self {
            files,
            settings_path: None,
            working_dir: None,
        }
    }

    /// Persist preferences in this file. `None` keeps them in memory only.
    pub fn with_settings_path(mut self, path: Option<PathBuf>) -> Self {
        self.settings_path = path;
        self
    }

    /// Directory the file chooser starts in when no file is shown.
    pub fn with_working_dir(mut self, dir: PathBuf) -> Self {
        self.working_dir = Some(dir);
        self
    }
}

#[cfg(test)]
mod tests;
