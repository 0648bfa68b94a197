// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. view::ViewportState)
    clippy::module_name_repetitions
)]

//! # mdview
//!
//! A simple viewer for Markdown files.
//!
//! mdview converts a Markdown file to HTML and shows the result in the
//! terminal:
//! - Live reload when the file changes on disk, keeping the reading position
//! - Per-document Markdown options from the menu, saved defaults in preferences
//! - Export of the converted HTML
//! - Opening several files at once, one window per file
//!
//! ## Architecture
//!
//! mdview uses The Elm Architecture (TEA) pattern:
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions
//! - **View**: Render to terminal
//!
//! ## Modules
//!
//! - [`app`]: Main application loop and state
//! - [`convert`]: Markdown to HTML conversion
//! - [`options`]: Option schema and layered option values
//! - [`config`]: Persisted preference settings
//! - [`view`]: HTML layout and scrolling
//! - [`menu`]: Actions, accelerators and the menu bar model
//! - [`dialogs`]: Modal dialogs and preferences
//! - [`ui`]: Terminal UI components
//! - [`watcher`]: File watching
//! - [`spawn`]: Opening files in new windows
//! - [`uri`]: Dropped paths and `file://` URIs

pub mod app;
pub mod config;
pub mod convert;
pub mod dialogs;
pub mod menu;
pub mod options;
pub mod spawn;
pub mod ui;
pub mod uri;
pub mod view;
pub mod watcher;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model};
    pub use crate::convert::MarkdownConverter;
    pub use crate::view::{BrowserView, Viewport};
}
