//! Terminal UI components.
//!
//! - [`style`]: Theming and colors
//! - `menubar`: Menu titles and dropdowns
//! - `overlays`: Modal dialogs
//! - `status`: Status, link and notification bars

pub mod style;

mod menubar;
mod overlays;
mod render;
mod status;

pub use menubar::{dropdown_rect, menu_title_at};
pub use render::render;
