//! Theming and color definitions.
//!
//! This module defines the visual styling for rendered HTML elements and
//! for the window chrome (menu bar, status bar, dialogs).
//! Uses ANSI colors that adapt to the terminal's color palette.

use std::sync::OnceLock;

use ratatui::style::{Color, Modifier, Style};

use crate::view::{InlineStyle, LineType, Markup};

static LIGHT_BACKGROUND: OnceLock<bool> = OnceLock::new();

/// Whether the terminal reports a light background through `COLORFGBG`.
pub fn is_light_background() -> bool {
    *LIGHT_BACKGROUND
        .get_or_init(|| light_from_colorfgbg(std::env::var("COLORFGBG").ok().as_deref()))
}

fn light_from_colorfgbg(colorfgbg: Option<&str>) -> bool {
    let Some(value) = colorfgbg else {
        return false;
    };
    let bg = value.rsplit(';').next().unwrap_or(value);
    bg.parse::<u8>().is_ok_and(|bg| bg >= 7)
}

/// Get the style for a given line type.
///
/// Uses semantic ANSI colors that respect the terminal's theme.
pub fn style_for_line_type(line_type: &LineType) -> Style {
    let light_bg = is_light_background();
    match line_type {
        // Headings - bold with distinct colors per level
        LineType::Heading(1) => Style::default()
            .fg(if light_bg {
                Color::Indexed(24)
            } else {
                Color::Cyan
            })
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        LineType::Heading(2) => Style::default()
            .fg(if light_bg {
                Color::Indexed(22)
            } else {
                Color::Green
            })
            .add_modifier(Modifier::BOLD),
        LineType::Heading(3) => Style::default()
            .fg(if light_bg {
                Color::Indexed(58)
            } else {
                Color::Yellow
            })
            .add_modifier(Modifier::BOLD),
        LineType::Heading(4) => Style::default()
            .fg(if light_bg {
                Color::Indexed(24)
            } else {
                Color::Blue
            })
            .add_modifier(Modifier::BOLD),
        LineType::Heading(5) => Style::default()
            .fg(if light_bg {
                Color::Indexed(54)
            } else {
                Color::Magenta
            })
            .add_modifier(Modifier::BOLD),
        LineType::Heading(_) => Style::default()
            .fg(if light_bg {
                Color::Indexed(24)
            } else {
                Color::Cyan
            })
            .add_modifier(Modifier::BOLD),

        LineType::CodeBlock => Style::default().fg(if light_bg {
            Color::Indexed(238)
        } else {
            Color::Indexed(245)
        }),

        LineType::BlockQuote => Style::default()
            .fg(if light_bg {
                Color::Indexed(24)
            } else {
                Color::Blue
            })
            .add_modifier(Modifier::ITALIC),

        LineType::HorizontalRule => Style::default()
            .fg(if light_bg {
                Color::Indexed(241)
            } else {
                Color::Indexed(240)
            })
            .add_modifier(Modifier::DIM),

        LineType::Table => Style::default().fg(if light_bg {
            Color::Indexed(236)
        } else {
            Color::Indexed(252)
        }),

        // Source text is coloured per token by style_for_inline
        LineType::Source | LineType::ListItem(_) | LineType::Paragraph | LineType::Empty => {
            Style::default()
        }
    }
}

/// Get the style for an inline span, merged with a base line style.
pub fn style_for_inline(base: Style, inline: InlineStyle) -> Style {
    let light_bg = is_light_background();
    let mut style = base;

    if let Some(markup) = inline.markup {
        return style.patch(style_for_markup(markup, light_bg));
    }

    if inline.emphasis {
        style = style.add_modifier(Modifier::ITALIC);
    }
    if inline.strong {
        style = style.add_modifier(Modifier::BOLD);
    }
    if inline.strikethrough {
        style = style.add_modifier(Modifier::CROSSED_OUT);
    }
    if inline.link {
        style = style.add_modifier(Modifier::UNDERLINED).fg(if light_bg {
            Color::Blue
        } else {
            Color::LightBlue
        });
    }
    if inline.code {
        style = style
            .fg(if light_bg {
                Color::Indexed(88)
            } else {
                Color::Red
            })
            .add_modifier(Modifier::BOLD);
    }

    style
}

fn style_for_markup(markup: Markup, light_bg: bool) -> Style {
    match markup {
        Markup::Tag => Style::default().fg(if light_bg {
            Color::Indexed(90)
        } else {
            Color::Magenta
        }),
        Markup::Attribute => Style::default().fg(if light_bg {
            Color::Indexed(58)
        } else {
            Color::Yellow
        }),
        Markup::Value => Style::default().fg(if light_bg {
            Color::Indexed(22)
        } else {
            Color::Green
        }),
        Markup::Comment => Style::default()
            .fg(Color::Indexed(244))
            .add_modifier(Modifier::ITALIC),
    }
}

/// Colors for the window chrome around the document.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Menu bar and dropdown background
    pub menu_bg: Color,
    /// Menu bar and dropdown foreground
    pub menu_fg: Color,
    /// Highlighted menu entry
    pub menu_selected: Style,
    /// Insensitive menu entry
    pub menu_disabled: Style,
    /// Accelerator hint next to a menu entry
    pub menu_accel: Style,
    /// Status bar background
    pub status_bg: Color,
    /// Status bar foreground
    pub status_fg: Color,
    /// Link URI bar
    pub link_bar: Style,
    /// Dialog body
    pub dialog: Style,
    /// Dialog title and section headings
    pub dialog_title: Style,
    /// Error dialog border
    pub error_border: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            menu_bg: Color::Indexed(236),
            menu_fg: Color::Indexed(252),
            menu_selected: Style::default().fg(Color::Black).bg(Color::Cyan),
            menu_disabled: Style::default().fg(Color::Indexed(242)),
            menu_accel: Style::default().fg(Color::Indexed(245)),
            status_bg: Color::Indexed(236), // Dark gray that works on both
            status_fg: Color::Indexed(252), // Light gray
            link_bar: Style::default().bg(Color::Blue).fg(Color::White),
            dialog: Style::default().bg(Color::Black).fg(Color::White),
            dialog_title: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            error_border: Style::default().fg(Color::Red),
        }
    }
}

impl Theme {
    /// Create a theme optimized for dark terminals.
    pub fn dark() -> Self {
        Self::default()
    }

    /// Create a theme optimized for light terminals.
    pub fn light() -> Self {
        Self {
            menu_bg: Color::Indexed(252),
            menu_fg: Color::Indexed(235),
            menu_selected: Style::default().fg(Color::White).bg(Color::Indexed(25)),
            menu_disabled: Style::default().fg(Color::Indexed(246)),
            menu_accel: Style::default().fg(Color::Indexed(241)),
            status_bg: Color::Indexed(252),
            status_fg: Color::Indexed(235),
            link_bar: Style::default().bg(Color::Indexed(25)).fg(Color::White),
            dialog: Style::default().bg(Color::Indexed(255)).fg(Color::Black),
            dialog_title: Style::default()
                .fg(Color::Indexed(25))
                .add_modifier(Modifier::BOLD),
            error_border: Style::default().fg(Color::Indexed(124)),
        }
    }

    /// Pick the dark or light theme for the current terminal.
    pub fn detect() -> Self {
        if is_light_background() {
            Self::light()
        } else {
            Self::dark()
        }
    }

    pub fn menu_bar(&self) -> Style {
        Style::default().bg(self.menu_bg).fg(self.menu_fg)
    }

    pub fn status_bar(&self) -> Style {
        Style::default().bg(self.status_bg).fg(self.status_fg)
    }
}
