//! Rendered line types.

use std::ops::Range;

use unicode_width::UnicodeWidthStr;

/// A single rendered line with styling information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    /// The text content of the line
    content: String,
    /// The type of line (for styling)
    line_type: LineType,
    /// Inline-styled spans; empty means the content is unstyled
    spans: Vec<InlineSpan>,
    /// Link targets by display column
    links: Vec<LinkSpan>,
}

impl RenderedLine {
    pub const fn new(content: String, line_type: LineType) -> Self {
        Self {
            content,
            line_type,
            spans: Vec::new(),
            links: Vec::new(),
        }
    }

    /// Build a line from spans, deriving content and link columns.
    pub fn from_spans(line_type: LineType, spans: Vec<InlineSpan>) -> Self {
        let mut content = String::new();
        let mut links: Vec<LinkSpan> = Vec::new();
        let mut column = 0usize;
        for span in &spans {
            let len = span.text().width();
            if let Some(href) = span.href() {
                match links.last_mut() {
                    Some(last) if last.columns.end == column && last.href == href => {
                        last.columns.end += len;
                    }
                    _ => links.push(LinkSpan {
                        columns: column..column + len,
                        href: href.to_string(),
                    }),
                }
            }
            content.push_str(span.text());
            column += len;
        }
        Self {
            content,
            line_type,
            spans,
            links,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub const fn line_type(&self) -> &LineType {
        &self.line_type
    }

    /// Get inline spans, if present.
    pub fn spans(&self) -> Option<&[InlineSpan]> {
        if self.spans.is_empty() {
            None
        } else {
            Some(&self.spans)
        }
    }

    pub fn links(&self) -> &[LinkSpan] {
        &self.links
    }

    /// Link target under display column `column`.
    pub fn link_at(&self, column: usize) -> Option<&str> {
        self.links
            .iter()
            .find(|link| link.columns.contains(&column))
            .map(|link| link.href.as_str())
    }
}

/// A link target covering a range of display columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSpan {
    pub columns: Range<usize>,
    pub href: String,
}

/// Inline style flags for a text span.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InlineStyle {
    pub emphasis: bool,
    pub strong: bool,
    pub code: bool,
    pub strikethrough: bool,
    pub link: bool,
    pub markup: Option<Markup>,
}

/// Token classes used when showing HTML source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Markup {
    Tag,
    Attribute,
    Value,
    Comment,
}

/// A styled inline span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineSpan {
    text: String,
    style: InlineStyle,
    href: Option<String>,
}

impl InlineSpan {
    pub const fn new(text: String, style: InlineStyle) -> Self {
        Self {
            text,
            style,
            href: None,
        }
    }

    pub const fn link(text: String, style: InlineStyle, href: String) -> Self {
        Self {
            text,
            style,
            href: Some(href),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub const fn style(&self) -> InlineStyle {
        self.style
    }

    pub fn href(&self) -> Option<&str> {
        self.href.as_deref()
    }

    /// Same style and link target, different text.
    #[must_use]
    pub fn with_text(&self, text: String) -> Self {
        Self {
            text,
            style: self.style,
            href: self.href.clone(),
        }
    }
}

/// Type of a rendered line, used for styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineType {
    /// Normal paragraph text
    Paragraph,
    /// Heading with level (1-6)
    Heading(u8),
    /// Preformatted block line
    CodeBlock,
    /// Block quote line
    BlockQuote,
    /// List item with nesting level
    ListItem(usize),
    /// Table row
    Table,
    /// Horizontal rule
    HorizontalRule,
    /// Line of HTML source
    Source,
    /// Empty line
    Empty,
}
