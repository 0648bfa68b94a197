//! Markdown to HTML conversion with comrak.
//!
//! The converter is configured from a merged [`OptionMap`]; keys missing
//! from the map fall back to the converter defaults.

use std::panic::{self, AssertUnwindSafe};
use std::sync::LazyLock;

use comrak::{Options, markdown_to_html};
use regex::Regex;
use thiserror::Error;

use crate::options::{OptionKey, OptionMap, OutputFormat, SafeMode};

/// Text substituted for raw HTML in [`SafeMode::Replace`].
pub const DEFAULT_REPLACEMENT_TEXT: &str = "[HTML_REMOVED]";

/// Marker comrak emits in place of raw HTML when unsafe output is off.
const RAW_HTML_OMITTED: &str = "<!-- raw HTML omitted -->";

static SELF_CLOSING_VOID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(br|hr|img|input|col|area|wbr)\b([^<>]*?)\s*/>").expect("valid regex")
});

static ORDERED_LIST_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<ol start="\d+">"#).expect("valid regex"));

#[derive(Debug, Error)]
#[error("markdown conversion failed: {message}")]
pub struct ConvertError {
    message: String,
}

/// Typed converter settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterConfig {
    pub output_format: OutputFormat,
    pub safe_mode: SafeMode,
    pub html_replacement_text: String,
    pub tab_length: usize,
    pub enable_attributes: bool,
    pub smart_emphasis: bool,
    pub lazy_ol: bool,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::Xhtml1,
            safe_mode: SafeMode::Off,
            html_replacement_text: DEFAULT_REPLACEMENT_TEXT.to_string(),
            tab_length: 4,
            enable_attributes: true,
            smart_emphasis: true,
            lazy_ol: true,
        }
    }
}

impl ConverterConfig {
    pub fn from_map(map: &OptionMap) -> Self {
        let defaults = Self::default();
        let flag = |key: OptionKey, default: bool| {
            map.get(&key)
                .and_then(crate::options::OptionValue::as_bool)
                .unwrap_or(default)
        };
        Self {
            output_format: map
                .get(&OptionKey::OutputFormat)
                .and_then(OutputFormat::from_value)
                .unwrap_or(defaults.output_format),
            safe_mode: map
                .get(&OptionKey::SafeMode)
                .and_then(SafeMode::from_value)
                .unwrap_or(defaults.safe_mode),
            html_replacement_text: map
                .get(&OptionKey::HtmlReplacementText)
                .and_then(|v| v.as_text())
                .filter(|s| !s.is_empty())
                .map_or(defaults.html_replacement_text, ToOwned::to_owned),
            tab_length: map
                .get(&OptionKey::TabLength)
                .and_then(crate::options::OptionValue::as_int)
                .and_then(|n| usize::try_from(n).ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.tab_length),
            enable_attributes: flag(OptionKey::EnableAttributes, defaults.enable_attributes),
            smart_emphasis: flag(OptionKey::SmartEmphasis, defaults.smart_emphasis),
            lazy_ol: flag(OptionKey::LazyOl, defaults.lazy_ol),
        }
    }
}

/// Converts Markdown source to an HTML fragment.
///
/// Every call parses into a fresh arena, so nothing carries over between
/// documents.
#[derive(Debug, Clone, Default)]
pub struct MarkdownConverter {
    config: ConverterConfig,
}

impl MarkdownConverter {
    pub const fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    pub fn from_options(map: &OptionMap) -> Self {
        Self::new(ConverterConfig::from_map(map))
    }

    pub const fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Convert `source` to HTML.
    ///
    /// # Errors
    /// Returns an error if the underlying converter panics on the input.
    pub fn convert(&self, source: &str) -> Result<String, ConvertError> {
        let source = expand_tabs(source, self.config.tab_length);
        let options = self.comrak_options();
        let html = panic::catch_unwind(AssertUnwindSafe(|| markdown_to_html(&source, &options)))
            .map_err(|payload| ConvertError {
                message: panic_message(payload.as_ref()),
            })?;
        Ok(self.post_process(html))
    }

    fn comrak_options(&self) -> Options {
        let mut options = Options::default();

        options.extension.strikethrough = true;
        options.extension.table = true;
        options.extension.autolink = true;
        options.extension.tasklist = true;
        options.extension.footnotes = true;
        options.extension.description_lists = true;
        if self.config.enable_attributes {
            options.extension.header_ids = Some(String::new());
        }

        options.parse.smart = self.config.smart_emphasis;

        match self.config.safe_mode {
            SafeMode::Off => options.render.unsafe_ = true,
            SafeMode::Escape => options.render.escape = true,
            SafeMode::Replace | SafeMode::Remove => {}
        }

        options
    }

    fn post_process(&self, mut html: String) -> String {
        match self.config.safe_mode {
            SafeMode::Replace => {
                html = html.replace(
                    RAW_HTML_OMITTED,
                    &escape_html(&self.config.html_replacement_text),
                );
            }
            SafeMode::Remove => {
                html = html.replace(&format!("{RAW_HTML_OMITTED}\n"), "");
                html = html.replace(RAW_HTML_OMITTED, "");
            }
            SafeMode::Off | SafeMode::Escape => {}
        }
        if !self.config.output_format.is_xhtml() {
            html = SELF_CLOSING_VOID.replace_all(&html, "<$1$2>").into_owned();
        }
        if self.config.lazy_ol {
            html = ORDERED_LIST_START.replace_all(&html, "<ol>").into_owned();
        }
        html
    }
}

/// Expand tabs to spaces using tab stops every `tab_length` columns.
pub fn expand_tabs(source: &str, tab_length: usize) -> String {
    if !source.contains('\t') {
        return source.to_string();
    }
    let tab_length = tab_length.max(1);
    let mut out = String::with_capacity(source.len() + 16);
    let mut column = 0;
    for ch in source.chars() {
        match ch {
            '\t' => {
                let pad = tab_length - column % tab_length;
                out.extend(std::iter::repeat_n(' ', pad));
                column += pad;
            }
            '\n' => {
                out.push(ch);
                column = 0;
            }
            _ => {
                out.push(ch);
                column += 1;
            }
        }
    }
    out
}

/// Escape `text` for use as HTML content.
pub fn escape_html(text: &str) -> String {
    let mut out = Vec::with_capacity(text.len());
    match comrak::html::escape(&mut out, text.as_bytes()) {
        Ok(()) => String::from_utf8_lossy(&out).into_owned(),
        Err(err) => {
            tracing::warn!(error = %err, "escaping replacement text failed");
            DEFAULT_REPLACEMENT_TEXT.to_string()
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "converter panicked".to_string()
    }
}
