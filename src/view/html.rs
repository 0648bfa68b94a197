//! HTML layout for the terminal.
//!
//! Parses the HTML produced by the converter with html5ever and lays the
//! document tree out as wrapped, styled lines. Only the structural subset a
//! Markdown converter emits is styled: unknown elements are transparent and
//! their text is kept. Content of script, style and plugin elements is never
//! shown.

use std::sync::LazyLock;

use html5ever::tendril::TendrilSink;
use html5ever::{ParseOpts, parse_document};
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use regex::Regex;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::types::{InlineSpan, InlineStyle, LineType, Markup, RenderedLine};

/// Elements whose content is dropped entirely.
const SKIPPED_ELEMENTS: &[&str] = &[
    "script", "style", "head", "title", "object", "applet", "iframe", "noscript", "template",
];

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

const BLOCK_ELEMENTS: &[&str] = &[
    "div", "dl", "dt", "dd", "section", "article", "header", "footer", "main", "nav", "aside",
    "figure", "figcaption", "details", "summary", "address", "center", "caption",
];

const BULLETS: &[&str] = &["• ", "◦ ", "▪ "];

// Source view colouring only; the document itself goes through html5ever.
static MARKUP_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!--.*?(?:-->|$)|<[^>]*>?").expect("valid regex"));

static ATTRIBUTE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)(\s*=\s*)("[^"]*"?|'[^']*'?|[^\s>"']+)"#)
        .expect("valid regex")
});

/// Lay out `html` as styled lines wrapped at `width` columns.
pub fn layout(html: &str, width: usize) -> Vec<RenderedLine> {
    let dom = parse_document(RcDom::default(), ParseOpts::default()).one(html);
    let mut layout = Layout::new(width.max(1));
    walk(&dom.document, &mut layout);
    layout.finish()
}

fn walk(handle: &Handle, layout: &mut Layout) {
    match &handle.data {
        NodeData::Document => walk_children(handle, layout),
        NodeData::Element { name, attrs, .. } => {
            let tag: &str = &name.local;
            if SKIPPED_ELEMENTS.contains(&tag) {
                return;
            }
            let attrs: Vec<(String, String)> = attrs
                .borrow()
                .iter()
                .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                .collect();
            layout.open(tag, &attrs);
            if !VOID_ELEMENTS.contains(&tag) {
                walk_children(handle, layout);
                layout.close(tag);
            }
        }
        NodeData::Text { contents } => layout.text(&contents.borrow()),
        _ => {}
    }
}

fn walk_children(handle: &Handle, layout: &mut Layout) {
    for child in handle.children.borrow().iter() {
        walk(child, layout);
    }
}

/// Show `html` as source, one entry per input line, hard-wrapped at `width`.
pub fn source_lines(html: &str, width: usize) -> Vec<RenderedLine> {
    let width = width.max(1);
    let mut lines = Vec::new();
    for raw in html.lines() {
        let raw = raw.replace('\t', "    ");
        let spans = highlight_markup(&raw);
        for chunk in hard_wrap(&spans, width) {
            lines.push(RenderedLine::from_spans(LineType::Source, chunk));
        }
    }
    lines
}

fn attr<'a>(attrs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

#[derive(Debug)]
struct ListState {
    ordered: bool,
    next: u64,
    marker_width: usize,
}

#[derive(Debug, Default)]
struct Row {
    cells: Vec<String>,
    header: bool,
}

#[derive(Debug, Default)]
struct TableState {
    rows: Vec<Row>,
    cell: Option<String>,
}

impl TableState {
    fn finish_cell(&mut self) {
        if let Some(cell) = self.cell.take() {
            if self.rows.is_empty() {
                self.rows.push(Row::default());
            }
            if let Some(row) = self.rows.last_mut() {
                row.cells.push(cell.trim().to_string());
            }
        }
    }
}

struct Layout {
    width: usize,
    lines: Vec<RenderedLine>,
    inline: Vec<InlineSpan>,
    emphasis: usize,
    strong: usize,
    code: usize,
    strike: usize,
    href: Option<String>,
    pre: usize,
    quote_depth: usize,
    lists: Vec<ListState>,
    marker: Option<String>,
    heading: Option<u8>,
    table: Option<TableState>,
}

impl Layout {
    const fn new(width: usize) -> Self {
        Self {
            width,
            lines: Vec::new(),
            inline: Vec::new(),
            emphasis: 0,
            strong: 0,
            code: 0,
            strike: 0,
            href: None,
            pre: 0,
            quote_depth: 0,
            lists: Vec::new(),
            marker: None,
            heading: None,
            table: None,
        }
    }

    fn finish(mut self) -> Vec<RenderedLine> {
        if self.pre > 0 && !self.inline.is_empty() {
            self.flush_pre_line();
        }
        if let Some(table) = self.table.take() {
            self.emit_table(table);
        }
        self.flush();
        while self
            .lines
            .last()
            .is_some_and(|line| *line.line_type() == LineType::Empty)
        {
            self.lines.pop();
        }
        self.lines
    }

    const fn style(&self) -> InlineStyle {
        InlineStyle {
            emphasis: self.emphasis > 0,
            strong: self.strong > 0,
            code: self.code > 0,
            strikethrough: self.strike > 0,
            link: self.href.is_some(),
            markup: None,
        }
    }

    fn push_span(&mut self, text: &str, style: InlineStyle) {
        let span = match &self.href {
            Some(href) => InlineSpan::link(text.to_string(), style, href.clone()),
            None => InlineSpan::new(text.to_string(), style),
        };
        self.inline.push(span);
    }

    fn table_cell(&mut self) -> Option<&mut String> {
        self.table.as_mut().and_then(|table| table.cell.as_mut())
    }

    fn text(&mut self, text: &str) {
        if self.table.is_some() {
            let collapsed = collapse_whitespace(text);
            if let Some(cell) = self.table_cell() {
                cell.push_str(&collapsed);
            }
            return;
        }
        if self.pre > 0 {
            let text = text.replace('\t', "    ");
            let style = self.style();
            let mut parts = text.split('\n');
            if let Some(first) = parts.next().filter(|part| !part.is_empty()) {
                self.push_span(first, style);
            }
            for part in parts {
                self.flush_pre_line();
                if !part.is_empty() {
                    self.push_span(part, style);
                }
            }
            return;
        }

        let collapsed = collapse_whitespace(text);
        let at_line_start = self
            .inline
            .last()
            .is_none_or(|span| span.text().ends_with(' '));
        let collapsed = if at_line_start {
            collapsed.trim_start()
        } else {
            collapsed.as_str()
        };
        if !collapsed.is_empty() {
            self.push_span(collapsed, self.style());
        }
    }

    fn inline_label(&mut self, label: &str, style: InlineStyle) {
        if let Some(cell) = self.table_cell() {
            cell.push_str(label);
        } else if self.table.is_none() {
            self.push_span(label, style);
        }
    }

    fn open(&mut self, name: &str, attrs: &[(String, String)]) {
        match name {
            "p" => self.flush(),
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                self.flush();
                self.heading = name[1..].parse().ok();
            }
            "em" | "i" | "cite" | "dfn" | "var" => self.emphasis += 1,
            "strong" | "b" => self.strong += 1,
            "code" | "kbd" | "samp" | "tt" => self.code += 1,
            "del" | "s" | "strike" => self.strike += 1,
            "a" => self.href = attr(attrs, "href").map(str::to_string),
            "img" => {
                let label = match attr(attrs, "alt").filter(|alt| !alt.is_empty()) {
                    Some(alt) => format!("[image: {alt}]"),
                    None => "[image]".to_string(),
                };
                let style = InlineStyle {
                    emphasis: true,
                    ..self.style()
                };
                self.inline_label(&label, style);
            }
            "input" => {
                if attr(attrs, "type").is_some_and(|kind| kind.eq_ignore_ascii_case("checkbox")) {
                    let label = if attr(attrs, "checked").is_some() {
                        "[x] "
                    } else {
                        "[ ] "
                    };
                    self.inline_label(label, self.style());
                }
            }
            "br" => self.line_break(),
            "hr" => {
                self.flush();
                let (prefix, _) = self.prefixes();
                let rule = "─".repeat(self.width.saturating_sub(prefix.width()).max(1));
                self.lines.push(RenderedLine::new(
                    format!("{prefix}{rule}"),
                    LineType::HorizontalRule,
                ));
                self.ensure_blank();
            }
            "ul" | "ol" => {
                self.flush();
                let next = attr(attrs, "start")
                    .and_then(|start| start.trim().parse().ok())
                    .unwrap_or(1);
                self.lists.push(ListState {
                    ordered: name == "ol",
                    next,
                    marker_width: 0,
                });
            }
            "li" => {
                self.flush();
                let depth = self.lists.len().saturating_sub(1);
                if let Some(list) = self.lists.last_mut() {
                    let marker = if list.ordered {
                        let marker = format!("{}. ", list.next);
                        list.next += 1;
                        marker
                    } else {
                        BULLETS[depth % BULLETS.len()].to_string()
                    };
                    list.marker_width = marker.width();
                    self.marker = Some(marker);
                }
            }
            "blockquote" => {
                self.flush();
                self.quote_depth += 1;
            }
            "pre" => {
                self.flush();
                self.pre += 1;
            }
            "table" => {
                self.flush();
                self.table = Some(TableState::default());
            }
            "tr" => {
                if let Some(table) = &mut self.table {
                    table.finish_cell();
                    table.rows.push(Row::default());
                }
            }
            "td" | "th" => {
                if let Some(table) = &mut self.table {
                    table.finish_cell();
                    if table.rows.is_empty() {
                        table.rows.push(Row::default());
                    }
                    if name == "th"
                        && let Some(row) = table.rows.last_mut()
                    {
                        row.header = true;
                    }
                    table.cell = Some(String::new());
                }
            }
            _ if BLOCK_ELEMENTS.contains(&name) => self.flush(),
            _ => {}
        }
    }

    fn close(&mut self, name: &str) {
        match name {
            "p" => {
                self.flush();
                if self.lists.is_empty() && self.table.is_none() {
                    self.ensure_blank();
                }
            }
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                self.flush();
                self.heading = None;
                self.ensure_blank();
            }
            "em" | "i" | "cite" | "dfn" | "var" => self.emphasis = self.emphasis.saturating_sub(1),
            "strong" | "b" => self.strong = self.strong.saturating_sub(1),
            "code" | "kbd" | "samp" | "tt" => self.code = self.code.saturating_sub(1),
            "del" | "s" | "strike" => self.strike = self.strike.saturating_sub(1),
            "a" => self.href = None,
            "li" => self.flush(),
            "ul" | "ol" => {
                self.flush();
                self.lists.pop();
                self.marker = None;
                if self.lists.is_empty() {
                    self.ensure_blank();
                }
            }
            "blockquote" => {
                self.flush();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.ensure_blank();
            }
            "pre" => {
                if !self.inline.is_empty() {
                    self.flush_pre_line();
                }
                self.pre = self.pre.saturating_sub(1);
                if self.lists.is_empty() {
                    self.ensure_blank();
                }
            }
            "td" | "th" => {
                if let Some(table) = &mut self.table {
                    table.finish_cell();
                }
            }
            "table" => {
                if let Some(table) = self.table.take() {
                    self.emit_table(table);
                    self.ensure_blank();
                }
            }
            _ if BLOCK_ELEMENTS.contains(&name) => self.flush(),
            _ => {}
        }
    }

    fn line_type(&self) -> LineType {
        if let Some(level) = self.heading {
            LineType::Heading(level)
        } else if self.pre > 0 {
            LineType::CodeBlock
        } else if !self.lists.is_empty() {
            LineType::ListItem(self.lists.len() - 1)
        } else if self.quote_depth > 0 {
            LineType::BlockQuote
        } else {
            LineType::Paragraph
        }
    }

    /// Prefixes for the first and following lines of the next block.
    /// Consumes a pending list marker.
    fn prefixes(&mut self) -> (String, String) {
        let quote = "│ ".repeat(self.quote_depth);
        let indent: usize = self.lists.iter().map(|list| list.marker_width).sum();
        let next = format!("{quote}{}", " ".repeat(indent));
        let first = match self.marker.take() {
            Some(marker) => {
                let outer = indent.saturating_sub(marker.width());
                format!("{quote}{}{marker}", " ".repeat(outer))
            }
            None => next.clone(),
        };
        (first, next)
    }

    fn flush(&mut self) {
        if self
            .inline
            .iter()
            .all(|span| span.text().chars().all(|c| c.is_ascii_whitespace()))
        {
            self.inline.clear();
            return;
        }
        let spans = std::mem::take(&mut self.inline);
        let line_type = self.line_type();
        let (first, next) = self.prefixes();
        for line in wrap_spans(&spans, self.width, &first, &next) {
            self.lines.push(RenderedLine::from_spans(line_type, line));
        }
    }

    fn line_break(&mut self) {
        if self.pre > 0 {
            self.flush_pre_line();
        } else {
            self.flush();
        }
    }

    fn flush_pre_line(&mut self) {
        let spans = std::mem::take(&mut self.inline);
        let (first, _) = self.prefixes();
        let mut line = vec![InlineSpan::new(format!("{first}  "), InlineStyle::default())];
        line.extend(spans);
        self.lines
            .push(RenderedLine::from_spans(LineType::CodeBlock, line));
    }

    fn ensure_blank(&mut self) {
        let Some(last) = self.lines.last() else {
            return;
        };
        if last.content().chars().all(|c| c == '│' || c == ' ') {
            return;
        }
        if self.quote_depth > 0 {
            let bars = "│ ".repeat(self.quote_depth);
            self.lines.push(RenderedLine::new(
                bars.trim_end().to_string(),
                LineType::BlockQuote,
            ));
        } else {
            self.lines
                .push(RenderedLine::new(String::new(), LineType::Empty));
        }
    }

    fn emit_table(&mut self, mut table: TableState) {
        table.finish_cell();
        let rows: Vec<Row> = table
            .rows
            .into_iter()
            .filter(|row| !row.cells.is_empty())
            .collect();
        let columns = rows.iter().map(|row| row.cells.len()).max().unwrap_or(0);
        if columns == 0 {
            return;
        }
        let (prefix, _) = self.prefixes();
        let available = self
            .width
            .saturating_sub(prefix.width() + 3 * columns + 1)
            .max(columns);

        let mut widths = vec![0usize; columns];
        for row in &rows {
            for (idx, cell) in row.cells.iter().enumerate() {
                widths[idx] = widths[idx].max(cell.width());
            }
        }
        while widths.iter().sum::<usize>() > available {
            let Some(widest) = widths.iter_mut().max() else {
                break;
            };
            if *widest <= 1 {
                break;
            }
            *widest -= 1;
        }

        self.lines.push(RenderedLine::new(
            table_border(&prefix, &widths, '┌', '┬', '┐'),
            LineType::Table,
        ));
        for (idx, row) in rows.iter().enumerate() {
            let mut text = format!("{prefix}│");
            for (col, width) in widths.iter().enumerate() {
                let cell = truncate_to_width(row.cells.get(col).map_or("", String::as_str), *width);
                let padding = width.saturating_sub(cell.width());
                text.push(' ');
                text.push_str(&cell);
                text.push_str(&" ".repeat(padding));
                text.push_str(" │");
            }
            let style = InlineStyle {
                strong: row.header,
                ..InlineStyle::default()
            };
            self.lines.push(RenderedLine::from_spans(
                LineType::Table,
                vec![InlineSpan::new(text, style)],
            ));
            if row.header && idx + 1 < rows.len() && !rows[idx + 1].header {
                self.lines.push(RenderedLine::new(
                    table_border(&prefix, &widths, '├', '┼', '┤'),
                    LineType::Table,
                ));
            }
        }
        self.lines.push(RenderedLine::new(
            table_border(&prefix, &widths, '└', '┴', '┘'),
            LineType::Table,
        ));
    }
}

fn table_border(prefix: &str, widths: &[usize], left: char, middle: char, right: char) -> String {
    let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
    let separator = middle.to_string();
    format!("{prefix}{left}{}{right}", segments.join(separator.as_str()))
}

fn truncate_to_width(text: &str, max_width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if used + ch_width > max_width {
            break;
        }
        used += ch_width;
        out.push(ch);
    }
    out
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for ch in text.chars() {
        if ch.is_ascii_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    out
}

fn wrap_spans(
    spans: &[InlineSpan],
    width: usize,
    prefix_first: &str,
    prefix_next: &str,
) -> Vec<Vec<InlineSpan>> {
    let mut tokens: Vec<InlineSpan> = Vec::new();
    for span in spans {
        tokens.extend(split_inline_tokens(span));
    }

    let mut lines: Vec<Vec<InlineSpan>> = Vec::new();
    let mut current: Vec<InlineSpan> = Vec::new();
    let mut current_len = 0usize;
    let mut has_word = false;

    let start_new_line = |prefix: &str,
                          current: &mut Vec<InlineSpan>,
                          current_len: &mut usize,
                          has_word: &mut bool| {
        current.clear();
        if prefix.is_empty() {
            *current_len = 0;
        } else {
            current.push(InlineSpan::new(prefix.to_string(), InlineStyle::default()));
            *current_len = prefix.width();
        }
        *has_word = false;
    };

    start_new_line(prefix_first, &mut current, &mut current_len, &mut has_word);

    for token in tokens {
        let token_len = token.text().width();
        let token_is_ws = token.text().chars().all(|c| c.is_ascii_whitespace());

        if current_len + token_len > width && has_word {
            trim_trailing_whitespace(&mut current);
            lines.push(current.clone());
            start_new_line(prefix_next, &mut current, &mut current_len, &mut has_word);
        }

        if token_is_ws && !has_word {
            // Drop leading whitespace at wrapped line starts.
            continue;
        }

        current_len += token_len;
        current.push(token);
        if !token_is_ws {
            has_word = true;
        }
    }

    trim_trailing_whitespace(&mut current);
    lines.push(current);
    lines
}

fn trim_trailing_whitespace(line: &mut Vec<InlineSpan>) {
    while line.len() > 1
        && line
            .last()
            .is_some_and(|span| span.text().chars().all(|c| c.is_ascii_whitespace()))
    {
        line.pop();
    }
}

fn split_inline_tokens(span: &InlineSpan) -> Vec<InlineSpan> {
    let mut out = Vec::new();
    let mut buf = String::new();
    let mut ws_state: Option<bool> = None;

    for ch in span.text().chars() {
        let is_ws = ch.is_ascii_whitespace();
        match ws_state {
            Some(state) if state == is_ws => {
                buf.push(ch);
            }
            Some(_) => {
                out.push(span.with_text(std::mem::take(&mut buf)));
                buf.push(ch);
                ws_state = Some(is_ws);
            }
            None => {
                buf.push(ch);
                ws_state = Some(is_ws);
            }
        }
    }

    if !buf.is_empty() {
        out.push(span.with_text(buf));
    }

    out
}

fn markup_span(text: &str, markup: Markup) -> InlineSpan {
    InlineSpan::new(
        text.to_string(),
        InlineStyle {
            markup: Some(markup),
            ..InlineStyle::default()
        },
    )
}

fn highlight_markup(line: &str) -> Vec<InlineSpan> {
    let mut spans = Vec::new();
    let mut last = 0;
    for found in MARKUP_PATTERN.find_iter(line) {
        if found.start() > last {
            spans.push(InlineSpan::new(
                line[last..found.start()].to_string(),
                InlineStyle::default(),
            ));
        }
        let tag = found.as_str();
        if tag.starts_with("<!--") {
            spans.push(markup_span(tag, Markup::Comment));
        } else {
            highlight_tag(tag, &mut spans);
        }
        last = found.end();
    }
    if last < line.len() {
        spans.push(InlineSpan::new(line[last..].to_string(), InlineStyle::default()));
    }
    spans
}

fn highlight_tag(tag: &str, spans: &mut Vec<InlineSpan>) {
    let mut last = 0;
    for caps in ATTRIBUTE_PATTERN.captures_iter(tag) {
        let (Some(whole), Some(name), Some(value)) = (caps.get(0), caps.get(1), caps.get(3)) else {
            continue;
        };
        if whole.start() > last {
            spans.push(markup_span(&tag[last..whole.start()], Markup::Tag));
        }
        spans.push(markup_span(name.as_str(), Markup::Attribute));
        spans.push(markup_span(&tag[name.end()..value.start()], Markup::Tag));
        spans.push(markup_span(value.as_str(), Markup::Value));
        last = whole.end();
    }
    if last < tag.len() {
        spans.push(markup_span(&tag[last..], Markup::Tag));
    }
}

/// Split spans into chunks no wider than `width` columns, keeping
/// whitespace as written.
fn hard_wrap(spans: &[InlineSpan], width: usize) -> Vec<Vec<InlineSpan>> {
    let mut lines = Vec::new();
    let mut current: Vec<InlineSpan> = Vec::new();
    let mut used = 0usize;
    for span in spans {
        let mut buf = String::new();
        for ch in span.text().chars() {
            let ch_width = ch.width().unwrap_or(0);
            if used + ch_width > width && used > 0 {
                if !buf.is_empty() {
                    current.push(span.with_text(std::mem::take(&mut buf)));
                }
                lines.push(std::mem::take(&mut current));
                used = 0;
            }
            buf.push(ch);
            used += ch_width;
        }
        if !buf.is_empty() {
            current.push(span.with_text(buf));
        }
    }
    lines.push(current);
    lines
}
