//! Paths dropped onto the view.
//!
//! Terminals deliver a drop as pasted text: either `file://` URIs, one per
//! line, or shell-quoted paths separated by spaces.

use std::path::PathBuf;

use percent_encoding::percent_decode_str;

/// Extract file paths from dropped or pasted text.
pub fn paths_from_drop(text: &str) -> Vec<PathBuf> {
    split_words(text)
        .into_iter()
        .filter(|word| !word.is_empty())
        .filter_map(|word| {
            if word.starts_with("file:") {
                path_from_file_uri(&word)
            } else {
                Some(PathBuf::from(word))
            }
        })
        .collect()
}

/// Percent-decode the path component of a `file:` URI.
///
/// The authority (host) part is discarded, as is any query or fragment.
pub fn path_from_file_uri(uri: &str) -> Option<PathBuf> {
    let rest = uri.strip_prefix("file:")?;
    let path = match rest.strip_prefix("//") {
        Some(after_scheme) => &after_scheme[after_scheme.find('/')?..],
        None => rest,
    };
    let path = path.split(['?', '#']).next().unwrap_or_default();
    if path.is_empty() {
        return None;
    }
    Some(PathBuf::from(
        percent_decode_str(path).decode_utf8_lossy().into_owned(),
    ))
}

/// Split on unquoted whitespace, honouring single quotes, double quotes and
/// backslash escapes.
pub fn split_words(text: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = text.chars();

    while let Some(ch) = chars.next() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some('"'), '\\') => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            (Some(_), c) => current.push(c),
            (None, '\'' | '"') => {
                quote = Some(ch);
                in_word = true;
            }
            (None, '\\') => {
                if let Some(next) = chars.next() {
                    current.push(next);
                    in_word = true;
                }
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if in_word {
        words.push(current);
    }
    words
}
