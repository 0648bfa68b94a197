//! Preferences dialog state.
//!
//! Holds the persisted baseline options. With a settings file every change
//! is written through immediately; without one the in-memory defaults are
//! used and nothing is stored.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use crate::config;
use crate::options::{
    MarkdownOptions, OptionDomain, OptionKey, OptionMap, OptionSchema, OptionValue, OutputFormat,
    SafeMode,
};

/// Values used when no settings have been stored.
pub fn default_preferences() -> OptionMap {
    let mut map = OptionMap::new();
    map.insert(OptionKey::OutputFormat, OutputFormat::Html5.to_value());
    map.insert(OptionKey::SafeMode, SafeMode::Escape.to_value());
    map.insert(OptionKey::HtmlReplacementText, OptionValue::from(""));
    map.insert(OptionKey::TabLength, OptionValue::Int(4));
    map.insert(OptionKey::EnableAttributes, OptionValue::Bool(true));
    map.insert(OptionKey::SmartEmphasis, OptionValue::Bool(true));
    map.insert(OptionKey::LazyOl, OptionValue::Bool(true));
    map
}

#[derive(Debug, Clone)]
pub struct Preferences {
    options: MarkdownOptions,
    store: Option<PathBuf>,
    focus: usize,
}

impl Preferences {
    /// Start from the defaults, overlaid with whatever `store` holds.
    ///
    /// An unreadable settings file is logged and treated as empty.
    pub fn load(schema: Arc<OptionSchema>, store: Option<PathBuf>) -> Self {
        let mut options = MarkdownOptions::new(schema);
        let mut values = default_preferences();
        if let Some(path) = &store {
            match config::load_settings(path) {
                Ok(stored) => values.extend(stored),
                Err(err) => tracing::warn!(error = %err, "ignoring unreadable settings"),
            }
        }
        for (key, value) in values {
            options.set_key(key, value);
        }
        Self {
            options,
            store,
            focus: 0,
        }
    }

    pub const fn options(&self) -> &MarkdownOptions {
        &self.options
    }

    /// The valid preference values.
    pub fn to_map(&self) -> OptionMap {
        self.options.to_map(None)
    }

    pub const fn is_persistent(&self) -> bool {
        self.store.is_some()
    }

    pub fn store(&self) -> Option<&std::path::Path> {
        self.store.as_deref()
    }

    /// Field under the cursor.
    pub fn focused(&self) -> OptionKey {
        OptionKey::ALL[self.focus]
    }

    pub const fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % OptionKey::ALL.len();
    }

    pub const fn focus_prev(&mut self) {
        self.focus = (self.focus + OptionKey::ALL.len() - 1) % OptionKey::ALL.len();
    }

    /// Current display value of `key`.
    pub fn value_label(&self, key: OptionKey) -> String {
        let value = self.options.get(key);
        match key {
            OptionKey::OutputFormat => value
                .and_then(OutputFormat::from_value)
                .map_or("", OutputFormat::label)
                .to_string(),
            OptionKey::SafeMode => value
                .and_then(SafeMode::from_value)
                .map_or("", SafeMode::label)
                .to_string(),
            OptionKey::EnableAttributes | OptionKey::SmartEmphasis | OptionKey::LazyOl => {
                if value.and_then(OptionValue::as_bool).unwrap_or(false) {
                    "[x]".to_string()
                } else {
                    "[ ]".to_string()
                }
            }
            OptionKey::HtmlReplacementText | OptionKey::TabLength => {
                value.map(ToString::to_string).unwrap_or_default()
            }
        }
    }

    /// Step the focused value forward or back: the next choice, the
    /// opposite boolean or one more or less tab stop.
    ///
    /// # Errors
    /// Returns an error if the change cannot be written to the settings file.
    pub fn cycle(&mut self, forward: bool) -> Result<()> {
        let key = self.focused();
        let Some(domain) = self.options.schema().domain(key).cloned() else {
            return Ok(());
        };
        let next = match domain {
            OptionDomain::Choice(choices) => {
                let len = choices.len();
                if len == 0 {
                    return Ok(());
                }
                let current = self
                    .options
                    .get(key)
                    .and_then(|v| choices.iter().position(|c| c == v));
                let idx = match (current, forward) {
                    (Some(i), true) => (i + 1) % len,
                    (Some(i), false) => (i + len - 1) % len,
                    (None, _) => 0,
                };
                choices[idx].clone()
            }
            OptionDomain::Boolean => OptionValue::Bool(
                !self
                    .options
                    .get(key)
                    .and_then(OptionValue::as_bool)
                    .unwrap_or(false),
            ),
            OptionDomain::Integer(range) => {
                let current = self
                    .options
                    .get(key)
                    .and_then(OptionValue::as_int)
                    .unwrap_or(*range.start());
                let stepped = if forward { current + 1 } else { current - 1 };
                OptionValue::Int(stepped.clamp(*range.start(), *range.end()))
            }
            OptionDomain::Text => return Ok(()),
        };
        self.set(key, next)
    }

    /// Type into the focused text field.
    ///
    /// # Errors
    /// Returns an error if the change cannot be written to the settings file.
    pub fn insert_char(&mut self, c: char) -> Result<()> {
        let key = self.focused();
        if !self.is_text(key) {
            return Ok(());
        }
        let mut text = self.text_value(key);
        text.push(c);
        self.set(key, OptionValue::Text(text))
    }

    /// Delete the last character of the focused text field.
    ///
    /// # Errors
    /// Returns an error if the change cannot be written to the settings file.
    pub fn backspace(&mut self) -> Result<()> {
        let key = self.focused();
        if !self.is_text(key) {
            return Ok(());
        }
        let mut text = self.text_value(key);
        if text.pop().is_none() {
            return Ok(());
        }
        self.set(key, OptionValue::Text(text))
    }

    pub fn is_text(&self, key: OptionKey) -> bool {
        matches!(self.options.schema().domain(key), Some(OptionDomain::Text))
    }

    fn text_value(&self, key: OptionKey) -> String {
        self.options
            .get(key)
            .and_then(OptionValue::as_text)
            .unwrap_or_default()
            .to_string()
    }

    /// Store `value` and write it through to the settings file.
    ///
    /// # Errors
    /// Returns an error if the settings file cannot be written.
    pub fn set(&mut self, key: OptionKey, value: OptionValue) -> Result<()> {
        self.options.set_key(key, value);
        if let Some(path) = &self.store {
            config::save_settings(path, &self.to_map())?;
            tracing::debug!(option = %key, path = %path.display(), "preference saved");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn schema() -> Arc<OptionSchema> {
        Arc::new(OptionSchema::markdown())
    }

    #[test]
    fn test_defaults_without_backend() {
        let prefs = Preferences::load(schema(), None);
        let map = prefs.to_map();
        assert_eq!(map.get(&OptionKey::OutputFormat), Some(&OptionValue::from("html5")));
        assert_eq!(map.get(&OptionKey::SafeMode), Some(&OptionValue::from("escape")));
        assert_eq!(map.get(&OptionKey::TabLength), Some(&OptionValue::Int(4)));
        assert_eq!(map.get(&OptionKey::LazyOl), Some(&OptionValue::Bool(true)));
        // Empty replacement text is not a valid value
        assert!(!map.contains_key(&OptionKey::HtmlReplacementText));
        assert!(!prefs.is_persistent());
    }

    #[test]
    fn test_stored_settings_override_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings");
        std::fs::write(&path, "--output-format xhtml1\n--no-smart-emphasis\n").unwrap();
        let prefs = Preferences::load(schema(), Some(path));
        let map = prefs.to_map();
        assert_eq!(map.get(&OptionKey::OutputFormat), Some(&OptionValue::from("xhtml1")));
        assert_eq!(map.get(&OptionKey::SmartEmphasis), Some(&OptionValue::Bool(false)));
        assert_eq!(map.get(&OptionKey::EnableAttributes), Some(&OptionValue::Bool(true)));
    }

    #[test]
    fn test_changes_are_written_through() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("settings");
        let mut prefs = Preferences::load(schema(), Some(path.clone()));
        prefs.cycle(true).unwrap(); // output format: html5 -> xhtml1 (wraps)
        let stored = config::load_settings(&path).unwrap();
        assert_eq!(stored.get(&OptionKey::OutputFormat), Some(&OptionValue::from("xhtml1")));
    }

    #[test]
    fn test_cycle_choices_and_booleans() {
        let mut prefs = Preferences::load(schema(), None);
        prefs.focus_next(); // safe mode
        prefs.cycle(false).unwrap();
        assert_eq!(prefs.value_label(OptionKey::SafeMode), "Remove");
        prefs.focus_prev();
        prefs.focus_prev(); // wraps to lazy ol
        assert_eq!(prefs.focused(), OptionKey::LazyOl);
        prefs.cycle(true).unwrap();
        assert_eq!(prefs.value_label(OptionKey::LazyOl), "[ ]");
    }

    #[test]
    fn test_tab_length_is_clamped() {
        let mut prefs = Preferences::load(schema(), None);
        while prefs.focused() != OptionKey::TabLength {
            prefs.focus_next();
        }
        for _ in 0..10 {
            prefs.cycle(false).unwrap();
        }
        assert_eq!(prefs.value_label(OptionKey::TabLength), "1");
    }

    #[test]
    fn test_replacement_text_editing() {
        let mut prefs = Preferences::load(schema(), None);
        prefs.focus_next();
        prefs.focus_next();
        assert!(prefs.is_text(prefs.focused()));
        prefs.insert_char('x').unwrap();
        prefs.insert_char('y').unwrap();
        prefs.backspace().unwrap();
        assert_eq!(
            prefs.to_map().get(&OptionKey::HtmlReplacementText),
            Some(&OptionValue::from("x"))
        );
        // Typing into a non-text field is ignored
        prefs.focus_next();
        prefs.insert_char('9').unwrap();
        assert_eq!(prefs.value_label(OptionKey::TabLength), "4");
    }
}
