//! Markdown rendering options.
//!
//! An [`OptionSchema`] describes which option keys exist and which values
//! are legal for each of them. [`MarkdownOptions`] holds candidate values
//! and only reports a key as set when its value lies in the key's domain,
//! so invalid intermediate values are tolerated until they are read.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::RangeInclusive;
use std::sync::Arc;

/// A candidate value for a rendering option.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl OptionValue {
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Recognised option keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OptionKey {
    OutputFormat,
    SafeMode,
    HtmlReplacementText,
    TabLength,
    EnableAttributes,
    SmartEmphasis,
    LazyOl,
}

impl OptionKey {
    pub const ALL: [Self; 7] = [
        Self::OutputFormat,
        Self::SafeMode,
        Self::HtmlReplacementText,
        Self::TabLength,
        Self::EnableAttributes,
        Self::SmartEmphasis,
        Self::LazyOl,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::OutputFormat => "output_format",
            Self::SafeMode => "safe_mode",
            Self::HtmlReplacementText => "html_replacement_text",
            Self::TabLength => "tab_length",
            Self::EnableAttributes => "enable_attributes",
            Self::SmartEmphasis => "smart_emphasis",
            Self::LazyOl => "lazy_ol",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.name() == name)
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Target HTML dialect emitted by the converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Xhtml1,
    Xhtml5,
    Html4,
    Html5,
}

impl OutputFormat {
    pub const ALL: [Self; 4] = [Self::Xhtml1, Self::Xhtml5, Self::Html4, Self::Html5];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Xhtml1 => "xhtml1",
            Self::Xhtml5 => "xhtml5",
            Self::Html4 => "html4",
            Self::Html5 => "html5",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Xhtml1 => "XHTML 1.1",
            Self::Xhtml5 => "XHTML '5'",
            Self::Html4 => "HTML 4",
            Self::Html5 => "HTML 5",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == s)
    }

    pub fn from_value(value: &OptionValue) -> Option<Self> {
        value.as_text().and_then(Self::parse)
    }

    pub fn to_value(self) -> OptionValue {
        OptionValue::from(self.as_str())
    }

    /// XHTML dialects close void elements with ` />`.
    pub const fn is_xhtml(self) -> bool {
        matches!(self, Self::Xhtml1 | Self::Xhtml5)
    }
}

/// How raw HTML embedded in Markdown is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SafeMode {
    Off,
    Replace,
    Remove,
    Escape,
}

impl SafeMode {
    pub const ALL: [Self; 4] = [Self::Off, Self::Replace, Self::Remove, Self::Escape];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "false",
            Self::Replace => "replace",
            Self::Remove => "remove",
            Self::Escape => "escape",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Off => "None",
            Self::Replace => "Replace",
            Self::Remove => "Remove",
            Self::Escape => "Escape",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == s)
    }

    /// Disabled safe mode is the boolean `false`, the others are names.
    pub fn from_value(value: &OptionValue) -> Option<Self> {
        match value {
            OptionValue::Bool(false) => Some(Self::Off),
            OptionValue::Text(s) if s != "false" => Self::parse(s),
            _ => None,
        }
    }

    pub fn to_value(self) -> OptionValue {
        match self {
            Self::Off => OptionValue::Bool(false),
            other => OptionValue::from(other.as_str()),
        }
    }
}

/// Legal values for one option key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionDomain {
    /// One of a fixed set of values.
    Choice(Vec<OptionValue>),
    Boolean,
    Integer(RangeInclusive<i64>),
    /// Any non-empty string.
    Text,
}

impl OptionDomain {
    pub fn accepts(&self, value: &OptionValue) -> bool {
        match (self, value) {
            (Self::Choice(allowed), value) => allowed.contains(value),
            (Self::Boolean, OptionValue::Bool(_)) => true,
            (Self::Integer(range), OptionValue::Int(n)) => range.contains(n),
            (Self::Text, OptionValue::Text(s)) => !s.is_empty(),
            _ => false,
        }
    }
}

/// Immutable description of the recognised option keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSchema {
    entries: Vec<(OptionKey, OptionDomain)>,
}

impl OptionSchema {
    pub const fn new(entries: Vec<(OptionKey, OptionDomain)>) -> Self {
        Self { entries }
    }

    /// The option set understood by the Markdown converter.
    pub fn markdown() -> Self {
        Self::new(vec![
            (
                OptionKey::OutputFormat,
                OptionDomain::Choice(OutputFormat::ALL.map(OutputFormat::to_value).to_vec()),
            ),
            (
                OptionKey::SafeMode,
                OptionDomain::Choice(SafeMode::ALL.map(SafeMode::to_value).to_vec()),
            ),
            (OptionKey::HtmlReplacementText, OptionDomain::Text),
            (OptionKey::TabLength, OptionDomain::Integer(1..=24)),
            (OptionKey::EnableAttributes, OptionDomain::Boolean),
            (OptionKey::SmartEmphasis, OptionDomain::Boolean),
            (OptionKey::LazyOl, OptionDomain::Boolean),
        ])
    }

    pub fn domain(&self, key: OptionKey) -> Option<&OptionDomain> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, domain)| domain)
    }

    pub fn keys(&self) -> impl Iterator<Item = OptionKey> + '_ {
        self.entries.iter().map(|(key, _)| *key)
    }
}

/// Merged option values keyed by option.
pub type OptionMap = BTreeMap<OptionKey, OptionValue>;

/// Candidate option values checked against a schema when read.
#[derive(Debug, Clone)]
pub struct MarkdownOptions {
    schema: Arc<OptionSchema>,
    values: BTreeMap<OptionKey, OptionValue>,
}

impl MarkdownOptions {
    pub fn new(schema: Arc<OptionSchema>) -> Self {
        Self {
            schema,
            values: BTreeMap::new(),
        }
    }

    pub fn schema(&self) -> &Arc<OptionSchema> {
        &self.schema
    }

    /// Store `value` under the option named `key`.
    ///
    /// Names outside the schema are ignored.
    pub fn set(&mut self, key: &str, value: impl Into<OptionValue>) {
        if let Some(key) = OptionKey::from_name(key) {
            self.set_key(key, value);
        }
    }

    /// Store `value` under `key` if the schema knows the key.
    pub fn set_key(&mut self, key: OptionKey, value: impl Into<OptionValue>) {
        if self.schema.domain(key).is_some() {
            self.values.insert(key, value.into());
        }
    }

    /// The stored candidate, valid or not.
    pub fn get(&self, key: OptionKey) -> Option<&OptionValue> {
        self.values.get(&key)
    }

    /// Overlay every valid stored value on top of `base`.
    pub fn to_map(&self, base: Option<&OptionMap>) -> OptionMap {
        let mut map = base.cloned().unwrap_or_default();
        for key in self.schema.keys() {
            let (Some(value), Some(domain)) = (self.values.get(&key), self.schema.domain(key))
            else {
                continue;
            };
            if domain.accepts(value) {
                map.insert(key, value.clone());
            }
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> MarkdownOptions {
        MarkdownOptions::new(Arc::new(OptionSchema::markdown()))
    }

    #[test]
    fn test_unknown_key_is_ignored() {
        let mut opts = options();
        opts.set("no_such_option", true);
        assert!(opts.to_map(None).is_empty());
    }

    #[test]
    fn test_valid_values_are_included() {
        let mut opts = options();
        opts.set("output_format", "html5");
        opts.set("safe_mode", false);
        opts.set("tab_length", 8_i64);
        opts.set("lazy_ol", true);
        opts.set("html_replacement_text", "[gone]");

        let map = opts.to_map(None);
        assert_eq!(map.get(&OptionKey::OutputFormat), Some(&OptionValue::from("html5")));
        assert_eq!(map.get(&OptionKey::SafeMode), Some(&OptionValue::Bool(false)));
        assert_eq!(map.get(&OptionKey::TabLength), Some(&OptionValue::Int(8)));
        assert_eq!(map.get(&OptionKey::LazyOl), Some(&OptionValue::Bool(true)));
        assert_eq!(
            map.get(&OptionKey::HtmlReplacementText),
            Some(&OptionValue::from("[gone]"))
        );
    }

    #[test]
    fn test_invalid_values_are_tolerated_but_not_read() {
        let mut opts = options();
        opts.set("output_format", "html6");
        opts.set("safe_mode", true);
        opts.set("tab_length", 0_i64);
        opts.set("smart_emphasis", "yes");
        opts.set("html_replacement_text", "");

        assert_eq!(opts.get(OptionKey::OutputFormat), Some(&OptionValue::from("html6")));
        assert!(opts.to_map(None).is_empty());
    }

    #[test]
    fn test_to_map_overlays_base() {
        let mut base = OptionMap::new();
        base.insert(OptionKey::OutputFormat, OptionValue::from("xhtml1"));
        base.insert(OptionKey::LazyOl, OptionValue::Bool(true));

        let mut opts = options();
        opts.set("output_format", "html4");
        opts.set("lazy_ol", "not a bool");

        let map = opts.to_map(Some(&base));
        assert_eq!(map.get(&OptionKey::OutputFormat), Some(&OptionValue::from("html4")));
        assert_eq!(map.get(&OptionKey::LazyOl), Some(&OptionValue::Bool(true)));
    }

    #[test]
    fn test_safe_mode_values() {
        assert_eq!(SafeMode::from_value(&OptionValue::Bool(false)), Some(SafeMode::Off));
        assert_eq!(SafeMode::from_value(&OptionValue::Bool(true)), None);
        assert_eq!(
            SafeMode::from_value(&OptionValue::from("escape")),
            Some(SafeMode::Escape)
        );
        assert_eq!(SafeMode::from_value(&OptionValue::from("false")), None);
        for mode in SafeMode::ALL {
            assert_eq!(SafeMode::from_value(&mode.to_value()), Some(mode));
        }
    }

    #[test]
    fn test_restricted_schema_ignores_missing_keys() {
        let schema = OptionSchema::new(vec![(OptionKey::LazyOl, OptionDomain::Boolean)]);
        let mut opts = MarkdownOptions::new(Arc::new(schema));
        opts.set("lazy_ol", false);
        opts.set("output_format", "html5");
        let map = opts.to_map(None);
        assert_eq!(map.len(), 1);
        assert!(opts.get(OptionKey::OutputFormat).is_none());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn any_value() -> impl Strategy<Value = OptionValue> {
            prop_oneof![
                any::<bool>().prop_map(OptionValue::Bool),
                (-5_i64..40).prop_map(OptionValue::Int),
                prop_oneof![
                    Just(String::new()),
                    Just("html5".to_string()),
                    Just("xhtml1".to_string()),
                    Just("escape".to_string()),
                    Just("replace".to_string()),
                    Just("false".to_string()),
                    "[a-z]{1,8}",
                ]
                .prop_map(OptionValue::Text),
            ]
        }

        proptest! {
            #[test]
            fn key_is_set_iff_value_in_domain(
                key_index in 0..OptionKey::ALL.len(),
                value in any_value(),
            ) {
                let key = OptionKey::ALL[key_index];
                let schema = OptionSchema::markdown();
                let expected = schema.domain(key).is_some_and(|d| d.accepts(&value));

                let mut opts = MarkdownOptions::new(Arc::new(schema));
                opts.set(key.name(), value.clone());
                let map = opts.to_map(None);

                prop_assert_eq!(map.contains_key(&key), expected);
                if expected {
                    prop_assert_eq!(map.get(&key), Some(&value));
                }
            }
        }
    }
}
