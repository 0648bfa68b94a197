//! Persisted preference settings.
//!
//! Settings live in a small text file with one `--flag value` entry per
//! line. Values are parsed leniently; whether a value is usable is decided
//! later by the option schema.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::options::{OptionKey, OptionMap, OptionValue};

/// Environment variable that disables the settings backend.
pub const NO_SETTINGS_ENV: &str = "MDVIEW_NO_SETTINGS";

/// Location of the settings file, or `None` when no backend is available.
pub fn settings_path() -> Option<PathBuf> {
    if std::env::var_os(NO_SETTINGS_ENV).is_some_and(|v| !v.is_empty() && v != "0") {
        return None;
    }

    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return Some(PathBuf::from(appdata).join("mdview").join("settings"));
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return Some(
                PathBuf::from(home)
                    .join("Library")
                    .join("Application Support")
                    .join("mdview")
                    .join("settings"),
            );
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
            return Some(PathBuf::from(xdg).join("mdview").join("settings"));
        }
        if let Some(home) = std::env::var_os("HOME").filter(|v| !v.is_empty()) {
            return Some(
                PathBuf::from(home)
                    .join(".config")
                    .join("mdview")
                    .join("settings"),
            );
        }
    }

    None
}

/// Load stored settings. A missing file yields an empty map.
///
/// # Errors
/// Returns an error if the file exists but cannot be read.
pub fn load_settings(path: &Path) -> Result<OptionMap> {
    if !path.exists() {
        return Ok(OptionMap::new());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings {}", path.display()))?;
    let lines = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(ToOwned::to_owned)
        .collect::<Vec<_>>();
    Ok(parse_settings_lines(&lines))
}

/// Write every entry of `settings` to `path`, creating parent directories.
///
/// # Errors
/// Returns an error if the directory or file cannot be written.
pub fn save_settings(path: &Path, settings: &OptionMap) -> Result<()> {
    let mut lines = Vec::new();
    lines.push("# mdview preferences".to_string());
    for (key, value) in settings {
        match value {
            OptionValue::Bool(true) if is_switch(*key) => lines.push(format!("--{}", flag(*key))),
            OptionValue::Bool(false) if is_switch(*key) => {
                lines.push(format!("--no-{}", flag(*key)));
            }
            other => lines.push(format!("--{} {}", flag(*key), other)),
        }
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create settings dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write settings {}", path.display()))
}

/// Remove the settings file if present.
///
/// # Errors
/// Returns an error if the file exists but cannot be removed.
pub fn clear_settings(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Parse settings entries of the form `--flag value`, `--flag=value`,
/// `--switch` or `--no-switch`. Unknown flags are skipped.
pub fn parse_settings_lines(lines: &[String]) -> OptionMap {
    let mut settings = OptionMap::new();
    for line in lines {
        let Some(entry) = line.trim().strip_prefix("--") else {
            continue;
        };
        let (name, value) = match entry.split_once(|c: char| c == '=' || c.is_whitespace()) {
            Some((name, value)) => (name, Some(value.trim())),
            None => (entry, None),
        };

        if let Some(key) = switch_key(name) {
            settings.insert(key, OptionValue::Bool(true));
            continue;
        }
        if let Some(key) = name.strip_prefix("no-").and_then(switch_key) {
            settings.insert(key, OptionValue::Bool(false));
            continue;
        }
        let (Some(key), Some(value)) = (value_key(name), value) else {
            continue;
        };
        settings.insert(key, parse_value(key, value));
    }
    settings
}

fn parse_value(key: OptionKey, value: &str) -> OptionValue {
    match key {
        OptionKey::TabLength => value
            .parse::<i64>()
            .map_or_else(|_| OptionValue::from(value), OptionValue::Int),
        OptionKey::SafeMode if value == "false" => OptionValue::Bool(false),
        _ => OptionValue::from(value),
    }
}

const fn is_switch(key: OptionKey) -> bool {
    matches!(
        key,
        OptionKey::EnableAttributes | OptionKey::SmartEmphasis | OptionKey::LazyOl
    )
}

fn flag(key: OptionKey) -> String {
    key.name().replace('_', "-")
}

fn switch_key(name: &str) -> Option<OptionKey> {
    OptionKey::ALL
        .into_iter()
        .find(|key| is_switch(*key) && flag(*key) == name)
}

fn value_key(name: &str) -> Option<OptionKey> {
    OptionKey::ALL
        .into_iter()
        .find(|key| !is_switch(*key) && flag(*key) == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_parse_settings_lines_extracts_known_flags() {
        let settings = parse_settings_lines(&lines(&[
            "--output-format html4",
            "--safe-mode=false",
            "--tab-length 8",
            "--no-lazy-ol",
            "--smart-emphasis",
            "--html-replacement-text [removed by mdview]",
            "--unknown 1",
            "not a flag",
        ]));
        assert_eq!(
            settings.get(&OptionKey::OutputFormat),
            Some(&OptionValue::from("html4"))
        );
        assert_eq!(settings.get(&OptionKey::SafeMode), Some(&OptionValue::Bool(false)));
        assert_eq!(settings.get(&OptionKey::TabLength), Some(&OptionValue::Int(8)));
        assert_eq!(settings.get(&OptionKey::LazyOl), Some(&OptionValue::Bool(false)));
        assert_eq!(
            settings.get(&OptionKey::SmartEmphasis),
            Some(&OptionValue::Bool(true))
        );
        assert_eq!(
            settings.get(&OptionKey::HtmlReplacementText),
            Some(&OptionValue::from("[removed by mdview]"))
        );
        assert_eq!(settings.len(), 6);
    }

    #[test]
    fn test_unparseable_tab_length_is_kept_as_text() {
        let settings = parse_settings_lines(&lines(&["--tab-length wide"]));
        assert_eq!(
            settings.get(&OptionKey::TabLength),
            Some(&OptionValue::from("wide"))
        );
    }

    #[test]
    fn test_save_load_and_clear_settings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("settings");
        let mut settings = OptionMap::new();
        settings.insert(OptionKey::OutputFormat, OptionValue::from("xhtml5"));
        settings.insert(OptionKey::SafeMode, OptionValue::from("replace"));
        settings.insert(OptionKey::TabLength, OptionValue::Int(2));
        settings.insert(OptionKey::EnableAttributes, OptionValue::Bool(false));
        settings.insert(OptionKey::LazyOl, OptionValue::Bool(true));
        settings.insert(
            OptionKey::HtmlReplacementText,
            OptionValue::from("gone missing"),
        );

        save_settings(&path, &settings).unwrap();
        let loaded = load_settings(&path).unwrap();
        assert_eq!(loaded, settings);

        clear_settings(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let loaded = load_settings(&dir.path().join("absent")).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_safe_mode_false_round_trips_as_bool() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings");
        let mut settings = OptionMap::new();
        settings.insert(OptionKey::SafeMode, OptionValue::Bool(false));
        save_settings(&path, &settings).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("--safe-mode false"), "{content}");
        assert_eq!(load_settings(&path).unwrap(), settings);
    }
}
