//! Localized message strings
//!
//! A catalog is a flat TOML table of `key = "text"` pairs. Lookups fall back
//! to a parent catalog (typically the default locale) and finally to the key
//! itself, so a missing translation never hides a message.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};

#[derive(Debug, Default, Clone)]
pub struct MessageCatalog {
    entries: HashMap<String, String>,
    fallback: Option<Box<MessageCatalog>>,
}

impl MessageCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a catalog from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let entries: HashMap<String, String> =
            toml::from_str(content).context("Failed to parse message catalog")?;
        Ok(Self {
            entries,
            fallback: None,
        })
    }

    /// Load a catalog from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read message catalog {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Consult `fallback` for keys this catalog does not define
    pub fn with_fallback(mut self, fallback: MessageCatalog) -> Self {
        self.fallback = Some(Box::new(fallback));
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.entries.insert(key.into(), text.into());
    }

    fn lookup(&self, key: &str) -> Option<&str> {
        self.entries
            .get(key)
            .map(String::as_str)
            .or_else(|| self.fallback.as_ref().and_then(|f| f.lookup(key)))
    }

    /// Resolve `key`, returning the key itself when no catalog defines it
    pub fn get<'a>(&'a self, key: &'a str) -> &'a str {
        self.lookup(key).unwrap_or(key)
    }

    /// Resolve `key` and substitute positional `{0}`, `{1}`, ... placeholders.
    ///
    /// The template is scanned once, so braces inside an argument are copied
    /// as-is. Placeholders without a matching argument stay literal.
    pub fn format(&self, key: &str, args: &[&dyn std::fmt::Display]) -> String {
        let mut rest = self.get(key);
        let mut text = String::with_capacity(rest.len());

        while let Some(open) = rest.find('{') {
            text.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let arg = after.find('}').and_then(|close| {
                let digits = &after[..close];
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                let arg = args.get(digits.parse::<usize>().ok()?)?;
                Some((arg, close))
            });
            match arg {
                Some((arg, close)) => {
                    text.push_str(&arg.to_string());
                    rest = &after[close + 1..];
                }
                None => {
                    text.push('{');
                    rest = after;
                }
            }
        }
        text.push_str(rest);
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const EN: &str = r#"
"app.title" = "Tracker"
"file.saved" = "Saved {0} entries to {1}"
"#;

    const DE: &str = r#"
"file.saved" = "{0} Einträge in {1} gespeichert"
"#;

    #[test]
    fn test_get_known_and_unknown_keys() {
        let catalog = MessageCatalog::from_toml_str(EN).unwrap();
        assert_eq!(catalog.get("app.title"), "Tracker");
        assert_eq!(catalog.get("missing.key"), "missing.key");
    }

    #[test]
    fn test_format_positional_args() {
        let catalog = MessageCatalog::from_toml_str(EN).unwrap();
        assert_eq!(
            catalog.format("file.saved", &[&3, &"profiles.json"]),
            "Saved 3 entries to profiles.json"
        );
    }

    #[test]
    fn test_format_leaves_argument_text_alone() {
        let catalog = MessageCatalog::from_toml_str(EN).unwrap();
        assert_eq!(
            catalog.format("file.saved", &[&"{1}", &"/tmp/out"]),
            "Saved {1} entries to /tmp/out"
        );
        // Missing arguments and non-numeric braces are kept verbatim
        assert_eq!(
            catalog.format("file.saved", &[&3]),
            "Saved 3 entries to {1}"
        );
        let mut custom = MessageCatalog::new();
        custom.insert("raw", "{name} {} {0");
        assert_eq!(custom.format("raw", &[&"x"]), "{name} {} {0");
    }

    #[test]
    fn test_fallback_chain() {
        let catalog = MessageCatalog::from_toml_str(DE)
            .unwrap()
            .with_fallback(MessageCatalog::from_toml_str(EN).unwrap());

        assert_eq!(
            catalog.format("file.saved", &[&3, &"a.json"]),
            "3 Einträge in a.json gespeichert"
        );
        assert_eq!(catalog.get("app.title"), "Tracker");
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("messages_en.toml");
        std::fs::write(&path, EN).unwrap();

        let catalog = MessageCatalog::load(&path).unwrap();
        assert_eq!(catalog.get("app.title"), "Tracker");
    }

    #[test]
    fn test_malformed_catalog_is_an_error() {
        assert!(MessageCatalog::from_toml_str("title = [1, 2]").is_err());
    }
}
