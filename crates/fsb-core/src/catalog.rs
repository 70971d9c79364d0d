//! Static catalog: content key -> ordered file references.

use std::{collections::BTreeMap, fs, path::Path};

use serde::Deserialize;

use crate::{errors::Error, Result};

/// File references starting with this prefix stand in for not-yet-uploaded files.
pub const PLACEHOLDER_PREFIX: &str = "FILE_ID_";

/// Telegram limits deep-link start parameters to 64 characters.
pub const MAX_KEY_LEN: usize = 64;

pub fn is_placeholder(file_ref: &str) -> bool {
    let t = file_ref.trim();
    t.is_empty() || t.starts_with(PLACEHOLDER_PREFIX)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogEntry {
    pub key: String,
    pub display_name: String,
    /// Delivery order and part numbering follow this order.
    pub file_refs: Vec<String>,
}

impl CatalogEntry {
    pub fn new(key: impl Into<String>, file_refs: Vec<String>) -> Self {
        let key = key.into();
        let display_name = default_display_name(&key);
        Self {
            key,
            display_name,
            file_refs,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// References that can actually be sent, placeholders removed.
    pub fn available_refs(&self) -> Vec<&str> {
        self.file_refs
            .iter()
            .map(String::as_str)
            .filter(|r| !is_placeholder(r))
            .collect()
    }

    pub fn is_available(&self) -> bool {
        self.file_refs.iter().any(|r| !is_placeholder(r))
    }
}

/// `season1` -> `Season 1`, `spring_special` -> `Spring Special`.
pub fn default_display_name(key: &str) -> String {
    key.replace("season", "season ")
        .replace(['_', '-'], " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lowercase a key and check that it can be used verbatim in a deep link.
pub fn normalize_key(raw: &str) -> Result<String> {
    let key = raw.trim().to_lowercase();
    if key.is_empty() {
        return Err(Error::Config("catalog key must not be empty".to_string()));
    }
    if key.len() > MAX_KEY_LEN {
        return Err(Error::Config(format!(
            "catalog key '{key}' is longer than {MAX_KEY_LEN} characters"
        )));
    }
    if let Some(bad) = key
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
    {
        return Err(Error::Config(format!(
            "catalog key '{key}' contains '{bad}'; only a-z, 0-9, '_' and '-' are allowed"
        )));
    }
    Ok(key)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Files(Vec<String>),
    Detailed {
        #[serde(default)]
        display_name: Option<String>,
        files: Vec<String>,
    },
}

/// Immutable key -> entry mapping, iterated in key order.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    entries: BTreeMap<String, CatalogEntry>,
}

impl Catalog {
    pub fn from_entries(entries: impl IntoIterator<Item = CatalogEntry>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for mut entry in entries {
            let key = normalize_key(&entry.key)?;
            if map.contains_key(&key) {
                return Err(Error::Config(format!("duplicate catalog key '{key}'")));
            }
            entry.key = key.clone();
            map.insert(key, entry);
        }
        Ok(Self { entries: map })
    }

    pub fn from_json(input: &str) -> Result<Self> {
        let raw: BTreeMap<String, RawEntry> = serde_json::from_str(input)?;
        let entries = raw.into_iter().map(|(key, raw)| match raw {
            RawEntry::Files(files) => CatalogEntry::new(key, files),
            RawEntry::Detailed {
                display_name,
                files,
            } => {
                let entry = CatalogEntry::new(key, files);
                match display_name.filter(|n| !n.trim().is_empty()) {
                    Some(name) => entry.with_display_name(name),
                    None => entry,
                }
            }
        });
        Self::from_entries(entries)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read catalog {}: {e}", path.display()))
        })?;
        Self::from_json(&contents).map_err(|e| {
            Error::Config(format!("failed to parse catalog {}: {e}", path.display()))
        })
    }

    /// Case-insensitive lookup.
    pub fn resolve(&self, key: &str) -> Option<&CatalogEntry> {
        self.entries.get(&key.trim().to_lowercase())
    }

    /// Entries with at least one sendable reference, sorted by key.
    pub fn available(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values().filter(|e| e.is_available())
    }

    /// Keys with at least one sendable reference.
    pub fn available_keys(&self) -> Vec<&str> {
        self.available().map(|e| e.key.as_str()).collect()
    }

    pub fn keys(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn log_summary(&self) {
        if self.is_empty() {
            tracing::warn!("catalog is empty; the bot cannot serve any files");
            return;
        }
        let available = self.available_keys();
        if available.is_empty() {
            tracing::warn!("catalog only contains placeholders; the bot cannot serve any files");
        }
        tracing::info!(
            keys = ?self.keys(),
            available = ?available,
            "catalog loaded"
        );
    }
}
