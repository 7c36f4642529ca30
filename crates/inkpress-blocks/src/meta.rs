//! Ini metadata blocks.
//!
//! The payload of a metadata block is ini text: `key = value` lines grouped under
//! `[namespace]` headers. Lines before the first header belong to the unnamed
//! namespace `""`. Namespaces may be nested with dots (`[nav.home]`), which is how
//! [`MetaBlock::item`] descends through a namespace path.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::mapping::MapFromMeta;

/// Errors produced while reading ini text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetaError {
    #[error("Invalid metadata at line {line}: {text:?}")]
    Syntax { line: usize, text: String },

    #[error("Metadata is not valid UTF-8")]
    Encoding,
}

#[derive(Debug, Clone, Default)]
struct Namespace {
    name: String,
    entries: Vec<(String, String)>,
}

impl Namespace {
    fn set(&mut self, key: String, value: String) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A parsed key/value block with a two-level namespace.
///
/// A block whose text failed to parse answers every query as if it were empty.
#[derive(Debug, Clone, Default)]
pub struct MetaBlock {
    raw: Vec<u8>,
    namespaces: Vec<Namespace>,
    error: Option<MetaError>,
}

impl MetaBlock {
    /// Create a block and populate it from `raw`.
    pub fn from_bytes(raw: Vec<u8>) -> Self {
        let mut block = Self::default();
        block.write(&raw);
        block
    }

    /// Replace the block contents by parsing `raw` as ini text.
    ///
    /// Failures are recorded rather than returned; they surface from [`MetaBlock::map_to`].
    pub fn write(&mut self, raw: &[u8]) {
        self.raw = raw.to_vec();
        match parse_ini(raw) {
            Ok(namespaces) => {
                self.namespaces = namespaces;
                self.error = None;
            }
            Err(e) => {
                tracing::debug!("Discarding malformed metadata: {}", e);
                self.namespaces = Vec::new();
                self.error = Some(e);
            }
        }
    }

    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// The parse failure from the last [`MetaBlock::write`], if any.
    pub fn error(&self) -> Option<&MetaError> {
        self.error.as_ref()
    }

    /// Look up a key after descending a namespace path.
    ///
    /// The last element is the key; everything before it names the namespace,
    /// so `item(&["nav", "home", "link"])` reads `link` from `[nav.home]`.
    /// Returns `""` when anything along the way is missing.
    pub fn item(&self, path: &[&str]) -> &str {
        let Some((key, namespace)) = path.split_last() else {
            return "";
        };
        self.namespace(&namespace.join("."))
            .and_then(|ns| ns.get(key))
            .unwrap_or("")
    }

    /// All pairs under one namespace.
    pub fn map_hash(&self, namespace: &str) -> BTreeMap<String, String> {
        self.namespace(namespace)
            .map(|ns| ns.entries.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Key names under a namespace, in the order they were written.
    pub fn keys(&self, namespace: &str) -> Vec<&str> {
        self.namespace(namespace)
            .map(|ns| ns.entries.iter().map(|(k, _)| k.as_str()).collect())
            .unwrap_or_default()
    }

    /// Populate `target` from the keys of `namespace` using its field table.
    ///
    /// Absent namespaces and keys leave fields untouched. Only a syntax failure in
    /// the written text is an error.
    pub fn map_to<T: MapFromMeta>(&self, namespace: &str, target: &mut T) -> Result<(), MetaError> {
        if let Some(e) = &self.error {
            return Err(e.clone());
        }
        let Some(ns) = self.namespace(namespace) else {
            return Ok(());
        };
        for field in T::fields() {
            if let Some(value) = ns.get(field.key()) {
                field.apply(target, value);
            }
        }
        Ok(())
    }

    fn namespace(&self, name: &str) -> Option<&Namespace> {
        self.namespaces.iter().find(|ns| ns.name == name)
    }
}

static SECTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[\s*([^\[\]]*?)\s*\]$").expect("Invalid section regex")
});

static ENTRY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([^=:\s][^=:]*?)\s*[=:]\s*(.*)$").expect("Invalid entry regex")
});

fn parse_ini(raw: &[u8]) -> Result<Vec<Namespace>, MetaError> {
    let text = std::str::from_utf8(raw).map_err(|_| MetaError::Encoding)?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut namespaces = vec![Namespace::default()];
    let mut current = 0;

    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }

        if let Some(caps) = SECTION_RE.captures(line) {
            let name = &caps[1];
            current = match namespaces.iter().position(|ns| ns.name == name) {
                Some(pos) => pos,
                None => {
                    namespaces.push(Namespace {
                        name: name.to_string(),
                        entries: Vec::new(),
                    });
                    namespaces.len() - 1
                }
            };
            continue;
        }

        let Some(caps) = ENTRY_RE.captures(line) else {
            return Err(MetaError::Syntax {
                line: i + 1,
                text: line.to_string(),
            });
        };
        namespaces[current].set(caps[1].to_string(), unquote(&caps[2]).to_string());
    }

    Ok(namespaces)
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}
