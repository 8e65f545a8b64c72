/*!
 * Data model for batch input and output documents.
 *
 * Input is either a bare list of items or an object carrying a language
 * `sequence` plus `items`. Output is a list of `TranslationRecord`s whose
 * translation mapping keeps sequence order when serialized.
 */

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::language::{SOURCE_KEY, Sequence};

/// Per-item metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemMeta {
    /// When false the item is carried through untranslated and unscored
    #[serde(default = "default_true")]
    pub translate: bool,

    /// Any other metadata, preserved verbatim
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for ItemMeta {
    fn default() -> Self {
        Self {
            translate: true,
            extra: serde_json::Map::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// A single free-text unit of the batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceItem {
    /// The text to translate
    #[serde(default, alias = "content", alias = "source")]
    pub text: String,

    /// Item metadata
    #[serde(default, skip_serializing_if = "is_default_meta")]
    pub meta: ItemMeta,

    /// Unknown item fields, preserved verbatim
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn is_default_meta(meta: &ItemMeta) -> bool {
    *meta == ItemMeta::default()
}

impl SourceItem {
    /// Create a translatable item
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            meta: ItemMeta::default(),
            extra: serde_json::Map::new(),
        }
    }

    /// Create an item that is carried through untranslated
    pub fn skipped(text: impl Into<String>) -> Self {
        let mut item = Self::new(text);
        item.meta.translate = false;
        item
    }

    pub fn is_translatable(&self) -> bool {
        self.meta.translate
    }

    /// Character count, as used by the length heuristics
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Batch input file, in either of its accepted shapes
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum InputDocument {
    /// Bare ordered list of items
    Items(Vec<SourceItem>),
    /// Object with an explicit language sequence
    WithSequence {
        #[serde(default)]
        sequence: Vec<String>,
        #[serde(default)]
        items: Vec<SourceItem>,
    },
}

impl InputDocument {
    /// Split into the normalized sequence and the items
    pub fn into_parts(self) -> (Sequence, Vec<SourceItem>) {
        match self {
            Self::Items(items) => (Sequence::default(), items),
            Self::WithSequence { sequence, items } => (Sequence::normalize(&sequence), items),
        }
    }
}

/// Ordered language -> text mapping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslationMap {
    entries: Vec<(String, String)>,
}

impl TranslationMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mapping for an untranslated item: only the source key
    pub fn source_only(text: &str) -> Self {
        let mut map = Self::new();
        map.insert(SOURCE_KEY, text);
        map
    }

    /// Insert or replace, keeping the first insertion position
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for TranslationMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct TranslationMapVisitor;

impl<'de> Visitor<'de> for TranslationMapVisitor {
    type Value = TranslationMap;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of language names to strings")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = TranslationMap::new();
        while let Some((key, value)) = access.next_entry::<String, String>()? {
            map.insert(key, value);
        }
        Ok(map)
    }
}

impl<'de> Deserialize<'de> for TranslationMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(TranslationMapVisitor)
    }
}

/// One processed item and its renditions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationRecord {
    /// The item as read from the input
    pub input: SourceItem,
    /// Language -> text, `Source` always holding the original verbatim
    pub translation: TranslationMap,
}

impl TranslationRecord {
    /// Candidate text for a language, trimmed; empty when absent
    pub fn candidate(&self, language: &str) -> &str {
        self.translation.get(language).map(str::trim).unwrap_or("")
    }
}

/// Records that take part in scoring (translatable items only)
pub fn scorable_records(records: &[TranslationRecord]) -> Vec<&TranslationRecord> {
    records.iter().filter(|r| r.input.is_translatable()).collect()
}
