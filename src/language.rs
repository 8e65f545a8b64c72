//! Language utilities for the fixed set of target languages.
//!
//! Every per-language behavior (script block, register hint, exemplar
//! pairing, sentence terminator) lives in one `LanguageProfile` table so that
//! adding a language is a single table edit.

use anyhow::{Result, anyhow};
use isolang::Language;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Key used for the untranslated source text in every translation mapping
pub const SOURCE_KEY: &str = "Source";

/// Target languages supported by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TargetLanguage {
    Malayalam,
    Kannada,
    Tamil,
    Telugu,
    Hindi,
}

/// Static capability record for a target language
#[derive(Debug, Clone)]
pub struct LanguageProfile {
    /// Display name, also used as the mapping key
    pub name: &'static str,
    /// Unicode block the native script lives in
    pub script: Option<RangeInclusive<char>>,
    /// Extra register directive appended to the instruction
    pub register_hint: Option<&'static str>,
    /// Whether the style exemplar pairs the source's first sentence with a reference line
    pub paired_exemplar: bool,
    /// Sentence terminator used when segmenting output
    pub terminator: char,
}

static PROFILES: [LanguageProfile; 5] = [
    LanguageProfile {
        name: "Malayalam",
        script: Some('\u{0D00}'..='\u{0D7F}'),
        register_hint: Some(
            "Write the entire output in Malayalam script. Never use Roman transliteration or English words.",
        ),
        paired_exemplar: true,
        terminator: '.',
    },
    LanguageProfile {
        name: "Kannada",
        script: Some('\u{0C80}'..='\u{0CFF}'),
        register_hint: Some("Write in standard written Kannada using Kannada script only."),
        paired_exemplar: true,
        terminator: '.',
    },
    LanguageProfile {
        name: "Tamil",
        script: Some('\u{0B80}'..='\u{0BFF}'),
        register_hint: Some("Write in formal literary Tamil using Tamil script only."),
        paired_exemplar: false,
        terminator: '.',
    },
    LanguageProfile {
        name: "Telugu",
        script: Some('\u{0C00}'..='\u{0C7F}'),
        register_hint: None,
        paired_exemplar: false,
        terminator: '.',
    },
    LanguageProfile {
        name: "Hindi",
        script: Some('\u{0900}'..='\u{097F}'),
        register_hint: Some("Write in formal standard Hindi using Devanagari script."),
        paired_exemplar: false,
        terminator: '\u{0964}',
    },
];

impl TargetLanguage {
    /// All target languages in canonical order
    pub const ALL: [TargetLanguage; 5] = [
        TargetLanguage::Malayalam,
        TargetLanguage::Kannada,
        TargetLanguage::Tamil,
        TargetLanguage::Telugu,
        TargetLanguage::Hindi,
    ];

    pub fn profile(&self) -> &'static LanguageProfile {
        &PROFILES[*self as usize]
    }

    pub fn name(&self) -> &'static str {
        self.profile().name
    }

    /// ISO 639-1 code, used for reference filenames in diagnostics
    pub fn iso_code(&self) -> Option<&'static str> {
        Language::from_name(self.name()).and_then(|lang| lang.to_639_1())
    }

    /// Whether `c` belongs to this language's native script block
    pub fn is_native_char(&self, c: char) -> bool {
        self.profile().script.as_ref().is_some_and(|range| range.contains(&c))
    }

    /// Reference file name inside the refs directory (`malayalam.txt`)
    pub fn reference_file_name(&self) -> String {
        format!("{}.txt", self.name().to_lowercase())
    }
}

impl fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for TargetLanguage {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        TargetLanguage::ALL
            .iter()
            .copied()
            .find(|lang| lang.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| anyhow!("Unsupported target language: {}", s))
    }
}

/// One entry of a language sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LanguageSlot {
    /// The untranslated source text
    Source,
    /// A translated rendition
    Target(TargetLanguage),
}

impl LanguageSlot {
    /// Mapping key for this slot
    pub fn key(&self) -> &'static str {
        match self {
            Self::Source => SOURCE_KEY,
            Self::Target(lang) => lang.name(),
        }
    }
}

impl fmt::Display for LanguageSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for LanguageSlot {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.trim().to_lowercase();
        if lowered == "english" || lowered == "source" {
            return Ok(Self::Source);
        }
        s.parse().map(Self::Target)
    }
}

/// Ordered, duplicate-free list of language slots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    slots: Vec<LanguageSlot>,
}

impl Sequence {
    /// Slots every sequence must contain, in default order
    pub const REQUIRED: [LanguageSlot; 6] = [
        LanguageSlot::Source,
        LanguageSlot::Target(TargetLanguage::Malayalam),
        LanguageSlot::Target(TargetLanguage::Kannada),
        LanguageSlot::Target(TargetLanguage::Tamil),
        LanguageSlot::Target(TargetLanguage::Telugu),
        LanguageSlot::Target(TargetLanguage::Hindi),
    ];

    /// Normalize a user supplied list of language names
    ///
    /// "English" and "Source" in any casing become the source slot, duplicates
    /// keep their first position, unknown names are dropped with a warning and
    /// missing required slots are appended in default order.
    pub fn normalize<S: AsRef<str>>(names: &[S]) -> Self {
        let mut slots: Vec<LanguageSlot> = Vec::with_capacity(Self::REQUIRED.len());

        for name in names {
            let name = name.as_ref();
            if name.trim().is_empty() {
                continue;
            }
            match name.parse::<LanguageSlot>() {
                Ok(slot) => {
                    if !slots.contains(&slot) {
                        slots.push(slot);
                    }
                }
                Err(e) => warn!("Dropping sequence entry '{}': {}", name, e),
            }
        }

        for slot in Self::REQUIRED {
            if !slots.contains(&slot) {
                slots.push(slot);
            }
        }

        Self { slots }
    }

    pub fn slots(&self) -> &[LanguageSlot] {
        &self.slots
    }

    /// Names as they appear in output, e.g. for logging
    pub fn names(&self) -> Vec<&'static str> {
        self.slots.iter().map(|slot| slot.key()).collect()
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Self {
            slots: Self::REQUIRED.to_vec(),
        }
    }
}
