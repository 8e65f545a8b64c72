/*!
 * Surface quality checks for single translations.
 *
 * Every check is independent and best-effort: ENGLISH_WORDS_PRESENT fires on
 * legitimate Latin-script names, PROMPT_LEAKAGE fires on a translation that
 * happens to contain "output", and none of them judge meaning.
 */

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::language::{SOURCE_KEY, TargetLanguage};
use crate::model::TranslationRecord;

/// Output shorter than this fraction of the source (in characters) is too short
pub const TOO_SHORT_RATIO: f64 = 0.6;

/// Minimum number of segments before the duplicated-tail check applies
pub const MIN_SEGMENTS_FOR_DUPLICATE: usize = 3;

/// Instruction-artifact vocabulary, matched case-insensitively
pub const LEAKAGE_VOCABULARY: [&str; 5] = ["translate", "style", "output", "use formal", "text:"];

/// Characters kept in the report's output sample
pub const SAMPLE_CHARS: usize = 120;

static LATIN_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z]{4,}").unwrap());

/// Issue codes reported by the analyzer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    EmptyOutput,
    EnglishWordsPresent,
    WrongScript,
    TooShort,
    DuplicatedSegment,
    PromptLeakage,
}

impl IssueCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmptyOutput => "EMPTY_OUTPUT",
            Self::EnglishWordsPresent => "ENGLISH_WORDS_PRESENT",
            Self::WrongScript => "WRONG_SCRIPT",
            Self::TooShort => "TOO_SHORT",
            Self::DuplicatedSegment => "DUPLICATED_SEGMENT",
            Self::PromptLeakage => "PROMPT_LEAKAGE",
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deduplicated findings for one (item, language) pair
pub type QaFindings = BTreeSet<IssueCode>;

/// QA analyzer
pub struct QaAnalyzer;

impl QaAnalyzer {
    /// Run every check against one translation
    pub fn analyze(source: &str, translated: &str, language: TargetLanguage) -> QaFindings {
        let mut findings = QaFindings::new();

        if translated.trim().is_empty() {
            findings.insert(IssueCode::EmptyOutput);
        }
        if LATIN_RUN.is_match(translated) {
            findings.insert(IssueCode::EnglishWordsPresent);
        }
        if Self::is_wrong_script(translated, language) {
            findings.insert(IssueCode::WrongScript);
        }
        if (translated.chars().count() as f64) < TOO_SHORT_RATIO * source.chars().count() as f64 {
            findings.insert(IssueCode::TooShort);
        }
        if Self::has_duplicated_tail(translated, language) {
            findings.insert(IssueCode::DuplicatedSegment);
        }
        if Self::has_prompt_leakage(translated) {
            findings.insert(IssueCode::PromptLeakage);
        }

        findings
    }

    fn is_wrong_script(translated: &str, language: TargetLanguage) -> bool {
        language.profile().script.is_some() && !translated.chars().any(|c| language.is_native_char(c))
    }

    fn has_duplicated_tail(translated: &str, language: TargetLanguage) -> bool {
        let segments: Vec<&str> = translated
            .split(language.profile().terminator)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        segments.len() >= MIN_SEGMENTS_FOR_DUPLICATE && segments[segments.len() - 1] == segments[segments.len() - 2]
    }

    fn has_prompt_leakage(translated: &str) -> bool {
        let lowered = translated.to_lowercase();
        LEAKAGE_VOCABULARY.iter().any(|word| lowered.contains(word))
    }
}

/// One line of the batch QA report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaReportEntry {
    pub lang: String,
    pub issues: Vec<IssueCode>,
    pub output_sample: String,
}

/// Check every translation of every record, in record and sequence order
pub fn batch_report(records: &[TranslationRecord]) -> Vec<QaReportEntry> {
    let mut report = Vec::new();

    for record in records {
        for (key, output) in record.translation.iter() {
            if key == SOURCE_KEY {
                continue;
            }
            let language: TargetLanguage = match key.parse() {
                Ok(language) => language,
                Err(e) => {
                    warn!("Skipping QA for '{}': {}", key, e);
                    continue;
                }
            };
            let issues = QaAnalyzer::analyze(&record.input.text, output, language);
            report.push(QaReportEntry {
                lang: key.to_string(),
                issues: issues.into_iter().collect(),
                output_sample: sample(output),
            });
        }
    }

    report
}

fn sample(output: &str) -> String {
    if output.chars().count() > SAMPLE_CHARS {
        format!("{}...", output.chars().take(SAMPLE_CHARS).collect::<String>())
    } else {
        output.to_string()
    }
}
