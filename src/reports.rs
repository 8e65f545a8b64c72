/*!
 * Tabular exports of score and review artifacts.
 *
 * Every CSV goes through serde row types so column names live next to the
 * fields they describe. Writes are atomic like the batch output.
 */

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::file_utils::FileManager;
use crate::language::TargetLanguage;
use crate::model::{TranslationRecord, scorable_records};
use crate::quality::scoring::{ReferenceSet, ScoreRecord};

/// Serialize rows to CSV with a header line
pub fn to_csv<T: Serialize>(rows: &[T]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row).context("Failed to serialize CSV row")?;
    }
    writer.into_inner().context("Failed to flush CSV writer")
}

/// Write rows to a CSV file
pub fn write_csv<T: Serialize, P: AsRef<Path>>(path: P, rows: &[T]) -> Result<()> {
    let bytes = to_csv(rows)?;
    FileManager::write_atomic(path.as_ref(), &bytes)
        .with_context(|| format!("Failed to write CSV: {:?}", path.as_ref()))
}

/// Read all rows of a CSV file
pub fn read_csv<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<Vec<T>> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path).with_context(|| format!("Failed to open CSV: {:?}", path))?;
    reader
        .deserialize()
        .collect::<Result<Vec<T>, csv::Error>>()
        .with_context(|| format!("Failed to parse CSV: {:?}", path))
}

/// Flat row of the scoring display export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreDisplayRow {
    pub language: String,
    #[serde(rename = "BLEU")]
    pub bleu: f64,
    #[serde(rename = "chrF")]
    pub chrf: f64,
    pub meaning_1_5: u8,
    pub completeness_1_5: u8,
    pub fluency_1_5: u8,
    pub register_1_5: u8,
    pub metaphor_1_5: u8,
    pub grammar_1_5: u8,
    pub human_proxy_mean: f64,
    pub qa_issues: String,
}

impl From<&ScoreRecord> for ScoreDisplayRow {
    fn from(record: &ScoreRecord) -> Self {
        Self {
            language: record.language.name().to_string(),
            bleu: record.bleu,
            chrf: record.chrf,
            meaning_1_5: record.rubric.meaning,
            completeness_1_5: record.rubric.completeness,
            fluency_1_5: record.rubric.fluency,
            register_1_5: record.rubric.register,
            metaphor_1_5: record.rubric.metaphor,
            grammar_1_5: record.rubric.grammar,
            human_proxy_mean: record.composite,
            qa_issues: record
                .qa_issues
                .iter()
                .map(|issue| issue.as_str())
                .collect::<Vec<_>>()
                .join(";"),
        }
    }
}

/// One (item, language) pair for human raters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaterRow {
    pub id: String,
    pub language: String,
    pub source: String,
    pub reference: String,
    pub candidate: String,
}

/// Rows for every scorable item and target language, ids starting at 1
///
/// A missing reference line leaves the reference column empty.
pub fn rater_rows(records: &[TranslationRecord], references: &ReferenceSet) -> Vec<RaterRow> {
    let mut rows = Vec::new();
    for (index, record) in scorable_records(records).into_iter().enumerate() {
        for language in TargetLanguage::ALL {
            let reference = references
                .get(&language)
                .and_then(|lines| lines.get(index))
                .map(|line| line.trim().to_string())
                .unwrap_or_default();
            rows.push(RaterRow {
                id: (index + 1).to_string(),
                language: language.name().to_string(),
                source: record.input.text.trim().to_string(),
                reference,
                candidate: record.candidate(language.name()).to_string(),
            });
        }
    }
    rows
}
