/*!
 * Ordinal scoring of automatic metrics.
 *
 * Maps corpus chrF onto a 1-5 scale and derives a six-dimension rubric that
 * approximates human judgment:
 * - meaning: chrF bucket
 * - completeness: mean candidate/reference length ratio, bucketed
 * - fluency, register, metaphor, grammar: seeded by meaning, downgraded by QA findings
 *
 * Candidates and references are paired by item index. When the counts
 * differ a language is either skipped (strict) or truncated to the common
 * length (display), never silently misaligned.
 */

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::errors::PipelineError;
use crate::file_utils::FileManager;
use crate::language::TargetLanguage;
use crate::model::{TranslationRecord, scorable_records};
use crate::quality::metrics::{corpus_bleu, corpus_chrf};
use crate::quality::qa::{IssueCode, QaAnalyzer, QaFindings};

/// chrF cut-offs for the meaning scale, highest first
pub const CHRF_BUCKETS: [(f64, u8); 4] = [(60.0, 5), (50.0, 4), (40.0, 3), (30.0, 2)];

/// Length ratio cut-offs for the completeness scale, highest first
pub const COMPLETENESS_BUCKETS: [(f64, u8); 4] = [(0.95, 5), (0.90, 4), (0.80, 3), (0.60, 2)];

/// Lowest ordinal value
pub const ORDINAL_MIN: u8 = 1;

/// Fluency when the output leaks instructions or English
pub const FLUENCY_PENALIZED: u8 = 2;

/// Fluency never falls below this without a QA penalty
pub const FLUENCY_FLOOR: u8 = 3;

/// Map a value onto the 1-5 scale using descending cut-offs
pub fn bucket(value: f64, cutoffs: &[(f64, u8)]) -> u8 {
    cutoffs
        .iter()
        .find(|(threshold, _)| value >= *threshold)
        .map(|(_, ordinal)| *ordinal)
        .unwrap_or(ORDINAL_MIN)
}

/// chrF (0-100) to the 1-5 scale
pub fn chrf_to_ordinal(chrf: f64) -> u8 {
    bucket(chrf, &CHRF_BUCKETS)
}

/// Round to two decimals
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Mean candidate/reference character length ratio
///
/// A pair with an empty reference contributes 0.
pub fn mean_length_ratio<C: AsRef<str>, R: AsRef<str>>(candidates: &[C], references: &[R]) -> f64 {
    let ratios: Vec<f64> = candidates
        .iter()
        .zip(references)
        .map(|(c, r)| {
            let ref_len = r.as_ref().chars().count();
            if ref_len == 0 {
                0.0
            } else {
                c.as_ref().chars().count() as f64 / ref_len.max(1) as f64
            }
        })
        .collect();

    if ratios.is_empty() {
        0.0
    } else {
        ratios.iter().sum::<f64>() / ratios.len() as f64
    }
}

/// The six heuristic dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RubricScores {
    pub meaning: u8,
    pub completeness: u8,
    pub fluency: u8,
    pub register: u8,
    pub metaphor: u8,
    pub grammar: u8,
}

impl RubricScores {
    /// Derive the rubric from chrF, the length ratio and the language's QA findings
    pub fn derive(chrf: f64, length_ratio: f64, qa: &QaFindings) -> Self {
        let meaning = chrf_to_ordinal(chrf);
        let completeness = bucket(length_ratio, &COMPLETENESS_BUCKETS);
        let english = qa.contains(&IssueCode::EnglishWordsPresent);
        let leakage = qa.contains(&IssueCode::PromptLeakage);

        let fluency = if english || leakage {
            FLUENCY_PENALIZED
        } else {
            meaning.max(FLUENCY_FLOOR)
        };
        let grammar = if english {
            meaning.saturating_sub(1).max(ORDINAL_MIN)
        } else {
            meaning
        };

        Self {
            meaning,
            completeness,
            fluency,
            register: meaning,
            metaphor: meaning,
            grammar,
        }
    }

    pub fn values(&self) -> [u8; 6] {
        [
            self.meaning,
            self.completeness,
            self.fluency,
            self.register,
            self.metaphor,
            self.grammar,
        ]
    }

    /// Arithmetic mean of the six dimensions, two decimals
    pub fn composite(&self) -> f64 {
        let values = self.values();
        round2(values.iter().map(|v| *v as f64).sum::<f64>() / values.len() as f64)
    }
}

/// Per-language automatic scores (`lang,BLEU,chrF`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoScore {
    pub lang: String,
    #[serde(rename = "BLEU")]
    pub bleu: f64,
    #[serde(rename = "chrF")]
    pub chrf: f64,
}

/// Automatic scores with the chrF ordinal added
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatedScore {
    pub lang: String,
    #[serde(rename = "BLEU")]
    pub bleu: f64,
    #[serde(rename = "chrF")]
    pub chrf: f64,
    #[serde(rename = "chrF_1to5")]
    pub chrf_1to5: u8,
}

impl From<AutoScore> for RatedScore {
    fn from(score: AutoScore) -> Self {
        Self {
            chrf_1to5: chrf_to_ordinal(score.chrf),
            lang: score.lang,
            bleu: score.bleu,
            chrf: score.chrf,
        }
    }
}

/// Full per-language score record
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRecord {
    pub language: TargetLanguage,
    pub bleu: f64,
    pub chrf: f64,
    pub rubric: RubricScores,
    pub composite: f64,
    pub qa_issues: QaFindings,
}

/// What to do when reference and candidate counts differ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignmentPolicy {
    /// Skip the language
    Strict,
    /// Score the common prefix
    Truncate,
}

/// Reference lines per language
pub type ReferenceSet = BTreeMap<TargetLanguage, Vec<String>>;

/// Load `refs_dir/<language>.txt` for every target language
///
/// A missing file skips that language with a diagnostic.
pub fn load_references(refs_dir: &Path) -> ReferenceSet {
    let mut references = ReferenceSet::new();
    for language in TargetLanguage::ALL {
        let path = refs_dir.join(language.reference_file_name());
        if !FileManager::file_exists(&path) {
            warn!(
                "No reference file for {} ({}) at {:?}; skipping automatic metrics for this language",
                language,
                language.iso_code().unwrap_or("?"),
                path
            );
            continue;
        }
        match FileManager::read_reference_lines(&path) {
            Ok(lines) => {
                references.insert(language, lines);
            }
            Err(e) => warn!("Failed to read references for {}: {}", language, e),
        }
    }
    references
}

/// Index-aligned corpus for one language
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedCorpus {
    pub language: TargetLanguage,
    pub sources: Vec<String>,
    pub candidates: Vec<String>,
    pub references: Vec<String>,
}

impl AlignedCorpus {
    /// Pair the scorable records' candidates with the references
    pub fn align(
        language: TargetLanguage,
        records: &[TranslationRecord],
        references: &[String],
        policy: AlignmentPolicy,
    ) -> Result<Self, PipelineError> {
        let scorable = scorable_records(records);
        let mut sources: Vec<String> = scorable.iter().map(|r| r.input.text.clone()).collect();
        let mut candidates: Vec<String> = scorable
            .iter()
            .map(|r| r.candidate(language.name()).to_string())
            .collect();
        let mut references = references.to_vec();

        if references.len() != candidates.len() {
            let mismatch = PipelineError::AlignmentMismatch {
                language: language.name().to_string(),
                references: references.len(),
                candidates: candidates.len(),
            };
            match policy {
                AlignmentPolicy::Strict => return Err(mismatch),
                AlignmentPolicy::Truncate => {
                    warn!("{}; truncating to the shorter length", mismatch);
                    let n = references.len().min(candidates.len());
                    sources.truncate(n);
                    candidates.truncate(n);
                    references.truncate(n);
                }
            }
        }

        Ok(Self {
            language,
            sources,
            candidates,
            references,
        })
    }

    pub fn bleu(&self) -> f64 {
        corpus_bleu(&self.candidates, &self.references)
    }

    pub fn chrf(&self) -> f64 {
        corpus_chrf(&self.candidates, &self.references)
    }

    /// Union of QA findings over every aligned pair
    pub fn qa_findings(&self) -> QaFindings {
        self.sources
            .iter()
            .zip(&self.candidates)
            .flat_map(|(source, candidate)| QaAnalyzer::analyze(source, candidate, self.language))
            .collect()
    }

    /// Full score record for this language
    pub fn score(&self) -> ScoreRecord {
        let chrf = self.chrf();
        let qa_issues = self.qa_findings();
        let rubric = RubricScores::derive(chrf, mean_length_ratio(&self.candidates, &self.references), &qa_issues);
        ScoreRecord {
            language: self.language,
            bleu: round2(self.bleu()),
            chrf: round2(chrf),
            composite: rubric.composite(),
            rubric,
            qa_issues,
        }
    }
}

/// Strict automatic scoring; mismatched languages are skipped
pub fn automatic_scores(records: &[TranslationRecord], references: &ReferenceSet) -> Vec<AutoScore> {
    let mut scores = Vec::new();
    for (language, refs) in ordered(references) {
        match AlignedCorpus::align(language, records, refs, AlignmentPolicy::Strict) {
            Ok(corpus) => {
                let score = AutoScore {
                    lang: language.name().to_string(),
                    bleu: round2(corpus.bleu()),
                    chrf: round2(corpus.chrf()),
                };
                info!("{}: BLEU={:.2}, chrF={:.2}", language, score.bleu, score.chrf);
                scores.push(score);
            }
            Err(e) => warn!("{}; skipping", e),
        }
    }
    scores
}

/// Display scoring with the full rubric; mismatched languages are truncated
pub fn display_scores(records: &[TranslationRecord], references: &ReferenceSet) -> Vec<ScoreRecord> {
    let mut scores = Vec::new();
    for (language, refs) in ordered(references) {
        match AlignedCorpus::align(language, records, refs, AlignmentPolicy::Truncate) {
            Ok(corpus) => scores.push(corpus.score()),
            Err(e) => warn!("{}; skipping", e),
        }
    }
    scores
}

fn ordered(references: &ReferenceSet) -> impl Iterator<Item = (TargetLanguage, &Vec<String>)> {
    TargetLanguage::ALL
        .into_iter()
        .filter_map(move |language| references.get(&language).map(|refs| (language, refs)))
}
