/*!
 * Outer join of automatic scores with human ratings.
 *
 * Rows are keyed by language name (case-insensitive). A language present on
 * only one side keeps its row with the other side's columns empty. The human
 * mean is computed only when all five ratings are present.
 */

use serde::{Deserialize, Serialize};

use crate::quality::scoring::{RatedScore, round2};

/// Externally supplied human ratings for one language
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HumanScoreRecord {
    pub language: String,
    #[serde(rename = "Accuracy", default)]
    pub accuracy: Option<f64>,
    #[serde(rename = "Fluency", default)]
    pub fluency: Option<f64>,
    #[serde(rename = "Register", default)]
    pub register: Option<f64>,
    #[serde(rename = "Cultural_naturalness", default)]
    pub cultural_naturalness: Option<f64>,
    #[serde(rename = "Metaphor_retention", default)]
    pub metaphor_retention: Option<f64>,
}

impl HumanScoreRecord {
    /// Mean of the five ratings, or `None` when any is missing
    pub fn mean(&self) -> Option<f64> {
        let ratings = [
            self.accuracy?,
            self.fluency?,
            self.register?,
            self.cultural_naturalness?,
            self.metaphor_retention?,
        ];
        Some(round2(ratings.iter().sum::<f64>() / ratings.len() as f64))
    }
}

/// One row of the combined summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub language: String,
    #[serde(rename = "BLEU")]
    pub bleu: Option<f64>,
    #[serde(rename = "chrF")]
    pub chrf: Option<f64>,
    #[serde(rename = "chrF_1to5")]
    pub chrf_1to5: Option<u8>,
    #[serde(rename = "Accuracy")]
    pub accuracy: Option<f64>,
    #[serde(rename = "Fluency")]
    pub fluency: Option<f64>,
    #[serde(rename = "Register")]
    pub register: Option<f64>,
    #[serde(rename = "Cultural_naturalness")]
    pub cultural_naturalness: Option<f64>,
    #[serde(rename = "Metaphor_retention")]
    pub metaphor_retention: Option<f64>,
    pub human_mean: Option<f64>,
}

impl SummaryRecord {
    fn empty(language: &str) -> Self {
        Self {
            language: language.to_string(),
            bleu: None,
            chrf: None,
            chrf_1to5: None,
            accuracy: None,
            fluency: None,
            register: None,
            cultural_naturalness: None,
            metaphor_retention: None,
            human_mean: None,
        }
    }

    fn with_auto(mut self, auto: &RatedScore) -> Self {
        self.bleu = Some(auto.bleu);
        self.chrf = Some(auto.chrf);
        self.chrf_1to5 = Some(auto.chrf_1to5);
        self
    }

    fn with_human(mut self, human: &HumanScoreRecord) -> Self {
        self.accuracy = human.accuracy;
        self.fluency = human.fluency;
        self.register = human.register;
        self.cultural_naturalness = human.cultural_naturalness;
        self.metaphor_retention = human.metaphor_retention;
        self.human_mean = human.mean();
        self
    }
}

fn same_language(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// Outer join on language
///
/// Automatic rows come first in their own order, followed by languages that
/// only have human ratings.
pub fn merge_scores(auto: &[RatedScore], human: &[HumanScoreRecord]) -> Vec<SummaryRecord> {
    let mut merged: Vec<SummaryRecord> = auto
        .iter()
        .map(|a| {
            let row = SummaryRecord::empty(a.lang.trim()).with_auto(a);
            match human.iter().find(|h| same_language(&h.language, &a.lang)) {
                Some(h) => row.with_human(h),
                None => row,
            }
        })
        .collect();

    for h in human {
        if !auto.iter().any(|a| same_language(&a.lang, &h.language)) {
            merged.push(SummaryRecord::empty(h.language.trim()).with_human(h));
        }
    }

    merged
}
