/*!
 * Quality assessment of translated batches.
 *
 * - **QA**: surface checks per (item, language) translation
 * - **Metrics**: corpus BLEU and chrF against reference translations
 * - **Scoring**: ordinal mapping and the heuristic rubric
 * - **Merge**: outer join of automatic scores with human ratings
 */

pub mod merge;
pub mod metrics;
pub mod qa;
pub mod scoring;

// Re-export main types
pub use merge::{HumanScoreRecord, SummaryRecord, merge_scores};
pub use metrics::{corpus_bleu, corpus_chrf};
pub use qa::{IssueCode, QaAnalyzer, QaFindings, QaReportEntry};
pub use scoring::{AlignmentPolicy, AutoScore, RatedScore, RubricScores, ScoreRecord};
