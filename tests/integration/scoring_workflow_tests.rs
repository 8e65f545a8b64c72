/*!
 * End-to-end tests of the evaluate, map, display, merge, export and QA stages
 */

use std::fs;
use std::path::Path;

use mtqa::errors::PipelineError;
use mtqa::file_utils::FileManager;
use mtqa::language::TargetLanguage;
use mtqa::model::{SourceItem, TranslationMap, TranslationRecord};
use mtqa::quality::IssueCode;

use crate::common;

const TAMIL: [&str; 2] = [
    "இது ஒரு நல்ல நாள் இன்று",
    "அவன் வீட்டுக்கு மெதுவாக நடந்து சென்றான்",
];
const HINDI: [&str; 2] = ["आज एक अच्छा दिन है", "वह धीरे धीरे घर चला गया"];

fn record(source: &str, tamil: &str, hindi: &str) -> TranslationRecord {
    let mut translation = TranslationMap::source_only(source);
    translation.insert("Tamil", tamil);
    translation.insert("Hindi", hindi);
    TranslationRecord {
        input: SourceItem::new(source),
        translation,
    }
}

/// Batch output with one skipped title and two translated items
fn write_batch_output(dir: &Path) {
    let records = vec![
        TranslationRecord {
            input: SourceItem::skipped("Contents"),
            translation: TranslationMap::source_only("Contents"),
        },
        record("Today is a good day", TAMIL[0], HINDI[0]),
        record("He walked home slowly", TAMIL[1], HINDI[1]),
    ];
    FileManager::write_json_atomic(dir.join("batch_output.json"), &records).unwrap();
}

/// Tamil references line up; Hindi has one line too many
fn write_references(dir: &Path) {
    common::create_reference_file(dir, TargetLanguage::Tamil, &TAMIL).unwrap();
    common::create_reference_file(
        dir,
        TargetLanguage::Hindi,
        &[HINDI[0], HINDI[1], "यह एक अतिरिक्त पंक्ति है"],
    )
    .unwrap();
}

#[test]
fn test_evaluateMapMerge_fullWorkflow_shouldProduceSummary() {
    let dir = common::create_temp_dir().unwrap();
    write_batch_output(dir.path());
    write_references(dir.path());
    let controller = common::controller_with(dir.path(), common::translating_mock());

    // Strict alignment: the mismatched Hindi corpus is skipped
    let scores = controller.run_evaluate(None).unwrap();
    assert_eq!(scores.len(), 1);
    assert_eq!(scores[0].lang, "Tamil");
    assert!((scores[0].chrf - 100.0).abs() < 1e-9);
    let auto_csv = fs::read_to_string(dir.path().join("auto_scores.csv")).unwrap();
    assert!(auto_csv.starts_with("lang,BLEU,chrF\n"));
    assert!(auto_csv.contains("Tamil,"));

    let rated = controller.run_map_scores(None).unwrap();
    assert_eq!(rated.len(), 1);
    assert_eq!(rated[0].chrf_1to5, 5);
    let rated_csv = fs::read_to_string(dir.path().join("auto_scores_rated.csv")).unwrap();
    assert!(rated_csv.starts_with("lang,BLEU,chrF,chrF_1to5\n"));

    common::create_test_file(
        dir.path(),
        "human_scores_agg.csv",
        "language,Accuracy,Fluency,Register,Cultural_naturalness,Metaphor_retention\n\
         tamil,4,4,4,4,5\n\
         Telugu,3,,3,3,3\n",
    )
    .unwrap();

    let merged = controller.run_merge(None).unwrap();
    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0].language, "Tamil");
    assert_eq!(merged[0].chrf_1to5, Some(5));
    assert_eq!(merged[0].human_mean, Some(4.2));
    assert_eq!(merged[1].language, "Telugu");
    assert_eq!(merged[1].bleu, None);
    assert_eq!(merged[1].human_mean, None);
    assert!(dir.path().join("combined_summary.csv").exists());
}

#[test]
fn test_evaluate_noReferences_shouldWriteNothing() {
    let dir = common::create_temp_dir().unwrap();
    write_batch_output(dir.path());
    let controller = common::controller_with(dir.path(), common::translating_mock());

    let scores = controller.run_evaluate(None).unwrap();

    assert!(scores.is_empty());
    assert!(!dir.path().join("auto_scores.csv").exists());
}

#[test]
fn test_evaluate_missingBatchOutput_shouldReportMissingArtifact() {
    let dir = common::create_temp_dir().unwrap();
    let controller = common::controller_with(dir.path(), common::translating_mock());

    let err = controller.run_evaluate(None).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<PipelineError>(),
        Some(PipelineError::MissingArtifact(_))
    ));
}

#[test]
fn test_scoreDisplay_mismatchedCorpus_shouldTruncateAndScore() {
    let dir = common::create_temp_dir().unwrap();
    write_batch_output(dir.path());
    write_references(dir.path());
    let controller = common::controller_with(dir.path(), common::translating_mock());

    let scores = controller.run_score_display(None).unwrap();

    let languages: Vec<TargetLanguage> = scores.iter().map(|s| s.language).collect();
    assert_eq!(languages, vec![TargetLanguage::Tamil, TargetLanguage::Hindi]);
    let tamil = &scores[0];
    assert_eq!(tamil.rubric.meaning, 5);
    assert_eq!(tamil.rubric.completeness, 5);
    assert_eq!(tamil.composite, 5.0);
    assert!(tamil.qa_issues.is_empty());

    let csv = fs::read_to_string(dir.path().join("scoring_display.csv")).unwrap();
    assert!(csv.starts_with("language,BLEU,chrF,meaning_1_5"));
    assert_eq!(csv.lines().count(), 3);
}

#[test]
fn test_mapScores_missingInput_shouldReportMissingArtifact() {
    let dir = common::create_temp_dir().unwrap();
    let controller = common::controller_with(dir.path(), common::translating_mock());

    let err = controller.run_map_scores(None).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<PipelineError>(),
        Some(PipelineError::MissingArtifact(_))
    ));
}

#[test]
fn test_merge_bothInputsMissing_shouldHalt() {
    let dir = common::create_temp_dir().unwrap();
    let controller = common::controller_with(dir.path(), common::translating_mock());

    let err = controller.run_merge(None).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<PipelineError>(),
        Some(PipelineError::NothingToDo(_))
    ));
    assert!(!dir.path().join("combined_summary.csv").exists());
}

#[test]
fn test_merge_humanOnly_shouldKeepHumanRows() {
    let dir = common::create_temp_dir().unwrap();
    common::create_test_file(
        dir.path(),
        "human_scores_agg.csv",
        "language,Accuracy,Fluency,Register,Cultural_naturalness,Metaphor_retention\nKannada,5,5,5,5,5\n",
    )
    .unwrap();
    let controller = common::controller_with(dir.path(), common::translating_mock());

    let merged = controller.run_merge(None).unwrap();

    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].language, "Kannada");
    assert_eq!(merged[0].chrf, None);
    assert_eq!(merged[0].human_mean, Some(5.0));
}

#[test]
fn test_exportHuman_shouldWriteRowPerItemAndLanguage() {
    let dir = common::create_temp_dir().unwrap();
    write_batch_output(dir.path());
    write_references(dir.path());
    let controller = common::controller_with(dir.path(), common::translating_mock());

    let rows = controller.run_export_human(None).unwrap();

    assert_eq!(rows, 2 * TargetLanguage::ALL.len());
    let csv = fs::read_to_string(dir.path().join("for_raters.csv")).unwrap();
    assert!(csv.starts_with("id,language,source,reference,candidate\n"));
    assert!(csv.contains(&format!("2,Tamil,He walked home slowly,{},{}", TAMIL[1], TAMIL[1])));
    assert!(!csv.contains("Contents"));
}

#[test]
fn test_qa_batchOutput_shouldReportPerLanguage() {
    let dir = common::create_temp_dir().unwrap();
    write_batch_output(dir.path());
    let controller = common::controller_with(dir.path(), common::translating_mock());

    let report = controller.run_qa(None).unwrap();

    // Two translated records with two target languages each; the skipped title has none
    assert_eq!(report.len(), 4);
    assert_eq!(report[0].lang, "Tamil");
    assert_eq!(report[1].lang, "Hindi");
    assert!(report.iter().all(|entry| !entry.issues.contains(&IssueCode::WrongScript)));
}
