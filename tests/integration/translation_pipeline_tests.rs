/*!
 * End-to-end tests of the translate stage through the controller
 */

use std::fs;

use mtqa::app_controller::TranslateOutcome;
use mtqa::model::TranslationRecord;
use mtqa::providers::mock::MockProvider;
use mtqa::quality::IssueCode;

use crate::common;

fn read_output(dir: &std::path::Path) -> (String, Vec<TranslationRecord>) {
    let raw = fs::read_to_string(dir.join("batch_output.json")).unwrap();
    let records = serde_json::from_str(&raw).unwrap();
    (raw, records)
}

/// Items flagged not to translate carry only their source
#[tokio::test]
async fn test_translate_skippedItem_shouldMapOnlySource() {
    let dir = common::create_temp_dir().unwrap();
    common::create_test_file(
        dir.path(),
        "batch.json",
        r#"[{"text": "Table of contents", "meta": {"translate": false}}]"#,
    )
    .unwrap();
    let mock = common::translating_mock();
    let controller = common::controller_with(dir.path(), mock.clone());

    let outcome = controller.run_translate(None).await.unwrap();

    assert!(matches!(outcome, TranslateOutcome::Written { .. }));
    let (_, records) = read_output(dir.path());
    assert_eq!(records.len(), 1);
    let keys: Vec<&str> = records[0].translation.keys().collect();
    assert_eq!(keys, vec!["Source"]);
    assert_eq!(records[0].translation.get("Source"), Some("Table of contents"));
    assert_eq!(mock.call_count(), 0);
}

/// A short header followed by a long passage yields one record for the passage
#[tokio::test]
async fn test_translate_headerPair_shouldTranslateContentOnly() {
    let dir = common::create_temp_dir().unwrap();
    let passage = common::long_passage();
    let input = serde_json::json!([{"text": "Chapter 1"}, {"text": passage}]);
    common::create_test_file(dir.path(), "batch.json", &input.to_string()).unwrap();
    let mock = common::translating_mock();
    let controller = common::controller_with(dir.path(), mock.clone());

    controller.run_translate(None).await.unwrap();

    let (_, records) = read_output(dir.path());
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].input.text, passage);
    assert_eq!(records[0].translation.len(), 6);

    let requests = mock.requests();
    assert_eq!(requests.len(), 5);
    assert!(requests.iter().all(|r| r.user == passage));
    assert!(requests.iter().all(|r| !r.user.contains("Chapter 1")));
}

/// Output keys follow the normalized sequence
#[tokio::test]
async fn test_translate_customSequence_shouldKeepKeyOrder() {
    let dir = common::create_temp_dir().unwrap();
    common::create_test_file(
        dir.path(),
        "batch.json",
        r#"{"sequence": ["Hindi", "english", "Klingon", "Tamil"], "items": [{"text": "Hello there"}]}"#,
    )
    .unwrap();
    let controller = common::controller_with(dir.path(), common::translating_mock());

    controller.run_translate(None).await.unwrap();

    let (raw, records) = read_output(dir.path());
    let keys: Vec<&str> = records[0].translation.keys().collect();
    assert_eq!(keys, vec!["Hindi", "Source", "Tamil", "Malayalam", "Kannada", "Telugu"]);

    // Key order survives serialization, and non-ASCII text is written literally
    let hindi = raw.find("\"Hindi\"").unwrap();
    let source = raw.find("\"Source\"").unwrap();
    let telugu = raw.find("\"Telugu\"").unwrap();
    assert!(hindi < source && source < telugu);
    assert!(raw.contains("ഇത് ഒരു വിവർത്തനമാണ്"));
    assert!(raw.contains("\n  {"));
}

/// Service failures are recorded per language and the batch still completes
#[tokio::test]
async fn test_translate_failingService_shouldRecordErrorValues() {
    let dir = common::create_temp_dir().unwrap();
    common::create_test_file(dir.path(), "batch.json", r#"[{"text": "One"}, {"text": "Two"}]"#).unwrap();
    let controller = common::controller_with(dir.path(), MockProvider::failing());

    controller.run_translate(None).await.unwrap();

    let (_, records) = read_output(dir.path());
    assert_eq!(records.len(), 2);
    for record in &records {
        for (key, value) in record.translation.iter() {
            if key == "Source" {
                assert_eq!(value, record.input.text);
            } else {
                assert!(value.starts_with("ERROR: "), "{} = {}", key, value);
            }
        }
    }
}

/// An echoing service gets one minimal retry per language and its answer is recorded
#[tokio::test]
async fn test_translate_echoingService_shouldRecordRetryAnswer() {
    let dir = common::create_temp_dir().unwrap();
    common::create_test_file(dir.path(), "batch.json", r#"[{"text": "Good night"}]"#).unwrap();
    let mock = MockProvider::echoing();
    let controller = common::controller_with(dir.path(), mock.clone());

    controller.run_translate(None).await.unwrap();

    let (_, records) = read_output(dir.path());
    for (key, value) in records[0].translation.iter() {
        if key != "Source" {
            assert_eq!(value, "[TRANSLATED] Translate only: Good night", "{}", key);
        }
    }

    // Full instruction then minimal prompt, for each of the five languages
    let requests = mock.requests();
    assert_eq!(requests.len(), 10);
    for pair in requests.chunks(2) {
        assert!(pair[0].system.is_some());
        assert_eq!(pair[1].system, None);
        assert_eq!(pair[1].user, "Translate only: Good night");
    }
}

/// Empty answers are kept empty and surface as QA findings
#[tokio::test]
async fn test_translate_emptyService_shouldFlagEmptyOutput() {
    let dir = common::create_temp_dir().unwrap();
    common::create_test_file(dir.path(), "batch.json", r#"[{"text": "Good night"}]"#).unwrap();
    let controller = common::controller_with(dir.path(), MockProvider::empty());

    controller.run_translate(None).await.unwrap();

    let (_, records) = read_output(dir.path());
    assert_eq!(records[0].translation.get("Hindi"), Some(""));
    let report = controller.run_qa(None).unwrap();
    assert_eq!(report.len(), 5);
    assert!(report.iter().all(|entry| entry.issues.contains(&IssueCode::EmptyOutput)));
}

/// Unknown item fields are preserved in the output
#[tokio::test]
async fn test_translate_extraItemFields_shouldRoundTrip() {
    let dir = common::create_temp_dir().unwrap();
    common::create_test_file(
        dir.path(),
        "batch.json",
        r#"[{"text": "Hello", "id": "p-7", "meta": {"translate": true, "chapter": 2}}]"#,
    )
    .unwrap();
    let controller = common::controller_with(dir.path(), common::translating_mock());

    controller.run_translate(None).await.unwrap();

    let (_, records) = read_output(dir.path());
    assert_eq!(records[0].input.extra.get("id"), Some(&serde_json::json!("p-7")));
    assert_eq!(records[0].input.meta.extra.get("chapter"), Some(&serde_json::json!(2)));
}

/// Without an input file a single built-in example is translated and nothing is written
#[tokio::test]
async fn test_translate_missingInput_shouldRunFallbackExample() {
    let dir = common::create_temp_dir().unwrap();
    let mock = common::translating_mock();
    let controller = common::controller_with(dir.path(), mock.clone());

    let outcome = controller.run_translate(None).await.unwrap();

    match outcome {
        TranslateOutcome::Fallback { record } => {
            assert_eq!(record.translation.len(), 6);
            assert_eq!(record.translation.get("Tamil"), Some("ഇത് ഒരു വിവർത്തനമാണ്"));
        }
        other => panic!("Expected fallback outcome, got {:?}", other),
    }
    assert!(!dir.path().join("batch_output.json").exists());
    assert_eq!(mock.call_count(), 5);
}

/// Malformed input is reported, not silently ignored
#[tokio::test]
async fn test_translate_malformedInput_shouldFail() {
    let dir = common::create_temp_dir().unwrap();
    common::create_test_file(dir.path(), "batch.json", "{ not json").unwrap();
    let controller = common::controller_with(dir.path(), common::translating_mock());

    assert!(controller.run_translate(None).await.is_err());
    assert!(!dir.path().join("batch_output.json").exists());
}
