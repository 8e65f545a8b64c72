/*!
 * Tests for file utility functions
 */

use std::fs;

use mtqa::errors::PipelineError;
use mtqa::file_utils::FileManager;
use mtqa::model::TranslationRecord;

use crate::common;

#[test]
fn test_fileExists_withFileAndDir_shouldDistinguish() {
    let dir = common::create_temp_dir().unwrap();
    let file = common::create_test_file(dir.path(), "a.txt", "x").unwrap();
    assert!(FileManager::file_exists(&file));
    assert!(!FileManager::file_exists(dir.path()));
    assert!(FileManager::dir_exists(dir.path()));
}

#[test]
fn test_readJson_malformed_shouldReportMalformedInput() {
    let dir = common::create_temp_dir().unwrap();
    let file = common::create_test_file(dir.path(), "batch_output.json", "{not json").unwrap();
    let err = FileManager::read_json::<Vec<TranslationRecord>, _>(&file).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PipelineError>(),
        Some(PipelineError::MalformedInput { .. })
    ));
}

#[test]
fn test_writeAtomic_existingFile_shouldReplaceContent() {
    let dir = common::create_temp_dir().unwrap();
    let file = common::create_test_file(dir.path(), "out.csv", "old").unwrap();
    FileManager::write_atomic(&file, b"new").unwrap();
    assert_eq!(fs::read_to_string(&file).unwrap(), "new");

    // No temp files left behind
    let entries = fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(entries, 1);
}
