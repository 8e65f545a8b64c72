/*!
 * Common test utilities for the mtqa test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use mtqa::app_config::Config;
use mtqa::app_controller::Controller;
use mtqa::language::TargetLanguage;
use mtqa::providers::CompletionRequest;
use mtqa::providers::mock::MockProvider;

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Writes `refs/<language>.txt` with one reference per line
pub fn create_reference_file(dir: &Path, language: TargetLanguage, lines: &[&str]) -> Result<PathBuf> {
    let name = format!("refs/{}", language.reference_file_name());
    create_test_file(dir, &name, &lines.join("\n"))
}

/// Configuration rooted in a temporary working directory
pub fn test_config(dir: &Path) -> Config {
    Config {
        work_dir: dir.to_path_buf(),
        ..Config::default()
    }
}

/// Controller backed by the given mock
pub fn controller_with(dir: &Path, mock: MockProvider) -> Controller {
    Controller::with_provider(test_config(dir), Arc::new(mock))
}

/// Native-script answer that never contains the source text
pub fn native_answer(_request: &CompletionRequest) -> String {
    "ഇത് ഒരു വിവർത്തനമാണ്".to_string()
}

/// Mock that always answers with `native_answer`
pub fn translating_mock() -> MockProvider {
    MockProvider::working().with_custom_response(native_answer)
}

/// A passage long enough to pair with a short header
pub fn long_passage() -> String {
    "The river carried the stories of the village past the old temple, ".repeat(6)
}
