/*!
 * Error types for the mtqa application.
 *
 * This module contains custom error types for the different parts of the
 * pipeline, using the thiserror crate for ergonomic error definitions.
 */

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when talking to the translation service
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),
}

/// Errors raised by the batch and scoring stages
#[derive(Error, Debug)]
pub enum PipelineError {
    /// An upstream artifact the stage depends on does not exist
    #[error("Required artifact not found: {}", .0.display())]
    MissingArtifact(PathBuf),

    /// An input document could not be interpreted
    #[error("Malformed input in {path}: {message}")]
    MalformedInput {
        /// File that failed to parse
        path: String,
        /// Parser diagnostic
        message: String,
    },

    /// Candidate and reference corpora do not line up
    #[error("Reference length ({references}) and candidate length ({candidates}) differ for {language}")]
    AlignmentMismatch {
        /// Language being scored
        language: String,
        /// Number of reference lines
        references: usize,
        /// Number of candidate lines
        candidates: usize,
    },

    /// A stage had nothing to work on
    #[error("Nothing to do: {0}")]
    NothingToDo(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the translation service
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from a pipeline stage
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
