/*!
 * Provider implementations for the translation service.
 *
 * The service is an opaque text-in/text-out collaborator: it receives an
 * optional system instruction and a user text and answers with one string.
 * - Ollama: local LLM server over HTTP
 * - Mock: scripted provider for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// A single request to the translation service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    /// Instruction sent on the system channel, if any
    pub system: Option<String>,
    /// Text sent on the user channel
    pub user: String,
}

impl CompletionRequest {
    /// Request with both an instruction and a user text
    pub fn with_system(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: Some(system.into()),
            user: user.into(),
        }
    }

    /// Request with only a user text
    pub fn user_only(user: impl Into<String>) -> Self {
        Self {
            system: None,
            user: user.into(),
        }
    }
}

/// Common trait for all translation service backends
///
/// Calls are issued one at a time by the batch orchestrator; implementations
/// own their transport concerns (timeouts, connection reuse).
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Complete a request, returning the raw response text
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError>;

    /// Test the connection to the provider
    async fn test_connection(&self) -> Result<(), ProviderError>;
}

pub mod mock;
pub mod ollama;
