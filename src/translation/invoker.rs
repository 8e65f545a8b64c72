/*!
 * Per (item, language) invocation of the translation service.
 *
 * The invoker drives `ValidationState` against a `Provider`: it sends the
 * full instruction, validates the answer, retries once with the minimal
 * prompt on echo, and normalizes whatever is accepted. Service failures are
 * turned into an `ERROR: ...` string for that language only.
 */

use log::{error, info, warn};
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::language::TargetLanguage;
use crate::providers::{CompletionRequest, Provider};
use crate::translation::normalizer::OutputNormalizer;
use crate::translation::prompts::{PromptBuilder, StyleExemplar, is_single_short_sentence};
use crate::translation::validator::{PendingRequest, ValidationState};

/// Prefix of the value stored in place of a failed translation
pub const ERROR_PREFIX: &str = "ERROR:";

/// Result of a completed invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationOutcome {
    /// Accepted raw response, before normalization
    pub raw: String,
    /// Whether the minimal fallback prompt was used
    pub retried: bool,
}

/// Translation invoker
#[derive(Debug, Clone)]
pub struct TranslationInvoker {
    provider: Arc<dyn Provider>,
    prompts: PromptBuilder,
}

impl TranslationInvoker {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            provider,
            prompts: PromptBuilder::new(),
        }
    }

    /// Translate one source text, never failing
    ///
    /// Returns the normalized translation, or `ERROR: <message>` when the
    /// service failed on either attempt.
    pub async fn translate(
        &self,
        language: TargetLanguage,
        source: &str,
        exemplar: Option<&StyleExemplar>,
    ) -> String {
        match self.invoke(language, source, exemplar).await {
            Ok(outcome) => {
                let normalized = OutputNormalizer::normalize(&outcome.raw);
                info!(
                    "{}: {} chars{}",
                    language,
                    normalized.chars().count(),
                    if outcome.retried { " (after retry)" } else { "" }
                );
                normalized
            }
            Err(e) => {
                error!("{}: translation failed: {}", language, e);
                error_value(&e)
            }
        }
    }

    /// Run the validation state machine to a terminal state
    pub async fn invoke(
        &self,
        language: TargetLanguage,
        source: &str,
        exemplar: Option<&StyleExemplar>,
    ) -> Result<InvocationOutcome, ProviderError> {
        let instruction = self
            .prompts
            .build(language, is_single_short_sentence(source), exemplar);

        let mut state = ValidationState::Initial.advance();
        let mut retried = false;

        loop {
            if let Some(raw) = state.accepted() {
                return Ok(InvocationOutcome {
                    raw: raw.to_string(),
                    retried,
                });
            }

            state = match state.pending_request() {
                Some(PendingRequest::Full) => {
                    let request = CompletionRequest::with_system(instruction.as_str(), source);
                    let response = self.provider.complete(request).await?;
                    state.on_response(response, source)
                }
                Some(PendingRequest::Minimal) => {
                    retried = true;
                    let request = CompletionRequest::user_only(PromptBuilder::minimal(source));
                    let response = self.provider.complete(request).await?;
                    state.on_response(response, source)
                }
                None => {
                    if let ValidationState::EchoDetected(_) = state {
                        warn!("{}: echo detected, retrying with minimal prompt", language);
                    }
                    state.advance()
                }
            };
        }
    }
}

/// Value stored for a language whose invocation failed
pub fn error_value(error: &ProviderError) -> String {
    format!("{} {}", ERROR_PREFIX, error)
}

/// Whether a stored translation is a failure marker
pub fn is_error_value(text: &str) -> bool {
    text.starts_with(ERROR_PREFIX)
}
