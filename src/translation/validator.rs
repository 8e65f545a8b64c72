/*!
 * Response validation and the single-retry state machine.
 *
 * A raw response is checked for echo: the model repeating the instruction
 * or the source instead of translating it. On echo the invoker sends one
 * minimal fallback request and accepts whatever comes back.
 *
 * ```text
 * Initial -> Sent -> Accepted
 *                 -> EchoDetected -> SentMinimal -> AcceptedFinal
 * ```
 *
 * `SentMinimal` only ever leads to `AcceptedFinal`, so there is never a
 * second retry.
 */

use crate::translation::normalizer::BULLET_MARKERS;

/// Literal instruction marker that betrays an echoed prompt
pub const ECHO_MARKER: &str = "text:";

/// State of one (item, language) invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationState {
    /// Nothing sent yet
    Initial,
    /// Full instruction and source sent, awaiting the response
    Sent,
    /// First response passed validation
    Accepted(String),
    /// First response looked like an echo
    EchoDetected(String),
    /// Minimal fallback prompt sent, awaiting the response
    SentMinimal,
    /// Fallback response, accepted without further checks
    AcceptedFinal(String),
}

/// Request the current state is waiting on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingRequest {
    /// Instruction on the system channel, source on the user channel
    Full,
    /// "Translate only: <source>" on the user channel alone
    Minimal,
}

impl ValidationState {
    /// Advance without a response (`Initial -> Sent`, `EchoDetected -> SentMinimal`)
    pub fn advance(self) -> Self {
        match self {
            Self::Initial => Self::Sent,
            Self::EchoDetected(_) => Self::SentMinimal,
            other => other,
        }
    }

    /// Feed the response to the pending request
    pub fn on_response(self, response: String, source: &str) -> Self {
        match self {
            Self::Sent => {
                if ResponseValidator::is_echo(&response, source) {
                    Self::EchoDetected(response)
                } else {
                    Self::Accepted(response)
                }
            }
            Self::SentMinimal => Self::AcceptedFinal(response),
            other => other,
        }
    }

    /// The request to issue in this state, if any
    pub fn pending_request(&self) -> Option<PendingRequest> {
        match self {
            Self::Sent => Some(PendingRequest::Full),
            Self::SentMinimal => Some(PendingRequest::Minimal),
            _ => None,
        }
    }

    /// Accepted raw output once a terminal state is reached
    pub fn accepted(&self) -> Option<&str> {
        match self {
            Self::Accepted(response) | Self::AcceptedFinal(response) => Some(response),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.accepted().is_some()
    }
}

/// Echo detection heuristics
///
/// Known false positives: a translation that legitimately keeps the source
/// verbatim (names, numbers) or starts a line with '*'. Known false
/// negatives: a paraphrased echo of the instruction.
pub struct ResponseValidator;

impl ResponseValidator {
    pub fn is_echo(response: &str, source: &str) -> bool {
        Self::has_marker(response) || Self::has_list_structure(response) || Self::contains_source(response, source)
    }

    fn has_marker(response: &str) -> bool {
        response.to_lowercase().contains(ECHO_MARKER)
    }

    fn has_list_structure(response: &str) -> bool {
        response
            .lines()
            .any(|line| line.trim_start().starts_with(BULLET_MARKERS))
    }

    fn contains_source(response: &str, source: &str) -> bool {
        let source = source.trim();
        !source.is_empty() && response.contains(source)
    }
}
