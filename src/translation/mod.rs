/*!
 * Translation orchestration.
 *
 * This module turns source items into per-language renditions. It is split
 * into several submodules:
 *
 * - `prompts`: Instruction construction and style exemplars
 * - `validator`: Echo detection and the single-retry state machine
 * - `invoker`: Per (item, language) calls to the translation service
 * - `normalizer`: Cleanup of raw model output
 * - `batch`: Batch walk, header pairing and output assembly
 */

// Re-export main types for easier usage
pub use self::batch::BatchOrchestrator;
pub use self::invoker::TranslationInvoker;
pub use self::normalizer::OutputNormalizer;
pub use self::prompts::{ExemplarStore, PromptBuilder, StyleExemplar};
pub use self::validator::{ResponseValidator, ValidationState};

// Submodules
pub mod batch;
pub mod invoker;
pub mod normalizer;
pub mod prompts;
pub mod validator;
