/*!
 * Tests for prompt construction, echo validation, output cleanup and the invoker
 */

use std::sync::Arc;

use mtqa::language::TargetLanguage;
use mtqa::providers::mock::MockProvider;
use mtqa::translation::prompts::{ESCAPE_TOKEN, is_single_short_sentence};
use mtqa::translation::validator::PendingRequest;
use mtqa::translation::{
    ExemplarStore, OutputNormalizer, PromptBuilder, ResponseValidator, StyleExemplar, TranslationInvoker,
    ValidationState,
};

/// Same inputs always give the same instruction
#[test]
fn test_promptBuilder_build_sameInputs_shouldBeDeterministic() {
    let builder = PromptBuilder::new();
    let exemplar = StyleExemplar::Line("ஒரு வரி".to_string());

    let first = builder.build(TargetLanguage::Tamil, true, Some(&exemplar));
    let second = builder.build(TargetLanguage::Tamil, true, Some(&exemplar));

    assert_eq!(first, second);
    assert!(first.contains("Tamil"));
    assert!(first.contains(ESCAPE_TOKEN));
    assert!(first.contains("ஒரு வரி"));
}

#[test]
fn test_promptBuilder_build_withoutExemplar_shouldOmitStyleSection() {
    let text = PromptBuilder::new().build(TargetLanguage::Hindi, false, None);
    assert!(!text.contains("Style reference"));
    assert!(!text.contains("single sentence"));
}

#[test]
fn test_promptBuilder_minimal_shouldWrapSource() {
    assert_eq!(PromptBuilder::minimal("Good morning"), "Translate only: Good morning");
}

#[test]
fn test_isSingleShortSentence_shouldRespectLengthAndBoundaries() {
    assert!(is_single_short_sentence("The sky is blue."));
    assert!(!is_single_short_sentence("The sky is blue. The sea is green."));
    assert!(!is_single_short_sentence(&"word ".repeat(60)));
}

#[test]
fn test_exemplarStore_pairedLanguage_shouldPairFirstSentence() {
    let store = ExemplarStore::from_lines(vec![
        (TargetLanguage::Malayalam, "ആകാശം നീലയാണ്.".to_string()),
        (TargetLanguage::Hindi, "आकाश नीला है।".to_string()),
    ]);

    match store.exemplar_for(TargetLanguage::Malayalam, "The sky is blue. It is late.") {
        Some(StyleExemplar::Paired { source, reference }) => {
            assert_eq!(source, "The sky is blue.");
            assert_eq!(reference, "ആകാശം നീലയാണ്.");
        }
        other => panic!("Expected paired exemplar, got {:?}", other),
    }
    assert!(matches!(
        store.exemplar_for(TargetLanguage::Hindi, "The sky is blue."),
        Some(StyleExemplar::Line(_))
    ));
    assert!(store.exemplar_for(TargetLanguage::Tamil, "anything").is_none());
}

#[test]
fn test_responseValidator_isEcho_shouldFlagEchoShapes() {
    assert!(ResponseValidator::is_echo("Text: Hello world", "Hello world"));
    assert!(ResponseValidator::is_echo("- ഒന്ന്\n- രണ്ട്", "One two"));
    assert!(ResponseValidator::is_echo("Hello world ഹലോ", "Hello world"));
    assert!(!ResponseValidator::is_echo("ഹലോ ലോകം", "Hello world"));
}

#[test]
fn test_validationState_echoPath_shouldRetryExactlyOnce() {
    let state = ValidationState::Initial.advance();
    assert_eq!(state.pending_request(), Some(PendingRequest::Full));

    let state = state.on_response("text: Hi".to_string(), "Hi");
    assert!(matches!(state, ValidationState::EchoDetected(_)));
    assert!(!state.is_terminal());

    let state = state.advance();
    assert_eq!(state.pending_request(), Some(PendingRequest::Minimal));

    // The fallback answer is accepted even if it still looks like an echo
    let state = state.on_response("text: Hi".to_string(), "Hi");
    assert_eq!(state, ValidationState::AcceptedFinal("text: Hi".to_string()));
    assert_eq!(state.pending_request(), None);
}

#[test]
fn test_outputNormalizer_normalize_shouldDropResidueAndCollapse() {
    let raw = "Text: here you go\nUse formal tone\n- bullet\nനല്ല നല്ല നല്ല ദിവസം";
    assert_eq!(OutputNormalizer::normalize(raw), "നല്ല ദിവസം");
}

#[test]
fn test_outputNormalizer_normalize_allLinesFiltered_shouldFallBackToRaw() {
    assert_eq!(OutputNormalizer::normalize("  - only a bullet  "), "- only a bullet");
}

#[test]
fn test_outputNormalizer_normalize_isIdempotent() {
    let inputs = [
        "abc abc abc xyz",
        "red fox red fox jumps",
        "Text: x\nശരി ശരി",
        "plain sentence without repeats",
        "ഒന്നാം വരി.\nരണ്ടാം വരി.",
    ];
    for input in inputs {
        let once = OutputNormalizer::normalize(input);
        assert_eq!(OutputNormalizer::normalize(&once), once, "input: {}", input);
    }
}

#[test]
fn test_outputNormalizer_normalize_cleanMultiLine_shouldReturnTrimmedInput() {
    let clean = "\n  ഒന്നാം വരി.\n\tരണ്ടാം വരി.\nമൂന്നാം വരി.  \n";
    assert_eq!(OutputNormalizer::normalize(clean), clean.trim());
}

#[tokio::test]
async fn test_invoker_translate_echoThenAnswer_shouldUseMinimalPrompt() {
    let mock = Arc::new(MockProvider::scripted(vec![
        Ok("Text: Good night".to_string()),
        Ok("ശുഭരാത്രി".to_string()),
    ]));
    let invoker = TranslationInvoker::new(mock.clone());

    let text = invoker.translate(TargetLanguage::Malayalam, "Good night", None).await;

    assert_eq!(text, "ശുഭരാത്രി");
    let requests = mock.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].system.is_some());
    assert_eq!(requests[0].user, "Good night");
    assert_eq!(requests[1].system, None);
    assert_eq!(requests[1].user, "Translate only: Good night");
}

#[tokio::test]
async fn test_invoker_translate_serviceError_shouldReturnErrorValue() {
    let mock = Arc::new(MockProvider::failing());
    let invoker = TranslationInvoker::new(mock.clone());

    let text = invoker.translate(TargetLanguage::Telugu, "Good night", None).await;

    assert!(text.starts_with("ERROR: "));
    assert!(text.contains("Simulated connection failure"));
    assert_eq!(mock.call_count(), 1);
}

#[tokio::test]
async fn test_invoker_translate_retryFails_shouldReturnErrorValue() {
    let mock = Arc::new(MockProvider::scripted(vec![
        Ok("Text: Good night".to_string()),
        Err("model unloaded".to_string()),
    ]));
    let invoker = TranslationInvoker::new(mock.clone());

    let text = invoker.translate(TargetLanguage::Kannada, "Good night", None).await;

    assert!(text.starts_with("ERROR: "));
    assert!(text.contains("model unloaded"));
    assert_eq!(mock.call_count(), 2);
}
