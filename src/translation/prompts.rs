/*!
 * Instruction construction for the translation service.
 *
 * The instruction is a fixed block of directives for the target language,
 * optionally followed by a register hint, a style exemplar and a
 * single-sentence constraint. The source text is never embedded: it travels
 * on the user channel so the model has nothing to quote back inside
 * explanatory text.
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;

use crate::file_utils::FileManager;
use crate::language::TargetLanguage;

/// Token the model is told to emit for spans it cannot translate
pub const ESCAPE_TOKEN: &str = "UNABLE_TO_TRANSLATE";

/// Longest source (in characters) that still counts as a single short sentence
pub const MAX_SINGLE_SENTENCE_CHARS: usize = 250;

/// Sentence boundary: terminal punctuation followed by whitespace or end of text
static SENTENCE_BOUNDARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?\x{0964}]+(?:\s|$)").unwrap());

/// Directive template for the translation instruction.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    /// The fixed directive block.
    pub const TRANSLATOR: &'static str = "Translate the user's text into {target_language}.
Preserve the full meaning, every metaphor and the rhetorical structure of the original.
Do not add explanations, transliterations, notes or any metadata.
Preserve the original punctuation.
Output only the translation and nothing else.
If a phrase cannot be translated, write {escape_token} in its place.";

    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    pub fn translator() -> Self {
        Self::new(Self::TRANSLATOR)
    }

    /// Render the template for a target language.
    pub fn render(&self, target_language: &str) -> String {
        self.template
            .replace("{target_language}", target_language)
            .replace("{escape_token}", ESCAPE_TOKEN)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::translator()
    }
}

/// Tone reference shown to the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleExemplar {
    /// A single reference line in the target language
    Line(String),
    /// The source's first sentence next to a reference line
    Paired { source: String, reference: String },
}

impl StyleExemplar {
    fn render(&self, language: TargetLanguage) -> String {
        let body = match self {
            Self::Line(line) => line.clone(),
            Self::Paired { source, reference } => {
                format!("Source: {}\n{}: {}", source, language.name(), reference)
            }
        };
        format!(
            "Style reference (do not copy verbatim, match tone only):\n{}",
            body
        )
    }
}

/// Builds the instruction for one (language, source) pair.
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    template: PromptTemplate,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the instruction text
    ///
    /// Pure function of its arguments: the same inputs always give the same
    /// instruction.
    pub fn build(
        &self,
        language: TargetLanguage,
        force_single_sentence: bool,
        style_example: Option<&StyleExemplar>,
    ) -> String {
        let mut sections = vec![self.template.render(language.name())];

        if let Some(hint) = language.profile().register_hint {
            sections.push(hint.to_string());
        }

        if let Some(exemplar) = style_example {
            sections.push(exemplar.render(language));
        }

        if force_single_sentence {
            sections.push("The source is a single sentence. Answer with exactly one sentence.".to_string());
        }

        sections.join("\n\n")
    }

    /// Fallback prompt used for the single retry, sent without instruction
    pub fn minimal(source_text: &str) -> String {
        format!("Translate only: {}", source_text)
    }
}

/// Whether the source is one short sentence
pub fn is_single_short_sentence(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.chars().count() <= MAX_SINGLE_SENTENCE_CHARS && SENTENCE_BOUNDARY.find_iter(trimmed).count() <= 1
}

/// First sentence of a text, terminator included
pub fn first_sentence(text: &str) -> &str {
    let trimmed = text.trim();
    match SENTENCE_BOUNDARY.find(trimmed) {
        Some(m) => trimmed[..m.end()].trim_end(),
        None => trimmed,
    }
}

/// First non-empty line of every available reference file
#[derive(Debug, Clone, Default)]
pub struct ExemplarStore {
    first_lines: HashMap<TargetLanguage, String>,
}

impl ExemplarStore {
    /// Load exemplars from `refs_dir/<language>.txt`; missing files are skipped
    pub fn load(refs_dir: &Path) -> Self {
        let mut first_lines = HashMap::new();
        for language in TargetLanguage::ALL {
            let path = refs_dir.join(language.reference_file_name());
            match FileManager::read_reference_lines(&path) {
                Ok(lines) => {
                    if let Some(first) = lines.into_iter().next() {
                        first_lines.insert(language, first);
                    }
                }
                Err(_) => debug!("No style exemplar for {} at {:?}", language, path),
            }
        }
        Self { first_lines }
    }

    /// Build a store from in-memory lines
    pub fn from_lines(lines: impl IntoIterator<Item = (TargetLanguage, String)>) -> Self {
        Self {
            first_lines: lines.into_iter().collect(),
        }
    }

    /// Exemplar for a language, paired with the source's first sentence where
    /// the language profile asks for it
    pub fn exemplar_for(&self, language: TargetLanguage, source_text: &str) -> Option<StyleExemplar> {
        let reference = self.first_lines.get(&language)?.clone();
        if language.profile().paired_exemplar {
            Some(StyleExemplar::Paired {
                source: first_sentence(source_text).to_string(),
                reference,
            })
        } else {
            Some(StyleExemplar::Line(reference))
        }
    }
}
