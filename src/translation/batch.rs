/*!
 * Batch translation processing.
 *
 * Walks the input items in order, pairs short headers with the content that
 * follows them, translates every translatable item into each target
 * language of the sequence and collects one `TranslationRecord` per
 * processed item. Calls are strictly sequential: one item, one language,
 * one service call at a time.
 */

use anyhow::{Context, Result};
use log::{info, warn};
use std::path::Path;

use crate::file_utils::FileManager;
use crate::language::{LanguageSlot, SOURCE_KEY, Sequence};
use crate::model::{InputDocument, SourceItem, TranslationMap, TranslationRecord};
use crate::translation::invoker::TranslationInvoker;
use crate::translation::prompts::ExemplarStore;

/// An item shorter than this (in characters) may be a header
pub const HEADER_MAX_CHARS: usize = 80;

/// The following item must be more than this many characters longer than the header
pub const HEADER_MIN_GROWTH: usize = 20;

/// Text translated when no input file exists
pub const FALLBACK_TEXT: &str = "In the cacophonous theatre of our public discourse, nuance is routinely sacrificed at the altar of indignation, subtlety is throttled by the stranglehold of sensationalism, and reasoned dissent is caricatured as disloyalty by those who mistake decibel levels for intellectual depth.";

/// One step of the batch walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStep {
    /// Translate the item at this index on its own
    Single(usize),
    /// Echo the header verbatim and translate the content that follows it
    HeaderPair { header: usize, content: usize },
}

impl BatchStep {
    /// Index of the item that produces a record
    pub fn content_index(&self) -> usize {
        match self {
            Self::Single(index) => *index,
            Self::HeaderPair { content, .. } => *content,
        }
    }
}

/// Whether `current` is a bare header for `next`
pub fn is_header_pair(current: &SourceItem, next: &SourceItem) -> bool {
    let current_len = current.char_len();
    current_len < HEADER_MAX_CHARS && next.char_len() > current_len + HEADER_MIN_GROWTH
}

/// Plan the walk over `items`, advancing by two after a header pair
pub fn plan_steps(items: &[SourceItem]) -> Vec<BatchStep> {
    let mut steps = Vec::with_capacity(items.len());
    let mut i = 0;

    while i < items.len() {
        match items.get(i + 1) {
            Some(next) if is_header_pair(&items[i], next) => {
                steps.push(BatchStep::HeaderPair {
                    header: i,
                    content: i + 1,
                });
                i += 2;
            }
            _ => {
                steps.push(BatchStep::Single(i));
                i += 1;
            }
        }
    }

    steps
}

/// Read a batch input file into its sequence and items
pub fn read_input(path: &Path) -> Result<(Sequence, Vec<SourceItem>)> {
    let document: InputDocument = FileManager::read_json(path)?;
    let (sequence, items) = document.into_parts();
    info!(
        "Loaded {} items from {:?}, sequence: {}",
        items.len(),
        path,
        sequence.names().join(", ")
    );
    Ok((sequence, items))
}

/// Batch orchestrator
#[derive(Debug, Clone)]
pub struct BatchOrchestrator {
    invoker: TranslationInvoker,
    exemplars: ExemplarStore,
}

impl BatchOrchestrator {
    pub fn new(invoker: TranslationInvoker, exemplars: ExemplarStore) -> Self {
        Self { invoker, exemplars }
    }

    /// Translate one item into every target of the sequence
    ///
    /// Items flagged `translate: false` get a mapping holding only the source.
    pub async fn translate_item(&self, item: &SourceItem, sequence: &Sequence) -> TranslationMap {
        if !item.is_translatable() {
            return TranslationMap::source_only(&item.text);
        }

        let mut translation = TranslationMap::new();
        for slot in sequence.slots() {
            match slot {
                LanguageSlot::Source => translation.insert(SOURCE_KEY, item.text.as_str()),
                LanguageSlot::Target(language) => {
                    info!("Translating to {}...", language);
                    let exemplar = self.exemplars.exemplar_for(*language, &item.text);
                    let text = self.invoker.translate(*language, &item.text, exemplar.as_ref()).await;
                    translation.insert(language.name(), text);
                }
            }
        }
        translation
    }

    /// Walk the batch and produce the ordered records
    ///
    /// `progress` is called with (processed steps, total steps) after each step.
    pub async fn run(
        &self,
        items: &[SourceItem],
        sequence: &Sequence,
        progress: impl Fn(usize, usize),
    ) -> Vec<TranslationRecord> {
        let steps = plan_steps(items);
        let total = steps.len();
        let mut records = Vec::with_capacity(total);

        for (done, step) in steps.into_iter().enumerate() {
            if let BatchStep::HeaderPair { header, .. } = step {
                info!("{}", items[header].text);
            }

            let item = &items[step.content_index()];
            let translation = self.translate_item(item, sequence).await;
            trace_record(&translation, sequence);

            records.push(TranslationRecord {
                input: item.clone(),
                translation,
            });
            progress(done + 1, total);
        }

        records
    }

    /// Translate an input file and write all records to `output_path` in one go
    pub async fn run_file(
        &self,
        input_path: &Path,
        output_path: &Path,
        progress: impl Fn(usize, usize),
    ) -> Result<Vec<TranslationRecord>> {
        let (sequence, items) = read_input(input_path)?;
        if items.is_empty() {
            warn!("Input {:?} contains no items", input_path);
        }

        let records = self.run(&items, &sequence, progress).await;

        FileManager::write_json_atomic(output_path, &records)
            .with_context(|| format!("Failed to write batch output to {:?}", output_path))?;
        info!("Wrote {} records to {:?}", records.len(), output_path);

        Ok(records)
    }
}

fn trace_record(translation: &TranslationMap, sequence: &Sequence) {
    for slot in sequence.slots() {
        info!("[{}] {}", slot, translation.get(slot.key()).unwrap_or(""));
    }
}
