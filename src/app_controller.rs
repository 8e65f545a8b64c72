use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::app_config::Config;
use crate::errors::PipelineError;
use crate::file_utils::FileManager;
use crate::language::Sequence;
use crate::model::{SourceItem, TranslationRecord};
use crate::providers::Provider;
use crate::providers::ollama::Ollama;
use crate::quality::merge::{HumanScoreRecord, SummaryRecord, merge_scores};
use crate::quality::qa::{QaReportEntry, batch_report};
use crate::quality::scoring::{AutoScore, RatedScore, ScoreRecord, automatic_scores, display_scores, load_references};
use crate::reports::{self, ScoreDisplayRow, rater_rows};
use crate::translation::batch::FALLBACK_TEXT;
use crate::translation::{BatchOrchestrator, ExemplarStore, TranslationInvoker};

// @module: Application controller for the pipeline stages

/// Result of the translate stage
#[derive(Debug, Clone, PartialEq)]
pub enum TranslateOutcome {
    /// The batch was translated and written
    Written {
        path: PathBuf,
        records: Vec<TranslationRecord>,
    },
    /// No input file: the built-in example was translated, nothing written
    Fallback { record: TranslationRecord },
}

/// Main application controller, one method per stage
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Translation service
    provider: Arc<dyn Provider>,
}

impl Controller {
    // @method: Create a new controller talking to the configured Ollama server
    pub fn with_config(config: Config) -> Result<Self> {
        let translation = &config.translation;
        let provider = Ollama::new(
            translation.endpoint.as_str(),
            translation.model.as_str(),
            translation.temperature,
            translation.timeout_secs,
        )
        .with_retries(translation.retry_count, translation.retry_backoff_ms);

        Ok(Self::with_provider(config, Arc::new(provider)))
    }

    /// Create a controller with an explicit translation service
    pub fn with_provider(config: Config, provider: Arc<dyn Provider>) -> Self {
        Self { config, provider }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn resolve(&self, explicit: Option<PathBuf>, default_name: &str) -> PathBuf {
        explicit.unwrap_or_else(|| self.config.artifact_path(default_name))
    }

    fn orchestrator(&self) -> BatchOrchestrator {
        let invoker = TranslationInvoker::new(Arc::clone(&self.provider));
        BatchOrchestrator::new(invoker, ExemplarStore::load(&self.config.refs_path()))
    }

    fn load_records(path: &Path) -> Result<Vec<TranslationRecord>> {
        FileManager::require_artifact(path)?;
        FileManager::read_json(path)
    }

    /// Translate the batch input into the batch output
    pub async fn run_translate(&self, input: Option<PathBuf>) -> Result<TranslateOutcome> {
        if let Err(e) = self.provider.test_connection().await {
            warn!("Translation service check failed: {}; failures will be recorded per language", e);
        }

        let input_path = self.resolve(input, &self.config.artifacts.batch_input);
        let orchestrator = self.orchestrator();

        if !FileManager::file_exists(&input_path) {
            warn!("No input found at {:?}, running single default example", input_path);
            let item = SourceItem::new(FALLBACK_TEXT);
            let translation = orchestrator.translate_item(&item, &Sequence::default()).await;
            return Ok(TranslateOutcome::Fallback {
                record: TranslationRecord {
                    input: item,
                    translation,
                },
            });
        }

        let output_path = self.config.artifact_path(&self.config.artifacts.batch_output);
        let progress_bar = ProgressBar::new(0);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} items ({percent}%) {eta}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("#>-"));

        let records = orchestrator
            .run_file(&input_path, &output_path, |done, total| {
                progress_bar.set_length(total as u64);
                progress_bar.set_position(done as u64);
            })
            .await?;
        progress_bar.finish_and_clear();

        Ok(TranslateOutcome::Written {
            path: output_path,
            records,
        })
    }

    /// QA report for every translation of the batch output
    pub fn run_qa(&self, batch_output: Option<PathBuf>) -> Result<Vec<QaReportEntry>> {
        let path = self.resolve(batch_output, &self.config.artifacts.batch_output);
        let records = Self::load_records(&path)?;
        Ok(batch_report(&records))
    }

    /// Strict BLEU/chrF per language, written as `lang,BLEU,chrF`
    pub fn run_evaluate(&self, batch_output: Option<PathBuf>) -> Result<Vec<AutoScore>> {
        let path = self.resolve(batch_output, &self.config.artifacts.batch_output);
        let records = Self::load_records(&path)?;
        let references = load_references(&self.config.refs_path());

        let scores = automatic_scores(&records, &references);
        if scores.is_empty() {
            warn!("No automatic scores computed.");
            return Ok(scores);
        }

        let out_path = self.config.artifact_path(&self.config.artifacts.auto_scores);
        reports::write_csv(&out_path, &scores)?;
        info!("Wrote {:?}", out_path);
        Ok(scores)
    }

    /// Add the chrF ordinal to the automatic scores
    pub fn run_map_scores(&self, auto_scores: Option<PathBuf>) -> Result<Vec<RatedScore>> {
        let path = self.resolve(auto_scores, &self.config.artifacts.auto_scores);
        FileManager::require_artifact(&path)?;

        let rated: Vec<RatedScore> = reports::read_csv::<AutoScore, _>(&path)?
            .into_iter()
            .map(RatedScore::from)
            .collect();

        let out_path = self.config.artifact_path(&self.config.artifacts.auto_scores_rated);
        reports::write_csv(&out_path, &rated)?;
        info!("Wrote {:?}", out_path);
        Ok(rated)
    }

    /// Full rubric per language, truncating mismatched corpora
    pub fn run_score_display(&self, batch_output: Option<PathBuf>) -> Result<Vec<ScoreRecord>> {
        let path = self.resolve(batch_output, &self.config.artifacts.batch_output);
        let records = Self::load_records(&path)?;
        let references = load_references(&self.config.refs_path());

        let scores = display_scores(&records, &references);
        let rows: Vec<ScoreDisplayRow> = scores.iter().map(ScoreDisplayRow::from).collect();

        let out_path = self.config.artifact_path(&self.config.artifacts.scoring_display);
        reports::write_csv(&out_path, &rows)?;
        info!("Wrote {:?}", out_path);

        for row in &rows {
            info!(
                "{}: meaning={} completeness={} fluency={} register={} metaphor={} grammar={} mean={} QA={}",
                row.language,
                row.meaning_1_5,
                row.completeness_1_5,
                row.fluency_1_5,
                row.register_1_5,
                row.metaphor_1_5,
                row.grammar_1_5,
                row.human_proxy_mean,
                row.qa_issues
            );
        }

        Ok(scores)
    }

    /// Outer join of rated automatic scores with human ratings
    ///
    /// Halts only when both inputs are missing.
    pub fn run_merge(&self, auto_rated: Option<PathBuf>) -> Result<Vec<SummaryRecord>> {
        let auto_path = self.resolve(auto_rated, &self.config.artifacts.auto_scores_rated);
        let human_path = self.config.artifact_path(&self.config.artifacts.human_scores);

        let auto_exists = FileManager::file_exists(&auto_path);
        let human_exists = FileManager::file_exists(&human_path);
        if !auto_exists && !human_exists {
            return Err(PipelineError::NothingToDo(format!(
                "no input score files found ({:?}, {:?})",
                auto_path, human_path
            ))
            .into());
        }

        let auto: Vec<RatedScore> = if auto_exists {
            reports::read_csv(&auto_path)?
        } else {
            warn!("{:?} not found, merging human ratings only", auto_path);
            Vec::new()
        };
        let human: Vec<HumanScoreRecord> = if human_exists {
            reports::read_csv(&human_path)?
        } else {
            warn!("{:?} not found, merging automatic scores only", human_path);
            Vec::new()
        };

        let merged = merge_scores(&auto, &human);
        let out_path = self.config.artifact_path(&self.config.artifacts.combined_summary);
        reports::write_csv(&out_path, &merged)?;
        info!("Wrote {:?}", out_path);
        Ok(merged)
    }

    /// Export (item, language) pairs for human raters
    pub fn run_export_human(&self, batch_output: Option<PathBuf>) -> Result<usize> {
        let path = self.resolve(batch_output, &self.config.artifacts.batch_output);
        let records = Self::load_records(&path)?;
        let references = load_references(&self.config.refs_path());

        let rows = rater_rows(&records, &references);
        let out_path = self.config.artifact_path(&self.config.artifacts.raters_export);
        reports::write_csv(&out_path, &rows)
            .with_context(|| format!("Failed to export rater sheet to {:?}", out_path))?;
        info!("Wrote {:?}", out_path);
        Ok(rows.len())
    }
}
