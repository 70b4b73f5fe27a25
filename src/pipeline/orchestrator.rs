//! Pipeline orchestrator and builder for the cooperation pipeline.

use std::sync::Arc;

use tracing::{info, warn};

use crate::classification::KeywordDictionary;
use crate::observability::metrics::Metrics;

use super::error::{PipelineError, StageKind};
use super::evaluate::{EntropyEvaluateStage, EvaluateStage, EvaluationReport};
use super::filter::{FilterStage, FilteredCorpus, KeywordFilterStage};
use super::ingest::Record;
use super::label::{KeywordLabelStage, LabelStage, LabeledCorpus};
use super::normalize::{NormalizeStage, NormalizedCorpus, TextNormalizeStage};
use super::trend::{CalendarTrendStage, TrendReport, TrendStage};

/// 各ステージの出力。一度作られた出力は変更せず、新しい値を足した `StageArtifacts` を返す。
#[derive(Debug, Clone, Default)]
pub struct StageArtifacts {
    records: Option<Arc<Vec<Record>>>,
    normalized: Option<Arc<NormalizedCorpus>>,
    filtered: Option<Arc<FilteredCorpus>>,
    trend: Option<Arc<TrendReport>>,
    labeled: Option<Arc<LabeledCorpus>>,
    evaluation: Option<Arc<EvaluationReport>>,
}

impl StageArtifacts {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_records(mut self, records: Vec<Record>) -> Self {
        self.records = Some(Arc::new(records));
        self
    }

    #[must_use]
    pub fn with_normalized(mut self, corpus: Arc<NormalizedCorpus>) -> Self {
        self.normalized = Some(corpus);
        self
    }

    #[must_use]
    pub fn with_filtered(mut self, corpus: Arc<FilteredCorpus>) -> Self {
        self.filtered = Some(corpus);
        self
    }

    #[must_use]
    pub fn with_trend(mut self, trend: Arc<TrendReport>) -> Self {
        self.trend = Some(trend);
        self
    }

    #[must_use]
    pub fn with_labeled(mut self, corpus: Arc<LabeledCorpus>) -> Self {
        self.labeled = Some(corpus);
        self
    }

    #[must_use]
    pub fn with_evaluation(mut self, evaluation: Arc<EvaluationReport>) -> Self {
        self.evaluation = Some(evaluation);
        self
    }

    #[must_use]
    pub fn records(&self) -> Option<&Arc<Vec<Record>>> {
        self.records.as_ref()
    }

    #[must_use]
    pub fn normalized(&self) -> Option<&Arc<NormalizedCorpus>> {
        self.normalized.as_ref()
    }

    #[must_use]
    pub fn filtered(&self) -> Option<&Arc<FilteredCorpus>> {
        self.filtered.as_ref()
    }

    #[must_use]
    pub fn trend(&self) -> Option<&Arc<TrendReport>> {
        self.trend.as_ref()
    }

    #[must_use]
    pub fn labeled(&self) -> Option<&Arc<LabeledCorpus>> {
        self.labeled.as_ref()
    }

    #[must_use]
    pub fn evaluation(&self) -> Option<&Arc<EvaluationReport>> {
        self.evaluation.as_ref()
    }
}

/// 全ステージ完了後の結果。
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub total_records: usize,
    pub unparseable_dates: usize,
    pub filtered: Arc<FilteredCorpus>,
    pub trend: Arc<TrendReport>,
    pub labeled: Arc<LabeledCorpus>,
    pub evaluation: Arc<EvaluationReport>,
}

/// Container for all pipeline stages.
pub(crate) struct PipelineStages {
    normalize: Arc<dyn NormalizeStage>,
    filter: Arc<dyn FilterStage>,
    trend: Arc<dyn TrendStage>,
    label: Arc<dyn LabelStage>,
    evaluate: Arc<dyn EvaluateStage>,
}

/// Core pipeline orchestrator that coordinates all stages.
pub struct PipelineOrchestrator {
    stages: PipelineStages,
    metrics: Option<Arc<Metrics>>,
}

impl PipelineOrchestrator {
    /// Create an orchestrator with the default keyword-driven stages.
    #[must_use]
    pub fn new(dictionary: Arc<KeywordDictionary>) -> Self {
        PipelineBuilder::new(dictionary).build()
    }

    #[must_use]
    pub fn builder(dictionary: Arc<KeywordDictionary>) -> PipelineBuilder {
        PipelineBuilder::new(dictionary)
    }

    /// # Errors
    /// 入力レコードが未設定の場合は [`PipelineError::PreconditionNotMet`] を返す。
    pub fn run_normalize(
        &self,
        artifacts: &StageArtifacts,
    ) -> Result<Arc<NormalizedCorpus>, PipelineError> {
        let records = self.require(artifacts.records(), StageKind::Normalize, StageKind::Load)?;
        let corpus = self.stages.normalize.normalize(records);
        if let Some(metrics) = &self.metrics {
            metrics.records_loaded.inc_by(records.len() as u64);
            metrics.dates_unparseable.inc_by(corpus.unparseable_dates as u64);
        }
        info!(
            records = corpus.records.len(),
            unparseable_dates = corpus.unparseable_dates,
            "normalized records"
        );
        Ok(Arc::new(corpus))
    }

    /// # Errors
    /// 正規化が未完了の場合は [`PipelineError::PreconditionNotMet`] を返す。
    pub fn run_filter(
        &self,
        artifacts: &StageArtifacts,
    ) -> Result<Arc<FilteredCorpus>, PipelineError> {
        let normalized =
            self.require(artifacts.normalized(), StageKind::Filter, StageKind::Normalize)?;
        let filtered = self.stages.filter.filter(normalized);
        if let Some(metrics) = &self.metrics {
            metrics.records_filtered.inc_by(filtered.len() as u64);
        }
        info!(
            input = normalized.records.len(),
            matched = filtered.len(),
            undated = filtered.undated(),
            "filtered cooperation records"
        );
        Ok(Arc::new(filtered))
    }

    /// # Errors
    /// 抽出が未完了の場合は [`PipelineError::PreconditionNotMet`] を返す。
    pub fn run_trend(&self, artifacts: &StageArtifacts) -> Result<Arc<TrendReport>, PipelineError> {
        let filtered = self.require(artifacts.filtered(), StageKind::Trend, StageKind::Filter)?;
        let trend = self.stages.trend.aggregate(filtered);
        if let Some(metrics) = &self.metrics {
            metrics.records_undated.inc_by(trend.undated as u64);
        }
        info!(
            months = trend.monthly.len(),
            years = trend.yearly.len(),
            undated = trend.undated,
            "aggregated trend buckets"
        );
        Ok(Arc::new(trend))
    }

    /// # Errors
    /// 抽出が未完了の場合は [`PipelineError::PreconditionNotMet`] を返す。
    pub fn run_label(
        &self,
        artifacts: &StageArtifacts,
    ) -> Result<Arc<LabeledCorpus>, PipelineError> {
        let filtered = self.require(artifacts.filtered(), StageKind::Label, StageKind::Filter)?;
        let labeled = self.stages.label.label(filtered);
        if let Some(metrics) = &self.metrics {
            metrics.record_labels(&labeled);
        }
        info!(
            records = labeled.len(),
            models = labeled.model_counts.len(),
            institution_types = labeled.institution_counts.len(),
            "labeled cooperation records"
        );
        Ok(Arc::new(labeled))
    }

    /// # Errors
    /// ラベル付けまたはトレンド集計が未完了の場合は [`PipelineError::PreconditionNotMet`] を返す。
    pub fn run_evaluate(
        &self,
        artifacts: &StageArtifacts,
    ) -> Result<Arc<EvaluationReport>, PipelineError> {
        let labeled = self.require(artifacts.labeled(), StageKind::Evaluate, StageKind::Label)?;
        let trend = self.require(artifacts.trend(), StageKind::Evaluate, StageKind::Trend)?;
        let evaluation = self.stages.evaluate.evaluate(labeled, trend);
        if let Some(metrics) = &self.metrics {
            metrics.record_evaluation(&evaluation.score);
        }
        info!(
            model_diversity = evaluation.score.model_diversity,
            institution_diversity = evaluation.score.institution_diversity,
            continuity_score = evaluation.score.continuity_score,
            implementation_score = evaluation.score.implementation_score,
            "evaluated implementation"
        );
        Ok(Arc::new(evaluation))
    }

    /// 読み込み済みレコードから全ステージを順に実行する。
    ///
    /// # Errors
    /// いずれかのステージの前提が満たされない場合はエラーを返す。
    pub fn run_all(&self, records: Vec<Record>) -> Result<PipelineReport, PipelineError> {
        let total_records = records.len();
        let artifacts = StageArtifacts::new().with_records(records);

        let normalized = self.run_normalize(&artifacts)?;
        let unparseable_dates = normalized.unparseable_dates;
        let artifacts = artifacts.with_normalized(normalized);

        let filtered = self.run_filter(&artifacts)?;
        let artifacts = artifacts.with_filtered(Arc::clone(&filtered));

        let trend = self.run_trend(&artifacts)?;
        let artifacts = artifacts.with_trend(Arc::clone(&trend));

        let labeled = self.run_label(&artifacts)?;
        let artifacts = artifacts.with_labeled(Arc::clone(&labeled));

        let evaluation = self.run_evaluate(&artifacts)?;

        Ok(PipelineReport {
            total_records,
            unparseable_dates,
            filtered,
            trend,
            labeled,
            evaluation,
        })
    }

    fn require<'a, T>(
        &self,
        input: Option<&'a Arc<T>>,
        stage: StageKind,
        missing: StageKind,
    ) -> Result<&'a T, PipelineError> {
        match input {
            Some(value) => Ok(value.as_ref()),
            None => {
                warn!(%stage, %missing, "stage invoked before its input was produced");
                if let Some(metrics) = &self.metrics {
                    metrics
                        .precondition_failures
                        .with_label_values(&[stage.as_str()])
                        .inc();
                }
                Err(PipelineError::precondition(stage, missing))
            }
        }
    }
}

/// Builder pattern for constructing `PipelineOrchestrator`.
pub struct PipelineBuilder {
    dictionary: Arc<KeywordDictionary>,
    normalize: Option<Arc<dyn NormalizeStage>>,
    filter: Option<Arc<dyn FilterStage>>,
    trend: Option<Arc<dyn TrendStage>>,
    label: Option<Arc<dyn LabelStage>>,
    evaluate: Option<Arc<dyn EvaluateStage>>,
    metrics: Option<Arc<Metrics>>,
}

impl PipelineBuilder {
    #[must_use]
    pub fn new(dictionary: Arc<KeywordDictionary>) -> Self {
        Self {
            dictionary,
            normalize: None,
            filter: None,
            trend: None,
            label: None,
            evaluate: None,
            metrics: None,
        }
    }

    #[must_use]
    pub fn with_normalize_stage(mut self, stage: Arc<dyn NormalizeStage>) -> Self {
        self.normalize = Some(stage);
        self
    }

    #[must_use]
    pub fn with_filter_stage(mut self, stage: Arc<dyn FilterStage>) -> Self {
        self.filter = Some(stage);
        self
    }

    #[must_use]
    pub fn with_trend_stage(mut self, stage: Arc<dyn TrendStage>) -> Self {
        self.trend = Some(stage);
        self
    }

    #[must_use]
    pub fn with_label_stage(mut self, stage: Arc<dyn LabelStage>) -> Self {
        self.label = Some(stage);
        self
    }

    #[must_use]
    pub fn with_evaluate_stage(mut self, stage: Arc<dyn EvaluateStage>) -> Self {
        self.evaluate = Some(stage);
        self
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    #[must_use]
    pub fn build(self) -> PipelineOrchestrator {
        let dictionary = self.dictionary;
        let stages = PipelineStages {
            normalize: self
                .normalize
                .unwrap_or_else(|| Arc::new(TextNormalizeStage::new())),
            filter: self
                .filter
                .unwrap_or_else(|| Arc::new(KeywordFilterStage::new(Arc::clone(&dictionary)))),
            trend: self
                .trend
                .unwrap_or_else(|| Arc::new(CalendarTrendStage::new())),
            label: self
                .label
                .unwrap_or_else(|| Arc::new(KeywordLabelStage::new(Arc::clone(&dictionary)))),
            evaluate: self
                .evaluate
                .unwrap_or_else(|| Arc::new(EntropyEvaluateStage::new())),
        };
        PipelineOrchestrator {
            stages,
            metrics: self.metrics,
        }
    }
}
