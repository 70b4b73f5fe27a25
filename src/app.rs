use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};

use crate::{
    classification::KeywordDictionary,
    config::Config,
    observability::Telemetry,
    pipeline::{ExportManifest, Exporter, PipelineError, PipelineOrchestrator, PipelineReport, SourceLoader},
    util::error::{classify_error, classify_unparseable_dates},
};

/// 1 回の実行結果。
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub report: PipelineReport,
    pub manifest: ExportManifest,
}

pub struct ComponentRegistry {
    config: Arc<Config>,
    telemetry: Telemetry,
    loader: SourceLoader,
    pipeline: PipelineOrchestrator,
    exporter: Exporter,
}

impl ComponentRegistry {
    /// 構成情報と依存をまとめて初期化する。
    ///
    /// # Errors
    /// Telemetry の初期化やキーワード辞書の読み込みが失敗した場合はエラーを返す。
    pub fn build(config: Config) -> Result<Self> {
        let telemetry = Telemetry::new()?;
        Self::with_telemetry(config, telemetry)
    }

    /// 初期化済みの Telemetry を使って構築する。
    ///
    /// # Errors
    /// キーワード辞書の読み込みが失敗した場合はエラーを返す。
    pub fn with_telemetry(config: Config, telemetry: Telemetry) -> Result<Self> {
        let config = Arc::new(config);
        let dictionary = match config.keywords_path() {
            Some(path) => {
                info!(path = %path.display(), "loading keyword overrides");
                KeywordDictionary::from_path(path)
                    .with_context(|| format!("failed to load keywords from {}", path.display()))?
            }
            None => KeywordDictionary::builtin(),
        };
        let dictionary = Arc::new(dictionary);

        let loader = SourceLoader::new(
            config.input_path().clone(),
            config.fallback_input_path().cloned(),
        );
        let pipeline = PipelineOrchestrator::builder(dictionary)
            .with_metrics(Arc::clone(telemetry.metrics()))
            .build();
        let exporter = Exporter::new(config.output_dir().clone());

        Ok(Self {
            config,
            telemetry,
            loader,
            pipeline,
            exporter,
        })
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    /// 読み込みから書き出しまでを一度実行する。
    ///
    /// # Errors
    /// 入力が読めない、ステージの前提が満たされない、または書き出しに失敗した場合はエラーを返す。
    pub fn run(&self) -> Result<RunSummary> {
        let summary = self.try_run().inspect_err(|err| {
            let kind = classify_error(err);
            error!(stage = %err.stage(), kind = ?kind, error = ?err, "pipeline halted");
        })?;
        Ok(summary)
    }

    fn try_run(&self) -> Result<RunSummary, PipelineError> {
        let records = self.loader.load()?;
        let report = self.pipeline.run_all(records)?;

        if let Some(kind) = classify_unparseable_dates(report.unparseable_dates) {
            info!(
                unparseable_dates = report.unparseable_dates,
                kind = ?kind,
                "records with unparseable dates were kept without a period"
            );
        }

        let metrics_text = self
            .config
            .write_metrics()
            .then(|| self.telemetry.render_prometheus());
        let manifest = self.exporter.export(
            &report.labeled,
            &report.trend,
            &report.evaluation,
            metrics_text.as_deref(),
        )?;

        info!(
            total_records = report.total_records,
            filtered = report.filtered.len(),
            implementation_score = report.evaluation.score.implementation_score,
            "pipeline completed"
        );
        Ok(RunSummary { report, manifest })
    }
}
