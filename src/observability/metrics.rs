/// Prometheusメトリクス定義。
use std::sync::Arc;

use prometheus::{
    Encoder, Gauge, IntCounter, IntCounterVec, Registry, TextEncoder, opts,
    register_gauge_with_registry, register_int_counter_vec_with_registry,
    register_int_counter_with_registry,
};

use crate::classification::Category;
use crate::pipeline::evaluate::EvaluationScore;
use crate::pipeline::label::LabeledCorpus;

/// メトリクスコレクター。
#[derive(Debug, Clone)]
pub struct Metrics {
    registry: Arc<Registry>,

    // カウンター
    pub records_loaded: IntCounter,
    pub records_filtered: IntCounter,
    pub dates_unparseable: IntCounter,
    pub records_undated: IntCounter,
    pub records_by_model: IntCounterVec,
    pub records_by_institution: IntCounterVec,
    pub precondition_failures: IntCounterVec,

    // ゲージ
    pub model_diversity: Gauge,
    pub institution_diversity: Gauge,
    pub continuity_score: Gauge,
    pub implementation_score: Gauge,
}

impl Metrics {
    /// 新しいメトリクスコレクターを作成する。
    ///
    /// # Errors
    /// 同名のメトリクスが既に登録されている場合はエラーを返す。
    pub fn new(registry: Arc<Registry>) -> Result<Self, prometheus::Error> {
        Ok(Self {
            records_loaded: register_int_counter_with_registry!(
                "coop_records_loaded_total",
                "Total number of source records loaded",
                registry
            )?,
            records_filtered: register_int_counter_with_registry!(
                "coop_records_filtered_total",
                "Total number of records matching the cooperation predicate",
                registry
            )?,
            dates_unparseable: register_int_counter_with_registry!(
                "coop_dates_unparseable_total",
                "Total number of records whose date matched no accepted format",
                registry
            )?,
            records_undated: register_int_counter_with_registry!(
                "coop_filtered_records_undated_total",
                "Filtered records excluded from trend buckets because the date is absent",
                registry
            )?,
            records_by_model: register_int_counter_vec_with_registry!(
                opts!(
                    "coop_records_by_model_total",
                    "Labeled records per cooperation model"
                ),
                &["model"],
                registry
            )?,
            records_by_institution: register_int_counter_vec_with_registry!(
                opts!(
                    "coop_records_by_institution_total",
                    "Labeled records per institution type"
                ),
                &["institution"],
                registry
            )?,
            precondition_failures: register_int_counter_vec_with_registry!(
                opts!(
                    "coop_precondition_failures_total",
                    "Stages invoked before their inputs were produced"
                ),
                &["stage"],
                registry
            )?,
            model_diversity: register_gauge_with_registry!(
                "coop_model_diversity",
                "Shannon entropy of the cooperation model distribution",
                registry
            )?,
            institution_diversity: register_gauge_with_registry!(
                "coop_institution_diversity",
                "Shannon entropy of the institution type distribution",
                registry
            )?,
            continuity_score: register_gauge_with_registry!(
                "coop_continuity_score",
                "Clamped inverse coefficient of variation of monthly counts",
                registry
            )?,
            implementation_score: register_gauge_with_registry!(
                "coop_implementation_score",
                "Mean of diversity and continuity scores",
                registry
            )?,
            registry,
        })
    }

    pub(crate) fn record_labels(&self, labeled: &LabeledCorpus) {
        for row in &labeled.model_counts {
            self.records_by_model
                .with_label_values(&[row.category.key()])
                .inc_by(row.count as u64);
        }
        for row in &labeled.institution_counts {
            self.records_by_institution
                .with_label_values(&[row.category.key()])
                .inc_by(row.count as u64);
        }
    }

    pub(crate) fn record_evaluation(&self, score: &EvaluationScore) {
        self.model_diversity.set(score.model_diversity);
        self.institution_diversity.set(score.institution_diversity);
        self.continuity_score.set(score.continuity_score);
        self.implementation_score.set(score.implementation_score);
    }

    /// Prometheusテキスト形式でレンダリングする。
    #[must_use]
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).ok();
        String::from_utf8(buffer).unwrap_or_default()
    }
}
