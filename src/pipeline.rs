//! 協力ニュースの抽出・集計パイプライン。
//!
//! 読み込み → 日付正規化 → キーワード抽出 → 期間集計 → カテゴリ付与 → 評価 → 書き出し
//! の順にステージを実行する。各ステージの出力は不変で、`StageArtifacts` に保持される。

pub mod error;
pub mod evaluate;
pub mod export;
pub mod filter;
pub mod ingest;
pub mod label;
pub mod normalize;
pub mod orchestrator;
pub mod trend;

pub use error::{PipelineError, StageKind};
pub use evaluate::{EvaluateStage, EvaluationReport, EvaluationScore, RadarProfile};
pub use export::{ExportManifest, Exporter};
pub use filter::{FilterStage, FilteredCorpus};
pub use ingest::{Record, SourceLoader};
pub use label::{CategoryCount, LabelStage, LabeledCorpus, LabeledRecord};
pub use normalize::{NormalizeStage, NormalizedCorpus, NormalizedRecord, normalize_date};
pub use orchestrator::{PipelineBuilder, PipelineOrchestrator, PipelineReport, StageArtifacts};
pub use trend::{TrendBucket, TrendReport, TrendStage, YearMonth};
