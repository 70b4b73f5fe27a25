use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// パイプラインのステージ。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    Load,
    Normalize,
    Filter,
    Trend,
    Label,
    Evaluate,
    Export,
}

impl StageKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Normalize => "normalize",
            Self::Filter => "filter",
            Self::Trend => "trend",
            Self::Label => "label",
            Self::Evaluate => "evaluate",
            Self::Export => "export",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// パイプラインの失敗。
///
/// 日付の解釈失敗はレコード単位で吸収されるため、ここには現れない。
#[derive(Debug, Error)]
pub enum PipelineError {
    /// 入力データが存在しない、または読めない。フィルタ前に停止する。
    #[error("source unreadable: {path}")]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
    /// 前段ステージが未完了。該当ステージのみ停止し、前段を実行すれば再試行できる。
    #[error("precondition not met: {stage} requires {missing} to complete first")]
    PreconditionNotMet {
        stage: StageKind,
        missing: StageKind,
    },
    #[error("failed to export {path}")]
    Export {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

impl PipelineError {
    #[must_use]
    pub fn precondition(stage: StageKind, missing: StageKind) -> Self {
        Self::PreconditionNotMet { stage, missing }
    }

    /// 失敗したステージ。
    #[must_use]
    pub fn stage(&self) -> StageKind {
        match self {
            Self::SourceUnreadable { .. } => StageKind::Load,
            Self::PreconditionNotMet { stage, .. } => *stage,
            Self::Export { .. } => StageKind::Export,
        }
    }
}
