/// エラー分類ユーティリティ。
use crate::pipeline::error::PipelineError;

/// エラーの種類。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 実行全体を止めるエラー（入力が読めない、書き出せないなど）
    Fatal,
    /// 該当ステージのみ停止するエラー（前段が未完了など）。前段を実行すれば再試行できる
    StageHalted,
    /// レコード単位で吸収されるエラー（日付の解釈失敗など）
    Absorbed,
}

/// パイプラインエラーを分類する。
///
/// 自動リトライは行わない。分類結果に応じて呼び出し側が停止か継続かを決める。
#[must_use]
pub fn classify_error(error: &PipelineError) -> ErrorKind {
    match error {
        PipelineError::SourceUnreadable { .. } | PipelineError::Export { .. } => ErrorKind::Fatal,
        PipelineError::PreconditionNotMet { .. } => ErrorKind::StageHalted,
    }
}

/// 日付の解釈失敗は `Option` で表現され、エラー値にはならない。
/// レコード単位で吸収される失敗の件数をまとめて分類するときに使う。
#[must_use]
pub fn classify_unparseable_dates(count: usize) -> Option<ErrorKind> {
    (count > 0).then_some(ErrorKind::Absorbed)
}

/// エラーが致命的かどうかを判定する。
#[must_use]
pub fn is_fatal(error: &PipelineError) -> bool {
    matches!(classify_error(error), ErrorKind::Fatal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::error::StageKind;
    use anyhow::anyhow;

    #[test]
    fn unreadable_source_is_fatal() {
        let error = PipelineError::SourceUnreadable {
            path: "missing.csv".into(),
            source: anyhow!("not found"),
        };
        assert!(is_fatal(&error));
    }

    #[test]
    fn precondition_halts_only_the_stage() {
        let error = PipelineError::precondition(StageKind::Evaluate, StageKind::Label);
        assert_eq!(classify_error(&error), ErrorKind::StageHalted);
        assert!(!is_fatal(&error));
    }

    #[test]
    fn unparseable_dates_are_absorbed() {
        assert_eq!(classify_unparseable_dates(0), None);
        assert_eq!(classify_unparseable_dates(3), Some(ErrorKind::Absorbed));
    }
}
