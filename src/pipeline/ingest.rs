//! 区切りファイルからの記事読み込み。
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use serde::Deserialize;
use tracing::{info, warn};

use super::error::PipelineError;

/// 入力の 1 行。取り込み後は変更しない。
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "RawRecord")]
pub struct Record {
    pub title: String,
    pub body: String,
    pub date: String,
}

/// CSV 上の列。本文は `body` と `text` のどちらの列名でも受け付ける。
#[derive(Debug, Default, Deserialize)]
struct RawRecord {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    date: Option<String>,
}

impl From<RawRecord> for Record {
    fn from(raw: RawRecord) -> Self {
        // 両方の列がある場合は空でない `body` を優先する。
        let body = raw
            .body
            .filter(|body| !body.is_empty())
            .or(raw.text)
            .unwrap_or_default();
        Self {
            title: raw.title.unwrap_or_default(),
            body,
            date: raw.date.unwrap_or_default(),
        }
    }
}

impl Record {
    pub fn new(
        title: impl Into<String>,
        body: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            date: date.into(),
        }
    }
}

/// CSV を読み、`title` / `body`(`text`) / `date` 列を取り出す。
///
/// 欠けたセルは空文字列として扱う。`title` 列が無いデータは読めないものとみなす。
///
/// # Errors
/// ヘッダや行の解釈に失敗した場合はエラーを返す。
pub fn read_records<R: Read>(reader: R) -> anyhow::Result<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = reader.headers().context("failed to read header row")?;
    if !headers.iter().any(|header| header == "title") {
        return Err(anyhow!("missing `title` column"));
    }

    let mut records = Vec::new();
    for (index, row) in reader.deserialize::<Record>().enumerate() {
        let record = row.with_context(|| format!("failed to parse row {}", index + 1))?;
        records.push(record);
    }
    Ok(records)
}

/// ファイルパスから読み込む。
///
/// # Errors
/// 開けない・解釈できない場合は [`PipelineError::SourceUnreadable`] を返す。
pub fn load_records(path: &Path) -> Result<Vec<Record>, PipelineError> {
    let unreadable = |source: anyhow::Error| PipelineError::SourceUnreadable {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path)
        .with_context(|| format!("failed to open {}", path.display()))
        .map_err(unreadable)?;
    read_records(file).map_err(unreadable)
}

/// 主パスと予備パスを持つ入力ソース。
#[derive(Debug, Clone)]
pub struct SourceLoader {
    primary: PathBuf,
    fallback: Option<PathBuf>,
}

impl SourceLoader {
    pub fn new(primary: impl Into<PathBuf>, fallback: Option<PathBuf>) -> Self {
        Self {
            primary: primary.into(),
            fallback,
        }
    }

    /// 主パスを読み、失敗したら予備パスを試す。
    ///
    /// # Errors
    /// どちらも読めない場合は主パスの [`PipelineError::SourceUnreadable`] を返す。
    pub fn load(&self) -> Result<Vec<Record>, PipelineError> {
        match load_records(&self.primary) {
            Ok(records) => {
                info!(path = %self.primary.display(), records = records.len(), "loaded source records");
                Ok(records)
            }
            Err(primary_error) => {
                let Some(fallback) = &self.fallback else {
                    return Err(primary_error);
                };
                warn!(
                    path = %self.primary.display(),
                    error = ?primary_error,
                    fallback = %fallback.display(),
                    "primary source unreadable, trying fallback"
                );
                match load_records(fallback) {
                    Ok(records) => {
                        info!(path = %fallback.display(), records = records.len(), "loaded source records from fallback");
                        Ok(records)
                    }
                    Err(fallback_error) => {
                        warn!(error = ?fallback_error, "fallback source unreadable");
                        Err(primary_error)
                    }
                }
            }
        }
    }
}
