//! 結果テーブルの書き出し。
use std::fmt::Display;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Datelike;
use serde::Serialize;
use tracing::info;

use crate::classification::Category;

use super::error::PipelineError;
use super::evaluate::EvaluationReport;
use super::label::{CategoryCount, LabeledCorpus};
use super::trend::{TrendBucket, TrendReport, YearMonth};

/// 表計算ソフトが UTF-8 と認識するための BOM。
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub const FILTERED_DATA_FILE: &str = "filtered_cooperation_data.csv";
pub const MONTHLY_TREND_FILE: &str = "monthly_trend.csv";
pub const YEARLY_TREND_FILE: &str = "yearly_trend.csv";
pub const MODEL_COUNTS_FILE: &str = "cooperation_model_counts.csv";
pub const INSTITUTION_COUNTS_FILE: &str = "institution_type_counts.csv";
pub const EVALUATION_FILE: &str = "evaluation.json";
pub const METRICS_FILE: &str = "metrics.prom";

const LABELED_HEADER: &[&str] = &[
    "title",
    "body",
    "date",
    "year_month",
    "year",
    "cooperation_model",
    "institution_type",
];
const PERIOD_HEADER: &[&str] = &["period", "count"];
const CATEGORY_HEADER: &[&str] = &["category", "count"];

#[derive(Debug, Serialize)]
struct LabeledRow<'a> {
    title: &'a str,
    body: &'a str,
    date: String,
    year_month: String,
    year: String,
    cooperation_model: &'static str,
    institution_type: &'static str,
}

#[derive(Debug, Serialize)]
struct PeriodRow {
    period: String,
    count: usize,
}

#[derive(Debug, Serialize)]
struct CategoryRow {
    category: &'static str,
    count: usize,
}

/// 書き出したファイルの一覧。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportManifest {
    pub files: Vec<PathBuf>,
}

/// 出力ディレクトリへ CSV / JSON を書き出す。
#[derive(Debug, Clone)]
pub struct Exporter {
    output_dir: PathBuf,
}

impl Exporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// # Errors
    /// ディレクトリ作成や書き込みに失敗した場合は [`PipelineError::Export`] を返す。
    pub fn export(
        &self,
        labeled: &LabeledCorpus,
        trend: &TrendReport,
        evaluation: &EvaluationReport,
        metrics_text: Option<&str>,
    ) -> Result<ExportManifest, PipelineError> {
        fs::create_dir_all(&self.output_dir).map_err(|source| PipelineError::Export {
            path: self.output_dir.clone(),
            source: source.into(),
        })?;

        let mut manifest = ExportManifest::default();

        let path = self.output_dir.join(FILTERED_DATA_FILE);
        write_csv(&path, LABELED_HEADER, labeled.records.iter().map(|labeled_record| {
            let record = &labeled_record.record;
            LabeledRow {
                title: &record.title,
                body: &record.body,
                date: render_optional(record.date.map(|d| d.format("%Y-%m-%d"))),
                year_month: render_optional(record.date.map(YearMonth::from)),
                year: render_optional(record.date.map(|d| d.year())),
                cooperation_model: labeled_record.cooperation_model.label(),
                institution_type: labeled_record.institution_type.label(),
            }
        }))?;
        manifest.files.push(path);

        let path = self.output_dir.join(MONTHLY_TREND_FILE);
        write_csv(&path, PERIOD_HEADER, period_rows(&trend.monthly))?;
        manifest.files.push(path);

        let path = self.output_dir.join(YEARLY_TREND_FILE);
        write_csv(&path, PERIOD_HEADER, period_rows(&trend.yearly))?;
        manifest.files.push(path);

        let path = self.output_dir.join(MODEL_COUNTS_FILE);
        write_csv(&path, CATEGORY_HEADER, category_rows(&labeled.model_counts))?;
        manifest.files.push(path);

        let path = self.output_dir.join(INSTITUTION_COUNTS_FILE);
        write_csv(&path, CATEGORY_HEADER, category_rows(&labeled.institution_counts))?;
        manifest.files.push(path);

        let path = self.output_dir.join(EVALUATION_FILE);
        write_json(&path, evaluation)?;
        manifest.files.push(path);

        if let Some(text) = metrics_text {
            let path = self.output_dir.join(METRICS_FILE);
            fs::write(&path, text).map_err(|source| PipelineError::Export {
                path: path.clone(),
                source: source.into(),
            })?;
            manifest.files.push(path);
        }

        info!(
            output_dir = %self.output_dir.display(),
            files = manifest.files.len(),
            records = labeled.len(),
            "exported pipeline tables"
        );
        Ok(manifest)
    }
}

fn render_optional<T: Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn period_rows<P: Display>(buckets: &[TrendBucket<P>]) -> impl Iterator<Item = PeriodRow> + '_ {
    buckets.iter().map(|bucket| PeriodRow {
        period: bucket.period.to_string(),
        count: bucket.count,
    })
}

fn category_rows<C: Category>(
    counts: &[CategoryCount<C>],
) -> impl Iterator<Item = CategoryRow> + '_ {
    counts.iter().map(|row| CategoryRow {
        category: row.category.label(),
        count: row.count,
    })
}

/// BOM 付き UTF-8 で CSV を書く。行が無くてもヘッダは必ず書く。
fn write_csv<T, I>(path: &Path, header: &[&str], rows: I) -> Result<(), PipelineError>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    try_write_csv(path, header, rows).map_err(|source| PipelineError::Export {
        path: path.to_path_buf(),
        source,
    })
}

fn try_write_csv<T, I>(path: &Path, header: &[&str], rows: I) -> anyhow::Result<()>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let mut file = BufWriter::new(
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
    );
    file.write_all(UTF8_BOM)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    writer.write_record(header)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), PipelineError> {
    try_write_json(path, value).map_err(|source| PipelineError::Export {
        path: path.to_path_buf(),
        source,
    })
}

fn try_write_json<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let mut file = BufWriter::new(
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
    );
    serde_json::to_writer_pretty(&mut file, value)?;
    file.flush()?;
    Ok(())
}
