//! 日付正規化とテキスト整形。
use chrono::NaiveDate;
use tracing::debug;
use unicode_normalization::UnicodeNormalization;

use super::ingest::Record;

/// 受け付ける日付書式。これ以外は試さない。
pub const DATE_FORMATS: [&str; 2] = ["%Y.%m.%d", "%Y-%m-%d"];

/// 日付を `YYYY.MM.DD` / `YYYY-MM-DD` として解釈する。
///
/// どちらにも一致しなければ `None`（日付欠損）を返し、エラーにはしない。
#[must_use]
pub fn normalize_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    pub title: String,
    pub body: String,
    pub date: Option<NaiveDate>,
}

impl NormalizedRecord {
    /// 照合対象のフィールド（タイトル、本文）。
    #[must_use]
    pub fn fields(&self) -> [&str; 2] {
        [self.title.as_str(), self.body.as_str()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizedCorpus {
    pub records: Vec<NormalizedRecord>,
    pub unparseable_dates: usize,
}

pub trait NormalizeStage: Send + Sync {
    fn normalize(&self, records: &[Record]) -> NormalizedCorpus;
}

#[derive(Debug, Clone, Default)]
pub struct TextNormalizeStage;

impl TextNormalizeStage {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl NormalizeStage for TextNormalizeStage {
    fn normalize(&self, records: &[Record]) -> NormalizedCorpus {
        let mut unparseable_dates = 0;
        let records = records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let date = normalize_date(&record.date);
                if date.is_none() {
                    unparseable_dates += 1;
                    debug!(row = index, raw_date = %record.date, "date unparseable, treating as absent");
                }
                NormalizedRecord {
                    title: normalize_text(&record.title),
                    body: normalize_text(&record.body),
                    date,
                }
            })
            .collect();

        NormalizedCorpus {
            records,
            unparseable_dates,
        }
    }
}

fn normalize_text(text: &str) -> String {
    text.nfc().collect::<String>().trim().to_string()
}
