//! 月次・年次の件数集計。
use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::filter::FilteredCorpus;

/// 年月。`2021-03` 形式で表示する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    #[must_use]
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }
}

impl From<NaiveDate> for YearMonth {
    fn from(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month())
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// 期間ごとの件数。値が存在する期間だけを持つ（ゼロ埋めしない）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrendBucket<P> {
    pub period: P,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrendReport {
    pub monthly: Vec<TrendBucket<YearMonth>>,
    pub yearly: Vec<TrendBucket<i32>>,
    /// 日付欠損で集計から外したレコード数。
    pub undated: usize,
}

impl TrendReport {
    #[must_use]
    pub fn monthly_counts(&self) -> Vec<usize> {
        self.monthly.iter().map(|bucket| bucket.count).collect()
    }
}

pub trait TrendStage: Send + Sync {
    fn aggregate(&self, corpus: &FilteredCorpus) -> TrendReport;
}

#[derive(Debug, Clone, Default)]
pub struct CalendarTrendStage;

impl CalendarTrendStage {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl TrendStage for CalendarTrendStage {
    fn aggregate(&self, corpus: &FilteredCorpus) -> TrendReport {
        let mut monthly: BTreeMap<YearMonth, usize> = BTreeMap::new();
        let mut yearly: BTreeMap<i32, usize> = BTreeMap::new();
        let mut undated = 0;

        for record in &corpus.records {
            let Some(date) = record.date else {
                undated += 1;
                continue;
            };
            *monthly.entry(YearMonth::from(date)).or_default() += 1;
            *yearly.entry(date.year()).or_default() += 1;
        }

        TrendReport {
            monthly: into_buckets(monthly),
            yearly: into_buckets(yearly),
            undated,
        }
    }
}

fn into_buckets<P>(counts: BTreeMap<P, usize>) -> Vec<TrendBucket<P>> {
    counts
        .into_iter()
        .map(|(period, count)| TrendBucket { period, count })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::normalize::NormalizedRecord;

    fn record(date: Option<(i32, u32, u32)>) -> NormalizedRecord {
        NormalizedRecord {
            title: "银行合作".into(),
            body: String::new(),
            date: date.map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).expect("valid date")),
        }
    }

    #[test]
    fn buckets_only_present_periods() {
        let corpus = FilteredCorpus {
            records: vec![
                record(Some((2021, 1, 3))),
                record(Some((2021, 1, 20))),
                record(Some((2021, 4, 1))),
                record(Some((2022, 4, 1))),
                record(None),
            ],
        };
        let report = CalendarTrendStage::new().aggregate(&corpus);

        assert_eq!(
            report.monthly,
            vec![
                TrendBucket { period: YearMonth::new(2021, 1), count: 2 },
                TrendBucket { period: YearMonth::new(2021, 4), count: 1 },
                TrendBucket { period: YearMonth::new(2022, 4), count: 1 },
            ]
        );
        assert_eq!(
            report.yearly,
            vec![
                TrendBucket { period: 2021, count: 3 },
                TrendBucket { period: 2022, count: 1 },
            ]
        );
        assert_eq!(report.undated, 1);
    }

    #[test]
    fn monthly_total_matches_dated_records() {
        let corpus = FilteredCorpus {
            records: vec![record(Some((2020, 2, 29))), record(None), record(Some((2020, 3, 1)))],
        };
        let report = CalendarTrendStage::new().aggregate(&corpus);
        let monthly_total: usize = report.monthly_counts().iter().sum();
        let yearly_total: usize = report.yearly.iter().map(|b| b.count).sum();

        assert_eq!(monthly_total, corpus.len() - corpus.undated());
        assert_eq!(yearly_total, monthly_total);
    }

    #[test]
    fn year_month_displays_zero_padded() {
        assert_eq!(YearMonth::new(2021, 3).to_string(), "2021-03");
    }
}
