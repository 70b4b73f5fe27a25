//! 機関キーワード ∧ 合作キーワードによる抽出。
use std::cmp::Ordering;
use std::sync::Arc;

use crate::classification::KeywordDictionary;

use super::normalize::{NormalizedCorpus, NormalizedRecord};

/// 合作述語に一致したレコード。
///
/// 日付の昇順で並び、日付欠損のレコードは末尾に置く（同順位は入力順を保つ）。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilteredCorpus {
    pub records: Vec<NormalizedRecord>,
}

impl FilteredCorpus {
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn undated(&self) -> usize {
        self.records.iter().filter(|record| record.date.is_none()).count()
    }
}

pub trait FilterStage: Send + Sync {
    fn filter(&self, corpus: &NormalizedCorpus) -> FilteredCorpus;
}

#[derive(Debug, Clone)]
pub struct KeywordFilterStage {
    dictionary: Arc<KeywordDictionary>,
}

impl KeywordFilterStage {
    #[must_use]
    pub fn new(dictionary: Arc<KeywordDictionary>) -> Self {
        Self { dictionary }
    }

    /// タイトルまたは本文に機関キーワードを含み、かつタイトルまたは本文に合作キーワードを含むか。
    #[must_use]
    pub fn is_cooperation(&self, record: &NormalizedRecord) -> bool {
        let fields = record.fields();
        self.dictionary.institutions().matches_any(&fields)
            && self.dictionary.cooperation().matches_any(&fields)
    }
}

impl Default for KeywordFilterStage {
    fn default() -> Self {
        Self::new(Arc::new(KeywordDictionary::builtin()))
    }
}

impl FilterStage for KeywordFilterStage {
    fn filter(&self, corpus: &NormalizedCorpus) -> FilteredCorpus {
        let mut records: Vec<NormalizedRecord> = corpus
            .records
            .iter()
            .filter(|record| self.is_cooperation(record))
            .cloned()
            .collect();
        records.sort_by(compare_dates_undated_last);
        FilteredCorpus { records }
    }
}

fn compare_dates_undated_last(a: &NormalizedRecord, b: &NormalizedRecord) -> Ordering {
    match (a.date, b.date) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
