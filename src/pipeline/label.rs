//! 合作モデル・機関種別のラベル付け。
use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::classification::{Category, CooperationModel, InstitutionType, KeywordDictionary};

use super::filter::FilteredCorpus;
use super::normalize::NormalizedRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledRecord {
    pub record: NormalizedRecord,
    pub cooperation_model: CooperationModel,
    pub institution_type: InstitutionType,
}

/// カテゴリごとの件数。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryCount<C> {
    pub category: C,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LabeledCorpus {
    pub records: Vec<LabeledRecord>,
    pub model_counts: Vec<CategoryCount<CooperationModel>>,
    pub institution_counts: Vec<CategoryCount<InstitutionType>>,
}

impl LabeledCorpus {
    /// ラベル付きレコードから件数表を組み立てる。
    #[must_use]
    pub fn from_records(records: Vec<LabeledRecord>) -> Self {
        let model_counts = count_categories(records.iter().map(|r| r.cooperation_model));
        let institution_counts = count_categories(records.iter().map(|r| r.institution_type));
        Self {
            records,
            model_counts,
            institution_counts,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// 出現したカテゴリの件数を件数降順（同数は宣言順）で返す。
pub fn count_categories<C, I>(labels: I) -> Vec<CategoryCount<C>>
where
    C: Category,
    I: IntoIterator<Item = C>,
{
    let mut counts: BTreeMap<C, usize> = BTreeMap::new();
    for label in labels {
        *counts.entry(label).or_default() += 1;
    }
    let mut rows: Vec<CategoryCount<C>> = counts
        .into_iter()
        .map(|(category, count)| CategoryCount { category, count })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.category.cmp(&b.category)));
    rows
}

pub trait LabelStage: Send + Sync {
    fn label(&self, corpus: &FilteredCorpus) -> LabeledCorpus;
}

#[derive(Debug, Clone)]
pub struct KeywordLabelStage {
    dictionary: Arc<KeywordDictionary>,
}

impl KeywordLabelStage {
    #[must_use]
    pub fn new(dictionary: Arc<KeywordDictionary>) -> Self {
        Self { dictionary }
    }

    #[must_use]
    pub fn label_record(&self, record: &NormalizedRecord) -> LabeledRecord {
        let fields = record.fields();
        LabeledRecord {
            record: record.clone(),
            cooperation_model: self.dictionary.cooperation_models().classify(&fields),
            institution_type: self.dictionary.institution_types().classify(&fields),
        }
    }
}

impl Default for KeywordLabelStage {
    fn default() -> Self {
        Self::new(Arc::new(KeywordDictionary::builtin()))
    }
}

impl LabelStage for KeywordLabelStage {
    fn label(&self, corpus: &FilteredCorpus) -> LabeledCorpus {
        let records = corpus
            .records
            .iter()
            .map(|record| self.label_record(record))
            .collect();
        LabeledCorpus::from_records(records)
    }
}
