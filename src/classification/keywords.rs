//! キーワード照合データ構造と既定辞書。
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use once_cell::sync::Lazy;
use serde::Deserialize;
use thiserror::Error;

use super::category::{Category, CooperationModel, InstitutionType};

/// 金融機関・行政機関を示す既定キーワード。
pub const DEFAULT_INSTITUTION_TERMS: &[&str] = &[
    "银行",
    "保险",
    "证券",
    "基金",
    "金融",
    "银保监",
    "税务局",
    "财税",
    "投资",
    "会计师事务所",
    "财经",
    "民生银行",
    "四川银行",
];

/// 合作行為を示す既定キーワード。
pub const DEFAULT_COOPERATION_TERMS: &[&str] =
    &["合作", "协议", "签署", "共建", "战略", "基地", "产学研"];

fn builtin_model_terms(model: CooperationModel) -> &'static [&'static str] {
    match model {
        CooperationModel::StrategicAgreement => &["战略", "合作协议", "战略合作"],
        CooperationModel::IndustryAcademiaResearch => &["产学研", "研究", "协同创新"],
        CooperationModel::InternshipBase => &["实习", "实践", "基地"],
        CooperationModel::TalentDevelopment => &["人才", "培养", "教育", "教学"],
        CooperationModel::ResearchProject => &["科研", "项目", "课题", "研究"],
        CooperationModel::Other => &[],
    }
}

fn builtin_institution_terms(kind: InstitutionType) -> &'static [&'static str] {
    match kind {
        InstitutionType::Bank => &["银行", "银保监"],
        InstitutionType::Insurer => &["保险", "财险", "寿险"],
        InstitutionType::SecuritiesFund => &["证券", "基金", "券商"],
        InstitutionType::AccountingFirm => &["会计师事务所", "审计", "会计"],
        InstitutionType::Government => &["税务局", "财税", "财政", "政府"],
        InstitutionType::Other => &[],
    }
}

static BUILTIN_DICTIONARY: Lazy<KeywordDictionary> = Lazy::new(|| {
    KeywordDictionary::with_overrides(&KeywordOverrides::default())
        .expect("builtin keyword dictionary")
});

#[derive(Debug, Error)]
pub enum KeywordError {
    #[error("failed to read keyword file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse keyword file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("unknown category `{key}` in {table}")]
    UnknownCategory { table: &'static str, key: String },
    #[error("category `{key}` in {table} is the default label and cannot carry keywords")]
    FallbackCategory { table: &'static str, key: String },
    #[error("failed to build keyword matcher")]
    Build(#[from] aho_corasick::BuildError),
}

/// 部分一致で判定するキーワード集合。
///
/// 単語境界は考慮しない。大文字小文字の区別がある文字体系では小文字化して比較する。
#[derive(Debug, Clone)]
pub struct KeywordSet {
    terms: Vec<String>,
    matcher: Option<AhoCorasick>,
}

impl KeywordSet {
    /// # Errors
    /// オートマトンの構築に失敗した場合は [`KeywordError::Build`] を返す。
    pub fn new<I, S>(terms: I) -> Result<Self, KeywordError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let terms: Vec<String> = terms
            .into_iter()
            .map(|term| term.as_ref().trim().to_lowercase())
            .filter(|term| !term.is_empty())
            .collect();

        let matcher = if terms.is_empty() {
            None
        } else {
            Some(
                AhoCorasickBuilder::new()
                    .match_kind(MatchKind::Standard)
                    .build(&terms)?,
            )
        };

        Ok(Self { terms, matcher })
    }

    #[must_use]
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// テキスト中にいずれかのキーワードが含まれるか。
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        let Some(matcher) = &self.matcher else {
            return false;
        };
        matcher.is_match(fold_case(text).as_ref())
    }

    /// いずれかのフィールドにキーワードが含まれるか。
    #[must_use]
    pub fn matches_any(&self, fields: &[&str]) -> bool {
        fields.iter().any(|field| self.is_match(field))
    }
}

fn fold_case(text: &str) -> Cow<'_, str> {
    if text.chars().any(char::is_uppercase) {
        Cow::Owned(text.to_lowercase())
    } else {
        Cow::Borrowed(text)
    }
}

/// `(カテゴリ, キーワード集合)` の順序付きリスト。
///
/// 宣言順に評価し、最初に一致したカテゴリを返す。一致しなければ `C::FALLBACK`。
#[derive(Debug, Clone)]
pub struct KeywordTable<C: Category> {
    rules: Vec<(C, KeywordSet)>,
}

impl<C: Category> KeywordTable<C> {
    /// `C::ALL` の順でルールを組み立てる。既定カテゴリは含めない。
    ///
    /// # Errors
    /// いずれかのキーワード集合の構築に失敗した場合はエラーを返す。
    pub fn build<F>(mut terms_for: F) -> Result<Self, KeywordError>
    where
        F: FnMut(C) -> Vec<String>,
    {
        let mut rules = Vec::with_capacity(C::ALL.len());
        for &category in C::ALL {
            if category == C::FALLBACK {
                continue;
            }
            rules.push((category, KeywordSet::new(terms_for(category))?));
        }
        Ok(Self { rules })
    }

    #[must_use]
    pub fn classify(&self, fields: &[&str]) -> C {
        self.rules
            .iter()
            .find(|(_, keywords)| keywords.matches_any(fields))
            .map_or(C::FALLBACK, |(category, _)| *category)
    }

    pub fn rules(&self) -> impl Iterator<Item = (C, &KeywordSet)> {
        self.rules.iter().map(|(category, keywords)| (*category, keywords))
    }
}

/// YAML で与えるキーワード上書き。
///
/// 指定されたリストだけを置き換える。カテゴリの並びと既定カテゴリは変更できない。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeywordOverrides {
    #[serde(default)]
    pub institutions: Option<Vec<String>>,
    #[serde(default)]
    pub cooperation_terms: Option<Vec<String>>,
    #[serde(default)]
    pub cooperation_models: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub institution_types: BTreeMap<String, Vec<String>>,
}

impl KeywordOverrides {
    /// # Errors
    /// ファイルの読み込みまたは YAML の解釈に失敗した場合はエラーを返す。
    pub fn from_path(path: &Path) -> Result<Self, KeywordError> {
        let raw = std::fs::read_to_string(path).map_err(|source| KeywordError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&raw).map_err(|source| KeywordError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// # Errors
    /// YAML として解釈できない場合はエラーを返す。
    pub fn from_yaml_str(raw: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(raw)
    }
}

/// フィルタとラベル付けで使う辞書一式。
#[derive(Debug, Clone)]
pub struct KeywordDictionary {
    institutions: KeywordSet,
    cooperation: KeywordSet,
    cooperation_models: KeywordTable<CooperationModel>,
    institution_types: KeywordTable<InstitutionType>,
}

impl KeywordDictionary {
    /// 組み込みの既定辞書。初回呼び出し時に一度だけ構築し、以降は複製を返す。
    ///
    /// # Panics
    /// 構築が失敗するのはオートマトンのサイズ上限を超えた場合のみで、
    /// 固定の語彙ではその上限に達しない。
    #[must_use]
    pub fn builtin() -> Self {
        BUILTIN_DICTIONARY.clone()
    }

    /// 既定辞書に上書きを適用する。
    ///
    /// # Errors
    /// 未知のカテゴリや既定カテゴリへのキーワード指定、オートマトン構築失敗の場合はエラーを返す。
    pub fn with_overrides(overrides: &KeywordOverrides) -> Result<Self, KeywordError> {
        let institutions = match &overrides.institutions {
            Some(terms) => KeywordSet::new(terms)?,
            None => KeywordSet::new(DEFAULT_INSTITUTION_TERMS)?,
        };
        let cooperation = match &overrides.cooperation_terms {
            Some(terms) => KeywordSet::new(terms)?,
            None => KeywordSet::new(DEFAULT_COOPERATION_TERMS)?,
        };

        let cooperation_models =
            build_table(&overrides.cooperation_models, builtin_model_terms)?;
        let institution_types =
            build_table(&overrides.institution_types, builtin_institution_terms)?;

        Ok(Self {
            institutions,
            cooperation,
            cooperation_models,
            institution_types,
        })
    }

    /// # Errors
    /// [`KeywordOverrides::from_path`] と [`Self::with_overrides`] のエラーをそのまま返す。
    pub fn from_path(path: &Path) -> Result<Self, KeywordError> {
        Self::with_overrides(&KeywordOverrides::from_path(path)?)
    }

    #[must_use]
    pub fn institutions(&self) -> &KeywordSet {
        &self.institutions
    }

    #[must_use]
    pub fn cooperation(&self) -> &KeywordSet {
        &self.cooperation
    }

    #[must_use]
    pub fn cooperation_models(&self) -> &KeywordTable<CooperationModel> {
        &self.cooperation_models
    }

    #[must_use]
    pub fn institution_types(&self) -> &KeywordTable<InstitutionType> {
        &self.institution_types
    }
}

impl Default for KeywordDictionary {
    fn default() -> Self {
        Self::builtin()
    }
}

fn build_table<C: Category>(
    overrides: &BTreeMap<String, Vec<String>>,
    builtin: fn(C) -> &'static [&'static str],
) -> Result<KeywordTable<C>, KeywordError> {
    for key in overrides.keys() {
        match C::from_key(key) {
            None => {
                return Err(KeywordError::UnknownCategory {
                    table: C::TABLE,
                    key: key.clone(),
                });
            }
            Some(category) if category == C::FALLBACK => {
                return Err(KeywordError::FallbackCategory {
                    table: C::TABLE,
                    key: key.clone(),
                });
            }
            Some(_) => {}
        }
    }

    KeywordTable::build(|category: C| match overrides.get(category.key()) {
        Some(terms) => terms.clone(),
        None => builtin(category).iter().map(|term| (*term).to_string()).collect(),
    })
}
