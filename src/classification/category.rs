//! 合作モデル・機関種別のカテゴリ定義。
use std::fmt;

use serde::Serialize;

/// 宣言順で判定されるカテゴリ。
///
/// `ALL` の並びがそのまま判定順（= 同点時の優先順位）になる。
/// `FALLBACK` はどのキーワードにも一致しなかったレコードに付与される。
pub trait Category: Copy + Eq + Ord + fmt::Debug + 'static {
    /// テーブル名（ログ・エラー表示用）。
    const TABLE: &'static str;
    const ALL: &'static [Self];
    const FALLBACK: Self;

    /// 設定ファイルで使う識別子。
    fn key(self) -> &'static str;

    /// エクスポート時の表示ラベル。
    fn label(self) -> &'static str;

    #[must_use]
    fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|category| category.key() == key)
    }
}

/// 校企合作のモデル。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CooperationModel {
    StrategicAgreement,
    IndustryAcademiaResearch,
    InternshipBase,
    TalentDevelopment,
    ResearchProject,
    Other,
}

impl Category for CooperationModel {
    const TABLE: &'static str = "cooperation_models";
    const ALL: &'static [Self] = &[
        Self::StrategicAgreement,
        Self::IndustryAcademiaResearch,
        Self::InternshipBase,
        Self::TalentDevelopment,
        Self::ResearchProject,
        Self::Other,
    ];
    const FALLBACK: Self = Self::Other;

    fn key(self) -> &'static str {
        match self {
            Self::StrategicAgreement => "strategic_agreement",
            Self::IndustryAcademiaResearch => "industry_academia_research",
            Self::InternshipBase => "internship_base",
            Self::TalentDevelopment => "talent_development",
            Self::ResearchProject => "research_project",
            Self::Other => "other",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::StrategicAgreement => "战略合作协议",
            Self::IndustryAcademiaResearch => "产学研合作",
            Self::InternshipBase => "实习基地",
            Self::TalentDevelopment => "人才培养",
            Self::ResearchProject => "科研项目",
            Self::Other => "其他合作",
        }
    }
}

/// 合作相手の機関種別。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstitutionType {
    Bank,
    Insurer,
    SecuritiesFund,
    AccountingFirm,
    Government,
    Other,
}

impl Category for InstitutionType {
    const TABLE: &'static str = "institution_types";
    const ALL: &'static [Self] = &[
        Self::Bank,
        Self::Insurer,
        Self::SecuritiesFund,
        Self::AccountingFirm,
        Self::Government,
        Self::Other,
    ];
    const FALLBACK: Self = Self::Other;

    fn key(self) -> &'static str {
        match self {
            Self::Bank => "bank",
            Self::Insurer => "insurer",
            Self::SecuritiesFund => "securities_fund",
            Self::AccountingFirm => "accounting_firm",
            Self::Government => "government",
            Self::Other => "other",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Bank => "银行",
            Self::Insurer => "保险机构",
            Self::SecuritiesFund => "证券/基金",
            Self::AccountingFirm => "会计师事务所",
            Self::Government => "政府部门",
            Self::Other => "其他金融机构",
        }
    }
}

impl fmt::Display for CooperationModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for InstitutionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
