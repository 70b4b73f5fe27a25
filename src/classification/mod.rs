//! キーワード辞書とカテゴリ判定。
pub mod category;
pub mod keywords;

pub use category::{Category, CooperationModel, InstitutionType};
pub use keywords::{
    DEFAULT_COOPERATION_TERMS, DEFAULT_INSTITUTION_TERMS, KeywordDictionary, KeywordError,
    KeywordOverrides, KeywordSet, KeywordTable,
};
