//! 入力ファイルから書き出しまでの結合テスト。
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cooperation_classifier::app::ComponentRegistry;
use cooperation_classifier::classification::{CooperationModel, InstitutionType, KeywordDictionary};
use cooperation_classifier::config::Config;
use cooperation_classifier::observability::Telemetry;
use cooperation_classifier::pipeline::export::{
    EVALUATION_FILE, FILTERED_DATA_FILE, MODEL_COUNTS_FILE, MONTHLY_TREND_FILE, YEARLY_TREND_FILE,
};
use cooperation_classifier::pipeline::{PipelineOrchestrator, Record};

fn write_csv(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write input");
    path
}

fn read_table(path: &Path) -> Vec<String> {
    let raw = fs::read_to_string(path).expect("read output");
    raw.trim_start_matches('\u{feff}')
        .lines()
        .map(str::to_string)
        .collect()
}

fn run(config: Config) -> cooperation_classifier::app::RunSummary {
    let telemetry = Telemetry::without_tracing().expect("telemetry");
    ComponentRegistry::with_telemetry(config, telemetry)
        .expect("registry")
        .run()
        .expect("run")
}

#[test]
fn strategic_agreement_is_kept_and_bucketed() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = write_csv(
        dir.path(),
        "news.csv",
        "title,body,date\n\
         A银行与高校签署战略合作协议,,2021.03.05\n\
         普通新闻,,2021.03.10\n",
    );
    let output = dir.path().join("results");

    let summary = run(Config::new(input, &output));

    assert_eq!(summary.report.filtered.len(), 1);
    assert_eq!(
        read_table(&output.join(MONTHLY_TREND_FILE)),
        vec!["period,count", "2021-03,1"]
    );
    assert_eq!(
        read_table(&output.join(YEARLY_TREND_FILE)),
        vec!["period,count", "2021,1"]
    );

    let labeled = &summary.report.labeled.records[0];
    assert_eq!(labeled.cooperation_model, CooperationModel::StrategicAgreement);
    assert_eq!(labeled.institution_type, InstitutionType::Bank);
}

#[test]
fn unparseable_date_is_exported_without_bucket() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = write_csv(
        dir.path(),
        "news.csv",
        "title,text,date\n\
         证券公司与学院共建实习基地,,not-a-date\n\
         四川银行合作项目,,2020-07-01\n",
    );
    let output = dir.path().join("results");

    let summary = run(Config::new(input, &output));

    assert_eq!(summary.report.unparseable_dates, 1);
    assert_eq!(summary.report.trend.undated, 1);
    assert_eq!(
        read_table(&output.join(MONTHLY_TREND_FILE)),
        vec!["period,count", "2020-07,1"]
    );

    let rows = read_table(&output.join(FILTERED_DATA_FILE));
    assert_eq!(rows.len(), 3);
    // 日付不明のレコードは末尾に並び、日付列は空になる。
    assert!(rows[1].starts_with("四川银行合作项目,,2020-07-01,2020-07,2020,"));
    assert!(rows[2].starts_with("证券公司与学院共建实习基地,,,,,"));
}

#[test]
fn evaluation_json_is_written_with_bounded_scores() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = write_csv(
        dir.path(),
        "news.csv",
        "title,body,date\n\
         A银行与高校签署战略合作协议,,2021.01.05\n\
         保险公司共建实习基地,,2021.02.10\n\
         证券研究院产学研合作,,2021.02.11\n\
         税务局与学院合作开展人才培养,,2021.04.01\n",
    );
    let output = dir.path().join("results");

    run(Config::new(input, &output));

    let raw = fs::read_to_string(output.join(EVALUATION_FILE)).expect("read evaluation");
    let value: serde_json::Value = serde_json::from_str(&raw).expect("json");
    let score = &value["score"];
    let continuity = score["continuity_score"].as_f64().expect("continuity");
    let model_diversity = score["model_diversity"].as_f64().expect("diversity");
    let institution_diversity = score["institution_diversity"].as_f64().expect("diversity");
    let composite = score["implementation_score"].as_f64().expect("composite");

    assert!((0.0..=1.0).contains(&continuity));
    assert!(model_diversity > 0.0);
    assert!(institution_diversity > 0.0);
    let mean = (model_diversity + institution_diversity + continuity) / 3.0;
    assert!((composite - mean).abs() < 1e-12);

    let models = read_table(&output.join(MODEL_COUNTS_FILE));
    assert_eq!(models[0], "category,count");
    assert_eq!(models.len(), 5);
}

#[test]
fn keyword_overrides_replace_category_terms() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = write_csv(
        dir.path(),
        "news.csv",
        "title,body,date\n四川银行与学院合作开设金融科技微专业,,2023.09.01\n",
    );
    let keywords = write_csv(
        dir.path(),
        "keywords.yaml",
        "cooperation_models:\n  talent_development:\n    - 微专业\n",
    );
    let output = dir.path().join("results");

    let summary = run(Config::new(input, &output).with_keywords_path(keywords));

    let labeled = &summary.report.labeled.records[0];
    assert_eq!(labeled.cooperation_model, CooperationModel::TalentDevelopment);
}

#[test]
fn unknown_override_category_is_rejected() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = write_csv(dir.path(), "news.csv", "title,body,date\n");
    let keywords = write_csv(
        dir.path(),
        "keywords.yaml",
        "institution_types:\n  credit_union:\n    - 信用社\n",
    );
    let config = Config::new(input, dir.path().join("results")).with_keywords_path(keywords);
    let telemetry = Telemetry::without_tracing().expect("telemetry");

    assert!(ComponentRegistry::with_telemetry(config, telemetry).is_err());
}

#[test]
fn fallback_input_is_used_when_primary_missing() {
    let dir = tempfile::tempdir().expect("temp dir");
    let fallback = write_csv(
        dir.path(),
        "backup.csv",
        "title,body,date\n民生银行签署合作协议,,2019-12-31\n",
    );
    let output = dir.path().join("results");
    let config = Config::new(dir.path().join("missing.csv"), &output)
        .with_fallback_input_path(fallback);

    let summary = run(config);

    assert_eq!(summary.report.filtered.len(), 1);
}

#[test]
fn empty_input_yields_zero_scores() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = write_csv(dir.path(), "news.csv", "title,body,date\n");
    let output = dir.path().join("results");

    let summary = run(Config::new(input, &output));

    let score = summary.report.evaluation.score;
    assert_eq!(score.model_diversity, 0.0);
    assert_eq!(score.institution_diversity, 0.0);
    assert_eq!(score.continuity_score, 0.0);
    assert_eq!(score.implementation_score, 0.0);
    assert_eq!(read_table(&output.join(MONTHLY_TREND_FILE)), vec!["period,count"]);
}

#[test]
fn first_declared_category_wins() {
    let pipeline = PipelineOrchestrator::new(Arc::new(KeywordDictionary::builtin()));
    // 「实习」と「研究」の両方を含むが、宣言順で先の产学研合作が選ばれる。
    let report = pipeline
        .run_all(vec![Record::new(
            "会计师事务所与学院共建研究实习基地",
            "",
            "2022.05.20",
        )])
        .expect("pipeline");

    let labeled = &report.labeled.records[0];
    assert_eq!(labeled.cooperation_model, CooperationModel::IndustryAcademiaResearch);
    assert_eq!(labeled.institution_type, InstitutionType::AccountingFirm);
}
