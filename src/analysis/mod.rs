//! 計測・評価用のユーティリティ群。
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::pipeline::ingest::Record;

const INSTITUTIONS: &[&str] = &[
    "四川银行",
    "民生银行",
    "太平洋保险",
    "华西证券",
    "成都市税务局",
    "会计师事务所",
    "市政府",
];

const ACTIONS: &[&str] = &[
    "签署战略合作协议",
    "共建实习基地",
    "开展产学研合作",
    "联合培养金融人才",
    "启动科研项目",
    "召开座谈会",
];

const UNRELATED_TITLES: &[&str] = &[
    "学校举办春季运动会",
    "图书馆延长开放时间",
    "研究生招生复试安排",
    "校园歌手大赛决赛",
];

const DATE_SHAPES: &[&str] = &["{y}.{m}.{d}", "{y}-{m}-{d}", "{y}/{m}/{d}", ""];

/// 合成記事を生成する。
///
/// 固定シードで、協力記事と無関係な記事、複数の日付表記を混ぜて返す。
///
/// # Arguments
/// * `count` - 生成するレコード数
#[must_use]
pub fn synthetic_records(count: usize) -> Vec<Record> {
    let mut rng = StdRng::seed_from_u64(42);
    let mut records = Vec::with_capacity(count);

    for index in 0..count {
        let title = if rng.random_bool(0.6) {
            let institution = INSTITUTIONS[rng.random_range(0..INSTITUTIONS.len())];
            let action = ACTIONS[rng.random_range(0..ACTIONS.len())];
            format!("西南财经大学与{institution}{action}")
        } else {
            UNRELATED_TITLES[rng.random_range(0..UNRELATED_TITLES.len())].to_string()
        };
        let body = format!("第{index}条新闻。双方将在人才培养、课题研究等方面深化交流。");

        let year = rng.random_range(2018..=2024);
        let month = rng.random_range(1..=12);
        let day = rng.random_range(1..=28);
        let date = DATE_SHAPES[rng.random_range(0..DATE_SHAPES.len())]
            .replace("{y}", &year.to_string())
            .replace("{m}", &format!("{month:02}"))
            .replace("{d}", &format!("{day:02}"));

        records.push(Record::new(title, body, date));
    }
    records
}
