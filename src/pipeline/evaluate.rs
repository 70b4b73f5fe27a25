//! 成果落地評価（多様性・持続性・総合スコア）。
use serde::Serialize;

use super::label::{CategoryCount, LabeledCorpus};
use super::trend::TrendReport;

/// `log(0)` を避けるための平滑化項。
pub const SMOOTHING_EPSILON: f64 = 1e-9;

/// 4 つの評価スカラー。毎回ゼロから再計算する。
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EvaluationScore {
    pub model_diversity: f64,
    pub institution_diversity: f64,
    pub continuity_score: f64,
    /// 3 指標の単純平均。多様性は上限なし、持続性は [0,1] のまま混ぜている。
    pub implementation_score: f64,
}

impl EvaluationScore {
    #[must_use]
    pub fn from_components(
        model_diversity: f64,
        institution_diversity: f64,
        continuity_score: f64,
    ) -> Self {
        Self {
            model_diversity,
            institution_diversity,
            continuity_score,
            implementation_score: (model_diversity + institution_diversity + continuity_score)
                / 3.0,
        }
    }
}

/// レーダーチャート用に [0,1] へ収めた値。総合スコアの計算には使わない。
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RadarProfile {
    pub model_diversity: f64,
    pub institution_diversity: f64,
    pub continuity: f64,
}

impl RadarProfile {
    #[must_use]
    pub fn from_score(score: &EvaluationScore) -> Self {
        Self {
            model_diversity: radar_scale(score.model_diversity),
            institution_diversity: radar_scale(score.institution_diversity),
            continuity: score.continuity_score.clamp(0.0, 1.0),
        }
    }
}

fn radar_scale(diversity: f64) -> f64 {
    (diversity / diversity.max(2.0)).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub score: EvaluationScore,
    pub radar: RadarProfile,
}

/// シャノンエントロピー `-Σ p·ln(p + ε)`、`p = count / total`。
///
/// `total == 0` のときは 0。
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn shannon_diversity(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    let entropy: f64 = counts
        .iter()
        .filter(|&&count| count > 0)
        .map(|&count| {
            let p = count as f64 / total;
            -p * (p + SMOOTHING_EPSILON).ln()
        })
        .sum();
    // 単一カテゴリでは ε の分だけ負になるため 0 で切る。
    entropy.max(0.0)
}

/// `1 − 標本標準偏差 / (平均 + ε)` を [0,1] に収めた値。
///
/// バケットが無ければ 0、1 つだけなら標準偏差 0 として 1。
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn continuity_score(monthly_counts: &[usize]) -> f64 {
    if monthly_counts.is_empty() {
        return 0.0;
    }
    let n = monthly_counts.len() as f64;
    let mean = monthly_counts.iter().map(|&c| c as f64).sum::<f64>() / n;
    if mean <= 0.0 {
        return 0.0;
    }
    let std_dev = if monthly_counts.len() < 2 {
        0.0
    } else {
        let variance = monthly_counts
            .iter()
            .map(|&c| (c as f64 - mean).powi(2))
            .sum::<f64>()
            / (n - 1.0);
        variance.sqrt()
    };
    (1.0 - std_dev / (mean + SMOOTHING_EPSILON)).clamp(0.0, 1.0)
}

fn counts_of<C>(rows: &[CategoryCount<C>]) -> Vec<usize> {
    rows.iter().map(|row| row.count).collect()
}

pub trait EvaluateStage: Send + Sync {
    fn evaluate(&self, labeled: &LabeledCorpus, trend: &TrendReport) -> EvaluationReport;
}

#[derive(Debug, Clone, Default)]
pub struct EntropyEvaluateStage;

impl EntropyEvaluateStage {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl EvaluateStage for EntropyEvaluateStage {
    fn evaluate(&self, labeled: &LabeledCorpus, trend: &TrendReport) -> EvaluationReport {
        let total = labeled.len();
        let score = EvaluationScore::from_components(
            shannon_diversity(&counts_of(&labeled.model_counts), total),
            shannon_diversity(&counts_of(&labeled.institution_counts), total),
            continuity_score(&trend.monthly_counts()),
        );
        EvaluationReport {
            radar: RadarProfile::from_score(&score),
            score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const TOLERANCE: f64 = 1e-6;

    #[test]
    fn diversity_of_uniform_distribution_is_ln_n() {
        let diversity = shannon_diversity(&[5, 5, 5, 5], 20);
        assert!((diversity - 4.0_f64.ln()).abs() < TOLERANCE);
    }

    #[test]
    fn diversity_of_single_category_is_zero() {
        assert!(shannon_diversity(&[7], 7).abs() < TOLERANCE);
        assert!(shannon_diversity(&[7], 7) >= 0.0);
    }

    #[test]
    fn diversity_without_records_is_zero() {
        assert!(shannon_diversity(&[], 0).abs() < f64::EPSILON);
    }

    #[rstest]
    #[case(&[0usize; 0], 0.0)]
    #[case(&[4], 1.0)]
    #[case(&[3, 3, 3], 1.0)]
    #[case(&[1, 9], 0.0)]
    fn continuity_edge_cases(#[case] counts: &[usize], #[case] expected: f64) {
        assert!((continuity_score(counts) - expected).abs() < TOLERANCE);
    }

    #[test]
    fn continuity_uses_sample_standard_deviation() {
        // mean = 3, sample std = sqrt(((1)^2 + (1)^2 + 0) / 2) = 1
        let score = continuity_score(&[2, 4, 3]);
        assert!((score - (1.0 - 1.0 / 3.0)).abs() < TOLERANCE);
    }

    #[rstest]
    #[case(&[1, 2, 3, 10])]
    #[case(&[1])]
    #[case(&[100, 1, 1, 1, 1])]
    fn continuity_is_bounded(#[case] counts: &[usize]) {
        let score = continuity_score(counts);
        assert!((0.0..=1.0).contains(&score));
    }

    #[test]
    fn composite_is_mean_of_components() {
        let score = EvaluationScore::from_components(1.2, 0.7, 0.4);
        assert!((score.implementation_score - (1.2 + 0.7 + 0.4) / 3.0).abs() < TOLERANCE);
    }

    #[test]
    fn radar_profile_caps_diversity() {
        let score = EvaluationScore::from_components(3.0, 1.0, 0.5);
        let radar = RadarProfile::from_score(&score);
        assert!((radar.model_diversity - 1.0).abs() < TOLERANCE);
        assert!((radar.institution_diversity - 0.5).abs() < TOLERANCE);
        assert!((radar.continuity - 0.5).abs() < TOLERANCE);
    }
}
