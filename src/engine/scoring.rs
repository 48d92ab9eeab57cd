// ==========================================
// 度假村报价表识别引擎 - 置信度评分
// ==========================================
// 职责: 候选特征 → 置信度（加权、夹紧）；版式族整体置信度
// 红线: 纯函数，不接触网格遍历
// ==========================================

use crate::domain::types::{DiscoveryMethod, PatternKind};

/// 候选特征
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PatternFeatures {
    /// 命中数（月份标签数 / 价格单元格数 / 列表项数）
    pub match_count: usize,

    /// 是否存在表头
    pub has_headers: bool,

    /// 表头/标签中是否出现房型关键字
    pub has_accommodation_keyword: bool,
}

/// 各版式族的评分权重
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    /// 命中数项权重
    pub match_weight: f64,

    /// 命中数饱和尺度（越大越慢饱和）
    pub saturation: f64,

    pub header_bonus: f64,
    pub accommodation_bonus: f64,
}

impl ScoreWeights {
    pub fn for_kind(kind: PatternKind) -> Self {
        match kind {
            PatternKind::MonthsInRows | PatternKind::MonthsInColumns => Self {
                match_weight: 0.5,
                saturation: 3.0,
                header_bonus: 0.25,
                accommodation_bonus: 0.25,
            },
            PatternKind::PricingMatrix => Self {
                match_weight: 0.5,
                saturation: 6.0,
                header_bonus: 0.2,
                accommodation_bonus: 0.2,
            },
            PatternKind::InclusionsList => Self {
                match_weight: 0.6,
                saturation: 3.0,
                header_bonus: 0.3,
                accommodation_bonus: 0.1,
            },
            PatternKind::Undetermined => Self {
                match_weight: 0.0,
                saturation: 1.0,
                header_bonus: 0.0,
                accommodation_bonus: 0.0,
            },
        }
    }
}

/// 版式族在整体置信度中的权重
pub fn family_weight(kind: PatternKind) -> f64 {
    match kind {
        PatternKind::MonthsInRows | PatternKind::MonthsInColumns => 0.4,
        PatternKind::PricingMatrix => 0.3,
        PatternKind::InclusionsList => 0.2,
        PatternKind::Undetermined => 0.0,
    }
}

/// 夹紧到 [0, 1]（NaN → 0）
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// 候选置信度 = 命中数项（边际递减）+ 表头加分 + 房型加分
pub fn pattern_confidence(kind: PatternKind, features: &PatternFeatures) -> f64 {
    let w = ScoreWeights::for_kind(kind);
    let saturation = w.saturation.max(f64::EPSILON);
    let match_term = 1.0 - (-(features.match_count as f64) / saturation).exp();

    let mut score = w.match_weight * match_term;
    if features.has_headers {
        score += w.header_bonus;
    }
    if features.has_accommodation_keyword {
        score += w.accommodation_bonus;
    }
    clamp_unit(score)
}

/// 整体置信度：各存活版式族最高置信度的加权平均
///
/// # 参数
/// - best_per_family: (版式族, 该族最高置信度)
pub fn overall_confidence(best_per_family: &[(PatternKind, f64)]) -> f64 {
    let (weighted, total_weight) = best_per_family
        .iter()
        .map(|(kind, conf)| (family_weight(*kind), *conf))
        .filter(|(w, _)| *w > 0.0)
        .fold((0.0, 0.0), |(acc, tw), (w, conf)| (acc + w * conf, tw + w));

    if total_weight <= 0.0 {
        0.0
    } else {
        clamp_unit(weighted / total_weight)
    }
}

// ==========================================
// 包含项区域评分
// ==========================================

/// 包含项区域特征
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InclusionsFeatures {
    pub method: DiscoveryMethod,
    pub item_count: usize,

    /// 多数格式占比 ∈ [0, 1]
    pub majority_share: f64,

    /// 平均条目长度（字符）
    pub avg_item_len: f64,

    /// 是否含常见包含项词汇
    pub has_common_term: bool,
}

/// 包含项区域置信度 = 发现方式 + 条目数（饱和）+ 格式一致性 + 平均长度 + 常见词汇
pub fn inclusions_confidence(features: &InclusionsFeatures) -> f64 {
    let method_bonus = match features.method {
        DiscoveryMethod::Keyword => 0.3,
        DiscoveryMethod::MarkerLookback => 0.2,
    };
    let count_bonus = (features.item_count as f64 / 5.0).min(1.0) * 0.3;
    let format_bonus = clamp_unit(features.majority_share) * 0.15;
    let length_bonus = if (10.0..=80.0).contains(&features.avg_item_len) {
        0.1
    } else {
        0.05
    };
    let vocabulary_bonus = if features.has_common_term { 0.15 } else { 0.0 };

    clamp_unit(method_bonus + count_bonus + format_bonus + length_bonus + vocabulary_bonus)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_is_monotone_in_matches() {
        let low = pattern_confidence(
            PatternKind::MonthsInRows,
            &PatternFeatures {
                match_count: 2,
                ..Default::default()
            },
        );
        let high = pattern_confidence(
            PatternKind::MonthsInRows,
            &PatternFeatures {
                match_count: 12,
                ..Default::default()
            },
        );
        assert!(high > low);
        assert!(high <= 0.5);
    }

    #[test]
    fn test_bonuses_are_clamped() {
        let conf = pattern_confidence(
            PatternKind::MonthsInColumns,
            &PatternFeatures {
                match_count: 1000,
                has_headers: true,
                has_accommodation_keyword: true,
            },
        );
        assert!(conf <= 1.0);
        assert!(conf > 0.95);
    }

    #[test]
    fn test_overall_weighted_average() {
        let overall = overall_confidence(&[
            (PatternKind::MonthsInRows, 0.8),
            (PatternKind::PricingMatrix, 0.4),
        ]);
        let expected = (0.4 * 0.8 + 0.3 * 0.4) / 0.7;
        assert!((overall - expected).abs() < 1e-9);
    }

    #[test]
    fn test_overall_without_families_is_zero() {
        assert_eq!(overall_confidence(&[]), 0.0);
        assert_eq!(overall_confidence(&[(PatternKind::Undetermined, 0.9)]), 0.0);
    }

    #[test]
    fn test_inclusions_confidence_bounds() {
        let full = inclusions_confidence(&InclusionsFeatures {
            method: DiscoveryMethod::Keyword,
            item_count: 8,
            majority_share: 1.0,
            avg_item_len: 20.0,
            has_common_term: true,
        });
        assert!((full - 1.0).abs() < 1e-9);

        let sparse = inclusions_confidence(&InclusionsFeatures {
            method: DiscoveryMethod::MarkerLookback,
            item_count: 1,
            majority_share: 1.0,
            avg_item_len: 4.0,
            has_common_term: false,
        });
        assert!(sparse < 0.5);
    }

    #[test]
    fn test_clamp_unit_nan() {
        assert_eq!(clamp_unit(f64::NAN), 0.0);
        assert_eq!(clamp_unit(1.7), 1.0);
    }
}
