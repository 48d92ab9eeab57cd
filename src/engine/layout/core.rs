// ==========================================
// 度假村报价表识别引擎 - 版式识别引擎
// ==========================================
// 职责: 运行四个扫描器，去重，评分，选出价格区域与包含项区域
// 输入: 单个工作表网格
// 输出: LayoutDetectionResult / PricingSection / InclusionsSection
// ==========================================

use crate::config::{ExtractionConfig, LayoutConfig, RecognitionConfig};
use crate::domain::grid::CellGrid;
use crate::domain::layout::{InclusionsSection, LayoutDetectionResult, LayoutPattern, PatternMetadata};
use crate::domain::pricing::PricingSection;
use crate::domain::types::{Orientation, PatternKind};
use crate::engine::inclusions::{HeaderCandidate, InclusionsDetector};
use crate::engine::matchers::{accommodation_types_in, match_month, nights_in, party_sizes_in};
use crate::engine::scoring::overall_confidence;
use crate::i18n;
use tracing::{debug, info, instrument};

use super::scanners::{
    row_texts, scan_inclusions, scan_months_in_columns, scan_months_in_rows, scan_pricing_matrix,
    suppress_overlapping,
};

/// 无可用价格版式时的退化置信度
const DEGENERATE_CONFIDENCE: f64 = 0.1;

/// 低于该值时提示检查表头
const LOW_CONFIDENCE_HINT: f64 = 0.5;

// ==========================================
// LayoutDetector - 版式识别引擎
// ==========================================
pub struct LayoutDetector {
    layout: LayoutConfig,
    extraction: ExtractionConfig,
    inclusions: InclusionsDetector,
}

impl LayoutDetector {
    /// 创建引擎（默认配置）
    pub fn new() -> Self {
        Self::with_config(&RecognitionConfig::default())
    }

    pub fn with_config(config: &RecognitionConfig) -> Self {
        Self {
            layout: config.layout.clone(),
            extraction: config.extraction.clone(),
            inclusions: InclusionsDetector::with_config(config),
        }
    }

    // ==========================================
    // 版式识别
    // ==========================================

    /// 识别工作表版式
    ///
    /// # 返回
    /// - best_pattern: 置信度最高的价格版式；无价格版式时为原点退化结果
    /// - other_patterns: 其余存活版式（置信度降序）
    /// - overall_confidence: 各存活版式族最高置信度的加权平均
    #[instrument(skip(self, grid), fields(rows = grid.height(), cols = grid.width()))]
    pub fn detect_layout(&self, grid: &CellGrid) -> LayoutDetectionResult {
        let mut candidates = Vec::new();
        candidates.extend(scan_months_in_rows(grid, &self.layout));
        candidates.extend(scan_months_in_columns(grid, &self.layout));
        candidates.extend(scan_pricing_matrix(grid, &self.layout));
        candidates.extend(scan_inclusions(grid, &self.inclusions));
        let total_candidates = candidates.len();

        let mut survivors = suppress_overlapping(candidates, self.layout.suppression_distance);

        let best_index = survivors.iter().position(|p| p.kind.is_pricing());
        let (best_pattern, overall) = match best_index {
            Some(index) => {
                let best = survivors.remove(index);
                let mut families: Vec<(PatternKind, f64)> = vec![(best.kind, best.confidence)];
                for pattern in &survivors {
                    // survivors 已按置信度降序，同族首个即最高
                    if !families.iter().any(|(kind, _)| *kind == pattern.kind) {
                        families.push((pattern.kind, pattern.confidence));
                    }
                }
                let overall = overall_confidence(&families);
                (best, overall)
            }
            None => (
                LayoutPattern::undetermined(DEGENERATE_CONFIDENCE),
                DEGENERATE_CONFIDENCE,
            ),
        };

        let suggestions = self.layout_suggestions(&best_pattern, &survivors);

        info!(
            candidates = total_candidates,
            survivors = survivors.len() + 1,
            best = %best_pattern.kind,
            overall,
            "版式识别完成"
        );

        LayoutDetectionResult {
            best_pattern,
            other_patterns: survivors,
            suggestions,
            overall_confidence: overall,
        }
    }

    fn layout_suggestions(&self, best: &LayoutPattern, others: &[LayoutPattern]) -> Vec<String> {
        let mut suggestions = Vec::new();
        if !best.kind.is_pricing() {
            suggestions.push(i18n::t("layout.no_pattern"));
            suggestions.push(i18n::t("layout.suggest_month_labels"));
        } else if best.confidence < LOW_CONFIDENCE_HINT {
            let confidence = format!("{:.2}", best.confidence);
            suggestions.push(i18n::t_with_args(
                "layout.low_confidence",
                &[("confidence", confidence.as_str())],
            ));
        }
        if best.kind.is_pricing() && others.iter().any(|p| p.kind.is_pricing()) {
            let range = best.bounds.to_string();
            suggestions.push(i18n::t_with_args(
                "layout.multiple_candidates",
                &[("range", range.as_str())],
            ));
        }
        if !others.iter().any(|p| p.kind == PatternKind::InclusionsList) {
            suggestions.push(i18n::t("layout.no_inclusions"));
        }
        suggestions
    }

    // ==========================================
    // 价格区域
    // ==========================================

    /// 选出价格区域（无价格版式返回 None）
    pub fn find_pricing_section(&self, grid: &CellGrid) -> Option<PricingSection> {
        let result = self.detect_layout(grid);
        self.pricing_section_from(grid, &result)
    }

    /// 由已有识别结果推导价格区域
    pub fn pricing_section_from(
        &self,
        grid: &CellGrid,
        result: &LayoutDetectionResult,
    ) -> Option<PricingSection> {
        let pattern = pick_best(result.all_patterns().filter(|p| p.kind.is_pricing()))?;

        let (orientation, header_row, label_col, texts) = match &pattern.metadata {
            PatternMetadata::MonthsInRows {
                label_col,
                header_row,
                ..
            } => {
                let texts = header_row
                    .map(|r| row_texts(grid, r, label_col + 1))
                    .unwrap_or_default();
                (Orientation::RowsHoldMonths, *header_row, *label_col, texts)
            }
            PatternMetadata::MonthsInColumns {
                header_row,
                row_labels,
                ..
            } => {
                let mut texts = row_texts(grid, *header_row, 1);
                texts.extend(row_labels.iter().cloned());
                (Orientation::ColumnsHoldMonths, Some(*header_row), 0, texts)
            }
            PatternMetadata::PricingMatrix {
                header_row,
                row_labels,
                ..
            } => {
                let rows_hold_months = (pattern.bounds.start_row..=pattern.bounds.end_row)
                    .any(|r| match_month(grid.get(r, 0)).is_some());
                let header_has_months = header_row.is_some_and(|r| {
                    (1..grid.width()).any(|c| match_month(grid.get(r, c)).is_some())
                });
                let header_texts = header_row
                    .map(|r| row_texts(grid, r, 1))
                    .unwrap_or_default();
                if !rows_hold_months && header_has_months {
                    let mut texts = header_texts;
                    texts.extend(row_labels.iter().cloned());
                    (Orientation::ColumnsHoldMonths, *header_row, 0, texts)
                } else {
                    (Orientation::RowsHoldMonths, *header_row, 0, header_texts)
                }
            }
            PatternMetadata::InclusionsList { .. } | PatternMetadata::Undetermined => return None,
        };

        let section = PricingSection {
            bounds: pattern.bounds.clamp_to(grid.height(), grid.width()),
            orientation,
            header_row,
            label_col,
            accommodation_types: distinct_types(&texts),
            nights_options: options_or_default(
                texts.iter().flat_map(|t| nights_in(t)).collect(),
                &self.extraction.default_nights,
            ),
            party_size_options: options_or_default(
                texts.iter().flat_map(|t| party_sizes_in(t)).collect(),
                &self.extraction.default_party_sizes,
            ),
            source_kind: pattern.kind,
            confidence: pattern.confidence,
        };

        debug!(
            kind = %section.source_kind,
            orientation = %section.orientation,
            bounds = %section.bounds,
            types = section.accommodation_types.len(),
            "价格区域已确定"
        );
        Some(section)
    }

    // ==========================================
    // 包含项区域
    // ==========================================

    /// 选出置信度最高的包含项区域并解析条目
    pub fn find_inclusions_section(&self, grid: &CellGrid) -> Option<InclusionsSection> {
        let result = self.detect_layout(grid);
        self.inclusions_section_from(grid, &result)
    }

    /// 由已有识别结果解析包含项区域
    pub fn inclusions_section_from(
        &self,
        grid: &CellGrid,
        result: &LayoutDetectionResult,
    ) -> Option<InclusionsSection> {
        let pattern = pick_best(
            result
                .all_patterns()
                .filter(|p| p.kind == PatternKind::InclusionsList),
        )?;
        let PatternMetadata::InclusionsList { header, method, .. } = &pattern.metadata else {
            return None;
        };
        let text = grid.text_at(header.row, header.col)?;
        let headers = self.inclusions.discover_headers(grid);
        self.inclusions.build_section(
            grid,
            &HeaderCandidate {
                cell: *header,
                text: text.to_string(),
                method: *method,
            },
            &headers,
        )
    }
}

impl Default for LayoutDetector {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// 辅助函数
// ==========================================

/// 置信度最高者（平局取先出现者）
fn pick_best<'a>(patterns: impl Iterator<Item = &'a LayoutPattern>) -> Option<&'a LayoutPattern> {
    patterns.fold(None, |best: Option<&LayoutPattern>, p| match best {
        Some(b) if b.confidence >= p.confidence => Some(b),
        _ => Some(p),
    })
}

/// 文本中出现的房型（标准显示名，去重保序）
fn distinct_types(texts: &[String]) -> Vec<String> {
    let mut types: Vec<String> = Vec::new();
    for text in texts {
        for type_name in accommodation_types_in(text) {
            if !types.iter().any(|t| t == type_name) {
                types.push(type_name.to_string());
            }
        }
    }
    types
}

/// 升序去重；为空时取默认值
fn options_or_default(mut found: Vec<u32>, default: &[u32]) -> Vec<u32> {
    found.sort_unstable();
    found.dedup();
    if found.is_empty() {
        default.to_vec()
    } else {
        found
    }
}
