// ==========================================
// 度假村报价表识别引擎 - 包含项识别引擎
// ==========================================
// 职责: 发现套餐包含项区域，解析条目，绑定房型
// 发现方式: 关键字表头 + 项目符号/编号向上回溯
// 输出: 区域列表 + 按房型分组 + 全局区域 + 整体置信度 + 建议
// ==========================================
// 注: 发现/解析逻辑同时供 LayoutDetector 的包含项扫描复用
// ==========================================

use crate::config::{InclusionsConfig, RecognitionConfig};
use crate::domain::grid::{CellGrid, CellRange, CellRef};
use crate::domain::layout::{InclusionItem, InclusionsDetectionResult, InclusionsSection};
use crate::domain::types::{DiscoveryMethod, InclusionFormat};
use crate::engine::matchers::{
    accommodation_types_in, is_bare_accommodation_type, is_header_like, is_inclusion_header,
    list_marker, match_month_text, parse_amount,
};
use crate::engine::scoring::{inclusions_confidence, InclusionsFeatures};
use crate::engine::vocabulary::COMMON_INCLUSION_TERMS;
use crate::i18n;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

/// 近似重复表头的去重距离（行/列）
const HEADER_DEDUP_DISTANCE: usize = 2;

/// 条目最少字母数
const MIN_ITEM_LETTERS: usize = 3;

// ==========================================
// HeaderCandidate - 表头候选
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct HeaderCandidate {
    pub cell: CellRef,
    pub text: String,
    pub method: DiscoveryMethod,
}

// ==========================================
// InclusionsDetector - 包含项识别引擎
// ==========================================
pub struct InclusionsDetector {
    config: InclusionsConfig,
}

impl InclusionsDetector {
    /// 创建引擎（默认配置）
    pub fn new() -> Self {
        Self {
            config: InclusionsConfig::default(),
        }
    }

    pub fn with_config(config: &RecognitionConfig) -> Self {
        Self {
            config: config.inclusions.clone(),
        }
    }

    // ==========================================
    // 主入口
    // ==========================================

    /// 识别全部包含项区域
    ///
    /// # 返回
    /// - sections: 按发现顺序
    /// - by_accommodation_type: 绑定房型的区域
    /// - global_section: 未绑定房型中置信度最高者
    #[instrument(skip(self, grid), fields(rows = grid.height(), cols = grid.width()))]
    pub fn detect_inclusions_sections(&self, grid: &CellGrid) -> InclusionsDetectionResult {
        let sections = self.build_sections(grid);

        let mut by_accommodation_type: BTreeMap<String, Vec<InclusionsSection>> = BTreeMap::new();
        let mut global_section: Option<InclusionsSection> = None;
        for section in &sections {
            match &section.accommodation_type {
                Some(type_name) => by_accommodation_type
                    .entry(type_name.clone())
                    .or_default()
                    .push(section.clone()),
                None => {
                    let better = global_section
                        .as_ref()
                        .map_or(true, |best| section.confidence > best.confidence);
                    if better {
                        global_section = Some(section.clone());
                    }
                }
            }
        }

        let overall_confidence = sections
            .iter()
            .map(|s| s.confidence)
            .fold(0.0_f64, f64::max);

        let mut suggestions = Vec::new();
        if sections.is_empty() {
            suggestions.push(i18n::t("inclusions.none_found"));
        }
        for section in sections.iter().filter(|s| s.items.len() < 2) {
            let cell = section.header_cell.to_string();
            let count = section.items.len().to_string();
            suggestions.push(i18n::t_with_args(
                "inclusions.few_items",
                &[("cell", cell.as_str()), ("count", count.as_str())],
            ));
        }

        info!(
            sections = sections.len(),
            typed = by_accommodation_type.len(),
            has_global = global_section.is_some(),
            "包含项识别完成"
        );

        InclusionsDetectionResult {
            sections,
            by_accommodation_type,
            global_section,
            overall_confidence,
            suggestions,
        }
    }

    // ==========================================
    // 表头发现
    // ==========================================

    /// 关键字表头 + 项目符号回溯，去除近似重复
    pub(crate) fn discover_headers(&self, grid: &CellGrid) -> Vec<HeaderCandidate> {
        let max_row = grid.height().min(self.config.scan_rows);
        let max_col = grid.width().min(self.config.scan_cols);

        let mut found: Vec<HeaderCandidate> = Vec::new();
        for row in 0..max_row {
            for col in 0..max_col {
                let Some(text) = grid.text_at(row, col) else {
                    continue;
                };
                if is_inclusion_header(text) {
                    found.push(HeaderCandidate {
                        cell: CellRef::new(row, col),
                        text: text.to_string(),
                        method: DiscoveryMethod::Keyword,
                    });
                } else if list_marker(text).is_some() {
                    if let Some(header) = self.lookback_header(grid, row, col) {
                        found.push(header);
                    }
                }
            }
        }

        // 关键字命中优先保留
        found.sort_by_key(|c| {
            (
                c.method != DiscoveryMethod::Keyword,
                c.cell.row,
                c.cell.col,
            )
        });

        let mut kept: Vec<HeaderCandidate> = Vec::new();
        for candidate in found {
            let near_duplicate = kept.iter().any(|k| {
                k.cell.row.abs_diff(candidate.cell.row) <= HEADER_DEDUP_DISTANCE
                    && k.cell.col.abs_diff(candidate.cell.col) <= HEADER_DEDUP_DISTANCE
            });
            if near_duplicate {
                continue;
            }
            debug!(cell = %candidate.cell, method = ?candidate.method, "包含项表头候选");
            kept.push(candidate);
        }
        kept.sort_by_key(|c| (c.cell.row, c.cell.col));
        kept
    }

    /// 项目符号单元格向上 1..=N 行回溯表头形态单元格（同列优先，其次左右邻列）
    fn lookback_header(&self, grid: &CellGrid, row: usize, col: usize) -> Option<HeaderCandidate> {
        for back in 1..=self.config.lookback_rows {
            let Some(r) = row.checked_sub(back) else {
                break;
            };
            let columns = [Some(col), col.checked_sub(1), Some(col + 1)];
            for c in columns.into_iter().flatten() {
                if let Some(text) = grid.text_at(r, c) {
                    if is_header_like(text) {
                        return Some(HeaderCandidate {
                            cell: CellRef::new(r, c),
                            text: text.to_string(),
                            method: DiscoveryMethod::MarkerLookback,
                        });
                    }
                }
            }
        }
        None
    }

    // ==========================================
    // 内容解析
    // ==========================================

    /// 发现全部表头并逐个解析（相邻区域以彼此的表头为界）
    pub(crate) fn build_sections(&self, grid: &CellGrid) -> Vec<InclusionsSection> {
        let headers = self.discover_headers(grid);
        headers
            .iter()
            .filter_map(|candidate| self.build_section(grid, candidate, &headers))
            .collect()
    }

    /// 表头 → 包含项区域（无有效条目返回 None）
    ///
    /// # 参数
    /// - headers: 已发现的全部表头；内容遍历遇到其中任一（本表头除外）即停止
    pub(crate) fn build_section(
        &self,
        grid: &CellGrid,
        candidate: &HeaderCandidate,
        headers: &[HeaderCandidate],
    ) -> Option<InclusionsSection> {
        let header_row = candidate.cell.row;
        let columns = self.content_columns(candidate.cell.col, grid.width());
        let last_row = (header_row + self.config.max_content_rows).min(grid.height().saturating_sub(1));

        let mut items: Vec<InclusionItem> = Vec::new();
        let mut empty_run = 0;
        for row in (header_row + 1)..=last_row {
            let texts: Vec<(usize, &str)> = columns
                .iter()
                .filter_map(|&c| grid.text_at(row, c).map(|t| (c, t)))
                .collect();
            let has_number = columns.iter().any(|&c| grid.get(row, c).as_number().is_some());

            if texts.is_empty() && !has_number {
                empty_run += 1;
                if empty_run >= self.config.max_empty_rows {
                    break;
                }
                continue;
            }
            empty_run = 0;

            let next_header = headers.iter().any(|h| {
                h.cell != candidate.cell && h.cell.row == row && columns.contains(&h.cell.col)
            });
            if next_header || texts.iter().any(|(_, t)| is_inclusion_header(t)) {
                debug!(row, "遇到新的包含项表头，停止");
                break;
            }

            if let Some(item) = texts
                .iter()
                .find_map(|(c, t)| accept_item(t, CellRef::new(row, *c)))
            {
                items.push(item);
            }
        }

        if items.is_empty() {
            debug!(cell = %candidate.cell, "包含项表头下无有效条目");
            return None;
        }

        let (format, majority_share) = majority_format(&items);
        let avg_item_len =
            items.iter().map(|i| i.text.chars().count()).sum::<usize>() as f64 / items.len() as f64;
        let has_common_term = items.iter().any(|i| {
            let lower = i.text.to_lowercase();
            COMMON_INCLUSION_TERMS.iter().any(|t| lower.contains(t))
        });
        let confidence = inclusions_confidence(&InclusionsFeatures {
            method: candidate.method,
            item_count: items.len(),
            majority_share,
            avg_item_len,
            has_common_term,
        });

        let accommodation_type = accommodation_types_in(&candidate.text)
            .first()
            .map(|t| t.to_string())
            .or_else(|| {
                items
                    .iter()
                    .find_map(|i| accommodation_types_in(&i.text).first().map(|t| t.to_string()))
            });

        let min_col = items
            .iter()
            .map(|i| i.source.col)
            .chain(std::iter::once(candidate.cell.col))
            .min()
            .unwrap_or(candidate.cell.col);
        let max_col = items
            .iter()
            .map(|i| i.source.col)
            .chain(std::iter::once(candidate.cell.col))
            .max()
            .unwrap_or(candidate.cell.col);
        let end_row = items.last().map(|i| i.source.row).unwrap_or(header_row);
        let bounds =
            CellRange::new(header_row, min_col, end_row, max_col).clamp_to(grid.height(), grid.width());

        Some(InclusionsSection {
            header: candidate.text.clone(),
            header_cell: candidate.cell,
            bounds,
            method: candidate.method,
            items,
            format,
            confidence,
            accommodation_type,
        })
    }

    /// 表头列 + 最近的 N 个邻列（右、左、右二）
    fn content_columns(&self, col: usize, width: usize) -> Vec<usize> {
        let neighbours = [Some(col + 1), col.checked_sub(1), Some(col + 2)];
        std::iter::once(col)
            .chain(
                neighbours
                    .into_iter()
                    .flatten()
                    .take(self.config.neighbor_columns),
            )
            .filter(|c| *c < width)
            .collect()
    }
}

impl Default for InclusionsDetector {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// 条目过滤 / 格式判定
// ==========================================

/// 条目过滤：拒绝价格、纯月份、纯房型，且至少 3 个字母
pub(crate) fn accept_item(text: &str, source: CellRef) -> Option<InclusionItem> {
    let (format, body) = list_marker(text).unwrap_or((InclusionFormat::Plain, text.trim().to_string()));

    if parse_amount(&body).is_some() {
        return None;
    }
    if match_month_text(&body).is_some() && body.split_whitespace().count() <= 2 {
        return None;
    }
    if is_bare_accommodation_type(&body) {
        return None;
    }
    if body.chars().filter(|c| c.is_alphabetic()).count() < MIN_ITEM_LETTERS {
        return None;
    }

    Some(InclusionItem {
        text: body,
        format,
        source,
    })
}

/// 多数格式（平票时 项目符号 > 编号 > 纯文本）
fn majority_format(items: &[InclusionItem]) -> (InclusionFormat, f64) {
    let order = [
        InclusionFormat::Bullet,
        InclusionFormat::Numbered,
        InclusionFormat::Plain,
    ];
    let mut best = (InclusionFormat::Plain, 0usize);
    for format in order {
        let count = items.iter().filter(|i| i.format == format).count();
        if count > best.1 {
            best = (format, count);
        }
    }
    let share = if items.is_empty() {
        0.0
    } else {
        best.1 as f64 / items.len() as f64
    };
    (best.0, share)
}
