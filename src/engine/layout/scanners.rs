use crate::config::LayoutConfig;
use crate::domain::grid::{CellGrid, CellRange, CellValue};
use crate::domain::layout::{LayoutPattern, PatternMetadata};
use crate::domain::types::PatternKind;
use crate::engine::inclusions::InclusionsDetector;
use crate::engine::matchers::{accommodation_types_in, is_price_like, match_month};
use crate::engine::scoring::{pattern_confidence, PatternFeatures};
use std::collections::HashSet;
use tracing::debug;

// ==========================================
// 月份在行（首列逐行月份）
// ==========================================

pub(super) fn scan_months_in_rows(grid: &CellGrid, config: &LayoutConfig) -> Vec<LayoutPattern> {
    let mut patterns = Vec::new();
    let start_limit = config.month_row_scan_limit.min(grid.height());

    let mut row = 0;
    while row < start_limit {
        if match_month(grid.get(row, 0)).is_none() {
            row += 1;
            continue;
        }

        let start = row;
        let mut labels = Vec::new();
        while row < grid.height() {
            match match_month(grid.get(row, 0)) {
                Some(m) => {
                    labels.push(m.label);
                    row += 1;
                }
                None => break,
            }
        }
        let end = row - 1;

        let distinct: HashSet<&str> = labels.iter().map(String::as_str).collect();
        if distinct.len() < config.min_month_labels {
            debug!(start, end, distinct = distinct.len(), "月份行不足，跳过");
            continue;
        }

        let header_row = start
            .checked_sub(1)
            .filter(|r| grid.last_filled_col(*r).is_some_and(|c| c >= 1));
        let headers = header_row
            .map(|r| row_texts(grid, r, 1))
            .unwrap_or_default();
        let end_col = (start..=end)
            .chain(header_row)
            .filter_map(|r| grid.last_filled_col(r))
            .max()
            .unwrap_or(0);

        let features = PatternFeatures {
            match_count: labels.len(),
            has_headers: !headers.is_empty(),
            has_accommodation_keyword: headers.iter().any(|h| !accommodation_types_in(h).is_empty()),
        };
        let confidence = pattern_confidence(PatternKind::MonthsInRows, &features);
        debug!(start, end, confidence, "月份在行候选");

        patterns.push(LayoutPattern {
            kind: PatternKind::MonthsInRows,
            confidence,
            bounds: CellRange::new(start, 0, end, end_col).clamp_to(grid.height(), grid.width()),
            headers,
            metadata: PatternMetadata::MonthsInRows {
                label_col: 0,
                header_row,
                month_labels: labels,
            },
        });
    }
    patterns
}

// ==========================================
// 月份在列（表头行逐列月份）
// ==========================================

pub(super) fn scan_months_in_columns(grid: &CellGrid, config: &LayoutConfig) -> Vec<LayoutPattern> {
    let mut patterns = Vec::new();

    for row in 0..config.header_row_scan_limit.min(grid.height()) {
        let (month_columns, month_labels): (Vec<usize>, Vec<String>) = (1..grid.width())
            .filter_map(|c| match_month(grid.get(row, c)).map(|m| (c, m.label)))
            .unzip();
        if month_columns.len() < config.min_month_columns {
            continue;
        }

        let mut end = row;
        while end + 1 < grid.height() && !grid.is_row_empty(end + 1) {
            end += 1;
        }
        let row_labels: Vec<String> = ((row + 1)..=end)
            .filter_map(|r| grid.text_at(r, 0).map(str::to_string))
            .collect();
        let end_col = month_columns.iter().copied().max().unwrap_or(0);

        let features = PatternFeatures {
            match_count: month_columns.len(),
            has_headers: true,
            has_accommodation_keyword: row_labels
                .iter()
                .any(|l| !accommodation_types_in(l).is_empty()),
        };
        let confidence = pattern_confidence(PatternKind::MonthsInColumns, &features);
        debug!(row, columns = month_columns.len(), confidence, "月份在列候选");

        patterns.push(LayoutPattern {
            kind: PatternKind::MonthsInColumns,
            confidence,
            bounds: CellRange::new(row, 0, end, end_col).clamp_to(grid.height(), grid.width()),
            headers: month_labels.clone(),
            metadata: PatternMetadata::MonthsInColumns {
                header_row: row,
                month_columns,
                month_labels,
                row_labels,
            },
        });
    }
    patterns
}

// ==========================================
// 价格矩阵（连续价格行）
// ==========================================

pub(super) fn scan_pricing_matrix(grid: &CellGrid, config: &LayoutConfig) -> Vec<LayoutPattern> {
    let limit = config.matrix_row_scan_limit.min(grid.height());
    let qualifying: Vec<(usize, usize)> = (1..limit)
        .filter_map(|r| {
            let count = grid.row(r).iter().filter(|c| is_price_like(c)).count();
            (count >= config.min_price_cells).then_some((r, count))
        })
        .collect();

    // 连续行归为一个块
    let mut blocks: Vec<Vec<(usize, usize)>> = Vec::new();
    for entry in qualifying {
        let extends = blocks
            .last()
            .and_then(|block| block.last())
            .is_some_and(|(r, _)| r + 1 == entry.0);
        match blocks.last_mut() {
            Some(block) if extends => block.push(entry),
            _ => blocks.push(vec![entry]),
        }
    }

    blocks
        .into_iter()
        .map(|block| {
            let start = block[0].0;
            let end = block[block.len() - 1].0;
            let price_cell_count: usize = block.iter().map(|(_, n)| n).sum();

            let header_row = Some(start - 1).filter(|r| !grid.is_row_empty(*r));
            let headers = header_row.map(|r| row_texts(grid, r, 0)).unwrap_or_default();
            let row_labels: Vec<String> = (start..=end)
                .filter_map(|r| grid.text_at(r, 0).map(str::to_string))
                .collect();
            let end_col = (start..=end)
                .chain(header_row)
                .filter_map(|r| grid.last_filled_col(r))
                .max()
                .unwrap_or(0);

            let features = PatternFeatures {
                match_count: price_cell_count,
                has_headers: header_row.is_some(),
                has_accommodation_keyword: headers
                    .iter()
                    .chain(row_labels.iter())
                    .any(|t| !accommodation_types_in(t).is_empty()),
            };
            let confidence = pattern_confidence(PatternKind::PricingMatrix, &features);
            debug!(start, end, price_cell_count, confidence, "价格矩阵候选");

            LayoutPattern {
                kind: PatternKind::PricingMatrix,
                confidence,
                bounds: CellRange::new(start, 0, end, end_col).clamp_to(grid.height(), grid.width()),
                headers,
                metadata: PatternMetadata::PricingMatrix {
                    header_row,
                    price_cell_count,
                    row_labels,
                },
            }
        })
        .collect()
}

// ==========================================
// 包含项列表（复用 InclusionsDetector 的发现与解析）
// ==========================================

pub(super) fn scan_inclusions(grid: &CellGrid, detector: &InclusionsDetector) -> Vec<LayoutPattern> {
    detector
        .build_sections(grid)
        .into_iter()
        .map(|section| {
            let features = PatternFeatures {
                match_count: section.items.len(),
                has_headers: true,
                has_accommodation_keyword: section.accommodation_type.is_some(),
            };
            LayoutPattern {
                kind: PatternKind::InclusionsList,
                confidence: pattern_confidence(PatternKind::InclusionsList, &features),
                bounds: section.bounds,
                headers: vec![section.header.clone()],
                metadata: PatternMetadata::InclusionsList {
                    header: section.header_cell,
                    method: section.method,
                    items: section.lines(),
                },
            }
        })
        .collect()
}

// ==========================================
// 同族去重
// ==========================================

/// 按置信度降序，丢弃与已保留同族候选距离 ≤ distance 的候选
pub(super) fn suppress_overlapping(mut patterns: Vec<LayoutPattern>, distance: usize) -> Vec<LayoutPattern> {
    patterns.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut kept: Vec<LayoutPattern> = Vec::new();
    for pattern in patterns {
        let anchor = pattern.anchor();
        let suppressed = kept.iter().any(|k| {
            let other = k.anchor();
            k.kind == pattern.kind
                && other.row.abs_diff(anchor.row) <= distance
                && other.col.abs_diff(anchor.col) <= distance
        });
        if suppressed {
            debug!(kind = %pattern.kind, anchor = %anchor, "同族近邻候选被抑制");
            continue;
        }
        kept.push(pattern);
    }
    kept
}

/// 行内从 from_col 起的非空单元格文本
pub(super) fn row_texts(grid: &CellGrid, row: usize, from_col: usize) -> Vec<String> {
    grid.row(row)
        .iter()
        .skip(from_col)
        .filter(|c| !c.is_empty())
        .map(CellValue::display_text)
        .collect()
}
