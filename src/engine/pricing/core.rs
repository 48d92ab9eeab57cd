// ==========================================
// 度假村报价表识别引擎 - 价格提取引擎
// ==========================================
// 职责: 合并区域广播 / 月份归一 / 房型解析 / 网格遍历 / 价格解析
// 输入: CellGrid + PricingSection + MergeRange 列表
// 输出: ExtractedPricingRecord 列表
// ==========================================

use crate::config::{ExtractionConfig, RecognitionConfig};
use crate::domain::grid::{CellGrid, CellRef, MergeRange};
use crate::domain::pricing::{ExtractedPricingRecord, PriceCell, PricingSection};
use crate::domain::types::{Currency, Orientation};
use crate::engine::matchers::{
    accommodation_types_in, currency_marks, match_month, parse_price, MonthMatch,
};
use crate::engine::vocabulary::accommodation_code;
use crate::importer::error::RecognitionResult;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info, instrument};

use super::merges::MergeLookup;

// ==========================================
// PricingExtractor - 价格提取引擎
// ==========================================
pub struct PricingExtractor {
    extraction: ExtractionConfig,

    /// 币种探测窗口（与元数据扫描窗口一致）
    scan_rows: usize,
    scan_cols: usize,
}

impl PricingExtractor {
    /// 创建引擎（默认配置）
    pub fn new() -> Self {
        Self::with_config(&RecognitionConfig::default())
    }

    pub fn with_config(config: &RecognitionConfig) -> Self {
        Self {
            extraction: config.extraction.clone(),
            scan_rows: config.metadata.scan_rows,
            scan_cols: config.metadata.scan_cols,
        }
    }

    // ==========================================
    // 主入口
    // ==========================================

    /// 提取价格记录
    ///
    /// # 参数
    /// - section: LayoutDetector 选出的价格区域（None = 无价格区域）
    /// - merges: 合并区域（锚点值广播到覆盖的每个坐标）
    ///
    /// # 返回
    /// - Ok(None): 无价格区域
    /// - Ok(Some(records)): 按遍历顺序的记录
    /// - Err: 合并区域越界（上游契约错误）
    #[instrument(skip(self, grid, section, merges), fields(merges = merges.len()))]
    pub fn extract_pricing_matrix(
        &self,
        grid: &CellGrid,
        section: Option<PricingSection>,
        merges: &[MergeRange],
    ) -> RecognitionResult<Option<Vec<ExtractedPricingRecord>>> {
        let Some(section) = section else {
            debug!("无价格区域，跳过提取");
            return Ok(None);
        };

        let lookup = MergeLookup::build(grid, merges)?;
        let fallback_currency = self.detect_currency(grid);
        let types = self.resolve_accommodation_types(grid, &section);

        // 固定嵌套顺序: 房型（外）→ 晚数（中）→ 人数（内）
        let mut triples: Vec<(&str, u32, u32)> = Vec::new();
        for type_name in &types {
            for &nights in &section.nights_options {
                for &party_size in &section.party_size_options {
                    triples.push((type_name.as_str(), nights, party_size));
                }
            }
        }

        let mut records = Vec::new();
        let mut seen: HashSet<(String, String, u32, u32)> = HashSet::new();

        for (month, line) in self.month_lines(&lookup, &section) {
            for (offset, (type_name, nights, party_size)) in triples.iter().enumerate() {
                let (row, col) = match section.orientation {
                    Orientation::RowsHoldMonths => (line, section.label_col + 1 + offset),
                    Orientation::ColumnsHoldMonths => (data_start_row(&section) + offset, line),
                };
                if !section.bounds.contains(row, col) {
                    continue;
                }
                let Some(cell) = read_price_cell(&lookup, row, col, fallback_currency) else {
                    continue;
                };

                let key = (
                    month.label.clone(),
                    type_name.to_string(),
                    *nights,
                    *party_size,
                );
                if !seen.insert(key) {
                    debug!(
                        month = %month.label,
                        accommodation = %type_name,
                        nights,
                        party_size,
                        cell = %cell.source,
                        "重复组合，保留首个"
                    );
                    continue;
                }

                records.push(ExtractedPricingRecord {
                    month: month.label.clone(),
                    accommodation_type: type_name.to_string(),
                    accommodation_code: accommodation_code(type_name),
                    nights: *nights,
                    party_size: *party_size,
                    price: cell.value,
                    currency: cell.currency,
                    available: cell.available,
                    special_period: month.special.then(|| month.label.clone()),
                    validity: None,
                    note: cell.note,
                    source: cell.source,
                    merged: cell.merged,
                });
            }
        }

        info!(
            records = records.len(),
            unavailable = records.iter().filter(|r| !r.available).count(),
            orientation = %section.orientation,
            "价格提取完成"
        );
        Ok(Some(records))
    }

    // ==========================================
    // 币种探测
    // ==========================================

    /// 网格主币种（窗口内出现次数最多者，平票按固定币种顺序，无命中默认 EUR）
    pub fn detect_currency(&self, grid: &CellGrid) -> Currency {
        currency_hits(grid, self.scan_rows, self.scan_cols)
            .into_iter()
            .fold(None, |best: Option<(Currency, usize)>, (currency, cells)| match best {
                Some((_, count)) if count >= cells.len() => best,
                _ => Some((currency, cells.len())),
            })
            .map(|(currency, _)| currency)
            .unwrap_or(Currency::Eur)
    }

    // ==========================================
    // 月份 / 房型
    // ==========================================

    /// (月份, 所在行或列)；仅保留匹配器确认的标签
    fn month_lines(&self, lookup: &MergeLookup<'_>, section: &PricingSection) -> Vec<(MonthMatch, usize)> {
        let b = section.bounds;
        match section.orientation {
            Orientation::RowsHoldMonths => (b.start_row..=b.end_row)
                .filter_map(|row| {
                    let (label, _) = lookup.get(row, section.label_col);
                    match_month(label).map(|m| (m, row))
                })
                .collect(),
            Orientation::ColumnsHoldMonths => {
                let header = section.header_row.unwrap_or(b.start_row);
                ((section.label_col + 1)..=b.end_col)
                    .filter_map(|col| {
                        let (label, _) = lookup.get(header, col);
                        match_month(label).map(|m| (m, col))
                    })
                    .collect()
            }
        }
    }

    /// 区域自带房型优先；否则扫描行标签；仍无则兜底单一房型
    fn resolve_accommodation_types(&self, grid: &CellGrid, section: &PricingSection) -> Vec<String> {
        if !section.accommodation_types.is_empty() {
            return section.accommodation_types.clone();
        }

        let b = section.bounds;
        let mut types: Vec<String> = Vec::new();
        for row in b.start_row..=b.end_row {
            if let Some(label) = grid.text_at(row, section.label_col) {
                for type_name in accommodation_types_in(label) {
                    if !types.iter().any(|t| t == type_name) {
                        types.push(type_name.to_string());
                    }
                }
            }
        }

        if types.is_empty() {
            debug!(fallback = %self.extraction.fallback_accommodation_type, "未识别到房型，使用兜底房型");
            types.push(self.extraction.fallback_accommodation_type.clone());
        }
        types
    }
}

impl Default for PricingExtractor {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// 辅助函数
// ==========================================

/// 列向月份时数据起始行
fn data_start_row(section: &PricingSection) -> usize {
    section
        .header_row
        .map(|h| h + 1)
        .unwrap_or(section.bounds.start_row + 1)
}

/// 读取单个价格单元格（空单元格返回 None）
fn read_price_cell(
    lookup: &MergeLookup<'_>,
    row: usize,
    col: usize,
    fallback_currency: Currency,
) -> Option<PriceCell> {
    let (value, merged) = lookup.get(row, col);
    if value.is_empty() {
        return None;
    }
    let parsed = parse_price(value, fallback_currency);
    Some(PriceCell {
        value: parsed.value,
        currency: parsed.currency,
        available: parsed.available,
        note: parsed.note,
        source: CellRef::new(row, col),
        merged,
        raw: parsed.raw,
    })
}

/// 窗口内币种命中 → 命中单元格（按币种固定顺序）
pub(crate) fn currency_hits(
    grid: &CellGrid,
    max_rows: usize,
    max_cols: usize,
) -> BTreeMap<Currency, Vec<CellRef>> {
    let mut hits: BTreeMap<Currency, Vec<CellRef>> = BTreeMap::new();
    for row in 0..grid.height().min(max_rows) {
        for col in 0..grid.width().min(max_cols) {
            let Some(text) = grid.text_at(row, col) else {
                continue;
            };
            for mark in currency_marks(text) {
                hits.entry(mark.currency).or_default().push(CellRef::new(row, col));
            }
        }
    }
    hits
}
