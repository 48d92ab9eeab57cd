// ==========================================
// 度假村报价表识别引擎 - 价格领域模型
// ==========================================
// 职责: 价格区域（识别 → 提取的交接结构）/ 价格单元格 / 提取记录
// 红线: 价格永不为负；解析失败 → 0 且不可售
// ==========================================

use crate::domain::grid::{CellRange, CellRef};
use crate::domain::metadata::ValidityWindow;
use crate::domain::types::{Currency, Orientation, PatternKind};
use serde::{Deserialize, Serialize};

// ==========================================
// PricingSection - 价格区域
// ==========================================
// 用途: LayoutDetector → PricingExtractor 按值传递
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingSection {
    pub bounds: CellRange,
    pub orientation: Orientation,

    /// 表头行（列向月份时即月份行）
    pub header_row: Option<usize>,

    /// 行标签所在列
    pub label_col: usize,

    pub accommodation_types: Vec<String>,
    pub nights_options: Vec<u32>,
    pub party_size_options: Vec<u32>,

    /// 来源版式及其置信度
    pub source_kind: PatternKind,
    pub confidence: f64,
}

// ==========================================
// PriceCell - 解析后的价格单元格
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceCell {
    pub value: f64,
    pub currency: Currency,
    pub available: bool,
    pub note: Option<String>,
    pub source: CellRef,

    /// 是否来自合并区域
    pub merged: bool,

    /// 原始文本
    pub raw: String,
}

// ==========================================
// ExtractedPricingRecord - 提取记录（下游消费单元）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedPricingRecord {
    pub month: String,
    pub accommodation_type: String,
    pub accommodation_code: String,
    pub nights: u32,
    pub party_size: u32,
    pub price: f64,
    pub currency: Currency,
    pub available: bool,
    pub special_period: Option<String>,
    pub validity: Option<ValidityWindow>,
    pub note: Option<String>,
    pub source: CellRef,
    pub merged: bool,
}

impl ExtractedPricingRecord {
    /// 记录标识（校验结果中引用）
    pub fn record_id(&self) -> String {
        self.source.to_string()
    }
}
