// ==========================================
// 度假村报价表识别引擎 - 度假村元数据模型
// ==========================================
// 职责: 度假村名称 / 目的地 / 币种 / 季节 / 有效期 / 特殊时段
// ==========================================

use crate::domain::grid::CellRef;
use crate::domain::types::{Currency, SpecialPeriodKind};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// DateRange / ValidityWindow
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// 报价有效期（允许单侧）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidityWindow {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl ValidityWindow {
    pub fn is_complete(&self) -> bool {
        self.from.is_some() && self.to.is_some()
    }
}

// ==========================================
// SourceLocation - 字段来源位置
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub sheet: String,
    /// None = 来自工作表名称
    pub cell: Option<CellRef>,
}

impl SourceLocation {
    pub fn sheet_name(sheet: &str) -> Self {
        Self {
            sheet: sheet.to_string(),
            cell: None,
        }
    }

    pub fn cell(sheet: &str, cell: CellRef) -> Self {
        Self {
            sheet: sheet.to_string(),
            cell: Some(cell),
        }
    }
}

// ==========================================
// SpecialPeriod - 特殊时段
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialPeriod {
    pub name: String,
    pub kind: SpecialPeriodKind,
    pub date_range: Option<DateRange>,
    pub source: SourceLocation,
}

// ==========================================
// CurrencyTally - 币种命中统计
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrencyTally {
    pub count: usize,
    /// 命中示例（最多 3 个）
    pub examples: Vec<SourceLocation>,
}

// ==========================================
// ResortMetadata - 度假村元数据
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResortMetadata {
    pub resort_name: Option<String>,
    pub destination: Option<String>,
    pub currency: Currency,
    pub season: Option<String>,
    pub validity: Option<ValidityWindow>,
    pub special_periods: Vec<SpecialPeriod>,

    /// 字段 → 置信度
    pub confidence: BTreeMap<String, f64>,

    /// 字段 → 来源位置
    pub sources: BTreeMap<String, SourceLocation>,

    pub currency_hits: BTreeMap<Currency, CurrencyTally>,
}

impl ResortMetadata {
    pub fn field_confidence(&self, field: &str) -> f64 {
        self.confidence.get(field).copied().unwrap_or(0.0)
    }

    /// 各字段置信度均值（缺失字段计 0）
    pub fn average_confidence(&self) -> f64 {
        const FIELDS: [&str; 4] = ["resort_name", "currency", "validity", "destination"];
        FIELDS.iter().map(|f| self.field_confidence(f)).sum::<f64>() / FIELDS.len() as f64
    }
}
