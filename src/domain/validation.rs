// ==========================================
// 度假村报价表识别引擎 - 校验结果模型
// ==========================================

use crate::domain::types::{Currency, Severity};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// ValidationFinding - 校验发现
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationFinding {
    pub rule: String,
    pub severity: Severity,
    pub message: String,

    /// 受影响记录标识（源单元格引用）
    pub affected_records: Vec<String>,

    pub suggestion: Option<String>,

    /// 违规值（JSON，可解释性）
    pub value: Option<serde_json::Value>,
}

impl ValidationFinding {
    pub fn new(rule: &str, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            rule: rule.to_string(),
            severity,
            message: message.into(),
            affected_records: Vec::new(),
            suggestion: None,
            value: None,
        }
    }

    pub fn with_records(mut self, records: Vec<String>) -> Self {
        self.affected_records = records;
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_value(mut self, value: serde_json::Value) -> Self {
        self.value = Some(value);
        self
    }
}

// ==========================================
// PriceRange / ValidationContext - 调用方上下文
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationContext {
    /// 允许 0 价（零价规则降级为 info）
    #[serde(default)]
    pub allow_zero_prices: bool,

    #[serde(default)]
    pub expected_currency: Option<Currency>,

    /// 房型（小写）→ 显式价格区间
    #[serde(default)]
    pub type_price_ranges: HashMap<String, PriceRange>,
}

// ==========================================
// 单值检查结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyCheck {
    pub currency: Option<Currency>,
    pub symbol_found: bool,
    pub code_found: bool,
    pub is_valid: bool,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NumberFormat {
    Plain,        // 1500 / 1500.50
    DotDecimal,   // 1,500.50
    CommaDecimal, // 1.500,50 / 150,00
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberFormatCheck {
    pub is_valid: bool,
    pub value: Option<f64>,
    pub format: NumberFormat,
    pub currency: Option<Currency>,
    pub issues: Vec<String>,
}
