// ==========================================
// 度假村报价表识别引擎 - 领域类型定义
// ==========================================
// 职责: 币种 / 严重级别 / 版式类型 / 方向 等枚举
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 币种 (Currency)
// ==========================================
// 固定 6 币种集合，序列化为 ISO 代码
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Eur,
    Gbp,
    Usd,
    Chf,
    Jpy,
    Inr,
}

impl Currency {
    pub const ALL: [Currency; 6] = [
        Currency::Eur,
        Currency::Gbp,
        Currency::Usd,
        Currency::Chf,
        Currency::Jpy,
        Currency::Inr,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Usd => "USD",
            Currency::Chf => "CHF",
            Currency::Jpy => "JPY",
            Currency::Inr => "INR",
        }
    }

    /// 由 ISO 代码解析（大小写不敏感）
    pub fn from_code(code: &str) -> Option<Self> {
        let upper = code.trim().to_ascii_uppercase();
        Self::ALL.into_iter().find(|c| c.code() == upper)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ==========================================
// 校验严重级别 (Severity)
// ==========================================
// 顺序: Info < Warning < Error
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

// ==========================================
// 版式类型 (Pattern Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PatternKind {
    MonthsInRows,    // 月份在首列逐行排列
    MonthsInColumns, // 月份在表头逐列排列
    PricingMatrix,   // 连续价格行构成的矩阵
    InclusionsList,  // 套餐包含项列表
    Undetermined,    // 退化结果（无可用版式）
}

impl PatternKind {
    /// 该类型能否作为价格区域来源
    pub fn is_pricing(&self) -> bool {
        matches!(
            self,
            PatternKind::MonthsInRows | PatternKind::MonthsInColumns | PatternKind::PricingMatrix
        )
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternKind::MonthsInRows => write!(f, "MONTHS_IN_ROWS"),
            PatternKind::MonthsInColumns => write!(f, "MONTHS_IN_COLUMNS"),
            PatternKind::PricingMatrix => write!(f, "PRICING_MATRIX"),
            PatternKind::InclusionsList => write!(f, "INCLUSIONS_LIST"),
            PatternKind::Undetermined => write!(f, "UNDETERMINED"),
        }
    }
}

// ==========================================
// 价格区域方向 (Orientation)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Orientation {
    RowsHoldMonths,    // 每行一个月份
    ColumnsHoldMonths, // 每列一个月份
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::RowsHoldMonths => write!(f, "ROWS_HOLD_MONTHS"),
            Orientation::ColumnsHoldMonths => write!(f, "COLUMNS_HOLD_MONTHS"),
        }
    }
}

// ==========================================
// 特殊时段类型 (Special Period Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpecialPeriodKind {
    Holiday, // 节假日（复活节/圣诞/新年/学校假期）
    Season,  // 季节（旺季/淡季）
}

// ==========================================
// 包含项列表格式 (Inclusion Format)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InclusionFormat {
    Bullet,
    Numbered,
    Plain,
}

// ==========================================
// 区域发现方式 (Discovery Method)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscoveryMethod {
    Keyword,        // 包含项关键字命中
    MarkerLookback, // 项目符号/编号向上回溯到表头
}
