// ==========================================
// 度假村报价表识别引擎 - 版式识别模型
// ==========================================
// 职责: 版式假设 / 识别结果 / 包含项区域
// 生命周期: 单次识别内产生并消费，不持久化
// ==========================================

use crate::domain::grid::{CellRange, CellRef};
use crate::domain::types::{DiscoveryMethod, InclusionFormat, PatternKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// PatternMetadata - 版式附加信息（按类型区分）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PatternMetadata {
    MonthsInRows {
        label_col: usize,
        header_row: Option<usize>,
        month_labels: Vec<String>,
    },
    MonthsInColumns {
        header_row: usize,
        month_columns: Vec<usize>,
        month_labels: Vec<String>,
        row_labels: Vec<String>,
    },
    PricingMatrix {
        header_row: Option<usize>,
        price_cell_count: usize,
        row_labels: Vec<String>,
    },
    InclusionsList {
        header: CellRef,
        method: DiscoveryMethod,
        items: Vec<String>,
    },
    Undetermined,
}

// ==========================================
// LayoutPattern - 版式假设
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutPattern {
    pub kind: PatternKind,

    /// 置信度 ∈ [0, 1]
    pub confidence: f64,

    /// 包围区域（不超过网格实际尺寸）
    pub bounds: CellRange,

    /// 提取到的表头文本
    pub headers: Vec<String>,

    pub metadata: PatternMetadata,
}

impl LayoutPattern {
    /// 退化结果：指向网格原点的低置信度版式
    pub fn undetermined(confidence: f64) -> Self {
        Self {
            kind: PatternKind::Undetermined,
            confidence,
            bounds: CellRange::origin(),
            headers: Vec::new(),
            metadata: PatternMetadata::Undetermined,
        }
    }

    /// 版式锚点（用于同族候选去重）
    pub fn anchor(&self) -> CellRef {
        match &self.metadata {
            PatternMetadata::InclusionsList { header, .. } => *header,
            _ => CellRef::new(self.bounds.start_row, self.bounds.start_col),
        }
    }
}

// ==========================================
// LayoutDetectionResult - 版式识别结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutDetectionResult {
    pub best_pattern: LayoutPattern,
    pub other_patterns: Vec<LayoutPattern>,
    pub suggestions: Vec<String>,
    pub overall_confidence: f64,
}

impl LayoutDetectionResult {
    /// 全部版式（最佳在前）
    pub fn all_patterns(&self) -> impl Iterator<Item = &LayoutPattern> {
        std::iter::once(&self.best_pattern).chain(self.other_patterns.iter())
    }
}

// ==========================================
// InclusionItem / InclusionsSection - 套餐包含项
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InclusionItem {
    /// 去除项目符号后的文本
    pub text: String,
    pub format: InclusionFormat,
    pub source: CellRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InclusionsSection {
    pub header: String,
    pub header_cell: CellRef,
    pub bounds: CellRange,
    pub method: DiscoveryMethod,
    pub items: Vec<InclusionItem>,
    pub format: InclusionFormat,
    pub confidence: f64,

    /// 绑定的房型（None = 全局适用）
    pub accommodation_type: Option<String>,
}

impl InclusionsSection {
    pub fn lines(&self) -> Vec<String> {
        self.items.iter().map(|i| i.text.clone()).collect()
    }
}

// ==========================================
// InclusionsDetectionResult - 包含项识别结果
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InclusionsDetectionResult {
    pub sections: Vec<InclusionsSection>,

    /// 房型 → 该房型专属包含项区域
    pub by_accommodation_type: BTreeMap<String, Vec<InclusionsSection>>,

    /// 全局包含项区域（未绑定房型中置信度最高者）
    pub global_section: Option<InclusionsSection>,

    pub overall_confidence: f64,
    pub suggestions: Vec<String>,
}
