// ==========================================
// 度假村报价表识别引擎 - 识别配置
// ==========================================
// 职责: 各识别器的扫描窗口与阈值
// 格式: JSON，缺省字段取默认值
// ==========================================

use crate::importer::error::{RecognitionError, RecognitionResult};
use serde::{Deserialize, Serialize};

// ==========================================
// LayoutConfig - 版式识别配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// 月份行扫描起点上限（前 N 行）
    pub month_row_scan_limit: usize,

    /// 月份表头行扫描上限（前 N 行）
    pub header_row_scan_limit: usize,

    /// 价格矩阵行扫描上限
    pub matrix_row_scan_limit: usize,

    /// 月份行版式最少不同月份数
    pub min_month_labels: usize,

    /// 月份列版式最少命中列数
    pub min_month_columns: usize,

    /// 价格矩阵行最少价格单元格数
    pub min_price_cells: usize,

    /// 同族候选去重距离（行/列）
    pub suppression_distance: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            month_row_scan_limit: 20,
            header_row_scan_limit: 5,
            matrix_row_scan_limit: 100,
            min_month_labels: 2,
            min_month_columns: 3,
            min_price_cells: 3,
            suppression_distance: 2,
        }
    }
}

// ==========================================
// MetadataConfig - 元数据提取配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    /// 每个工作表扫描行数
    pub scan_rows: usize,

    /// 每个工作表扫描列数
    pub scan_cols: usize,

    /// 无年份日期（如 "18-21 Apr"）补全用年份
    pub reference_year: i32,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            scan_rows: 50,
            scan_cols: 20,
            reference_year: 2025,
        }
    }
}

// ==========================================
// InclusionsConfig - 包含项识别配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InclusionsConfig {
    /// 关键字/项目符号扫描行数
    pub scan_rows: usize,

    /// 关键字/项目符号扫描列数
    pub scan_cols: usize,

    /// 表头之后最多扫描行数
    pub max_content_rows: usize,

    /// 连续空行达到该值即停止
    pub max_empty_rows: usize,

    /// 除表头列外额外检查的邻近列数
    pub neighbor_columns: usize,

    /// 项目符号向上回溯表头的行数
    pub lookback_rows: usize,
}

impl Default for InclusionsConfig {
    fn default() -> Self {
        Self {
            scan_rows: 100,
            scan_cols: 20,
            max_content_rows: 30,
            max_empty_rows: 3,
            neighbor_columns: 3,
            lookback_rows: 3,
        }
    }
}

// ==========================================
// ExtractionConfig - 价格提取配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// 表头未出现晚数时的默认选项
    pub default_nights: Vec<u32>,

    /// 表头未出现人数时的默认选项
    pub default_party_sizes: Vec<u32>,

    /// 未识别到房型时的兜底房型
    pub fallback_accommodation_type: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            default_nights: vec![2, 3, 4, 7],
            default_party_sizes: vec![2, 4, 6],
            fallback_accommodation_type: "Standard".to_string(),
        }
    }
}

// ==========================================
// OrchestrationConfig - 编排配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestrationConfig {
    /// 可处理判定的最低整体置信度
    pub min_processable_confidence: f64,
}

impl Default for OrchestrationConfig {
    fn default() -> Self {
        Self {
            min_processable_confidence: 0.5,
        }
    }
}

// ==========================================
// RecognitionConfig - 总配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    pub layout: LayoutConfig,
    pub metadata: MetadataConfig,
    pub inclusions: InclusionsConfig,
    pub extraction: ExtractionConfig,
    pub orchestration: OrchestrationConfig,
}

impl RecognitionConfig {
    /// 从 JSON 文本加载（缺省字段取默认值）
    ///
    /// # 返回
    /// - Err: JSON 格式错误或取值非法
    pub fn from_json_str(json: &str) -> RecognitionResult<Self> {
        let config: RecognitionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 配置快照（JSON）
    pub fn to_json_string(&self) -> RecognitionResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// 取值校验
    pub fn validate(&self) -> RecognitionResult<()> {
        if self.extraction.default_nights.is_empty() {
            return Err(RecognitionError::ConfigValueError {
                key: "extraction.default_nights".to_string(),
                message: "不能为空".to_string(),
            });
        }
        if self.extraction.default_party_sizes.is_empty() {
            return Err(RecognitionError::ConfigValueError {
                key: "extraction.default_party_sizes".to_string(),
                message: "不能为空".to_string(),
            });
        }
        let threshold = self.orchestration.min_processable_confidence;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(RecognitionError::ConfigValueError {
                key: "orchestration.min_processable_confidence".to_string(),
                message: format!("必须位于 [0, 1]，实际 {}", threshold),
            });
        }
        Ok(())
    }
}
