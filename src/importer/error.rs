// ==========================================
// 度假村报价表识别引擎 - 错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: 仅上游契约错误返回 Err；"可疑但合理"的表格内容不报错
// ==========================================

use thiserror::Error;

/// 识别模块错误类型
#[derive(Error, Debug)]
pub enum RecognitionError {
    // ===== 上游契约错误 =====
    #[error("合并区域越界: {range}（网格尺寸 {height} 行 × {width} 列）")]
    MergeOutOfBounds {
        range: String,
        height: usize,
        width: usize,
    },

    #[error("合并区域非法（起点在终点之后）: {range}")]
    InvalidMergeRange { range: String },

    // ===== 输入适配错误 =====
    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    // ===== 配置错误 =====
    #[error("配置解析失败: {0}")]
    ConfigParseError(String),

    #[error("配置值非法 (key: {key}): {message}")]
    ConfigValueError { key: String, message: String },

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<csv::Error>
impl From<csv::Error> for RecognitionError {
    fn from(err: csv::Error) -> Self {
        RecognitionError::CsvParseError(err.to_string())
    }
}

// 实现 From<serde_json::Error>
impl From<serde_json::Error> for RecognitionError {
    fn from(err: serde_json::Error) -> Self {
        RecognitionError::ConfigParseError(err.to_string())
    }
}

/// Result 类型别名
pub type RecognitionResult<T> = Result<T, RecognitionError>;
