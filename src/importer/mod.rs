// ==========================================
// 度假村报价表识别引擎 - 输入适配层
// ==========================================
// 职责: 把上游已物化的表格数据转换为 CellGrid / MergeRange
// 红线: 不打开文件，不做网络访问
// ==========================================

pub mod error;
pub mod workbook_adapter;

pub use error::{RecognitionError, RecognitionResult};
pub use workbook_adapter::{grid_from_calamine, merges_from_dimensions, worksheet_from_calamine};
