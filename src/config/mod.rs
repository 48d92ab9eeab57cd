// ==========================================
// 度假村报价表识别引擎 - 配置层
// ==========================================
// 职责: 扫描窗口 / 阈值 / 默认选项，支持 JSON 覆写
// 红线: 配置只读，识别过程中不修改
// ==========================================

pub mod recognition_config;

pub use recognition_config::{
    ExtractionConfig, InclusionsConfig, LayoutConfig, MetadataConfig, OrchestrationConfig,
    RecognitionConfig,
};
