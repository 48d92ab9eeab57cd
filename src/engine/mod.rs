// ==========================================
// 度假村报价表识别引擎 - 引擎层
// ==========================================
// 职责: 版式识别 / 元数据提取 / 价格提取 / 包含项识别 / 规则校验 / 编排
// 红线: 引擎只读网格与合并区域，不做 I/O，不持有跨调用的可变状态
// ==========================================

pub mod inclusions;
pub mod layout;
pub mod matchers;
pub mod metadata;
pub mod orchestrator;
pub mod pricing;
pub mod scoring;
pub mod validation;
pub mod vocabulary;

// 重导出核心引擎
pub use inclusions::InclusionsDetector;
pub use layout::LayoutDetector;
pub use metadata::MetadataExtractor;
pub use orchestrator::{RecognitionOrchestrator, RecognitionReport, SheetReport};
pub use pricing::PricingExtractor;
pub use validation::{
    detect_and_validate_currency, validate_number_format, CurrencyConsistencyRule,
    MissingPricesRule, PriceProgressionRule, PriceReasonablenessRule, PriceValidator,
    PricingRule, ZeroPricesRule,
};
