// ==========================================
// 度假村报价表识别引擎 - 核心库
// ==========================================
// 职责: 从半结构化报价工作表中识别版式、元数据、价格矩阵与包含项
// 边界: 输入为已物化的单元格网格 + 合并区域，不做文件 I/O
// 系统定位: 置信度评分，不保证正确
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 网格 / 版式 / 价格 / 元数据 / 校验结果
pub mod domain;

// 引擎层 - 识别与校验
pub mod engine;

// 导入层 - 上游工作簿适配 + 错误类型
pub mod importer;

// 配置层 - 扫描窗口与阈值
pub mod config;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    Currency, DiscoveryMethod, InclusionFormat, Orientation, PatternKind, Severity,
    SpecialPeriodKind,
};

// 领域实体
pub use domain::{
    CellGrid, CellRange, CellRef, CellValue, ExtractedPricingRecord, InclusionsDetectionResult,
    InclusionsSection, LayoutDetectionResult, LayoutPattern, MergeRange, PriceCell,
    PricingSection, ResortMetadata, ValidationContext, ValidationFinding, Workbook, Worksheet,
};

// 引擎
pub use engine::{
    InclusionsDetector, LayoutDetector, MetadataExtractor, PriceValidator, PricingExtractor,
    PricingRule, RecognitionOrchestrator, RecognitionReport, SheetReport,
};

// 配置与错误
pub use config::RecognitionConfig;
pub use importer::error::{RecognitionError, RecognitionResult};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "度假村报价表识别引擎";
