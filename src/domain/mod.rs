// ==========================================
// 度假村报价表识别引擎 - 领域模型层
// ==========================================
// 职责: 定义网格、版式、价格、元数据、校验结果等领域类型
// 红线: 不含识别逻辑，不含 I/O
// ==========================================

pub mod grid;
pub mod layout;
pub mod metadata;
pub mod pricing;
pub mod types;
pub mod validation;

// 重导出核心类型
pub use grid::{CellGrid, CellRange, CellRef, CellValue, MergeRange, Workbook, Worksheet};
pub use layout::{
    InclusionItem, InclusionsDetectionResult, InclusionsSection, LayoutDetectionResult,
    LayoutPattern, PatternMetadata,
};
pub use metadata::{
    CurrencyTally, DateRange, ResortMetadata, SourceLocation, SpecialPeriod, ValidityWindow,
};
pub use pricing::{ExtractedPricingRecord, PriceCell, PricingSection};
pub use types::{
    Currency, DiscoveryMethod, InclusionFormat, Orientation, PatternKind, Severity,
    SpecialPeriodKind,
};
pub use validation::{
    CurrencyCheck, NumberFormat, NumberFormatCheck, PriceRange, ValidationContext,
    ValidationFinding,
};
