// ==========================================
// 度假村报价表识别引擎 - 价格提取引擎
// ==========================================
// 职责: 按价格区域遍历网格，输出标准化价格记录
// 输入: 网格 + 价格区域（按值传递）+ 合并区域
// 输出: ExtractedPricingRecord 列表（无价格区域时为 None）
// ==========================================
// 红线: 同一次提取中 (月份, 房型, 晚数, 人数) 至多一条记录
// 红线: 价格永不为负；解析失败 → 0 且不可售
// 注: 房型 → 晚数 → 人数 的固定嵌套顺序不与表头逐列核对
// ==========================================

mod core;
mod merges;


pub use core::PricingExtractor;
pub(crate) use core::currency_hits;
