// ==========================================
// 度假村报价表识别引擎 - 版式识别引擎
// ==========================================
// 职责: 对单个工作表提出竞争版式假设并评分
// 扫描器: 月份在行 / 月份在列 / 价格矩阵 / 包含项列表
// 输出: 最佳版式 + 其余版式 + 建议 + 整体置信度
// ==========================================
// 红线: 无可用版式时返回指向原点的低置信度退化结果，不报错
// 红线: 版式包围区域不超过网格实际尺寸
// ==========================================

mod core;
mod scanners;

#[cfg(test)]
mod tests;

pub use core::LayoutDetector;
