// ==========================================
// 度假村报价表识别引擎 - 价格校验引擎
// ==========================================
// 职责: 对提取记录运行可注册的业务规则，输出分级校验结果
// 规则: currency-consistency / price-reasonableness / zero-prices /
//       missing-prices / price-progression
// ==========================================
// 红线: 单条规则失败（Err 或 panic）只产生一条 error 结果，不中断其余规则
// 红线: 规则之间相互独立，可单独注册 / 移除
// ==========================================

mod core;
mod rules;

#[cfg(test)]
mod tests;

pub use core::{detect_and_validate_currency, validate_number_format, PriceValidator};
pub use rules::{
    CurrencyConsistencyRule, MissingPricesRule, PriceProgressionRule, PriceReasonablenessRule,
    PricingRule, ZeroPricesRule,
};
