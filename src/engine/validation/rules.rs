use crate::domain::pricing::ExtractedPricingRecord;
use crate::domain::types::{Currency, Severity};
use crate::domain::validation::{ValidationContext, ValidationFinding};
use crate::engine::vocabulary::{accommodation_multiplier, currency_bounds};
use crate::i18n;
use serde_json::json;
use std::collections::BTreeMap;

/// 合理性基准：7 晚 / 2 人
const BASELINE_NIGHTS: f64 = 7.0;
const BASELINE_PARTY: f64 = 2.0;

/// 不可售比例超过该值时升级为 warning
const MISSING_ESCALATION_RATIO: f64 = 0.5;

// ==========================================
// PricingRule Trait
// ==========================================
// 用途: 可注册的校验规则
// 实现者: 5 条内置规则 + 调用方自定义规则
pub trait PricingRule: Send + Sync {
    /// 规则名（注册表内唯一）
    fn name(&self) -> &str;

    /// 规则默认严重级别
    fn severity(&self) -> Severity;

    /// 检查全部记录
    ///
    /// # 返回
    /// - Ok(findings): 可为空
    /// - Err: 规则自身执行失败（由校验器转换为一条 error 结果）
    fn check(
        &self,
        records: &[ExtractedPricingRecord],
        context: &ValidationContext,
    ) -> anyhow::Result<Vec<ValidationFinding>>;
}

// ==========================================
// currency-consistency
// ==========================================
pub struct CurrencyConsistencyRule;

impl PricingRule for CurrencyConsistencyRule {
    fn name(&self) -> &str {
        "currency-consistency"
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    /// 不同币种数 > 1 时恰好产生一条结果
    fn check(
        &self,
        records: &[ExtractedPricingRecord],
        context: &ValidationContext,
    ) -> anyhow::Result<Vec<ValidationFinding>> {
        let mut counts: BTreeMap<Currency, usize> = BTreeMap::new();
        for record in records {
            *counts.entry(record.currency).or_default() += 1;
        }
        if counts.len() <= 1 {
            return Ok(Vec::new());
        }

        // 主币种: 调用方期望币种（若出现）> 出现最多者
        let dominant = context
            .expected_currency
            .filter(|c| counts.contains_key(c))
            .or_else(|| {
                counts
                    .iter()
                    .fold(None, |best: Option<(Currency, usize)>, (c, n)| match best {
                        Some((_, m)) if m >= *n => best,
                        _ => Some((*c, *n)),
                    })
                    .map(|(c, _)| c)
            });

        let codes: Vec<&str> = counts.keys().map(Currency::code).collect();
        let currencies = codes.join(", ");
        let affected = records
            .iter()
            .filter(|r| Some(r.currency) != dominant)
            .map(ExtractedPricingRecord::record_id)
            .collect();
        let count_map: BTreeMap<&str, usize> = counts.iter().map(|(c, n)| (c.code(), *n)).collect();

        Ok(vec![ValidationFinding::new(
            self.name(),
            self.severity(),
            i18n::t_with_args("validation.mixed_currency", &[("currencies", currencies.as_str())]),
        )
        .with_records(affected)
        .with_suggestion(i18n::t("validation.mixed_currency_hint"))
        .with_value(json!({ "currencies": codes, "counts": count_map }))])
    }
}

// ==========================================
// price-reasonableness
// ==========================================
pub struct PriceReasonablenessRule;

impl PriceReasonablenessRule {
    /// 记录的合理区间
    ///
    /// 显式区间（按房型小写）优先；否则 币种区间 × 晚数/7 × 人数/2，上限再乘房型倍数
    pub fn expected_range(record: &ExtractedPricingRecord, context: &ValidationContext) -> (f64, f64) {
        if let Some(range) = context
            .type_price_ranges
            .get(&record.accommodation_type.to_lowercase())
        {
            return (range.min, range.max);
        }
        let (floor, ceiling) = currency_bounds(record.currency);
        let scale = (record.nights.max(1) as f64 / BASELINE_NIGHTS)
            * (record.party_size.max(1) as f64 / BASELINE_PARTY);
        let multiplier = accommodation_multiplier(&record.accommodation_type);
        (floor * scale, ceiling * multiplier * scale)
    }
}

impl PricingRule for PriceReasonablenessRule {
    fn name(&self) -> &str {
        "price-reasonableness"
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    /// 仅检查可售且非 0 的记录（0 价由 zero-prices 负责）
    fn check(
        &self,
        records: &[ExtractedPricingRecord],
        context: &ValidationContext,
    ) -> anyhow::Result<Vec<ValidationFinding>> {
        let mut findings = Vec::new();
        for record in records.iter().filter(|r| r.available && r.price > 0.0) {
            let (min, max) = Self::expected_range(record, context);
            let key = if record.price < min {
                "validation.price_too_low"
            } else if record.price > max {
                "validation.price_too_high"
            } else {
                continue;
            };

            let id = record.record_id();
            let price = format!("{:.2}", record.price);
            let min_text = format!("{:.2}", min);
            let max_text = format!("{:.2}", max);
            let message = i18n::t_with_args(
                key,
                &[
                    ("record", id.as_str()),
                    ("price", price.as_str()),
                    ("currency", record.currency.code()),
                    ("min", min_text.as_str()),
                    ("max", max_text.as_str()),
                ],
            );
            findings.push(
                ValidationFinding::new(self.name(), self.severity(), message)
                    .with_records(vec![id])
                    .with_suggestion(i18n::t("validation.price_range_hint"))
                    .with_value(json!({ "price": record.price, "min": min, "max": max })),
            );
        }
        Ok(findings)
    }
}

// ==========================================
// zero-prices
// ==========================================
pub struct ZeroPricesRule;

impl PricingRule for ZeroPricesRule {
    fn name(&self) -> &str {
        "zero-prices"
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    /// 可售且价格恰为 0；调用方允许 0 价时降级为 info
    fn check(
        &self,
        records: &[ExtractedPricingRecord],
        context: &ValidationContext,
    ) -> anyhow::Result<Vec<ValidationFinding>> {
        let affected: Vec<String> = records
            .iter()
            .filter(|r| r.available && r.price == 0.0)
            .map(ExtractedPricingRecord::record_id)
            .collect();
        if affected.is_empty() {
            return Ok(Vec::new());
        }

        let severity = if context.allow_zero_prices {
            Severity::Info
        } else {
            self.severity()
        };
        let count = affected.len().to_string();
        let listed = affected.join(", ");
        Ok(vec![ValidationFinding::new(
            self.name(),
            severity,
            i18n::t_with_args(
                "validation.zero_prices",
                &[("count", count.as_str()), ("records", listed.as_str())],
            ),
        )
        .with_records(affected)
        .with_suggestion(i18n::t("validation.zero_prices_hint"))])
    }
}

// ==========================================
// missing-prices
// ==========================================
pub struct MissingPricesRule;

impl PricingRule for MissingPricesRule {
    fn name(&self) -> &str {
        "missing-prices"
    }

    fn severity(&self) -> Severity {
        Severity::Info
    }

    /// 不可售比例；超过一半升级为 warning
    fn check(
        &self,
        records: &[ExtractedPricingRecord],
        _context: &ValidationContext,
    ) -> anyhow::Result<Vec<ValidationFinding>> {
        let affected: Vec<String> = records
            .iter()
            .filter(|r| !r.available)
            .map(ExtractedPricingRecord::record_id)
            .collect();
        if affected.is_empty() {
            return Ok(Vec::new());
        }

        let ratio = affected.len() as f64 / records.len() as f64;
        let severity = if ratio > MISSING_ESCALATION_RATIO {
            Severity::Warning
        } else {
            self.severity()
        };
        let count = affected.len().to_string();
        let total = records.len().to_string();
        let percent = format!("{:.0}", ratio * 100.0);
        Ok(vec![ValidationFinding::new(
            self.name(),
            severity,
            i18n::t_with_args(
                "validation.missing_prices",
                &[
                    ("count", count.as_str()),
                    ("total", total.as_str()),
                    ("percent", percent.as_str()),
                ],
            ),
        )
        .with_records(affected)
        .with_value(json!({ "ratio": ratio }))])
    }
}

// ==========================================
// price-progression
// ==========================================
pub struct PriceProgressionRule;

impl PricingRule for PriceProgressionRule {
    fn name(&self) -> &str {
        "price-progression"
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    /// 同一 (月份, 房型) 组内，晚数与人数均不小于且至少一项更大的组合价格更低即报警
    ///
    /// 价格相等不报警；不可售记录不参与
    fn check(
        &self,
        records: &[ExtractedPricingRecord],
        _context: &ValidationContext,
    ) -> anyhow::Result<Vec<ValidationFinding>> {
        let mut groups: BTreeMap<(&str, &str), Vec<&ExtractedPricingRecord>> = BTreeMap::new();
        for record in records.iter().filter(|r| r.available) {
            groups
                .entry((record.month.as_str(), record.accommodation_type.as_str()))
                .or_default()
                .push(record);
        }

        let mut findings = Vec::new();
        for ((month, accommodation), mut group) in groups {
            group.sort_by_key(|r| (r.nights, r.party_size));

            for (i, smaller) in group.iter().enumerate() {
                for larger in group.iter().skip(i + 1) {
                    let dominates = larger.nights >= smaller.nights
                        && larger.party_size >= smaller.party_size
                        && (larger.nights, larger.party_size) != (smaller.nights, smaller.party_size);
                    if !dominates || larger.price >= smaller.price {
                        continue;
                    }

                    let from = smaller.record_id();
                    let to = larger.record_id();
                    let from_combo = format!("{}/{}", smaller.nights, smaller.party_size);
                    let to_combo = format!("{}/{}", larger.nights, larger.party_size);
                    let from_price = format!("{:.2}", smaller.price);
                    let to_price = format!("{:.2}", larger.price);
                    let message = i18n::t_with_args(
                        "validation.price_progression",
                        &[
                            ("month", month),
                            ("accommodation", accommodation),
                            ("from", from.as_str()),
                            ("from_combo", from_combo.as_str()),
                            ("from_price", from_price.as_str()),
                            ("to", to.as_str()),
                            ("to_combo", to_combo.as_str()),
                            ("to_price", to_price.as_str()),
                        ],
                    );
                    findings.push(
                        ValidationFinding::new(self.name(), self.severity(), message)
                            .with_records(vec![from, to])
                            .with_suggestion(i18n::t("validation.price_progression_hint"))
                            .with_value(json!({
                                "lower_combination_price": smaller.price,
                                "higher_combination_price": larger.price,
                            })),
                    );
                }
            }
        }
        Ok(findings)
    }
}

/// 内置规则（注册顺序即执行顺序）
pub(super) fn builtin_rules() -> Vec<Box<dyn PricingRule>> {
    vec![
        Box::new(CurrencyConsistencyRule),
        Box::new(PriceReasonablenessRule),
        Box::new(ZeroPricesRule),
        Box::new(MissingPricesRule),
        Box::new(PriceProgressionRule),
    ]
}
