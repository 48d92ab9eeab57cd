use crate::domain::pricing::ExtractedPricingRecord;
use crate::domain::types::{Currency, Severity};
use crate::domain::validation::{
    CurrencyCheck, NumberFormat, NumberFormatCheck, ValidationContext, ValidationFinding,
};
use crate::engine::matchers::{
    currency_marks, detect_text_currency, has_at_most_two_decimals, parse_amount, strip_currency,
    strip_price_decorations,
};
use crate::i18n;
use serde_json::json;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, info, instrument, warn};

use super::rules::{builtin_rules, PricingRule};

// ==========================================
// PriceValidator - 价格校验引擎
// ==========================================
pub struct PriceValidator {
    rules: Vec<Box<dyn PricingRule>>,
}

impl PriceValidator {
    /// 创建校验器（注册全部内置规则）
    pub fn new() -> Self {
        Self {
            rules: builtin_rules(),
        }
    }

    /// 创建空校验器（不含任何规则）
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    // ==========================================
    // 规则注册表
    // ==========================================

    /// 注册规则；同名规则被替换（保持原位置）
    pub fn register_rule(&mut self, rule: Box<dyn PricingRule>) {
        match self.rules.iter().position(|r| r.name() == rule.name()) {
            Some(index) => {
                debug!(rule = %rule.name(), "替换同名规则");
                self.rules[index] = rule;
            }
            None => self.rules.push(rule),
        }
    }

    /// 移除规则
    ///
    /// # 返回
    /// 是否存在并已移除
    pub fn remove_rule(&mut self, name: &str) -> bool {
        let before = self.rules.len();
        self.rules.retain(|r| r.name() != name);
        self.rules.len() != before
    }

    /// 已注册规则名（执行顺序）
    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    // ==========================================
    // 主入口
    // ==========================================

    /// 运行全部规则
    ///
    /// # 参数
    /// - context: 调用方上下文（None = 默认上下文）
    ///
    /// # 返回
    /// 按规则注册顺序拼接的校验结果；单条规则失败转换为一条 error 结果
    #[instrument(skip(self, records, context), fields(records = records.len(), rules = self.rules.len()))]
    pub fn validate_pricing(
        &self,
        records: &[ExtractedPricingRecord],
        context: Option<&ValidationContext>,
    ) -> Vec<ValidationFinding> {
        let default_context = ValidationContext::default();
        let context = context.unwrap_or(&default_context);

        let mut findings = Vec::new();
        for rule in &self.rules {
            let outcome = catch_unwind(AssertUnwindSafe(|| rule.check(records, context)));
            match outcome {
                Ok(Ok(rule_findings)) => {
                    debug!(rule = %rule.name(), findings = rule_findings.len(), "规则执行完成");
                    findings.extend(rule_findings);
                }
                Ok(Err(err)) => {
                    warn!(rule = %rule.name(), error = %err, "规则执行失败");
                    findings.push(rule_failure(rule.name(), &err.to_string()));
                }
                Err(payload) => {
                    let reason = panic_message(payload.as_ref());
                    warn!(rule = %rule.name(), reason = %reason, "规则执行 panic");
                    findings.push(rule_failure(rule.name(), &reason));
                }
            }
        }

        info!(
            findings = findings.len(),
            errors = findings.iter().filter(|f| f.severity == Severity::Error).count(),
            warnings = findings.iter().filter(|f| f.severity == Severity::Warning).count(),
            "价格校验完成"
        );
        findings
    }
}

impl Default for PriceValidator {
    fn default() -> Self {
        Self::new()
    }
}

fn rule_failure(rule: &str, reason: &str) -> ValidationFinding {
    ValidationFinding::new(
        rule,
        Severity::Error,
        i18n::t_with_args("validation.rule_failed", &[("rule", rule), ("error", reason)]),
    )
    .with_value(json!({ "error": reason }))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic".to_string()
    }
}

// ==========================================
// 单值检查
// ==========================================

/// 单个值的币种检查
///
/// - 无币种标记: is_valid = false
/// - 同一值中出现两种币种: is_valid = false
pub fn detect_and_validate_currency(text: &str) -> CurrencyCheck {
    let marks = currency_marks(text);
    let symbol_found = marks.iter().any(|m| m.symbol);
    let code_found = marks.iter().any(|m| m.code);

    match marks.as_slice() {
        [] => CurrencyCheck {
            currency: None,
            symbol_found,
            code_found,
            is_valid: false,
            message: Some(i18n::t("validation.no_currency")),
        },
        [single] => CurrencyCheck {
            currency: Some(single.currency),
            symbol_found,
            code_found,
            is_valid: true,
            message: None,
        },
        [first, ..] => {
            let codes = marks
                .iter()
                .map(|m| m.currency.code())
                .collect::<Vec<_>>()
                .join(", ");
            CurrencyCheck {
                currency: Some(first.currency),
                symbol_found,
                code_found,
                is_valid: false,
                message: Some(i18n::t_with_args(
                    "validation.currency_conflict",
                    &[("currencies", codes.as_str())],
                )),
            }
        }
    }
}

/// 单个值的数字格式检查
///
/// # 问题项
/// - 无法解析 / 负数 / 超过两位小数 / 币种与期望不符
pub fn validate_number_format(text: &str, expected_currency: Option<Currency>) -> NumberFormatCheck {
    let currency = detect_text_currency(text);
    let body: String = strip_price_decorations(&strip_currency(text))
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}')
        .collect();
    let format = classify_format(body.trim_start_matches('-'));
    let value = parse_amount(text);

    let mut issues = Vec::new();
    match value {
        None => issues.push(i18n::t_with_args(
            "validation.number_unparseable",
            &[("text", text.trim())],
        )),
        Some(v) => {
            if v < 0.0 {
                issues.push(i18n::t("validation.number_negative"));
            }
            if !has_at_most_two_decimals(v) {
                issues.push(i18n::t("validation.number_precision"));
            }
        }
    }
    if let (Some(expected), Some(found)) = (expected_currency, currency) {
        if expected != found {
            issues.push(i18n::t_with_args(
                "validation.number_currency_mismatch",
                &[("expected", expected.code()), ("found", found.code())],
            ));
        }
    }

    NumberFormatCheck {
        is_valid: issues.is_empty(),
        value,
        format: if value.is_some() { format } else { NumberFormat::Unknown },
        currency,
        issues,
    }
}

/// 分隔符约定（与 parse_amount 的判定一致）
fn classify_format(body: &str) -> NumberFormat {
    if body.is_empty() || body.chars().any(|c| !(c.is_ascii_digit() || c == ',' || c == '.')) {
        return NumberFormat::Unknown;
    }
    let commas = body.matches(',').count();
    let dots = body.matches('.').count();
    let digits_after = |sep: char| body.rfind(sep).map(|i| body.len() - i - 1).unwrap_or(0);

    match (commas, dots) {
        (0, 0) => NumberFormat::Plain,
        (_, 0) if commas == 1 && (1..=2).contains(&digits_after(',')) => NumberFormat::CommaDecimal,
        (_, 0) => NumberFormat::DotDecimal,
        (0, _) if dots > 1 || digits_after('.') == 3 => NumberFormat::CommaDecimal,
        (0, _) => NumberFormat::Plain,
        _ => {
            if body.rfind(',') > body.rfind('.') {
                NumberFormat::CommaDecimal
            } else {
                NumberFormat::DotDecimal
            }
        }
    }
}
