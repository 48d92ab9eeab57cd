use super::*;
use crate::domain::grid::CellRef;
use crate::domain::pricing::ExtractedPricingRecord;
use crate::domain::types::{Currency, Severity};
use crate::domain::validation::{NumberFormat, PriceRange, ValidationContext, ValidationFinding};

fn record(
    cell: (usize, usize),
    month: &str,
    accommodation: &str,
    nights: u32,
    party_size: u32,
    price: f64,
    currency: Currency,
) -> ExtractedPricingRecord {
    ExtractedPricingRecord {
        month: month.to_string(),
        accommodation_type: accommodation.to_string(),
        accommodation_code: accommodation.chars().take(3).collect::<String>().to_uppercase(),
        nights,
        party_size,
        price,
        currency,
        available: true,
        special_period: None,
        validity: None,
        note: None,
        source: CellRef::new(cell.0, cell.1),
        merged: false,
    }
}

fn unavailable(cell: (usize, usize)) -> ExtractedPricingRecord {
    ExtractedPricingRecord {
        price: 0.0,
        available: false,
        ..record(cell, "January", "Hotel", 7, 2, 0.0, Currency::Eur)
    }
}

fn by_rule<'a>(findings: &'a [ValidationFinding], rule: &str) -> Vec<&'a ValidationFinding> {
    findings.iter().filter(|f| f.rule == rule).collect()
}

// ==========================================
// 规则注册表
// ==========================================

#[test]
fn test_builtin_rule_registry() {
    let mut validator = PriceValidator::new();
    assert_eq!(
        validator.rule_names(),
        vec![
            "currency-consistency",
            "price-reasonableness",
            "zero-prices",
            "missing-prices",
            "price-progression",
        ]
    );

    assert!(validator.remove_rule("zero-prices"));
    assert!(!validator.remove_rule("zero-prices"));
    assert_eq!(validator.rule_names().len(), 4);
}

#[test]
fn test_removed_rule_does_not_run() {
    let mut validator = PriceValidator::new();
    validator.remove_rule("currency-consistency");
    let records = vec![
        record((1, 1), "January", "Hotel", 7, 2, 800.0, Currency::Eur),
        record((2, 1), "February", "Hotel", 7, 2, 800.0, Currency::Gbp),
    ];

    let findings = validator.validate_pricing(&records, None);
    assert!(by_rule(&findings, "currency-consistency").is_empty());
}

struct FailingRule;

impl PricingRule for FailingRule {
    fn name(&self) -> &str {
        "always-fails"
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(
        &self,
        _records: &[ExtractedPricingRecord],
        _context: &ValidationContext,
    ) -> anyhow::Result<Vec<ValidationFinding>> {
        anyhow::bail!("lookup table missing")
    }
}

struct PanickingRule;

impl PricingRule for PanickingRule {
    fn name(&self) -> &str {
        "always-panics"
    }

    fn severity(&self) -> Severity {
        Severity::Info
    }

    fn check(
        &self,
        records: &[ExtractedPricingRecord],
        _context: &ValidationContext,
    ) -> anyhow::Result<Vec<ValidationFinding>> {
        let _ = records[records.len() + 10].price;
        Ok(Vec::new())
    }
}

#[test]
fn test_failing_rules_become_single_error_findings() {
    let mut validator = PriceValidator::new();
    validator.register_rule(Box::new(FailingRule));
    validator.register_rule(Box::new(PanickingRule));

    let records = vec![
        record((1, 1), "January", "Hotel", 2, 2, 150.0, Currency::Eur),
        record((2, 1), "January", "Hotel", 7, 4, 100.0, Currency::Eur),
    ];
    let findings = validator.validate_pricing(&records, None);

    let failed = by_rule(&findings, "always-fails");
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].severity, Severity::Error);
    assert!(failed[0].message.contains("always-fails"));
    assert!(failed[0].message.contains("lookup table missing"));

    let panicked = by_rule(&findings, "always-panics");
    assert_eq!(panicked.len(), 1);
    assert_eq!(panicked[0].severity, Severity::Error);

    // 其余规则照常执行
    assert_eq!(by_rule(&findings, "price-progression").len(), 1);
}

#[test]
fn test_register_same_name_replaces() {
    let mut validator = PriceValidator::empty();
    validator.register_rule(Box::new(FailingRule));
    validator.register_rule(Box::new(FailingRule));
    assert_eq!(validator.rule_names(), vec!["always-fails"]);
}

// ==========================================
// currency-consistency
// ==========================================

#[test]
fn test_mixed_currency_single_error() {
    let records = vec![
        record((1, 1), "January", "Hotel", 7, 2, 150.0, Currency::Eur),
        record((2, 1), "February", "Hotel", 7, 2, 200.0, Currency::Gbp),
        record((3, 1), "March", "Hotel", 7, 2, 160.0, Currency::Eur),
    ];
    let findings = PriceValidator::new().validate_pricing(&records, None);

    let errors: Vec<_> = findings.iter().filter(|f| f.severity == Severity::Error).collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].rule, "currency-consistency");
    assert!(errors[0].message.contains("EUR"));
    assert!(errors[0].message.contains("GBP"));
    assert_eq!(errors[0].affected_records, vec!["B3"]);
}

#[test]
fn test_single_currency_no_finding() {
    let records = vec![
        record((1, 1), "January", "Hotel", 7, 2, 150.0, Currency::Chf),
        record((2, 1), "February", "Hotel", 7, 2, 200.0, Currency::Chf),
    ];
    let context = ValidationContext {
        expected_currency: Some(Currency::Eur),
        ..Default::default()
    };
    let findings = PriceValidator::new().validate_pricing(&records, Some(&context));
    assert!(by_rule(&findings, "currency-consistency").is_empty());
}

// ==========================================
// price-reasonableness
// ==========================================

#[test]
fn test_reasonableness_scaling() {
    let context = ValidationContext::default();
    let villa = record((1, 1), "July", "Villa", 7, 2, 0.0, Currency::Eur);
    let hostel_short = record((1, 2), "July", "Hostel", 2, 2, 0.0, Currency::Eur);

    let (min, max) = PriceReasonablenessRule::expected_range(&villa, &context);
    assert_eq!(min, 20.0);
    assert_eq!(max, 10_000.0);

    let (min, max) = PriceReasonablenessRule::expected_range(&hostel_short, &context);
    assert!((min - 20.0 * 2.0 / 7.0).abs() < 1e-9);
    assert!((max - 5_000.0 * 0.5 * 2.0 / 7.0).abs() < 1e-9);
}

#[test]
fn test_reasonableness_flags_outliers() {
    let records = vec![
        record((1, 1), "July", "Hotel", 7, 2, 9_000.0, Currency::Eur),
        record((2, 1), "July", "Villa", 7, 2, 9_000.0, Currency::Eur),
        record((3, 1), "July", "Apartment", 7, 2, 5.0, Currency::Eur),
    ];
    let findings = PriceValidator::new().validate_pricing(&records, None);
    let flagged = by_rule(&findings, "price-reasonableness");

    let ids: Vec<&str> = flagged.iter().map(|f| f.affected_records[0].as_str()).collect();
    assert_eq!(ids, vec!["B2", "B4"]);
    assert!(flagged.iter().all(|f| f.severity == Severity::Warning));
}

#[test]
fn test_reasonableness_explicit_range() {
    let mut context = ValidationContext::default();
    context
        .type_price_ranges
        .insert("hotel".to_string(), PriceRange { min: 500.0, max: 900.0 });
    let records = vec![record((1, 1), "July", "Hotel", 7, 2, 450.0, Currency::Eur)];

    let findings = PriceValidator::new().validate_pricing(&records, Some(&context));
    assert_eq!(by_rule(&findings, "price-reasonableness").len(), 1);
}

// ==========================================
// zero-prices / missing-prices
// ==========================================

#[test]
fn test_zero_prices_severity() {
    let records = vec![
        record((1, 1), "May", "Hotel", 7, 2, 0.0, Currency::Eur),
        record((2, 1), "June", "Hotel", 7, 2, 600.0, Currency::Eur),
    ];

    let findings = PriceValidator::new().validate_pricing(&records, None);
    let zero = by_rule(&findings, "zero-prices");
    assert_eq!(zero.len(), 1);
    assert_eq!(zero[0].severity, Severity::Warning);
    assert_eq!(zero[0].affected_records, vec!["B2"]);

    let context = ValidationContext {
        allow_zero_prices: true,
        ..Default::default()
    };
    let findings = PriceValidator::new().validate_pricing(&records, Some(&context));
    assert_eq!(by_rule(&findings, "zero-prices")[0].severity, Severity::Info);
}

#[test]
fn test_unavailable_records_are_not_zero_prices() {
    let records = vec![unavailable((1, 1)), record((2, 1), "June", "Hotel", 7, 2, 600.0, Currency::Eur)];
    let findings = PriceValidator::new().validate_pricing(&records, None);
    assert!(by_rule(&findings, "zero-prices").is_empty());
}

#[test]
fn test_missing_prices_escalation() {
    let half = vec![unavailable((1, 1)), record((2, 1), "June", "Hotel", 7, 2, 600.0, Currency::Eur)];
    let findings = PriceValidator::new().validate_pricing(&half, None);
    let missing = by_rule(&findings, "missing-prices");
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].severity, Severity::Info);

    let mostly = vec![
        unavailable((1, 1)),
        unavailable((2, 1)),
        record((3, 1), "June", "Hotel", 7, 2, 600.0, Currency::Eur),
    ];
    let findings = PriceValidator::new().validate_pricing(&mostly, None);
    assert_eq!(by_rule(&findings, "missing-prices")[0].severity, Severity::Warning);
}

#[test]
fn test_empty_records_produce_no_findings() {
    assert!(PriceValidator::new().validate_pricing(&[], None).is_empty());
}

// ==========================================
// price-progression
// ==========================================

#[test]
fn test_progression_decrease_names_both_cells() {
    let records = vec![
        record((1, 1), "January", "Hotel", 2, 2, 150.0, Currency::Eur),
        record((1, 5), "January", "Hotel", 7, 4, 100.0, Currency::Eur),
    ];
    let findings = PriceValidator::new().validate_pricing(&records, None);
    let progression = by_rule(&findings, "price-progression");

    assert_eq!(progression.len(), 1);
    assert_eq!(progression[0].severity, Severity::Warning);
    assert_eq!(progression[0].affected_records, vec!["B2", "F2"]);
    assert!(progression[0].message.contains("B2"));
    assert!(progression[0].message.contains("F2"));
}

#[test]
fn test_progression_monotone_and_ties_never_fire() {
    let mut records = Vec::new();
    let mut col = 1;
    for nights in [2, 3, 7] {
        for party_size in [2, 4] {
            let price = 100.0 * nights as f64 + 10.0 * party_size as f64;
            records.push(record((1, col), "March", "Villa", nights, party_size, price, Currency::Eur));
            col += 1;
        }
    }
    // 平价
    records.push(record((2, 1), "April", "Villa", 2, 2, 300.0, Currency::Eur));
    records.push(record((2, 2), "April", "Villa", 7, 2, 300.0, Currency::Eur));

    let findings = PriceValidator::new().validate_pricing(&records, None);
    assert!(by_rule(&findings, "price-progression").is_empty());
}

#[test]
fn test_progression_groups_by_month_and_type() {
    let records = vec![
        record((1, 1), "January", "Hotel", 2, 2, 500.0, Currency::Eur),
        record((2, 1), "February", "Hotel", 7, 2, 400.0, Currency::Eur),
        record((3, 1), "January", "Villa", 7, 2, 400.0, Currency::Eur),
    ];
    let findings = PriceValidator::new().validate_pricing(&records, None);
    assert!(by_rule(&findings, "price-progression").is_empty());
}

#[test]
fn test_progression_ignores_incomparable_combinations() {
    // 晚数更多但人数更少：不构成支配关系
    let records = vec![
        record((1, 1), "June", "Lodge", 2, 6, 900.0, Currency::Eur),
        record((1, 2), "June", "Lodge", 7, 2, 700.0, Currency::Eur),
    ];
    let findings = PriceValidator::new().validate_pricing(&records, None);
    assert!(by_rule(&findings, "price-progression").is_empty());
}

// ==========================================
// 单值检查
// ==========================================

#[test]
fn test_detect_and_validate_currency() {
    let euro = detect_and_validate_currency("€150.00");
    assert!(euro.is_valid);
    assert_eq!(euro.currency, Some(Currency::Eur));
    assert!(euro.symbol_found);
    assert!(!euro.code_found);

    let code = detect_and_validate_currency("150 GBP");
    assert!(code.is_valid && code.code_found);
    assert_eq!(code.currency, Some(Currency::Gbp));

    let conflict = detect_and_validate_currency("€150 / £130");
    assert!(!conflict.is_valid);
    assert!(conflict.message.unwrap().contains("GBP"));

    let none = detect_and_validate_currency("150");
    assert!(!none.is_valid);
    assert_eq!(none.currency, None);
}

#[test]
fn test_validate_number_format() {
    let comma = validate_number_format("1.500,50 €", None);
    assert!(comma.is_valid);
    assert_eq!(comma.format, NumberFormat::CommaDecimal);
    assert_eq!(comma.value, Some(1500.5));

    let dot = validate_number_format("$1,500.50", Some(Currency::Usd));
    assert!(dot.is_valid);
    assert_eq!(dot.format, NumberFormat::DotDecimal);

    let plain = validate_number_format("1500", None);
    assert_eq!(plain.format, NumberFormat::Plain);

    let precise = validate_number_format("12.3456", None);
    assert!(!precise.is_valid);
    assert_eq!(precise.issues.len(), 1);

    let negative = validate_number_format("-40", None);
    assert!(!negative.is_valid);

    let mismatch = validate_number_format("£200", Some(Currency::Eur));
    assert!(!mismatch.is_valid);
    assert!(mismatch.issues[0].contains("EUR"));

    let garbage = validate_number_format("call us", None);
    assert!(!garbage.is_valid);
    assert_eq!(garbage.format, NumberFormat::Unknown);
    assert_eq!(garbage.value, None);
}
