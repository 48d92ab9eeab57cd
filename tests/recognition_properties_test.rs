// ==========================================
// 识别引擎 - 行为性质测试
// ==========================================
// 职责: 通过公共 API 验证版式 / 价格 / 校验的关键性质与场景
// ==========================================


use resort_offer_recognition::{
    CellRange, CellValue, Currency, LayoutDetector, MergeRange, Orientation, PatternKind,
    PriceValidator, PricingExtractor, PricingSection, Severity,
};
use test_helpers::{grid, record, three_month_rows};

// ==========================================
// 版式识别
// ==========================================

#[test]
fn test_grid_without_months_or_prices_is_low_confidence() {
    let grids = [
        grid(&[vec!["Welcome"], vec!["Please call reception"]]),
        grid(&[vec!["Name", "Phone"], vec!["Reception", "Desk"]]),
        grid(&[]),
    ];
    let detector = LayoutDetector::new();

    for g in &grids {
        let result = detector.detect_layout(g);
        assert!(result.overall_confidence < 0.2);
        assert!(result.best_pattern.confidence < 0.2);
        assert!(detector.find_pricing_section(g).is_none());
    }
}

#[test]
fn test_header_scenario_types_and_nights() {
    let g = grid(&[
        vec![
            "Month",
            "Hotel - 2 Nights",
            "Hotel - 3 Nights",
            "Self-Catering - 2 Nights",
        ],
        vec!["January", "100", "120", "90"],
        vec!["February", "110", "130", "95"],
        vec!["March", "115", "135", "99"],
    ]);
    let section = LayoutDetector::new().find_pricing_section(&g).unwrap();

    assert_eq!(section.accommodation_types, vec!["Hotel", "Self-Catering"]);
    assert_eq!(section.nights_options, vec![2, 3]);
}

// ==========================================
// 价格提取
// ==========================================

#[test]
fn test_three_month_scenario() {
    let g = grid(&three_month_rows());
    let section = LayoutDetector::new().find_pricing_section(&g).unwrap();

    assert_eq!(section.orientation, Orientation::RowsHoldMonths);
    assert_eq!(section.bounds.row_count(), 3);

    let records = PricingExtractor::new()
        .extract_pricing_matrix(&g, Some(section), &[])
        .unwrap()
        .unwrap();

    assert_eq!(records.len(), 3);
    let prices: Vec<f64> = records.iter().map(|r| r.price).collect();
    assert_eq!(prices, vec![150.0, 160.0, 170.0]);
    for r in &records {
        assert_eq!(r.currency, Currency::Eur);
        assert!(r.available);
        assert_eq!((r.nights, r.party_size), (2, 2));
    }
}

#[test]
fn test_not_available_cell() {
    let g = grid(&[
        vec!["Month", "Hotel 2 Nights 2 Pax"],
        vec!["January", "€150.00"],
        vec!["February", "N/A"],
        vec!["March", "€170.00"],
    ]);
    let section = LayoutDetector::new().find_pricing_section(&g);
    let records = PricingExtractor::new()
        .extract_pricing_matrix(&g, section, &[])
        .unwrap()
        .unwrap();

    let february = records.iter().find(|r| r.month == "February").unwrap();
    assert_eq!(february.price, 0.0);
    assert!(!february.available);
}

#[test]
fn test_currency_detection_symbol_code_symmetry() {
    let extractor = PricingExtractor::new();
    let pairs = [
        ("€12.00", "12.00 EUR"),
        ("£12.00", "12.00 GBP"),
        ("$12.00", "12.00 USD"),
        ("₹12.00", "12.00 INR"),
    ];

    for (symbol, code) in pairs {
        let by_symbol = extractor.detect_currency(&grid(&[vec!["January", symbol]]));
        let by_code = extractor.detect_currency(&grid(&[vec!["January", code]]));
        assert_eq!(by_symbol, by_code, "{} / {}", symbol, code);
    }
}

#[test]
fn test_merge_broadcasts_anchor_to_every_covered_cell() {
    let g = grid(&[
        vec!["January", "€150.00", "€210.00"],
        vec!["February", "", ""],
        vec!["March", "", ""],
        vec!["April", "€180.00", "€240.00"],
    ]);
    let merges = vec![MergeRange::new(
        CellRange::new(0, 1, 2, 2),
        CellValue::text("€150.00"),
    )];
    let section = PricingSection {
        bounds: CellRange::new(0, 0, 3, 2),
        orientation: Orientation::RowsHoldMonths,
        header_row: None,
        label_col: 0,
        accommodation_types: vec!["Hotel".to_string()],
        nights_options: vec![2, 7],
        party_size_options: vec![2],
        source_kind: PatternKind::MonthsInRows,
        confidence: 0.8,
    };

    let records = PricingExtractor::new()
        .extract_pricing_matrix(&g, Some(section), &merges)
        .unwrap()
        .unwrap();

    let covered: Vec<_> = records
        .iter()
        .filter(|r| merges[0].range.contains(r.source.row, r.source.col))
        .collect();
    assert_eq!(covered.len(), 6);
    assert!(covered.iter().all(|r| r.merged && r.price == 150.0));

    let april: Vec<_> = records.iter().filter(|r| r.month == "April").collect();
    assert!(april.iter().all(|r| !r.merged));
}

// ==========================================
// 价格校验
// ==========================================

#[test]
fn test_mixed_currency_scenario() {
    let records = vec![
        record((1, 1), "January", "Hotel", 2, 2, 150.0, Currency::Eur),
        record((2, 1), "February", "Hotel", 2, 2, 200.0, Currency::Gbp),
    ];
    let findings = PriceValidator::new().validate_pricing(&records, None);

    let errors: Vec<_> = findings
        .iter()
        .filter(|f| f.severity == Severity::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].rule, "currency-consistency");
    assert!(errors[0].message.contains("EUR"));
    assert!(errors[0].message.contains("GBP"));
}

#[test]
fn test_currency_consistency_fires_iff_multiple_currencies() {
    let validator = PriceValidator::new();
    let currencies = Currency::ALL;

    for mask in 1u32..(1 << 3) {
        let chosen: Vec<Currency> = (0..3)
            .filter(|bit| mask & (1 << bit) != 0)
            .map(|bit| currencies[bit])
            .collect();
        let records: Vec<_> = chosen
            .iter()
            .enumerate()
            .map(|(i, c)| record((i + 1, 1), "January", "Hotel", 7, 2, 900.0, *c))
            .collect();

        let fired = validator
            .validate_pricing(&records, None)
            .iter()
            .filter(|f| f.rule == "currency-consistency")
            .count();
        assert_eq!(fired, usize::from(chosen.len() > 1), "{:?}", chosen);
    }
}

#[test]
fn test_progression_scenario_names_both_cells() {
    let records = vec![
        record((1, 1), "January", "Hotel", 2, 2, 150.0, Currency::Eur),
        record((1, 5), "January", "Hotel", 7, 4, 100.0, Currency::Eur),
    ];
    let findings = PriceValidator::new().validate_pricing(&records, None);

    let progression: Vec<_> = findings
        .iter()
        .filter(|f| f.rule == "price-progression")
        .collect();
    assert_eq!(progression.len(), 1);
    assert_eq!(progression[0].severity, Severity::Warning);
    assert_eq!(progression[0].affected_records, vec!["B2", "F2"]);
}

#[test]
fn test_progression_silent_on_monotone_prices() {
    let nights = [2u32, 3, 4, 7];
    let party = [2u32, 4, 6];
    let validator = PriceValidator::new();

    for step in [0.0, 5.0, 40.0] {
        let mut records = Vec::new();
        for (i, n) in nights.iter().enumerate() {
            for (j, p) in party.iter().enumerate() {
                let price = 500.0 + step * (*n as f64) + step * (*p as f64);
                for (k, month) in ["January", "February"].iter().enumerate() {
                    records.push(record(
                        (k * 10 + i + 1, j + 1),
                        month,
                        "Villa",
                        *n,
                        *p,
                        price,
                        Currency::Eur,
                    ));
                }
            }
        }

        let findings = validator.validate_pricing(&records, None);
        assert!(findings.iter().all(|f| f.rule != "price-progression"));
    }
}
