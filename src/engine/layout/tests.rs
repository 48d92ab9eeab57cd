use super::*;
use crate::domain::grid::CellGrid;
use crate::domain::layout::LayoutDetectionResult;
use crate::domain::types::{Orientation, PatternKind};

fn grid(rows: &[Vec<&str>]) -> CellGrid {
    CellGrid::from_strings(rows)
}

fn assert_bounds_inside(result: &LayoutDetectionResult, grid: &CellGrid) {
    for pattern in result.all_patterns() {
        assert!(pattern.confidence >= 0.0 && pattern.confidence <= 1.0);
        if grid.height() > 0 {
            assert!(pattern.bounds.end_row < grid.height());
            assert!(pattern.bounds.end_col < grid.width());
        }
    }
}

// ==========================================
// 月份在行
// ==========================================

#[test]
fn test_months_in_rows_scenario() {
    let g = grid(&[
        vec!["Month", "Hotel 2 Nights 2 Pax"],
        vec!["January", "€150.00"],
        vec!["February", "€160.00"],
        vec!["March", "€170.00"],
    ]);
    let detector = LayoutDetector::new();

    let result = detector.detect_layout(&g);
    assert_eq!(result.best_pattern.kind, PatternKind::MonthsInRows);
    assert_bounds_inside(&result, &g);

    let section = detector.find_pricing_section(&g).unwrap();
    assert_eq!(section.orientation, Orientation::RowsHoldMonths);
    assert_eq!(section.bounds.row_count(), 3);
    assert_eq!(section.header_row, Some(0));
    assert_eq!(section.accommodation_types, vec!["Hotel"]);
    assert_eq!(section.nights_options, vec![2]);
    assert_eq!(section.party_size_options, vec![2]);
}

#[test]
fn test_single_month_does_not_qualify() {
    let g = grid(&[vec!["January", "€150.00"], vec!["Total", "€150.00"]]);
    let result = LayoutDetector::new().detect_layout(&g);

    assert!(!result
        .all_patterns()
        .any(|p| p.kind == PatternKind::MonthsInRows));
}

// ==========================================
// 月份在列
// ==========================================

#[test]
fn test_months_in_columns() {
    let g = grid(&[
        vec!["Type", "Jan", "Feb", "Mar"],
        vec!["Hotel", "100", "110", "120"],
        vec!["Villa", "200", "210", "220"],
    ]);
    let detector = LayoutDetector::new();
    let result = detector.detect_layout(&g);

    assert_eq!(result.best_pattern.kind, PatternKind::MonthsInColumns);
    assert_bounds_inside(&result, &g);

    let section = detector.pricing_section_from(&g, &result).unwrap();
    assert_eq!(section.orientation, Orientation::ColumnsHoldMonths);
    assert_eq!(section.accommodation_types, vec!["Hotel", "Villa"]);
    assert_eq!(section.nights_options, vec![2, 3, 4, 7]);
    assert_eq!(section.party_size_options, vec![2, 4, 6]);
}

#[test]
fn test_nearby_same_family_candidates_are_suppressed() {
    let g = grid(&[
        vec!["", "Jan", "Feb", "Mar"],
        vec!["", "Apr", "May", "Jun"],
        vec!["Hotel", "1", "2", "3"],
    ]);
    let result = LayoutDetector::new().detect_layout(&g);

    let month_columns = result
        .all_patterns()
        .filter(|p| p.kind == PatternKind::MonthsInColumns)
        .count();
    assert_eq!(month_columns, 1);
}

// ==========================================
// 表头推导
// ==========================================

#[test]
fn test_header_derived_types_and_nights() {
    let g = grid(&[
        vec![
            "Month",
            "Hotel - 2 Nights",
            "Hotel - 3 Nights",
            "Self-Catering - 2 Nights",
        ],
        vec!["January", "100", "120", "90"],
        vec!["February", "110", "130", "95"],
    ]);
    let section = LayoutDetector::new().find_pricing_section(&g).unwrap();

    assert_eq!(section.orientation, Orientation::RowsHoldMonths);
    assert_eq!(section.accommodation_types, vec!["Hotel", "Self-Catering"]);
    assert_eq!(section.nights_options, vec![2, 3]);
    assert_eq!(section.party_size_options, vec![2, 4, 6]);
}

#[test]
fn test_pricing_matrix_without_months() {
    let g = grid(&[
        vec!["Room", "2 Pax", "4 Pax", "6 Pax"],
        vec!["Apartment", "300", "400", "500"],
        vec!["Lodge", "350", "450", "550"],
    ]);
    let detector = LayoutDetector::new();
    let result = detector.detect_layout(&g);

    assert_eq!(result.best_pattern.kind, PatternKind::PricingMatrix);
    let section = detector.pricing_section_from(&g, &result).unwrap();
    assert_eq!(section.orientation, Orientation::RowsHoldMonths);
    assert_eq!(section.party_size_options, vec![2, 4, 6]);
}

// ==========================================
// 退化结果
// ==========================================

#[test]
fn test_no_months_no_prices_is_low_confidence() {
    let g = grid(&[
        vec!["Welcome to our resort"],
        vec!["Contact the front desk for details"],
    ]);
    let detector = LayoutDetector::new();
    let result = detector.detect_layout(&g);

    assert_eq!(result.best_pattern.kind, PatternKind::Undetermined);
    assert!(result.overall_confidence < 0.2);
    assert!(result.best_pattern.confidence < 0.2);
    assert!(!result.suggestions.is_empty());
    assert!(detector.find_pricing_section(&g).is_none());
}

#[test]
fn test_empty_grid_is_degenerate() {
    let g = CellGrid::default();
    let detector = LayoutDetector::new();
    let result = detector.detect_layout(&g);

    assert_eq!(result.best_pattern.bounds.start_row, 0);
    assert_eq!(result.best_pattern.bounds.start_col, 0);
    assert!(result.other_patterns.is_empty());
    assert!(detector.find_pricing_section(&g).is_none());
    assert!(detector.find_inclusions_section(&g).is_none());
}

// ==========================================
// 包含项
// ==========================================

#[test]
fn test_inclusions_only_sheet() {
    let g = grid(&[
        vec!["Package includes:"],
        vec!["• Breakfast"],
        vec!["• WiFi"],
    ]);
    let detector = LayoutDetector::new();
    let result = detector.detect_layout(&g);

    assert_eq!(result.best_pattern.kind, PatternKind::Undetermined);
    assert!(result.overall_confidence < 0.2);
    assert!(result
        .other_patterns
        .iter()
        .any(|p| p.kind == PatternKind::InclusionsList));

    let section = detector.find_inclusions_section(&g).unwrap();
    assert_eq!(section.lines(), vec!["Breakfast", "WiFi"]);
}

#[test]
fn test_inclusions_next_to_pricing() {
    let g = grid(&[
        vec!["Month", "Hotel 7 Nights", "", "", "What's included"],
        vec!["January", "€700", "", "", "- Half board"],
        vec!["February", "€750", "", "", "- Airport transfer"],
    ]);
    let detector = LayoutDetector::new();
    let result = detector.detect_layout(&g);

    assert_eq!(result.best_pattern.kind, PatternKind::MonthsInRows);
    assert!(result
        .other_patterns
        .iter()
        .any(|p| p.kind == PatternKind::InclusionsList));
    assert!(result.overall_confidence > 0.5);
    assert_bounds_inside(&result, &g);
}
