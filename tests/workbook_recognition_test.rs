// ==========================================
// 识别引擎 - 工作簿端到端测试
// ==========================================
// 职责: calamine 适配 → 编排器；CSV 网格；配置覆盖；自定义规则
// ==========================================


use calamine::{Data, Dimensions, Range};
use resort_offer_recognition::importer::worksheet_from_calamine;
use resort_offer_recognition::logging;
use resort_offer_recognition::{
    CellGrid, Currency, ExtractedPricingRecord, PricingRule, RecognitionConfig, RecognitionError,
    RecognitionOrchestrator, Severity, ValidationContext, ValidationFinding, Workbook, Worksheet,
};
use test_helpers::{single_sheet_workbook, three_month_rows};

fn calamine_range(rows: &[Vec<Data>]) -> Range<Data> {
    let height = rows.len() as u32;
    let width = rows.iter().map(Vec::len).max().unwrap_or(0) as u32;
    let mut range = Range::new((0, 0), (height - 1, width - 1));
    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            range.set_value((r as u32, c as u32), value.clone());
        }
    }
    range
}

fn text(s: &str) -> Data {
    Data::String(s.to_string())
}

// ==========================================
// calamine 工作簿
// ==========================================

#[test]
fn test_calamine_sheet_end_to_end() {
    logging::init_test();

    let range = calamine_range(&[
        vec![text("Resort: Costa Verde"), Data::Empty],
        vec![text("Month"), text("Hotel 2 Nights 2 Pax")],
        vec![text("January"), text("€150.00")],
        vec![text("February"), text("€160.00")],
        vec![text("March"), text("€170.00")],
    ]);
    let sheet = worksheet_from_calamine("Prices 2025", &range, &[]).unwrap();
    let report = RecognitionOrchestrator::new()
        .analyze_workbook(&Workbook::new(vec![sheet]))
        .unwrap();

    assert_eq!(report.metadata.resort_name.as_deref(), Some("Costa Verde"));
    assert_eq!(report.records.len(), 3);
    assert_eq!(report.records[0].record_id(), "B3");
    assert!(report.records.iter().all(|r| r.currency == Currency::Eur));
    assert_eq!(report.error_count(), 0);
    assert!(report.processable);
}

#[test]
fn test_calamine_merged_price_is_broadcast() {
    let range = calamine_range(&[
        vec![text("Month"), text("Villa 7 Nights 4 Pax")],
        vec![text("January"), text("€1,800.00")],
        vec![text("February"), text("€2,100.00")],
        vec![text("March"), Data::Empty],
        vec![text("April"), text("€1,900.00")],
    ]);
    let merged = [Dimensions {
        start: (2, 1),
        end: (3, 1),
    }];
    let sheet = worksheet_from_calamine("Sheet1", &range, &merged).unwrap();
    let report = RecognitionOrchestrator::new()
        .analyze_sheet(&sheet)
        .unwrap();

    let march = report.records.iter().find(|r| r.month == "March").unwrap();
    assert!(march.merged);
    assert!(march.available);
    assert_eq!(march.price, 2100.0);

    let january = report.records.iter().find(|r| r.month == "January").unwrap();
    assert!(!january.merged);
}

#[test]
fn test_calamine_merge_out_of_bounds_rejected() {
    let range = calamine_range(&[vec![text("January"), text("€150.00")]]);
    let merged = [Dimensions {
        start: (0, 1),
        end: (5, 1),
    }];

    let result = worksheet_from_calamine("Sheet1", &range, &merged);
    assert!(matches!(
        result,
        Err(RecognitionError::MergeOutOfBounds { .. })
    ));
}

// ==========================================
// CSV 网格
// ==========================================

#[test]
fn test_csv_grid_with_comma_decimals() {
    let csv = "Month,Hotel 2 Nights 2 Pax\nJanuary,\"€150,00\"\nFebruary,\"€160,00\"\nMarch,\"€170,00\"\n";
    let grid = CellGrid::from_csv_str(csv).unwrap();
    let report = RecognitionOrchestrator::new()
        .analyze_workbook(&Workbook::new(vec![Worksheet::new("Costa Verde", grid)]))
        .unwrap();

    let prices: Vec<f64> = report.records.iter().map(|r| r.price).collect();
    assert_eq!(prices, vec![150.0, 160.0, 170.0]);
}

// ==========================================
// 配置与规则
// ==========================================

#[test]
fn test_config_threshold_override() {
    let workbook = single_sheet_workbook("Costa Verde", &three_month_rows());

    let default_report = RecognitionOrchestrator::new()
        .analyze_workbook(&workbook)
        .unwrap();
    assert!(default_report.processable);

    let strict = RecognitionConfig::from_json_str(
        r#"{"orchestration": {"min_processable_confidence": 0.99}}"#,
    )
    .unwrap();
    let strict_report = RecognitionOrchestrator::with_config(&strict)
        .analyze_workbook(&workbook)
        .unwrap();
    assert_eq!(strict_report.records.len(), 3);
    assert!(!strict_report.processable);
}

struct JanuaryOnlyRule;

impl PricingRule for JanuaryOnlyRule {
    fn name(&self) -> &str {
        "january-only"
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn check(
        &self,
        records: &[ExtractedPricingRecord],
        _context: &ValidationContext,
    ) -> anyhow::Result<Vec<ValidationFinding>> {
        let outside: Vec<String> = records
            .iter()
            .filter(|r| r.month != "January")
            .map(ExtractedPricingRecord::record_id)
            .collect();
        if outside.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![ValidationFinding::new(
            self.name(),
            self.severity(),
            "records outside January",
        )
        .with_records(outside)])
    }
}

#[test]
fn test_custom_rule_blocks_processing() {
    let workbook = single_sheet_workbook("Costa Verde", &three_month_rows());
    let mut orchestrator = RecognitionOrchestrator::new();
    orchestrator
        .validator_mut()
        .register_rule(Box::new(JanuaryOnlyRule));

    let report = orchestrator.analyze_workbook(&workbook).unwrap();

    let custom: Vec<_> = report
        .findings
        .iter()
        .filter(|f| f.rule == "january-only")
        .collect();
    assert_eq!(custom.len(), 1);
    assert_eq!(custom[0].affected_records, vec!["B3", "B4"]);
    assert!(!report.processable);
}

#[test]
fn test_report_serializes_to_json() {
    let workbook = single_sheet_workbook("Costa Verde", &three_month_rows());
    let report = RecognitionOrchestrator::new()
        .analyze_workbook(&workbook)
        .unwrap();

    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["records"].as_array().map(Vec::len), Some(3));
    assert_eq!(value["records"][0]["currency"], "EUR");
    assert_eq!(value["metadata"]["currency"], "EUR");
}
