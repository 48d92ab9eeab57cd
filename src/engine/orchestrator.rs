// ==========================================
// 度假村报价表识别引擎 - 引擎编排器
// ==========================================
// 用途: 协调五个识别引擎的执行顺序，汇总为一份识别报告
// 流程: 元数据 → (逐表) 版式 → 价格区域 → 价格提取 → 包含项 → 校验 → 评分
// ==========================================

use crate::config::{OrchestrationConfig, RecognitionConfig};
use crate::domain::grid::{Workbook, Worksheet};
use crate::domain::layout::{InclusionsDetectionResult, LayoutDetectionResult};
use crate::domain::metadata::ResortMetadata;
use crate::domain::pricing::{ExtractedPricingRecord, PricingSection};
use crate::domain::types::Severity;
use crate::domain::validation::{ValidationContext, ValidationFinding};
use crate::engine::scoring::clamp_unit;
use crate::engine::{
    InclusionsDetector, LayoutDetector, MetadataExtractor, PriceValidator, PricingExtractor,
};
use crate::i18n;
use crate::importer::error::RecognitionResult;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info, instrument};

/// 整体置信度权重
const METADATA_WEIGHT: f64 = 0.2;
const LAYOUT_WEIGHT: f64 = 0.4;
const EXTRACTION_WEIGHT: f64 = 0.2;
const VALIDATION_WEIGHT: f64 = 0.2;

/// 校验健康度扣分
const ERROR_PENALTY: f64 = 0.5;
const WARNING_PENALTY: f64 = 0.1;

// ==========================================
// SheetReport - 单表识别结果
// ==========================================

#[derive(Debug, Clone, Serialize)]
pub struct SheetReport {
    pub sheet_name: String,

    // LayoutDetector 输出
    pub layout: LayoutDetectionResult,
    pub pricing_section: Option<PricingSection>,

    // PricingExtractor 输出
    pub records: Vec<ExtractedPricingRecord>,

    // InclusionsDetector 输出
    pub inclusions: InclusionsDetectionResult,
}

// ==========================================
// RecognitionReport - 工作簿识别报告
// ==========================================

#[derive(Debug, Clone, Serialize)]
pub struct RecognitionReport {
    pub metadata: ResortMetadata,
    pub sheets: Vec<SheetReport>,

    /// 全部工作表的记录（按工作表顺序拼接）
    pub records: Vec<ExtractedPricingRecord>,

    pub findings: Vec<ValidationFinding>,

    /// 整体置信度 ∈ [0, 1]
    pub overall_confidence: f64,

    /// 可处理: 有记录 + 无 error + 整体置信度达标
    pub processable: bool,

    /// 改进建议（去重，保持首次出现顺序）
    pub suggestions: Vec<String>,
}

impl RecognitionReport {
    pub fn error_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Warning)
            .count()
    }
}

// ==========================================
// RecognitionOrchestrator - 引擎编排器
// ==========================================

pub struct RecognitionOrchestrator {
    config: OrchestrationConfig,
    metadata: MetadataExtractor,
    layout: LayoutDetector,
    pricing: PricingExtractor,
    inclusions: InclusionsDetector,
    validator: PriceValidator,
}

impl RecognitionOrchestrator {
    /// 创建编排器（默认配置）
    pub fn new() -> Self {
        Self::with_config(&RecognitionConfig::default())
    }

    pub fn with_config(config: &RecognitionConfig) -> Self {
        Self {
            config: config.orchestration.clone(),
            metadata: MetadataExtractor::with_config(config),
            layout: LayoutDetector::with_config(config),
            pricing: PricingExtractor::with_config(config),
            inclusions: InclusionsDetector::with_config(config),
            validator: PriceValidator::new(),
        }
    }

    /// 校验器（用于注册 / 移除规则）
    pub fn validator_mut(&mut self) -> &mut PriceValidator {
        &mut self.validator
    }

    // ==========================================
    // 单表识别
    // ==========================================

    /// 识别单个工作表
    ///
    /// # 返回
    /// - Err: 合并区域越界（上游契约错误）
    #[instrument(skip(self, sheet), fields(sheet = %sheet.name))]
    pub fn analyze_sheet(&self, sheet: &Worksheet) -> RecognitionResult<SheetReport> {
        let grid = &sheet.grid;

        // 1. 版式识别 + 价格区域
        let layout = self.layout.detect_layout(grid);
        let pricing_section = self.layout.pricing_section_from(grid, &layout);

        // 2. 价格提取
        let records = self
            .pricing
            .extract_pricing_matrix(grid, pricing_section.clone(), &sheet.merges)?
            .unwrap_or_default();

        // 3. 包含项
        let inclusions = self.inclusions.detect_inclusions_sections(grid);

        debug!(
            best = %layout.best_pattern.kind,
            records = records.len(),
            inclusion_sections = inclusions.sections.len(),
            "工作表识别完成"
        );

        Ok(SheetReport {
            sheet_name: sheet.name.clone(),
            layout,
            pricing_section,
            records,
            inclusions,
        })
    }

    // ==========================================
    // 工作簿识别
    // ==========================================

    /// 识别整个工作簿
    ///
    /// # 返回
    /// - Ok(RecognitionReport): 含元数据、逐表结果、记录、校验结果、整体置信度与建议
    /// - Err: 任一工作表的合并区域越界
    #[instrument(skip(self, workbook), fields(sheets = workbook.sheets.len()))]
    pub fn analyze_workbook(&self, workbook: &Workbook) -> RecognitionResult<RecognitionReport> {
        info!("开始识别工作簿");

        // 1. 元数据
        let metadata = self.metadata.extract_metadata(workbook);

        // 2. 逐表识别
        let sheets = workbook
            .sheets
            .iter()
            .map(|sheet| self.analyze_sheet(sheet))
            .collect::<RecognitionResult<Vec<_>>>()?;

        // 3. 合并记录，补齐有效期
        let mut records: Vec<ExtractedPricingRecord> =
            sheets.iter().flat_map(|s| s.records.iter().cloned()).collect();
        if let Some(validity) = metadata.validity {
            for record in records.iter_mut().filter(|r| r.validity.is_none()) {
                record.validity = Some(validity);
            }
        }

        // 4. 校验（元数据币种作为期望币种）
        let context = ValidationContext {
            expected_currency: Some(metadata.currency),
            ..Default::default()
        };
        let findings = self.validator.validate_pricing(&records, Some(&context));

        // 5. 评分
        let layout_confidence = sheets
            .iter()
            .map(|s| s.layout.best_pattern.confidence)
            .fold(0.0, f64::max);
        let overall_confidence = overall_score(
            metadata.average_confidence(),
            layout_confidence,
            extraction_quality(&records),
            validation_health(&findings),
        );
        let has_error = findings.iter().any(|f| f.severity == Severity::Error);
        let processable = !records.is_empty()
            && !has_error
            && overall_confidence >= self.config.min_processable_confidence;

        // 6. 建议
        let suggestions = self.collect_suggestions(&metadata, &sheets, &records, &findings, overall_confidence);

        info!(
            records = records.len(),
            findings = findings.len(),
            overall_confidence,
            processable,
            "工作簿识别完成"
        );

        Ok(RecognitionReport {
            metadata,
            sheets,
            records,
            findings,
            overall_confidence,
            processable,
            suggestions,
        })
    }

    fn collect_suggestions(
        &self,
        metadata: &ResortMetadata,
        sheets: &[SheetReport],
        records: &[ExtractedPricingRecord],
        findings: &[ValidationFinding],
        overall_confidence: f64,
    ) -> Vec<String> {
        let mut raw: Vec<String> = Vec::new();

        if records.is_empty() {
            raw.push(i18n::t("report.no_records"));
        }
        if overall_confidence < self.config.min_processable_confidence {
            let confidence = format!("{:.2}", overall_confidence);
            raw.push(i18n::t_with_args(
                "report.low_confidence",
                &[("confidence", confidence.as_str())],
            ));
        }
        for sheet in sheets {
            raw.extend(sheet.layout.suggestions.iter().cloned());
            raw.extend(sheet.inclusions.suggestions.iter().cloned());
        }
        if metadata.resort_name.is_none() {
            raw.push(i18n::t("metadata.missing_resort_name"));
        }
        if metadata.currency_hits.is_empty() {
            raw.push(i18n::t("metadata.default_currency"));
        }
        if metadata.validity.is_none() {
            raw.push(i18n::t("metadata.missing_validity"));
        }
        raw.extend(findings.iter().filter_map(|f| f.suggestion.clone()));

        let mut seen = HashSet::new();
        raw.into_iter().filter(|s| seen.insert(s.clone())).collect()
    }
}

impl Default for RecognitionOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// 评分函数
// ==========================================

/// 可售记录占比（无记录为 0）
fn extraction_quality(records: &[ExtractedPricingRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    records.iter().filter(|r| r.available).count() as f64 / records.len() as f64
}

/// 1.0，有 error 扣 0.5，每个 warning 扣 0.1，下限 0
fn validation_health(findings: &[ValidationFinding]) -> f64 {
    let has_error = findings.iter().any(|f| f.severity == Severity::Error);
    let warnings = findings
        .iter()
        .filter(|f| f.severity == Severity::Warning)
        .count();
    let penalty = if has_error { ERROR_PENALTY } else { 0.0 } + WARNING_PENALTY * warnings as f64;
    (1.0 - penalty).max(0.0)
}

fn overall_score(metadata: f64, layout: f64, extraction: f64, validation: f64) -> f64 {
    clamp_unit(
        METADATA_WEIGHT * metadata
            + LAYOUT_WEIGHT * layout
            + EXTRACTION_WEIGHT * extraction
            + VALIDATION_WEIGHT * validation,
    )
}
