// ==========================================
// 度假村报价表识别引擎 - 元数据提取引擎
// ==========================================
// 职责: 度假村名称 / 目的地 / 币种 / 季节 / 特殊时段 / 有效期
// 输入: 整个工作簿（工作表名 + 网格）
// 输出: ResortMetadata（逐字段置信度 + 来源位置）
// ==========================================
// 红线: 扫描窗口有界（每表前 50 行 × 20 列）
// 红线: 无年份日期用 reference_year 补全，不读取系统时钟
// ==========================================

use crate::config::{MetadataConfig, RecognitionConfig};
use crate::domain::grid::{CellGrid, CellRef, Workbook};
use crate::domain::metadata::{
    CurrencyTally, DateRange, ResortMetadata, SourceLocation, SpecialPeriod, ValidityWindow,
};
use crate::domain::types::{Currency, SpecialPeriodKind};
use crate::engine::pricing::currency_hits;
use crate::engine::vocabulary::{
    canonical_month, GENERIC_SHEET_NAMES, MONTHS, NAME_BOILERPLATE_WORDS, SPECIAL_PERIOD_PATTERNS,
};
use chrono::NaiveDate;
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;
use tracing::{debug, info, instrument};

/// 置信度常量
const SHEET_NAME_CONFIDENCE: f64 = 0.7;
const LABEL_CONFIDENCE: f64 = 0.6;
const DEFAULT_CURRENCY_CONFIDENCE: f64 = 0.3;
const SEASON_CONFIDENCE: f64 = 0.6;
const FULL_VALIDITY_CONFIDENCE: f64 = 0.9;
const PARTIAL_VALIDITY_CONFIDENCE: f64 = 0.8;

/// 币种命中示例上限
const MAX_CURRENCY_EXAMPLES: usize = 3;

/// 全大写名称的最大字母数
const MAX_ALL_CAPS_LETTERS: usize = 10;

/// 单个日期（数字或英文月份）
const DATE: &str = r"(?:\d{4}-\d{1,2}-\d{1,2}|\d{1,2}[./-]\d{1,2}[./-]\d{2,4}|\d{1,2}\s+[a-z]{3,9}\.?,?\s+\d{4}|[a-z]{3,9}\.?\s+\d{1,2},?\s+\d{4})";

/// 英文月份（全称或缩写）
const MONTH_TOKEN: &str =
    r"(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sept?(?:ember)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?";

static LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(resort|property|destination|location)(?:\s+name)?\s*:\s*(.*?)\s*$").unwrap()
});

static SEASON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:winter|summer|spring|autumn)\s+(?:season\b(?:\s+\d{4}(?:\s*[/–-]\s*\d{2,4})?)?|\d{4}(?:\s*[/–-]\s*\d{2,4})?)",
    )
    .unwrap()
});

static DATE_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)({DATE})\s*(?:[–-]|\bto\b|\buntil\b|\btill\b)\s*({DATE})"
    ))
    .unwrap()
});

static VALID_FROM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\bvalid\s+(?:from|as\s+of)\s*:?\s*({DATE})")).unwrap()
});

static VALID_TO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:valid\s+(?:to|until|till|through)|until|expires?(?:\s+on)?)\s*:?\s*({DATE})"
    ))
    .unwrap()
});

static DAY_SPAN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(\d{{1,2}})\s*(?:[–-]|to)\s*(\d{{1,2}})\s+({MONTH_TOKEN})(?:\s|$|\))"
    ))
    .unwrap()
});

static CROSS_SPAN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(\d{{1,2}})\s+({MONTH_TOKEN})\s*(?:[–-]|to)\s*(\d{{1,2}})\s+({MONTH_TOKEN})(?:\s|$|\))"
    ))
    .unwrap()
});

static SPECIAL_PERIOD_RES: LazyLock<Vec<(&'static str, SpecialPeriodKind, Regex)>> =
    LazyLock::new(|| {
        SPECIAL_PERIOD_PATTERNS
            .iter()
            .map(|(name, kind, pattern)| (*name, *kind, Regex::new(pattern).unwrap()))
            .collect()
    });

// ==========================================
// 度假村名称候选
// ==========================================
#[derive(Debug, Clone)]
struct NameCandidate {
    name: String,
    confidence: f64,
    source: SourceLocation,
}

// ==========================================
// MetadataExtractor - 元数据提取引擎
// ==========================================
pub struct MetadataExtractor {
    config: MetadataConfig,
}

impl MetadataExtractor {
    /// 创建引擎（默认配置）
    pub fn new() -> Self {
        Self::with_config(&RecognitionConfig::default())
    }

    pub fn with_config(config: &RecognitionConfig) -> Self {
        Self {
            config: config.metadata.clone(),
        }
    }

    // ==========================================
    // 主入口
    // ==========================================

    /// 提取度假村元数据
    ///
    /// # 返回
    /// 始终返回结果；缺失字段为 None，置信度表中不出现
    #[instrument(skip(self, workbook), fields(sheets = workbook.sheets.len()))]
    pub fn extract_metadata(&self, workbook: &Workbook) -> ResortMetadata {
        let mut metadata = ResortMetadata {
            resort_name: None,
            destination: None,
            currency: Currency::Eur,
            season: None,
            validity: None,
            special_periods: Vec::new(),
            confidence: BTreeMap::new(),
            sources: BTreeMap::new(),
            currency_hits: BTreeMap::new(),
        };

        self.extract_names(workbook, &mut metadata);
        self.extract_currency(workbook, &mut metadata);
        self.extract_season(workbook, &mut metadata);
        metadata.special_periods = self.extract_special_periods(workbook);
        self.extract_validity(workbook, &mut metadata);

        info!(
            resort = metadata.resort_name.as_deref().unwrap_or("-"),
            currency = %metadata.currency,
            special_periods = metadata.special_periods.len(),
            has_validity = metadata.validity.is_some(),
            "元数据提取完成"
        );
        metadata
    }

    // ==========================================
    // 名称 / 目的地
    // ==========================================

    fn extract_names(&self, workbook: &Workbook, metadata: &mut ResortMetadata) {
        let mut candidates: Vec<NameCandidate> = Vec::new();

        for sheet in &workbook.sheets {
            let name = sheet.name.trim();
            if is_generic_sheet_name(name) || !is_plausible_name(name) {
                debug!(sheet = %name, "工作表名不符合名称特征，跳过");
                continue;
            }
            candidates.push(NameCandidate {
                name: name.to_string(),
                confidence: SHEET_NAME_CONFIDENCE,
                source: SourceLocation::sheet_name(&sheet.name),
            });
        }

        for sheet in &workbook.sheets {
            for (row, col, text) in self.window_texts(&sheet.grid) {
                let Some(caps) = LABEL_RE.captures(text) else {
                    continue;
                };
                let label = caps[1].to_lowercase();
                let inline = caps[2].trim();
                let (value, cell) = if inline.is_empty() {
                    match sheet.grid.text_at(row, col + 1) {
                        Some(next) => (next, CellRef::new(row, col + 1)),
                        None => continue,
                    }
                } else {
                    (inline, CellRef::new(row, col))
                };
                if !is_plausible_name(value) || is_generic_sheet_name(value) {
                    continue;
                }

                let source = SourceLocation::cell(&sheet.name, cell);
                if matches!(label.as_str(), "destination" | "location") && metadata.destination.is_none() {
                    metadata.destination = Some(value.to_string());
                    metadata.confidence.insert("destination".to_string(), LABEL_CONFIDENCE);
                    metadata.sources.insert("destination".to_string(), source.clone());
                }
                candidates.push(NameCandidate {
                    name: value.to_string(),
                    confidence: LABEL_CONFIDENCE,
                    source,
                });
            }
        }

        // 置信度最高者；平局取先出现者
        let best = candidates.into_iter().fold(None, |best: Option<NameCandidate>, c| match best {
            Some(b) if b.confidence >= c.confidence => Some(b),
            _ => Some(c),
        });
        if let Some(best) = best {
            debug!(name = %best.name, confidence = best.confidence, "度假村名称已确定");
            metadata.resort_name = Some(best.name);
            metadata.confidence.insert("resort_name".to_string(), best.confidence);
            metadata.sources.insert("resort_name".to_string(), best.source);
        }
    }

    // ==========================================
    // 币种
    // ==========================================

    fn extract_currency(&self, workbook: &Workbook, metadata: &mut ResortMetadata) {
        let mut tallies: BTreeMap<Currency, CurrencyTally> = BTreeMap::new();
        for sheet in &workbook.sheets {
            for (currency, cells) in currency_hits(&sheet.grid, self.config.scan_rows, self.config.scan_cols) {
                let tally = tallies.entry(currency).or_default();
                tally.count += cells.len();
                for cell in cells {
                    if tally.examples.len() < MAX_CURRENCY_EXAMPLES {
                        tally.examples.push(SourceLocation::cell(&sheet.name, cell));
                    }
                }
            }
        }

        let total: usize = tallies.values().map(|t| t.count).sum();
        let winner = tallies
            .iter()
            .fold(None, |best: Option<(Currency, &CurrencyTally)>, (currency, tally)| match best {
                Some((_, b)) if b.count >= tally.count => best,
                _ => Some((*currency, tally)),
            });

        match winner {
            Some((currency, tally)) if total > 0 => {
                metadata.currency = currency;
                metadata
                    .confidence
                    .insert("currency".to_string(), tally.count as f64 / total as f64);
                if let Some(first) = tally.examples.first() {
                    metadata.sources.insert("currency".to_string(), first.clone());
                }
            }
            _ => {
                debug!("未发现币种标记，默认 EUR");
                metadata.currency = Currency::Eur;
                metadata
                    .confidence
                    .insert("currency".to_string(), DEFAULT_CURRENCY_CONFIDENCE);
            }
        }
        metadata.currency_hits = tallies;
    }

    // ==========================================
    // 季节
    // ==========================================

    fn extract_season(&self, workbook: &Workbook, metadata: &mut ResortMetadata) {
        for sheet in &workbook.sheets {
            for (row, col, text) in self.window_texts(&sheet.grid) {
                if let Some(m) = SEASON_RE.find(text) {
                    metadata.season = Some(m.as_str().trim().to_string());
                    metadata.confidence.insert("season".to_string(), SEASON_CONFIDENCE);
                    metadata
                        .sources
                        .insert("season".to_string(), SourceLocation::cell(&sheet.name, CellRef::new(row, col)));
                    return;
                }
            }
        }
    }

    // ==========================================
    // 特殊时段
    // ==========================================

    /// 每个时段名至多记录一次（首次出现）
    fn extract_special_periods(&self, workbook: &Workbook) -> Vec<SpecialPeriod> {
        let mut periods = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();

        for sheet in &workbook.sheets {
            for (row, col, text) in self.window_texts(&sheet.grid) {
                for (name, kind, re) in SPECIAL_PERIOD_RES.iter() {
                    if seen.contains(name) || !re.is_match(text) {
                        continue;
                    }
                    seen.insert(*name);

                    let date_range = parse_period_range(text, self.config.reference_year).or_else(|| {
                        sheet
                            .grid
                            .text_at(row, col + 1)
                            .and_then(|next| parse_period_range(next, self.config.reference_year))
                    });
                    debug!(period = %name, has_range = date_range.is_some(), "特殊时段");
                    periods.push(SpecialPeriod {
                        name: name.to_string(),
                        kind: *kind,
                        date_range,
                        source: SourceLocation::cell(&sheet.name, CellRef::new(row, col)),
                    });
                }
            }
        }
        periods
    }

    // ==========================================
    // 有效期
    // ==========================================

    /// 完整区间（"valid from X to Y" 或裸日期区间）优先；否则合并单侧短语
    fn extract_validity(&self, workbook: &Workbook, metadata: &mut ResortMetadata) {
        let mut from: Option<(NaiveDate, SourceLocation)> = None;
        let mut to: Option<(NaiveDate, SourceLocation)> = None;

        for sheet in &workbook.sheets {
            for (row, col, text) in self.window_texts(&sheet.grid) {
                let location = SourceLocation::cell(&sheet.name, CellRef::new(row, col));
                // 时段名单元格及其右侧日期单元格属于特殊时段，不作为有效期
                let beside_period = col
                    .checked_sub(1)
                    .and_then(|left| sheet.grid.text_at(row, left))
                    .is_some_and(names_special_period);

                if !names_special_period(text) && !beside_period {
                    if let Some(range) = parse_date_range(text) {
                        metadata.validity = Some(ValidityWindow {
                            from: Some(range.start),
                            to: Some(range.end),
                        });
                        metadata
                            .confidence
                            .insert("validity".to_string(), FULL_VALIDITY_CONFIDENCE);
                        metadata.sources.insert("validity".to_string(), location);
                        return;
                    }
                }

                if from.is_none() {
                    from = capture_date(&VALID_FROM_RE, text).map(|d| (d, location.clone()));
                }
                if to.is_none() {
                    to = capture_date(&VALID_TO_RE, text).map(|d| (d, location.clone()));
                }
            }
        }

        let confidence = match (&from, &to) {
            (Some(_), Some(_)) => FULL_VALIDITY_CONFIDENCE,
            (Some(_), None) | (None, Some(_)) => PARTIAL_VALIDITY_CONFIDENCE,
            (None, None) => return,
        };
        let source = from
            .as_ref()
            .or(to.as_ref())
            .map(|(_, location)| location.clone());
        metadata.validity = Some(ValidityWindow {
            from: from.map(|(d, _)| d),
            to: to.map(|(d, _)| d),
        });
        metadata.confidence.insert("validity".to_string(), confidence);
        if let Some(source) = source {
            metadata.sources.insert("validity".to_string(), source);
        }
    }

    /// 扫描窗口内的非空文本单元格（行优先）
    fn window_texts<'a>(&self, grid: &'a CellGrid) -> impl Iterator<Item = (usize, usize, &'a str)> + 'a {
        let rows = grid.height().min(self.config.scan_rows);
        let cols = grid.width().min(self.config.scan_cols);
        (0..rows).flat_map(move |row| {
            (0..cols).filter_map(move |col| grid.text_at(row, col).map(|text| (row, col, text)))
        })
    }
}

impl Default for MetadataExtractor {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// 名称特征
// ==========================================

/// 通用工作表名（"Sheet1" / "Data" / "Prices 2025"）
fn is_generic_sheet_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    let stem = lower.trim_end_matches(|c: char| c.is_ascii_digit() || c.is_whitespace());
    stem.is_empty() || GENERIC_SHEET_NAMES.contains(&stem)
}

/// 名称形状：仅字母/空格（允许撇号与连字符），至少 3 个字母，
/// 长全大写与样板词不通过，单独的月份名不通过
fn is_plausible_name(name: &str) -> bool {
    let trimmed = name.trim();
    if !trimmed
        .chars()
        .all(|c| c.is_alphabetic() || c.is_whitespace() || c == '\'' || c == '-')
    {
        return false;
    }

    let letters: Vec<char> = trimmed.chars().filter(|c| c.is_alphabetic()).collect();
    if letters.len() < 3 {
        return false;
    }
    if letters.len() > MAX_ALL_CAPS_LETTERS && letters.iter().all(|c| c.is_uppercase()) {
        return false;
    }
    if canonical_month(trimmed).is_some() {
        return false;
    }

    let lower = trimmed.to_lowercase();
    !lower
        .split(|c: char| c.is_whitespace() || c == '-')
        .any(|word| NAME_BOILERPLATE_WORDS.contains(&word))
}

// ==========================================
// 日期解析
// ==========================================

/// 月份名 → 1..=12
fn month_number(token: &str) -> Option<u32> {
    let name = canonical_month(token)?;
    MONTHS
        .iter()
        .position(|(n, _)| *n == name)
        .map(|i| i as u32 + 1)
}

/// 单个日期（日在前；两位年份按 20xx）
pub(crate) fn parse_date(text: &str) -> Option<NaiveDate> {
    let cleaned = text.trim().replace(',', " ");
    let numeric: Vec<&str> = cleaned.split(['/', '.', '-']).map(str::trim).collect();

    if numeric.len() == 3 && numeric.iter().all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit())) {
        let nums: Vec<u32> = numeric.iter().filter_map(|p| p.parse().ok()).collect();
        if nums.len() != 3 {
            return None;
        }
        return if numeric[0].len() == 4 {
            NaiveDate::from_ymd_opt(nums[0] as i32, nums[1], nums[2])
        } else {
            let year = if numeric[2].len() == 2 { 2000 + nums[2] } else { nums[2] };
            NaiveDate::from_ymd_opt(year as i32, nums[1], nums[0])
        };
    }

    let tokens: Vec<&str> = cleaned.split_whitespace().collect();
    if tokens.len() != 3 {
        return None;
    }
    let year: i32 = tokens[2].parse().ok()?;
    let (day, month) = match (tokens[0].parse::<u32>(), tokens[1].parse::<u32>()) {
        (Ok(day), Err(_)) => (day, month_number(tokens[1])?),
        (Err(_), Ok(day)) => (day, month_number(tokens[0])?),
        _ => return None,
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// 文本中的完整日期区间（起点不晚于终点）
pub(crate) fn parse_date_range(text: &str) -> Option<DateRange> {
    let caps = DATE_RANGE_RE.captures(text)?;
    let start = parse_date(&caps[1])?;
    let end = parse_date(&caps[2])?;
    (start <= end).then_some(DateRange { start, end })
}

fn capture_date(re: &Regex, text: &str) -> Option<NaiveDate> {
    re.captures(text).and_then(|caps| parse_date(&caps[1]))
}

/// 文本是否命名了某个特殊时段
fn names_special_period(text: &str) -> bool {
    SPECIAL_PERIOD_RES.iter().any(|(_, _, re)| re.is_match(text))
}

/// 特殊时段日期：完整区间 > "20 Dec - 3 Jan" > "18–21 Apr"（无年份用 reference_year）
pub(crate) fn parse_period_range(text: &str, reference_year: i32) -> Option<DateRange> {
    if let Some(range) = parse_date_range(text) {
        return Some(range);
    }

    if let Some(caps) = CROSS_SPAN_RE.captures(text) {
        let start_day: u32 = caps[1].parse().ok()?;
        let start_month = month_number(&caps[2])?;
        let end_day: u32 = caps[3].parse().ok()?;
        let end_month = month_number(&caps[4])?;
        let start = NaiveDate::from_ymd_opt(reference_year, start_month, start_day)?;
        // 跨年区间（12 月 → 1 月）终点落在次年
        let end_year = if end_month < start_month { reference_year + 1 } else { reference_year };
        let end = NaiveDate::from_ymd_opt(end_year, end_month, end_day)?;
        return (start <= end).then_some(DateRange { start, end });
    }

    let caps = DAY_SPAN_RE.captures(text)?;
    let start_day: u32 = caps[1].parse().ok()?;
    let end_day: u32 = caps[2].parse().ok()?;
    let month = month_number(&caps[3])?;
    let start = NaiveDate::from_ymd_opt(reference_year, month, start_day)?;
    let end = NaiveDate::from_ymd_opt(reference_year, month, end_day)?;
    (start <= end).then_some(DateRange { start, end })
}
