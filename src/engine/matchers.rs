// ==========================================
// 度假村报价表识别引擎 - 单元格匹配器
// ==========================================
// 职责: 月份 / 价格 / 币种 / 备注 / 晚数 / 人数 / 房型 / 包含项 判定
// 红线: 所有 "是否为 X" 判定只经由本模块，基于 CellValue 而非字符串化
// 红线: 不可解析的内容降级为 None / 不可售，从不报错
// ==========================================

use crate::domain::grid::CellValue;
use crate::domain::types::{Currency, InclusionFormat};
use crate::engine::vocabulary::{
    accommodation_entry, canonical_month, normalize_accommodation_text, ACCOMMODATION_TYPES,
    BULLET_MARKERS, CURRENCY_SYMBOLS, INCLUSION_HEADER_KEYWORDS, PRICE_PREFIXES, PRICE_SUFFIXES,
    SPECIAL_MONTH_TOKENS, UNAVAILABLE_TOKENS,
};
use regex::Regex;
use std::sync::LazyLock;

/// 月份标签最大长度（超过即视为描述性文本）
const MAX_MONTH_LABEL_CHARS: usize = 25;

/// 包含项表头最大长度
const MAX_HEADER_CHARS: usize = 60;

static MONTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept|sep|oct|nov|dec)\b\.?",
    )
    .unwrap()
});

static SPECIAL_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(easter|peak[\s-]*season|off[\s-]*season)\b").unwrap()
});

static CURRENCY_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(eur|euros?|gbp|usd|chf|jpy|inr)\b").unwrap());

static NIGHTS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{1,2})\s*-?\s*(?:nights?|nts?)\b").unwrap());

static PARTY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})\s*-?\s*(?:pax|persons?|people|guests?|adults?|ppl)\b").unwrap()
});

static PAREN_NOTE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(([^)]*)\)").unwrap());

static STAR_NOTE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*+\s*(.+)$").unwrap());

static PREFIXED_NOTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bnote:\s*(.+)$").unwrap());

static DASH_NOTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s[-–]\s*(.*[A-Za-z].*)$").unwrap());

static NUMBERED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d{1,2}[.)]\s+(.*\S)\s*$").unwrap());

// ==========================================
// 月份匹配
// ==========================================

/// 月份匹配结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthMatch {
    /// 标准标签（"January" / "Easter (18–21 Apr)" / "Peak Season"）
    pub label: String,

    /// 是否为特殊时段
    pub special: bool,
}

/// 文本 → 月份/特殊时段
pub fn match_month_text(text: &str) -> Option<MonthMatch> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.chars().count() > MAX_MONTH_LABEL_CHARS {
        return None;
    }

    if let Some(caps) = SPECIAL_TOKEN_RE.captures(trimmed) {
        let token = normalize_spaces(&caps[1].to_lowercase().replace('-', " "));
        return SPECIAL_MONTH_TOKENS
            .iter()
            .find(|(key, _)| *key == token)
            .map(|(_, label)| MonthMatch {
                label: label.to_string(),
                special: true,
            });
    }

    let caps = MONTH_RE.captures(trimmed)?;
    canonical_month(&caps[1]).map(|name| MonthMatch {
        label: name.to_string(),
        special: false,
    })
}

/// 单元格 → 月份（数字单元格永不视为月份）
pub fn match_month(cell: &CellValue) -> Option<MonthMatch> {
    cell.as_text().and_then(match_month_text)
}

fn normalize_spaces(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ==========================================
// 币种匹配
// ==========================================

/// 文本中出现的币种标记
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyMark {
    pub currency: Currency,
    pub symbol: bool,
    pub code: bool,
}

/// 文本中出现的全部币种（按 Currency::ALL 顺序，去重）
pub fn currency_marks(text: &str) -> Vec<CurrencyMark> {
    let codes: Vec<Currency> = CURRENCY_CODE_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let code = caps[1].to_ascii_uppercase();
            if code.starts_with("EURO") {
                Some(Currency::Eur)
            } else {
                Currency::from_code(&code)
            }
        })
        .collect();

    Currency::ALL
        .into_iter()
        .filter_map(|currency| {
            let symbol = CURRENCY_SYMBOLS
                .iter()
                .filter(|(c, _)| *c == currency)
                .flat_map(|(_, symbols)| symbols.iter())
                .any(|s| contains_symbol(text, s));
            let code = codes.contains(&currency);
            (symbol || code).then_some(CurrencyMark {
                currency,
                symbol,
                code,
            })
        })
        .collect()
}

/// 字母开头的符号（"Fr." / "Rs." / "US$"）要求前一字符不是字母
fn contains_symbol(text: &str, symbol: &str) -> bool {
    if !symbol.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return text.contains(symbol);
    }
    text.match_indices(symbol)
        .any(|(i, _)| !text[..i].chars().next_back().is_some_and(|c| c.is_alphabetic()))
}

/// 文本中的首个币种
pub fn detect_text_currency(text: &str) -> Option<Currency> {
    currency_marks(text).first().map(|m| m.currency)
}

/// 去掉币种符号与代码
pub fn strip_currency(text: &str) -> String {
    let mut out = CURRENCY_CODE_RE.replace_all(text, "").into_owned();
    for (_, symbols) in CURRENCY_SYMBOLS.iter() {
        for symbol in symbols.iter() {
            out = out.replace(symbol, "");
        }
    }
    out
}

// ==========================================
// 数值 / 价格解析
// ==========================================

/// 去掉价格前后的单位修饰（"from €150" / "150 pp" / "€150/night"），可叠加
pub fn strip_price_decorations(text: &str) -> String {
    let mut rest = text.trim().to_lowercase();
    loop {
        let before = rest.len();
        for prefix in PRICE_PREFIXES {
            if let Some(tail) = rest.strip_prefix(prefix) {
                rest = tail.trim_start().to_string();
            }
        }
        for suffix in PRICE_SUFFIXES {
            if let Some(head) = rest.strip_suffix(suffix) {
                rest = head.trim_end().to_string();
            }
        }
        if rest.len() == before {
            return rest;
        }
    }
}

/// 文本 → 数值（去掉币种、修饰词、空白、千分位，自动判定小数点）
///
/// 含其他字母或符号的文本返回 None
pub fn parse_amount(text: &str) -> Option<f64> {
    let stripped = strip_price_decorations(&strip_currency(text));
    let compact: String = stripped
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}' && *c != '\'' && *c != '’')
        .collect();
    let compact = compact.trim_end_matches('*');

    let (negative, body) = match compact.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, compact),
    };
    if body.is_empty()
        || !body.chars().any(|c| c.is_ascii_digit())
        || body.chars().any(|c| !(c.is_ascii_digit() || c == ',' || c == '.'))
    {
        return None;
    }

    let normalized = normalize_separators(body);
    let value: f64 = normalized.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(if negative { -value } else { value })
}

/// 千分位 / 小数点归一化为 "1234.56"
pub fn normalize_separators(body: &str) -> String {
    let last_comma = body.rfind(',');
    let last_dot = body.rfind('.');

    match (last_comma, last_dot) {
        (Some(c), Some(d)) => {
            // 两者并存：靠后者为小数点
            let (decimal, grouping) = if c > d { (',', '.') } else { ('.', ',') };
            body.replace(grouping, "").replace(decimal, ".")
        }
        (Some(c), None) => {
            let digits_after = body.len() - c - 1;
            if body.matches(',').count() == 1 && (1..=2).contains(&digits_after) {
                body.replace(',', ".")
            } else {
                body.replace(',', "")
            }
        }
        (None, Some(d)) => {
            let digits_after = body.len() - d - 1;
            if body.matches('.').count() > 1 || digits_after == 3 {
                body.replace('.', "")
            } else {
                body.to_string()
            }
        }
        (None, None) => body.to_string(),
    }
}

/// 最多两位小数
pub fn has_at_most_two_decimals(value: f64) -> bool {
    let cents = value * 100.0;
    (cents.round() - cents).abs() < 1e-6
}

/// 价格候选：正数且最多两位小数
pub fn is_price_like(cell: &CellValue) -> bool {
    let value = match cell {
        CellValue::Number(n) => Some(*n),
        CellValue::Text(t) => parse_amount(t),
        CellValue::Empty => None,
    };
    matches!(value, Some(v) if v > 0.0 && has_at_most_two_decimals(v))
}

/// 不可售标记（整段等于词表项，或无数字文本中出现整词）
pub fn is_unavailable_text(text: &str) -> bool {
    let lower = text.trim().to_lowercase();
    if lower.is_empty() {
        return false;
    }
    if UNAVAILABLE_TOKENS.iter().any(|t| lower == *t) {
        return true;
    }
    if lower.chars().any(|c| c.is_ascii_digit()) {
        return false;
    }
    UNAVAILABLE_TOKENS
        .iter()
        .any(|token| contains_word(&lower, token))
}

fn contains_word(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(i, _)| {
        let before = haystack[..i].chars().next_back();
        let after = haystack[i + needle.len()..].chars().next();
        !before.is_some_and(|c| c.is_alphanumeric()) && !after.is_some_and(|c| c.is_alphanumeric())
    })
}

/// 备注提取：括号 > "*" 后缀 > "note:" 后缀 > 末尾 "- 文本"
///
/// # 返回
/// (去掉备注后的文本, 备注)
pub fn extract_note(text: &str) -> (String, Option<String>) {
    let patterns: [&Regex; 4] = [&PAREN_NOTE_RE, &STAR_NOTE_RE, &PREFIXED_NOTE_RE, &DASH_NOTE_RE];
    for re in patterns {
        if let Some(caps) = re.captures(text) {
            let note = caps[1].trim();
            if note.is_empty() {
                continue;
            }
            let whole = caps.get(0).map(|m| m.range()).unwrap_or(0..0);
            let mut rest = String::with_capacity(text.len());
            rest.push_str(&text[..whole.start]);
            rest.push_str(&text[whole.end..]);
            return (rest.trim().to_string(), Some(note.to_string()));
        }
    }
    (text.trim().to_string(), None)
}

/// 价格解析结果
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPrice {
    pub value: f64,
    pub currency: Currency,
    pub available: bool,
    pub note: Option<String>,
    pub raw: String,
}

/// 单元格 → 价格
///
/// - 不可售词 / 解析失败 → 0 且不可售
/// - 负数 → 夹紧为 0（仍视为可售）
pub fn parse_price(cell: &CellValue, fallback_currency: Currency) -> ParsedPrice {
    let raw = cell.display_text();
    match cell {
        CellValue::Empty => ParsedPrice {
            value: 0.0,
            currency: fallback_currency,
            available: false,
            note: None,
            raw,
        },
        CellValue::Number(n) => ParsedPrice {
            value: n.max(0.0),
            currency: fallback_currency,
            available: true,
            note: None,
            raw,
        },
        CellValue::Text(text) => {
            let currency = detect_text_currency(text).unwrap_or(fallback_currency);
            let (body, note) = extract_note(text);
            if is_unavailable_text(text) || is_unavailable_text(&body) {
                return ParsedPrice {
                    value: 0.0,
                    currency,
                    available: false,
                    note,
                    raw,
                };
            }
            match parse_amount(&body) {
                Some(value) => ParsedPrice {
                    value: value.max(0.0),
                    currency,
                    available: true,
                    note,
                    raw,
                },
                None => ParsedPrice {
                    value: 0.0,
                    currency,
                    available: false,
                    note,
                    raw,
                },
            }
        }
    }
}

// ==========================================
// 晚数 / 人数 / 房型
// ==========================================

/// 文本中的晚数（"2 Nights" / "7-night" / "3 nts"）
pub fn nights_in(text: &str) -> Vec<u32> {
    capture_numbers(&NIGHTS_RE, text)
}

/// 文本中的人数（"4 Pax" / "2 persons" / "6 guests"）
pub fn party_sizes_in(text: &str) -> Vec<u32> {
    capture_numbers(&PARTY_RE, text)
}

fn capture_numbers(re: &Regex, text: &str) -> Vec<u32> {
    re.captures_iter(text)
        .filter_map(|caps| caps[1].parse::<u32>().ok())
        .filter(|n| *n > 0)
        .collect()
}

/// 文本中出现的房型（标准显示名，按出现位置排序）
pub fn accommodation_types_in(text: &str) -> Vec<&'static str> {
    let lower = normalize_accommodation_text(text);
    let mut hits: Vec<(usize, &'static str)> = ACCOMMODATION_TYPES
        .iter()
        .filter_map(|(keyword, ..)| {
            let pos = lower.find(keyword)?;
            let (display, ..) = accommodation_entry(keyword)?;
            Some((pos, display))
        })
        .collect();
    hits.sort_by_key(|(pos, _)| *pos);
    hits.into_iter().map(|(_, display)| display).collect()
}

/// 单元格是否为"纯房型"文本（仅房型关键字，无其他描述）
pub fn is_bare_accommodation_type(text: &str) -> bool {
    let lower = normalize_accommodation_text(text.trim().trim_end_matches(':'));
    ACCOMMODATION_TYPES.iter().any(|(keyword, ..)| {
        lower == *keyword || lower == format!("{}s", keyword)
    })
}

// ==========================================
// 包含项判定
// ==========================================

/// 项目符号 / 编号前缀
///
/// # 返回
/// (格式, 去掉前缀的文本)；无前缀返回 None
pub fn list_marker(text: &str) -> Option<(InclusionFormat, String)> {
    let trimmed = text.trim();
    let first = trimmed.chars().next()?;
    if BULLET_MARKERS.contains(&first) {
        let rest = trimmed[first.len_utf8()..].trim();
        // "-5" 之类为负数，不是项目符号
        if rest.is_empty() || (first == '-' && rest.starts_with(|c: char| c.is_ascii_digit())) {
            return None;
        }
        return Some((InclusionFormat::Bullet, rest.to_string()));
    }
    NUMBERED_RE
        .captures(trimmed)
        .map(|caps| (InclusionFormat::Numbered, caps[1].trim().to_string()))
}

/// 包含项区域表头（"Package includes:" / "What's included" / "Facilities"）
pub fn is_inclusion_header(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.chars().count() > MAX_HEADER_CHARS || list_marker(trimmed).is_some()
    {
        return false;
    }
    let lower = trimmed.to_lowercase();
    let ends_colon = lower.ends_with(':');
    let core = lower.trim_end_matches(':').trim();

    INCLUSION_HEADER_KEYWORDS.iter().any(|keyword| {
        core == *keyword
            || (ends_colon && core.contains(keyword))
            || (*keyword != "included" && ends_with_word(core, keyword))
    })
}

fn ends_with_word(text: &str, suffix: &str) -> bool {
    text.strip_suffix(suffix)
        .is_some_and(|head| !head.chars().next_back().is_some_and(|c| c.is_alphanumeric()))
}

/// 表头形态（用于项目符号回溯）
pub fn is_header_like(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() || list_marker(trimmed).is_some() || parse_amount(trimmed).is_some() {
        return false;
    }
    if trimmed.ends_with(':') || is_inclusion_header(trimmed) {
        return true;
    }
    let starts_upper = trimmed.chars().next().is_some_and(|c| c.is_uppercase());
    starts_upper && trimmed.chars().count() <= 40 && trimmed.split_whitespace().count() <= 5
}
