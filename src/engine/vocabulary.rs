// ==========================================
// 度假村报价表识别引擎 - 静态词表
// ==========================================
// 职责: 月份 / 特殊时段 / 房型 / 包含项 / 币种 / 不可售 词表
// 红线: 只读查找表，扫描逻辑中不散落字面量
// ==========================================

use crate::domain::types::{Currency, SpecialPeriodKind};

// ==========================================
// 月份词表
// ==========================================
// (标准名, 三字母缩写)
pub const MONTHS: [(&str, &str); 12] = [
    ("January", "jan"),
    ("February", "feb"),
    ("March", "mar"),
    ("April", "apr"),
    ("May", "may"),
    ("June", "jun"),
    ("July", "jul"),
    ("August", "aug"),
    ("September", "sep"),
    ("October", "oct"),
    ("November", "nov"),
    ("December", "dec"),
];

/// 特殊时段标签（匹配词, 标准标签）
pub const SPECIAL_MONTH_TOKENS: [(&str, &str); 3] = [
    ("easter", "Easter (18–21 Apr)"),
    ("peak season", "Peak Season"),
    ("off season", "Off Season"),
];

// ==========================================
// 特殊时段字典（元数据提取）
// ==========================================
// (名称, 类型, 正则)
pub const SPECIAL_PERIOD_PATTERNS: [(&str, SpecialPeriodKind, &str); 10] = [
    ("Easter", SpecialPeriodKind::Holiday, r"(?i)\beaster\b"),
    ("Peak Season", SpecialPeriodKind::Season, r"(?i)\bpeak[\s-]*season\b"),
    ("Off Season", SpecialPeriodKind::Season, r"(?i)\boff[\s-]*season\b"),
    ("High Season", SpecialPeriodKind::Season, r"(?i)\bhigh[\s-]*season\b"),
    ("Low Season", SpecialPeriodKind::Season, r"(?i)\blow[\s-]*season\b"),
    ("Christmas", SpecialPeriodKind::Holiday, r"(?i)\b(christmas|xmas)\b"),
    ("New Year", SpecialPeriodKind::Holiday, r"(?i)\bnew[\s-]*year'?s?\b"),
    ("Summer Holidays", SpecialPeriodKind::Holiday, r"(?i)\bsummer[\s-]*holidays?\b"),
    ("School Holidays", SpecialPeriodKind::Holiday, r"(?i)\bschool[\s-]*holidays?\b"),
    ("Half Term", SpecialPeriodKind::Holiday, r"(?i)\bhalf[\s-]*term\b"),
];

// ==========================================
// 房型词表
// ==========================================
// (匹配关键字（小写）, 显示名, 短代码, 价格上限倍数)
pub const ACCOMMODATION_TYPES: [(&str, &str, &str, f64); 10] = [
    ("self-catering", "Self-Catering", "SC", 0.8),
    ("guesthouse", "Guesthouse", "GH", 1.0),
    ("apartment", "Apartment", "APT", 1.0),
    ("hostel", "Hostel", "HST", 0.5),
    ("resort", "Resort", "RST", 1.5),
    ("hotel", "Hotel", "HTL", 1.2),
    ("villa", "Villa", "VIL", 2.0),
    ("lodge", "Lodge", "LDG", 1.0),
    ("cabin", "Cabin", "CAB", 1.0),
    ("b&b", "B&B", "BB", 1.0),
];

/// 房型关键字的书写变体 → 标准关键字
pub const ACCOMMODATION_ALIASES: [(&str, &str); 5] = [
    ("self catering", "self-catering"),
    ("selfcatering", "self-catering"),
    ("guest house", "guesthouse"),
    ("bed and breakfast", "b&b"),
    ("b and b", "b&b"),
];

// ==========================================
// 包含项词表
// ==========================================
/// 包含项区域表头关键字
pub const INCLUSION_HEADER_KEYWORDS: [&str; 10] = [
    "package includes",
    "what's included",
    "whats included",
    "price includes",
    "inclusions",
    "included",
    "includes",
    "amenities",
    "facilities",
    "extras",
];

/// 常见包含项词汇（置信度加分）
pub const COMMON_INCLUSION_TERMS: [&str; 9] = [
    "breakfast", "wifi", "parking", "pool", "gym", "spa", "transfer", "meal", "drink",
];

/// 项目符号字符
pub const BULLET_MARKERS: [char; 7] = ['•', '-', '*', '·', '▪', '◦', '–'];

// ==========================================
// 币种词表
// ==========================================
// (币种, 符号列表)
pub const CURRENCY_SYMBOLS: [(Currency, &[&str]); 6] = [
    (Currency::Eur, &["€"]),
    (Currency::Gbp, &["£"]),
    (Currency::Usd, &["US$", "$"]),
    (Currency::Chf, &["Fr."]),
    (Currency::Jpy, &["¥", "円"]),
    (Currency::Inr, &["₹", "Rs."]),
];

/// 价格合理性：币种 → (下限, 上限)，以 7 晚 / 2 人 为基准
pub const CURRENCY_PRICE_BOUNDS: [(Currency, f64, f64); 6] = [
    (Currency::Eur, 20.0, 5_000.0),
    (Currency::Gbp, 15.0, 4_500.0),
    (Currency::Usd, 20.0, 6_000.0),
    (Currency::Chf, 25.0, 6_500.0),
    (Currency::Jpy, 2_500.0, 700_000.0),
    (Currency::Inr, 1_500.0, 400_000.0),
];

// ==========================================
// 不可售词表
// ==========================================
pub const UNAVAILABLE_TOKENS: [&str; 8] = [
    "no availability",
    "not available",
    "sold out",
    "closed",
    "full",
    "n/a",
    "tbc",
    "tba",
];

// ==========================================
// 价格修饰词（解析前剥离，按长度降序匹配）
// ==========================================
pub const PRICE_PREFIXES: [&str; 4] = ["starting from", "starting at", "from", "only"];

pub const PRICE_SUFFIXES: [&str; 16] = [
    "per person",
    "per night",
    "per week",
    "per stay",
    "/person",
    "/night",
    "/week",
    "/stay",
    "p.p.p.n.",
    "/pp",
    "pppn",
    "p.p.",
    "p.p",
    "each",
    "pp",
    "pn",
];

// ==========================================
// 通用工作表名 / 样板词（度假村名称过滤）
// ==========================================
pub const GENERIC_SHEET_NAMES: [&str; 12] = [
    "sheet", "data", "summary", "prices", "pricing", "rates", "overview", "info", "table",
    "tabelle", "feuil", "hoja",
];

pub const NAME_BOILERPLATE_WORDS: [&str; 10] = [
    "table", "total", "price", "prices", "rate", "rates", "sheet", "summary", "offer", "list",
];

// ==========================================
// 查找函数
// ==========================================

/// 缩写/全名 → 标准月份名
pub fn canonical_month(token: &str) -> Option<&'static str> {
    let lower = token.trim().trim_end_matches('.').to_lowercase();
    if lower.len() < 3 {
        return None;
    }
    MONTHS.iter().find_map(|(name, abbr)| {
        let full = name.to_lowercase();
        if lower == full || lower == *abbr || (lower == "sept" && *abbr == "sep") {
            Some(*name)
        } else {
            None
        }
    })
}

/// 房型关键字 → (显示名, 短代码, 上限倍数)
pub fn accommodation_entry(keyword: &str) -> Option<(&'static str, &'static str, f64)> {
    ACCOMMODATION_TYPES
        .iter()
        .find(|(k, ..)| *k == keyword)
        .map(|(_, display, code, multiplier)| (*display, *code, *multiplier))
}

/// 房型短代码：词表命中取表内代码，否则取前三个字母大写
pub fn accommodation_code(type_name: &str) -> String {
    let lower = normalize_accommodation_text(type_name);
    for (keyword, _, code, _) in ACCOMMODATION_TYPES.iter() {
        if lower.contains(keyword) {
            return code.to_string();
        }
    }
    type_name
        .chars()
        .filter(|c| c.is_alphabetic())
        .take(3)
        .collect::<String>()
        .to_uppercase()
}

/// 房型价格上限倍数（未命中 = 1.0）
pub fn accommodation_multiplier(type_name: &str) -> f64 {
    let lower = normalize_accommodation_text(type_name);
    ACCOMMODATION_TYPES
        .iter()
        .find(|(keyword, ..)| lower.contains(keyword))
        .map(|(.., multiplier)| *multiplier)
        .unwrap_or(1.0)
}

/// 小写并统一房型书写变体
pub fn normalize_accommodation_text(text: &str) -> String {
    let mut lower = text.to_lowercase();
    for (alias, canonical) in ACCOMMODATION_ALIASES.iter() {
        if lower.contains(alias) {
            lower = lower.replace(alias, canonical);
        }
    }
    lower
}

/// 币种 → 价格合理区间
pub fn currency_bounds(currency: Currency) -> (f64, f64) {
    CURRENCY_PRICE_BOUNDS
        .iter()
        .find(|(c, ..)| *c == currency)
        .map(|(_, floor, ceiling)| (*floor, *ceiling))
        .unwrap_or((0.0, f64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_month() {
        assert_eq!(canonical_month("jan"), Some("January"));
        assert_eq!(canonical_month("SEPT"), Some("September"));
        assert_eq!(canonical_month("Dec."), Some("December"));
        assert_eq!(canonical_month("february"), Some("February"));
        assert_eq!(canonical_month("ju"), None);
        assert_eq!(canonical_month("hotel"), None);
    }

    #[test]
    fn test_accommodation_code() {
        assert_eq!(accommodation_code("Hotel"), "HTL");
        assert_eq!(accommodation_code("Self Catering"), "SC");
        assert_eq!(accommodation_code("Bed and Breakfast"), "BB");
        assert_eq!(accommodation_code("Chalet"), "CHA");
    }

    #[test]
    fn test_accommodation_multiplier() {
        assert_eq!(accommodation_multiplier("Luxury Villa"), 2.0);
        assert_eq!(accommodation_multiplier("Hostel"), 0.5);
        assert_eq!(accommodation_multiplier("Chalet"), 1.0);
    }

    #[test]
    fn test_every_currency_has_symbols_and_bounds() {
        for currency in Currency::ALL {
            assert!(CURRENCY_SYMBOLS.iter().any(|(c, _)| *c == currency));
            let (floor, ceiling) = currency_bounds(currency);
            assert!(floor < ceiling);
        }
    }

    #[test]
    fn test_special_period_patterns_compile() {
        for (_, _, pattern) in SPECIAL_PERIOD_PATTERNS.iter() {
            assert!(regex::Regex::new(pattern).is_ok());
        }
    }
}
