// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库，rust_i18n::i18n! 宏已在 lib.rs 中初始化
// 校验消息与建议均经此渲染，消息内嵌具体值（币种代码/单元格引用）
// 红线: 引擎只产出已渲染文本，不向调用方暴露翻译键
// ==========================================

use tracing::warn;

/// 已提供翻译的语言（首个为回退语言）
pub const SUPPORTED_LOCALES: [&str; 2] = ["en", "zh-CN"];

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置语言
///
/// # 返回
/// - true: 已切换
/// - false: 不支持的语言，保持原设置
pub fn set_locale(locale: &str) -> bool {
    if !SUPPORTED_LOCALES.contains(&locale) {
        warn!(locale, "不支持的语言，忽略");
        return false;
    }
    rust_i18n::set_locale(locale);
    true
}

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use resort_offer_recognition::i18n::t;
/// let msg = t("layout.no_pattern");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息并替换 %{name} 占位符
///
/// 未提供的占位符原样保留
///
/// # 示例
/// ```no_run
/// use resort_offer_recognition::i18n::t_with_args;
/// let msg = t_with_args("validation.mixed_currency", &[("currencies", "EUR, GBP")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    args.iter()
        .fold(t(key), |message, (name, value)| {
            message.replace(&format!("%{{{}}}", name), value)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // locale 为全局状态，切换语言的测试串行执行
    static LOCALE_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_set_locale() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        assert!(set_locale("zh-CN"));
        assert_eq!(current_locale(), "zh-CN");

        assert!(!set_locale("fr"));
        assert_eq!(current_locale(), "zh-CN");

        assert!(set_locale("en"));
        assert_eq!(current_locale(), "en");
    }

    #[test]
    fn test_translate_simple() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("en");
        assert_eq!(t("layout.no_pattern"), "No pricing layout was recognised");

        set_locale("zh-CN");
        assert_eq!(t("layout.no_pattern"), "未识别到价格版式");

        set_locale("en");
    }

    #[test]
    fn test_translate_with_args() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        for (locale, marker) in [("en", "Mixed currencies"), ("zh-CN", "混用")] {
            set_locale(locale);
            let msg = t_with_args("validation.mixed_currency", &[("currencies", "EUR, GBP")]);
            assert!(msg.contains("EUR, GBP"));
            assert!(msg.contains(marker));
            assert!(!msg.contains("%{"));
        }
        set_locale("en");
    }
}
