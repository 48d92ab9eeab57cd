// ==========================================
// 日志系统初始化
// ==========================================
// 使用 tracing 和 tracing-subscriber
// 库本身只产生事件，订阅器由调用方按需初始化
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 默认过滤器: 本库 info，其余依赖 warn
pub const DEFAULT_FILTER: &str = "warn,resort_offer_recognition=info";

/// RUST_LOG 优先，否则使用给定的默认指令
fn env_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// 初始化日志系统（人类可读格式）
///
/// # 环境变量
/// - RUST_LOG: 覆盖 DEFAULT_FILTER
///   例如: RUST_LOG=resort_offer_recognition::engine::layout=debug
///
/// # 返回
/// 是否由本次调用完成初始化（已有全局订阅器时为 false）
pub fn init() -> bool {
    init_with_filter(DEFAULT_FILTER)
}

/// 以指定默认指令初始化（RUST_LOG 仍优先）
pub fn init_with_filter(default_directive: &str) -> bool {
    fmt()
        .with_env_filter(env_filter(default_directive))
        .with_target(true)
        .with_line_number(true)
        .try_init()
        .is_ok()
}

/// 以 JSON 行输出日志（批量识别时便于采集，附带当前 span 字段）
pub fn init_json() -> bool {
    fmt()
        .json()
        .with_env_filter(env_filter(DEFAULT_FILTER))
        .with_current_span(true)
        .try_init()
        .is_ok()
}

/// 测试用: debug 级别，输出交给测试框架捕获
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
