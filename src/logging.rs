// ==========================================
// 日志系统初始化
// ==========================================
// RUST_LOG 控制级别，默认 info，输出到 stderr
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 初始化 CLI 日志（只能调用一次）
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // 日志写到 stderr，stdout 只留转换结果
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .init();
}

/// 测试用，可重复调用
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
