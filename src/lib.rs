// ==========================================
// 单元格日期转换器 - 核心库
// ==========================================
// 定位: 行映射管道中的叶子工具
// 输入: 单元格原始文本 + 字段级日期格式提示
// 输出: 日历日期 / 空值 / 类型化错误
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 转换层 - 单元格文本 → 日期
pub mod converter;

// 配置层 - 默认模板与时区
pub mod config;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

pub use config::{ConfigError, ConverterConfig};
pub use converter::{
    ConvertResult, DateConverter, DatePattern, EpochZone, FieldFormatHint, ParseError,
    ParseErrorKind, ReadConverter, DEFAULT_DATE_FORMAT,
};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "单元格日期转换器";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
