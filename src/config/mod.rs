// ==========================================
// 单元格日期转换器 - 配置层
// ==========================================
// 职责: 转换器配置加载与校验
// 存储: JSON 文件，缺省取内置默认值
// ==========================================

pub mod converter_config;

// 重导出核心配置
pub use converter_config::{config_keys, ConfigError, ConverterConfig};
