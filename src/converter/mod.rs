// ==========================================
// 单元格日期转换器 - 转换层
// ==========================================
// 职责: 单元格原始文本 → 目标字段值
// 输入: 行映射层提取的单元格文本 + 字段级格式提示
// ==========================================

// 模块声明
pub mod date_converter;
pub mod error;
pub mod pattern;
pub mod read_converter_trait;
pub mod zone;

// 重导出核心类型
pub use date_converter::{DateConverter, DEFAULT_DATE_FORMAT};
pub use error::{ConvertResult, ParseError, ParseErrorKind};
pub use pattern::DatePattern;
pub use zone::EpochZone;

// 重导出 Trait 接口
pub use read_converter_trait::{FieldFormatHint, ReadConverter};
