// ==========================================
// 单元格日期转换器 - 日期读取转换
// ==========================================
// 职责: 单元格原始文本 → 日历日期
// 流程: 空白判断 → TRIM(<= U+0020) → 纯数字(epoch 秒) / 格式化文本(模板解析)
// 红线: 纯数字一律按时间戳处理，不受字段格式提示影响
// ==========================================

use crate::config::ConverterConfig;
use crate::converter::error::{ConvertResult, ParseError};
use crate::converter::pattern::DatePattern;
use crate::converter::read_converter_trait::{FieldFormatHint, ReadConverter};
use crate::converter::zone::EpochZone;
use chrono::{DateTime, NaiveDate};

/// 默认日期格式模板
pub const DEFAULT_DATE_FORMAT: &str = "yyyy-MM-dd HH:mm:ss";

// ==========================================
// DateConverter - 日期读取转换器
// ==========================================
#[derive(Debug, Clone)]
pub struct DateConverter {
    default_pattern: DatePattern,
    zone: EpochZone,
}

impl DateConverter {
    /// 默认模板 + 主机本地时区
    pub fn new() -> Self {
        Self::with_zone(EpochZone::Local)
    }

    /// 默认模板 + 指定时间戳换算时区
    pub fn with_zone(zone: EpochZone) -> Self {
        Self {
            default_pattern: default_pattern(),
            zone,
        }
    }

    /// 从配置创建
    ///
    /// # 返回
    /// - Err(ParseError::InvalidPattern): 配置的默认模板无法编译
    pub fn from_config(config: &ConverterConfig) -> ConvertResult<Self> {
        Ok(Self {
            default_pattern: DatePattern::compile(&config.default_pattern)?,
            zone: config.epoch_zone,
        })
    }

    pub fn default_pattern(&self) -> &str {
        self.default_pattern.as_str()
    }

    pub fn zone(&self) -> EpochZone {
        self.zone
    }

    /// 转换单元格文本为日期
    ///
    /// # 参数
    /// - raw: 单元格原始文本（None 视同空白）
    /// - hint: 字段级日期格式模板（None 或空白时使用默认模板）
    ///
    /// # 返回
    /// - Ok(None): 输入为空或全为空白
    /// - Ok(Some(date)): 转换成功
    /// - Err(NumericOverflow): 纯数字超出 i64 范围
    /// - Err(TimestampOutOfRange): 时间戳超出可表示的日期范围
    /// - Err(FormatMismatch): 文本与模板不匹配
    /// - Err(InvalidPattern): 格式提示本身无法编译
    ///
    /// # 注意
    /// - "20230101" 这类纯数字会被当作 20,230,101 秒，而不是日期字面量
    /// - 可换算的秒数约为 ±8.2×10¹²（chrono 日历上限约为公元 ±262,143 年），
    ///   超出即 TimestampOutOfRange，远小于 i64 上限
    /// - 空白判断与 TRIM 只认 ASCII 控制字符和空格一类字符，
    ///   仅含 U+00A0 之类不换行空格的单元格不算空白，会进入模板解析
    pub fn convert(
        &self,
        raw: Option<&str>,
        hint: Option<&str>,
    ) -> ConvertResult<Option<NaiveDate>> {
        let trimmed = match raw {
            None => return Ok(None),
            Some(text) if is_blank(text) => return Ok(None),
            Some(text) => text.trim_matches(|c: char| c <= ' '),
        };

        if is_digits(trimmed) {
            let seconds: i64 = trimmed.parse().map_err(|_| ParseError::NumericOverflow {
                input: trimmed.to_string(),
            })?;
            tracing::debug!(seconds, zone = %self.zone, "按 epoch 秒解析日期");
            return self.convert_epoch_seconds(seconds).map(Some);
        }

        let date = match hint.filter(|h| !h.trim().is_empty()) {
            Some(pattern) => {
                tracing::debug!(pattern, "按字段格式提示解析日期");
                DatePattern::compile(pattern)?.parse_date(trimmed)?
            }
            None => self.default_pattern.parse_date(trimmed)?,
        };

        Ok(Some(date))
    }

    /// epoch 秒 → 换算时区下的日历日期
    pub fn convert_epoch_seconds(&self, seconds: i64) -> ConvertResult<NaiveDate> {
        DateTime::from_timestamp(seconds, 0)
            .map(|instant| self.zone.date_of(instant))
            .ok_or(ParseError::TimestampOutOfRange { seconds })
    }
}

impl Default for DateConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadConverter for DateConverter {
    type Output = NaiveDate;

    fn convert(
        &self,
        raw: Option<&str>,
        hint: &FieldFormatHint,
    ) -> ConvertResult<Option<NaiveDate>> {
        DateConverter::convert(self, raw, hint.pattern())
    }
}

fn default_pattern() -> DatePattern {
    // 默认模板为编译期常量，只含受支持的字母
    match DatePattern::compile(DEFAULT_DATE_FORMAT) {
        Ok(pattern) => pattern,
        Err(e) => unreachable!("默认日期模板无效: {}", e),
    }
}

/// 全部为空白字符（不含不换行空格 U+00A0 / U+2007 / U+202F）
fn is_blank(text: &str) -> bool {
    text.chars().all(|c| {
        (c.is_whitespace() && !matches!(c, '\u{00A0}' | '\u{2007}' | '\u{202F}' | '\u{0085}'))
            || matches!(c, '\u{1C}'..='\u{1F}')
    })
}

/// 整串均为 ASCII 数字（至少一位）
fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}
