// ==========================================
// 单元格日期转换器 - 转换错误类型
// ==========================================
// 工具: thiserror 派生宏
// 约定: 空白输入不是错误（返回 Ok(None)）
// ==========================================

use thiserror::Error;

/// 日期读取转换错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    // ===== 时间戳分支 =====
    #[error("时间戳数值溢出: {input}（超出 64 位有符号整数范围）")]
    NumericOverflow { input: String },

    #[error("时间戳超出可表示的日期范围: {seconds} 秒")]
    TimestampOutOfRange { seconds: i64 },

    // ===== 格式化文本分支 =====
    #[error("日期格式不匹配 (格式 {pattern}): 输入 {input:?}，{reason}")]
    FormatMismatch {
        pattern: String,
        input: String,
        reason: String,
    },

    #[error("日期格式模板无效: {pattern:?}，{reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// 错误种类（便于调用方按类别分支处理）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    NumericOverflow,
    TimestampOutOfRange,
    FormatMismatch,
    InvalidPattern,
}

impl ParseError {
    pub fn kind(&self) -> ParseErrorKind {
        match self {
            ParseError::NumericOverflow { .. } => ParseErrorKind::NumericOverflow,
            ParseError::TimestampOutOfRange { .. } => ParseErrorKind::TimestampOutOfRange,
            ParseError::FormatMismatch { .. } => ParseErrorKind::FormatMismatch,
            ParseError::InvalidPattern { .. } => ParseErrorKind::InvalidPattern,
        }
    }

    pub(crate) fn mismatch(pattern: &str, input: &str, reason: impl Into<String>) -> Self {
        ParseError::FormatMismatch {
            pattern: pattern.to_string(),
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_pattern(pattern: &str, reason: impl Into<String>) -> Self {
        ParseError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result 类型别名
pub type ConvertResult<T> = Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind() {
        let err = ParseError::NumericOverflow {
            input: "99999999999999999999".to_string(),
        };
        assert_eq!(err.kind(), ParseErrorKind::NumericOverflow);

        let err = ParseError::mismatch("yyyy-MM-dd", "abc", "第 1 个字符应为数字");
        assert_eq!(err.kind(), ParseErrorKind::FormatMismatch);
    }

    #[test]
    fn test_error_message_contains_context() {
        let err = ParseError::mismatch("yyyy/MM/dd", "2023-05-17", "第 5 个字符应为 '/'");
        let msg = err.to_string();
        assert!(msg.contains("yyyy/MM/dd"));
        assert!(msg.contains("2023-05-17"));
    }
}
