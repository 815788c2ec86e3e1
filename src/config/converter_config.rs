// ==========================================
// 单元格日期转换器 - 转换器配置
// ==========================================
// 职责: 默认日期模板、时间戳换算时区的加载与校验
// 存储: JSON 文件（所有字段可省略，缺省取内置默认值）
// ==========================================

use crate::converter::date_converter::DEFAULT_DATE_FORMAT;
use crate::converter::pattern::DatePattern;
use crate::converter::zone::EpochZone;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// 配置键
pub mod config_keys {
    pub const DEFAULT_PATTERN: &str = "default_pattern";
    pub const EPOCH_ZONE: &str = "epoch_zone";
}

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败: {0}")]
    FileReadError(String),

    #[error("配置解析失败: {0}")]
    JsonError(String),

    #[error("配置值格式错误 (key: {key}, value: {value}): {message}")]
    ConfigValueError {
        key: String,
        value: String,
        message: String,
    },
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::FileReadError(err.to_string())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::JsonError(err.to_string())
    }
}

// ==========================================
// ConverterConfig - 转换器配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// 字段未声明格式提示时使用的模板
    pub default_pattern: String,

    /// 纯数字时间戳的换算时区（local / utc / ±HH:MM）
    pub epoch_zone: EpochZone,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            default_pattern: DEFAULT_DATE_FORMAT.to_string(),
            epoch_zone: EpochZone::Local,
        }
    }
}

impl ConverterConfig {
    /// 从 JSON 文本加载并校验
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: ConverterConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 从 JSON 文件加载并校验
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&raw)?;
        tracing::info!(
            path = %path.display(),
            default_pattern = %config.default_pattern,
            epoch_zone = %config.epoch_zone,
            "转换器配置加载完成"
        );
        Ok(config)
    }

    /// 加载配置（未指定路径时取默认值）
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::from_file(p),
            None => {
                tracing::debug!("未指定配置文件，使用默认配置");
                Ok(Self::default())
            }
        }
    }

    /// 校验配置值
    ///
    /// # 规则
    /// - default_pattern 不能为空白
    /// - default_pattern 必须能编译为日期模板
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_pattern.trim().is_empty() {
            return Err(ConfigError::ConfigValueError {
                key: config_keys::DEFAULT_PATTERN.to_string(),
                value: self.default_pattern.clone(),
                message: "默认日期模板不能为空".to_string(),
            });
        }

        DatePattern::compile(&self.default_pattern).map_err(|e| {
            ConfigError::ConfigValueError {
                key: config_keys::DEFAULT_PATTERN.to_string(),
                value: self.default_pattern.clone(),
                message: e.to_string(),
            }
        })?;

        Ok(())
    }

    /// 导出为 JSON（便于生成配置样例）
    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn test_empty_json_uses_defaults() {
        let config = ConverterConfig::from_json_str("{}").unwrap();
        assert_eq!(config, ConverterConfig::default());
        assert_eq!(config.default_pattern, "yyyy-MM-dd HH:mm:ss");
        assert_eq!(config.epoch_zone, EpochZone::Local);
    }

    #[test]
    fn test_full_json() {
        let config = ConverterConfig::from_json_str(
            r#"{"default_pattern": "yyyy/MM/dd", "epoch_zone": "+08:00"}"#,
        )
        .unwrap();
        assert_eq!(config.default_pattern, "yyyy/MM/dd");
        assert_eq!(
            config.epoch_zone,
            EpochZone::Fixed(FixedOffset::east_opt(8 * 3600).unwrap())
        );
    }

    #[test]
    fn test_blank_pattern_rejected() {
        let err = ConverterConfig::from_json_str(r#"{"default_pattern": "  "}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ConfigValueError { ref key, .. } if key == config_keys::DEFAULT_PATTERN
        ));
    }

    #[test]
    fn test_unusable_pattern_rejected() {
        let err =
            ConverterConfig::from_json_str(r#"{"default_pattern": "yyyy-MM-dd B"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigValueError { .. }));
    }

    #[test]
    fn test_bad_zone_rejected() {
        let err = ConverterConfig::from_json_str(r#"{"epoch_zone": "Mars/Olympus"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::JsonError(_)));
    }

    #[test]
    fn test_json_round_trip() {
        let config = ConverterConfig {
            default_pattern: "dd.MM.yyyy".to_string(),
            epoch_zone: EpochZone::Utc,
        };
        let json = config.to_json_pretty().unwrap();
        assert!(json.contains(r#""epoch_zone": "utc""#));
        assert_eq!(ConverterConfig::from_json_str(&json).unwrap(), config);
    }
}
