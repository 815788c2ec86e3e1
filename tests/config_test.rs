// ==========================================
// 单元格日期转换器 - 配置加载集成测试
// ==========================================


use cell_date_converter::{ConfigError, ConverterConfig, DateConverter, EpochZone};
use test_helpers::{write_config_file, ymd};

#[test]
fn test_load_without_path_uses_defaults() {
    let config = ConverterConfig::load(None).unwrap();
    assert_eq!(config.default_pattern, "yyyy-MM-dd HH:mm:ss");
    assert_eq!(config.epoch_zone, EpochZone::Local);
}

#[test]
fn test_load_from_file() {
    let file = write_config_file(r#"{"default_pattern": "dd/MM/yyyy", "epoch_zone": "utc"}"#)
        .expect("写入配置文件失败");

    let config = ConverterConfig::load(Some(file.path())).unwrap();
    let converter = DateConverter::from_config(&config).unwrap();

    assert_eq!(
        converter.convert(Some("17/05/2023"), None).unwrap(),
        Some(ymd(2023, 5, 17))
    );
    // 2023-05-16T20:00:00Z
    assert_eq!(
        converter.convert(Some("1684267200"), None).unwrap(),
        Some(ymd(2023, 5, 16))
    );
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.json");
    let err = ConverterConfig::load(Some(missing.as_path())).unwrap_err();
    assert!(matches!(err, ConfigError::FileReadError(_)));
}

#[test]
fn test_load_malformed_file() {
    let file = write_config_file("{ not json").expect("写入配置文件失败");
    let err = ConverterConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::JsonError(_)));
}

#[test]
fn test_load_invalid_pattern_file() {
    let file =
        write_config_file(r#"{"default_pattern": "yyyy-MM-dd'"}"#).expect("写入配置文件失败");
    let err = ConverterConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::ConfigValueError { .. }));
}
