// ==========================================
// 单元格日期转换器 - 命令行入口
// ==========================================
// 用法:
//   date-convert <raw_text> [format_pattern]
//
// 环境变量:
//   DATE_CONVERT_CONFIG  转换器配置文件（JSON），缺省使用内置默认值
//   RUST_LOG             日志级别
// ==========================================

use anyhow::Context;
use cell_date_converter::{logging, ConverterConfig, DateConverter};
use std::path::PathBuf;

const CONFIG_ENV: &str = "DATE_CONVERT_CONFIG";

fn main() -> anyhow::Result<()> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let raw = args
        .next()
        .context("用法: date-convert <raw_text> [format_pattern]")?;
    let hint = args.next();

    let config_path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
    let config = ConverterConfig::load(config_path.as_deref())
        .with_context(|| format!("加载配置失败 ({})", CONFIG_ENV))?;
    let converter = DateConverter::from_config(&config)?;

    tracing::debug!(
        version = cell_date_converter::VERSION,
        default_pattern = converter.default_pattern(),
        zone = %converter.zone(),
        "转换器就绪"
    );

    match converter.convert(Some(&raw), hint.as_deref())? {
        Some(date) => println!("{}", date.format("%Y-%m-%d")),
        None => println!("<none>"),
    }

    Ok(())
}
