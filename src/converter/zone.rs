// ==========================================
// 单元格日期转换器 - 时间戳换算时区
// ==========================================
// 职责: 决定纯数字时间戳（epoch 秒）落到哪一个日历日
// 默认: 进程所在主机的本地时区（Local）
// ==========================================

use chrono::{DateTime, FixedOffset, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 时间戳换算所用时区
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EpochZone {
    /// 主机本地时区（调用时读取）
    #[default]
    Local,
    Utc,
    Fixed(FixedOffset),
}

impl EpochZone {
    /// 取瞬时值在该时区下的日历日期
    pub fn date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        match self {
            EpochZone::Local => instant.with_timezone(&Local).date_naive(),
            EpochZone::Utc => instant.date_naive(),
            EpochZone::Fixed(offset) => instant.with_timezone(offset).date_naive(),
        }
    }
}

impl fmt::Display for EpochZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EpochZone::Local => f.write_str("local"),
            EpochZone::Utc => f.write_str("utc"),
            EpochZone::Fixed(offset) => write!(f, "{}", offset),
        }
    }
}

impl FromStr for EpochZone {
    type Err = String;

    /// 支持: local / utc / ±HH:MM / ±HHMM / ±HH
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        match value.to_ascii_lowercase().as_str() {
            "local" => return Ok(EpochZone::Local),
            "utc" | "z" => return Ok(EpochZone::Utc),
            _ => {}
        }

        parse_offset(value)
            .map(EpochZone::Fixed)
            .ok_or_else(|| format!("无法识别的时区: {:?}（支持 local / utc / ±HH:MM）", s))
    }
}

impl TryFrom<String> for EpochZone {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EpochZone> for String {
    fn from(zone: EpochZone) -> Self {
        zone.to_string()
    }
}

fn parse_offset(value: &str) -> Option<FixedOffset> {
    let (sign, rest) = match value.as_bytes().first()? {
        b'+' => (1, &value[1..]),
        b'-' => (-1, &value[1..]),
        _ => return None,
    };

    // 仅接受 HH / HHMM / HH:MM
    if !rest.is_ascii() {
        return None;
    }
    let minutes_at = match rest.as_bytes() {
        [_, _] => None,
        [_, _, _, _] => Some(2),
        [_, _, b':', _, _] => Some(3),
        _ => return None,
    };
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());

    let hours_text = &rest[..2];
    let minutes_text = minutes_at.map_or("00", |at| &rest[at..]);
    if !all_digits(hours_text) || !all_digits(minutes_text) {
        return None;
    }
    let hours: i32 = hours_text.parse().ok()?;
    let minutes: i32 = minutes_text.parse().ok()?;

    if hours > 18 || minutes > 59 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
