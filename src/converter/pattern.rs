// ==========================================
// 单元格日期转换器 - 日期格式模板
// ==========================================
// 职责: 编译 yyyy-MM-dd 风格的格式模板，并按模板严格解析文本
// 规则: 整串匹配 / 定宽字段 / 相邻数字字段预留宽度
// 落定: 日超出当月天数时取月末，24:00:00 顺延一天（SMART 解析）
// 偏移/时区/周/季度等字段只校验形状或一致性，不影响结果日期
// ==========================================

use crate::converter::error::ParseError;
use chrono::{Datelike, NaiveDate, Weekday};
use std::fmt;

/// 年份字段最多读取的数字位数
const MAX_YEAR_DIGITS: usize = 9;

/// 两位年份的基准年（yy → 2000..=2099）
const TWO_DIGIT_YEAR_BASE: i64 = 2000;

/// 偏移量小时上限（±18:00）
const MAX_OFFSET_HOURS: u32 = 18;

const MONTH_SHORT: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const MONTH_LONG: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const WEEKDAYS: [(Weekday, &str, &str); 7] = [
    (Weekday::Mon, "Mon", "Monday"),
    (Weekday::Tue, "Tue", "Tuesday"),
    (Weekday::Wed, "Wed", "Wednesday"),
    (Weekday::Thu, "Thu", "Thursday"),
    (Weekday::Fri, "Fri", "Friday"),
    (Weekday::Sat, "Sat", "Saturday"),
    (Weekday::Sun, "Sun", "Sunday"),
];

const QUARTER_SHORT: [&str; 4] = ["Q1", "Q2", "Q3", "Q4"];

const QUARTER_LONG: [&str; 4] = ["1st quarter", "2nd quarter", "3rd quarter", "4th quarter"];

/// (公元, 公元前)
const ERA_SHORT: (&str, &str) = ("AD", "BC");
const ERA_LONG: (&str, &str) = ("Anno Domini", "Before Christ");
const ERA_NARROW: (&str, &str) = ("A", "B");

// ==========================================
// 模板字段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    /// y: 纪年年份（>= 1）
    YearOfEra,
    TwoDigitYearOfEra,
    /// u: 预期公历年份（可为 0 或负数）
    ProlepticYear,
    TwoDigitProlepticYear,
    /// Y: 周年（只校验）
    WeekBasedYear,
    TwoDigitWeekBasedYear,
    EraShort,
    EraLong,
    EraNarrow,
    Month,
    MonthShort,
    MonthLong,
    Quarter,
    QuarterShort,
    QuarterLong,
    DayOfMonth,
    DayOfYear,
    /// w: 周年中的周（只校验）
    WeekOfWeekBasedYear,
    /// W: 月中的周（只校验）
    WeekOfMonth,
    /// e/c 数字形式（只校验）
    LocalWeekday,
    WeekdayShort,
    WeekdayLong,
    /// H: 0-23（24:00:00 顺延一天）
    HourOfDay,
    /// k: 1-24
    ClockHourOfDay,
    /// K: 0-11
    HourOfAmPm,
    /// h: 1-12
    ClockHourOfAmPm,
    AmPm,
    Minute,
    Second,
    Fraction,
    NanoOfSecond,
    /// A: 日内毫秒（只校验）
    MilliOfDay,
    /// N: 日内纳秒（只校验）
    NanoOfDay,
}

impl Field {
    fn label(self) -> &'static str {
        match self {
            Field::YearOfEra
            | Field::TwoDigitYearOfEra
            | Field::ProlepticYear
            | Field::TwoDigitProlepticYear => "年",
            Field::WeekBasedYear | Field::TwoDigitWeekBasedYear => "周年",
            Field::EraShort | Field::EraLong | Field::EraNarrow => "纪元",
            Field::Month | Field::MonthShort | Field::MonthLong => "月",
            Field::Quarter | Field::QuarterShort | Field::QuarterLong => "季度",
            Field::DayOfMonth => "日",
            Field::DayOfYear => "年内天数",
            Field::WeekOfWeekBasedYear => "年内周数",
            Field::WeekOfMonth => "月内周数",
            Field::LocalWeekday | Field::WeekdayShort | Field::WeekdayLong => "星期",
            Field::HourOfDay | Field::ClockHourOfDay => "时",
            Field::HourOfAmPm | Field::ClockHourOfAmPm => "时(12小时制)",
            Field::AmPm => "上下午标记",
            Field::Minute => "分",
            Field::Second => "秒",
            Field::Fraction | Field::NanoOfSecond => "纳秒",
            Field::MilliOfDay => "日内毫秒",
            Field::NanoOfDay => "日内纳秒",
        }
    }
}

/// 偏移量 / 时区文本的形态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OffsetStyle {
    /// X/x/Z: +HH[MM] / +HH:MM[:ss]，zulu 表示接受 "Z"
    Iso {
        colon: bool,
        minutes_required: bool,
        seconds_allowed: bool,
        zulu: bool,
    },
    /// O / ZZZZ: GMT+8 / GMT+08:00
    Gmt { full: bool },
    /// VV: Asia/Shanghai / Z / +08:00
    ZoneId,
    /// z / v: CST / China Standard Time
    ZoneName { full: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Number { field: Field, min: usize, max: usize },
    Text(Field),
    Offset(OffsetStyle),
}

impl Segment {
    fn fixed_width(&self) -> Option<usize> {
        match self {
            Segment::Number { min, max, .. } if min == max => Some(*min),
            _ => None,
        }
    }
}

// ==========================================
// DatePattern - 已编译的格式模板
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatePattern {
    source: String,
    segments: Vec<Segment>,
}

impl DatePattern {
    /// 编译格式模板
    ///
    /// # 支持的模板字母
    /// - y: 纪年年份，u: 公历年份（yy/uu 为两位年份，基准 2000），G: 纪元 AD/BC
    /// - M/L: 月（M/MM 数字，MMM 英文缩写，MMMM 英文全称），Q/q: 季度
    /// - d: 日，D: 年内天数，E/e/c: 星期
    /// - H/k/K/h: 小时，m: 分，s: 秒，S: 秒小数，n: 纳秒，a: AM/PM
    /// - Y/w/W/A/N: 周年、周数、日内毫秒/纳秒（只校验）
    /// - X/x/Z/O/VV/z/v: 偏移量与时区（只校验形状）
    /// - '...': 引号内为字面量，'' 表示单引号
    ///
    /// # 返回
    /// - Err(ParseError::InvalidPattern): 空模板、未知字母、字母重复次数非法、引号未闭合
    pub fn compile(pattern: &str) -> Result<Self, ParseError> {
        if pattern.is_empty() {
            return Err(ParseError::invalid_pattern(pattern, "模板为空"));
        }

        let chars: Vec<char> = pattern.chars().collect();
        let mut segments: Vec<Segment> = Vec::new();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];

            if c.is_ascii_alphabetic() {
                let mut count = 1;
                while i + count < chars.len() && chars[i + count] == c {
                    count += 1;
                }
                segments.push(letter_segment(pattern, c, count)?);
                i += count;
                continue;
            }

            match c {
                '\'' => {
                    let (text, consumed) = quoted_literal(pattern, &chars[i..])?;
                    push_literal(&mut segments, &text);
                    i += consumed;
                }
                '[' | ']' | '{' | '}' | '#' => {
                    return Err(ParseError::invalid_pattern(
                        pattern,
                        format!("保留字符 '{}' 不支持", c),
                    ));
                }
                _ => {
                    push_literal(&mut segments, &c.to_string());
                    i += 1;
                }
            }
        }

        tracing::trace!(pattern, segments = segments.len(), "日期格式模板编译完成");

        Ok(Self {
            source: pattern.to_string(),
            segments,
        })
    }

    /// 模板原文
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// 按模板解析整段文本，仅保留日期部分
    ///
    /// 时间字段同样会被校验（范围、宽度），但只有 24:00:00 会影响结果日期。
    pub fn parse_date(&self, input: &str) -> Result<NaiveDate, ParseError> {
        let mut values = FieldValues::default();
        let mut pos = 0;

        for (idx, segment) in self.segments.iter().enumerate() {
            let rest = &input[pos..];
            let column = input[..pos].chars().count() + 1;

            match segment {
                Segment::Literal(lit) => {
                    if !rest.starts_with(lit.as_str()) {
                        return Err(self.mismatch(
                            input,
                            format!("第 {} 个字符处应为 {:?}", column, lit),
                        ));
                    }
                    pos += lit.len();
                }
                Segment::Number { field, min, max } => {
                    let available = rest.bytes().take_while(u8::is_ascii_digit).count();
                    let take = if min == max {
                        *min
                    } else {
                        available.saturating_sub(self.reserved_width(idx)).min(*max)
                    };

                    if take < *min || take > available {
                        return Err(self.mismatch(
                            input,
                            format!(
                                "第 {} 个字符处应为 {} 位数字的{}",
                                column,
                                min,
                                field.label()
                            ),
                        ));
                    }

                    let digits = &rest[..take];
                    let value: i64 = digits.parse().map_err(|_| {
                        self.mismatch(input, format!("{}无法解析: {}", field.label(), digits))
                    })?;

                    values
                        .apply_number(*field, value, take)
                        .map_err(|reason| self.mismatch(input, reason))?;
                    pos += take;
                }
                Segment::Text(field) => {
                    let consumed = values.apply_text(*field, rest).map_err(|reason| {
                        self.mismatch(input, format!("第 {} 个字符处{}", column, reason))
                    })?;
                    pos += consumed;
                }
                Segment::Offset(style) => {
                    let consumed = consume_offset(*style, rest).map_err(|reason| {
                        self.mismatch(input, format!("第 {} 个字符处{}", column, reason))
                    })?;
                    pos += consumed;
                }
            }
        }

        if pos < input.len() {
            return Err(self.mismatch(
                input,
                format!("存在未解析的多余字符 {:?}", &input[pos..]),
            ));
        }

        values
            .resolve()
            .map_err(|reason| self.mismatch(input, reason))
    }

    /// 可变宽度字段之后紧邻的定宽数字字段所需的总宽度
    fn reserved_width(&self, idx: usize) -> usize {
        self.segments[idx + 1..]
            .iter()
            .map_while(Segment::fixed_width)
            .sum()
    }

    fn mismatch(&self, input: &str, reason: impl Into<String>) -> ParseError {
        ParseError::mismatch(&self.source, input, reason)
    }
}

impl fmt::Display for DatePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

// ==========================================
// 编译辅助
// ==========================================

fn letter_segment(pattern: &str, letter: char, count: usize) -> Result<Segment, ParseError> {
    let number = |field: Field, min: usize, max: usize| -> Result<Segment, ParseError> {
        Ok(Segment::Number { field, min, max })
    };
    let text = |field: Field| -> Result<Segment, ParseError> { Ok(Segment::Text(field)) };
    let offset = |style: OffsetStyle| -> Result<Segment, ParseError> { Ok(Segment::Offset(style)) };
    let iso = |colon, minutes_required, seconds_allowed, zulu| {
        offset(OffsetStyle::Iso {
            colon,
            minutes_required,
            seconds_allowed,
            zulu,
        })
    };

    match (letter, count) {
        // ===== 年 / 纪元 =====
        ('y', 2) => number(Field::TwoDigitYearOfEra, 2, 2),
        ('y', 1..=MAX_YEAR_DIGITS) => number(Field::YearOfEra, count, MAX_YEAR_DIGITS),
        ('u', 2) => number(Field::TwoDigitProlepticYear, 2, 2),
        ('u', 1..=MAX_YEAR_DIGITS) => number(Field::ProlepticYear, count, MAX_YEAR_DIGITS),
        ('Y', 2) => number(Field::TwoDigitWeekBasedYear, 2, 2),
        ('Y', 1..=MAX_YEAR_DIGITS) => number(Field::WeekBasedYear, count, MAX_YEAR_DIGITS),
        ('G', 1..=3) => text(Field::EraShort),
        ('G', 4) => text(Field::EraLong),
        ('G', 5) => text(Field::EraNarrow),

        // ===== 月 / 季度 =====
        ('M' | 'L', 1) => number(Field::Month, 1, 2),
        ('M' | 'L', 2) => number(Field::Month, 2, 2),
        ('M' | 'L', 3) => text(Field::MonthShort),
        ('M' | 'L', 4) => text(Field::MonthLong),
        ('Q' | 'q', 1) => number(Field::Quarter, 1, 1),
        ('Q' | 'q', 2) => number(Field::Quarter, 2, 2),
        ('Q' | 'q', 3) => text(Field::QuarterShort),
        ('Q' | 'q', 4) => text(Field::QuarterLong),

        // ===== 日 / 周 =====
        ('d', 1) => number(Field::DayOfMonth, 1, 2),
        ('d', 2) => number(Field::DayOfMonth, 2, 2),
        ('D', 1..=3) => number(Field::DayOfYear, count, 3),
        ('w', 1) => number(Field::WeekOfWeekBasedYear, 1, 2),
        ('w', 2) => number(Field::WeekOfWeekBasedYear, 2, 2),
        ('W', 1) => number(Field::WeekOfMonth, 1, 1),
        ('E', 1..=3) => text(Field::WeekdayShort),
        ('E', 4) => text(Field::WeekdayLong),
        ('e', 1) | ('c', 1) => number(Field::LocalWeekday, 1, 1),
        ('e', 2) => number(Field::LocalWeekday, 2, 2),
        ('e' | 'c', 3) => text(Field::WeekdayShort),
        ('e' | 'c', 4) => text(Field::WeekdayLong),

        // ===== 时间 =====
        ('H' | 'k' | 'K' | 'h' | 'm' | 's', 1 | 2) => {
            let field = match letter {
                'H' => Field::HourOfDay,
                'k' => Field::ClockHourOfDay,
                'K' => Field::HourOfAmPm,
                'h' => Field::ClockHourOfAmPm,
                'm' => Field::Minute,
                _ => Field::Second,
            };
            number(field, count, 2)
        }
        ('S', 1..=9) => number(Field::Fraction, count, count),
        ('n', 1..=9) => number(Field::NanoOfSecond, count, 9),
        ('A', 1..=8) => number(Field::MilliOfDay, count, 8),
        ('N', 1..=14) => number(Field::NanoOfDay, count, 14),
        ('a', 1) => text(Field::AmPm),

        // ===== 偏移量 / 时区 =====
        ('X', 1) => iso(false, false, false, true),
        ('X', 2) => iso(false, true, false, true),
        ('X', 3) => iso(true, true, false, true),
        ('X', 4) => iso(false, true, true, true),
        ('X', 5) => iso(true, true, true, true),
        ('x', 1) => iso(false, false, false, false),
        ('x', 2) => iso(false, true, false, false),
        ('x', 3) => iso(true, true, false, false),
        ('x', 4) => iso(false, true, true, false),
        ('x', 5) => iso(true, true, true, false),
        ('Z', 1..=3) => iso(false, true, false, false),
        ('Z', 4) => offset(OffsetStyle::Gmt { full: true }),
        ('Z', 5) => iso(true, true, true, true),
        ('O', 1) => offset(OffsetStyle::Gmt { full: false }),
        ('O', 4) => offset(OffsetStyle::Gmt { full: true }),
        ('V', 2) => offset(OffsetStyle::ZoneId),
        ('z', 1..=3) | ('v', 1) => offset(OffsetStyle::ZoneName { full: false }),
        ('z' | 'v', 4) => offset(OffsetStyle::ZoneName { full: true }),

        ('y' | 'u' | 'Y' | 'G' | 'M' | 'L' | 'Q' | 'q' | 'd' | 'D' | 'w' | 'W' | 'E' | 'e'
        | 'c' | 'H' | 'k' | 'K' | 'h' | 'm' | 's' | 'S' | 'n' | 'A' | 'N' | 'a' | 'X' | 'x'
        | 'Z' | 'O' | 'V' | 'z' | 'v', _) => Err(ParseError::invalid_pattern(
            pattern,
            format!("模板字母 '{}' 重复次数 {} 不支持", letter, count),
        )),
        _ => Err(ParseError::invalid_pattern(
            pattern,
            format!("不支持的模板字母 '{}'", letter),
        )),
    }
}

/// 读取引号字面量，返回 (字面量文本, 消耗的字符数)
fn quoted_literal(pattern: &str, chars: &[char]) -> Result<(String, usize), ParseError> {
    // '' 在引号外表示单个单引号
    if chars.get(1) == Some(&'\'') {
        return Ok(("'".to_string(), 2));
    }

    let mut text = String::new();
    let mut i = 1;
    while i < chars.len() {
        if chars[i] == '\'' {
            if chars.get(i + 1) == Some(&'\'') {
                text.push('\'');
                i += 2;
                continue;
            }
            return Ok((text, i + 1));
        }
        text.push(chars[i]);
        i += 1;
    }

    Err(ParseError::invalid_pattern(pattern, "引号未闭合"))
}

fn push_literal(segments: &mut Vec<Segment>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Segment::Literal(prev)) = segments.last_mut() {
        prev.push_str(text);
    } else {
        segments.push(Segment::Literal(text.to_string()));
    }
}

// ==========================================
// FieldValues - 解析出的字段值
// ==========================================
#[derive(Debug, Default)]
struct FieldValues {
    year_of_era: Option<i64>,
    proleptic_year: Option<i64>,
    /// true = 公元（AD）
    era_ad: Option<bool>,
    month: Option<u32>,
    quarter: Option<u32>,
    day_of_month: Option<u32>,
    day_of_year: Option<u32>,
    weekday: Option<Weekday>,
    /// 0-24
    hour_of_day: Option<u32>,
    /// 0-11
    hour_of_ampm: Option<u32>,
    pm: Option<bool>,
    minute: Option<u32>,
    second: Option<u32>,
    nano: Option<u32>,
}

/// 写入字段值，同一字段出现两次且取值不同视为冲突
fn assign<T: PartialEq + Copy + fmt::Debug>(
    slot: &mut Option<T>,
    value: T,
    label: &str,
) -> Result<(), String> {
    match slot {
        Some(prev) if *prev != value => Err(format!(
            "{}取值冲突: {:?} 与 {:?}",
            label, prev, value
        )),
        _ => {
            *slot = Some(value);
            Ok(())
        }
    }
}

fn check_range(field: Field, value: i64, min: i64, max: i64) -> Result<u32, String> {
    if value < min || value > max {
        Err(format!(
            "{}取值 {} 超出范围 [{}, {}]",
            field.label(),
            value,
            min,
            max
        ))
    } else {
        Ok(value as u32)
    }
}

impl FieldValues {
    fn apply_number(&mut self, field: Field, value: i64, width: usize) -> Result<(), String> {
        let label = field.label();
        match field {
            Field::YearOfEra => assign(&mut self.year_of_era, value, label),
            Field::TwoDigitYearOfEra => {
                assign(&mut self.year_of_era, TWO_DIGIT_YEAR_BASE + value, label)
            }
            Field::ProlepticYear => assign(&mut self.proleptic_year, value, label),
            Field::TwoDigitProlepticYear => {
                assign(&mut self.proleptic_year, TWO_DIGIT_YEAR_BASE + value, label)
            }
            Field::WeekBasedYear | Field::TwoDigitWeekBasedYear => Ok(()),
            Field::Month => assign(&mut self.month, check_range(field, value, 1, 12)?, label),
            Field::Quarter => assign(&mut self.quarter, check_range(field, value, 1, 4)?, label),
            Field::DayOfMonth => {
                assign(&mut self.day_of_month, check_range(field, value, 1, 31)?, label)
            }
            Field::DayOfYear => {
                assign(&mut self.day_of_year, check_range(field, value, 1, 366)?, label)
            }
            Field::WeekOfWeekBasedYear => check_range(field, value, 1, 53).map(|_| ()),
            Field::WeekOfMonth => check_range(field, value, 0, 6).map(|_| ()),
            Field::LocalWeekday => check_range(field, value, 1, 7).map(|_| ()),
            Field::HourOfDay => {
                assign(&mut self.hour_of_day, check_range(field, value, 0, 24)?, label)
            }
            Field::ClockHourOfDay => {
                let hour = check_range(field, value, 1, 24)? % 24;
                assign(&mut self.hour_of_day, hour, label)
            }
            Field::HourOfAmPm => {
                assign(&mut self.hour_of_ampm, check_range(field, value, 0, 11)?, label)
            }
            Field::ClockHourOfAmPm => {
                let hour = check_range(field, value, 1, 12)? % 12;
                assign(&mut self.hour_of_ampm, hour, label)
            }
            Field::Minute => assign(&mut self.minute, check_range(field, value, 0, 59)?, label),
            Field::Second => assign(&mut self.second, check_range(field, value, 0, 59)?, label),
            Field::Fraction => {
                let scale = 10_i64.pow((9 - width) as u32);
                assign(&mut self.nano, (value * scale) as u32, label)
            }
            Field::NanoOfSecond => assign(
                &mut self.nano,
                check_range(field, value, 0, 999_999_999)?,
                label,
            ),
            Field::MilliOfDay => check_range(field, value, 0, 86_399_999).map(|_| ()),
            Field::NanoOfDay => {
                if (0..=86_399_999_999_999).contains(&value) {
                    Ok(())
                } else {
                    Err(format!("{}取值 {} 超出范围", label, value))
                }
            }
            _ => unreachable!("文本字段不走数字解析"),
        }
    }

    /// 匹配文本字段，返回消耗的字节数
    fn apply_text(&mut self, field: Field, rest: &str) -> Result<usize, String> {
        let label = field.label();
        let expected = || format!("应为{}", label);

        match field {
            Field::MonthShort | Field::MonthLong => {
                let names = if field == Field::MonthShort {
                    &MONTH_SHORT
                } else {
                    &MONTH_LONG
                };
                let (idx, name) = find_prefix(names, rest).ok_or_else(expected)?;
                assign(&mut self.month, idx as u32 + 1, label)?;
                Ok(name.len())
            }
            Field::QuarterShort | Field::QuarterLong => {
                let names = if field == Field::QuarterShort {
                    &QUARTER_SHORT
                } else {
                    &QUARTER_LONG
                };
                let (idx, name) = find_prefix(names, rest).ok_or_else(expected)?;
                assign(&mut self.quarter, idx as u32 + 1, label)?;
                Ok(name.len())
            }
            Field::WeekdayShort | Field::WeekdayLong => {
                let (weekday, name) = WEEKDAYS
                    .iter()
                    .map(|(wd, short, long)| {
                        (*wd, if field == Field::WeekdayShort { *short } else { *long })
                    })
                    .find(|(_, name)| rest.starts_with(name))
                    .ok_or_else(expected)?;
                assign(&mut self.weekday, weekday, label)?;
                Ok(name.len())
            }
            Field::EraShort | Field::EraLong | Field::EraNarrow => {
                let (ad, bc) = match field {
                    Field::EraShort => ERA_SHORT,
                    Field::EraLong => ERA_LONG,
                    _ => ERA_NARROW,
                };
                let (is_ad, len) = if rest.starts_with(ad) {
                    (true, ad.len())
                } else if rest.starts_with(bc) {
                    (false, bc.len())
                } else {
                    return Err(expected());
                };
                assign(&mut self.era_ad, is_ad, label)?;
                Ok(len)
            }
            Field::AmPm => {
                let pm = if rest.starts_with("AM") {
                    false
                } else if rest.starts_with("PM") {
                    true
                } else {
                    return Err(expected());
                };
                assign(&mut self.pm, pm, label)?;
                Ok(2)
            }
            _ => unreachable!("数字字段不走文本解析"),
        }
    }

    fn resolve_year(&self) -> Result<i32, String> {
        let from_era = match self.year_of_era {
            Some(yoe) if yoe < 1 => {
                return Err(format!("纪年年份取值 {} 无效（应 >= 1）", yoe));
            }
            Some(yoe) => Some(if self.era_ad.unwrap_or(true) {
                yoe
            } else {
                1 - yoe
            }),
            None => None,
        };

        let year = match (from_era, self.proleptic_year) {
            (Some(a), Some(b)) if a != b => {
                return Err(format!("年份取值冲突: {} 与 {}", a, b));
            }
            (Some(year), _) | (None, Some(year)) => year,
            (None, None) => return Err("缺少年份，无法确定日期".to_string()),
        };

        if let (Some(ad), None) = (self.era_ad, self.year_of_era) {
            if ad != (year >= 1) {
                return Err(format!("纪元与年份 {} 不一致", year));
            }
        }

        i32::try_from(year).map_err(|_| format!("年份 {} 超出可表示范围", year))
    }

    /// 落定日历日期（SMART 规则）
    fn resolve(&self) -> Result<NaiveDate, String> {
        let year = self.resolve_year()?;

        let date = match (self.month, self.day_of_month, self.day_of_year) {
            (Some(month), Some(day), day_of_year) => {
                let last = last_day_of_month(year, month)
                    .ok_or_else(|| format!("{} 年 {} 月超出可表示范围", year, month))?;
                let date = NaiveDate::from_ymd_opt(year, month, day.min(last))
                    .ok_or_else(|| format!("{}-{}-{} 不是有效日期", year, month, day))?;
                if let Some(doy) = day_of_year {
                    if date.ordinal() != doy {
                        return Err(format!("年内天数 {} 与日期 {} 不一致", doy, date));
                    }
                }
                date
            }
            (month, _, Some(doy)) => {
                let date = NaiveDate::from_yo_opt(year, doy)
                    .ok_or_else(|| format!("年内天数 {} 超出 {} 年范围", doy, year))?;
                if month.is_some_and(|m| m != date.month()) {
                    return Err(format!("月份与年内天数 {} 不一致", doy));
                }
                date
            }
            _ => return Err("缺少月或日，无法确定日期".to_string()),
        };

        if let Some(weekday) = self.weekday {
            if date.weekday() != weekday {
                return Err(format!("星期 {:?} 与日期 {} 不一致", weekday, date));
            }
        }
        if let Some(quarter) = self.quarter {
            if (date.month() - 1) / 3 + 1 != quarter {
                return Err(format!("季度 {} 与日期 {} 不一致", quarter, date));
            }
        }
        if let (Some(hod), Some(hoa), Some(pm)) = (self.hour_of_day, self.hour_of_ampm, self.pm) {
            if hod % 24 != hoa + if pm { 12 } else { 0 } {
                return Err(format!("24 小时制 {} 与 12 小时制时间不一致", hod));
            }
        }

        // 24:00:00 视为次日零点
        if self.hour_of_day == Some(24) {
            let has_remainder = [self.minute, self.second, self.nano]
                .iter()
                .any(|v| v.is_some_and(|v| v != 0));
            if has_remainder {
                return Err("时取值 24 仅允许 24:00:00".to_string());
            }
            return date
                .succ_opt()
                .ok_or_else(|| format!("{} 的次日超出可表示范围", date));
        }

        Ok(date)
    }
}

fn find_prefix<'a>(names: &[&'a str], rest: &str) -> Option<(usize, &'a str)> {
    names
        .iter()
        .enumerate()
        .find(|(_, name)| rest.starts_with(**name))
        .map(|(idx, name)| (idx, *name))
}

fn last_day_of_month(year: i32, month: u32) -> Option<u32> {
    (28..=31)
        .rev()
        .find(|day| NaiveDate::from_ymd_opt(year, month, *day).is_some())
}

// ==========================================
// 偏移量 / 时区文本
// ==========================================

/// 校验偏移量或时区文本的形状，返回消耗的字节数（结果日期不受影响）
fn consume_offset(style: OffsetStyle, rest: &str) -> Result<usize, String> {
    match style {
        OffsetStyle::Iso {
            colon,
            minutes_required,
            seconds_allowed,
            zulu,
        } => {
            if zulu && rest.starts_with('Z') {
                return Ok(1);
            }
            iso_offset_len(rest.as_bytes(), colon, minutes_required, seconds_allowed)
        }
        OffsetStyle::Gmt { full } => gmt_offset_len(rest.as_bytes(), full),
        OffsetStyle::ZoneId => zone_id_len(rest),
        OffsetStyle::ZoneName { full } => zone_name_len(rest, full),
    }
}

fn two_digits(bytes: &[u8], pos: usize) -> Option<u32> {
    match bytes.get(pos..pos + 2)? {
        [a, b] if a.is_ascii_digit() && b.is_ascii_digit() => {
            Some(u32::from(a - b'0') * 10 + u32::from(b - b'0'))
        }
        _ => None,
    }
}

/// 读取可选的 [:]mm / [:]ss 段，返回 (值, 消耗字节数)
fn offset_part(bytes: &[u8], pos: usize, colon: bool) -> Option<(u32, usize)> {
    if colon {
        if bytes.get(pos) != Some(&b':') {
            return None;
        }
        two_digits(bytes, pos + 1).map(|v| (v, 3))
    } else {
        two_digits(bytes, pos).map(|v| (v, 2))
    }
}

fn check_offset_hours(hours: u32) -> Result<(), String> {
    if hours > MAX_OFFSET_HOURS {
        Err(format!("偏移小时 {} 超出范围 [0, {}]", hours, MAX_OFFSET_HOURS))
    } else {
        Ok(())
    }
}

fn check_sixty(value: u32, what: &str) -> Result<(), String> {
    if value > 59 {
        Err(format!("偏移{} {} 超出范围 [0, 59]", what, value))
    } else {
        Ok(())
    }
}

fn iso_offset_len(
    bytes: &[u8],
    colon: bool,
    minutes_required: bool,
    seconds_allowed: bool,
) -> Result<usize, String> {
    if !matches!(bytes.first(), Some(b'+' | b'-')) {
        return Err("应为时区偏移（如 +08:00）".to_string());
    }
    let hours = two_digits(bytes, 1).ok_or("偏移小时应为 2 位数字")?;
    check_offset_hours(hours)?;
    let mut pos = 3;

    match offset_part(bytes, pos, colon) {
        Some((minutes, len)) => {
            check_sixty(minutes, "分钟")?;
            pos += len;
            if seconds_allowed {
                if let Some((seconds, len)) = offset_part(bytes, pos, colon) {
                    check_sixty(seconds, "秒")?;
                    pos += len;
                }
            }
        }
        None if minutes_required => return Err("偏移缺少分钟".to_string()),
        None => {}
    }

    Ok(pos)
}

fn gmt_offset_len(bytes: &[u8], full: bool) -> Result<usize, String> {
    if !bytes.starts_with(b"GMT") {
        return Err("应为 GMT 偏移（如 GMT+8）".to_string());
    }
    let mut pos = 3;
    if !matches!(bytes.get(pos), Some(b'+' | b'-')) {
        return Ok(pos);
    }
    pos += 1;

    let hours = if full {
        two_digits(bytes, pos).ok_or("GMT 偏移小时应为 2 位数字")?
    } else {
        match two_digits(bytes, pos) {
            Some(h) => h,
            None => match bytes.get(pos) {
                Some(d) if d.is_ascii_digit() => u32::from(d - b'0'),
                _ => return Err("GMT 偏移缺少小时".to_string()),
            },
        }
    };
    check_offset_hours(hours)?;
    pos += if hours >= 10 || full || two_digits(bytes, pos).is_some() { 2 } else { 1 };

    match offset_part(bytes, pos, true) {
        Some((minutes, len)) => {
            check_sixty(minutes, "分钟")?;
            pos += len;
            if let Some((seconds, len)) = offset_part(bytes, pos, true) {
                check_sixty(seconds, "秒")?;
                pos += len;
            }
        }
        None if full => return Err("GMT 偏移缺少分钟".to_string()),
        None => {}
    }

    Ok(pos)
}

fn zone_id_len(rest: &str) -> Result<usize, String> {
    let bytes = rest.as_bytes();
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        return iso_offset_len(bytes, bytes.get(3) == Some(&b':'), false, true);
    }
    if !bytes.first().is_some_and(u8::is_ascii_alphabetic) {
        return Err("应为时区 ID（如 Asia/Shanghai）".to_string());
    }

    let len = bytes
        .iter()
        .take_while(|&&b| {
            b.is_ascii_alphanumeric() || matches!(b, b'/' | b'_' | b'.' | b'~' | b'+' | b'-')
        })
        .count();
    if len == 1 && bytes[0] != b'Z' {
        return Err("时区 ID 至少 2 个字符".to_string());
    }
    Ok(len)
}

fn zone_name_len(rest: &str, full: bool) -> Result<usize, String> {
    let word_len = |s: &str| s.bytes().take_while(u8::is_ascii_alphabetic).count();

    let mut len = word_len(rest);
    if len == 0 {
        return Err("应为时区名称".to_string());
    }
    if full {
        // 多词名称: "China Standard Time"
        while rest[len..].starts_with(' ')
            && rest[len + 1..].starts_with(|c: char| c.is_ascii_uppercase())
        {
            len += 1 + word_len(&rest[len + 1..]);
        }
    }
    Ok(len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::error::ParseErrorKind;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn parse(pattern: &str, input: &str) -> Result<NaiveDate, ParseError> {
        DatePattern::compile(pattern).unwrap().parse_date(input)
    }

    #[test]
    fn test_default_pattern() {
        assert_eq!(
            parse("yyyy-MM-dd HH:mm:ss", "2023-05-17 08:30:00").unwrap(),
            ymd(2023, 5, 17)
        );
    }

    #[test]
    fn test_slash_pattern_rejects_dash() {
        assert_eq!(parse("yyyy/MM/dd", "2023/05/17").unwrap(), ymd(2023, 5, 17));

        let err = parse("yyyy/MM/dd", "2023-05-17").unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::FormatMismatch);
    }

    #[test]
    fn test_fixed_width_fields() {
        assert!(parse("yyyy-MM-dd", "2023-5-17").is_err());
        assert!(parse("yyyy-MM-dd", "2023-05-7").is_err());

        assert_eq!(parse("yyyy-M-d", "2023-5-7").unwrap(), ymd(2023, 5, 7));
        assert_eq!(parse("yyyy-M-d", "2023-12-25").unwrap(), ymd(2023, 12, 25));
    }

    #[test]
    fn test_trailing_and_missing_characters() {
        let pattern = DatePattern::compile("yyyy-MM-dd HH:mm:ss").unwrap();
        assert!(pattern.parse_date("2023-05-17 08:30:00x").is_err());
        assert!(pattern.parse_date("2023-05-17 08:30").is_err());
        assert!(pattern.parse_date("2023-05-17").is_err());
    }

    #[test]
    fn test_out_of_range_components() {
        let pattern = DatePattern::compile("yyyy-MM-dd HH:mm:ss").unwrap();
        assert!(pattern.parse_date("2023-13-01 00:00:00").is_err());
        assert!(pattern.parse_date("2023-05-32 00:00:00").is_err());
        assert!(pattern.parse_date("2023-05-00 00:00:00").is_err());
        assert!(pattern.parse_date("2023-05-17 25:00:00").is_err());
        assert!(pattern.parse_date("2023-05-17 08:60:00").is_err());
        assert!(pattern.parse_date("2023-05-17 08:30:60").is_err());

        // 闰年 2 月 29 日
        assert_eq!(
            pattern.parse_date("2024-02-29 00:00:00").unwrap(),
            ymd(2024, 2, 29)
        );
    }

    #[test]
    fn test_day_clamped_to_month_end() {
        let pattern = DatePattern::compile("yyyy-MM-dd HH:mm:ss").unwrap();
        assert_eq!(
            pattern.parse_date("2023-02-30 00:00:00").unwrap(),
            ymd(2023, 2, 28)
        );
        assert_eq!(
            pattern.parse_date("2024-02-31 00:00:00").unwrap(),
            ymd(2024, 2, 29)
        );
        assert_eq!(
            pattern.parse_date("2023-04-31 12:00:00").unwrap(),
            ymd(2023, 4, 30)
        );
    }

    #[test]
    fn test_end_of_day_rolls_over() {
        let pattern = DatePattern::compile("yyyy-MM-dd HH:mm:ss").unwrap();
        assert_eq!(
            pattern.parse_date("2023-05-17 24:00:00").unwrap(),
            ymd(2023, 5, 18)
        );
        assert_eq!(
            pattern.parse_date("2023-12-31 24:00:00").unwrap(),
            ymd(2024, 1, 1)
        );
        assert!(pattern.parse_date("2023-05-17 24:00:01").is_err());
        assert!(pattern.parse_date("2023-05-17 24:30:00").is_err());
    }

    #[test]
    fn test_year_of_era_and_proleptic_year() {
        assert!(parse("yyyy-MM-dd", "0000-05-17").is_err());
        assert_eq!(parse("uuuu-MM-dd", "0000-05-17").unwrap(), ymd(0, 5, 17));

        assert_eq!(parse("yyyy-MM-dd G", "0001-05-17 BC").unwrap(), ymd(0, 5, 17));
        assert_eq!(parse("GGGG yyyy-MM-dd", "Anno Domini 2023-05-17").unwrap(), ymd(2023, 5, 17));
        assert_eq!(parse("yyyy-MM-dd GGGGG", "2023-05-17 A").unwrap(), ymd(2023, 5, 17));
        assert!(parse("uuuu-MM-dd G", "2023-05-17 BC").is_err());
    }

    #[test]
    fn test_adjacent_numeric_fields() {
        assert_eq!(
            parse("yyyyMMdd'T'HHmm", "20230517T0830").unwrap(),
            ymd(2023, 5, 17)
        );
    }

    #[test]
    fn test_two_digit_year() {
        assert_eq!(parse("yy.MM.dd", "23.05.17").unwrap(), ymd(2023, 5, 17));
    }

    #[test]
    fn test_month_and_weekday_names() {
        assert_eq!(
            parse("EEE, dd MMM yyyy", "Wed, 17 May 2023").unwrap(),
            ymd(2023, 5, 17)
        );
        // 星期与日期不一致
        assert!(parse("EEE, dd MMM yyyy", "Mon, 17 May 2023").is_err());

        assert_eq!(parse("MMMM d, yyyy", "September 3, 2021").unwrap(), ymd(2021, 9, 3));
    }

    #[test]
    fn test_localized_weekday() {
        assert_eq!(parse("yyyy-MM-dd e", "2023-05-17 4").unwrap(), ymd(2023, 5, 17));
        assert_eq!(parse("yyyy-MM-dd c", "2023-05-17 4").unwrap(), ymd(2023, 5, 17));
        assert!(parse("yyyy-MM-dd e", "2023-05-17 8").is_err());
        assert_eq!(parse("eeee yyyy-MM-dd", "Wednesday 2023-05-17").unwrap(), ymd(2023, 5, 17));
        assert!(parse("ccc yyyy-MM-dd", "Thu 2023-05-17").is_err());
    }

    #[test]
    fn test_quarter() {
        assert_eq!(parse("yyyy-MM-dd Q", "2023-05-17 2").unwrap(), ymd(2023, 5, 17));
        assert_eq!(parse("QQQ yyyy-MM-dd", "Q2 2023-05-17").unwrap(), ymd(2023, 5, 17));
        assert_eq!(
            parse("qqqq yyyy-MM-dd", "2nd quarter 2023-05-17").unwrap(),
            ymd(2023, 5, 17)
        );
        assert!(parse("yyyy-MM-dd Q", "2023-05-17 3").is_err());
        assert!(parse("yyyy-MM-dd Q", "2023-05-17 5").is_err());
    }

    #[test]
    fn test_week_fields_are_checked_then_dropped() {
        assert_eq!(
            parse("YYYY-'W'ww yyyy-MM-dd", "2023-W20 2023-05-17").unwrap(),
            ymd(2023, 5, 17)
        );
        assert_eq!(parse("yyyy-MM-dd W", "2023-05-17 3").unwrap(), ymd(2023, 5, 17));
        assert!(parse("yyyy-MM-dd w", "2023-05-17 54").is_err());
        assert!(parse("yyyy-MM-dd W", "2023-05-17 7").is_err());
    }

    #[test]
    fn test_twelve_hour_clock_and_fraction() {
        let pattern = DatePattern::compile("yyyy-MM-dd hh:mm:ss.SSS a").unwrap();
        assert_eq!(
            pattern.parse_date("2023-05-17 11:59:59.123 PM").unwrap(),
            ymd(2023, 5, 17)
        );
        assert!(pattern.parse_date("2023-05-17 13:00:00.000 PM").is_err());
        assert!(pattern.parse_date("2023-05-17 11:59:59.12 PM").is_err());
    }

    #[test]
    fn test_nano_and_milli_of_day() {
        assert_eq!(
            parse("yyyy-MM-dd HH:mm:ss.n", "2023-05-17 08:30:00.123456789").unwrap(),
            ymd(2023, 5, 17)
        );
        assert_eq!(parse("yyyy-MM-dd A", "2023-05-17 30600000").unwrap(), ymd(2023, 5, 17));
        assert_eq!(
            parse("yyyy-MM-dd N", "2023-05-17 30600000000000").unwrap(),
            ymd(2023, 5, 17)
        );
        assert!(parse("yyyy-MM-dd A", "2023-05-17 86400000").is_err());
        // S 与 n 取值不一致
        assert!(parse("yyyy-MM-dd ss.SSS n", "2023-05-17 00.123 5").is_err());
    }

    #[test]
    fn test_iso_offsets() {
        let xxx = "yyyy-MM-dd'T'HH:mm:ssXXX";
        assert_eq!(parse(xxx, "2023-05-17T08:30:00+08:00").unwrap(), ymd(2023, 5, 17));
        assert_eq!(parse(xxx, "2023-05-17T08:30:00Z").unwrap(), ymd(2023, 5, 17));
        assert!(parse(xxx, "2023-05-17T08:30:00+0800").is_err());
        assert!(parse(xxx, "2023-05-17T08:30:00+19:00").is_err());

        assert_eq!(parse("yyyy-MM-dd X", "2023-05-17 +08").unwrap(), ymd(2023, 5, 17));
        assert_eq!(parse("yyyy-MM-dd X", "2023-05-17 -0530").unwrap(), ymd(2023, 5, 17));
        assert_eq!(parse("yyyy-MM-dd xx", "2023-05-17 +0000").unwrap(), ymd(2023, 5, 17));
        assert!(parse("yyyy-MM-dd xx", "2023-05-17 Z").is_err());
        assert_eq!(
            parse("yyyy-MM-dd XXXXX", "2023-05-17 +05:30:15").unwrap(),
            ymd(2023, 5, 17)
        );

        let z = "yyyy-MM-dd HH:mm:ss Z";
        assert_eq!(parse(z, "2023-05-17 08:30:00 +0800").unwrap(), ymd(2023, 5, 17));
        assert!(parse(z, "2023-05-17 08:30:00 +08:00").is_err());
        assert!(parse(z, "2023-05-17 08:30:00 +0860").is_err());
    }

    #[test]
    fn test_gmt_offsets() {
        assert_eq!(parse("yyyy-MM-dd O", "2023-05-17 GMT+8").unwrap(), ymd(2023, 5, 17));
        assert_eq!(parse("yyyy-MM-dd O", "2023-05-17 GMT-5:30").unwrap(), ymd(2023, 5, 17));
        assert_eq!(parse("yyyy-MM-dd O", "2023-05-17 GMT").unwrap(), ymd(2023, 5, 17));
        assert_eq!(
            parse("yyyy-MM-dd OOOO", "2023-05-17 GMT+08:00").unwrap(),
            ymd(2023, 5, 17)
        );
        assert_eq!(
            parse("yyyy-MM-dd ZZZZ", "2023-05-17 GMT+08:00").unwrap(),
            ymd(2023, 5, 17)
        );
        assert!(parse("yyyy-MM-dd OOOO", "2023-05-17 GMT+8").is_err());
        assert!(parse("yyyy-MM-dd O", "2023-05-17 UTC+8").is_err());
    }

    #[test]
    fn test_zone_ids_and_names() {
        let vv = "yyyy-MM-dd HH:mm VV";
        assert_eq!(parse(vv, "2023-05-17 08:30 Asia/Shanghai").unwrap(), ymd(2023, 5, 17));
        assert_eq!(parse(vv, "2023-05-17 08:30 Z").unwrap(), ymd(2023, 5, 17));
        assert_eq!(parse(vv, "2023-05-17 08:30 +08:00").unwrap(), ymd(2023, 5, 17));
        assert!(parse(vv, "2023-05-17 08:30 ?").is_err());

        assert_eq!(parse("yyyy-MM-dd z", "2023-05-17 CST").unwrap(), ymd(2023, 5, 17));
        assert_eq!(
            parse("yyyy-MM-dd zzzz", "2023-05-17 China Standard Time").unwrap(),
            ymd(2023, 5, 17)
        );
        assert!(parse("yyyy-MM-dd z", "2023-05-17 +08").is_err());
    }

    #[test]
    fn test_day_of_year() {
        assert_eq!(parse("yyyy-DDD", "2023-137").unwrap(), ymd(2023, 5, 17));
        assert!(parse("yyyy-DDD", "2023-366").is_err());
        assert_eq!(parse("yyyy-DDD", "2024-366").unwrap(), ymd(2024, 12, 31));
    }

    #[test]
    fn test_quoted_literals() {
        assert_eq!(
            parse("'Date:' yyyy-MM-dd 'o''clock'", "Date: 2023-05-17 o'clock").unwrap(),
            ymd(2023, 5, 17)
        );
        assert_eq!(parse("yyyy''MM''dd", "2023'05'17").unwrap(), ymd(2023, 5, 17));
    }

    #[test]
    fn test_missing_date_fields() {
        assert!(parse("MM-dd", "05-17").is_err());
        assert!(parse("yyyy-MM", "2023-05").is_err());
    }

    #[test]
    fn test_invalid_patterns() {
        for bad in [
            "",
            "yyyy-MM-dd B",
            "yyyy-MMMMM",
            "ddd",
            "'unterminated",
            "yyyy[-MM]",
            "yyyy-MM-dd V",
            "yyyy-MM-dd OO",
            "yyyy-MM-dd XXXXXX",
            "yyyy-MM-dd cc",
        ] {
            let err = DatePattern::compile(bad).unwrap_err();
            assert_eq!(err.kind(), ParseErrorKind::InvalidPattern, "{}", bad);
        }
    }

    #[test]
    fn test_non_ascii_literals() {
        let pattern = DatePattern::compile("yyyy年MM月dd日").unwrap();
        assert_eq!(pattern.parse_date("2023年05月17日").unwrap(), ymd(2023, 5, 17));
        assert!(pattern.parse_date("2023年05月17").is_err());
    }
}
