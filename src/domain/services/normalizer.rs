// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 各站点共用的文本规范化函数
//!
//! 全部为纯函数，时间相关的函数显式接收 `now`，便于测试

use chrono::{DateTime, Duration, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::models::job::{Experience, Salary, WorkType};

/// "상시" 等长期招聘标记对应的截止天数
pub const ALWAYS_OPEN_DAYS: i64 = 365;
/// 无法解析截止日期时的默认天数
pub const DEFAULT_DEADLINE_DAYS: i64 = 30;
/// "A년 이상" 推断的上限增量
pub const OPEN_ENDED_EXPERIENCE_SPAN: i64 = 10;
/// 单独 "A년" 推断的上限增量
pub const BARE_EXPERIENCE_SPAN: i64 = 3;

const ALWAYS_OPEN_MARKERS: &[&str] = &[
    "상시",
    "채용시",
    "수시",
    "always open",
    "open until filled",
    "rolling",
];
const ENTRY_LEVEL_MARKERS: &[&str] = &[
    "신입",
    "무관",
    "entry",
    "none",
    "no experience",
    "new grad",
];
const SALARY_UNDISCLOSED_MARKERS: &[&str] = &[
    "내규",
    "면접",
    "협의",
    "추후",
    "negotiable",
    "undisclosed",
];
const REMOTE_MARKERS: &[&str] = &["재택", "원격", "리모트", "remote", "wfh"];
const DISPATCH_MARKERS: &[&str] = &["파견", "도급", "dispatch"];

static D_DAY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)D\s*-\s*(\d{1,3})(?:\D|$)").unwrap());
static D_DAY_TODAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)D\s*-?\s*day|오늘\s*마감").unwrap());
static FULL_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{4})\s*[-./년]\s*(\d{1,2})\s*[-./월]\s*(\d{1,2})").unwrap()
});
static SHORT_YEAR_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\D)(\d{2})[./-](\d{1,2})[./-](\d{1,2})(?:\D|$)").unwrap());
static MONTH_DAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})\s*[/.월]\s*(\d{1,2})").unwrap());

static EXPERIENCE_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+)\s*(?:년|years?|yrs?)?\s*[~\-–]\s*(\d+)").unwrap()
});
static EXPERIENCE_PLUS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+)\s*(?:년|years?|yrs?)?\s*(?:이상|↑|\+)").unwrap()
});
static EXPERIENCE_BARE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s*(?:년|years?|yrs?)").unwrap());

static SALARY_AMOUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*(억|천만|백만|천|만|원)?").unwrap());
static SALARY_RANGE_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*[~∼〜\-–]\s*").unwrap());

static POSTED_DAYS_AGO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s*(?:일|days?)\s*(?:전|ago)").unwrap());
static POSTED_HOURS_AGO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s*(?:시간|hours?)\s*(?:전|ago)").unwrap());
static POSTED_MINUTES_AGO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s*(?:분|minutes?|mins?)\s*(?:전|ago)").unwrap());

/// 解析截止日期
///
/// 依次尝试：ISO 时间、长期招聘标记、D-N、完整日期、两位年份日期、月日；
/// 全部失败时返回 `now + 30天`
pub fn parse_deadline(text: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    let text = text.trim();
    if text.is_empty() {
        return now + Duration::days(DEFAULT_DEADLINE_DAYS);
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return parsed.with_timezone(&Utc);
    }

    let lower = text.to_lowercase();
    if ALWAYS_OPEN_MARKERS.iter().any(|m| lower.contains(m)) {
        return now + Duration::days(ALWAYS_OPEN_DAYS);
    }

    if let Some(days) = D_DAY
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<i64>().ok())
    {
        return now + Duration::days(days);
    }

    if D_DAY_TODAY.is_match(text) {
        return now;
    }
    if lower.contains("내일") {
        return now + Duration::days(1);
    }

    parse_calendar_date(text, now).unwrap_or_else(|| now + Duration::days(DEFAULT_DEADLINE_DAYS))
}

/// 解析日历日期（完整日期、两位年份、仅月日）
///
/// 仅有月日时使用 `now` 所在的年份；结果为当天 00:00 UTC
pub fn parse_calendar_date(text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    use chrono::Datelike;

    if let Some(c) = FULL_DATE.captures(text) {
        return ymd(c[1].parse().ok()?, c[2].parse().ok()?, c[3].parse().ok()?);
    }

    if let Some(c) = SHORT_YEAR_DATE.captures(text) {
        let year: i32 = c[1].parse().ok()?;
        return ymd(2000 + year, c[2].parse().ok()?, c[3].parse().ok()?);
    }

    if let Some(c) = MONTH_DAY.captures(text) {
        return ymd(now.year(), c[1].parse().ok()?, c[2].parse().ok()?);
    }

    None
}

fn ymd(year: i32, month: u32, day: u32) -> Option<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// 解析经验要求
///
/// - "신입"/"무관" -> {0,0}
/// - "A~B년" -> {A,B}
/// - "A년 이상" -> {A, A+10}
/// - "A년" -> {A, A+3}
/// - 其他 -> None
pub fn parse_experience(text: &str) -> Option<Experience> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Some(c) = EXPERIENCE_RANGE.captures(text) {
        let min: i64 = c[1].parse().ok()?;
        let max: i64 = c[2].parse().ok()?;
        return Some(Experience::new(min, max).normalized());
    }

    if let Some(c) = EXPERIENCE_PLUS.captures(text) {
        let min: i64 = c[1].parse().ok()?;
        return Some(Experience::new(min, min + OPEN_ENDED_EXPERIENCE_SPAN));
    }

    if let Some(c) = EXPERIENCE_BARE.captures(text) {
        let min: i64 = c[1].parse().ok()?;
        return Some(Experience::new(min, min + BARE_EXPERIENCE_SPAN));
    }

    let lower = text.to_lowercase();
    if ENTRY_LEVEL_MARKERS.iter().any(|m| lower.contains(m)) {
        return Some(Experience::entry_level());
    }

    None
}

/// 解析薪资文本，结果单位为万韩元
///
/// 支持 "3,000~4,000만원"、"연봉 3천만원 이상"、"월 300만원"（按 12 个月折算）、
/// "1억 2천만원" 等写法；只有带单位或位于区间两侧的数字才算金额。
/// "회사내규에 따름" 等未公开薪资返回 None
pub fn parse_salary(text: &str) -> Option<Salary> {
    let compact: String = text.chars().filter(|c| *c != ',').collect();
    let lower = compact.to_lowercase();
    if lower.trim().is_empty() || SALARY_UNDISCLOSED_MARKERS.iter().any(|m| lower.contains(m)) {
        return None;
    }
    if lower.contains("시급") || lower.contains("일급") {
        return None;
    }

    let monthly = lower.contains("월급") || (lower.contains('월') && !lower.contains('연'));

    let sides: Vec<Vec<SalaryToken<'_>>> = SALARY_RANGE_SEPARATOR
        .splitn(&compact, 2)
        .map(salary_tokens)
        .filter(|tokens| !tokens.is_empty())
        .collect();

    let factor = if monthly { 12.0 } else { 1.0 };
    let round = |v: f64| (v * factor).round() as i64;
    let salary = match sides.as_slice() {
        [single] => {
            let v = round(united_amount(single)?);
            Salary::new(v, v)
        }
        [low, high] => {
            let min = united_amount(low).or_else(|| bare_amount(low, high))?;
            let max = united_amount(high).or_else(|| bare_amount(high, low))?;
            Salary::new(round(min), round(max))
        }
        _ => return None,
    };

    Some(salary.normalized())
}

/// (数值, 单位)
type SalaryToken<'a> = (f64, Option<&'a str>);

fn salary_tokens(side: &str) -> Vec<SalaryToken<'_>> {
    SALARY_AMOUNT
        .captures_iter(side)
        .filter_map(|c| {
            let value: f64 = c.get(1)?.as_str().parse().ok()?;
            Some((value, c.get(2).map(|m| m.as_str())))
        })
        .collect()
}

/// 区间一侧的金额：带单位的数字相加（"1억 2천만원" -> 12000），不带单位的数字（如 "주5일"）不计入
fn united_amount(tokens: &[SalaryToken<'_>]) -> Option<f64> {
    let mut united = tokens
        .iter()
        .filter_map(|(value, unit)| unit.map(|u| to_ten_thousand_won(*value, Some(u))))
        .peekable();
    united.peek()?;
    Some(united.sum())
}

/// 区间一侧只有裸数字时，沿用另一侧的单位（"3~4천만원"、"4000~5000만원"）
fn bare_amount(tokens: &[SalaryToken<'_>], other: &[SalaryToken<'_>]) -> Option<f64> {
    let (value, _) = tokens.first()?;
    let unit = other.iter().find_map(|(_, unit)| *unit);
    Some(to_ten_thousand_won(*value, unit))
}

fn to_ten_thousand_won(value: f64, unit: Option<&str>) -> f64 {
    match unit {
        Some("억") => value * 10_000.0,
        Some("천만") | Some("천") => value * 1_000.0,
        Some("백만") => value * 100.0,
        Some("만") => value,
        Some("원") => value / 10_000.0,
        _ if value >= 100_000.0 => value / 10_000.0,
        _ => value,
    }
}

/// 根据雇佣形态文本判断工作方式，默认现场办公
pub fn detect_work_type(text: &str) -> WorkType {
    let lower = text.to_lowercase();
    if REMOTE_MARKERS.iter().any(|m| lower.contains(m)) {
        WorkType::Remote
    } else if DISPATCH_MARKERS.iter().any(|m| lower.contains(m)) {
        WorkType::Dispatch
    } else {
        WorkType::Onsite
    }
}

/// 解析发布时间（"3일 전"、"2시간 전"、"오늘"、日期等），失败时返回 `now`
pub fn parse_posted_at(text: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    let text = text.trim();
    if text.is_empty() {
        return now;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return parsed.with_timezone(&Utc);
    }

    let relative = [
        (&*POSTED_DAYS_AGO, Duration::days(1)),
        (&*POSTED_HOURS_AGO, Duration::hours(1)),
        (&*POSTED_MINUTES_AGO, Duration::minutes(1)),
    ];
    for (re, unit) in relative {
        if let Some(n) = re
            .captures(text)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<i32>().ok())
        {
            return now - unit * n;
        }
    }

    let lower = text.to_lowercase();
    if lower.contains("어제") || lower.contains("yesterday") {
        return now - Duration::days(1);
    }
    if lower.contains("오늘") || lower.contains("today") || lower.contains("방금") {
        return now;
    }

    parse_calendar_date(text, now).unwrap_or(now)
}

#[cfg(test)]
#[path = "normalizer_test.rs"]
mod tests;
