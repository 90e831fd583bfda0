//! 时间工具函数 — 业务时区与营业日
//!
//! 营业日推导统一走本模块的纯函数：所有写路径共用同一个
//! 日历日边界（业务时区），杜绝各调用点各算各的日期。

use chrono::{Datelike, Duration, NaiveDate};
use chrono_tz::Tz;

use super::{AppError, AppResult};

/// 解析日期字符串 (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// 日期 → YYYY-MM-DD
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// 当前日期 (业务时区)
pub fn today(tz: Tz) -> NaiveDate {
    chrono::Utc::now().with_timezone(&tz).date_naive()
}

/// 当前营业日 (业务时区日历日)
pub fn current_business_day(tz: Tz) -> String {
    format_date(today(tz))
}

/// Business day bucket for a monetary/sale event.
///
/// The slot's local trip date when the presale has date context, the
/// current date in the business timezone otherwise. Every writer goes
/// through here — this is the single place the day boundary is decided.
pub fn business_day_for(trip_date: Option<&str>, tz: Tz) -> AppResult<String> {
    match trip_date {
        Some(date) => Ok(format_date(parse_date(date)?)),
        None => Ok(current_business_day(tz)),
    }
}

/// 验证日期不在未来 (业务时区)
pub fn validate_not_future(date: NaiveDate, tz: Tz) -> AppResult<()> {
    let today = today(tz);
    if date > today {
        return Err(AppError::validation(format!(
            "Date {} is in the future (today is {})",
            date, today
        )));
    }
    Ok(())
}

/// Inclusive business-day range for an owner summary preset.
pub fn preset_range(preset: &str, tz: Tz) -> AppResult<(String, String)> {
    let today = today(tz);
    let (from, to) = match preset {
        "today" => (today, today),
        "yesterday" => {
            let d = today - Duration::days(1);
            (d, d)
        }
        "last7" => (today - Duration::days(6), today),
        "month" => (
            today.with_day(1).unwrap_or(today),
            today,
        ),
        other => {
            return Err(AppError::validation(format!(
                "Unknown preset: {other} (expected today|yesterday|last7|month)"
            )));
        }
    };
    Ok((format_date(from), format_date(to)))
}
