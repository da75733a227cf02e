use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::Serialize;

use crate::error::{BillError, Result};
use crate::models::{Bill, BillingInterval};

/// Builds a calendar date the way a day/month overflowing date setter does:
/// months past December carry into the year and days past the end of the
/// month carry into the following month(s).
fn rolled_date(year: i32, month0: i32, day: i64) -> Option<NaiveDate> {
    let year = year.checked_add(month0.div_euclid(12))?;
    let month = (month0.rem_euclid(12) + 1) as u32;
    NaiveDate::from_ymd_opt(year, month, 1)?.checked_add_signed(Duration::days(day - 1))
}

fn advance(current: NaiveDateTime, interval: BillingInterval) -> Option<NaiveDateTime> {
    let date = current.date();
    let (year, month0, day) = (date.year(), date.month0() as i32, date.day() as i64);
    let next = match interval {
        BillingInterval::Daily => rolled_date(year, month0, day + 1),
        BillingInterval::Weekly => rolled_date(year, month0, day + 7),
        // Jan 31 + 1 month lands on Mar 3 (Mar 2 in leap years), never clamped to Feb 28.
        BillingInterval::Monthly => rolled_date(year, month0 + 1, day),
        BillingInterval::Yearly => rolled_date(year.checked_add(1)?, month0, day),
        BillingInterval::Unique => None,
    }?;
    Some(next.and_time(current.time()))
}

/// Next occurrence of a recurring bill, preserving the time of day.
///
/// Returns `None` for one-time (`Unique`) bills and for dates outside the
/// representable calendar range.
pub fn calculate_next_billing_date(
    current: &DateTime<Utc>,
    interval: BillingInterval,
) -> Option<DateTime<Utc>> {
    advance(current.naive_utc(), interval).map(|next| Utc.from_utc_datetime(&next))
}

/// Accepts RFC 3339 timestamps, zone-less `YYYY-MM-DDTHH:MM:SS[.fff]` (read as UTC)
/// and plain `YYYY-MM-DD` dates (UTC midnight).
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(Utc.from_utc_datetime(&naive));
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&midnight));
        }
    }
    Err(BillError::InvalidTimestamp(value.to_string()))
}

/// `2024-01-31T09:30:00.000Z`
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// String-in, string-out variant used when advancing a persisted due date.
pub fn advance_billing_date(current_iso: &str, interval: BillingInterval) -> Result<String> {
    let current = parse_timestamp(current_iso)?;
    calculate_next_billing_date(&current, interval)
        .map(|next| format_timestamp(&next))
        .ok_or_else(|| {
            BillError::InvalidInput(format!(
                "cannot advance '{}' with interval '{}'",
                current_iso, interval
            ))
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BillStatus {
    Overdue,
    DueToday,
    Upcoming,
    Later,
}

/// Whole calendar days (UTC) from `now` to the bill's due date; negative when overdue.
pub fn days_until_due(bill: &Bill, now: &DateTime<Utc>) -> Result<i64> {
    let due = parse_timestamp(&bill.next_billing_date)?;
    Ok((due.date_naive() - now.date_naive()).num_days())
}

pub fn bill_status(bill: &Bill, now: &DateTime<Utc>, upcoming_window_days: i64) -> Result<BillStatus> {
    let days = days_until_due(bill, now)?;
    Ok(match days {
        d if d < 0 => BillStatus::Overdue,
        0 => BillStatus::DueToday,
        d if d <= upcoming_window_days => BillStatus::Upcoming,
        _ => BillStatus::Later,
    })
}
