use anyhow::{anyhow, bail, Context, Result};
use chrono::{NaiveDateTime, NaiveTime, Timelike};

/// Hour of day as a decimal (`hour + minute / 60`); seconds are ignored.
pub fn decimal_hours(time: NaiveTime) -> f64 {
    time.hour() as f64 + time.minute() as f64 / 60.0
}

/// Half-open window check. A window whose end is before its start wraps past midnight.
pub fn is_time_between(time: f64, start: f64, end: f64) -> bool {
    if end < start {
        return time >= start || time < end;
    }
    time >= start && time < end
}

/// Parses "h:mm AM" / "h:mm PM" into decimal hours.
pub fn time_string_to_decimal(value: &str) -> Result<f64> {
    let mut parts = value.split_whitespace();
    let clock = parts
        .next()
        .ok_or_else(|| anyhow!("empty time string"))?;
    let period = parts
        .next()
        .ok_or_else(|| anyhow!("missing AM/PM in '{value}'"))?;

    let (hours, minutes) = clock
        .split_once(':')
        .ok_or_else(|| anyhow!("missing ':' in '{value}'"))?;
    let hours: u32 = hours
        .parse()
        .with_context(|| format!("invalid hour in '{value}'"))?;
    let minutes: u32 = minutes
        .parse()
        .with_context(|| format!("invalid minutes in '{value}'"))?;
    if hours == 0 || hours > 12 || minutes >= 60 {
        bail!("time out of range in '{value}'");
    }

    let mut decimal = (hours % 12) as f64;
    match period.to_ascii_uppercase().as_str() {
        "AM" => {}
        "PM" => decimal += 12.0,
        other => bail!("unknown period '{other}'"),
    }
    Ok(decimal + minutes as f64 / 60.0)
}

/// Formats decimal hours as a 12-hour clock string, e.g. `19.5` -> "7:30 PM".
pub fn format_decimal_time(value: f64) -> String {
    let mut hours = value.floor() as u32;
    let mut minutes = ((value - value.floor()) * 60.0).round() as u32;
    if minutes == 60 {
        hours += 1;
        minutes = 0;
    }
    twelve_hour(hours % 24, minutes)
}

pub fn format_clock_time(moment: NaiveDateTime) -> String {
    twelve_hour(moment.hour(), moment.minute())
}

/// Remaining time until `next` as "m:ss", never negative.
pub fn format_countdown(now: NaiveDateTime, next: NaiveDateTime) -> String {
    let remaining = (next - now).num_seconds().max(0);
    format!("{}:{:02}", remaining / 60, remaining % 60)
}

fn twelve_hour(hours: u32, minutes: u32) -> String {
    let period = if hours >= 12 { "PM" } else { "AM" };
    let display = match hours % 12 {
        0 => 12,
        h => h,
    };
    format!("{display}:{minutes:02} {period}")
}
