// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt::{self, Display, Write};

use crate::keyword::{
    KW_RRULE_BYDAY, KW_RRULE_BYHOUR, KW_RRULE_BYMINUTE, KW_RRULE_BYMONTH, KW_RRULE_BYMONTHDAY,
    KW_RRULE_BYSECOND, KW_RRULE_BYSETPOS, KW_RRULE_BYWEEKNO, KW_RRULE_BYYEARDAY, KW_RRULE_COUNT,
    KW_RRULE_FREQ, KW_RRULE_INTERVAL, KW_RRULE_UNTIL, KW_RRULE_WKST,
};
use crate::value::{
    RecurrenceUntil, ValueDate, ValueDateList, ValueDateTime, ValueDuration, ValuePeriod,
    ValueRecurrenceRule, ValueTime, ValueUtcOffset,
};

/// Format a date value as `YYYYMMDD`.
///
/// # Errors
///
/// Returns an error if the writer fails.
pub fn write_date<W: Write>(f: &mut W, date: ValueDate) -> fmt::Result {
    let ValueDate { year, month, day } = date;
    write!(f, "{year:04}{month:02}{day:02}")
}

/// Format a date-time value as `YYYYMMDDTHHMMSS[Z]`.
///
/// # Errors
///
/// Returns an error if the writer fails.
pub fn write_date_time<W: Write>(f: &mut W, datetime: &ValueDateTime) -> fmt::Result {
    write_date(f, datetime.date)?;
    f.write_char('T')?;
    write_time(f, &datetime.time)
}

/// Format a time value as `HHMMSS[Z]`.
///
/// # Errors
///
/// Returns an error if the writer fails.
pub fn write_time<W: Write>(f: &mut W, time: &ValueTime) -> fmt::Result {
    let ValueTime {
        hour,
        minute,
        second,
        utc,
    } = *time;
    write!(f, "{hour:02}{minute:02}{second:02}")?;
    match utc {
        true => f.write_char('Z'),
        false => Ok(()),
    }
}

/// Format a UTC offset value as `+HHMM` or `-HHMM`, with seconds when present.
///
/// # Errors
///
/// Returns an error if the writer fails.
pub fn write_utc_offset<W: Write>(f: &mut W, offset: ValueUtcOffset) -> fmt::Result {
    f.write_char(sign(offset.positive))?;
    write!(f, "{:02}{:02}", offset.hour, offset.minute)?;
    offset
        .second
        .map_or(Ok(()), |second| write!(f, "{second:02}"))
}

/// Format a duration value (RFC 5545 Section 3.3.6).
///
/// Zero components are left out, except that an empty duration is written
/// as `PT0S` and a minute is kept between hours and seconds.
///
/// # Errors
///
/// Returns an error if the writer fails.
pub fn write_duration<W: Write>(f: &mut W, duration: &ValueDuration) -> fmt::Result {
    if !duration.positive {
        f.write_char('-')?;
    }
    f.write_char('P')?;
    if duration.is_weeks() {
        return write!(f, "{}W", duration.weeks);
    }

    let ValueDuration {
        days,
        hours,
        minutes,
        seconds,
        ..
    } = *duration;
    if days > 0 {
        write!(f, "{days}D")?;
    }

    let keep_minutes = minutes > 0 || (hours > 0 && seconds > 0);
    let parts = [
        (hours, 'H', hours > 0),
        (minutes, 'M', keep_minutes),
        (seconds, 'S', seconds > 0 || (days == 0 && hours == 0 && minutes == 0)),
    ];
    let mut time = parts.into_iter().filter(|(_, _, keep)| *keep).peekable();
    if time.peek().is_some() {
        f.write_char('T')?;
    }
    time.try_for_each(|(n, designator, _)| write!(f, "{n}{designator}"))
}

/// Format a period value as `start/end` or `start/duration`.
///
/// # Errors
///
/// Returns an error if the writer fails.
pub fn write_period<W: Write>(f: &mut W, period: &ValuePeriod) -> fmt::Result {
    write_date_time(f, period.start())?;
    f.write_char('/')?;
    match period {
        ValuePeriod::Explicit { end, .. } => write_date_time(f, end),
        ValuePeriod::Duration { duration, .. } => write_duration(f, duration),
    }
}

/// Format the values of an RDATE or EXDATE property, separated by commas.
///
/// # Errors
///
/// Returns an error if the writer fails.
pub fn write_date_list<W: Write>(f: &mut W, list: &ValueDateList) -> fmt::Result {
    match list {
        ValueDateList::Date(values) => comma_separated(f, values, |f, v| write_date(f, *v)),
        ValueDateList::DateTime(values) => comma_separated(f, values, write_date_time),
        ValueDateList::Period(values) => comma_separated(f, values, write_period),
    }
}

/// Format a recurrence rule value (RFC 5545 Section 3.3.10).
///
/// Parts are written in a fixed order, FREQ first.
///
/// # Errors
///
/// Returns an error if the writer fails.
pub fn write_recurrence_rule<W: Write>(f: &mut W, rule: &ValueRecurrenceRule) -> fmt::Result {
    write!(f, "{KW_RRULE_FREQ}={}", rule.freq)?;

    if let Some(until) = &rule.until {
        write!(f, ";{KW_RRULE_UNTIL}=")?;
        match until {
            RecurrenceUntil::Date(date) => write_date(f, *date)?,
            RecurrenceUntil::DateTime(datetime) => write_date_time(f, datetime)?,
        }
    }
    for (name, value) in [(KW_RRULE_COUNT, rule.count), (KW_RRULE_INTERVAL, rule.interval)] {
        if let Some(value) = value {
            write!(f, ";{name}={value}")?;
        }
    }

    list_part(f, KW_RRULE_BYSECOND, &rule.by_second)?;
    list_part(f, KW_RRULE_BYMINUTE, &rule.by_minute)?;
    list_part(f, KW_RRULE_BYHOUR, &rule.by_hour)?;
    list_part(f, KW_RRULE_BYDAY, &rule.by_day)?;
    list_part(f, KW_RRULE_BYMONTHDAY, &rule.by_month_day)?;
    list_part(f, KW_RRULE_BYYEARDAY, &rule.by_year_day)?;
    list_part(f, KW_RRULE_BYWEEKNO, &rule.by_week_no)?;
    list_part(f, KW_RRULE_BYMONTH, &rule.by_month)?;
    list_part(f, KW_RRULE_BYSETPOS, &rule.by_set_pos)?;

    match rule.wkst {
        Some(wkst) => write!(f, ";{KW_RRULE_WKST}={wkst}"),
        None => Ok(()),
    }
}

const fn sign(positive: bool) -> char {
    match positive {
        true => '+',
        false => '-',
    }
}

fn list_part<W: Write, T: Display>(f: &mut W, name: &str, values: &[T]) -> fmt::Result {
    if values.is_empty() {
        return Ok(());
    }
    write!(f, ";{name}=")?;
    comma_separated(f, values, |f, v| write!(f, "{v}"))
}

fn comma_separated<'a, W: Write, T>(
    f: &mut W,
    values: &'a [T],
    mut write_one: impl FnMut(&mut W, &'a T) -> fmt::Result,
) -> fmt::Result {
    let mut values = values.iter();
    if let Some(first) = values.next() {
        write_one(f, first)?;
    }
    values.try_for_each(|v| {
        f.write_char(',')?;
        write_one(f, v)
    })
}

macro_rules! display_via {
    ($($ty:ty => $write:expr),+ $(,)?) => {
        $(
            impl Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    $write(f, self)
                }
            }
        )+
    };
}

display_via! {
    ValueDate => |f: &mut fmt::Formatter<'_>, v: &ValueDate| write_date(f, *v),
    ValueDateTime => write_date_time,
    ValueTime => write_time,
    ValueUtcOffset => |f: &mut fmt::Formatter<'_>, v: &ValueUtcOffset| write_utc_offset(f, *v),
    ValueDuration => write_duration,
    ValuePeriod => write_period,
    ValueDateList => write_date_list,
    ValueRecurrenceRule => write_recurrence_rule,
}
