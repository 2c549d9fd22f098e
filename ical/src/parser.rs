// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use chumsky::error::Rich;
use chumsky::extra;
use chumsky::prelude::*;

use crate::value::{
    ValueDate, ValueDateList, ValueDateTime, ValueDuration, ValuePeriod, ValueRecurrenceRule,
    ValueUtcOffset, value_date, value_date_list, value_date_time, value_duration, value_period,
    value_rrule, value_utc_offset,
};

/// Error returned when a value does not match its RFC 5545 grammar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} value {input:?}: {}", .reasons.join("; "))]
pub struct ParseError {
    /// Name of the value type that was expected
    pub kind: &'static str,
    /// The rejected input
    pub input: String,
    /// One message per parser error, with its byte range
    pub reasons: Vec<String>,
}

type Extra<'src> = extra::Err<Rich<'src, char>>;

fn run<'src, T>(
    kind: &'static str,
    src: &'src str,
    parser: impl Parser<'src, &'src str, T, Extra<'src>>,
) -> Result<T, ParseError> {
    parser.parse(src).into_result().map_err(|errs| ParseError {
        kind,
        input: src.to_owned(),
        reasons: errs
            .into_iter()
            .map(|e| format!("{} at {}..{}", e.reason(), e.span().start, e.span().end))
            .collect(),
    })
}

/// Parse a recurrence rule value such as `FREQ=WEEKLY;BYDAY=MO,WE,FR`.
///
/// ## Errors
///
/// Returns a [`ParseError`] if the text is not a valid RECUR value, including
/// duplicated parts, a missing FREQ, or COUNT together with UNTIL.
///
/// ## Examples
///
/// ```
/// # use recurcal_ical::{RecurrenceFrequency, parse_rrule};
/// let rule = parse_rrule("FREQ=DAILY;COUNT=10").unwrap();
/// assert_eq!(rule.freq, RecurrenceFrequency::Daily);
/// assert_eq!(rule.count, Some(10));
/// assert_eq!(rule.to_string(), "FREQ=DAILY;COUNT=10");
/// ```
pub fn parse_rrule(src: &str) -> Result<ValueRecurrenceRule, ParseError> {
    run("RECUR", src, value_rrule())
}

/// Parse a DATE value such as `19970714`.
///
/// ## Errors
///
/// Returns a [`ParseError`] if the text is not a valid calendar date.
pub fn parse_date(src: &str) -> Result<ValueDate, ParseError> {
    run("DATE", src, value_date())
}

/// Parse a DATE-TIME value such as `19970714T133000Z`.
///
/// ## Errors
///
/// Returns a [`ParseError`] if the text is not a valid date-time.
pub fn parse_date_time(src: &str) -> Result<ValueDateTime, ParseError> {
    run("DATE-TIME", src, value_date_time())
}

/// Parse a DURATION value such as `PT1H30M`.
///
/// ## Errors
///
/// Returns a [`ParseError`] if the text is not a valid duration.
pub fn parse_duration(src: &str) -> Result<ValueDuration, ParseError> {
    run("DURATION", src, value_duration())
}

/// Parse a PERIOD value such as `19970101T180000Z/PT5H30M`.
///
/// ## Errors
///
/// Returns a [`ParseError`] if the text is not a valid period.
pub fn parse_period(src: &str) -> Result<ValuePeriod, ParseError> {
    run("PERIOD", src, value_period())
}

/// Parse a UTC-OFFSET value such as `-0500`.
///
/// ## Errors
///
/// Returns a [`ParseError`] if the text is not a valid offset.
pub fn parse_utc_offset(src: &str) -> Result<ValueUtcOffset, ParseError> {
    run("UTC-OFFSET", src, value_utc_offset())
}

/// Parse the comma separated values of an RDATE or EXDATE property.
///
/// ## Errors
///
/// Returns a [`ParseError`] if the list is empty, mixes value types, or
/// contains an invalid value.
pub fn parse_date_list(src: &str) -> Result<ValueDateList, ParseError> {
    run("RDATE/EXDATE", src, value_date_list())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_kind_and_input() {
        let err = parse_rrule("FREQ=DAILY;COUNT=2;UNTIL=20200101").unwrap_err();
        assert_eq!(err.kind, "RECUR");
        assert_eq!(err.input, "FREQ=DAILY;COUNT=2;UNTIL=20200101");
        assert!(!err.reasons.is_empty());
        assert!(err.to_string().starts_with("invalid RECUR value"));
    }

    #[test]
    fn parses_each_value_type() {
        assert!(parse_date("20200229").is_ok());
        assert!(parse_date("20210229").is_err());
        assert!(parse_date_time("20200229T120000Z").is_ok());
        assert!(parse_duration("-PT15M").is_ok());
        assert!(parse_period("20200101T090000/PT1H").is_ok());
        assert_eq!(parse_utc_offset("+0530").unwrap().seconds(), 19_800);
        assert_eq!(parse_date_list("20200101,20200102").unwrap().len(), 2);
    }
}
