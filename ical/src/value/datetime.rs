// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Date, time and UTC offset values as defined in RFC 5545 Section 3.3.

use chumsky::Parser;
use chumsky::extra::ParserExtra;
use chumsky::label::LabelError;
use chumsky::prelude::*;

use crate::value::miscellaneous::{ValueExpected, days_in_month, number};

/// Date value in the iCalendar format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ValueDate {
    /// Year component.
    pub year: i16,

    /// Month component, 1-12.
    pub month: i8,

    /// Day component, 1-31.
    pub day: i8,
}

impl ValueDate {
    /// Whether the components form a real calendar date.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.year >= 0 && self.day >= 1 && self.day <= days_in_month(self.year, self.month)
    }

    /// Convert to `jiff::civil::Date`.
    ///
    /// # Errors
    ///
    /// Returns an error if the components do not form a valid date.
    #[cfg(feature = "jiff")]
    pub fn civil_date(self) -> Result<jiff::civil::Date, jiff::Error> {
        jiff::civil::Date::new(self.year, self.month, self.day)
    }
}

#[cfg(feature = "jiff")]
impl From<jiff::civil::Date> for ValueDate {
    fn from(value: jiff::civil::Date) -> Self {
        let (year, month, day) = (value.year(), value.month(), value.day());
        Self { year, month, day }
    }
}

/// ```txt
/// date-value         = date-fullyear date-month date-mday
/// date-fullyear      = 4DIGIT
/// date-month         = 2DIGIT        ;01-12
/// date-mday          = 2DIGIT        ;01-28, 01-29, 01-30, 01-31
///                                    ;based on month/year
/// ```
pub fn value_date<'src, I, E>() -> impl Parser<'src, I, ValueDate, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    number(4..=4, 0..=9999)
        .then(number(2..=2, 1..=12))
        .then(number(2..=2, 1..=31))
        .try_map(|((year, month), day), span| {
            let date = ValueDate { year, month, day };
            match date.is_valid() {
                true => Ok(date),
                false => Err(E::Error::expected_found([ValueExpected::Date], None, span)),
            }
        })
}

/// Date-Time value defined in the RFC 5545 Section 3.3.5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueDateTime {
    /// Date component.
    pub date: ValueDate,

    /// Time component.
    pub time: ValueTime,
}

impl ValueDateTime {
    /// Create a new date-time from its parts.
    #[must_use]
    pub const fn new(date: ValueDate, time: ValueTime) -> Self {
        Self { date, time }
    }

    /// Convert to `jiff::civil::DateTime`, ignoring the UTC marker.
    ///
    /// A leap second is contracted to second 59.
    ///
    /// # Errors
    ///
    /// Returns an error if the components do not form a valid date-time.
    #[cfg(feature = "jiff")]
    pub fn civil_date_time(&self) -> Result<jiff::civil::DateTime, jiff::Error> {
        let ValueTime {
            hour,
            minute,
            second,
            ..
        } = self.time;
        let time = jiff::civil::Time::new(
            i8::try_from(hour).unwrap_or(i8::MAX),
            i8::try_from(minute).unwrap_or(i8::MAX),
            i8::try_from(second.min(59)).unwrap_or(i8::MAX),
            0,
        )?;
        Ok(self.date.civil_date()?.to_datetime(time))
    }
}

#[cfg(feature = "jiff")]
impl From<jiff::civil::DateTime> for ValueDateTime {
    fn from(value: jiff::civil::DateTime) -> Self {
        // civil clock fields are never negative
        let field = |v: i8| u8::try_from(v).unwrap_or_default();
        let time = ValueTime::new(
            field(value.hour()),
            field(value.minute()),
            field(value.second()),
            false,
        );
        Self::new(value.date().into(), time)
    }
}

/// ```txt
/// date-time  = date "T" time ;As specified in the DATE and TIME
/// ```
pub fn value_date_time<'src, I, E>() -> impl Parser<'src, I, ValueDateTime, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    value_date()
        .then_ignore(just('T'))
        .then(value_time())
        .map(|(date, time)| ValueDateTime::new(date, time))
}

/// Time value defined in the RFC 5545 Section 3.3.12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueTime {
    /// Hour component, 0-23.
    pub hour: u8,

    /// Minute component, 0-59.
    pub minute: u8,

    /// Second component, 0-60 (60 for leap second).
    pub second: u8,

    /// Whether the time is in UTC (indicated by a trailing 'Z').
    pub utc: bool,
}

impl ValueTime {
    /// Create a new `ValueTime` from components.
    #[must_use]
    pub const fn new(hour: u8, minute: u8, second: u8, utc: bool) -> Self {
        Self {
            hour,
            minute,
            second,
            utc,
        }
    }
}

/// ```txt
/// time         = time-hour time-minute time-second [time-utc]
/// time-utc     = "Z"
/// ```
fn value_time<'src, I, E>() -> impl Parser<'src, I, ValueTime, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    clock()
        .then(time_second())
        .then(just('Z').or_not().map(|z| z.is_some()))
        .map(|(((hour, minute), second), utc)| ValueTime::new(hour, minute, second, utc))
}

/// UTC Offset Value defined in RFC 5545 Section 3.3.14
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueUtcOffset {
    /// Whether the offset is positive
    pub positive: bool,

    /// Hour, 0-23
    pub hour: u8,

    /// Minute, 0-59
    pub minute: u8,

    /// Second, 0-60, optional
    pub second: Option<u8>,
}

impl ValueUtcOffset {
    /// Signed offset from UTC in seconds.
    #[must_use]
    pub fn seconds(self) -> i32 {
        let magnitude = [
            (self.hour, 3600),
            (self.minute, 60),
            (self.second.unwrap_or(0), 1),
        ]
        .into_iter()
        .map(|(n, unit)| i32::from(n) * unit)
        .sum::<i32>();
        match self.positive {
            true => magnitude,
            false => -magnitude,
        }
    }
}

/// ```txt
/// utc-offset   = time-numzone
/// time-numzone = ("+" / "-") time-hour time-minute [time-second]
/// ```
pub fn value_utc_offset<'src, I, E>() -> impl Parser<'src, I, ValueUtcOffset, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    let sign = choice((just('+').to(true), just('-').to(false)));
    sign.then(clock())
        .then(time_second().or_not())
        .map(|((positive, (hour, minute)), second)| ValueUtcOffset {
            positive,
            hour,
            minute,
            second,
        })
}

/// `time-hour time-minute`, two digits each.
fn clock<'src, I, E>() -> impl Parser<'src, I, (u8, u8), E> + Clone
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    number(2..=2, 0..=23).then(number(2..=2, 0..=59))
}

/// Two digits, 60 being a positive leap second.
fn time_second<'src, I, E>() -> impl Parser<'src, I, u8, E> + Clone
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    number(2..=2, 0..=60)
}

#[cfg(test)]
mod tests {
    use chumsky::input::Stream;

    use super::*;

    fn run<'a, T>(
        parser: impl Parser<'a, Stream<std::str::Chars<'a>>, T, extra::Err<Rich<'a, char>>>,
        src: &'a str,
    ) -> Result<T, Vec<Rich<'a, char>>> {
        parser
            .then_ignore(end())
            .parse(Stream::from_iter(src.chars()))
            .into_result()
    }

    #[test]
    fn parses_date() {
        let date = |year, month, day| ValueDate { year, month, day };
        for (src, expected) in [
            ("19970714", date(1997, 7, 14)),
            ("20000229", date(2000, 2, 29)),
            ("00010101", date(1, 1, 1)),
        ] {
            assert_eq!(run(value_date(), src).unwrap(), expected, "{src}");
        }

        for src in [
            "20241301",  // month 13
            "20240001",  // month 0
            "20240100",  // day 0
            "19970230",  // no such day
            "21000229",  // 2100 is no leap year
            "1997-07-14",
            "2024011",
            "202401011",
        ] {
            assert!(run(value_date(), src).is_err(), "Parse {src} should fail");
        }
    }

    #[test]
    fn parses_date_time() {
        let dt = run(value_date_time(), "19970630T235960Z").unwrap();
        assert_eq!(dt.date, ValueDate { year: 1997, month: 6, day: 30 });
        assert_eq!(dt.time, ValueTime::new(23, 59, 60, true));

        let dt = run(value_date_time(), "20240101T000000").unwrap();
        assert!(!dt.time.utc);

        for src in [
            "19970714t133000", // lower-case designator
            "19970714T2400000",
            "19970714T240000",
            "19970714T135900X",
            "19970714T1330",
        ] {
            assert!(run(value_date_time(), src).is_err(), "Parse {src} should fail");
        }
    }

    #[cfg(feature = "jiff")]
    #[test]
    fn converts_to_civil() {
        let dt = run(value_date_time(), "19970630T235960Z").unwrap();
        assert_eq!(
            dt.civil_date_time().unwrap(),
            jiff::civil::date(1997, 6, 30).at(23, 59, 59, 0)
        );

        let civil = jiff::civil::date(2024, 2, 29).at(8, 5, 0, 0);
        let back = ValueDateTime::from(civil);
        assert!(!back.time.utc);
        assert_eq!(back.civil_date_time().unwrap(), civil);
    }

    #[test]
    fn parses_utc_offset() {
        for (src, seconds) in [
            ("-0500", -18_000),
            ("+0100", 3_600),
            ("+0000", 0),
            ("-123456", -45_296),
        ] {
            assert_eq!(run(value_utc_offset(), src).unwrap().seconds(), seconds, "{src}");
        }
        assert_eq!(run(value_utc_offset(), "+0530").unwrap().second, None);

        for src in ["0500", "+2400", "-1260", "+120", "+05300", ""] {
            assert!(run(value_utc_offset(), src).is_err(), "Parse {src} should fail");
        }
    }
}
