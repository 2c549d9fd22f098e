// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Duration value type parser as defined in RFC 5545 Section 3.3.6.

use chumsky::extra::ParserExtra;
use chumsky::input::Input;
use chumsky::label::LabelError;
use chumsky::prelude::*;
use chumsky::span::SimpleSpan;

use crate::value::miscellaneous::{ValueExpected, is_positive, number};

/// Duration Value defined in RFC 5545 Section 3.3.6
///
/// A duration is either a number of weeks or a combination of days and a
/// time part. Week durations keep every other component at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueDuration {
    /// Whether the duration is positive
    pub positive: bool,
    /// Weeks, only set in the `dur-week` form
    pub weeks: u32,
    /// Days, nominal
    pub days: u32,
    /// Hours, exact
    pub hours: u32,
    /// Minutes, exact
    pub minutes: u32,
    /// Seconds, exact
    pub seconds: u32,
}

impl Default for ValueDuration {
    fn default() -> Self {
        Self::seconds(0)
    }
}

impl ValueDuration {
    /// A duration of whole weeks.
    #[must_use]
    pub const fn weeks(weeks: u32) -> Self {
        Self {
            positive: true,
            weeks,
            days: 0,
            hours: 0,
            minutes: 0,
            seconds: 0,
        }
    }

    /// A duration of whole days.
    #[must_use]
    pub const fn days(days: u32) -> Self {
        Self {
            positive: true,
            weeks: 0,
            days,
            hours: 0,
            minutes: 0,
            seconds: 0,
        }
    }

    /// A duration of exact seconds, split into hours, minutes and seconds.
    #[must_use]
    pub const fn seconds(seconds: u32) -> Self {
        Self {
            positive: true,
            weeks: 0,
            days: 0,
            hours: seconds / 3600,
            minutes: seconds % 3600 / 60,
            seconds: seconds % 60,
        }
    }

    /// The same duration pointing the other way.
    #[must_use]
    pub const fn negated(self) -> Self {
        Self {
            positive: !self.positive,
            ..self
        }
    }

    /// Whether the duration is positive.
    #[must_use]
    pub const fn is_positive(&self) -> bool {
        self.positive
    }

    /// Whether the duration uses the week form.
    #[must_use]
    pub const fn is_weeks(&self) -> bool {
        self.weeks > 0
    }

    /// Signed nominal part in calendar days, weeks counted as 7 days.
    ///
    /// Nominal days follow the wall clock and may differ from 24 hours
    /// across a daylight saving transition.
    #[must_use]
    pub fn nominal_days(&self) -> i64 {
        self.signed(i64::from(self.weeks) * 7 + i64::from(self.days))
    }

    /// Signed exact part in seconds.
    #[must_use]
    pub fn exact_seconds(&self) -> i64 {
        self.signed(
            i64::from(self.hours) * 3600 + i64::from(self.minutes) * 60 + i64::from(self.seconds),
        )
    }

    fn signed(&self, magnitude: i64) -> i64 {
        match self.positive {
            true => magnitude,
            false => -magnitude,
        }
    }
}

/// ```txt
/// dur-value  = (["+"] / "-") "P" (dur-date / dur-time / dur-week)
///
/// dur-date   = dur-day [dur-time]
/// dur-time   = "T" (dur-hour / dur-minute / dur-second)
/// dur-week   = 1*DIGIT "W"
/// dur-hour   = 1*DIGIT "H" [dur-minute]
/// dur-minute = 1*DIGIT "M" [dur-second]
/// dur-second = 1*DIGIT "S"
/// dur-day    = 1*DIGIT "D"
/// ```
///
/// Designators are case-sensitive. The time part accepts any non-empty
/// subset of hours, minutes and seconds in that order, so `PT1H30S` is
/// read as well.
pub fn value_duration<'src, I, E>() -> impl Parser<'src, I, ValueDuration, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    // u32 max has 10 digits
    let component = |designator| number(1..=10, 0..=u32::MAX).then_ignore(just(designator));

    let time = just('T')
        .ignore_then(
            component('H')
                .or_not()
                .then(component('M').or_not())
                .then(component('S').or_not()),
        )
        .try_map(|((hours, minutes), seconds), span| {
            match (hours, minutes, seconds) {
                (None, None, None) => Err(E::Error::expected_found(
                    [ValueExpected::EmptyDuration],
                    None,
                    span,
                )),
                _ => Ok(ValueDuration {
                    hours: hours.unwrap_or(0),
                    minutes: minutes.unwrap_or(0),
                    seconds: seconds.unwrap_or(0),
                    ..ValueDuration::default()
                }),
            }
        });

    let week = component('W').map(ValueDuration::weeks);
    let date = component('D')
        .then(time.clone().or_not())
        .map(|(days, time)| ValueDuration {
            days,
            ..time.unwrap_or_default()
        });

    is_positive()
        .then_ignore(just('P'))
        .then(choice((week, date, time)))
        .map(|(positive, duration)| ValueDuration {
            positive,
            ..duration
        })
}
