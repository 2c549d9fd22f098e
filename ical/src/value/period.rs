// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Period value type parser as defined in RFC 5545 Section 3.3.9, and the
//! value lists carried by RDATE and EXDATE (RFC 5545 Section 3.8.5).

use chumsky::extra::ParserExtra;
use chumsky::input::Input;
use chumsky::label::LabelError;
use chumsky::prelude::*;
use chumsky::span::SimpleSpan;

use crate::value::datetime::{ValueDate, ValueDateTime, value_date, value_date_time};
use crate::value::duration::{ValueDuration, value_duration};
use crate::value::miscellaneous::ValueExpected;

/// Period of Time value defined in RFC 5545 Section 3.3.9
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValuePeriod {
    /// `date-time "/" date-time`
    Explicit {
        /// Start date-time
        start: ValueDateTime,

        /// End date-time, with the same UTC marker as the start
        end: ValueDateTime,
    },

    /// `date-time "/" dur-value`
    Duration {
        /// Start date-time
        start: ValueDateTime,

        /// Duration
        duration: ValueDuration,
    },
}

impl ValuePeriod {
    /// Start of the period.
    #[must_use]
    pub const fn start(&self) -> &ValueDateTime {
        match self {
            Self::Explicit { start, .. } | Self::Duration { start, .. } => start,
        }
    }
}

/// Either half after the slash of a period.
#[derive(Debug, Clone, Copy)]
enum PeriodTail {
    End(ValueDateTime),
    Duration(ValueDuration),
}

/// ```txt
/// period          = period-explicit / period-start
/// period-explicit = date-time "/" date-time
/// period-start    = date-time "/" dur-value
/// ```
pub fn value_period<'src, I, E>() -> impl Parser<'src, I, ValuePeriod, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    let tail = choice((
        value_date_time().map(PeriodTail::End),
        value_duration().map(PeriodTail::Duration),
    ));

    value_date_time()
        .then_ignore(just('/'))
        .then(tail)
        .try_map(|(start, tail), span| match tail {
            PeriodTail::Duration(duration) => Ok(ValuePeriod::Duration { start, duration }),
            PeriodTail::End(end) if end.time.utc == start.time.utc => {
                Ok(ValuePeriod::Explicit { start, end })
            }
            PeriodTail::End(_) => Err(E::Error::expected_found(
                [ValueExpected::MismatchedTimezone],
                None,
                span,
            )),
        })
}

/// The values of an RDATE or EXDATE property.
///
/// All values of one property share a single value type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueDateList {
    /// `VALUE=DATE`
    Date(Vec<ValueDate>),

    /// `VALUE=DATE-TIME`, the default
    DateTime(Vec<ValueDateTime>),

    /// `VALUE=PERIOD`, only allowed for RDATE
    Period(Vec<ValuePeriod>),
}

impl ValueDateList {
    /// Number of values in the list.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Date(v) => v.len(),
            Self::DateTime(v) => v.len(),
            Self::Period(v) => v.len(),
        }
    }

    /// Whether the list holds no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// ```txt
/// rdtval     = date-time / date / period
/// exdtval    = date-time / date
/// ```
///
/// The value type is inferred from the first value and every following
/// value must have the same type.
pub fn value_date_list<'src, I, E>() -> impl Parser<'src, I, ValueDateList, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    fn all<'src, I, E, T>(
        value: impl Parser<'src, I, T, E>,
    ) -> impl Parser<'src, I, Vec<T>, E>
    where
        I: Input<'src, Token = char, Span = SimpleSpan>,
        E: ParserExtra<'src, I>,
    {
        value
            .separated_by(just(','))
            .at_least(1)
            .collect()
            .then_ignore(end())
    }

    choice((
        all(value_period()).map(ValueDateList::Period),
        all(value_date_time()).map(ValueDateList::DateTime),
        all(value_date()).map(ValueDateList::Date),
    ))
}
