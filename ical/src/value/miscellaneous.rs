// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Shared building blocks for the value parsers.

use std::borrow::Cow;
use std::ops::{Neg, RangeInclusive};

use chumsky::Parser;
use chumsky::error::RichPattern;
use chumsky::extra::ParserExtra;
use chumsky::input::Input;
use chumsky::label::LabelError;
use chumsky::prelude::*;
use chumsky::span::SimpleSpan;
use lexical::FromLexical;

/// Failure reasons when a specific value type was expected but not found.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueExpected {
    /// A date value was expected
    Date,
    /// A number outside the range allowed at its position
    OutOfRange,
    /// A duration without any component
    EmptyDuration,
    /// Period date-times must have consistent timezone (both UTC or both floating)
    MismatchedTimezone,
    /// A recurrence rule part appeared more than once
    RRuleDuplicatePart,
    /// The FREQ rule part is missing
    RRuleRequiredFreq,
    /// COUNT and UNTIL appeared in the same rule
    RRuleCountUntilExclusion,
}

impl ValueExpected {
    const fn label(self) -> &'static str {
        match self {
            Self::Date => "invalid date",
            Self::OutOfRange => "number out of range",
            Self::EmptyDuration => "duration needs at least one component",
            Self::MismatchedTimezone => "period date-times must have consistent timezone",
            Self::RRuleDuplicatePart => "recurrence rule part must not repeat",
            Self::RRuleRequiredFreq => "recurrence rule requires FREQ",
            Self::RRuleCountUntilExclusion => "COUNT and UNTIL must not occur in the same rule",
        }
    }
}

impl From<ValueExpected> for RichPattern<'_, char> {
    fn from(expected: ValueExpected) -> Self {
        Self::Label(Cow::Borrowed(expected.label()))
    }
}

/// Number of days in the given month, or 0 for an invalid month.
#[must_use]
pub const fn days_in_month(year: i16, month: i8) -> i8 {
    match month {
        2 => match is_leap_year(year) {
            true => 29,
            false => 28,
        },
        4 | 6 | 9 | 11 => 30,
        1..=12 => 31,
        _ => 0,
    }
}

/// Gregorian leap year rule.
#[must_use]
pub const fn is_leap_year(year: i16) -> bool {
    match (year % 4, year % 100, year % 400) {
        (_, _, 0) => true,
        (_, 0, _) => false,
        (r, _, _) => r == 0,
    }
}

/// Optional leading sign, `true` unless it is `-`.
pub(crate) fn is_positive<'src, I, E>() -> impl Parser<'src, I, bool, E> + Copy
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    select! { c @ ('+' | '-') => c }
        .or_not()
        .map(|c| !matches!(c, Some('-')))
}

/// Unsigned decimal of `digits` length, rejected unless it lies in `range`.
///
/// Leading zeros are allowed, so `"07"` and `"7"` are the same value when
/// the digit count permits both.
pub(crate) fn number<'src, I, E, T>(
    digits: RangeInclusive<usize>,
    range: RangeInclusive<T>,
) -> impl Parser<'src, I, T, E> + Clone
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
    T: FromLexical + PartialOrd + Clone,
{
    select! { c @ '0'..='9' => c }
        .repeated()
        .at_least(*digits.start())
        .at_most(*digits.end())
        .collect::<String>()
        .try_map_with(move |text, e| match lexical::parse::<T, _>(&text) {
            Ok(value) if range.contains(&value) => Ok(value),
            _ => Err(E::Error::expected_found(
                [ValueExpected::OutOfRange],
                None,
                e.span(),
            )),
        })
}

/// Optionally signed decimal whose magnitude lies in `magnitude`.
pub(crate) fn signed<'src, I, E, T>(
    max_digits: usize,
    magnitude: RangeInclusive<T>,
) -> impl Parser<'src, I, T, E> + Clone
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
    T: FromLexical + PartialOrd + Clone + Neg<Output = T>,
{
    is_positive()
        .then(number(1..=max_digits, magnitude))
        .map(|(positive, n)| match positive {
            true => n,
            false => -n,
        })
}

#[cfg(test)]
mod tests {
    use chumsky::input::Stream;

    use super::*;

    #[test]
    fn counts_days_in_month() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(1900, 2), 28);
        assert_eq!(days_in_month(2000, 2), 29);
        assert_eq!(days_in_month(2024, 4), 30);
        assert_eq!(days_in_month(2024, 12), 31);
        assert_eq!(days_in_month(2024, 13), 0);
        assert_eq!(days_in_month(2024, 0), 0);
    }

    #[test]
    fn checks_number_ranges() {
        fn parse(src: &str) -> Result<i16, Vec<Rich<'_, char>>> {
            let stream = Stream::from_iter(src.chars());
            signed::<'_, _, extra::Err<_>, i16>(3, 1..=366)
                .then_ignore(end())
                .parse(stream)
                .into_result()
        }

        assert_eq!(parse("1").unwrap(), 1);
        assert_eq!(parse("+007").unwrap(), 7);
        assert_eq!(parse("-366").unwrap(), -366);
        for src in ["0", "367", "-0", "1000", "", "+"] {
            assert!(parse(src).is_err(), "Parse {src} should fail");
        }
    }
}
