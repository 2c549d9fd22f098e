// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Recurrence rule value as defined in RFC 5545 Section 3.3.10.

use std::fmt::{self, Display};

use chumsky::extra::ParserExtra;
use chumsky::input::Input;
use chumsky::label::LabelError;
use chumsky::prelude::*;
use chumsky::span::SimpleSpan;

use crate::keyword::{
    KW_DAY_FR, KW_DAY_MO, KW_DAY_SA, KW_DAY_SU, KW_DAY_TH, KW_DAY_TU, KW_DAY_WE, KW_RRULE_BYDAY,
    KW_RRULE_BYHOUR, KW_RRULE_BYMINUTE, KW_RRULE_BYMONTH, KW_RRULE_BYMONTHDAY, KW_RRULE_BYSECOND,
    KW_RRULE_BYSETPOS, KW_RRULE_BYWEEKNO, KW_RRULE_BYYEARDAY, KW_RRULE_COUNT, KW_RRULE_FREQ,
    KW_RRULE_FREQ_DAILY, KW_RRULE_FREQ_HOURLY, KW_RRULE_FREQ_MINUTELY, KW_RRULE_FREQ_MONTHLY,
    KW_RRULE_FREQ_SECONDLY, KW_RRULE_FREQ_WEEKLY, KW_RRULE_FREQ_YEARLY, KW_RRULE_INTERVAL,
    KW_RRULE_UNTIL, KW_RRULE_WKST,
};
use crate::value::datetime::{ValueDate, ValueDateTime, value_date, value_date_time};
use crate::value::miscellaneous::{ValueExpected, number, signed};

/// Recurrence rule
///
/// Only the grammar is checked here. Whether a BYxxx part is allowed with
/// the frequency is left to the consumer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueRecurrenceRule {
    /// Frequency of recurrence
    pub freq: RecurrenceFrequency,
    /// Until date for recurrence
    pub until: Option<RecurrenceUntil>,
    /// Number of occurrences
    pub count: Option<u32>,
    /// Interval between recurrences
    pub interval: Option<u32>,
    /// Second specifier, 0-60
    pub by_second: Vec<u8>,
    /// Minute specifier, 0-59
    pub by_minute: Vec<u8>,
    /// Hour specifier, 0-23
    pub by_hour: Vec<u8>,
    /// Day of month specifier, ±1-31
    pub by_month_day: Vec<i8>,
    /// Day of year specifier, ±1-366
    pub by_year_day: Vec<i16>,
    /// Week number specifier, ±1-53
    pub by_week_no: Vec<i8>,
    /// Month specifier, 1-12
    pub by_month: Vec<u8>,
    /// Day of week specifier
    pub by_day: Vec<WeekDayNum>,
    /// Position in the set of each interval, ±1-366
    pub by_set_pos: Vec<i16>,
    /// Start day of week
    pub wkst: Option<WeekDay>,
}

/// The UNTIL bound of a rule, either a date or a date-time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecurrenceUntil {
    /// Inclusive last date
    Date(ValueDate),
    /// Inclusive last date-time, usually in UTC
    DateTime(ValueDateTime),
}

/// Recurrence frequency
///
/// Variants are ordered from the finest to the coarsest granularity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[expect(missing_docs)]
pub enum RecurrenceFrequency {
    Secondly,
    Minutely,
    Hourly,
    #[default]
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl RecurrenceFrequency {
    const ALL: [Self; 7] = [
        Self::Secondly,
        Self::Minutely,
        Self::Hourly,
        Self::Daily,
        Self::Weekly,
        Self::Monthly,
        Self::Yearly,
    ];

    /// The FREQ keyword, e.g. `WEEKLY`.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Secondly => KW_RRULE_FREQ_SECONDLY,
            Self::Minutely => KW_RRULE_FREQ_MINUTELY,
            Self::Hourly => KW_RRULE_FREQ_HOURLY,
            Self::Daily => KW_RRULE_FREQ_DAILY,
            Self::Weekly => KW_RRULE_FREQ_WEEKLY,
            Self::Monthly => KW_RRULE_FREQ_MONTHLY,
            Self::Yearly => KW_RRULE_FREQ_YEARLY,
        }
    }
}

impl Display for RecurrenceFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Day of week with optional occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeekDayNum {
    /// Day of the week
    pub day: WeekDay,
    /// Occurrence within the month or year, negative counting from the end
    pub occurrence: Option<i8>,
}

impl From<WeekDay> for WeekDayNum {
    fn from(day: WeekDay) -> Self {
        Self {
            day,
            occurrence: None,
        }
    }
}

impl Display for WeekDayNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(n) = self.occurrence {
            write!(f, "{n}")?;
        }
        f.write_str(self.day.keyword())
    }
}

/// Day of the week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[expect(missing_docs)]
pub enum WeekDay {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl WeekDay {
    const ALL: [Self; 7] = [
        Self::Sunday,
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
    ];

    /// The two letter keyword, e.g. `MO`.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Sunday => KW_DAY_SU,
            Self::Monday => KW_DAY_MO,
            Self::Tuesday => KW_DAY_TU,
            Self::Wednesday => KW_DAY_WE,
            Self::Thursday => KW_DAY_TH,
            Self::Friday => KW_DAY_FR,
            Self::Saturday => KW_DAY_SA,
        }
    }

    /// Convert to `jiff::civil::Weekday`.
    #[cfg(feature = "jiff")]
    #[must_use]
    pub const fn civil_weekday(self) -> jiff::civil::Weekday {
        use jiff::civil::Weekday as W;
        match self {
            Self::Sunday => W::Sunday,
            Self::Monday => W::Monday,
            Self::Tuesday => W::Tuesday,
            Self::Wednesday => W::Wednesday,
            Self::Thursday => W::Thursday,
            Self::Friday => W::Friday,
            Self::Saturday => W::Saturday,
        }
    }
}

#[cfg(feature = "jiff")]
impl From<jiff::civil::Weekday> for WeekDay {
    fn from(value: jiff::civil::Weekday) -> Self {
        Self::ALL
            .into_iter()
            .find(|day| day.civil_weekday() == value)
            .unwrap_or(Self::Monday)
    }
}

impl Display for WeekDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// One `name=value` part before the parts are merged into a rule.
#[derive(Debug, Clone)]
enum Part {
    Freq(RecurrenceFrequency),
    Until(RecurrenceUntil),
    Count(u32),
    Interval(u32),
    BySecond(Vec<u8>),
    ByMinute(Vec<u8>),
    ByHour(Vec<u8>),
    ByDay(Vec<WeekDayNum>),
    ByMonthDay(Vec<i8>),
    ByYearDay(Vec<i16>),
    ByWeekNo(Vec<i8>),
    ByMonth(Vec<u8>),
    BySetPos(Vec<i16>),
    Wkst(WeekDay),
}

impl Part {
    const fn name(&self) -> &'static str {
        match self {
            Self::Freq(_) => KW_RRULE_FREQ,
            Self::Until(_) => KW_RRULE_UNTIL,
            Self::Count(_) => KW_RRULE_COUNT,
            Self::Interval(_) => KW_RRULE_INTERVAL,
            Self::BySecond(_) => KW_RRULE_BYSECOND,
            Self::ByMinute(_) => KW_RRULE_BYMINUTE,
            Self::ByHour(_) => KW_RRULE_BYHOUR,
            Self::ByDay(_) => KW_RRULE_BYDAY,
            Self::ByMonthDay(_) => KW_RRULE_BYMONTHDAY,
            Self::ByYearDay(_) => KW_RRULE_BYYEARDAY,
            Self::ByWeekNo(_) => KW_RRULE_BYWEEKNO,
            Self::ByMonth(_) => KW_RRULE_BYMONTH,
            Self::BySetPos(_) => KW_RRULE_BYSETPOS,
            Self::Wkst(_) => KW_RRULE_WKST,
        }
    }

    fn apply(self, rule: &mut ValueRecurrenceRule) {
        match self {
            Self::Freq(v) => rule.freq = v,
            Self::Until(v) => rule.until = Some(v),
            Self::Count(v) => rule.count = Some(v),
            Self::Interval(v) => rule.interval = Some(v),
            Self::BySecond(v) => rule.by_second = v,
            Self::ByMinute(v) => rule.by_minute = v,
            Self::ByHour(v) => rule.by_hour = v,
            Self::ByDay(v) => rule.by_day = v,
            Self::ByMonthDay(v) => rule.by_month_day = v,
            Self::ByYearDay(v) => rule.by_year_day = v,
            Self::ByWeekNo(v) => rule.by_week_no = v,
            Self::ByMonth(v) => rule.by_month = v,
            Self::BySetPos(v) => rule.by_set_pos = v,
            Self::Wkst(v) => rule.wkst = Some(v),
        }
    }
}

/// ```txt
/// recur           = recur-rule-part *( ";" recur-rule-part )
/// ```
///
/// Parts come in any order. FREQ is required, no part may repeat, and
/// COUNT excludes UNTIL.
pub fn value_rrule<'src, I, E>() -> impl Parser<'src, I, ValueRecurrenceRule, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    rule_part()
        .separated_by(just(';'))
        .at_least(1)
        .collect::<Vec<_>>()
        .try_map(|parts, span| {
            let fail = |reason| E::Error::expected_found([reason], None, span);

            let mut seen: Vec<&'static str> = Vec::with_capacity(parts.len());
            let mut rule = ValueRecurrenceRule::default();
            for part in parts {
                let name = part.name();
                if seen.contains(&name) {
                    return Err(fail(ValueExpected::RRuleDuplicatePart));
                }
                seen.push(name);
                part.apply(&mut rule);
            }

            if !seen.contains(&KW_RRULE_FREQ) {
                return Err(fail(ValueExpected::RRuleRequiredFreq));
            }
            if rule.count.is_some() && rule.until.is_some() {
                return Err(fail(ValueExpected::RRuleCountUntilExclusion));
            }
            Ok(rule)
        })
}

/// ```txt
/// recur-rule-part = ( "FREQ" "=" freq ) / ( "UNTIL" "=" enddate )
///                 / ( "COUNT" "=" 1*DIGIT ) / ( "INTERVAL" "=" 1*DIGIT )
///                 / ( "BYSECOND" "=" byseclist ) / ( "BYMINUTE" "=" byminlist )
///                 / ( "BYHOUR" "=" byhrlist ) / ( "BYDAY" "=" bywdaylist )
///                 / ( "BYMONTHDAY" "=" bymodaylist ) / ( "BYYEARDAY" "=" byyrdaylist )
///                 / ( "BYWEEKNO" "=" bywknolist ) / ( "BYMONTH" "=" bymolist )
///                 / ( "BYSETPOS" "=" bysplist ) / ( "WKST" "=" weekday )
/// ```
fn rule_part<'src, I, E>() -> impl Parser<'src, I, Part, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    let named = |name: &'static str| just(name).then(just('='));
    let positive = || number(1..=10, 1..=u32::MAX);
    let until = choice((
        value_date_time().map(RecurrenceUntil::DateTime),
        value_date().map(RecurrenceUntil::Date),
    ));

    choice((
        named(KW_RRULE_FREQ).ignore_then(frequency()).map(Part::Freq),
        named(KW_RRULE_UNTIL).ignore_then(until).map(Part::Until),
        named(KW_RRULE_COUNT).ignore_then(positive()).map(Part::Count),
        named(KW_RRULE_INTERVAL).ignore_then(positive()).map(Part::Interval),
        named(KW_RRULE_BYSECOND)
            .ignore_then(list(number(1..=2, 0..=60)))
            .map(Part::BySecond),
        named(KW_RRULE_BYMINUTE)
            .ignore_then(list(number(1..=2, 0..=59)))
            .map(Part::ByMinute),
        named(KW_RRULE_BYHOUR)
            .ignore_then(list(number(1..=2, 0..=23)))
            .map(Part::ByHour),
        named(KW_RRULE_BYDAY)
            .ignore_then(list(weekday_num()))
            .map(Part::ByDay),
        named(KW_RRULE_BYMONTHDAY)
            .ignore_then(list(signed(2, 1..=31)))
            .map(Part::ByMonthDay),
        named(KW_RRULE_BYYEARDAY)
            .ignore_then(list(signed(3, 1..=366)))
            .map(Part::ByYearDay),
        named(KW_RRULE_BYWEEKNO)
            .ignore_then(list(signed(2, 1..=53)))
            .map(Part::ByWeekNo),
        named(KW_RRULE_BYMONTH)
            .ignore_then(list(number(1..=2, 1..=12)))
            .map(Part::ByMonth),
        named(KW_RRULE_BYSETPOS)
            .ignore_then(list(signed(3, 1..=366)))
            .map(Part::BySetPos),
        named(KW_RRULE_WKST).ignore_then(weekday()).map(Part::Wkst),
    ))
}

/// Comma separated, at least one value.
fn list<'src, I, E, T>(item: impl Parser<'src, I, T, E>) -> impl Parser<'src, I, Vec<T>, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    item.separated_by(just(',')).at_least(1).collect()
}

fn frequency<'src, I, E>() -> impl Parser<'src, I, RecurrenceFrequency, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    choice(RecurrenceFrequency::ALL.map(|freq| just(freq.keyword()).to(freq)))
}

fn weekday<'src, I, E>() -> impl Parser<'src, I, WeekDay, E> + Clone
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    choice(WeekDay::ALL.map(|day| just(day.keyword()).to(day)))
}

/// ```txt
/// weekdaynum  = [[plus / minus] ordwk] weekday
/// ordwk       = 1*2DIGIT       ;1 to 53
/// ```
fn weekday_num<'src, I, E>() -> impl Parser<'src, I, WeekDayNum, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    signed(2, 1..=53)
        .or_not()
        .then(weekday())
        .map(|(occurrence, day)| WeekDayNum { day, occurrence })
}
