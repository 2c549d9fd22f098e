// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Validated recurrence rules.

use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

pub use recurcal_ical::{RecurrenceFrequency as Frequency, RecurrenceUntil, WeekDay, WeekDayNum};
use recurcal_ical::{ValueRecurrenceRule, parse_rrule};

use crate::error::{RecurError, Result};

/// How a rule ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Termination {
    /// The rule repeats without bound
    Forever,
    /// The rule stops after this many occurrences
    Count(u32),
    /// The rule stops after this date or date-time, inclusive
    Until(RecurrenceUntil),
}

/// A recurrence rule that passed validation.
///
/// Formatting writes the parts in a fixed order starting with FREQ, so a
/// parsed rule reads back equal but not always byte for byte. Absent
/// INTERVAL and WKST stay absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceRule {
    frequency: Frequency,
    interval: Option<NonZeroU32>,
    termination: Termination,
    by_second: Vec<u8>,
    by_minute: Vec<u8>,
    by_hour: Vec<u8>,
    by_day: Vec<WeekDayNum>,
    by_month_day: Vec<i8>,
    by_year_day: Vec<i16>,
    by_week_no: Vec<i8>,
    by_month: Vec<u8>,
    by_set_pos: Vec<i16>,
    week_start: Option<WeekDay>,
}

impl RecurrenceRule {
    /// Start building a rule.
    #[must_use]
    pub fn builder() -> RecurrenceRuleBuilder {
        RecurrenceRuleBuilder::default()
    }

    /// The FREQ part.
    #[must_use]
    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// The INTERVAL part, 1 when absent.
    #[must_use]
    pub fn interval(&self) -> u32 {
        self.interval.map_or(1, NonZeroU32::get)
    }

    /// COUNT or UNTIL.
    #[must_use]
    pub fn termination(&self) -> Termination {
        self.termination
    }

    /// The COUNT part.
    #[must_use]
    pub fn count(&self) -> Option<u32> {
        match self.termination {
            Termination::Count(count) => Some(count),
            Termination::Forever | Termination::Until(_) => None,
        }
    }

    /// The UNTIL part.
    #[must_use]
    pub fn until(&self) -> Option<RecurrenceUntil> {
        match self.termination {
            Termination::Until(until) => Some(until),
            Termination::Forever | Termination::Count(_) => None,
        }
    }

    /// The WKST part, Monday when absent.
    #[must_use]
    pub fn week_start(&self) -> WeekDay {
        self.week_start.unwrap_or(WeekDay::Monday)
    }

    /// The BYSECOND part.
    #[must_use]
    pub fn by_second(&self) -> &[u8] {
        &self.by_second
    }

    /// The BYMINUTE part.
    #[must_use]
    pub fn by_minute(&self) -> &[u8] {
        &self.by_minute
    }

    /// The BYHOUR part.
    #[must_use]
    pub fn by_hour(&self) -> &[u8] {
        &self.by_hour
    }

    /// The BYDAY part.
    #[must_use]
    pub fn by_day(&self) -> &[WeekDayNum] {
        &self.by_day
    }

    /// The BYMONTHDAY part.
    #[must_use]
    pub fn by_month_day(&self) -> &[i8] {
        &self.by_month_day
    }

    /// The BYYEARDAY part.
    #[must_use]
    pub fn by_year_day(&self) -> &[i16] {
        &self.by_year_day
    }

    /// The BYWEEKNO part.
    #[must_use]
    pub fn by_week_no(&self) -> &[i8] {
        &self.by_week_no
    }

    /// The BYMONTH part.
    #[must_use]
    pub fn by_month(&self) -> &[u8] {
        &self.by_month
    }

    /// The BYSETPOS part.
    #[must_use]
    pub fn by_set_pos(&self) -> &[i16] {
        &self.by_set_pos
    }

    /// Convert back to the raw value form.
    #[must_use]
    pub fn to_value(&self) -> ValueRecurrenceRule {
        ValueRecurrenceRule {
            freq: self.frequency,
            until: self.until(),
            count: self.count(),
            interval: self.interval.map(NonZeroU32::get),
            by_second: self.by_second.clone(),
            by_minute: self.by_minute.clone(),
            by_hour: self.by_hour.clone(),
            by_month_day: self.by_month_day.clone(),
            by_year_day: self.by_year_day.clone(),
            by_week_no: self.by_week_no.clone(),
            by_month: self.by_month.clone(),
            by_day: self.by_day.clone(),
            by_set_pos: self.by_set_pos.clone(),
            wkst: self.week_start,
        }
    }

    fn has_by_rule_besides_set_pos(&self) -> bool {
        !(self.by_second.is_empty()
            && self.by_minute.is_empty()
            && self.by_hour.is_empty()
            && self.by_day.is_empty()
            && self.by_month_day.is_empty()
            && self.by_year_day.is_empty()
            && self.by_week_no.is_empty()
            && self.by_month.is_empty())
    }

    fn validate(&self) -> Result<()> {
        check_range("BYSECOND", &self.by_second, 0, 60)?;
        check_range("BYMINUTE", &self.by_minute, 0, 59)?;
        check_range("BYHOUR", &self.by_hour, 0, 23)?;
        check_range("BYMONTH", &self.by_month, 1, 12)?;
        check_signed("BYMONTHDAY", &self.by_month_day, 31)?;
        check_signed("BYYEARDAY", &self.by_year_day, 366)?;
        check_signed("BYWEEKNO", &self.by_week_no, 53)?;
        check_signed("BYSETPOS", &self.by_set_pos, 366)?;
        let ordinals: Vec<i8> = self.by_day.iter().filter_map(|d| d.occurrence).collect();
        check_signed("BYDAY", &ordinals, 53)?;

        use Frequency::{Daily, Monthly, Weekly, Yearly};
        let freq = self.frequency;
        if !self.by_week_no.is_empty() && freq != Yearly {
            return Err(not_with("BYWEEKNO", freq));
        }
        if !self.by_year_day.is_empty() && matches!(freq, Daily | Weekly | Monthly) {
            return Err(not_with("BYYEARDAY", freq));
        }
        if !self.by_month_day.is_empty() && freq == Weekly {
            return Err(not_with("BYMONTHDAY", freq));
        }
        if !ordinals.is_empty() {
            if !matches!(freq, Monthly | Yearly) {
                return Err(RecurError::InvalidByRule {
                    part: "BYDAY",
                    reason: format!("numeric weekdays are not allowed with FREQ={freq}"),
                });
            }
            if freq == Yearly && !self.by_week_no.is_empty() {
                return Err(RecurError::InvalidByRule {
                    part: "BYDAY",
                    reason: "numeric weekdays are not allowed together with BYWEEKNO".to_owned(),
                });
            }
        }
        if !self.by_set_pos.is_empty() && !self.has_by_rule_besides_set_pos() {
            return Err(RecurError::InvalidByRule {
                part: "BYSETPOS",
                reason: "requires another BYxxx rule part".to_owned(),
            });
        }
        Ok(())
    }
}

fn not_with(part: &'static str, freq: Frequency) -> RecurError {
    RecurError::InvalidByRule {
        part,
        reason: format!("not allowed with FREQ={freq}"),
    }
}

fn check_range(part: &'static str, values: &[u8], min: u8, max: u8) -> Result<()> {
    match values.iter().find(|v| !(min..=max).contains(*v)) {
        Some(v) => Err(RecurError::InvalidByRule {
            part,
            reason: format!("{v} is outside {min}..={max}"),
        }),
        None => Ok(()),
    }
}

/// Values in `-max..=-1` or `1..=max`.
fn check_signed<T: Copy + Into<i32>>(part: &'static str, values: &[T], max: i32) -> Result<()> {
    match values
        .iter()
        .map(|v| (*v).into())
        .find(|v| *v == 0 || v.abs() > max)
    {
        Some(v) => Err(RecurError::InvalidByRule {
            part,
            reason: format!("{v} is outside ±1..={max}"),
        }),
        None => Ok(()),
    }
}

impl TryFrom<ValueRecurrenceRule> for RecurrenceRule {
    type Error = RecurError;

    fn try_from(value: ValueRecurrenceRule) -> Result<Self> {
        let interval = match value.interval {
            Some(n) => Some(NonZeroU32::new(n).ok_or(RecurError::InvalidInterval)?),
            None => None,
        };
        let termination = match (value.count, value.until) {
            (Some(_), Some(_)) => return Err(RecurError::CountAndUntil),
            (Some(count), None) => Termination::Count(count),
            (None, Some(until)) => Termination::Until(until),
            (None, None) => Termination::Forever,
        };

        let rule = Self {
            frequency: value.freq,
            interval,
            termination,
            by_second: value.by_second,
            by_minute: value.by_minute,
            by_hour: value.by_hour,
            by_day: value.by_day,
            by_month_day: value.by_month_day,
            by_year_day: value.by_year_day,
            by_week_no: value.by_week_no,
            by_month: value.by_month,
            by_set_pos: value.by_set_pos,
            week_start: value.wkst,
        };
        rule.validate()?;
        Ok(rule)
    }
}

impl FromStr for RecurrenceRule {
    type Err = RecurError;

    fn from_str(s: &str) -> Result<Self> {
        parse_rrule(s)?.try_into()
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_value(), f)
    }
}

/// Builder for [`RecurrenceRule`], validated on [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct RecurrenceRuleBuilder {
    frequency: Option<Frequency>,
    value: ValueRecurrenceRule,
}

impl RecurrenceRuleBuilder {
    /// Set FREQ, required.
    #[must_use]
    pub fn frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = Some(frequency);
        self
    }

    /// Set INTERVAL.
    #[must_use]
    pub fn interval(mut self, interval: u32) -> Self {
        self.value.interval = Some(interval);
        self
    }

    /// Set COUNT.
    #[must_use]
    pub fn count(mut self, count: u32) -> Self {
        self.value.count = Some(count);
        self
    }

    /// Set UNTIL.
    #[must_use]
    pub fn until(mut self, until: RecurrenceUntil) -> Self {
        self.value.until = Some(until);
        self
    }

    /// Set WKST.
    #[must_use]
    pub fn week_start(mut self, day: WeekDay) -> Self {
        self.value.wkst = Some(day);
        self
    }

    /// Set BYSECOND.
    #[must_use]
    pub fn by_second(mut self, values: impl IntoIterator<Item = u8>) -> Self {
        self.value.by_second = values.into_iter().collect();
        self
    }

    /// Set BYMINUTE.
    #[must_use]
    pub fn by_minute(mut self, values: impl IntoIterator<Item = u8>) -> Self {
        self.value.by_minute = values.into_iter().collect();
        self
    }

    /// Set BYHOUR.
    #[must_use]
    pub fn by_hour(mut self, values: impl IntoIterator<Item = u8>) -> Self {
        self.value.by_hour = values.into_iter().collect();
        self
    }

    /// Set BYDAY.
    #[must_use]
    pub fn by_day(mut self, values: impl IntoIterator<Item = WeekDayNum>) -> Self {
        self.value.by_day = values.into_iter().collect();
        self
    }

    /// Set BYMONTHDAY.
    #[must_use]
    pub fn by_month_day(mut self, values: impl IntoIterator<Item = i8>) -> Self {
        self.value.by_month_day = values.into_iter().collect();
        self
    }

    /// Set BYYEARDAY.
    #[must_use]
    pub fn by_year_day(mut self, values: impl IntoIterator<Item = i16>) -> Self {
        self.value.by_year_day = values.into_iter().collect();
        self
    }

    /// Set BYWEEKNO.
    #[must_use]
    pub fn by_week_no(mut self, values: impl IntoIterator<Item = i8>) -> Self {
        self.value.by_week_no = values.into_iter().collect();
        self
    }

    /// Set BYMONTH.
    #[must_use]
    pub fn by_month(mut self, values: impl IntoIterator<Item = u8>) -> Self {
        self.value.by_month = values.into_iter().collect();
        self
    }

    /// Set BYSETPOS.
    #[must_use]
    pub fn by_set_pos(mut self, values: impl IntoIterator<Item = i16>) -> Self {
        self.value.by_set_pos = values.into_iter().collect();
        self
    }

    /// Validate and build the rule.
    ///
    /// ## Errors
    ///
    /// Returns [`RecurError::MissingFrequency`], [`RecurError::InvalidInterval`],
    /// [`RecurError::CountAndUntil`] or [`RecurError::InvalidByRule`].
    pub fn build(self) -> Result<RecurrenceRule> {
        let frequency = self.frequency.ok_or(RecurError::MissingFrequency)?;
        RecurrenceRule::try_from(ValueRecurrenceRule {
            freq: frequency,
            ..self.value
        })
    }
}

#[cfg(test)]
mod tests {
    use recurcal_ical::ValueDate;

    use super::*;

    fn day(day: WeekDay, occurrence: Option<i8>) -> WeekDayNum {
        WeekDayNum { day, occurrence }
    }

    #[test]
    fn builds_rule() {
        let rule = RecurrenceRule::builder()
            .frequency(Frequency::Monthly)
            .interval(2)
            .by_day([day(WeekDay::Friday, Some(-1))])
            .count(4)
            .build()
            .unwrap();
        assert_eq!(rule.interval(), 2);
        assert_eq!(rule.count(), Some(4));
        assert_eq!(rule.week_start(), WeekDay::Monday);
        assert_eq!(rule.to_string(), "FREQ=MONTHLY;COUNT=4;INTERVAL=2;BYDAY=-1FR");
    }

    #[test]
    fn builder_errors() {
        let err = RecurrenceRule::builder().count(3).build().unwrap_err();
        assert_eq!(err, RecurError::MissingFrequency);

        let err = RecurrenceRule::builder()
            .frequency(Frequency::Daily)
            .interval(0)
            .build()
            .unwrap_err();
        assert_eq!(err, RecurError::InvalidInterval);

        let err = RecurrenceRule::builder()
            .frequency(Frequency::Daily)
            .count(3)
            .until(RecurrenceUntil::Date(ValueDate {
                year: 2020,
                month: 1,
                day: 1,
            }))
            .build()
            .unwrap_err();
        assert_eq!(err, RecurError::CountAndUntil);
    }

    #[test]
    fn keeps_text_form() {
        for src in [
            "FREQ=DAILY;COUNT=10",
            "FREQ=WEEKLY;UNTIL=19971224T000000Z;WKST=SU;BYDAY=TU,TH",
            "FREQ=YEARLY;BYWEEKNO=20;BYDAY=MO",
            "FREQ=MONTHLY;BYDAY=MO,TU,WE,TH,FR;BYSETPOS=-2",
        ] {
            let rule: RecurrenceRule = src.parse().unwrap();
            let again: RecurrenceRule = rule.to_string().parse().unwrap();
            assert_eq!(rule, again, "{src}");
        }

        let rule: RecurrenceRule = "BYDAY=MO;COUNT=2;FREQ=WEEKLY".parse().unwrap();
        assert_eq!(rule.to_string(), "FREQ=WEEKLY;COUNT=2;BYDAY=MO");

        let rule: RecurrenceRule = "FREQ=WEEKLY;BYDAY=MO".parse().unwrap();
        assert!(!rule.to_string().contains("WKST"));
        assert!(!rule.to_string().contains("INTERVAL"));
    }

    #[test]
    fn rejects_parts_not_allowed_with_frequency() {
        for src in [
            "FREQ=MONTHLY;BYWEEKNO=3",
            "FREQ=DAILY;BYYEARDAY=100",
            "FREQ=WEEKLY;BYMONTHDAY=1",
            "FREQ=WEEKLY;BYDAY=1MO",
            "FREQ=YEARLY;BYWEEKNO=1;BYDAY=1MO",
            "FREQ=DAILY;BYSETPOS=1",
        ] {
            let err = src.parse::<RecurrenceRule>().unwrap_err();
            assert!(matches!(err, RecurError::InvalidByRule { .. }), "{src}: {err}");
        }

        assert!("FREQ=HOURLY;BYYEARDAY=-1".parse::<RecurrenceRule>().is_ok());
        assert!("FREQ=YEARLY;BYDAY=20MO".parse::<RecurrenceRule>().is_ok());
    }

    #[test]
    fn rejects_values_out_of_range() {
        let err = RecurrenceRule::builder()
            .frequency(Frequency::Yearly)
            .by_month([13])
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            RecurError::InvalidByRule {
                part: "BYMONTH",
                reason: "13 is outside 1..=12".to_owned()
            }
        );

        let err = RecurrenceRule::builder()
            .frequency(Frequency::Monthly)
            .by_month_day([0])
            .build()
            .unwrap_err();
        assert!(matches!(err, RecurError::InvalidByRule { part: "BYMONTHDAY", .. }));
    }

    #[test]
    fn parse_errors_are_reported() {
        let err = "FREQ=FORTNIGHTLY".parse::<RecurrenceRule>().unwrap_err();
        assert!(matches!(err, RecurError::Parse(_)));
    }
}
