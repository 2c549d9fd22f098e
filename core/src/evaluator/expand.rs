// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Wall-clock expansion of a single recurrence rule.
//!
//! The expansion walks the rule period by period (a year for YEARLY, the
//! week starting on WKST for WEEKLY, and so on), builds the candidate set of
//! each period from the BYxxx parts, and yields candidates in order. It knows
//! nothing about zones: callers translate bounds into the seed's wall clock
//! and place the results on the timeline.

use std::collections::VecDeque;

use jiff::civil::{Date, DateTime, Time, Weekday};
use jiff::{SignedDuration, ToSpan};

use crate::config::DEFAULT_MAX_EMPTY_STEPS;
use crate::error::{RecurError, Result};
use crate::rule::{Frequency, RecurrenceRule, WeekDayNum};

#[derive(Debug)]
pub(crate) struct Expansion<'r> {
    rule: &'r RecurrenceRule,
    seed: DateTime,
    date_only: bool,
    until: Option<DateTime>,
    horizon: Option<DateTime>,
    max_empty_steps: u32,

    interval: i64,
    week_start: Weekday,
    origin: Option<DateTime>,
    by_month: Vec<i8>,
    by_month_day: Vec<i8>,
    by_day: Vec<WeekDayNum>,
    hours: Vec<i8>,
    minutes: Vec<i8>,
    seconds: Vec<i8>,

    step: i64,
    pending: VecDeque<DateTime>,
    emitted: u32,
    empty_run: u32,
    include_seed: bool,
    seed_pending: bool,
    done: bool,
}

impl<'r> Expansion<'r> {
    pub(crate) fn new(rule: &'r RecurrenceRule, seed: DateTime, date_only: bool) -> Self {
        let seed = match date_only {
            true => seed.date().to_datetime(Time::midnight()),
            false => seed,
        };
        let week_start = rule.week_start().civil_weekday();

        // without any day-level part the seed supplies the day
        let mut by_month = to_i8(rule.by_month());
        let mut by_month_day = rule.by_month_day().to_vec();
        let mut by_day = rule.by_day().to_vec();
        let no_day_rules = rule.by_week_no().is_empty()
            && rule.by_year_day().is_empty()
            && by_month_day.is_empty()
            && by_day.is_empty();
        if no_day_rules {
            match rule.frequency() {
                Frequency::Yearly => {
                    if by_month.is_empty() {
                        by_month.push(seed.month());
                    }
                    by_month_day.push(seed.day());
                }
                Frequency::Monthly => by_month_day.push(seed.day()),
                Frequency::Weekly => by_day.push(WeekDayNum {
                    day: seed.weekday().into(),
                    occurrence: None,
                }),
                _ => {}
            }
        }

        let or_seed = |values: Vec<i8>, seed: i8| match values.is_empty() {
            true => vec![seed],
            false => values,
        };
        let hours = or_seed(sorted(to_i8(rule.by_hour())), seed.hour());
        let minutes = or_seed(sorted(to_i8(rule.by_minute())), seed.minute());
        let seconds = or_seed(
            sorted(rule.by_second().iter().map(|s| clock_second(*s)).collect()),
            seed.second(),
        );

        let origin = origin(rule.frequency(), seed, week_start);
        Self {
            rule,
            seed,
            date_only,
            until: None,
            horizon: None,
            max_empty_steps: DEFAULT_MAX_EMPTY_STEPS,
            interval: i64::from(rule.interval()),
            week_start,
            origin,
            by_month,
            by_month_day,
            by_day,
            hours,
            minutes,
            seconds,
            step: 0,
            pending: VecDeque::new(),
            emitted: 0,
            empty_run: 0,
            include_seed: false,
            seed_pending: false,
            done: false,
        }
    }

    /// Inclusive wall-clock bound, from UNTIL.
    pub(crate) fn until(mut self, until: Option<DateTime>) -> Self {
        self.until = until;
        self
    }

    /// Stop once whole periods start after this wall-clock time.
    pub(crate) fn horizon(mut self, horizon: Option<DateTime>) -> Self {
        self.horizon = horizon;
        self
    }

    /// Emit the seed first, counted as an occurrence, whether or not it
    /// matches the rule.
    pub(crate) fn include_seed(mut self, include: bool) -> Self {
        self.include_seed = include;
        self.seed_pending = include;
        self
    }

    pub(crate) fn max_empty_steps(mut self, steps: u32) -> Self {
        self.max_empty_steps = steps.max(1);
        self
    }

    /// Skip whole periods that end before `hint`. Ignored for COUNT rules,
    /// whose occurrences must be counted from the seed.
    pub(crate) fn start_hint(mut self, hint: DateTime) -> Self {
        if self.rule.count().is_none()
            && hint > self.seed
            && let Some(step) = self.step_at(hint, false)
        {
            self.step = self.step.max(step);
        }
        self
    }

    fn count_reached(&self) -> bool {
        self.rule.count().is_some_and(|count| self.emitted >= count)
    }

    fn fill(&mut self) -> Result<()> {
        while self.pending.is_empty() && !self.done {
            let Some(start) = self.period_start(self.step) else {
                self.done = true;
                break;
            };
            if self.horizon.is_some_and(|h| start > h) || self.until.is_some_and(|u| start > u) {
                self.done = true;
                break;
            }

            let (candidates, skip_to) = self.candidates(start);
            let candidates = self.select_positions(candidates);
            self.step = match skip_to.and_then(|t| self.step_at(t, true)) {
                Some(step) if step > self.step => step,
                _ => self.step + 1,
            };

            if candidates.is_empty() {
                self.empty_run += 1;
                if self.empty_run > self.max_empty_steps {
                    self.done = true;
                    return Err(RecurError::RecurrenceUnresolvable {
                        steps: self.empty_run,
                    });
                }
                continue;
            }

            self.empty_run = 0;
            let (seed, include_seed) = (self.seed, self.include_seed);
            self.pending.extend(
                candidates
                    .into_iter()
                    .filter(|c| *c > seed || (*c == seed && !include_seed)),
            );
        }
        Ok(())
    }

    /// Wall-clock start of the period `step` steps after the seed's period.
    fn period_start(&self, step: i64) -> Option<DateTime> {
        let origin = self.origin?;
        let n = step.checked_mul(self.interval)?;
        match self.rule.frequency() {
            Frequency::Yearly => {
                let year = i16::try_from(i64::from(origin.year()).checked_add(n)?).ok()?;
                Some(Date::new(year, 1, 1).ok()?.to_datetime(Time::midnight()))
            }
            Frequency::Monthly => {
                let index = i64::from(origin.year()) * 12 + i64::from(origin.month() - 1);
                let index = index.checked_add(n)?;
                let year = i16::try_from(index.div_euclid(12)).ok()?;
                let month = i8::try_from(index.rem_euclid(12) + 1).ok()?;
                Some(Date::new(year, month, 1).ok()?.to_datetime(Time::midnight()))
            }
            freq => {
                let secs = n.checked_mul(unit_seconds(freq))?;
                origin.checked_add(SignedDuration::from_secs(secs)).ok()
            }
        }
    }

    /// Index of the period containing `target`, or of the first period
    /// starting at or after it when `round_up` is set.
    fn step_at(&self, target: DateTime, round_up: bool) -> Option<i64> {
        let origin = self.origin?;
        let (units, per_step) = match self.rule.frequency() {
            Frequency::Yearly => (
                i64::from(target.year()) - i64::from(origin.year()),
                self.interval,
            ),
            Frequency::Monthly => (
                (i64::from(target.year()) * 12 + i64::from(target.month()))
                    - (i64::from(origin.year()) * 12 + i64::from(origin.month())),
                self.interval,
            ),
            freq => (
                target.duration_since(origin).as_secs(),
                self.interval.checked_mul(unit_seconds(freq))?,
            ),
        };

        let step = match round_up {
            true => -((-units).div_euclid(per_step)),
            false => units.div_euclid(per_step),
        };
        Some(step.max(0))
    }

    /// Sorted candidates of one period, and a wall-clock time before which
    /// no later period can match.
    fn candidates(&self, start: DateTime) -> (Vec<DateTime>, Option<DateTime>) {
        let freq = self.rule.frequency();
        if freq <= Frequency::Daily {
            let date = start.date();
            if !self.month_matches(date) {
                let next = date
                    .first_of_month()
                    .checked_add(1.month())
                    .ok()
                    .map(|d| d.to_datetime(Time::midnight()));
                return (Vec::new(), next);
            }
            if !self.day_matches(date) {
                let next = date.tomorrow().ok().map(|d| d.to_datetime(Time::midnight()));
                return (Vec::new(), next);
            }

            let (times, skip_to) = self.times(start);
            let candidates = times.into_iter().map(|t| date.to_datetime(t)).collect();
            return (candidates, skip_to);
        }

        let first = start.date();
        let len = match freq {
            Frequency::Yearly => first.days_in_year(),
            Frequency::Monthly => i16::from(first.days_in_month()),
            _ => 7,
        };
        let (times, _) = self.times(start);
        let candidates = first
            .series(1.day())
            .take(usize::try_from(len).unwrap_or(0))
            .filter(|d| self.month_matches(*d) && self.day_matches(*d))
            .flat_map(|d| times.iter().map(move |t| d.to_datetime(*t)))
            .collect();
        (candidates, None)
    }

    /// Times of day for a period. Units finer than the frequency expand from
    /// BYxxx or the seed, the period's own units are filtered.
    fn times(&self, start: DateTime) -> (Vec<Time>, Option<DateTime>) {
        if self.date_only {
            return (vec![Time::midnight()], None);
        }

        let freq = self.rule.frequency();
        let hours = match freq <= Frequency::Hourly {
            true if !passes(self.rule.by_hour(), start.hour()) => {
                let next = start.date().at(start.hour(), 0, 0, 0).checked_add(1.hour()).ok();
                return (Vec::new(), next);
            }
            true => vec![start.hour()],
            false => self.hours.clone(),
        };
        let minutes = match freq <= Frequency::Minutely {
            true if !passes(self.rule.by_minute(), start.minute()) => {
                let next = start
                    .date()
                    .at(start.hour(), start.minute(), 0, 0)
                    .checked_add(1.minute())
                    .ok();
                return (Vec::new(), next);
            }
            true => vec![start.minute()],
            false => self.minutes.clone(),
        };
        let seconds = match freq == Frequency::Secondly {
            true if !self.rule.by_second().is_empty()
                && !self.seconds.contains(&start.second()) =>
            {
                return (Vec::new(), None);
            }
            true => vec![start.second()],
            false => self.seconds.clone(),
        };

        let mut times = Vec::with_capacity(hours.len() * minutes.len() * seconds.len());
        for h in &hours {
            for m in &minutes {
                for s in &seconds {
                    if let Ok(t) = Time::new(*h, *m, *s, 0) {
                        times.push(t);
                    }
                }
            }
        }
        (times, None)
    }

    fn select_positions(&self, candidates: Vec<DateTime>) -> Vec<DateTime> {
        let positions = self.rule.by_set_pos();
        if positions.is_empty() {
            return candidates;
        }

        let len = i64::try_from(candidates.len()).unwrap_or(i64::MAX);
        let mut picked: Vec<DateTime> = positions
            .iter()
            .filter_map(|&pos| {
                let pos = i64::from(pos);
                let index = match pos > 0 {
                    true => pos - 1,
                    false => len + pos,
                };
                usize::try_from(index)
                    .ok()
                    .and_then(|i| candidates.get(i).copied())
            })
            .collect();
        picked.sort_unstable();
        picked.dedup();
        picked
    }

    fn month_matches(&self, date: Date) -> bool {
        self.by_month.is_empty() || self.by_month.contains(&date.month())
    }

    fn day_matches(&self, date: Date) -> bool {
        let by_week_no = self.rule.by_week_no();
        let by_year_day = self.rule.by_year_day();

        (by_week_no.is_empty() || self.week_no_matches(by_week_no, date))
            && (by_year_day.is_empty()
                || by_year_day
                    .iter()
                    .any(|n| ordinal_matches(*n, date.day_of_year(), date.days_in_year())))
            && (self.by_month_day.is_empty()
                || self.by_month_day.iter().any(|n| {
                    ordinal_matches(
                        i16::from(*n),
                        i16::from(date.day()),
                        i16::from(date.days_in_month()),
                    )
                }))
            && (self.by_day.is_empty()
                || self.by_day.iter().any(|d| self.weekday_matches(*d, date)))
    }

    fn weekday_matches(&self, day: WeekDayNum, date: Date) -> bool {
        if date.weekday() != day.day.civil_weekday() {
            return false;
        }
        let Some(n) = day.occurrence else {
            return true;
        };

        let in_month = self.rule.frequency() == Frequency::Monthly
            || (self.rule.frequency() == Frequency::Yearly && !self.rule.by_month().is_empty());
        let (index, len) = match in_month {
            true => (i16::from(date.day()), i16::from(date.days_in_month())),
            false => (date.day_of_year(), date.days_in_year()),
        };
        let n = i16::from(n);
        n == (index - 1) / 7 + 1 || n == -((len - index) / 7 + 1)
    }

    fn week_no_matches(&self, by_week_no: &[i8], date: Date) -> bool {
        let Some((year, week)) = week_of(date, self.week_start) else {
            return false;
        };
        let Some(weeks) = weeks_in_year(year, self.week_start) else {
            return false;
        };
        by_week_no
            .iter()
            .any(|n| i16::from(*n) == week || i16::from(*n) == week - weeks - 1)
    }
}

impl Iterator for Expansion<'_> {
    type Item = Result<DateTime>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.count_reached() {
            return None;
        }

        if self.seed_pending {
            self.seed_pending = false;
            if self.until.is_none_or(|u| self.seed <= u) {
                self.emitted += 1;
                return Some(Ok(self.seed));
            }
        }

        if let Err(err) = self.fill() {
            return Some(Err(err));
        }

        let next = self.pending.pop_front()?;
        if self.until.is_some_and(|u| next > u) {
            self.done = true;
            self.pending.clear();
            return None;
        }
        self.emitted += 1;
        Some(Ok(next))
    }
}

fn origin(freq: Frequency, seed: DateTime, week_start: Weekday) -> Option<DateTime> {
    let date = seed.date();
    let origin = match freq {
        Frequency::Yearly => Date::new(date.year(), 1, 1).ok()?.to_datetime(Time::midnight()),
        Frequency::Monthly => date.first_of_month().to_datetime(Time::midnight()),
        Frequency::Weekly => {
            let back = days_since(date.weekday(), week_start);
            date.checked_sub(i64::from(back).days())
                .ok()?
                .to_datetime(Time::midnight())
        }
        Frequency::Daily => date.to_datetime(Time::midnight()),
        Frequency::Hourly => date.at(seed.hour(), 0, 0, 0),
        Frequency::Minutely => date.at(seed.hour(), seed.minute(), 0, 0),
        Frequency::Secondly => date.at(seed.hour(), seed.minute(), seed.second(), 0),
    };
    Some(origin)
}

const fn unit_seconds(freq: Frequency) -> i64 {
    match freq {
        Frequency::Secondly => 1,
        Frequency::Minutely => 60,
        Frequency::Hourly => 3_600,
        Frequency::Daily => 86_400,
        Frequency::Weekly => 604_800,
        // calendar units, never stepped by seconds
        Frequency::Monthly | Frequency::Yearly => 0,
    }
}

/// BYSECOND value on the clock. A leap second has no wall-clock time of its
/// own and lands on the last second of its minute.
fn clock_second(value: u8) -> i8 {
    i8::try_from(value.min(59)).unwrap_or(59)
}

fn to_i8(values: &[u8]) -> Vec<i8> {
    values.iter().filter_map(|v| i8::try_from(*v).ok()).collect()
}

fn sorted(mut values: Vec<i8>) -> Vec<i8> {
    values.sort_unstable();
    values.dedup();
    values
}

fn passes(filter: &[u8], value: i8) -> bool {
    filter.is_empty() || filter.iter().any(|v| i16::from(*v) == i16::from(value))
}

/// Whether a 1-based `value` out of `len` is selected by `n`, where negative
/// `n` counts from the end.
fn ordinal_matches(n: i16, value: i16, len: i16) -> bool {
    match n > 0 {
        true => n == value,
        false => len + 1 + n == value,
    }
}

/// Days from `week_start` to `day`, in `0..7`.
fn days_since(day: Weekday, week_start: Weekday) -> i8 {
    (day.to_monday_zero_offset() - week_start.to_monday_zero_offset()).rem_euclid(7)
}

/// First day of week 1: the first week with at least four days in `year`.
fn week_one_start(year: i16, week_start: Weekday) -> Option<Date> {
    let jan1 = Date::new(year, 1, 1).ok()?;
    let offset = i64::from(days_since(jan1.weekday(), week_start));
    match offset <= 3 {
        true => jan1.checked_sub(offset.days()).ok(),
        false => jan1.checked_add((7 - offset).days()).ok(),
    }
}

fn days_between(from: Date, to: Date) -> i64 {
    to.to_datetime(Time::midnight())
        .duration_since(from.to_datetime(Time::midnight()))
        .as_hours()
        / 24
}

fn weeks_in_year(year: i16, week_start: Weekday) -> Option<i16> {
    let this = week_one_start(year, week_start)?;
    let next = week_one_start(year.checked_add(1)?, week_start)?;
    i16::try_from(days_between(this, next) / 7).ok()
}

/// Week-numbering year and week number of `date`.
fn week_of(date: Date, week_start: Weekday) -> Option<(i16, i16)> {
    let year = date.year();
    let this = week_one_start(year, week_start)?;
    if date < this {
        let prev_year = year.checked_sub(1)?;
        let prev = week_one_start(prev_year, week_start)?;
        let week = i16::try_from(days_between(prev, date) / 7 + 1).ok()?;
        return Some((prev_year, week));
    }

    if let Some(next) = year
        .checked_add(1)
        .and_then(|y| week_one_start(y, week_start))
        && date >= next
    {
        return Some((year + 1, 1));
    }

    let week = i16::try_from(days_between(this, date) / 7 + 1).ok()?;
    Some((year, week))
}
