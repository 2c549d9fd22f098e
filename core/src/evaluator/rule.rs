// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::cell::RefCell;

use jiff::SignedDuration;
use jiff::civil::DateTime;
use recurcal_ical::RecurrenceUntil;

use crate::config::EvaluationContext;
use crate::datetime::{Instant, Period};
use crate::error::{RecurError, Result};
use crate::evaluator::cache::EvaluationCache;
use crate::evaluator::expand::Expansion;
use crate::rule::RecurrenceRule;

/// Largest difference between two wall clocks of the same instant.
const WALL_CLOCK_MARGIN: SignedDuration = SignedDuration::from_hours(26);

/// Evaluates one recurrence rule, remembering what it already computed.
///
/// The cache lives in a [`RefCell`], so an evaluator can move between
/// threads but cannot be shared by them.
#[derive(Debug)]
pub struct RecurrenceRuleEvaluator {
    rule: RecurrenceRule,
    cache: RefCell<EvaluationCache>,
}

impl RecurrenceRuleEvaluator {
    /// Evaluator for `rule` with an empty cache.
    #[must_use]
    pub fn new(rule: RecurrenceRule) -> Self {
        Self {
            rule,
            cache: RefCell::new(EvaluationCache::default()),
        }
    }

    /// The evaluated rule.
    #[must_use]
    pub fn rule(&self) -> &RecurrenceRule {
        &self.rule
    }

    /// Forget all computed periods.
    pub fn clear(&self) {
        self.cache.borrow_mut().clear();
    }

    /// Periods of the rule seeded at `seed` starting within `[from, to)`.
    ///
    /// With `include_seed` the seed is always the first occurrence and counts
    /// toward COUNT. Periods have no extent of their own.
    ///
    /// Only the parts of the window not queried before are expanded. Cached
    /// periods are dropped when the seed or the context differs from the
    /// previous call.
    ///
    /// ## Errors
    ///
    /// Returns [`RecurError::RecurrenceUnresolvable`] if the rule keeps
    /// producing empty periods, or a zone error.
    pub fn evaluate(
        &self,
        seed: &Instant,
        from: &Instant,
        to: &Instant,
        include_seed: bool,
        ctx: &EvaluationContext,
    ) -> Result<Vec<Period>> {
        if to.timestamp() <= from.timestamp() {
            return Ok(Vec::new());
        }

        let mut cache = self.cache.borrow_mut();
        cache.prepare(seed, include_seed, ctx);
        for (start, end) in cache.missing(from, to) {
            let periods = self.expand(seed, &start, &end, include_seed, ctx)?;
            tracing::trace!(rule = %self.rule, %start, %end, new = periods.len(), "extended cache");
            cache.insert(start, end, periods);
        }

        let periods = cache.within(from, to);
        tracing::trace!(
            rule = %self.rule,
            cached = cache.len(),
            hits = periods.len(),
            "evaluated rule"
        );
        Ok(periods)
    }

    fn expand(
        &self,
        seed: &Instant,
        from: &Instant,
        to: &Instant,
        include_seed: bool,
        ctx: &EvaluationContext,
    ) -> Result<Vec<Period>> {
        let wall_of = |instant: &Instant| -> Result<DateTime> {
            Ok(instant.to_zone(seed.zone().clone(), ctx)?.wall())
        };

        let until = match self.rule.until() {
            None => None,
            Some(RecurrenceUntil::Date(date)) => {
                let date = date
                    .civil_date()
                    .map_err(|_| RecurError::InvalidDateComponents {
                        year: date.year.into(),
                        month: date.month.into(),
                        day: date.day.into(),
                    })?;
                Some(date.at(23, 59, 59, 0))
            }
            Some(RecurrenceUntil::DateTime(value)) => {
                let until = Instant::from_value_date_time(&value, seed.tzid(), ctx)?;
                Some(wall_of(&until)?)
            }
        };

        let mut expansion = Expansion::new(&self.rule, seed.wall(), !seed.has_time())
            .until(until)
            .horizon(wall_of(to)?.checked_add(WALL_CLOCK_MARGIN).ok())
            .include_seed(include_seed)
            .max_empty_steps(ctx.max_empty_steps());
        if let Ok(hint) = wall_of(from)?.checked_sub(WALL_CLOCK_MARGIN) {
            expansion = expansion.start_hint(hint);
        }

        let mut periods = Vec::new();
        for wall in expansion {
            let wall = wall?;
            let start = match seed.has_time() {
                true => Instant::new(wall, seed.zone().clone(), ctx)?,
                false => Instant::date(wall.date(), seed.zone().clone(), ctx)?,
            };
            let period = Period::new(start, ctx)?;
            if period.starts_within(from, to) {
                periods.push(period);
            }
        }
        tracing::debug!(rule = %self.rule, %from, %to, found = periods.len(), "expanded rule");
        Ok(periods)
    }
}

impl Clone for RecurrenceRuleEvaluator {
    /// The clone starts with an empty cache.
    fn clone(&self) -> Self {
        Self::new(self.rule.clone())
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use std::sync::Arc;

    use super::*;
    use crate::datetime::Zone;
    use crate::tz::TzDatabase;

    fn at(ctx: &EvaluationContext, y: i16, m: i8, d: i8, h: i8) -> Instant {
        Instant::new(date(y, m, d).at(h, 0, 0, 0), Zone::Utc, ctx).unwrap()
    }

    #[test]
    fn filters_to_window() {
        let ctx = EvaluationContext::utc();
        let eval = RecurrenceRuleEvaluator::new("FREQ=DAILY".parse().unwrap());
        let seed = at(&ctx, 2024, 1, 1, 9);

        let got = eval
            .evaluate(&seed, &at(&ctx, 2024, 1, 10, 0), &at(&ctx, 2024, 1, 13, 0), false, &ctx)
            .unwrap();
        let days: Vec<_> = got.iter().map(|p| p.start().date_part().day()).collect();
        assert_eq!(days, [10, 11, 12]);
    }

    #[test]
    fn count_is_counted_from_seed() {
        let ctx = EvaluationContext::utc();
        let eval = RecurrenceRuleEvaluator::new("FREQ=DAILY;COUNT=5".parse().unwrap());
        let seed = at(&ctx, 2024, 1, 1, 9);

        let got = eval
            .evaluate(&seed, &at(&ctx, 2024, 1, 4, 0), &at(&ctx, 2024, 2, 1, 0), false, &ctx)
            .unwrap();
        assert_eq!(got.len(), 2);
    }

    #[test]
    fn utc_until_applies_to_zoned_seed() {
        let ctx = EvaluationContext::utc();
        let eval =
            RecurrenceRuleEvaluator::new("FREQ=DAILY;UNTIL=20240103T140000Z".parse().unwrap());
        let zone = Zone::Named("America/New_York".into());
        // 09:00 EST is 14:00Z
        let seed = Instant::new(date(2024, 1, 1).at(9, 0, 0, 0), zone, &ctx).unwrap();

        let got = eval
            .evaluate(&seed, &at(&ctx, 2023, 12, 1, 0), &at(&ctx, 2024, 2, 1, 0), false, &ctx)
            .unwrap();
        assert_eq!(got.len(), 3);
        assert_eq!(got[2].start().wall(), date(2024, 1, 3).at(9, 0, 0, 0));
    }

    #[test]
    fn disjoint_windows_expand_only_what_is_queried() {
        let ctx = EvaluationContext::utc();
        let eval = RecurrenceRuleEvaluator::new("FREQ=MINUTELY".parse().unwrap());
        let seed = at(&ctx, 2024, 1, 1, 0);

        let first = eval
            .evaluate(&seed, &at(&ctx, 2024, 1, 1, 0), &at(&ctx, 2024, 1, 2, 0), false, &ctx)
            .unwrap();
        let second = eval
            .evaluate(&seed, &at(&ctx, 2026, 1, 1, 0), &at(&ctx, 2026, 1, 2, 0), false, &ctx)
            .unwrap();
        assert_eq!(first.len(), 1440);
        assert_eq!(second.len(), 1440);
        assert_eq!(eval.cache.borrow().len(), 2 * 1440);

        let gap = eval
            .evaluate(&seed, &at(&ctx, 2024, 1, 1, 12), &at(&ctx, 2024, 1, 3, 0), false, &ctx)
            .unwrap();
        assert_eq!(gap.len(), 36 * 60);
        assert_eq!(eval.cache.borrow().len(), 3 * 1440);
    }

    #[test]
    fn other_context_discards_cache() {
        let ctx = EvaluationContext::utc();
        let eval = RecurrenceRuleEvaluator::new("FREQ=DAILY".parse().unwrap());
        let seed = Instant::new(date(2024, 1, 1).at(9, 0, 0, 0), Zone::Floating, &ctx).unwrap();
        let (from, to) = (at(&ctx, 2024, 1, 1, 0), at(&ctx, 2024, 1, 4, 0));
        let hours = |got: Vec<Period>| -> Vec<_> {
            got.iter().map(|p| p.start().to_utc().wall().hour()).collect()
        };

        assert_eq!(hours(eval.evaluate(&seed, &from, &to, false, &ctx).unwrap()), [9, 9, 9]);

        let tokyo = EvaluationContext::new(Arc::new(TzDatabase::new()), "Asia/Tokyo");
        let seed = Instant::new(seed.wall(), Zone::Floating, &tokyo).unwrap();
        assert_eq!(hours(eval.evaluate(&seed, &from, &to, false, &tokyo).unwrap()), [0, 0, 0]);
    }

    #[test]
    fn empty_window() {
        let ctx = EvaluationContext::utc();
        let eval = RecurrenceRuleEvaluator::new("FREQ=DAILY".parse().unwrap());
        let seed = at(&ctx, 2024, 1, 1, 9);
        let t = at(&ctx, 2024, 1, 5, 0);
        assert!(eval.evaluate(&seed, &t, &t, false, &ctx).unwrap().is_empty());
    }
}
