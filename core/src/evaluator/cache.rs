// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeSet;
use std::mem;

use crate::config::EvaluationContext;
use crate::datetime::{Instant, Period};

/// Periods already computed for one rule, and the disjoint windows
/// `[start, end)` in which they are known to be complete.
#[derive(Debug, Default)]
pub(crate) struct EvaluationCache {
    seed: Option<(Instant, bool)>,
    ctx: Option<EvaluationContext>,
    covered: Vec<(Instant, Instant)>,
    periods: BTreeSet<Period>,
}

impl EvaluationCache {
    /// Drop everything computed for another seed or under another context.
    pub(crate) fn prepare(&mut self, seed: &Instant, include_seed: bool, ctx: &EvaluationContext) {
        let same_seed = self
            .seed
            .as_ref()
            .is_some_and(|(s, inc)| s == seed && s.wall() == seed.wall() && *inc == include_seed);
        let same_ctx = self.ctx.as_ref().is_some_and(|c| c.is_same(ctx));
        if !(same_seed && same_ctx) {
            self.clear();
            self.seed = Some((seed.clone(), include_seed));
            self.ctx = Some(ctx.clone());
        }
    }

    pub(crate) fn clear(&mut self) {
        self.seed = None;
        self.ctx = None;
        self.covered.clear();
        self.periods.clear();
    }

    #[cfg(test)]
    pub(crate) fn covered(&self) -> &[(Instant, Instant)] {
        &self.covered
    }

    /// Parts of `[from, to)` not covered yet, in order.
    pub(crate) fn missing(&self, from: &Instant, to: &Instant) -> Vec<(Instant, Instant)> {
        let mut missing = Vec::new();
        let mut cursor = from.clone();
        for (start, end) in &self.covered {
            if start.timestamp() >= to.timestamp() {
                break;
            }
            if end.timestamp() <= cursor.timestamp() {
                continue;
            }
            if start.timestamp() > cursor.timestamp() {
                missing.push((cursor, start.clone()));
            }
            cursor = end.clone();
        }
        if cursor.timestamp() < to.timestamp() {
            missing.push((cursor, to.clone()));
        }
        missing
    }

    /// Record the periods of a window that was fully expanded. Windows that
    /// overlap or touch are merged.
    pub(crate) fn insert(&mut self, from: Instant, to: Instant, periods: Vec<Period>) {
        self.periods.extend(periods);
        self.covered.push((from, to));
        self.covered.sort_by_key(|(start, _)| start.timestamp());

        let mut merged: Vec<(Instant, Instant)> = Vec::with_capacity(self.covered.len());
        for (start, end) in mem::take(&mut self.covered) {
            match merged.last_mut() {
                Some((_, last)) if start.timestamp() <= last.timestamp() => {
                    if end.timestamp() > last.timestamp() {
                        *last = end;
                    }
                }
                _ => merged.push((start, end)),
            }
        }
        self.covered = merged;
    }

    /// Cached periods starting within `[from, to)`.
    pub(crate) fn within(&self, from: &Instant, to: &Instant) -> Vec<Period> {
        self.periods
            .iter()
            .filter(|p| p.starts_within(from, to))
            .cloned()
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.periods.len()
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use super::*;
    use crate::datetime::Zone;

    #[test]
    fn tracks_uncovered_ranges() {
        let ctx = EvaluationContext::utc();
        let day = |d| Instant::date(date(2024, 1, d), Zone::Utc, &ctx).unwrap();

        let mut cache = EvaluationCache::default();
        cache.prepare(&day(1), false, &ctx);
        assert_eq!(cache.missing(&day(10), &day(20)), [(day(10), day(20))]);

        cache.insert(day(10), day(20), vec![Period::new(day(12), &ctx).unwrap()]);
        assert!(cache.missing(&day(12), &day(18)).is_empty());
        assert_eq!(cache.missing(&day(5), &day(25)), [(day(5), day(10)), (day(20), day(25))]);

        // a disjoint query leaves the gap alone
        assert_eq!(cache.missing(&day(25), &day(28)), [(day(25), day(28))]);
        cache.insert(day(25), day(28), Vec::new());
        assert_eq!(cache.covered(), [(day(10), day(20)), (day(25), day(28))]);

        assert_eq!(
            cache.missing(&day(15), &day(30)),
            [(day(20), day(25)), (day(28), day(30))]
        );
        cache.insert(day(20), day(25), Vec::new());
        assert_eq!(cache.covered(), [(day(10), day(28))]);

        assert_eq!(cache.within(&day(1), &day(31)).len(), 1);
        assert!(cache.within(&day(13), &day(31)).is_empty());
    }

    #[test]
    fn resets_for_new_seed_or_context() {
        let ctx = EvaluationContext::utc();
        let day = |d| Instant::date(date(2024, 1, d), Zone::Utc, &ctx).unwrap();

        let mut cache = EvaluationCache::default();
        cache.prepare(&day(1), false, &ctx);
        cache.insert(day(1), day(5), vec![Period::new(day(2), &ctx).unwrap()]);
        cache.prepare(&day(1), false, &ctx.clone());
        assert_eq!(cache.len(), 1);

        cache.prepare(&day(2), false, &ctx);
        assert_eq!(cache.len(), 0);
        assert!(cache.covered().is_empty());

        cache.insert(day(1), day(5), vec![Period::new(day(2), &ctx).unwrap()]);
        cache.prepare(&day(2), false, &ctx.clone().with_max_empty_steps(3));
        assert_eq!(cache.len(), 0);
    }
}
