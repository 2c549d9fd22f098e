// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::hash::{Hash, Hasher};
use std::ptr;

use jiff::civil;

use crate::component::{CalendarItem, Recurring};
use crate::config::EvaluationContext;
use crate::datetime::{Instant, Period, Zone};
use crate::error::Result;

/// One occurrence of a calendar item.
///
/// Two occurrences are equal when they cover the same period and come from
/// the very same item.
#[derive(Debug, Clone)]
pub struct Occurrence<'a> {
    period: Period,
    source: &'a CalendarItem,
}

impl<'a> Occurrence<'a> {
    #[must_use]
    pub fn new(period: Period, source: &'a CalendarItem) -> Self {
        Self { period, source }
    }

    /// The time span of the occurrence.
    #[must_use]
    pub fn period(&self) -> &Period {
        &self.period
    }

    /// The item this occurrence belongs to.
    #[must_use]
    pub fn source(&self) -> &'a CalendarItem {
        self.source
    }
}

impl PartialEq for Occurrence<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.period == other.period && ptr::eq(self.source, other.source)
    }
}

impl Eq for Occurrence<'_> {}

impl PartialOrd for Occurrence<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Occurrence<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.period
            .cmp(&other.period)
            .then_with(|| ptr::from_ref(self.source).cmp(&ptr::from_ref(other.source)))
    }
}

impl Hash for Occurrence<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.period.hash(state);
        ptr::hash(self.source, state);
    }
}

/// Collects the occurrences of a set of calendar items.
#[derive(Debug, Clone)]
pub struct OccurrenceCollector {
    ctx: EvaluationContext,
}

impl OccurrenceCollector {
    #[must_use]
    pub fn new(ctx: EvaluationContext) -> Self {
        Self { ctx }
    }

    #[must_use]
    pub fn context(&self) -> &EvaluationContext {
        &self.ctx
    }

    /// Occurrences of all items starting within `[from, to)`, ordered by
    /// start.
    ///
    /// Items sharing a UID form one recurrence set. An override, an item with
    /// a RECURRENCE-ID, replaces the occurrences of its masters on that date.
    ///
    /// ## Errors
    ///
    /// Fails if any item fails to evaluate.
    #[tracing::instrument(skip_all, fields(%from, %to))]
    pub fn collect<'a>(
        &self,
        items: impl IntoIterator<Item = &'a CalendarItem>,
        from: &Instant,
        to: &Instant,
    ) -> Result<BTreeSet<Occurrence<'a>>> {
        let mut groups: BTreeMap<&str, Vec<&'a CalendarItem>> = BTreeMap::new();
        for item in items {
            groups.entry(item.uid()).or_default().push(item);
        }

        let mut occurrences = BTreeSet::new();
        for (uid, group) in groups {
            let overrides: Vec<&Instant> =
                group.iter().filter_map(|item| item.recurrence_id()).collect();

            for &item in &group {
                for period in item.evaluate(from, to, &self.ctx)? {
                    if item.recurrence_id().is_none() && self.is_overridden(&period, &overrides)? {
                        tracing::trace!(uid, %period, "occurrence replaced by override");
                        continue;
                    }
                    occurrences.insert(Occurrence::new(period, item));
                }
            }
        }

        tracing::debug!(count = occurrences.len(), "collected occurrences");
        Ok(occurrences)
    }

    /// Occurrences starting on `date`, midnight to midnight in the floating
    /// zone.
    ///
    /// ## Errors
    ///
    /// Fails if any item fails to evaluate.
    pub fn collect_day<'a>(
        &self,
        items: impl IntoIterator<Item = &'a CalendarItem>,
        date: civil::Date,
    ) -> Result<BTreeSet<Occurrence<'a>>> {
        let from = Instant::date(date, Zone::Floating, &self.ctx)?;
        let to = from.add_days(1, &self.ctx)?;
        self.collect(items, &from, &to)
    }

    /// Whether an override falls on the date of `period`. A timed
    /// RECURRENCE-ID is compared in the zone of a timed occurrence.
    fn is_overridden(&self, period: &Period, overrides: &[&Instant]) -> Result<bool> {
        let start = period.start();
        for rid in overrides {
            let date = match rid.has_time() && start.has_time() {
                true => rid.to_zone(start.zone().clone(), &self.ctx)?.date_part(),
                false => rid.date_part(),
            };
            if date == start.date_part() {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use super::*;
    use crate::component::{RecurringComponent, VEvent};

    #[test]
    fn same_period_from_distinct_items_is_kept_twice() {
        let ctx = EvaluationContext::utc();
        let start = Instant::new(date(2024, 1, 1).at(9, 0, 0, 0), Zone::Utc, &ctx).unwrap();
        let item = |uid: &str| {
            CalendarItem::from(VEvent::new(
                RecurringComponent::new(uid).with_start(start.clone()),
            ))
        };
        let (a, b) = (item("a"), item("b"));

        let period = Period::new(start, &ctx).unwrap();
        let set = BTreeSet::from([
            Occurrence::new(period.clone(), &a),
            Occurrence::new(period.clone(), &b),
            Occurrence::new(period, &a),
        ]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn collects_one_day() {
        let ctx = EvaluationContext::utc();
        let start = Instant::new(date(2024, 1, 1).at(9, 0, 0, 0), Zone::Floating, &ctx).unwrap();
        let item = CalendarItem::from(VEvent::new(
            RecurringComponent::new("a")
                .with_start(start)
                .with_rule("FREQ=DAILY".parse().unwrap()),
        ));

        let collector = OccurrenceCollector::new(ctx);
        let got = collector.collect_day([&item], date(2024, 1, 5)).unwrap();
        assert_eq!(got.len(), 1);
        let first = got.first().unwrap();
        assert_eq!(first.period().start().wall(), date(2024, 1, 5).at(9, 0, 0, 0));
        assert!(ptr::eq(first.source(), &item));
    }
}
