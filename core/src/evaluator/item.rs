// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::{BTreeSet, HashSet};

use jiff::Timestamp;
use jiff::civil::Date;

use crate::component::RecurringComponent;
use crate::config::EvaluationContext;
use crate::datetime::{Instant, Period};
use crate::error::Result;
use crate::evaluator::period_list::PeriodListEvaluator;
use crate::evaluator::rule::RecurrenceRuleEvaluator;
use crate::rule::RecurrenceRule;

/// Combines the rules and date lists of one item into its occurrences.
#[derive(Debug, Clone, Default)]
pub struct RecurringItemEvaluator {
    rules: Vec<RecurrenceRuleEvaluator>,
    exception_rules: Vec<RecurrenceRuleEvaluator>,
}

impl RecurringItemEvaluator {
    /// Evaluator over RRULEs and EXRULEs.
    #[must_use]
    pub fn new(rules: Vec<RecurrenceRule>, exception_rules: Vec<RecurrenceRule>) -> Self {
        Self {
            rules: rules.into_iter().map(RecurrenceRuleEvaluator::new).collect(),
            exception_rules: exception_rules
                .into_iter()
                .map(RecurrenceRuleEvaluator::new)
                .collect(),
        }
    }

    /// The RRULEs.
    pub fn rules(&self) -> impl Iterator<Item = &RecurrenceRule> {
        self.rules.iter().map(RecurrenceRuleEvaluator::rule)
    }

    /// The EXRULEs.
    pub fn exception_rules(&self) -> impl Iterator<Item = &RecurrenceRule> {
        self.exception_rules.iter().map(RecurrenceRuleEvaluator::rule)
    }

    pub(crate) fn push_rule(&mut self, rule: RecurrenceRule) {
        self.rules.push(RecurrenceRuleEvaluator::new(rule));
    }

    pub(crate) fn push_exception_rule(&mut self, rule: RecurrenceRule) {
        self.exception_rules.push(RecurrenceRuleEvaluator::new(rule));
    }

    pub(crate) fn set_rules(&mut self, rules: Vec<RecurrenceRule>) {
        self.rules = rules.into_iter().map(RecurrenceRuleEvaluator::new).collect();
    }

    pub(crate) fn set_exception_rules(&mut self, rules: Vec<RecurrenceRule>) {
        self.exception_rules = rules.into_iter().map(RecurrenceRuleEvaluator::new).collect();
    }

    /// Drop the caches of every rule.
    pub fn clear(&self) {
        for rule in self.rules.iter().chain(&self.exception_rules) {
            rule.clear();
        }
    }

    /// Occurrences of `item` starting within `[from, to)`, exclusions
    /// removed and the item duration applied.
    ///
    /// ## Errors
    ///
    /// Fails if any rule or date list fails to evaluate.
    #[tracing::instrument(skip_all, fields(uid = item.uid(), %from, %to))]
    pub fn evaluate(
        &self,
        item: &RecurringComponent,
        include_seed: bool,
        from: &Instant,
        to: &Instant,
        ctx: &EvaluationContext,
    ) -> Result<BTreeSet<Period>> {
        let Some(start) = item.start() else {
            tracing::debug!("item has no start");
            return Ok(BTreeSet::new());
        };

        let mut included = BTreeSet::new();
        for rule in &self.rules {
            included.extend(rule.evaluate(start, from, to, include_seed, ctx)?);
        }
        let reference = include_seed.then_some(start);
        for list in item.recurrence_dates() {
            let periods = PeriodListEvaluator::new(list).evaluate(reference, ctx)?;
            included.extend(periods.into_iter().filter(|p| p.starts_within(from, to)));
        }
        let seed = Period::new(start.clone(), ctx)?;
        if seed.starts_within(from, to) {
            included.insert(seed);
        }

        let mut excluded = Exclusions::default();
        for rule in &self.exception_rules {
            for period in rule.evaluate(start, from, to, false, ctx)? {
                excluded.add(period.start());
            }
        }
        for list in item.exception_dates() {
            for period in PeriodListEvaluator::new(list).evaluate(None, ctx)? {
                excluded.add(period.start());
            }
        }

        let duration = item.occurrence_duration()?;
        let occurrences = included
            .into_iter()
            .filter(|p| !excluded.contains(p.start()))
            .map(|p| match (p.has_extent(), duration) {
                (false, Some(duration)) => Period::with_duration(p.start().clone(), duration, ctx),
                _ => Ok(p),
            })
            .collect::<Result<BTreeSet<_>>>()?;

        tracing::debug!(count = occurrences.len(), "evaluated occurrences");
        Ok(occurrences)
    }
}

/// Date-only exclusions match by calendar date, others by instant.
#[derive(Debug, Default)]
struct Exclusions {
    dates: HashSet<Date>,
    instants: HashSet<Timestamp>,
}

impl Exclusions {
    fn add(&mut self, start: &Instant) {
        match start.has_time() {
            true => self.instants.insert(start.timestamp()),
            false => self.dates.insert(start.date_part()),
        };
    }

    fn contains(&self, start: &Instant) -> bool {
        self.instants.contains(&start.timestamp()) || self.dates.contains(&start.date_part())
    }
}
