// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Calendar items that can recur.

use std::collections::BTreeSet;

use recurcal_ical::ValueDuration;

use crate::config::EvaluationContext;
use crate::datetime::{Instant, Period};
use crate::error::Result;
use crate::evaluator::{PeriodList, RecurringItemEvaluator};
use crate::rule::RecurrenceRule;

/// Recurrence data shared by events, to-dos and journals.
///
/// Every setter drops the evaluation caches, so results always reflect the
/// current state of the item.
#[derive(Debug, Clone, Default)]
pub struct RecurringComponent {
    uid: String,
    start: Option<Instant>,
    end: Option<Instant>,
    duration: Option<ValueDuration>,
    recurrence_id: Option<Instant>,
    recurrence_dates: Vec<PeriodList>,
    exception_dates: Vec<PeriodList>,
    evaluator: RecurringItemEvaluator,
}

impl RecurringComponent {
    /// An item with the given UID and nothing else.
    #[must_use]
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            ..Self::default()
        }
    }

    /// Set DTSTART.
    #[must_use]
    pub fn with_start(mut self, start: Instant) -> Self {
        self.set_start(Some(start));
        self
    }

    /// Set DTEND, or DUE for a to-do.
    #[must_use]
    pub fn with_end(mut self, end: Instant) -> Self {
        self.set_end(Some(end));
        self
    }

    /// Set DURATION.
    #[must_use]
    pub fn with_duration(mut self, duration: ValueDuration) -> Self {
        self.set_duration(Some(duration));
        self
    }

    /// Set RECURRENCE-ID, marking this item as an override.
    #[must_use]
    pub fn with_recurrence_id(mut self, recurrence_id: Instant) -> Self {
        self.set_recurrence_id(Some(recurrence_id));
        self
    }

    /// Add an RRULE.
    #[must_use]
    pub fn with_rule(mut self, rule: RecurrenceRule) -> Self {
        self.add_rule(rule);
        self
    }

    /// Add an EXRULE.
    #[must_use]
    pub fn with_exception_rule(mut self, rule: RecurrenceRule) -> Self {
        self.add_exception_rule(rule);
        self
    }

    /// Add an RDATE property.
    #[must_use]
    pub fn with_recurrence_dates(mut self, dates: PeriodList) -> Self {
        self.add_recurrence_dates(dates);
        self
    }

    /// Add an EXDATE property.
    #[must_use]
    pub fn with_exception_dates(mut self, dates: PeriodList) -> Self {
        self.add_exception_dates(dates);
        self
    }

    pub fn set_start(&mut self, start: Option<Instant>) {
        self.start = start;
        self.clear_evaluation();
    }

    pub fn set_end(&mut self, end: Option<Instant>) {
        self.end = end;
        self.clear_evaluation();
    }

    pub fn set_duration(&mut self, duration: Option<ValueDuration>) {
        self.duration = duration;
        self.clear_evaluation();
    }

    pub fn set_recurrence_id(&mut self, recurrence_id: Option<Instant>) {
        self.recurrence_id = recurrence_id;
        self.clear_evaluation();
    }

    pub fn add_rule(&mut self, rule: RecurrenceRule) {
        self.evaluator.push_rule(rule);
        self.clear_evaluation();
    }

    /// Replace all RRULEs.
    pub fn set_rules(&mut self, rules: Vec<RecurrenceRule>) {
        self.evaluator.set_rules(rules);
    }

    pub fn add_exception_rule(&mut self, rule: RecurrenceRule) {
        self.evaluator.push_exception_rule(rule);
        self.clear_evaluation();
    }

    pub fn set_exception_rules(&mut self, rules: Vec<RecurrenceRule>) {
        self.evaluator.set_exception_rules(rules);
    }

    pub fn add_recurrence_dates(&mut self, dates: PeriodList) {
        self.recurrence_dates.push(dates);
        self.clear_evaluation();
    }

    pub fn add_exception_dates(&mut self, dates: PeriodList) {
        self.exception_dates.push(dates);
        self.clear_evaluation();
    }

    /// The UID.
    #[must_use]
    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// DTSTART, the first occurrence and the seed of every rule.
    #[must_use]
    pub fn start(&self) -> Option<&Instant> {
        self.start.as_ref()
    }

    /// DTEND or DUE.
    #[must_use]
    pub fn end(&self) -> Option<&Instant> {
        self.end.as_ref()
    }

    #[must_use]
    pub fn duration(&self) -> Option<ValueDuration> {
        self.duration
    }

    #[must_use]
    pub fn recurrence_id(&self) -> Option<&Instant> {
        self.recurrence_id.as_ref()
    }

    pub fn rules(&self) -> impl Iterator<Item = &RecurrenceRule> {
        self.evaluator.rules()
    }

    pub fn exception_rules(&self) -> impl Iterator<Item = &RecurrenceRule> {
        self.evaluator.exception_rules()
    }

    #[must_use]
    pub fn recurrence_dates(&self) -> &[PeriodList] {
        &self.recurrence_dates
    }

    #[must_use]
    pub fn exception_dates(&self) -> &[PeriodList] {
        &self.exception_dates
    }

    /// Length of each occurrence: the end minus the start, else DURATION.
    /// `None` leaves the default extent of a [`Period`].
    ///
    /// ## Errors
    ///
    /// Returns [`crate::RecurError::InvalidPeriod`] if the end is before the
    /// start.
    pub fn occurrence_duration(&self) -> Result<Option<ValueDuration>> {
        match (&self.start, &self.end) {
            (Some(start), Some(end)) if start.timestamp() == end.timestamp() => {
                Ok(Some(ValueDuration::seconds(0)))
            }
            (Some(start), Some(end)) => {
                Ok(Some(Period::with_end(start.clone(), end.clone())?.duration()))
            }
            _ => Ok(self.duration),
        }
    }

    /// Occurrences starting within `[from, to)`.
    ///
    /// ## Errors
    ///
    /// Fails if any rule or date list of the item fails to evaluate.
    pub fn evaluate(
        &self,
        include_seed: bool,
        from: &Instant,
        to: &Instant,
        ctx: &EvaluationContext,
    ) -> Result<BTreeSet<Period>> {
        self.evaluator.evaluate(self, include_seed, from, to, ctx)
    }

    /// Drop every cached evaluation result.
    pub fn clear_evaluation(&self) {
        self.evaluator.clear();
    }
}

/// An item whose occurrences can be evaluated.
pub trait Recurring {
    fn component(&self) -> &RecurringComponent;

    fn component_mut(&mut self) -> &mut RecurringComponent;

    /// Whether DTSTART counts as an occurrence of the rules even when it does
    /// not match them.
    fn includes_reference_date(&self) -> bool {
        false
    }

    /// Occurrences starting within `[from, to)`.
    ///
    /// ## Errors
    ///
    /// Fails if any rule or date list of the item fails to evaluate.
    fn evaluate(
        &self,
        from: &Instant,
        to: &Instant,
        ctx: &EvaluationContext,
    ) -> Result<BTreeSet<Period>> {
        self.component()
            .evaluate(self.includes_reference_date(), from, to, ctx)
    }

    fn clear_evaluation(&self) {
        self.component().clear_evaluation();
    }
}

macro_rules! recurring_item {
    ($(#[$meta:meta])* $name:ident, $includes_reference_date:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default)]
        pub struct $name(RecurringComponent);

        impl $name {
            #[must_use]
            pub fn new(component: RecurringComponent) -> Self {
                Self(component)
            }

            #[must_use]
            pub fn into_inner(self) -> RecurringComponent {
                self.0
            }
        }

        impl From<RecurringComponent> for $name {
            fn from(component: RecurringComponent) -> Self {
                Self(component)
            }
        }

        impl Recurring for $name {
            fn component(&self) -> &RecurringComponent {
                &self.0
            }

            fn component_mut(&mut self) -> &mut RecurringComponent {
                &mut self.0
            }

            fn includes_reference_date(&self) -> bool {
                $includes_reference_date
            }
        }
    };
}

recurring_item!(
    /// A VEVENT.
    VEvent,
    false
);

recurring_item!(
    /// A VTODO. DUE is stored as the end.
    VTodo,
    true
);

recurring_item!(
    /// A VJOURNAL.
    VJournal,
    false
);

/// Any recurring calendar component.
#[derive(Debug, Clone)]
pub enum CalendarItem {
    Event(VEvent),
    Todo(VTodo),
    Journal(VJournal),
}

impl CalendarItem {
    #[must_use]
    pub fn uid(&self) -> &str {
        self.component().uid()
    }

    #[must_use]
    pub fn recurrence_id(&self) -> Option<&Instant> {
        self.component().recurrence_id()
    }
}

impl Recurring for CalendarItem {
    fn component(&self) -> &RecurringComponent {
        match self {
            Self::Event(item) => item.component(),
            Self::Todo(item) => item.component(),
            Self::Journal(item) => item.component(),
        }
    }

    fn component_mut(&mut self) -> &mut RecurringComponent {
        match self {
            Self::Event(item) => item.component_mut(),
            Self::Todo(item) => item.component_mut(),
            Self::Journal(item) => item.component_mut(),
        }
    }

    fn includes_reference_date(&self) -> bool {
        match self {
            Self::Event(item) => item.includes_reference_date(),
            Self::Todo(item) => item.includes_reference_date(),
            Self::Journal(item) => item.includes_reference_date(),
        }
    }
}

impl From<VEvent> for CalendarItem {
    fn from(item: VEvent) -> Self {
        Self::Event(item)
    }
}

impl From<VTodo> for CalendarItem {
    fn from(item: VTodo) -> Self {
        Self::Todo(item)
    }
}

impl From<VJournal> for CalendarItem {
    fn from(item: VJournal) -> Self {
        Self::Journal(item)
    }
}
