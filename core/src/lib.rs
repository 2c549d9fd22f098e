// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Evaluate the occurrences of recurring iCalendar (RFC 5545) events, to-dos
//! and journals within a time window.
//!
//! ```
//! use jiff::civil::date;
//! use recurcal_core::{
//!     CalendarItem, EvaluationContext, Instant, OccurrenceCollector, RecurringComponent, VEvent,
//!     Zone,
//! };
//!
//! let ctx = EvaluationContext::utc();
//! let start = Instant::new(date(2024, 1, 1).at(9, 0, 0, 0), Zone::Utc, &ctx)?;
//! let standup = CalendarItem::from(VEvent::new(
//!     RecurringComponent::new("standup")
//!         .with_start(start)
//!         .with_rule("FREQ=WEEKLY;BYDAY=MO,WE,FR".parse()?),
//! ));
//!
//! let from = Instant::date(date(2024, 1, 1), Zone::Utc, &ctx)?;
//! let to = from.add_weeks(1, &ctx)?;
//! let occurrences = OccurrenceCollector::new(ctx).collect([&standup], &from, &to)?;
//! assert_eq!(occurrences.len(), 3);
//! # Ok::<(), recurcal_core::RecurError>(())
//! ```

mod component;
mod config;
mod datetime;
mod error;
mod evaluator;
mod occurrence;
mod rule;
mod tz;

pub use crate::component::{CalendarItem, Recurring, RecurringComponent, VEvent, VJournal, VTodo};
pub use crate::config::{DEFAULT_MAX_EMPTY_STEPS, EvaluationConfig, EvaluationContext};
pub use crate::datetime::{Instant, Period, Zone};
pub use crate::error::{RecurError, Result};
pub use crate::evaluator::{
    PeriodList, PeriodListEvaluator, RecurrenceRuleEvaluator, RecurringItemEvaluator,
};
pub use crate::occurrence::{Occurrence, OccurrenceCollector};
pub use crate::rule::{
    Frequency, RecurrenceRule, RecurrenceRuleBuilder, RecurrenceUntil, Termination, WeekDay,
    WeekDayNum,
};
pub use crate::tz::{
    CalendarTimeZones, Observance, ObservanceKind, TimeZoneProvider, TzDatabase, VTimeZone,
};
