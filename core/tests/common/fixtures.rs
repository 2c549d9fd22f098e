// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Test data factories.

#![allow(dead_code)]

use jiff::civil::date;
use jiff::tz::Offset;
use recurcal_core::{
    CalendarItem, EvaluationContext, Instant, Observance, ObservanceKind, RecurringComponent,
    VEvent, VTimeZone, VTodo, Zone,
};

pub const NEW_YORK: &str = "America/New_York";

/// A UTC date-time at the top of the hour.
pub fn utc(ctx: &EvaluationContext, y: i16, m: i8, d: i8, h: i8) -> Instant {
    Instant::new(date(y, m, d).at(h, 0, 0, 0), Zone::Utc, ctx).unwrap()
}

/// A date-time in a named zone.
pub fn in_zone(ctx: &EvaluationContext, tz: &str, y: i16, m: i8, d: i8, h: i8, min: i8) -> Instant {
    Instant::new(date(y, m, d).at(h, min, 0, 0), Zone::from_tzid(Some(tz)), ctx).unwrap()
}

/// A date-time in New York.
pub fn at(ctx: &EvaluationContext, y: i16, m: i8, d: i8, h: i8) -> Instant {
    in_zone(ctx, NEW_YORK, y, m, d, h, 0)
}

/// UTC midnight bounds from the first date to the second.
pub fn window(
    ctx: &EvaluationContext,
    from: (i16, i8, i8),
    to: (i16, i8, i8),
) -> (Instant, Instant) {
    (utc(ctx, from.0, from.1, from.2, 0), utc(ctx, to.0, to.1, to.2, 0))
}

pub fn event(uid: &str, start: Instant, rrule: &str) -> CalendarItem {
    let mut component = RecurringComponent::new(uid).with_start(start);
    if !rrule.is_empty() {
        component.add_rule(rrule.parse().unwrap());
    }
    CalendarItem::from(VEvent::new(component))
}

pub fn todo(uid: &str, start: Instant, rrule: &str) -> CalendarItem {
    let component = RecurringComponent::new(uid)
        .with_start(start)
        .with_rule(rrule.parse().unwrap());
    CalendarItem::from(VTodo::new(component))
}

/// US Eastern rules since 2007 as a calendar-defined zone.
pub fn custom_eastern() -> VTimeZone {
    VTimeZone::new("Custom/Eastern")
        .with_observance(
            Observance::new(
                ObservanceKind::Standard,
                date(2007, 11, 4).at(2, 0, 0, 0),
                Offset::constant(-4),
                Offset::constant(-5),
            )
            .with_rule("FREQ=YEARLY;BYMONTH=11;BYDAY=1SU".parse().unwrap()),
        )
        .with_observance(
            Observance::new(
                ObservanceKind::Daylight,
                date(2007, 3, 11).at(2, 0, 0, 0),
                Offset::constant(-5),
                Offset::constant(-4),
            )
            .with_rule("FREQ=YEARLY;BYMONTH=3;BYDAY=2SU".parse().unwrap()),
        )
}
