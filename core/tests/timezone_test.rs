// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Zone handling across the evaluation pipeline.

mod common;

use std::sync::Arc;

use jiff::civil::date;
use recurcal_core::{
    CalendarItem, CalendarTimeZones, EvaluationConfig, EvaluationContext, Instant, PeriodList,
    PeriodListEvaluator, RecurError, RecurrenceRuleEvaluator, Recurring, RecurringComponent,
    TzDatabase, VEvent, Zone,
};

use common::{NEW_YORK, at, custom_eastern, event, in_zone, utc, walls, window};

#[test]
fn round_trips_through_utc() {
    let ctx = EvaluationContext::utc();
    let local = at(&ctx, 2024, 6, 15, 12);

    let in_utc = local.to_utc();
    assert_eq!(in_utc.wall(), date(2024, 6, 15).at(16, 0, 0, 0));
    assert_eq!(in_utc.timestamp(), local.timestamp());
    assert_ne!(in_utc, local);

    let back = in_utc.to_zone(local.zone().clone(), &ctx).unwrap();
    assert_eq!(back, local);
    assert_eq!(back.wall(), local.wall());
}

#[test]
fn daily_rule_keeps_wall_clock_across_dst() {
    let ctx = EvaluationContext::utc();
    let item = event("dst", at(&ctx, 2024, 3, 8, 9), "FREQ=DAILY;COUNT=5");
    let (from, to) = window(&ctx, (2024, 3, 1), (2024, 4, 1));

    let got = item.evaluate(&from, &to, &ctx).unwrap();
    let expected: Vec<_> = (8..=12).map(|d| date(2024, 3, d).at(9, 0, 0, 0)).collect();
    assert_eq!(walls(&got), expected);

    let utc_hours: Vec<_> = got.iter().map(|p| p.start().to_utc().wall().hour()).collect();
    assert_eq!(utc_hours, [14, 14, 13, 13, 13]);
}

#[test]
fn floating_times_use_configured_zone() {
    let config = EvaluationConfig {
        floating_time_zone: Some("Asia/Tokyo".to_owned()),
        ..EvaluationConfig::default()
    };
    let ctx = config.into_context().unwrap();

    let floating = Instant::new(date(2024, 1, 1).at(9, 0, 0, 0), Zone::Floating, &ctx).unwrap();
    assert_eq!(floating.timestamp(), utc(&ctx, 2024, 1, 1, 0).timestamp());
}

#[test]
fn vtimezone_definitions_resolve_offsets() {
    let zones = CalendarTimeZones::new()
        .with_zone(custom_eastern())
        .with_fallback(Arc::new(TzDatabase::new()));
    let ctx = EvaluationContext::new(Arc::new(zones), "UTC");

    for (m, d, h) in [(1, 15, 9), (3, 10, 12), (7, 4, 12), (11, 3, 1), (11, 4, 12)] {
        let custom = in_zone(&ctx, "Custom/Eastern", 2024, m, d, h, 0);
        let iana = in_zone(&ctx, NEW_YORK, 2024, m, d, h, 0);
        assert_eq!(custom.timestamp(), iana.timestamp(), "2024-{m}-{d} {h}:00");
    }
}

#[test]
fn vtimezone_seeds_rules() {
    let zones = CalendarTimeZones::new().with_zone(custom_eastern());
    let ctx = EvaluationContext::new(Arc::new(zones), "Custom/Eastern");
    let item = event(
        "weekly",
        in_zone(&ctx, "Custom/Eastern", 2024, 3, 4, 9, 0),
        "FREQ=WEEKLY;COUNT=3",
    );
    let from = Instant::date(date(2024, 3, 1), Zone::Floating, &ctx).unwrap();
    let to = from.add_months(1, &ctx).unwrap();

    let got = item.evaluate(&from, &to, &ctx).unwrap();
    let utc_hours: Vec<_> = got.iter().map(|p| p.start().to_utc().wall().hour()).collect();
    assert_eq!(utc_hours, [14, 13, 13]);
}

#[test]
fn unknown_zones_are_errors() {
    let ctx = EvaluationContext::utc();
    let err = Instant::new(
        date(2024, 1, 1).at(9, 0, 0, 0),
        Zone::from_tzid(Some("Atlantis/Capital")),
        &ctx,
    )
    .unwrap_err();
    assert_eq!(err, RecurError::UnknownTimeZone("Atlantis/Capital".to_owned()));
}

#[test]
fn guard_stops_unresolvable_rules() {
    let ctx = EvaluationContext::utc().with_max_empty_steps(10);
    let eval = RecurrenceRuleEvaluator::new("FREQ=YEARLY;BYMONTH=2;BYMONTHDAY=30".parse().unwrap());
    let seed = utc(&ctx, 2000, 1, 1, 9);
    let (from, to) = window(&ctx, (2000, 1, 1), (2100, 1, 1));

    let err = eval.evaluate(&seed, &from, &to, false, &ctx).unwrap_err();
    assert!(matches!(err, RecurError::RecurrenceUnresolvable { .. }));
}

#[test]
fn literal_lists_are_not_windowed() {
    let ctx = EvaluationContext::utc();
    let list =
        PeriodList::parse("20200101T090000Z,20240105T090000Z,20300101T090000Z", None).unwrap();

    let all = PeriodListEvaluator::new(&list).evaluate(None, &ctx).unwrap();
    assert_eq!(all.len(), 3);

    // the item evaluator applies the window
    let item = CalendarItem::from(VEvent::new(
        RecurringComponent::new("dates")
            .with_start(utc(&ctx, 2024, 1, 1, 9))
            .with_recurrence_dates(list),
    ));
    let (from, to) = window(&ctx, (2024, 1, 1), (2025, 1, 1));
    let got = item.evaluate(&from, &to, &ctx).unwrap();
    assert_eq!(got.len(), 2);
}
