// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Independent calendars evaluated on several threads against one shared
//! time zone provider.

mod common;

use std::sync::Arc;
use std::thread;

use recurcal_core::{
    CalendarItem, CalendarTimeZones, EvaluationContext, OccurrenceCollector, Period, TzDatabase,
};

use common::{custom_eastern, event, in_zone, todo, window};

const THREADS: usize = 8;

fn shared_context() -> EvaluationContext {
    let zones = CalendarTimeZones::new()
        .with_zone(custom_eastern())
        .with_fallback(Arc::new(TzDatabase::new()));
    EvaluationContext::new(Arc::new(zones), "Europe/Berlin")
}

/// A small calendar touching several zones, offset by `n` hours so threads
/// do not evaluate identical data.
fn calendar(ctx: &EvaluationContext, n: i8) -> Vec<CalendarItem> {
    vec![
        event(
            "paris",
            in_zone(ctx, "Europe/Paris", 2024, 1, 1, 8 + n, 0),
            "FREQ=DAILY;INTERVAL=2",
        ),
        event(
            "tokyo",
            in_zone(ctx, "Asia/Tokyo", 2024, 2, 29, n, 30),
            "FREQ=MONTHLY;BYMONTHDAY=-1",
        ),
        event(
            "eastern",
            in_zone(ctx, "Custom/Eastern", 2024, 3, 4, 9 + n, 0),
            "FREQ=WEEKLY;BYDAY=MO,TH",
        ),
        todo(
            "sydney",
            in_zone(ctx, "Australia/Sydney", 2024, 1, 2, 12 + n, 0),
            "FREQ=WEEKLY;BYDAY=FR;COUNT=30",
        ),
    ]
}

fn collect(ctx: &EvaluationContext, n: i8) -> Vec<(String, Period)> {
    let items = calendar(ctx, n);
    let (from, to) = window(ctx, (2024, 1, 1), (2025, 1, 1));
    let occurrences = OccurrenceCollector::new(ctx.clone())
        .collect(&items, &from, &to)
        .unwrap();
    occurrences
        .into_iter()
        .map(|o| (o.source().uid().to_owned(), o.period().clone()))
        .collect()
}

#[test]
fn threads_share_one_provider() {
    let expected: Vec<_> = (0..THREADS)
        .map(|n| collect(&shared_context(), i8::try_from(n).unwrap()))
        .collect();
    assert!(expected.iter().all(|got| got.len() > 250));

    let ctx = shared_context();
    let got: Vec<_> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|n| {
                let ctx = &ctx;
                s.spawn(move || collect(ctx, i8::try_from(n).unwrap()))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert_eq!(got, expected);
}

#[test]
fn contexts_move_between_threads() {
    let ctx = shared_context();
    let expected = collect(&ctx, 1);

    let moved = ctx.clone();
    let got = thread::spawn(move || collect(&moved, 1)).join().unwrap();
    assert_eq!(got, expected);
}
