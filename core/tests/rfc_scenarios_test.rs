// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Recurrence scenarios from RFC 5545 Section 3.8.5.3, evaluated end to end.

mod common;

use jiff::civil::date;
use recurcal_core::{
    CalendarItem, EvaluationContext, PeriodList, RecurrenceRule, RecurrenceRuleEvaluator, Recurring,
    RecurringComponent, VEvent,
};

use common::{assert_within, at, event, utc, walls, window};

#[test]
fn daily_for_ten_occurrences() {
    let ctx = EvaluationContext::utc();
    let item = event("daily", at(&ctx, 1997, 9, 2, 9), "FREQ=DAILY;COUNT=10");
    let (from, to) = window(&ctx, (1997, 9, 1), (1998, 1, 1));

    let got = item.evaluate(&from, &to, &ctx).unwrap();
    let expected: Vec<_> = (2..=11).map(|d| date(1997, 9, d).at(9, 0, 0, 0)).collect();
    assert_eq!(walls(&got), expected);
}

#[test]
fn weekly_on_monday_wednesday_friday() {
    let ctx = EvaluationContext::utc();
    let item = event("mwf", at(&ctx, 1997, 9, 1, 9), "FREQ=WEEKLY;BYDAY=MO,WE,FR;COUNT=6");
    let (from, to) = window(&ctx, (1997, 9, 1), (1997, 12, 1));

    let got = item.evaluate(&from, &to, &ctx).unwrap();
    let days: Vec<_> = walls(&got).iter().map(|w| w.day()).collect();
    assert_eq!(days, [1, 3, 5, 8, 10, 12]);
}

#[test]
fn monthly_on_the_last_day() {
    let ctx = EvaluationContext::utc();
    let item = event("eom", utc(&ctx, 2024, 1, 31, 9), "FREQ=MONTHLY;BYMONTHDAY=-1;COUNT=3");
    let (from, to) = window(&ctx, (2024, 1, 1), (2025, 1, 1));

    let got = item.evaluate(&from, &to, &ctx).unwrap();
    assert_eq!(
        walls(&got),
        [
            date(2024, 1, 31).at(9, 0, 0, 0),
            date(2024, 2, 29).at(9, 0, 0, 0),
            date(2024, 3, 31).at(9, 0, 0, 0),
        ]
    );
}

#[test]
fn start_is_an_occurrence_even_off_rule() {
    let ctx = EvaluationContext::utc();
    let item = event("eom", utc(&ctx, 2024, 1, 15, 9), "FREQ=MONTHLY;BYMONTHDAY=-1;COUNT=3");
    let (from, to) = window(&ctx, (2024, 1, 1), (2025, 1, 1));

    let got = item.evaluate(&from, &to, &ctx).unwrap();
    let days: Vec<_> = walls(&got).iter().map(|w| (w.month(), w.day())).collect();
    assert_eq!(days, [(1, 15), (1, 31), (2, 29), (3, 31)]);
}

#[test]
fn february_thirtieth_never_occurs() {
    let ctx = EvaluationContext::utc();
    let rule: RecurrenceRule = "FREQ=YEARLY;BYMONTH=2;BYMONTHDAY=30".parse().unwrap();
    let eval = RecurrenceRuleEvaluator::new(rule);
    let seed = utc(&ctx, 2024, 1, 1, 9);
    let (from, to) = window(&ctx, (2024, 1, 1), (2029, 1, 1));

    let got = eval.evaluate(&seed, &from, &to, false, &ctx).unwrap();
    assert!(got.is_empty());
}

#[test]
fn last_workday_of_the_month() {
    let ctx = EvaluationContext::utc();
    let item = event(
        "payday",
        utc(&ctx, 2024, 1, 31, 17),
        "FREQ=MONTHLY;BYDAY=MO,TU,WE,TH,FR;BYSETPOS=-1;COUNT=3",
    );
    let (from, to) = window(&ctx, (2024, 1, 1), (2025, 1, 1));

    let got = item.evaluate(&from, &to, &ctx).unwrap();
    let days: Vec<_> = walls(&got).iter().map(|w| (w.month(), w.day())).collect();
    assert_eq!(days, [(1, 31), (2, 29), (3, 29)]);
}

#[test]
fn exdate_removes_exactly_one_rdate() {
    let ctx = EvaluationContext::utc();
    let item = CalendarItem::from(VEvent::new(
        RecurringComponent::new("dates")
            .with_start(utc(&ctx, 2024, 1, 1, 9))
            .with_recurrence_dates(
                PeriodList::parse("20240105T090000Z,20240110T090000Z", None).unwrap(),
            )
            .with_exception_dates(PeriodList::parse("20240105T090000Z", None).unwrap()),
    ));
    let (from, to) = window(&ctx, (2024, 1, 1), (2024, 2, 1));

    let got = item.evaluate(&from, &to, &ctx).unwrap();
    let days: Vec<_> = walls(&got).iter().map(|w| w.day()).collect();
    assert_eq!(days, [1, 10]);
}

#[test]
fn date_exdate_removes_the_whole_day() {
    let ctx = EvaluationContext::utc();
    let item = CalendarItem::from(VEvent::new(
        RecurringComponent::new("daily")
            .with_start(at(&ctx, 2024, 1, 1, 9))
            .with_rule("FREQ=DAILY;COUNT=5".parse().unwrap())
            .with_exception_dates(PeriodList::parse("20240103", None).unwrap()),
    ));
    let (from, to) = window(&ctx, (2024, 1, 1), (2024, 2, 1));

    let got = item.evaluate(&from, &to, &ctx).unwrap();
    let days: Vec<_> = walls(&got).iter().map(|w| w.day()).collect();
    assert_eq!(days, [1, 2, 4, 5]);
}

#[test]
fn exrule_removes_weekends() {
    let ctx = EvaluationContext::utc();
    let item = CalendarItem::from(VEvent::new(
        RecurringComponent::new("weekdays")
            .with_start(utc(&ctx, 2024, 1, 1, 9))
            .with_rule("FREQ=DAILY".parse().unwrap())
            .with_exception_rule("FREQ=WEEKLY;BYDAY=SA,SU".parse().unwrap()),
    ));
    let (from, to) = window(&ctx, (2024, 1, 1), (2024, 1, 15));

    let got = item.evaluate(&from, &to, &ctx).unwrap();
    let days: Vec<_> = walls(&got).iter().map(|w| w.day()).collect();
    assert_eq!(days, [1, 2, 3, 4, 5, 8, 9, 10, 11, 12]);
}

#[test]
fn evaluation_is_idempotent() {
    let ctx = EvaluationContext::utc();
    let item = event("weekly", at(&ctx, 2024, 1, 2, 10), "FREQ=WEEKLY;INTERVAL=2;BYDAY=TU,TH");
    let (from, to) = window(&ctx, (2024, 1, 1), (2024, 7, 1));

    let first = item.evaluate(&from, &to, &ctx).unwrap();
    let second = item.evaluate(&from, &to, &ctx).unwrap();
    assert_eq!(first, second);
    assert!(!first.is_empty());
}

#[test]
fn results_stay_within_the_window() {
    let ctx = EvaluationContext::utc();
    let item = event("hourly", utc(&ctx, 2024, 1, 1, 0), "FREQ=HOURLY;INTERVAL=5");
    let from = utc(&ctx, 2024, 1, 3, 7);
    let to = utc(&ctx, 2024, 1, 5, 13);

    let got = item.evaluate(&from, &to, &ctx).unwrap();
    assert_within(&got, &from, &to);
    // 55 hours after the start, a multiple of five
    assert_eq!(got.first().unwrap().start().wall(), date(2024, 1, 3).at(7, 0, 0, 0));
    assert_eq!(got.len(), 11);
}

#[test]
fn rule_text_round_trips() {
    for src in [
        "FREQ=MONTHLY;INTERVAL=2;COUNT=10;BYDAY=1SU,-1SU",
        "FREQ=YEARLY;UNTIL=20000131T140000Z;BYDAY=SU,MO,TU,WE,TH,FR,SA;BYMONTH=1",
        "FREQ=WEEKLY;UNTIL=19971007;WKST=SU;BYDAY=TU,TH",
    ] {
        let rule: RecurrenceRule = src.parse().unwrap();
        let again: RecurrenceRule = rule.to_string().parse().unwrap();
        assert_eq!(rule, again, "{src}");
    }
}
