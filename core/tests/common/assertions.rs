// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Assertion helpers over evaluated periods.

#![allow(dead_code)]

use jiff::civil::DateTime;
use recurcal_core::{Instant, Period};

/// Wall-clock starts of the periods, in order.
pub fn walls<'a>(periods: impl IntoIterator<Item = &'a Period>) -> Vec<DateTime> {
    periods.into_iter().map(|p| p.start().wall()).collect()
}

/// Assert that every period starts within `[from, to)`.
pub fn assert_within<'a>(
    periods: impl IntoIterator<Item = &'a Period>,
    from: &Instant,
    to: &Instant,
) {
    for period in periods {
        assert!(
            period.starts_within(from, to),
            "{period} starts outside of [{from}, {to})"
        );
    }
}
