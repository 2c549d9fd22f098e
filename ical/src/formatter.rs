// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! iCalendar (RFC 5545) value formatter.
//!
//! Every value type implements [`std::fmt::Display`] with its RFC 5545
//! textual form, so that parsing and formatting round-trip.
//!
//! # Example
//!
//! ```
//! use recurcal_ical::parse_rrule;
//!
//! let rule = parse_rrule("BYDAY=MO,WE,FR;FREQ=WEEKLY;COUNT=6").unwrap();
//! assert_eq!(rule.to_string(), "FREQ=WEEKLY;COUNT=6;BYDAY=MO,WE,FR");
//! ```

mod value;

pub use crate::formatter::value::{
    write_date, write_date_list, write_date_time, write_duration, write_period,
    write_recurrence_rule, write_time, write_utc_offset,
};
