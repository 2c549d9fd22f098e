// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Parse and format the iCalendar value types used by recurrence data:
//! DATE, DATE-TIME, DURATION, PERIOD, UTC-OFFSET and RECUR.

#![warn(
    trivial_casts,
    trivial_numeric_casts,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    clippy::dbg_macro,
    clippy::indexing_slicing,
    clippy::pedantic
)]
// Allow certain clippy lints that are too restrictive for this crate
#![allow(
    clippy::option_option,
    clippy::similar_names,
    clippy::single_match_else,
    clippy::match_bool
)]

pub mod formatter;
pub mod keyword;
mod parser;
pub mod value;

pub use crate::parser::{
    ParseError, parse_date, parse_date_list, parse_date_time, parse_duration, parse_period,
    parse_rrule, parse_utc_offset,
};
pub use crate::value::{
    RecurrenceFrequency, RecurrenceUntil, ValueDate, ValueDateList, ValueDateTime, ValueDuration,
    ValuePeriod, ValueRecurrenceRule, ValueTime, ValueUtcOffset, WeekDay, WeekDayNum,
};
