// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Value type parsing module for iCalendar property values.
//!
//! This module handles the parsing and validation of the value types used by
//! recurrence data, as defined in RFC 5545 Section 3.3.

mod datetime;
mod duration;
mod miscellaneous;
mod period;
mod rrule;

pub use datetime::{ValueDate, ValueDateTime, ValueTime, ValueUtcOffset};
pub use duration::ValueDuration;
pub use miscellaneous::{ValueExpected, days_in_month, is_leap_year};
pub use period::{ValueDateList, ValuePeriod};
pub use rrule::{
    RecurrenceFrequency, RecurrenceUntil, ValueRecurrenceRule, WeekDay, WeekDayNum,
};

pub(crate) use datetime::{value_date, value_date_time, value_utc_offset};
pub(crate) use duration::value_duration;
pub(crate) use period::{value_date_list, value_period};
pub(crate) use rrule::value_rrule;
