// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use recurcal_ical::ParseError;

/// Errors raised while building or evaluating recurrence data.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecurError {
    /// INTERVAL was given as zero
    #[error("recurrence interval must be at least 1")]
    InvalidInterval,

    /// Both COUNT and UNTIL were given
    #[error("recurrence rule must not have both COUNT and UNTIL")]
    CountAndUntil,

    /// No FREQ was given
    #[error("recurrence rule requires a frequency")]
    MissingFrequency,

    /// A BYxxx part is out of range or not allowed with the rule frequency
    #[error("invalid {part}: {reason}")]
    InvalidByRule {
        /// Name of the rule part, e.g. `BYMONTHDAY`
        part: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// Year, month and day do not form a calendar date
    #[error("invalid date {year:04}-{month:02}-{day:02}")]
    InvalidDateComponents {
        /// Year component
        year: i32,
        /// Month component
        month: i32,
        /// Day component
        day: i32,
    },

    /// A period whose end is not after its start
    #[error("period end {end} must be after its start {start}")]
    InvalidPeriod {
        /// Start of the period
        start: String,
        /// Rejected end of the period
        end: String,
    },

    /// A value failed to parse
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Expansion kept producing empty periods
    #[error("recurrence rule produced no occurrence in {steps} consecutive periods")]
    RecurrenceUnresolvable {
        /// Number of empty periods seen before giving up
        steps: u32,
    },

    /// The time zone id is not known to the provider
    #[error("unknown time zone '{0}'")]
    UnknownTimeZone(String),

    /// The evaluation configuration could not be loaded
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<toml::de::Error> for RecurError {
    fn from(e: toml::de::Error) -> Self {
        Self::Config(e.to_string())
    }
}

/// Result alias used across this crate.
pub type Result<T, E = RecurError> = std::result::Result<T, E>;
