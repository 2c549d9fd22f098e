// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use recurcal_ical::{ValueDuration, ValuePeriod};

use crate::config::EvaluationContext;
use crate::datetime::Instant;
use crate::error::{RecurError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Extent {
    /// Neither end nor duration was given
    Implicit,
    End,
    Duration(ValueDuration),
}

/// A span of time with a start and either an end or a duration.
///
/// Whichever of end and duration was given is kept as written, the other is
/// derived. Without either, a date-only start covers one day and a date-time
/// start has no length.
#[derive(Debug, Clone)]
pub struct Period {
    start: Instant,
    end: Instant,
    extent: Extent,
}

impl Period {
    /// A period with no explicit extent.
    ///
    /// ## Errors
    ///
    /// Returns [`RecurError::UnknownTimeZone`] if the start zone cannot be resolved.
    pub fn new(start: Instant, ctx: &EvaluationContext) -> Result<Self> {
        let end = match start.has_time() {
            true => start.clone(),
            false => start.add_days(1, ctx)?,
        };
        Ok(Self {
            start,
            end,
            extent: Extent::Implicit,
        })
    }

    /// A period with an explicit end.
    ///
    /// ## Errors
    ///
    /// Returns [`RecurError::InvalidPeriod`] unless `end` is after `start`.
    pub fn with_end(start: Instant, end: Instant) -> Result<Self> {
        if end.timestamp() <= start.timestamp() {
            return Err(RecurError::InvalidPeriod {
                start: start.to_string(),
                end: end.to_string(),
            });
        }

        Ok(Self {
            start,
            end,
            extent: Extent::End,
        })
    }

    /// A period with a duration. A zero duration is allowed.
    ///
    /// ## Errors
    ///
    /// Returns [`RecurError::InvalidPeriod`] if the duration is negative.
    pub fn with_duration(
        start: Instant,
        duration: ValueDuration,
        ctx: &EvaluationContext,
    ) -> Result<Self> {
        if duration.nominal_days() < 0 || duration.exact_seconds() < 0 {
            return Err(RecurError::InvalidPeriod {
                start: start.to_string(),
                end: duration.to_string(),
            });
        }

        let end = start.add_duration(&duration, ctx)?;
        Ok(Self {
            start,
            end,
            extent: Extent::Duration(duration),
        })
    }

    /// Build from a PERIOD value and its optional TZID.
    ///
    /// ## Errors
    ///
    /// Returns an error if either bound is invalid or the end is not after
    /// the start.
    pub fn from_value(
        value: &ValuePeriod,
        tzid: Option<&str>,
        ctx: &EvaluationContext,
    ) -> Result<Self> {
        match value {
            ValuePeriod::Explicit { start, end } => Self::with_end(
                Instant::from_value_date_time(start, tzid, ctx)?,
                Instant::from_value_date_time(end, tzid, ctx)?,
            ),
            ValuePeriod::Duration { start, duration } => Self::with_duration(
                Instant::from_value_date_time(start, tzid, ctx)?,
                *duration,
                ctx,
            ),
        }
    }

    /// Start of the period.
    #[must_use]
    pub fn start(&self) -> &Instant {
        &self.start
    }

    /// End of the period, derived from the duration when needed.
    #[must_use]
    pub fn end(&self) -> &Instant {
        &self.end
    }

    /// Length of the period, derived from the end when needed.
    #[must_use]
    pub fn duration(&self) -> ValueDuration {
        if let Extent::Duration(duration) = self.extent {
            return duration;
        }

        let secs = self
            .end
            .timestamp()
            .duration_since(self.start.timestamp())
            .as_secs()
            .max(0);
        match self.start.has_time() || self.end.has_time() {
            true => ValueDuration::seconds(u32::try_from(secs).unwrap_or(u32::MAX)),
            // a day across a DST change is 23 or 25 hours long
            false => {
                let days = (secs + 43_200) / 86_400;
                ValueDuration::days(u32::try_from(days).unwrap_or(u32::MAX))
            }
        }
    }

    /// Whether an end or a duration was given explicitly.
    #[must_use]
    pub fn has_extent(&self) -> bool {
        self.extent != Extent::Implicit
    }

    /// Whether the period starts within `[from, to)`.
    #[must_use]
    pub fn starts_within(&self, from: &Instant, to: &Instant) -> bool {
        from.timestamp() <= self.start.timestamp() && self.start.timestamp() < to.timestamp()
    }

    fn key(&self) -> (&Instant, &Instant) {
        (&self.start, &self.end)
    }
}

impl PartialEq for Period {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Period {}

impl PartialOrd for Period {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Period {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl Hash for Period {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.extent {
            Extent::Duration(duration) => write!(f, "{}/{}", self.start, duration),
            Extent::Implicit | Extent::End => write!(f, "{}/{}", self.start, self.end),
        }
    }
}
