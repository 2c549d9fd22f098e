// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use jiff::civil::{self, DateTime};
use jiff::{SignedDuration, Span, Timestamp};
use recurcal_ical::{ValueDate, ValueDateTime, ValueDuration, parse_date, parse_date_time};

use crate::config::EvaluationContext;
use crate::error::{RecurError, Result};

/// Latest wall-clock time an [`Instant`] can hold.
const MAX_WALL: DateTime = DateTime::constant(9999, 12, 31, 23, 59, 59, 0);

/// Earliest wall-clock time an [`Instant`] can hold.
const MIN_WALL: DateTime = DateTime::constant(-9999, 1, 1, 0, 0, 0, 0);

/// How the wall-clock part of an [`Instant`] relates to the timeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Zone {
    /// No zone attached, placed with the configured floating zone.
    Floating,

    /// Coordinated Universal Time, written with a trailing `Z`.
    Utc,

    /// A named zone, resolved through the time zone provider.
    Named(Arc<str>),
}

impl Zone {
    /// Zone for an optional TZID parameter, floating when absent.
    #[must_use]
    pub fn from_tzid(tzid: Option<&str>) -> Self {
        match tzid {
            Some(id) => Self::Named(id.into()),
            None => Self::Floating,
        }
    }

    /// The TZID parameter value, if any.
    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        match self {
            Self::Named(id) => Some(id),
            Self::Floating | Self::Utc => None,
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Floating => f.write_str("floating"),
            Self::Utc => f.write_str("UTC"),
            Self::Named(id) => f.write_str(id),
        }
    }
}

/// A calendar date or date-time together with its zone.
///
/// The wall-clock value is kept as written so that date-only and floating
/// values survive a round trip, while the UTC position is resolved once at
/// construction and drives equality and ordering.
#[derive(Debug, Clone)]
pub struct Instant {
    wall: DateTime,
    has_time: bool,
    zone: Zone,
    utc: Timestamp,
}

impl Instant {
    /// A date-time in the given zone.
    ///
    /// ## Errors
    ///
    /// Returns [`RecurError::UnknownTimeZone`] if the zone cannot be resolved.
    pub fn new(wall: DateTime, zone: Zone, ctx: &EvaluationContext) -> Result<Self> {
        Self::resolve(wall, true, zone, ctx)
    }

    /// A date without time of day, anchored at local midnight of the zone.
    ///
    /// ## Errors
    ///
    /// Returns [`RecurError::UnknownTimeZone`] if the zone cannot be resolved.
    pub fn date(date: civil::Date, zone: Zone, ctx: &EvaluationContext) -> Result<Self> {
        Self::resolve(date.to_datetime(civil::Time::midnight()), false, zone, ctx)
    }

    /// Build from loose components, `time` being absent for a date-only value.
    ///
    /// Years beyond the representable range clamp to the nearest bound.
    ///
    /// ## Errors
    ///
    /// Returns [`RecurError::InvalidDateComponents`] if month and day do not
    /// form a date in that year.
    pub fn from_components(
        year: i32,
        month: i32,
        day: i32,
        time: Option<civil::Time>,
        zone: Zone,
        ctx: &EvaluationContext,
    ) -> Result<Self> {
        let invalid = || RecurError::InvalidDateComponents { year, month, day };
        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return Err(invalid());
        }

        let has_time = time.is_some();
        let Ok(y) = i16::try_from(year) else {
            return Self::clamped(year > 0, has_time, zone, ctx);
        };
        if !(-9999..=9999).contains(&y) {
            return Self::clamped(year > 0, has_time, zone, ctx);
        }

        #[allow(clippy::cast_possible_truncation)]
        let date = civil::Date::new(y, month as i8, day as i8).map_err(|_| invalid())?;
        Self::resolve(
            date.to_datetime(time.unwrap_or(civil::Time::midnight())),
            has_time,
            zone,
            ctx,
        )
    }

    /// Build from a DATE value and its optional TZID.
    ///
    /// ## Errors
    ///
    /// Returns an error if the date is invalid or the zone is unknown.
    pub fn from_value_date(
        value: ValueDate,
        tzid: Option<&str>,
        ctx: &EvaluationContext,
    ) -> Result<Self> {
        let date = value
            .civil_date()
            .map_err(|_| RecurError::InvalidDateComponents {
                year: value.year.into(),
                month: value.month.into(),
                day: value.day.into(),
            })?;
        Self::date(date, Zone::from_tzid(tzid), ctx)
    }

    /// Build from a DATE-TIME value and its optional TZID. A UTC value ignores
    /// the TZID.
    ///
    /// ## Errors
    ///
    /// Returns an error if the date is invalid or the zone is unknown.
    pub fn from_value_date_time(
        value: &ValueDateTime,
        tzid: Option<&str>,
        ctx: &EvaluationContext,
    ) -> Result<Self> {
        let wall = value
            .civil_date_time()
            .map_err(|_| RecurError::InvalidDateComponents {
                year: value.date.year.into(),
                month: value.date.month.into(),
                day: value.date.day.into(),
            })?;
        let zone = match value.time.utc {
            true => Zone::Utc,
            false => Zone::from_tzid(tzid),
        };
        Self::new(wall, zone, ctx)
    }

    /// Parse a DATE or DATE-TIME value such as `20200101` or `20200101T090000Z`.
    ///
    /// ## Errors
    ///
    /// Returns [`RecurError::Parse`] if the text is neither.
    pub fn parse(value: &str, tzid: Option<&str>, ctx: &EvaluationContext) -> Result<Self> {
        match value.contains('T') {
            true => Self::from_value_date_time(&parse_date_time(value)?, tzid, ctx),
            false => Self::from_value_date(parse_date(value)?, tzid, ctx),
        }
    }

    /// The instant on the timeline, shown in `zone`.
    ///
    /// ## Errors
    ///
    /// Returns [`RecurError::UnknownTimeZone`] if the zone cannot be resolved.
    pub fn from_timestamp(utc: Timestamp, zone: Zone, ctx: &EvaluationContext) -> Result<Self> {
        let offset = ctx.offset_of(&zone, utc)?;
        Ok(Self {
            wall: offset.to_datetime(utc),
            has_time: true,
            zone,
            utc,
        })
    }

    fn resolve(
        wall: DateTime,
        has_time: bool,
        zone: Zone,
        ctx: &EvaluationContext,
    ) -> Result<Self> {
        let mut wall = match has_time {
            true => wall,
            false => wall.date().to_datetime(civil::Time::midnight()),
        };

        let offset = ctx.offset_at(&zone, wall)?;
        let utc = match offset.to_timestamp(wall) {
            Ok(utc) => utc,
            Err(_) if wall.year() > 0 => Timestamp::MAX,
            Err(_) => Timestamp::MIN,
        };

        // a wall time inside a gap moves forward by the gap length
        if has_time && utc != Timestamp::MAX && utc != Timestamp::MIN {
            let actual = ctx.offset_of(&zone, utc)?;
            if actual != offset {
                wall = actual.to_datetime(utc);
            }
        }

        Ok(Self {
            wall,
            has_time,
            zone,
            utc,
        })
    }

    fn clamped(forward: bool, has_time: bool, zone: Zone, ctx: &EvaluationContext) -> Result<Self> {
        let wall = match forward {
            true => MAX_WALL,
            false => MIN_WALL,
        };
        tracing::warn!(%wall, "date out of range, clamping");
        Self::resolve(wall, has_time, zone, ctx)
    }

    /// Wall-clock value in the instant's own zone.
    #[must_use]
    pub fn wall(&self) -> DateTime {
        self.wall
    }

    /// Calendar date in the instant's own zone.
    #[must_use]
    pub fn date_part(&self) -> civil::Date {
        self.wall.date()
    }

    /// Time of day, absent for date-only values.
    #[must_use]
    pub fn time(&self) -> Option<civil::Time> {
        self.has_time.then(|| self.wall.time())
    }

    /// Whether this value carries a time of day.
    #[must_use]
    pub fn has_time(&self) -> bool {
        self.has_time
    }

    /// The zone of this value.
    #[must_use]
    pub fn zone(&self) -> &Zone {
        &self.zone
    }

    /// The TZID this value was written with, if any.
    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        self.zone.tzid()
    }

    /// Position on the timeline.
    #[must_use]
    pub fn timestamp(&self) -> Timestamp {
        self.utc
    }

    /// The same position shown in UTC. A date-only value keeps its date.
    #[must_use]
    pub fn to_utc(&self) -> Self {
        match self.has_time {
            true => Self {
                wall: jiff::tz::Offset::UTC.to_datetime(self.utc),
                has_time: true,
                zone: Zone::Utc,
                utc: self.utc,
            },
            false => Self {
                wall: self.wall,
                has_time: false,
                zone: Zone::Utc,
                utc: jiff::tz::Offset::UTC
                    .to_timestamp(self.wall)
                    .unwrap_or(self.utc),
            },
        }
    }

    /// The same position shown in another zone. A date-only value keeps its
    /// date and is anchored at midnight of the new zone.
    ///
    /// ## Errors
    ///
    /// Returns [`RecurError::UnknownTimeZone`] if the zone cannot be resolved.
    pub fn to_zone(&self, zone: Zone, ctx: &EvaluationContext) -> Result<Self> {
        match self.has_time {
            true => Self::from_timestamp(self.utc, zone, ctx),
            false => Self::resolve(self.wall, false, zone, ctx),
        }
    }

    /// Add an iCalendar duration: days and weeks move the wall clock, the
    /// time part is exact elapsed time.
    ///
    /// ## Errors
    ///
    /// Returns [`RecurError::UnknownTimeZone`] if the zone cannot be resolved.
    pub fn add_duration(&self, duration: &ValueDuration, ctx: &EvaluationContext) -> Result<Self> {
        let days = duration.nominal_days();
        let shifted = self.add_calendar(Span::new().try_days(days), days >= 0, ctx)?;
        shifted.add_seconds(duration.exact_seconds(), ctx)
    }

    /// Add calendar years, clipping Feb 29 to Feb 28.
    ///
    /// ## Errors
    ///
    /// Returns [`RecurError::UnknownTimeZone`] if the zone cannot be resolved.
    pub fn add_years(&self, years: i64, ctx: &EvaluationContext) -> Result<Self> {
        self.add_calendar(Span::new().try_years(years), years >= 0, ctx)
    }

    /// Add calendar months, clipping the day to the end of the month.
    ///
    /// ## Errors
    ///
    /// Returns [`RecurError::UnknownTimeZone`] if the zone cannot be resolved.
    pub fn add_months(&self, months: i64, ctx: &EvaluationContext) -> Result<Self> {
        self.add_calendar(Span::new().try_months(months), months >= 0, ctx)
    }

    /// Add calendar weeks.
    ///
    /// ## Errors
    ///
    /// Returns [`RecurError::UnknownTimeZone`] if the zone cannot be resolved.
    pub fn add_weeks(&self, weeks: i64, ctx: &EvaluationContext) -> Result<Self> {
        match weeks.checked_mul(7) {
            Some(days) => self.add_days(days, ctx),
            None => Self::clamped(weeks > 0, self.has_time, self.zone.clone(), ctx),
        }
    }

    /// Add days. Date-only values move by calendar days, date-times by
    /// multiples of 24 hours.
    ///
    /// ## Errors
    ///
    /// Returns [`RecurError::UnknownTimeZone`] if the zone cannot be resolved.
    pub fn add_days(&self, days: i64, ctx: &EvaluationContext) -> Result<Self> {
        match self.has_time {
            true => match days.checked_mul(86_400) {
                Some(secs) => self.add_seconds(secs, ctx),
                None => Self::clamped(days > 0, true, self.zone.clone(), ctx),
            },
            false => self.add_calendar(Span::new().try_days(days), days >= 0, ctx),
        }
    }

    /// Add exact hours.
    ///
    /// ## Errors
    ///
    /// Returns [`RecurError::UnknownTimeZone`] if the zone cannot be resolved.
    pub fn add_hours(&self, hours: i64, ctx: &EvaluationContext) -> Result<Self> {
        match hours.checked_mul(3600) {
            Some(secs) => self.add_seconds(secs, ctx),
            None => Self::clamped(hours > 0, self.has_time, self.zone.clone(), ctx),
        }
    }

    /// Add exact minutes.
    ///
    /// ## Errors
    ///
    /// Returns [`RecurError::UnknownTimeZone`] if the zone cannot be resolved.
    pub fn add_minutes(&self, minutes: i64, ctx: &EvaluationContext) -> Result<Self> {
        match minutes.checked_mul(60) {
            Some(secs) => self.add_seconds(secs, ctx),
            None => Self::clamped(minutes > 0, self.has_time, self.zone.clone(), ctx),
        }
    }

    /// Add exact seconds. A date-only value keeps whole days only.
    ///
    /// ## Errors
    ///
    /// Returns [`RecurError::UnknownTimeZone`] if the zone cannot be resolved.
    pub fn add_seconds(&self, seconds: i64, ctx: &EvaluationContext) -> Result<Self> {
        if seconds == 0 {
            return Ok(self.clone());
        }

        let forward = seconds > 0;
        let delta = SignedDuration::from_secs(seconds);
        match self.has_time {
            true => match self.utc.checked_add(delta) {
                Ok(utc) => Self::from_timestamp(utc, self.zone.clone(), ctx),
                Err(_) => Self::clamped(forward, true, self.zone.clone(), ctx),
            },
            false => match self.wall.checked_add(delta) {
                Ok(wall) => Self::resolve(wall, false, self.zone.clone(), ctx),
                Err(_) => Self::clamped(forward, false, self.zone.clone(), ctx),
            },
        }
    }

    fn add_calendar(
        &self,
        span: std::result::Result<Span, jiff::Error>,
        forward: bool,
        ctx: &EvaluationContext,
    ) -> Result<Self> {
        match span.and_then(|span| self.wall.checked_add(span)) {
            Ok(wall) => Self::resolve(wall, self.has_time, self.zone.clone(), ctx),
            Err(_) => Self::clamped(forward, self.has_time, self.zone.clone(), ctx),
        }
    }

    fn key(&self) -> (Timestamp, bool, &Zone) {
        (self.utc, self.has_time, &self.zone)
    }
}

impl PartialEq for Instant {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Instant {}

impl PartialOrd for Instant {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Instant {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl Hash for Instant {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.has_time {
            true => {
                let mut value = ValueDateTime::from(self.wall);
                value.time.utc = self.zone == Zone::Utc;
                fmt::Display::fmt(&value, f)
            }
            false => fmt::Display::fmt(&ValueDate::from(self.wall.date()), f),
        }
    }
}
