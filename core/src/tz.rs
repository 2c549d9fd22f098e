// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Time zone resolution.
//!
//! Evaluation never reads a global zone database directly. Every lookup goes
//! through a [`TimeZoneProvider`], either the IANA database shipped with
//! `jiff` or the VTIMEZONE definitions embedded in a calendar.

mod database;
mod vtimezone;

use std::fmt;

use jiff::Timestamp;
use jiff::civil;
use jiff::tz::Offset;

use crate::error::Result;

pub use database::TzDatabase;
pub use vtimezone::{CalendarTimeZones, Observance, ObservanceKind, VTimeZone};

/// Source of UTC offsets for time zone ids.
pub trait TimeZoneProvider: Send + Sync + fmt::Debug {
    /// Offset in effect at a wall-clock time in the zone.
    ///
    /// A wall time skipped by a forward transition resolves with the offset
    /// before the gap. A repeated wall time resolves to its earlier instant.
    ///
    /// ## Errors
    ///
    /// Returns [`crate::RecurError::UnknownTimeZone`] if the zone is unknown.
    fn offset_at(&self, zone_id: &str, wall: civil::DateTime) -> Result<Offset>;

    /// Offset in effect at an instant in the zone.
    ///
    /// ## Errors
    ///
    /// Returns [`crate::RecurError::UnknownTimeZone`] if the zone is unknown.
    fn offset_of(&self, zone_id: &str, instant: Timestamp) -> Result<Offset>;

    /// Ids of all zones this provider can resolve.
    fn zone_ids(&self) -> Vec<String>;

    /// Whether the zone id can be resolved.
    fn contains(&self, zone_id: &str) -> bool {
        self.offset_of(zone_id, Timestamp::UNIX_EPOCH).is_ok()
    }
}
