// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use jiff::Timestamp;
use jiff::civil;
use jiff::tz::{AmbiguousOffset, Offset, TimeZone};

use crate::error::{RecurError, Result};
use crate::tz::TimeZoneProvider;

/// IANA time zones from the `jiff` database, loaded on first use.
#[derive(Debug, Default)]
pub struct TzDatabase {
    zones: RwLock<HashMap<String, TimeZone>>,
}

impl TzDatabase {
    /// Create an empty database handle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn zone(&self, zone_id: &str) -> Result<TimeZone> {
        {
            let zones = self.zones.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(tz) = zones.get(zone_id) {
                return Ok(tz.clone());
            }
        }

        let tz = jiff::tz::db()
            .get(zone_id)
            .map_err(|_| RecurError::UnknownTimeZone(zone_id.to_owned()))?;
        tracing::debug!(zone_id, "loaded time zone");

        let mut zones = self.zones.write().unwrap_or_else(PoisonError::into_inner);
        zones.insert(zone_id.to_owned(), tz.clone());
        Ok(tz)
    }
}

impl TimeZoneProvider for TzDatabase {
    fn offset_at(&self, zone_id: &str, wall: civil::DateTime) -> Result<Offset> {
        let tz = self.zone(zone_id)?;
        let offset = match tz.to_ambiguous_timestamp(wall).offset() {
            AmbiguousOffset::Unambiguous { offset } => offset,
            AmbiguousOffset::Gap { before, .. } | AmbiguousOffset::Fold { before, .. } => before,
        };
        Ok(offset)
    }

    fn offset_of(&self, zone_id: &str, instant: Timestamp) -> Result<Offset> {
        Ok(self.zone(zone_id)?.to_offset(instant))
    }

    fn zone_ids(&self) -> Vec<String> {
        jiff::tz::db()
            .available()
            .map(|name| name.as_str().to_owned())
            .collect()
    }
}
