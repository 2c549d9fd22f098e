// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, PoisonError, RwLock};

use jiff::civil::{self, Date, Time};
use jiff::tz::Offset;
use jiff::{Timestamp, ToSpan};

use crate::error::{RecurError, Result};
use crate::evaluator::Expansion;
use crate::rule::{RecurrenceRule, RecurrenceUntil};
use crate::tz::TimeZoneProvider;

/// Kind of a VTIMEZONE sub-component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObservanceKind {
    /// STANDARD
    Standard,
    /// DAYLIGHT
    Daylight,
}

/// A STANDARD or DAYLIGHT sub-component: the offset it switches to and
/// when it does so.
#[derive(Debug, Clone)]
pub struct Observance {
    kind: ObservanceKind,
    start: civil::DateTime,
    offset_from: Offset,
    offset_to: Offset,
    name: Option<String>,
    rules: Vec<RecurrenceRule>,
    dates: Vec<civil::DateTime>,
}

impl Observance {
    /// `start` is the DTSTART, in the wall clock of `offset_from`.
    #[must_use]
    pub fn new(
        kind: ObservanceKind,
        start: civil::DateTime,
        offset_from: Offset,
        offset_to: Offset,
    ) -> Self {
        Self {
            kind,
            start,
            offset_from,
            offset_to,
            name: None,
            rules: Vec::new(),
            dates: Vec::new(),
        }
    }

    /// Set TZNAME.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add an RRULE for later onsets.
    #[must_use]
    pub fn with_rule(mut self, rule: RecurrenceRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Add an RDATE onset.
    #[must_use]
    pub fn with_date(mut self, date: civil::DateTime) -> Self {
        self.dates.push(date);
        self
    }

    #[must_use]
    pub fn kind(&self) -> ObservanceKind {
        self.kind
    }

    #[must_use]
    pub fn start(&self) -> civil::DateTime {
        self.start
    }

    #[must_use]
    pub fn offset_from(&self) -> Offset {
        self.offset_from
    }

    #[must_use]
    pub fn offset_to(&self) -> Offset {
        self.offset_to
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Onsets whose wall clock falls in `year`.
    fn onsets_in(&self, year: i16) -> Result<Vec<Timestamp>> {
        if self.start.year() > year {
            return Ok(Vec::new());
        }

        let year_start = Date::new(year, 1, 1)
            .map_err(|_| RecurError::InvalidDateComponents {
                year: year.into(),
                month: 1,
                day: 1,
            })?
            .to_datetime(Time::midnight());
        let horizon = year_start.checked_add(1.year()).ok();

        let mut walls = vec![self.start];
        walls.extend(self.dates.iter().copied());
        for rule in &self.rules {
            let expansion = Expansion::new(rule, self.start, false)
                .include_seed(true)
                .until(self.until_wall(rule)?)
                .horizon(horizon)
                .start_hint(year_start);
            for wall in expansion {
                walls.push(wall?);
            }
        }

        Ok(walls
            .into_iter()
            .filter(|wall| wall.year() == year)
            .filter_map(|wall| self.offset_from.to_timestamp(wall).ok())
            .collect())
    }

    /// UNTIL in the wall clock of the observance.
    fn until_wall(&self, rule: &RecurrenceRule) -> Result<Option<civil::DateTime>> {
        let until = match rule.until() {
            None => return Ok(None),
            Some(RecurrenceUntil::Date(date)) => {
                let date = date.civil_date().map_err(|_| RecurError::InvalidDateComponents {
                    year: date.year.into(),
                    month: date.month.into(),
                    day: date.day.into(),
                })?;
                date.at(23, 59, 59, 0)
            }
            Some(RecurrenceUntil::DateTime(value)) => {
                let wall = value.civil_date_time().map_err(|_| {
                    RecurError::InvalidDateComponents {
                        year: value.date.year.into(),
                        month: value.date.month.into(),
                        day: value.date.day.into(),
                    }
                })?;
                match value.time.utc {
                    true => match Offset::UTC.to_timestamp(wall) {
                        Ok(ts) => self.offset_from.to_datetime(ts),
                        Err(_) => wall,
                    },
                    false => wall,
                }
            }
        };
        Ok(Some(until))
    }
}

/// A VTIMEZONE definition.
#[derive(Debug, Clone)]
pub struct VTimeZone {
    tz_id: String,
    observances: Vec<Observance>,
}

impl VTimeZone {
    #[must_use]
    pub fn new(tz_id: impl Into<String>) -> Self {
        Self {
            tz_id: tz_id.into(),
            observances: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_observance(mut self, observance: Observance) -> Self {
        self.observances.push(observance);
        self
    }

    /// The TZID.
    #[must_use]
    pub fn tz_id(&self) -> &str {
        &self.tz_id
    }

    #[must_use]
    pub fn observances(&self) -> &[Observance] {
        &self.observances
    }
}

/// Time zones defined inside a calendar, falling back to another provider
/// for ids the calendar does not define.
#[derive(Debug, Default)]
pub struct CalendarTimeZones {
    zones: HashMap<String, VTimeZone>,
    fallback: Option<Arc<dyn TimeZoneProvider>>,
    onsets: RwLock<HashMap<(String, i16), Arc<[(Timestamp, Offset)]>>>,
}

impl CalendarTimeZones {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve unknown ids through `fallback`.
    #[must_use]
    pub fn with_fallback(mut self, fallback: Arc<dyn TimeZoneProvider>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Add or replace a definition.
    #[must_use]
    pub fn with_zone(mut self, zone: VTimeZone) -> Self {
        self.insert(zone);
        self
    }

    /// Add or replace a definition.
    pub fn insert(&mut self, zone: VTimeZone) {
        let tz_id = zone.tz_id.clone();
        self.onsets
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(id, _), _| *id != tz_id);
        self.zones.insert(tz_id, zone);
    }

    #[must_use]
    pub fn get(&self, tz_id: &str) -> Option<&VTimeZone> {
        self.zones.get(tz_id)
    }

    /// Onsets of all observances in `year`, ordered.
    fn onsets(&self, zone: &VTimeZone, year: i16) -> Result<Arc<[(Timestamp, Offset)]>> {
        let key = (zone.tz_id.clone(), year);
        {
            let onsets = self.onsets.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(found) = onsets.get(&key) {
                return Ok(Arc::clone(found));
            }
        }

        let mut found = Vec::new();
        for observance in &zone.observances {
            for ts in observance.onsets_in(year)? {
                found.push((ts, observance.offset_to));
            }
        }
        found.sort_unstable();
        tracing::trace!(tz_id = %zone.tz_id, year, onsets = found.len(), "expanded observances");

        let found: Arc<[(Timestamp, Offset)]> = found.into();
        let mut onsets = self.onsets.write().unwrap_or_else(PoisonError::into_inner);
        onsets.insert(key, Arc::clone(&found));
        Ok(found)
    }

    fn zone_offset_of(&self, zone: &VTimeZone, instant: Timestamp) -> Result<Offset> {
        let earliest = zone
            .observances
            .iter()
            .min_by_key(|o| o.start)
            .ok_or_else(|| RecurError::UnknownTimeZone(zone.tz_id.clone()))?;

        // onset wall clocks may be a day off the UTC year
        let year = Offset::UTC.to_datetime(instant).year();
        let mut y = year.saturating_add(1);
        while y >= earliest.start.year() {
            let onsets = self.onsets(zone, y)?;
            if let Some((_, offset)) = onsets.iter().rev().find(|(ts, _)| *ts <= instant) {
                return Ok(*offset);
            }
            y -= 1;
        }
        Ok(earliest.offset_from)
    }

    fn zone_offset_at(&self, zone: &VTimeZone, wall: civil::DateTime) -> Result<Offset> {
        let candidates: BTreeSet<Offset> = zone
            .observances
            .iter()
            .flat_map(|o| [o.offset_from, o.offset_to])
            .collect();

        let mut valid = Vec::new();
        for offset in &candidates {
            let Ok(ts) = offset.to_timestamp(wall) else {
                continue;
            };
            if self.zone_offset_of(zone, ts)? == *offset {
                valid.push(*offset);
            }
        }

        // a repeated wall time takes its earlier instant, the larger offset
        if let Some(offset) = valid.into_iter().max() {
            return Ok(offset);
        }

        // a skipped wall time takes the offset before the gap
        let earliest = candidates
            .last()
            .and_then(|o| o.to_timestamp(wall).ok())
            .ok_or_else(|| RecurError::UnknownTimeZone(zone.tz_id.clone()))?;
        self.zone_offset_of(zone, earliest)
    }

    fn fallback(&self, zone_id: &str) -> Result<&dyn TimeZoneProvider> {
        self.fallback
            .as_deref()
            .ok_or_else(|| RecurError::UnknownTimeZone(zone_id.to_owned()))
    }
}

impl TimeZoneProvider for CalendarTimeZones {
    fn offset_at(&self, zone_id: &str, wall: civil::DateTime) -> Result<Offset> {
        match self.zones.get(zone_id) {
            Some(zone) => self.zone_offset_at(zone, wall),
            None => self.fallback(zone_id)?.offset_at(zone_id, wall),
        }
    }

    fn offset_of(&self, zone_id: &str, instant: Timestamp) -> Result<Offset> {
        match self.zones.get(zone_id) {
            Some(zone) => self.zone_offset_of(zone, instant),
            None => self.fallback(zone_id)?.offset_of(zone_id, instant),
        }
    }

    fn zone_ids(&self) -> Vec<String> {
        let mut ids: BTreeSet<String> = self.zones.keys().cloned().collect();
        if let Some(fallback) = &self.fallback {
            ids.extend(fallback.zone_ids());
        }
        ids.into_iter().collect()
    }
}
