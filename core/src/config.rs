// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::ptr;
use std::sync::Arc;

use jiff::Timestamp;
use jiff::civil;
use jiff::tz::Offset;

use crate::datetime::Zone;
use crate::error::{RecurError, Result};
use crate::tz::{TimeZoneProvider, TzDatabase};

/// Default number of consecutive empty periods tolerated during expansion.
pub const DEFAULT_MAX_EMPTY_STEPS: u32 = 1000;

/// User facing settings for recurrence evaluation.
///
/// ```toml
/// max_empty_steps = 500
/// floating_time_zone = "Europe/Berlin"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct EvaluationConfig {
    /// How many periods in a row may produce no occurrence before the rule
    /// is reported as unresolvable.
    #[serde(default = "default_max_empty_steps")]
    pub max_empty_steps: u32,

    /// Zone used to place floating date-times on the timeline. Defaults to the
    /// system zone.
    #[serde(default)]
    pub floating_time_zone: Option<String>,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            max_empty_steps: DEFAULT_MAX_EMPTY_STEPS,
            floating_time_zone: None,
        }
    }
}

const fn default_max_empty_steps() -> u32 {
    DEFAULT_MAX_EMPTY_STEPS
}

impl EvaluationConfig {
    /// Load the configuration from a TOML document.
    ///
    /// ## Errors
    ///
    /// Returns [`RecurError::Config`] if the document is malformed or a value
    /// is out of range.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        if config.max_empty_steps == 0 {
            return Err(RecurError::Config(
                "max_empty_steps must be at least 1".to_owned(),
            ));
        }
        Ok(config)
    }

    /// Build a context backed by the bundled time zone database.
    ///
    /// ## Errors
    ///
    /// Returns [`RecurError::UnknownTimeZone`] if the floating zone is unknown.
    pub fn into_context(self) -> Result<EvaluationContext> {
        self.into_context_with(Arc::new(TzDatabase::new()))
    }

    /// Build a context backed by the given time zone provider.
    ///
    /// ## Errors
    ///
    /// Returns [`RecurError::UnknownTimeZone`] if the provider does not know
    /// the floating zone.
    pub fn into_context_with(
        self,
        time_zones: Arc<dyn TimeZoneProvider>,
    ) -> Result<EvaluationContext> {
        let floating = match self.floating_time_zone {
            Some(id) => id,
            None => system_time_zone(),
        };
        if !time_zones.contains(&floating) {
            return Err(RecurError::UnknownTimeZone(floating));
        }

        Ok(EvaluationContext::new(time_zones, floating).with_max_empty_steps(self.max_empty_steps))
    }
}

fn system_time_zone() -> String {
    match iana_time_zone::get_timezone() {
        Ok(id) => id,
        Err(err) => {
            tracing::warn!(%err, "failed to get system time zone, using UTC for floating times");
            "UTC".to_owned()
        }
    }
}

/// Everything evaluation needs besides the calendar data itself: the time
/// zone provider, the zone for floating times and the empty-step guard.
///
/// Cloning is cheap, the provider is shared.
#[derive(Debug, Clone)]
pub struct EvaluationContext {
    time_zones: Arc<dyn TimeZoneProvider>,
    floating_zone: Arc<str>,
    max_empty_steps: u32,
}

impl EvaluationContext {
    /// Create a context with the default empty-step limit.
    pub fn new(time_zones: Arc<dyn TimeZoneProvider>, floating_zone: impl Into<Arc<str>>) -> Self {
        Self {
            time_zones,
            floating_zone: floating_zone.into(),
            max_empty_steps: DEFAULT_MAX_EMPTY_STEPS,
        }
    }

    /// Context over the bundled time zone database with floating times in UTC.
    #[must_use]
    pub fn utc() -> Self {
        Self::new(Arc::new(TzDatabase::new()), "UTC")
    }

    /// Replace the empty-step limit, a zero limit is raised to one.
    #[must_use]
    pub fn with_max_empty_steps(mut self, steps: u32) -> Self {
        self.max_empty_steps = steps.max(1);
        self
    }

    /// The time zone provider.
    #[must_use]
    pub fn time_zones(&self) -> &dyn TimeZoneProvider {
        self.time_zones.as_ref()
    }

    /// Zone id used for floating values.
    #[must_use]
    pub fn floating_zone(&self) -> &str {
        &self.floating_zone
    }

    /// Maximum number of consecutive empty periods.
    #[must_use]
    pub fn max_empty_steps(&self) -> u32 {
        self.max_empty_steps
    }

    /// Whether both contexts resolve and bound evaluation the same way: the
    /// same provider, floating zone and empty-step limit.
    pub(crate) fn is_same(&self, other: &Self) -> bool {
        ptr::addr_eq(Arc::as_ptr(&self.time_zones), Arc::as_ptr(&other.time_zones))
            && self.floating_zone == other.floating_zone
            && self.max_empty_steps == other.max_empty_steps
    }

    /// Offset in effect at a wall-clock time of `zone`.
    pub(crate) fn offset_at(&self, zone: &Zone, wall: civil::DateTime) -> Result<Offset> {
        match zone {
            Zone::Utc => Ok(Offset::UTC),
            Zone::Floating => self.time_zones.offset_at(&self.floating_zone, wall),
            Zone::Named(id) => self.time_zones.offset_at(id, wall),
        }
    }

    /// Offset in effect at an instant in `zone`.
    pub(crate) fn offset_of(&self, zone: &Zone, instant: Timestamp) -> Result<Offset> {
        match zone {
            Zone::Utc => Ok(Offset::UTC),
            Zone::Floating => self.time_zones.offset_of(&self.floating_zone, instant),
            Zone::Named(id) => self.time_zones.offset_of(id, instant),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_config_with_defaults() {
        let config = EvaluationConfig::from_toml_str("").unwrap();
        assert_eq!(config, EvaluationConfig::default());
        assert_eq!(config.max_empty_steps, 1000);

        let config = EvaluationConfig::from_toml_str(
            r#"
            max_empty_steps = 20
            floating_time_zone = "Asia/Shanghai"
            "#,
        )
        .unwrap();
        assert_eq!(config.max_empty_steps, 20);
        assert_eq!(config.floating_time_zone.as_deref(), Some("Asia/Shanghai"));
    }

    #[test]
    fn rejects_bad_config() {
        let err = EvaluationConfig::from_toml_str("max_empty_steps = 0").unwrap_err();
        assert!(matches!(err, RecurError::Config(_)));

        let err = EvaluationConfig::from_toml_str("max_empty_steps = \"many\"").unwrap_err();
        assert!(matches!(err, RecurError::Config(_)));
    }

    #[test]
    fn builds_context() {
        let config = EvaluationConfig {
            max_empty_steps: 7,
            floating_time_zone: Some("America/New_York".to_owned()),
        };
        let ctx = config.into_context().unwrap();
        assert_eq!(ctx.floating_zone(), "America/New_York");
        assert_eq!(ctx.max_empty_steps(), 7);

        let config = EvaluationConfig {
            floating_time_zone: Some("Mars/Olympus_Mons".to_owned()),
            ..EvaluationConfig::default()
        };
        let err = config.into_context().unwrap_err();
        assert_eq!(err, RecurError::UnknownTimeZone("Mars/Olympus_Mons".to_owned()));
    }

    #[test]
    fn compares_contexts() {
        let ctx = EvaluationContext::utc();
        assert!(ctx.is_same(&ctx.clone()));
        assert!(!ctx.is_same(&ctx.clone().with_max_empty_steps(5)));
        assert!(!ctx.is_same(&EvaluationContext::utc()));

        let provider: Arc<dyn TimeZoneProvider> = Arc::new(TzDatabase::new());
        let a = EvaluationContext::new(Arc::clone(&provider), "UTC");
        let b = EvaluationContext::new(Arc::clone(&provider), "Europe/Paris");
        assert!(a.is_same(&EvaluationContext::new(provider, "UTC")));
        assert!(!a.is_same(&b));
    }
}
