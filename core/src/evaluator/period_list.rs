// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeSet;
use std::fmt;

use recurcal_ical::{ValueDateList, parse_date_list};

use crate::config::EvaluationContext;
use crate::datetime::{Instant, Period};
use crate::error::Result;

/// The values of one RDATE or EXDATE property with its TZID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodList {
    tzid: Option<String>,
    values: ValueDateList,
}

impl PeriodList {
    /// Wrap already parsed values.
    #[must_use]
    pub fn new(values: ValueDateList, tzid: Option<&str>) -> Self {
        Self {
            tzid: tzid.map(ToOwned::to_owned),
            values,
        }
    }

    /// Parse a property value such as `20240101T090000,20240102T090000`.
    ///
    /// ## Errors
    ///
    /// Returns [`crate::RecurError::Parse`] if the value is malformed.
    pub fn parse(value: &str, tzid: Option<&str>) -> Result<Self> {
        Ok(Self::new(parse_date_list(value)?, tzid))
    }

    /// The TZID parameter.
    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        self.tzid.as_deref()
    }

    /// The raw values.
    #[must_use]
    pub fn values(&self) -> &ValueDateList {
        &self.values
    }

    /// Number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the list holds no value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Resolve every value to a period. Only PERIOD values carry an extent.
    ///
    /// ## Errors
    ///
    /// Returns an error for invalid dates, unknown zones or periods whose
    /// end is not after their start.
    pub fn periods(&self, ctx: &EvaluationContext) -> Result<Vec<Period>> {
        let tzid = self.tzid();
        match &self.values {
            ValueDateList::Date(dates) => dates
                .iter()
                .map(|d| Period::new(Instant::from_value_date(*d, tzid, ctx)?, ctx))
                .collect(),
            ValueDateList::DateTime(date_times) => date_times
                .iter()
                .map(|dt| Period::new(Instant::from_value_date_time(dt, tzid, ctx)?, ctx))
                .collect(),
            ValueDateList::Period(periods) => periods
                .iter()
                .map(|p| Period::from_value(p, tzid, ctx))
                .collect(),
        }
    }
}

impl fmt::Display for PeriodList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.values, f)
    }
}

/// Evaluates a literal RDATE or EXDATE list.
#[derive(Debug, Clone, Copy)]
pub struct PeriodListEvaluator<'a> {
    list: &'a PeriodList,
}

impl<'a> PeriodListEvaluator<'a> {
    /// Evaluator over `list`.
    #[must_use]
    pub fn new(list: &'a PeriodList) -> Self {
        Self { list }
    }

    /// All periods of the list, plus `reference` when given.
    ///
    /// The result is not limited to any query window; callers intersect it
    /// with theirs.
    ///
    /// ## Errors
    ///
    /// Returns an error if a value cannot be resolved.
    pub fn evaluate(
        &self,
        reference: Option<&Instant>,
        ctx: &EvaluationContext,
    ) -> Result<BTreeSet<Period>> {
        let mut periods: BTreeSet<Period> = self.list.periods(ctx)?.into_iter().collect();
        if let Some(reference) = reference {
            periods.insert(Period::new(reference.clone(), ctx)?);
        }
        Ok(periods)
    }
}
