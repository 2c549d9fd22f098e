// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Evaluators turning recurrence data into concrete periods.

mod cache;
mod expand;
mod item;
mod period_list;
mod rule;

pub(crate) use expand::Expansion;
pub use item::RecurringItemEvaluator;
pub use period_list::{PeriodList, PeriodListEvaluator};
pub use rule::RecurrenceRuleEvaluator;
