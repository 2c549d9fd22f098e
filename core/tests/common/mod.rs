// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Common test utilities for integration tests.
//!
//! This module provides shared test infrastructure including:
//! - Instant and calendar item factories (fixtures)
//! - Assertion helpers over evaluated periods

mod assertions;
mod fixtures;

#[allow(unused_imports)]
pub use assertions::{assert_within, walls};
#[allow(unused_imports)]
pub use fixtures::{NEW_YORK, at, custom_eastern, event, in_zone, todo, utc, window};
