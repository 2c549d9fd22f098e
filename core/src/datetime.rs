// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

mod instant;
mod period;

pub use instant::{Instant, Zone};
pub use period::Period;
