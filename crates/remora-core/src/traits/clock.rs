// SPDX-FileCopyrightText: 2026 Remora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Clock seam.
//!
//! The freshness decision only does duration arithmetic, so the clock needs
//! to be monotonic-enough for age comparisons, not a scheduling primitive.

use chrono::{DateTime, Utc};

/// Supplies the current time to the decision logic.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
