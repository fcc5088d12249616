// SPDX-FileCopyrightText: 2026 Remora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat orchestration for Remora.
//!
//! Ties the memory store, freshness engine, context engine, and provider
//! seam together into per-turn pipeline: analyze, decide, assemble, respond,
//! remember.

pub mod analysis;
pub mod extractive;
pub mod session;

pub use analysis::{QueryAnalysis, QueryAnalyzer};
pub use extractive::ExtractiveProvider;
pub use session::{Agent, TurnOutcome, TurnRequest};
