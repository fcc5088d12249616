// SPDX-FileCopyrightText: 2026 Remora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query categorization and web-content freshness decisions.
//!
//! The pipeline: query text -> [`CategoryClassifier`] -> category ->
//! [`FreshnessPolicy`] lookup -> max age; in parallel the cache supplies any
//! stored item and its capture time; [`FreshnessEngine::decide`] compares age
//! to max age and returns a verdict with a human-readable reason.
//!
//! The whole computation is pure and side-effect free. Storage lives behind
//! the [`CacheStore`] trait, the current time behind `remora_core::Clock`.

pub mod category;
pub mod decision;
pub mod policy;

pub use category::{CategoryClassifier, QueryCategory};
pub use decision::{normalize_key, CacheStore, CachedItem, Decision, FreshnessEngine};
pub use policy::{FreshnessPolicy, TemporalRequirement};
