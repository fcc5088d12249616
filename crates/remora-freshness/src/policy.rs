// SPDX-FileCopyrightText: 2026 Remora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Freshness policy table and temporal requirements.
//!
//! The policy is built once from configuration and passed explicitly into
//! the decision function. Config validation guarantees every max age is
//! positive, so `max_age` is total over categories.

use chrono::Duration;
use remora_config::model::FreshnessConfig;
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::category::QueryCategory;

/// How urgently the query demands up-to-date information.
///
/// Derived heuristically from the query text; tightens the effective max age
/// below the category default when present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TemporalRequirement {
    /// "right now", "currently": only the last hour counts.
    Immediate,
    /// "today", "latest": content from the last day.
    Recent,
    /// "anything new since we talked": the caller supplies the last
    /// discussion time as the cutoff.
    UpdateSinceLast,
    /// No temporal signal; the category table applies unchanged.
    None,
}

impl TemporalRequirement {
    /// Detect a temporal requirement in the query text.
    ///
    /// `has_prior_discussion` distinguishes "latest news" (Recent) from
    /// "any news since we last talked" (UpdateSinceLast).
    pub fn from_query(query: &str, has_prior_discussion: bool) -> Self {
        let lower = query.to_lowercase();

        const IMMEDIATE: &[&str] = &["right now", "currently", "at the moment", "as of now"];
        const RECENT: &[&str] = &["today", "latest", "recent", "this morning", "tonight"];

        if IMMEDIATE.iter().any(|p| lower.contains(p)) {
            return Self::Immediate;
        }
        if has_prior_discussion && Self::is_update_phrase(query) {
            return Self::UpdateSinceLast;
        }
        if RECENT.iter().any(|p| lower.contains(p)) {
            return Self::Recent;
        }
        Self::None
    }

    /// Whether the query is phrased as a follow-up asking for updates.
    ///
    /// Callers use this before topic resolution: a follow-up with no topic
    /// of its own refers to the most recently discussed one.
    pub fn is_update_phrase(query: &str) -> bool {
        const UPDATE: &[&str] = &["anything new", "any update", "since we", "since last"];
        let lower = query.to_lowercase();
        UPDATE.iter().any(|p| lower.contains(p))
    }
}

/// Immutable per-category maximum-age table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreshnessPolicy {
    weather: Duration,
    traffic: Duration,
    stock: Duration,
    news: Duration,
    general: Duration,
    immediate: Duration,
    recent: Duration,
}

impl FreshnessPolicy {
    /// Build the policy from validated configuration.
    pub fn from_config(config: &FreshnessConfig) -> Self {
        Self {
            weather: hours(config.weather_max_age_hours),
            traffic: hours(config.traffic_max_age_hours),
            stock: hours(config.stock_max_age_hours),
            news: hours(config.news_max_age_hours),
            general: hours(config.general_max_age_hours),
            immediate: hours(config.immediate_max_age_hours),
            recent: hours(config.recent_max_age_hours),
        }
    }

    /// Maximum permitted age for a category.
    pub fn max_age(&self, category: QueryCategory) -> Duration {
        match category {
            QueryCategory::Weather => self.weather,
            QueryCategory::Traffic => self.traffic,
            QueryCategory::Stock => self.stock,
            QueryCategory::News => self.news,
            QueryCategory::General => self.general,
        }
    }

    /// Maximum permitted age after applying the temporal requirement.
    ///
    /// A temporal override never loosens the category threshold, only
    /// tightens it.
    pub fn effective_max_age(
        &self,
        category: QueryCategory,
        temporal: TemporalRequirement,
    ) -> Duration {
        let base = self.max_age(category);
        match temporal {
            TemporalRequirement::Immediate => base.min(self.immediate),
            TemporalRequirement::Recent | TemporalRequirement::UpdateSinceLast => {
                base.min(self.recent)
            }
            TemporalRequirement::None => base,
        }
    }
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self::from_config(&FreshnessConfig::default())
    }
}

// One century. Clamping keeps a huge configured age from wrapping negative
// or overflowing `Duration`, which would poison every freshness comparison.
const MAX_AGE_HOURS: i64 = 876_000;

fn hours(h: u64) -> Duration {
    Duration::hours(i64::try_from(h).unwrap_or(MAX_AGE_HOURS).min(MAX_AGE_HOURS))
}
