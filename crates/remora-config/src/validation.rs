// SPDX-FileCopyrightText: 2026 Remora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation.
//!
//! Semantic constraints serde attributes cannot express: positive freshness
//! ages, threshold ranges, non-empty keyword lists and paths, a parseable
//! bind address.

use crate::diagnostic::ConfigError;
use crate::model::RemoraConfig;

/// One century in hours. Ages past this would overflow signed duration math
/// downstream.
const MAX_AGE_HOURS: u64 = 876_000;

/// Validate a deserialized configuration.
///
/// Collects all failures instead of stopping at the first one.
pub fn validate_config(config: &RemoraConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    // Every freshness max age must be a positive number of hours.
    let ages = [
        ("weather_max_age_hours", config.freshness.weather_max_age_hours),
        ("traffic_max_age_hours", config.freshness.traffic_max_age_hours),
        ("stock_max_age_hours", config.freshness.stock_max_age_hours),
        ("news_max_age_hours", config.freshness.news_max_age_hours),
        ("general_max_age_hours", config.freshness.general_max_age_hours),
        (
            "immediate_max_age_hours",
            config.freshness.immediate_max_age_hours,
        ),
        ("recent_max_age_hours", config.freshness.recent_max_age_hours),
    ];
    for (name, hours) in ages {
        if hours == 0 {
            errors.push(ConfigError::Validation {
                message: format!("freshness.{name} must be at least 1 hour"),
            });
        }
        if hours > MAX_AGE_HOURS {
            errors.push(ConfigError::Validation {
                message: format!(
                    "freshness.{name} must be at most {MAX_AGE_HOURS} hours, got {hours}"
                ),
            });
        }
    }

    // Empty keyword lists would make a category unreachable.
    let keyword_lists = [
        ("weather_keywords", &config.freshness.weather_keywords),
        ("traffic_keywords", &config.freshness.traffic_keywords),
        ("stock_keywords", &config.freshness.stock_keywords),
        ("news_keywords", &config.freshness.news_keywords),
    ];
    for (name, keywords) in keyword_lists {
        if keywords.is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("freshness.{name} must not be empty"),
            });
        }
        if keywords.iter().any(|k| k.trim().is_empty()) {
            errors.push(ConfigError::Validation {
                message: format!("freshness.{name} contains a blank keyword"),
            });
        }
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if !(0.0..=1.0).contains(&config.memory.dedup_threshold) {
        errors.push(ConfigError::Validation {
            message: format!(
                "memory.dedup_threshold must be between 0.0 and 1.0, got {}",
                config.memory.dedup_threshold
            ),
        });
    }

    if config.memory.recency_half_life_hours <= 0.0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "memory.recency_half_life_hours must be positive, got {}",
                config.memory.recency_half_life_hours
            ),
        });
    }

    if config.memory.max_retrieval_results == 0 {
        errors.push(ConfigError::Validation {
            message: "memory.max_retrieval_results must be at least 1".to_string(),
        });
    }

    if config.context.history_limit < 0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "context.history_limit must be non-negative, got {}",
                config.context.history_limit
            ),
        });
    }

    let addr = config.gateway.bind_address.trim();
    if addr.is_empty() {
        errors.push(ConfigError::Validation {
            message: "gateway.bind_address must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = addr.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = addr
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!(
                    "gateway.bind_address `{addr}` is not a valid IP address or hostname"
                ),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = RemoraConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn zero_max_age_fails_validation() {
        let mut config = RemoraConfig::default();
        config.freshness.traffic_max_age_hours = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("traffic_max_age_hours"))
        ));
    }

    #[test]
    fn oversized_max_age_fails_validation() {
        let mut config = RemoraConfig::default();
        config.freshness.general_max_age_hours = u64::MAX;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("general_max_age_hours"))
        ));
    }

    #[test]
    fn empty_keyword_list_fails_validation() {
        let mut config = RemoraConfig::default();
        config.freshness.news_keywords.clear();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("news_keywords"))
        ));
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = RemoraConfig::default();
        config.storage.database_path = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("database_path"))
        ));
    }

    #[test]
    fn out_of_range_dedup_threshold_fails() {
        let mut config = RemoraConfig::default();
        config.memory.dedup_threshold = 1.5;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("dedup_threshold"))
        ));
    }

    #[test]
    fn garbage_bind_address_fails() {
        let mut config = RemoraConfig::default();
        config.gateway.bind_address = "not a host!".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("bind_address"))
        ));
    }

    #[test]
    fn collects_multiple_errors() {
        let mut config = RemoraConfig::default();
        config.freshness.weather_max_age_hours = 0;
        config.storage.database_path = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.len() >= 2);
    }
}
