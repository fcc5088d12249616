// SPDX-FileCopyrightText: 2026 Remora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across the seam traits and the Remora pipeline.

use serde::{Deserialize, Serialize};

/// Health status reported by seam health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Fully operational.
    Healthy,
    /// Operational but experiencing issues.
    Degraded(String),
    /// Not operational.
    Unhealthy(String),
}

/// A conversation session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Session identifier (UUID v4).
    pub id: String,
    /// Surface the session originates from ("cli", "api").
    pub channel: String,
    /// Optional user identifier.
    pub user_id: Option<String>,
    /// Session state ("active", "closed").
    pub state: String,
    /// ISO 8601 creation timestamp.
    pub created_at: String,
    /// ISO 8601 last-update timestamp.
    pub updated_at: String,
}

/// A persisted conversation message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Message identifier (UUID v4).
    pub id: String,
    /// Session this message belongs to.
    pub session_id: String,
    /// Role: "user" or "assistant".
    pub role: String,
    /// Message text.
    pub content: String,
    /// ISO 8601 creation timestamp.
    pub created_at: String,
}

// --- Provider types ---

/// A single message in a provider request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderMessage {
    /// Role: "user", "assistant", or "system".
    pub role: String,
    /// Message text.
    pub content: String,
}

/// A request to an LLM provider.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    /// Model name (providers may ignore it).
    pub model: String,
    /// System prompt, if any.
    pub system_prompt: Option<String>,
    /// Conversation messages in order, ending with the current user turn.
    pub messages: Vec<ProviderMessage>,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
}

/// A response from an LLM provider.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    /// Response identifier.
    pub id: String,
    /// Generated text.
    pub content: String,
    /// Model that produced the response.
    pub model: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_serializes_round_trip() {
        let session = Session {
            id: "sess-1".into(),
            channel: "cli".into(),
            user_id: Some("local".into()),
            state: "active".into(),
            created_at: "2026-03-01T00:00:00Z".into(),
            updated_at: "2026-03-01T00:00:00Z".into(),
        };
        let json = serde_json::to_string(&session).unwrap();
        let parsed: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, "sess-1");
        assert_eq!(parsed.state, "active");
    }

    #[test]
    fn provider_message_roles() {
        let msg = ProviderMessage {
            role: "user".into(),
            content: "hello".into(),
        };
        assert_eq!(msg.role, "user");
        assert_eq!(msg.content, "hello");
    }
}
