// SPDX-FileCopyrightText: 2026 Remora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Offline extractive provider.
//!
//! Answers from the assembled context instead of calling a hosted model:
//! personal questions echo the matching profile fact, fresh-content
//! questions quote the cached web snippet, and everything else falls back
//! to prior conversation context or an honest "nothing on that yet".
//! Implements the same [`ProviderAdapter`] seam a hosted client would.

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use remora_core::traits::ProviderAdapter;
use remora_core::types::{HealthStatus, ProviderRequest, ProviderResponse};
use remora_core::RemoraError;

const USER_FACTS_HEADER: &str = "**User Facts:**";
const CONVERSATION_HEADER: &str = "**Previous Conversation Context:**";
const WEB_HEADER: &str = "**Current Web Information:**";

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "are", "was", "what", "whats", "where", "who", "when", "how", "you",
    "your", "can", "tell", "about", "any", "have", "has", "does",
];

/// Context-grounded responder with no network dependency.
#[derive(Debug, Clone, Default)]
pub struct ExtractiveProvider;

impl ExtractiveProvider {
    pub fn new() -> Self {
        Self
    }

    fn respond(&self, request: &ProviderRequest) -> String {
        let query = request
            .messages
            .iter()
            .rev()
            .find(|m| m.role == "user")
            .map(|m| m.content.as_str())
            .unwrap_or_default();

        let context: String = request
            .messages
            .iter()
            .filter(|m| m.role == "system")
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let facts = section_items(&context, USER_FACTS_HEADER);
        let conversation = section_items(&context, CONVERSATION_HEADER);
        let web = section_items(&context, WEB_HEADER);

        let query_words = significant_words(query);

        // A profile fact that shares a keyword with the question answers it.
        if let Some(fact) = facts
            .iter()
            .find(|fact| overlaps(&query_words, fact))
        {
            return format!("From what you've told me, {}.", uncapitalize(fact));
        }

        if let Some(snippet) = web.first() {
            return format!("Here's the latest I have: {snippet}");
        }

        if let Some(memory) = conversation
            .iter()
            .find(|memory| overlaps(&query_words, memory))
        {
            return format!("Picking up from earlier: {memory}");
        }

        "I don't have anything on that yet. Tell me more and I'll remember it.".to_string()
    }
}

/// Bullet items under a section header, stripped of the leading dash.
fn section_items(context: &str, header: &str) -> Vec<String> {
    let Some(start) = context.find(header) else {
        return vec![];
    };
    context[start + header.len()..]
        .lines()
        .skip_while(|line| line.trim().is_empty())
        .take_while(|line| line.trim_start().starts_with("- "))
        .map(|line| line.trim_start().trim_start_matches("- ").to_string())
        .collect()
}

fn significant_words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() > 2 && !STOPWORDS.contains(w))
        .map(|w| w.to_string())
        .collect()
}

fn overlaps(query_words: &[String], candidate: &str) -> bool {
    let lower = candidate.to_lowercase();
    query_words.iter().any(|word| lower.contains(word.as_str()))
}

fn uncapitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[async_trait]
impl ProviderAdapter for ExtractiveProvider {
    fn name(&self) -> &str {
        "extractive"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, RemoraError> {
        let content = self.respond(&request);
        debug!(chars = content.len(), "extractive response");
        Ok(ProviderResponse {
            id: Uuid::new_v4().to_string(),
            content,
            model: request.model,
        })
    }

    async fn health_check(&self) -> Result<HealthStatus, RemoraError> {
        Ok(HealthStatus::Healthy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use remora_core::types::ProviderMessage;

    fn request(context: Option<&str>, query: &str) -> ProviderRequest {
        let mut messages = Vec::new();
        if let Some(context) = context {
            messages.push(ProviderMessage {
                role: "system".to_string(),
                content: context.to_string(),
            });
        }
        messages.push(ProviderMessage {
            role: "user".to_string(),
            content: query.to_string(),
        });
        ProviderRequest {
            model: "extractive-v1".to_string(),
            system_prompt: Some("You are remora.".to_string()),
            messages,
            max_tokens: 256,
        }
    }

    #[tokio::test]
    async fn answers_personal_question_from_facts() {
        let context = "**User Facts:**\n- User's name is Alice\n- User works at Acme\n";
        let response = ExtractiveProvider::new()
            .complete(request(Some(context), "what's my name?"))
            .await
            .unwrap();
        assert!(response.content.contains("user's name is Alice"));
    }

    #[tokio::test]
    async fn quotes_web_snippet() {
        let context = "**Current Web Information:**\n- Sunny, 22C (source: https://example.com/wx)\n";
        let response = ExtractiveProvider::new()
            .complete(request(Some(context), "weather in Paris?"))
            .await
            .unwrap();
        assert!(response.content.contains("Sunny, 22C"));
    }

    #[tokio::test]
    async fn matching_fact_beats_web_snippet() {
        let context = "**User Facts:**\n- User works at Acme\n\n**Current Web Information:**\n- Traffic is heavy downtown\n";
        let response = ExtractiveProvider::new()
            .complete(request(Some(context), "where do I work?"))
            .await
            .unwrap();
        assert!(response.content.contains("Acme"));
    }

    #[tokio::test]
    async fn falls_back_to_conversation_context() {
        let context = "**Previous Conversation Context:**\n- I asked about hiking trails near Denver\n";
        let response = ExtractiveProvider::new()
            .complete(request(Some(context), "those hiking trails again?"))
            .await
            .unwrap();
        assert!(response.content.contains("hiking trails near Denver"));
    }

    #[tokio::test]
    async fn empty_context_gets_honest_fallback() {
        let response = ExtractiveProvider::new()
            .complete(request(None, "what's the meaning of life?"))
            .await
            .unwrap();
        assert!(response.content.contains("don't have anything"));
    }

    #[test]
    fn section_items_stop_at_next_header() {
        let context = "**User Facts:**\n- fact one\n\n**Current Web Information:**\n- snippet\n";
        let facts = section_items(context, USER_FACTS_HEADER);
        assert_eq!(facts, vec!["fact one".to_string()]);
    }
}
