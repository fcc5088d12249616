// SPDX-FileCopyrightText: 2026 Remora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test doubles shared across the Remora workspace.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use remora_core::traits::{Clock, ProviderAdapter};
use remora_core::types::{HealthStatus, ProviderRequest, ProviderResponse};
use remora_core::RemoraError;

/// Provider double with a scripted response queue.
///
/// Pops one queued response per `complete` call; an empty queue yields a
/// canned placeholder so tests that don't care about content keep working.
pub struct MockProvider {
    responses: Mutex<VecDeque<String>>,
    /// Requests seen so far, for assertions on assembled context.
    requests: Mutex<Vec<ProviderRequest>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let provider = Self::new();
        {
            let mut queue = provider.responses.lock().expect("mock lock");
            queue.extend(responses.into_iter().map(Into::into));
        }
        provider
    }

    pub fn push_response(&self, response: impl Into<String>) {
        self.responses
            .lock()
            .expect("mock lock")
            .push_back(response.into());
    }

    /// All requests this provider has received.
    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().expect("mock lock").clone()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, RemoraError> {
        let model = request.model.clone();
        self.requests.lock().expect("mock lock").push(request);
        let content = self
            .responses
            .lock()
            .expect("mock lock")
            .pop_front()
            .unwrap_or_else(|| "mock response".to_string());
        Ok(ProviderResponse {
            id: Uuid::new_v4().to_string(),
            content,
            model,
        })
    }

    async fn health_check(&self) -> Result<HealthStatus, RemoraError> {
        Ok(HealthStatus::Healthy)
    }
}

/// Clock double pinned to a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Noon UTC on 2026-08-01, the fixture instant used across the suite.
    pub fn default_instant() -> Self {
        Self(Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
