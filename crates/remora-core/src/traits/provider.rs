// SPDX-FileCopyrightText: 2026 Remora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! LLM provider seam.

use async_trait::async_trait;

use crate::error::RemoraError;
use crate::types::{HealthStatus, ProviderRequest, ProviderResponse};

/// An LLM provider that turns an assembled request into a response.
///
/// Remora ships an offline extractive implementation; hosted-API clients
/// would implement this same trait.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Short provider name for logs and status output.
    fn name(&self) -> &str;

    /// Generate a completion for the request.
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, RemoraError>;

    /// Report provider health.
    async fn health_check(&self) -> Result<HealthStatus, RemoraError>;
}
