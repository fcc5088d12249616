// SPDX-FileCopyrightText: 2026 Remora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Remora chatbot.
//!
//! This crate provides the foundational trait definitions, error types, and
//! common types used throughout the Remora workspace: the LLM provider seam,
//! the conversation storage seam, and the clock seam that the freshness
//! decision logic depends on.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::RemoraError;
pub use types::{HealthStatus, Message, Session};

pub use traits::{Clock, ProviderAdapter, StorageAdapter, SystemClock};
