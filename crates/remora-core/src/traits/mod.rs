// SPDX-FileCopyrightText: 2026 Remora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Seam traits between the Remora pipeline and its collaborators.
//!
//! The freshness decision core is pure; everything that touches the outside
//! world (LLM providers, the SQLite store, wall-clock time) sits behind a
//! trait defined here so it can be swapped in tests.

pub mod clock;
pub mod provider;
pub mod storage;

pub use clock::{Clock, SystemClock};
pub use provider::ProviderAdapter;
pub use storage::StorageAdapter;
