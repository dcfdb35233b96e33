//! Core components of the `ccass-rs` client.
//!
//! This module contains the foundational building blocks of the library:
//! - The main [`CcassClient`] and its builder.
//! - The primary [`CcassError`] type.
//! - Shared data models like [`HoldingRecord`] and [`SummaryRecord`].
//! - Internal networking helpers.

/// The main client (`CcassClient`), builder, and endpoint configuration.
pub mod client;
/// The primary error type (`CcassError`) for the crate.
pub mod error;
/// Shared data models used across the snapshot, reconcile and store modules.
pub mod models;

pub(crate) mod net;

// convenient re-exports so most code can just `use crate::core::CcassClient`
pub use client::{CcassClient, CcassClientBuilder};
pub use error::CcassError;
pub use models::{HoldingRecord, SummaryRecord};
