//! A2P Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, logging and error handling for the A2P onboarding workspace.
//!
//! # Overview
//!
//! - **Error Handling**: [`A2pError`] and the [`Result`] alias used by the checkpoint layer
//! - **Logging**: `tracing` subscriber setup shared by every binary
//! - **Types**: the remote status vocabulary (evaluation, bundle, brand, campaign)
//!
//! # Example
//!
//! ```no_run
//! use a2p_common::types::BrandStatus;
//!
//! let status: BrandStatus = "APPROVED".parse().unwrap();
//! assert!(status.is_approved());
//! ```

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{A2pError, Result};
