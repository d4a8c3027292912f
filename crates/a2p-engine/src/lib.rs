//! A2P Engine
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Row-level provisioning engine for US A2P 10DLC onboarding.
//!
//! # Overview
//!
//! Each row of the checkpoint file describes one business. The engine drives
//! every row through a fixed chain of remote registrations (customer profile,
//! trust bundle, brand, messaging service, campaign), writing the identifiers
//! it obtains back onto the row so the next run can pick up where this one
//! stopped.
//!
//! - [`checkpoint`]: reads and writes the CSV checkpoint, rejecting unknown headers
//! - [`record`]: the per-row [`RecordState`]
//! - [`state`]: derives where a row stands from the fields it already carries
//! - [`pipeline`]: the step-by-step state machine for one row
//! - [`limiter`] / [`runner`]: bounded fan-out of rows and failure isolation
//! - [`passes`]: the batch entry points (register, resume, refresh, attach, update)
//! - [`remote`]: the registration service client
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use a2p_engine::{checkpoint, passes::RegisterPass, BatchRunner, EngineConfig};
//! use a2p_engine::remote::{ApiHosts, Credentials, TwilioProvider};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let records = checkpoint::read_checkpoint("applicants.csv".as_ref())?;
//! let provider = TwilioProvider::new(
//!     Credentials::new("AC...", "token"),
//!     ApiHosts::production(),
//!     std::time::Duration::from_secs(60),
//! )?;
//! let config = Arc::new(EngineConfig::default());
//! let pass = Arc::new(RegisterPass::new(Arc::new(provider), config.clone()));
//! let outcome = BatchRunner::new(config.concurrency).run(pass, records).await;
//! checkpoint::write_checkpoint("applicants.out.csv".as_ref(), &outcome.records)?;
//! # Ok(())
//! # }
//! ```

pub mod checkpoint;
pub mod config;
pub mod error;
pub mod limiter;
pub mod passes;
pub mod pipeline;
pub mod poll;
pub mod record;
pub mod remote;
pub mod runner;
pub mod schema;
pub mod session;
pub mod state;

// Re-export commonly used types
pub use config::{EngineConfig, Timings};
pub use error::{ErrorKind, RecordError, RemoteError, Step};
pub use limiter::Limiter;
pub use record::RecordState;
pub use runner::{BatchOutcome, BatchReport, BatchRunner, RowPass};
pub use state::{derive_state, ProvisioningState};
