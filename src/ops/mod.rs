//! High-level operations.
//!
//! This module contains the implementation behind the extras commands.

pub mod batch;
pub mod service;

pub use batch::{run as run_batch, BatchOptions, BatchReport};
pub use service::{ExtrasService, ServiceError};
