//! # TransferDesk Core Library
//!
//! Domain types and storage contracts for TransferDesk.
//!
//! ## Modules
//!
//! - `domain` - Core entities (ConnectionRecord, Project) and the value
//!   objects used to test a connection (TestRequest, ConnectionTarget, TestOutcome)
//! - `repository` - Data access traits implemented by the storage crate

pub mod domain;
pub mod repository;

// Re-export commonly used types
pub use domain::*;
pub use repository::*;
