//! Gateway services
//!
//! - `ConnectionTester` runs a test and normalizes the outcome
//! - `StatusPersistenceBridge` writes the outcome back to the record store

mod persistence;
mod tester;

pub use persistence::StatusPersistenceBridge;
pub use tester::{ConnectionTester, TesterConfig};
