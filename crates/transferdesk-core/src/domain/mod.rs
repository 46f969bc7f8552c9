//! Domain entities and value objects
//!
//! - Entities: ConnectionRecord, Project
//! - Value objects: ConnectionKind, ConnectionStatus, ConnectionTarget, TestOutcome
//! - Requests: TestRequest (one connectivity check, optionally persisted)

mod connection;
mod project;

pub use connection::*;
pub use connection_test::*;
pub use project::*;
