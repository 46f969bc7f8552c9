//! Salesforce client integration tests
//!
//! Token exchange and the sobjects probe against a mocked org.

mod probe;
