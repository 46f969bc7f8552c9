//! Request correlation for gateway logs
//!
//! Each request gets a short trace id; every line logged while handling it
//! runs inside a `request` span carrying that id.

mod trace_context;

pub use trace_context::{generate_trace_id, RequestSpan, TraceContext};
