//! Request auditing.
//!
//! Provides the audit record type, the sink trait implemented by storage
//! adapters, and the bounded queue that decouples sinks from the response path.

mod model;
mod queue;
mod sink;

pub use model::*;
pub use queue::*;
pub use sink::*;
