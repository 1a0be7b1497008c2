//! CLI command implementations.
//!
//! - `start`: resolve the agent configuration and start the agent pool

pub mod start;

pub use start::StartCommand;
