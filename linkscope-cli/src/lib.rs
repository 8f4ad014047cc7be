//! CLI interface for linkscope
//!
//! Argument parsing, the neighbor table printout and the logging observer
//! used by the `linkscope` binary.

pub mod args;
pub mod display;
pub mod observer;

pub use args::{Cli, Commands, WatchArgs};
pub use observer::LoggingObserver;
