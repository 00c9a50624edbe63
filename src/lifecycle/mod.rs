//! Lifecycle management subsystem.
//!
//! Startup order is config first, then core, then the listener; shutdown is
//! signal → stop accepting → drain in-flight requests → exit.

pub mod shutdown;

pub use shutdown::{wait_for_signal, Shutdown};
