//! Dashboard state and the operations that mutate it.

/// Fetches that update a shared state signal.
pub mod actions;
mod observatory;

pub use observatory::{Crumb, ObservatoryState, RequestTicket};
