//! File system operations staged through a transaction.
//!
//! Operations are validated as a unit, then applied in the order they were
//! staged.

pub mod transaction;

pub use transaction::{Operation, Transaction};
