//! Top-level rename orchestration.

pub mod rename;

pub use rename::{RenameArgs, RenamePipeline, execute};
