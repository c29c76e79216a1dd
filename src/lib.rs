#![doc = include_str!("../README.md")]

pub mod error;
pub mod fs;
pub mod git;
pub mod steps;
pub mod verify;

pub use error::*;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn run() -> Result<()> {
    use clap::Parser;

    let args = steps::RenameArgs::parse();
    steps::execute(args)
}
