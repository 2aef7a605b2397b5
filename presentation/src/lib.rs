//! Presentation layer for tandem
//!
//! This crate contains the CLI definitions and console output formatting.

pub mod cli;
pub mod output;

// Re-export commonly used types
pub use cli::commands::{Cli, Command, KindArg, OutputFormat};
pub use output::console::ConsoleFormatter;
