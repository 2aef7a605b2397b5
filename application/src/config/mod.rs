//! Application-level configuration.
//!
//! - [`EngineConfig`]: policy switches for the voting orchestrator

pub mod engine_config;

pub use engine_config::EngineConfig;
