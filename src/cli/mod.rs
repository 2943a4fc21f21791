//! Command-line interface for scene-forge.
//!
//! Provides the single generation command: load manifests, generate the
//! requested scenes, and optionally run the grasp visualization pass.

mod commands;

pub use commands::{parse_cli, run_with_cli, Cli};
