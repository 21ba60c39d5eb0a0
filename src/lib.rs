//! modoc - Documentation content resolution and example classification
//!
//! This library decides which standard documents (README, CHANGELOG,
//! LICENSE, ...) a module site shows when local and remote copies compete,
//! parses command help into typed reference models, and splits usage
//! examples into runnable code and narrative remarks.

pub mod cli;
pub mod example;
pub mod help;
pub mod plan;
pub mod remote;
pub mod source;

/// Re-export commonly used types
pub use example::{ExampleSegmenter, Segmented};
pub use help::{CommandHelpModel, HelpContentParser, HelpInput};
pub use plan::{MergeMode, SelectionPlanner, SelectionRequest, SelectionResult};
pub use source::{DocumentItem, DocumentKind, SourceResolver};

/// Application-wide error type
pub use anyhow::Result;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "modoc";
