//! Compile pipeline
//!
//! Directory cache → compiler picker → payload builder → orchestrator.

mod directory;
mod orchestrator;
mod payload;
mod picker;

pub use directory::{Directory, DirectoryCache};
pub use orchestrator::Orchestrator;
pub use payload::{build_request, simplified_payload};
pub use picker::CompilerPicker;
