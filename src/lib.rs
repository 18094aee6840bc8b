//! wandbox-engine - compile-as-a-service client engine
//!
//! This crate sends the contents of an open document (plus optional
//! companion files, stdin and compiler flags) to a Wandbox-compatible
//! remote compile service and renders structured results back through
//! the host editor's output channel. The host editor itself is
//! abstracted behind traits, so the engine runs equally under a real
//! editor integration or the bundled CLI.

pub mod api;
pub mod compile;
pub mod config;
pub mod engine;
pub mod host;
pub mod pending;
pub mod types;

pub use api::{HttpApi, WandboxApi};
pub use engine::Engine;
pub use host::{Document, EditorHost, LogSink};
pub use types::{Result, WandboxError};
