mod errors;

pub use errors::{Result, WandboxError};
