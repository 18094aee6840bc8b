use thiserror::Error;

#[derive(Error, Debug)]
pub enum WandboxError {
    #[error("No active document")]
    NoActiveFile,

    #[error("Unknown language for \"{0}\"")]
    UnknownLanguage(String),

    #[error("Unknown compiler: {0}")]
    UnknownCompiler(String),

    #[error("Compiler directory unavailable for {server}: {reason}")]
    DirectoryUnavailable { server: String, reason: String },

    #[error("Companion file(s) not open: {}", .0.join(", "))]
    CompanionFileNotOpen(Vec<String>),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Protocol error: HTTP {status}")]
    Protocol { status: u16, body: String },

    #[error("Invalid settings JSON: {0}")]
    SettingParse(#[from] serde_json::Error),

    #[error("A pending document operation is already active")]
    PendingDocumentBusy,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, WandboxError>;
