use anyhow::Result;
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use std::collections::VecDeque;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};
use wandbox_engine::host::StdoutLog;
use wandbox_engine::{Document, EditorHost, Engine, HttpApi, WandboxError};

/// Compile files on a remote Wandbox-compatible service
#[derive(Parser, Debug)]
#[command(name = "wandbox")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    /// Server URL, overriding the configured default
    #[arg(short, long)]
    server: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the compilers the server supports
    List,
    /// Fetch and print the raw compiler directory JSON
    Raw,
    /// Show one compiler's descriptor
    Show {
        /// Compiler name, e.g. clang-head
        name: String,
    },
    /// Compile a file remotely
    Compile {
        /// Primary source file
        file: PathBuf,

        /// Companion files submitted alongside the primary one
        #[arg(short = 'a', long = "additional")]
        additionals: Vec<PathBuf>,

        /// Compiler name, overriding the automatic choice
        #[arg(short, long)]
        compiler: Option<String>,

        /// Comma-separated compile options
        #[arg(short, long)]
        options: Option<String>,

        /// File whose contents are passed as stdin
        #[arg(long)]
        stdin_file: Option<PathBuf>,

        /// Store the run on the server and print a share URL
        #[arg(long)]
        save: bool,
    },
}

/// Filesystem-backed host: the command-line arguments play the role of
/// the editor's open buffers, interactive prompts fall back to the
/// terminal.
struct CliHost {
    documents: Vec<Document>,
    seeded_inputs: Mutex<VecDeque<String>>,
}

impl CliHost {
    fn new(documents: Vec<Document>, seeded_inputs: Vec<String>) -> Self {
        Self {
            documents,
            seeded_inputs: Mutex::new(seeded_inputs.into()),
        }
    }

    fn read_terminal_line(prompt: &str) -> Option<String> {
        eprint!("{}: ", prompt);
        std::io::stderr().flush().ok()?;
        let mut line = String::new();
        match std::io::stdin().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    }
}

#[async_trait]
impl EditorHost for CliHost {
    fn active_document(&self) -> Option<Document> {
        self.documents.first().cloned()
    }

    fn open_documents(&self) -> Vec<Document> {
        self.documents.clone()
    }

    async fn create_untitled_document(&self) -> wandbox_engine::Result<()> {
        Err(WandboxError::Config(
            "untitled documents are not supported in the CLI".to_string(),
        ))
    }

    async fn insert_at_start(&self, _document_id: &str, _text: &str) -> wandbox_engine::Result<()> {
        Err(WandboxError::Config(
            "buffer edits are not supported in the CLI".to_string(),
        ))
    }

    async fn show_quick_pick(&self, placeholder: &str, items: &[String]) -> Option<String> {
        if let Some(seeded) = self.seeded_inputs.lock().ok().and_then(|mut q| q.pop_front()) {
            return Some(seeded);
        }
        for (index, item) in items.iter().enumerate() {
            eprintln!("  {}) {}", index + 1, item);
        }
        let reply = Self::read_terminal_line(placeholder)?;
        if let Ok(index) = reply.parse::<usize>() {
            if (1..=items.len()).contains(&index) {
                return Some(items[index - 1].clone());
            }
        }
        items.iter().find(|i| **i == reply).cloned()
    }

    async fn show_input_box(&self, prompt: &str, _value: Option<&str>) -> Option<String> {
        if let Some(seeded) = self.seeded_inputs.lock().ok().and_then(|mut q| q.pop_front()) {
            return Some(seeded);
        }
        Self::read_terminal_line(prompt)
    }

    async fn open_external(&self, url: &str) -> wandbox_engine::Result<()> {
        println!("🔗 {}", url);
        Ok(())
    }

    async fn show_readonly_document(&self, _title: &str, content: &str) -> wandbox_engine::Result<()> {
        println!("{}", content);
        Ok(())
    }
}

fn setup_logging(log_level: &str) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn load_document(path: &PathBuf) -> Result<Document> {
    let text = std::fs::read_to_string(path)?;
    Ok(Document {
        id: path.display().to_string(),
        language_id: None,
        text,
        untitled: false,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(&args.log_level)?;

    info!("Starting wandbox v{}", env!("CARGO_PKG_VERSION"));

    let config = wandbox_engine::config::load()?;

    let (documents, seeded) = match &args.command {
        Command::Compile {
            file, additionals, ..
        } => {
            let mut documents = vec![load_document(file)?];
            for path in additionals {
                documents.push(load_document(path)?);
            }
            (documents, Vec::new())
        }
        Command::Show { name } => (Vec::new(), vec![name.clone()]),
        _ => (Vec::new(), Vec::new()),
    };

    let host = Arc::new(CliHost::new(documents, seeded));
    let engine = Engine::new(
        config,
        Arc::new(HttpApi::new()),
        host.clone(),
        Arc::new(StdoutLog),
    );

    // Per-invocation overrides become per-file settings, the same path
    // an editor integration uses
    if let Some(document) = host.active_document() {
        let key = document.id.clone();
        if let Some(server) = &args.server {
            let server = server.clone();
            engine.settings().update(&key, |s| s.server = Some(server)).await;
        }
        if let Command::Compile {
            compiler,
            options,
            stdin_file,
            additionals,
            ..
        } = &args.command
        {
            if let Some(compiler) = compiler.clone() {
                engine
                    .settings()
                    .update(&key, |s| s.compiler = Some(compiler))
                    .await;
            }
            if let Some(options) = options.clone() {
                engine
                    .settings()
                    .update(&key, |s| s.options = Some(options))
                    .await;
            }
            if let Some(path) = stdin_file {
                let stdin = std::fs::read_to_string(path)?;
                engine.settings().update(&key, |s| s.stdin = Some(stdin)).await;
            }
            if !additionals.is_empty() {
                let names: Vec<String> = host.open_documents()[1..]
                    .iter()
                    .map(|d| d.file_name().to_string())
                    .collect();
                engine
                    .settings()
                    .update(&key, |s| s.additionals = Some(names))
                    .await;
            }
        }
    } else if let Some(server) = &args.server {
        let server = server.clone();
        engine
            .settings()
            .update(wandbox_engine::config::DEFAULT_KEY, |s| s.server = Some(server))
            .await;
    }

    let outcome = match &args.command {
        Command::List => engine.show_list().await,
        Command::Raw => engine.show_raw_list().await,
        Command::Show { .. } => engine.show_item().await,
        Command::Compile { save, .. } => engine.compile(*save).await.map(|_| ()),
    };

    // Failures were already rendered into the output channel
    if outcome.is_err() {
        std::process::exit(1);
    }
    Ok(())
}
