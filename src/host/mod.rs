//! Host editor abstraction
//!
//! The engine never talks to a concrete editor. Everything it needs from
//! the surrounding host — documents, prompts, side effects, the visible
//! output channel — comes through these traits.

use crate::types::Result;
use async_trait::async_trait;

/// A snapshot of one open document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// File identity: the path for saved files, a synthetic name
    /// (e.g. "Untitled-1") for transient buffers
    pub id: String,

    /// Editor language id (e.g. "cpp"), when the host knows one
    pub language_id: Option<String>,

    /// Live buffer text
    pub text: String,

    /// True for buffers that were never persisted to disk
    pub untitled: bool,
}

impl Document {
    /// Base name: path stripped of directories, both `/` and `\`
    /// separators.
    pub fn file_name(&self) -> &str {
        self.id
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.id.as_str())
    }

    /// Substring after the last `.` of the base name; names with no `.`
    /// have no extension. Dotfiles count: ".bashrc" has extension
    /// "bashrc".
    pub fn extension(&self) -> Option<&str> {
        self.file_name().rsplit_once('.').map(|(_, ext)| ext)
    }
}

/// Operations the engine requires from the host editor.
#[async_trait]
pub trait EditorHost: Send + Sync {
    /// The document the user is currently acting on, if any.
    fn active_document(&self) -> Option<Document>;

    /// All currently open documents, in host order.
    fn open_documents(&self) -> Vec<Document>;

    /// Create and activate a new untitled buffer. The engine observes the
    /// result later through a `document_activated` event, never here.
    async fn create_untitled_document(&self) -> Result<()>;

    /// Insert text at the start of the identified buffer.
    async fn insert_at_start(&self, document_id: &str, text: &str) -> Result<()>;

    /// Present an ordered set of choices; `None` means cancelled.
    async fn show_quick_pick(&self, placeholder: &str, items: &[String]) -> Option<String>;

    /// Free-text input with an optional pre-filled value; `None` means
    /// cancelled, an empty string is a deliberate empty answer.
    async fn show_input_box(&self, prompt: &str, value: Option<&str>) -> Option<String>;

    /// Open a URL with the system handler.
    async fn open_external(&self, url: &str) -> Result<()>;

    /// Display arbitrary text as a read-only virtual document.
    async fn show_readonly_document(&self, title: &str, content: &str) -> Result<()>;
}

/// Append-only, line-oriented, user-visible output channel.
pub trait LogSink: Send + Sync {
    fn append_line(&self, line: &str);

    /// Bring the channel to the foreground.
    fn show(&self) {}
}

/// Log sink writing to stdout, used by the CLI binary.
pub struct StdoutLog;

impl LogSink for StdoutLog {
    fn append_line(&self, line: &str) {
        println!("{}", line);
    }
}

#[cfg(test)]
pub mod fakes {
    //! Scripted host and in-memory log for tests

    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MemoryLog {
        lines: Mutex<Vec<String>>,
    }

    impl MemoryLog {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn lines(&self) -> Vec<String> {
            self.lines.lock().unwrap().clone()
        }

        pub fn contains(&self, needle: &str) -> bool {
            self.lines().iter().any(|l| l.contains(needle))
        }

        /// Index of the first line containing `needle`, for order checks.
        pub fn position(&self, needle: &str) -> Option<usize> {
            self.lines().iter().position(|l| l.contains(needle))
        }
    }

    impl LogSink for MemoryLog {
        fn append_line(&self, line: &str) {
            self.lines.lock().unwrap().push(line.to_string());
        }
    }

    #[derive(Default)]
    pub struct ScriptedHost {
        pub active: Mutex<Option<Document>>,
        pub open: Mutex<Vec<Document>>,
        pub pick_replies: Mutex<VecDeque<Option<String>>>,
        pub input_replies: Mutex<VecDeque<Option<String>>>,
        pub picks_shown: Mutex<Vec<Vec<String>>>,
        pub created_untitled: Mutex<usize>,
        pub inserted: Mutex<Vec<(String, String)>>,
        pub opened_urls: Mutex<Vec<String>>,
        pub readonly_shown: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedHost {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_active(document: Document) -> Self {
            let host = Self::default();
            *host.open.lock().unwrap() = vec![document.clone()];
            *host.active.lock().unwrap() = Some(document);
            host
        }

        pub fn add_open(&self, document: Document) {
            self.open.lock().unwrap().push(document);
        }

        pub fn script_pick(&self, reply: Option<&str>) {
            self.pick_replies
                .lock()
                .unwrap()
                .push_back(reply.map(str::to_string));
        }

        pub fn script_input(&self, reply: Option<&str>) {
            self.input_replies
                .lock()
                .unwrap()
                .push_back(reply.map(str::to_string));
        }
    }

    pub fn document(id: &str, language_id: Option<&str>, text: &str) -> Document {
        Document {
            id: id.to_string(),
            language_id: language_id.map(str::to_string),
            text: text.to_string(),
            untitled: false,
        }
    }

    pub fn untitled(id: &str, text: &str) -> Document {
        Document {
            id: id.to_string(),
            language_id: None,
            text: text.to_string(),
            untitled: true,
        }
    }

    #[async_trait]
    impl EditorHost for ScriptedHost {
        fn active_document(&self) -> Option<Document> {
            self.active.lock().unwrap().clone()
        }

        fn open_documents(&self) -> Vec<Document> {
            self.open.lock().unwrap().clone()
        }

        async fn create_untitled_document(&self) -> Result<()> {
            *self.created_untitled.lock().unwrap() += 1;
            Ok(())
        }

        async fn insert_at_start(&self, document_id: &str, text: &str) -> Result<()> {
            self.inserted
                .lock()
                .unwrap()
                .push((document_id.to_string(), text.to_string()));
            Ok(())
        }

        async fn show_quick_pick(&self, _placeholder: &str, items: &[String]) -> Option<String> {
            self.picks_shown.lock().unwrap().push(items.to_vec());
            self.pick_replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(None)
        }

        async fn show_input_box(&self, _prompt: &str, _value: Option<&str>) -> Option<String> {
            self.input_replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(None)
        }

        async fn open_external(&self, url: &str) -> Result<()> {
            self.opened_urls.lock().unwrap().push(url.to_string());
            Ok(())
        }

        async fn show_readonly_document(&self, title: &str, content: &str) -> Result<()> {
            self.readonly_shown
                .lock()
                .unwrap()
                .push((title.to_string(), content.to_string()));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str) -> Document {
        Document {
            id: id.to_string(),
            language_id: None,
            text: String::new(),
            untitled: false,
        }
    }

    #[test]
    fn test_file_name_strips_both_separators() {
        assert_eq!(doc("/home/user/a.cpp").file_name(), "a.cpp");
        assert_eq!(doc("C:\\src\\a.cpp").file_name(), "a.cpp");
        assert_eq!(doc("a.cpp").file_name(), "a.cpp");
    }

    #[test]
    fn test_extension() {
        assert_eq!(doc("/home/user/a.cpp").extension(), Some("cpp"));
        assert_eq!(doc("archive.tar.gz").extension(), Some("gz"));
        assert_eq!(doc("Makefile").extension(), None);
    }

    #[test]
    fn test_dotfile_has_extension() {
        assert_eq!(doc(".bashrc").extension(), Some("bashrc"));
        assert_eq!(doc("/home/user/.bashrc").extension(), Some("bashrc"));
    }
}
