//! Output sinks and destinations.
//!
//! A [`Sink`] is the accumulating buffer a formatter writes into. Sinks are
//! shared handles: cloning one yields another handle onto the same buffer,
//! which is how a nested render writes straight into its parent's output.
//!
//! [`OutputDestination`] is where finished output goes once rendering is
//! done, either standard output or a file.

use std::cell::RefCell;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Shared, growable output buffer.
///
/// Holds raw bytes so that binary formatters can use the same sink type as
/// text formatters. Text accessors decode as UTF-8.
///
/// # Example
///
/// ```rust
/// use folio::Sink;
///
/// let sink = Sink::new();
/// let alias = sink.clone();
/// alias.push_str("hello");
///
/// assert_eq!(sink.to_string_lossy(), "hello");
/// assert!(sink.same_as(&alias));
/// ```
#[derive(Clone, Default)]
pub struct Sink {
    buf: Rc<RefCell<Vec<u8>>>,
}

impl Sink {
    /// Creates a new, empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends text to the sink.
    pub fn push_str(&self, text: &str) {
        self.buf.borrow_mut().extend_from_slice(text.as_bytes());
    }

    /// Appends raw bytes to the sink.
    pub fn push_bytes(&self, bytes: &[u8]) {
        self.buf.borrow_mut().extend_from_slice(bytes);
    }

    /// Empties the buffer in place. Every handle observes the change.
    pub fn clear(&self) {
        self.buf.borrow_mut().clear();
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.borrow().len()
    }

    /// Returns true if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.borrow().is_empty()
    }

    /// Returns a copy of the raw contents.
    pub fn bytes(&self) -> Vec<u8> {
        self.buf.borrow().clone()
    }

    /// Returns the contents as text, failing on invalid UTF-8.
    pub fn text(&self) -> crate::Result<String> {
        Ok(String::from_utf8(self.bytes())?)
    }

    /// Returns the contents as text, replacing invalid UTF-8 sequences.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.buf.borrow()).into_owned()
    }

    /// Returns true if both handles refer to the same buffer.
    pub fn same_as(&self, other: &Sink) -> bool {
        Rc::ptr_eq(&self.buf, &other.buf)
    }
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sink").field("len", &self.len()).finish()
    }
}

impl fmt::Write for Sink {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_str(s);
        Ok(())
    }
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.push_bytes(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// How saved output is written to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveMode {
    /// Contents must be valid UTF-8 text.
    #[default]
    Text,
    /// Contents are written byte for byte.
    Binary,
}

/// Destination for finished output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputDestination {
    /// Write to standard output
    Stdout,
    /// Write to a specific file, truncating it
    File(PathBuf),
}

impl OutputDestination {
    /// Writes text content to this destination.
    pub fn write_text(&self, content: &str) -> std::io::Result<()> {
        match self {
            OutputDestination::Stdout => {
                let stdout = std::io::stdout();
                let mut handle = stdout.lock();
                handle.write_all(content.as_bytes())?;
                handle.flush()
            }
            OutputDestination::File(path) => {
                validate_path(path)?;
                std::fs::write(path, content)
            }
        }
    }

    /// Writes binary content to this destination.
    pub fn write_binary(&self, content: &[u8]) -> std::io::Result<()> {
        match self {
            OutputDestination::Stdout => {
                let stdout = std::io::stdout();
                let mut handle = stdout.lock();
                handle.write_all(content)?;
                handle.flush()
            }
            OutputDestination::File(path) => {
                validate_path(path)?;
                std::fs::write(path, content)
            }
        }
    }

    /// Writes the full contents of a sink using the given mode.
    pub fn write_sink(&self, sink: &Sink, mode: SaveMode) -> crate::Result<()> {
        match mode {
            SaveMode::Text => self.write_text(&sink.text()?)?,
            SaveMode::Binary => self.write_binary(&sink.bytes())?,
        }
        Ok(())
    }
}

/// Validates that a file path's parent directory exists.
fn validate_path(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Parent directory does not exist: {}", parent.display()),
            ));
        }
    }
    Ok(())
}
