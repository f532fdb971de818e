//! Append-only audit trail of phone book operations.
//!
//! Entries are rendered as one line of text each:
//!
//! ```text
//! [2024-03-01 09:15:42] Add performed on Ada Lovelace
//! [2024-03-01 09:16:03] View performed
//! ```
//!
//! The [`AuditLog`] owns an injected [`AuditSink`], so the shell can write to a
//! real file while tests use [`MemoryAuditSink`].

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::contact::Contact;
use crate::error::{Error, Result};

/// Timestamp layout used in rendered entries.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The operations recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditOperation {
    /// A contact was added.
    Add,
    /// The contact list was displayed.
    View,
    /// A search returned a contact.
    Search,
    /// A contact was updated.
    Update,
    /// A contact was deleted.
    Delete,
}

impl std::fmt::Display for AuditOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Add => write!(f, "Add"),
            Self::View => write!(f, "View"),
            Self::Search => write!(f, "Search"),
            Self::Update => write!(f, "Update"),
            Self::Delete => write!(f, "Delete"),
        }
    }
}

impl FromStr for AuditOperation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Add" => Ok(Self::Add),
            "View" => Ok(Self::View),
            "Search" => Ok(Self::Search),
            "Update" => Ok(Self::Update),
            "Delete" => Ok(Self::Delete),
            other => Err(Error::internal(format!("unknown audit operation '{other}'"))),
        }
    }
}

/// One line of the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// When the entry was written.
    pub timestamp: DateTime<Local>,
    /// What was done.
    pub operation: AuditOperation,
    /// Name of the contact the operation targeted, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

impl AuditEntry {
    /// Create an entry stamped with the current time.
    #[must_use]
    pub fn new(operation: AuditOperation, contact: Option<&Contact>) -> Self {
        Self {
            timestamp: Local::now(),
            operation,
            subject: contact.map(Contact::full_name),
        }
    }
}

impl std::fmt::Display for AuditEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} performed",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.operation
        )?;
        if let Some(subject) = &self.subject {
            write!(f, " on {subject}")?;
        }
        Ok(())
    }
}

impl FromStr for AuditEntry {
    type Err = Error;

    /// Parse a rendered line back into an entry.
    fn from_str(line: &str) -> Result<Self> {
        let malformed = || Error::internal(format!("malformed audit line: {line}"));

        let rest = line.trim_end().strip_prefix('[').ok_or_else(malformed)?;
        let (stamp, rest) = rest.split_once("] ").ok_or_else(malformed)?;
        let naive =
            NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).map_err(|_| malformed())?;
        let timestamp = Local
            .from_local_datetime(&naive)
            .earliest()
            .ok_or_else(malformed)?;

        let (operation, subject) = match rest.split_once(" performed") {
            Some((op, "")) => (op, None),
            Some((op, tail)) => (
                op,
                Some(tail.strip_prefix(" on ").ok_or_else(malformed)?.to_string()),
            ),
            None => return Err(malformed()),
        };

        Ok(Self {
            timestamp,
            operation: operation.parse()?,
            subject,
        })
    }
}

/// Destination for audit entries.
///
/// Implementations must only ever append; existing entries are never edited
/// or removed.
pub trait AuditSink: std::fmt::Debug + Send {
    /// Append one entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage cannot be written.
    fn append(&mut self, entry: &AuditEntry) -> Result<()>;

    /// Every line written so far, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage cannot be read.
    fn history(&self) -> Result<Vec<String>>;
}

/// Audit sink backed by a text file.
///
/// The file is opened, appended to, flushed and closed on every call; no
/// handle is held between calls.
#[derive(Debug, Clone)]
pub struct FileAuditSink {
    path: PathBuf,
}

impl FileAuditSink {
    /// Create a sink writing to `path`. The file is created on first append.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path to the log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open_for_append(&self) -> std::io::Result<File> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
                info!("Created audit log directory {}", parent.display());
            }
        }
        OpenOptions::new().create(true).append(true).open(&self.path)
    }
}

impl AuditSink for FileAuditSink {
    fn append(&mut self, entry: &AuditEntry) -> Result<()> {
        let write = || -> std::io::Result<()> {
            let mut file = self.open_for_append()?;
            writeln!(file, "{entry}")?;
            file.flush()
        };
        write().map_err(|source| Error::audit_log(&self.path, source))?;
        trace!("Appended audit entry to {}", self.path.display());
        Ok(())
    }

    fn history(&self) -> Result<Vec<String>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No audit log at {} yet", self.path.display());
                return Ok(Vec::new());
            }
            Err(source) => return Err(Error::audit_log(&self.path, source)),
        };

        BufReader::new(file)
            .lines()
            .collect::<std::io::Result<Vec<_>>>()
            .map_err(|source| Error::audit_log(&self.path, source))
    }
}

/// Audit sink that keeps entries in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryAuditSink {
    lines: Vec<String>,
}

impl MemoryAuditSink {
    /// Create an empty in-memory sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl AuditSink for MemoryAuditSink {
    fn append(&mut self, entry: &AuditEntry) -> Result<()> {
        self.lines.push(entry.to_string());
        Ok(())
    }

    fn history(&self) -> Result<Vec<String>> {
        Ok(self.lines.clone())
    }
}

/// The audit trail used by the application shell.
#[derive(Debug)]
pub struct AuditLog {
    sink: Box<dyn AuditSink>,
}

impl AuditLog {
    /// Create an audit log over the given sink.
    #[must_use]
    pub fn new(sink: Box<dyn AuditSink>) -> Self {
        Self { sink }
    }

    /// Create an audit log appending to a file.
    #[must_use]
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self::new(Box::new(FileAuditSink::new(path)))
    }

    /// Create an audit log that only keeps entries in memory.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryAuditSink::new()))
    }

    /// Record an operation, optionally naming the contact it targeted.
    ///
    /// The caller's operation has already taken effect; a failure here only
    /// means the trail is missing this entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink cannot be written.
    pub fn log(
        &mut self,
        operation: AuditOperation,
        contact: Option<&Contact>,
    ) -> Result<AuditEntry> {
        let entry = AuditEntry::new(operation, contact);
        self.sink.append(&entry)?;
        Ok(entry)
    }

    /// Every entry written so far, oldest first, as display-ready lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink cannot be read.
    pub fn get_history(&self) -> Result<Vec<String>> {
        self.sink.history()
    }
}
