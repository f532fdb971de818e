//! `phonebook` - An in-memory contact directory with an append-only audit log
//!
//! This library provides the contact record, the [`PhoneBook`] record store
//! with its search, sort and group operations, the [`AuditLog`] that records
//! every operation, and the interactive [`Shell`] that ties them together.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod audit;
pub mod cli;
pub mod config;
pub mod contact;
pub mod error;
pub mod import;
pub mod logging;
pub mod phonebook;
pub mod shell;
pub mod validate;

pub use audit::{AuditEntry, AuditLog, AuditOperation, AuditSink, FileAuditSink, MemoryAuditSink};
pub use config::Config;
pub use contact::{Contact, ContactField, ContactUpdate, FieldUpdate};
pub use error::{Error, Result};
pub use import::{ImportPolicy, ImportReport, ImportSummary};
pub use logging::init_logging;
pub use phonebook::{ContactGroup, PhoneBook, TimeframeMatches};
pub use shell::Shell;
