//! Bulk import of contacts from CSV.
//!
//! The input needs a header row naming at least `First Name`, `Last Name` and
//! `Phone`; `Email` and `Address` are optional. Each row is validated before it
//! reaches the phone book, and every accepted row is mirrored into the audit
//! log as an `Add`.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::audit::{AuditLog, AuditOperation};
use crate::contact::Contact;
use crate::error::{Error, Result};
use crate::phonebook::PhoneBook;
use crate::validate::{validate_email, validate_phone};

/// Columns every import file must have.
pub const REQUIRED_COLUMNS: [&str; 3] = ["First Name", "Last Name", "Phone"];

/// What to do when a row fails validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportPolicy {
    /// Stop at the first invalid row. Rows already imported are kept.
    #[default]
    Abort,
    /// Report the invalid row and continue with the next one.
    Skip,
}

impl std::fmt::Display for ImportPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Abort => write!(f, "abort"),
            Self::Skip => write!(f, "skip"),
        }
    }
}

/// Outcome of an import run.
#[derive(Debug, Default)]
pub struct ImportReport {
    /// Full names of the contacts added, in file order.
    pub added: Vec<String>,
    /// Rows that failed validation.
    pub rejected: Vec<Error>,
    /// Whether the run stopped early under [`ImportPolicy::Abort`].
    pub aborted: bool,
    /// Audit entries that could not be written. The contacts were still added.
    pub audit_failures: Vec<Error>,
}

impl ImportReport {
    /// A serializable view of this report alongside the resulting contacts.
    #[must_use]
    pub fn summary<'a>(&self, contacts: Vec<&'a Contact>) -> ImportSummary<'a> {
        ImportSummary {
            contacts,
            added: self.added.len(),
            rejected: messages(&self.rejected),
            aborted: self.aborted,
            audit_failures: messages(&self.audit_failures),
        }
    }
}

/// JSON shape of a finished import.
#[derive(Debug, Serialize)]
pub struct ImportSummary<'a> {
    /// Contacts in the phone book after the import.
    pub contacts: Vec<&'a Contact>,
    /// Number of rows added.
    pub added: usize,
    /// Why each rejected row was refused.
    pub rejected: Vec<String>,
    /// Whether the run stopped at an invalid row.
    pub aborted: bool,
    /// Audit entries that could not be written.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub audit_failures: Vec<String>,
}

fn messages(errors: &[Error]) -> Vec<String> {
    errors.iter().map(ToString::to_string).collect()
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "First Name")]
    first_name: String,
    #[serde(rename = "Last Name")]
    last_name: String,
    #[serde(rename = "Phone")]
    phone: String,
    #[serde(rename = "Email", default)]
    email: Option<String>,
    #[serde(rename = "Address", default)]
    address: Option<String>,
}

impl CsvRow {
    fn into_contact(self) -> Result<Contact> {
        validate_phone(&self.phone)?;
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        Contact::new(
            self.first_name,
            self.last_name,
            self.phone,
            self.email,
            self.address,
        )
    }
}

/// Import contacts from a CSV file.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or its header is unusable.
/// Invalid rows do not fail the call; they are listed in the report.
pub fn import_path(
    path: impl AsRef<Path>,
    book: &mut PhoneBook,
    audit: &mut AuditLog,
    policy: ImportPolicy,
) -> Result<ImportReport> {
    let path = path.as_ref();
    debug!("Importing contacts from {}", path.display());
    let file = File::open(path)?;
    import_reader(file, book, audit, policy)
}

/// Import contacts from any CSV source.
///
/// # Errors
///
/// Returns an error if the header cannot be read or a required column is
/// missing.
pub fn import_reader<R: Read>(
    reader: R,
    book: &mut PhoneBook,
    audit: &mut AuditLog,
    policy: ImportPolicy,
) -> Result<ImportReport> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?;
    if let Some(missing) = REQUIRED_COLUMNS
        .into_iter()
        .find(|col| !headers.iter().any(|h| h == *col))
    {
        return Err(Error::MissingColumn(missing));
    }

    let mut report = ImportReport::default();

    for (idx, row) in rdr.deserialize::<CsvRow>().enumerate() {
        let row_number = idx + 1;
        let contact = match row.map_err(Error::from).and_then(CsvRow::into_contact) {
            Ok(contact) => contact,
            Err(e) => {
                let err = Error::invalid_row(row_number, e);
                warn!("Rejected import {}", err);
                report.rejected.push(err);
                match policy {
                    ImportPolicy::Abort => {
                        report.aborted = true;
                        break;
                    }
                    ImportPolicy::Skip => continue,
                }
            }
        };

        if let Err(e) = audit.log(AuditOperation::Add, Some(&contact)) {
            warn!("Failed to record import of {}: {}", contact.full_name(), e);
            report.audit_failures.push(e);
        }
        report.added.push(contact.full_name());
        book.add(contact);
    }

    info!(
        "Imported {} contact(s), rejected {} row(s) ({} policy)",
        report.added.len(),
        report.rejected.len(),
        policy
    );
    Ok(report)
}
