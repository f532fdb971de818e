//! Interactive menu loop.
//!
//! The shell reads commands from any [`BufRead`] and writes to any [`Write`],
//! validating raw input before handing it to the [`PhoneBook`]. Every
//! operation is mirrored into the [`AuditLog`] after it has taken effect; an
//! audit failure is reported but never undoes the operation.

use std::io::{BufRead, ErrorKind, Write};
use std::path::Path;

use tracing::{debug, warn};

use crate::audit::{AuditLog, AuditOperation};
use crate::config::Config;
use crate::contact::{Contact, ContactField, ContactUpdate, FieldUpdate};
use crate::error::{Error, Result};
use crate::import::{import_path, ImportPolicy, ImportReport};
use crate::phonebook::PhoneBook;
use crate::validate::{canonicalize_phone, validate_email};

/// Input that clears an optional field during an update.
pub const CLEAR_MARKER: &str = "-";

const PHONE_HINT: &str = "Invalid phone number format. Please enter in the format (###) ###-####.";
const EMAIL_HINT: &str = "Invalid email format. Please enter a valid email address.";
const INVALID_CHOICE: &str = "Invalid choice, please try again.";

/// Top-level menu entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    /// Add a contact or import a CSV file.
    Add,
    /// List all contacts.
    View,
    /// Search by name, phone or date range.
    Search,
    /// Update a contact by phone number.
    Update,
    /// Delete a contact by phone number.
    Delete,
    /// Print the audit trail.
    History,
    /// Leave the shell.
    Quit,
}

impl MenuChoice {
    /// Parse the number typed at the main menu.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Self::Add),
            "2" => Some(Self::View),
            "3" => Some(Self::Search),
            "4" => Some(Self::Update),
            "5" => Some(Self::Delete),
            "6" => Some(Self::History),
            "7" => Some(Self::Quit),
            _ => None,
        }
    }
}

enum SearchQuery {
    Name(String),
    Phone(String),
    Dates(String, String),
}

/// The interactive phone book application.
#[derive(Debug)]
pub struct Shell<R, W> {
    input: R,
    output: W,
    book: PhoneBook,
    audit: AuditLog,
    sort_by: ContactField,
    import_policy: ImportPolicy,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    /// Create a shell over an empty phone book.
    pub fn new(input: R, output: W, audit: AuditLog) -> Self {
        Self {
            input,
            output,
            book: PhoneBook::new(),
            audit,
            sort_by: ContactField::default(),
            import_policy: ImportPolicy::default(),
        }
    }

    /// Create a shell using the audit log, sort field and import policy
    /// from `config`.
    pub fn with_config(input: R, output: W, config: &Config) -> Self {
        Self::new(input, output, config.audit_log())
            .sort_by(config.display.sort_by)
            .import_policy(config.import.policy)
    }

    /// Set the field the contact list is ordered by.
    #[must_use]
    pub fn sort_by(mut self, field: ContactField) -> Self {
        self.sort_by = field;
        self
    }

    /// Set how bulk import treats invalid rows.
    #[must_use]
    pub fn import_policy(mut self, policy: ImportPolicy) -> Self {
        self.import_policy = policy;
        self
    }

    /// The phone book being edited.
    #[must_use]
    pub fn book(&self) -> &PhoneBook {
        &self.book
    }

    /// The audit log being written.
    #[must_use]
    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Everything written so far.
    #[must_use]
    pub fn output(&self) -> &W {
        &self.output
    }

    /// Run the menu loop until the user quits or input ends.
    ///
    /// Command failures are printed and the loop continues.
    ///
    /// # Errors
    ///
    /// Returns an error only if the output cannot be written.
    pub fn run(&mut self) -> Result<()> {
        loop {
            self.display_menu()?;
            match self.next_command() {
                Ok(true) => {}
                Ok(false) => return Ok(()),
                Err(Error::Io(e)) if e.kind() == ErrorKind::UnexpectedEof => {
                    writeln!(self.output)?;
                    return Ok(());
                }
                Err(e) => {
                    if e.is_audit_error() {
                        warn!("Command failed: {}", e);
                    } else {
                        debug!("Command failed: {}", e);
                    }
                    writeln!(self.output, "\nAn error occurred: {e}, please try again.")?;
                }
            }
        }
    }

    /// Read and run one menu choice. Returns `false` once the user quits.
    fn next_command(&mut self) -> Result<bool> {
        let choice = self.prompt("Enter your choice: ")?;
        match MenuChoice::parse(&choice) {
            Some(MenuChoice::Quit) => Ok(false),
            Some(choice) => self.dispatch(choice).map(|()| true),
            None => {
                writeln!(self.output, "{INVALID_CHOICE}")?;
                Ok(true)
            }
        }
    }

    /// Run a single menu command.
    ///
    /// # Errors
    ///
    /// Returns any error raised by the command.
    pub fn dispatch(&mut self, choice: MenuChoice) -> Result<()> {
        match choice {
            MenuChoice::Add => self.add_contact(),
            MenuChoice::View => self.view_contacts(),
            MenuChoice::Search => self.search_contacts(),
            MenuChoice::Update => self.update_contact(),
            MenuChoice::Delete => self.delete_contact(),
            MenuChoice::History => self.view_audit_history(),
            MenuChoice::Quit => Ok(()),
        }
    }

    fn display_menu(&mut self) -> Result<()> {
        writeln!(
            self.output,
            "\nPhone Book Application, please select an option by typing the related number:"
        )?;
        for (n, label) in [
            "Add Contact",
            "View Contacts",
            "Search Contacts",
            "Update Contact",
            "Delete Contact",
            "View Audit History",
            "Quit",
        ]
        .iter()
        .enumerate()
        {
            writeln!(self.output, "{}. {label}", n + 1)?;
        }
        Ok(())
    }

    /// Add one contact interactively or import a CSV file.
    fn add_contact(&mut self) -> Result<()> {
        let method = self.choose(
            "add method",
            &["Add contact individually", "Add contact from CSV file"],
        )?;

        if method == 1 {
            let path = self.prompt("Enter the path to the CSV file: ")?;
            self.import_file(path)?;
            return Ok(());
        }

        let first_name = self.prompt_required("First Name: ", "First name")?;
        let last_name = self.prompt_required("Last Name: ", "Last name")?;
        let phone = self.prompt_phone("Phone number: ")?;
        let email = self.prompt_email("Email (Optional): ")?;
        let address = self.prompt("Address (Optional): ")?;

        let contact = Contact::new(first_name, last_name, phone, email, Some(address))?;
        writeln!(self.output, "Added contact {}.", contact.full_name())?;
        self.book.add(contact);

        if let Some(added) = self.book.contacts().last() {
            record(
                &mut self.audit,
                &mut self.output,
                AuditOperation::Add,
                Some(added),
            )?;
        }
        Ok(())
    }

    /// Import contacts from a CSV file, print what happened and return the
    /// report.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or lacks required columns.
    pub fn import_file(&mut self, path: impl AsRef<Path>) -> Result<ImportReport> {
        let report = import_path(path, &mut self.book, &mut self.audit, self.import_policy)?;

        for name in &report.added {
            writeln!(self.output, "Added contact {name}.")?;
        }
        for err in &report.rejected {
            writeln!(self.output, "Invalid {err}")?;
        }
        if report.aborted {
            writeln!(self.output, "Import stopped at the first invalid row.")?;
        }
        for err in &report.audit_failures {
            writeln!(self.output, "Warning: import not recorded in audit log: {err}")?;
        }
        Ok(report)
    }

    /// Print every contact ordered by the configured field.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be written.
    pub fn view_contacts(&mut self) -> Result<()> {
        let contacts = self.book.sort(self.sort_by);
        if contacts.is_empty() {
            writeln!(self.output, "No contacts found.")?;
            return Ok(());
        }

        for contact in &contacts {
            write_contact(&mut self.output, contact)?;
        }
        record(&mut self.audit, &mut self.output, AuditOperation::View, None)
    }

    fn search_contacts(&mut self) -> Result<()> {
        let method = self.choose(
            "search method",
            &[
                "Search by name",
                "Search by phone number",
                "Search by date range",
            ],
        )?;

        let query = match method {
            0 => SearchQuery::Name(self.prompt("Enter the name to search: ")?),
            1 => {
                let raw = self.prompt("Enter the phone number (or part of it) to search: ")?;
                SearchQuery::Phone(canonicalize_phone(&raw).unwrap_or(raw))
            }
            _ => SearchQuery::Dates(
                self.prompt("Enter the start date (YYYY-MM-DD): ")?,
                self.prompt("Enter the end date (YYYY-MM-DD): ")?,
            ),
        };

        let results = match &query {
            SearchQuery::Name(name) => self.book.search_by_name(name),
            SearchQuery::Phone(phone) => self.book.search_by_phone(phone),
            SearchQuery::Dates(start, end) => {
                let found = self
                    .book
                    .search_by_timeframe(Some(start.as_str()), Some(end.as_str()));
                for bound in &found.ignored_bounds {
                    writeln!(
                        self.output,
                        "Invalid date format: {}. Use YYYY-MM-DD format.",
                        bound.input
                    )?;
                }
                found.contacts
            }
        };

        if results.is_empty() {
            writeln!(self.output, "No contacts found.")?;
        }
        for contact in results {
            writeln!(
                self.output,
                "{}, Phone: {}",
                contact.full_name(),
                contact.phone
            )?;
            record(
                &mut self.audit,
                &mut self.output,
                AuditOperation::Search,
                Some(contact),
            )?;
        }
        Ok(())
    }

    fn update_contact(&mut self) -> Result<()> {
        let phone = self.prompt_phone("Enter phone number of the contact to update: ")?;
        if self.book.find_by_phone(&phone).is_empty() {
            writeln!(self.output, "No contact found with phone number {phone}.")?;
            return Ok(());
        }

        let update = ContactUpdate {
            first_name: self.prompt_optional("New First Name (or leave blank to keep current): ")?,
            last_name: self.prompt_optional("New Last Name (or leave blank to keep current): ")?,
            phone: None,
            email: self.prompt_field_update(
                "New Email (blank to keep current, '-' to clear): ",
                true,
            )?,
            address: self.prompt_field_update(
                "New Address (blank to keep current, '-' to clear): ",
                false,
            )?,
        };

        let updated = self.book.update(&phone, &update)?;
        for contact in self.book.find_by_phone(&phone) {
            record(
                &mut self.audit,
                &mut self.output,
                AuditOperation::Update,
                Some(contact),
            )?;
        }
        writeln!(
            self.output,
            "Updated {updated} contact(s) with phone number {phone}."
        )?;
        Ok(())
    }

    fn delete_contact(&mut self) -> Result<()> {
        let phone = self.prompt_phone("Enter phone number of the contact to delete: ")?;
        let doomed: Vec<Contact> = self
            .book
            .find_by_phone(&phone)
            .into_iter()
            .cloned()
            .collect();

        let removed = self.book.delete(&phone);
        if removed == 0 {
            writeln!(self.output, "No contact found with phone number {phone}.")?;
            return Ok(());
        }

        for contact in &doomed {
            record(
                &mut self.audit,
                &mut self.output,
                AuditOperation::Delete,
                Some(contact),
            )?;
        }
        writeln!(
            self.output,
            "Deleted {removed} contact(s) with phone number {phone}."
        )?;
        Ok(())
    }

    fn view_audit_history(&mut self) -> Result<()> {
        let history = self.audit.get_history()?;
        if history.is_empty() {
            writeln!(self.output, "No audit history recorded.")?;
        }
        for line in history {
            writeln!(self.output, "{line}")?;
        }
        Ok(())
    }

    /// Offer numbered options until one is picked. Returns its index.
    fn choose(&mut self, what: &str, options: &[&str]) -> Result<usize> {
        loop {
            writeln!(self.output, "Please choose the {what}")?;
            for (n, option) in options.iter().enumerate() {
                writeln!(self.output, "{}. {option}", n + 1)?;
            }
            let answer = self.prompt("Enter your choice: ")?;
            match answer.parse::<usize>() {
                Ok(n) if (1..=options.len()).contains(&n) => return Ok(n - 1),
                _ => writeln!(self.output, "\n{INVALID_CHOICE}\n")?,
            }
        }
    }

    fn prompt_required(&mut self, label: &str, field: &str) -> Result<String> {
        loop {
            let value = self.prompt(label)?;
            if !value.is_empty() {
                return Ok(value);
            }
            writeln!(self.output, "{field} cannot be empty.")?;
        }
    }

    fn prompt_phone(&mut self, label: &str) -> Result<String> {
        loop {
            match canonicalize_phone(&self.prompt(label)?) {
                Ok(phone) => return Ok(phone),
                Err(e) if e.is_validation_error() => writeln!(self.output, "{PHONE_HINT}")?,
                Err(e) => return Err(e),
            }
        }
    }

    fn prompt_email(&mut self, label: &str) -> Result<Option<String>> {
        loop {
            let email = self.prompt(label)?;
            match validate_email(&email) {
                Ok(()) => return Ok((!email.is_empty()).then_some(email)),
                Err(e) if e.is_validation_error() => writeln!(self.output, "{EMAIL_HINT}")?,
                Err(e) => return Err(e),
            }
        }
    }

    /// Blank input keeps the current value.
    fn prompt_optional(&mut self, label: &str) -> Result<Option<String>> {
        let value = self.prompt(label)?;
        Ok((!value.is_empty()).then_some(value))
    }

    /// Blank input keeps the current value; [`CLEAR_MARKER`] removes it.
    fn prompt_field_update(&mut self, label: &str, is_email: bool) -> Result<FieldUpdate> {
        loop {
            let value = self.prompt(label)?;
            if value.is_empty() {
                return Ok(FieldUpdate::Keep);
            }
            if value == CLEAR_MARKER {
                return Ok(FieldUpdate::Clear);
            }
            if !is_email {
                return Ok(FieldUpdate::Set(value));
            }
            match validate_email(&value) {
                Ok(()) => return Ok(FieldUpdate::Set(value)),
                Err(e) if e.is_validation_error() => writeln!(self.output, "{EMAIL_HINT}")?,
                Err(e) => return Err(e),
            }
        }
    }

    /// Read one answer. Fails with `UnexpectedEof` when input is exhausted.
    fn prompt(&mut self, label: &str) -> Result<String> {
        self.read_line(label)?.ok_or_else(|| {
            Error::Io(std::io::Error::new(
                ErrorKind::UnexpectedEof,
                "input closed",
            ))
        })
    }

    fn read_line(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

/// Append an audit entry, reporting rather than propagating a sink failure.
fn record<W: Write>(
    audit: &mut AuditLog,
    output: &mut W,
    operation: AuditOperation,
    contact: Option<&Contact>,
) -> Result<()> {
    if let Err(e) = audit.log(operation, contact) {
        warn!("{} completed but was not recorded: {}", operation, e);
        writeln!(
            output,
            "Warning: {operation} completed but was not recorded: {e}"
        )?;
    }
    Ok(())
}

fn write_contact<W: Write>(output: &mut W, contact: &Contact) -> Result<()> {
    writeln!(output, "{}", contact.full_name())?;
    writeln!(output, "Phone: {}", contact.phone)?;
    if let Some(email) = &contact.email {
        writeln!(output, "Email: {email}")?;
    }
    if let Some(address) = &contact.address {
        writeln!(output, "Address: {address}")?;
    }
    writeln!(output)?;
    Ok(())
}
