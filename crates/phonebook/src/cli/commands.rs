//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::contact::ContactField;
use crate::import::ImportPolicy;

/// Interactive shell arguments.
#[derive(Debug, Default, Args)]
pub struct ShellCommand {
    /// Import contacts from a CSV file before the menu starts
    #[arg(short, long, value_name = "FILE")]
    pub import: Option<PathBuf>,
}

/// Import command arguments.
#[derive(Debug, Args)]
pub struct ImportCommand {
    /// CSV file with First Name, Last Name, Phone and optional Email, Address columns
    pub file: PathBuf,

    /// How to treat rows that fail validation
    #[arg(short, long, value_enum)]
    pub policy: Option<ImportPolicyArg>,

    /// Field to order the imported contacts by
    #[arg(short, long, value_enum)]
    pub sort_by: Option<ContactFieldArg>,

    /// Output the imported contacts as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// History command arguments.
#[derive(Debug, Args)]
pub struct HistoryCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Contact field argument for sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ContactFieldArg {
    /// First name
    FirstName,
    /// Last name
    LastName,
    /// Phone number
    Phone,
    /// Email address
    Email,
    /// Postal address
    Address,
}

impl From<ContactFieldArg> for ContactField {
    fn from(arg: ContactFieldArg) -> Self {
        match arg {
            ContactFieldArg::FirstName => Self::FirstName,
            ContactFieldArg::LastName => Self::LastName,
            ContactFieldArg::Phone => Self::Phone,
            ContactFieldArg::Email => Self::Email,
            ContactFieldArg::Address => Self::Address,
        }
    }
}

/// Import policy argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ImportPolicyArg {
    /// Stop at the first invalid row
    Abort,
    /// Skip invalid rows and continue
    Skip,
}

impl From<ImportPolicyArg> for ImportPolicy {
    fn from(arg: ImportPolicyArg) -> Self {
        match arg {
            ImportPolicyArg::Abort => Self::Abort,
            ImportPolicyArg::Skip => Self::Skip,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_field_arg_conversion() {
        assert_eq!(
            ContactField::from(ContactFieldArg::FirstName),
            ContactField::FirstName
        );
        assert_eq!(
            ContactField::from(ContactFieldArg::LastName),
            ContactField::LastName
        );
        assert_eq!(ContactField::from(ContactFieldArg::Phone), ContactField::Phone);
        assert_eq!(ContactField::from(ContactFieldArg::Email), ContactField::Email);
        assert_eq!(
            ContactField::from(ContactFieldArg::Address),
            ContactField::Address
        );
    }

    #[test]
    fn test_import_policy_arg_conversion() {
        assert_eq!(ImportPolicy::from(ImportPolicyArg::Abort), ImportPolicy::Abort);
        assert_eq!(ImportPolicy::from(ImportPolicyArg::Skip), ImportPolicy::Skip);
    }

    #[test]
    fn test_contact_field_arg_names() {
        let value = ContactFieldArg::FirstName.to_possible_value().unwrap();
        assert_eq!(value.get_name(), "first-name");
    }

    #[test]
    fn test_shell_command_default() {
        let cmd = ShellCommand::default();
        assert!(cmd.import.is_none());
    }

    #[test]
    fn test_config_command_debug() {
        let cmd = ConfigCommand::Show { json: false };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Show"));
    }
}
