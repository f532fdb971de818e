//! `phonebook` - CLI for the contact directory
//!
//! Starts the interactive menu by default; the other subcommands import,
//! inspect the audit history, or show configuration.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io;

use anyhow::{Context, Result};
use clap::Parser;

use phonebook::cli::{Cli, Command, ConfigCommand, HistoryCommand, ImportCommand, ShellCommand};
use phonebook::{init_logging, AuditEntry, Config, ContactField, Shell};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    match cli.command.unwrap_or(Command::Shell(ShellCommand::default())) {
        Command::Shell(shell_cmd) => handle_shell(&config, &shell_cmd),
        Command::Import(import_cmd) => handle_import(&config, &import_cmd),
        Command::History(history_cmd) => handle_history(&config, &history_cmd),
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

fn handle_shell(config: &Config, cmd: &ShellCommand) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut shell = Shell::with_config(stdin.lock(), stdout.lock(), config);

    if let Some(path) = &cmd.import {
        shell
            .import_file(path)
            .with_context(|| format!("importing {}", path.display()))?;
    }

    shell.run()?;
    Ok(())
}

fn handle_import(config: &Config, cmd: &ImportCommand) -> Result<()> {
    let sort_by = cmd
        .sort_by
        .map_or(config.display.sort_by, ContactField::from);
    let policy = cmd.policy.map_or(config.import.policy, Into::into);

    if cmd.json {
        let mut shell = Shell::with_config(io::empty(), io::sink(), config).import_policy(policy);
        let report = shell
            .import_file(&cmd.file)
            .with_context(|| format!("importing {}", cmd.file.display()))?;
        let summary = report.summary(shell.book().sort(sort_by));
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let mut shell = Shell::with_config(io::empty(), io::stdout().lock(), config)
        .import_policy(policy)
        .sort_by(sort_by);
    shell
        .import_file(&cmd.file)
        .with_context(|| format!("importing {}", cmd.file.display()))?;
    println!();
    shell.view_contacts()?;
    Ok(())
}

fn handle_history(config: &Config, cmd: &HistoryCommand) -> Result<()> {
    let history = config.audit_log().get_history()?;

    if cmd.json {
        let entries = history
            .iter()
            .map(|line| match line.parse::<AuditEntry>() {
                Ok(entry) => serde_json::to_value(entry),
                Err(_) => Ok(serde_json::json!({ "raw": line })),
            })
            .collect::<Result<Vec<_>, _>>()?;
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else if history.is_empty() {
        println!("No audit history recorded.");
    } else {
        for line in history {
            println!("{line}");
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Audit]");
                println!("  Enabled:            {}", config.audit.enabled);
                println!("  Log path:           {}", config.audit_log_path().display());
                println!();
                println!("[Display]");
                println!("  Sort by:            {}", config.display.sort_by);
                println!();
                println!("[Import]");
                println!("  Policy:             {}", config.import.policy);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
