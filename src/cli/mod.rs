//! CLI command definitions for generic-config
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

use crate::config::{Settings, SourceMode};
use crate::db::import::ImportMode;
use crate::format::OutputFormat;
use crate::types::DefinitionKind;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Configuration loader and checker for the generic API service
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Settings file to resolve (default: application.yml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Configuration source: yaml or database (overrides settings)
    #[arg(short, long, global = true, value_parser = parse_source)]
    pub source: Option<SourceMode>,

    /// Directory to scan for definition files; repeat for several (overrides settings)
    #[arg(long = "dir", global = true)]
    pub directories: Vec<String>,

    /// Path to the configuration database (overrides settings)
    #[arg(short, long, global = true)]
    pub database: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Apply command-line overrides on top of loaded settings.
    pub fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(source) = self.source {
            settings.config.source = source;
        }
        if !self.directories.is_empty() {
            settings.config.directories = self.directories.clone();
        }
        if let Some(path) = &self.database {
            settings.database.path = path.clone();
        }
    }
}

fn parse_source(value: &str) -> Result<SourceMode, String> {
    value.parse::<SourceMode>().map_err(|e| e.to_string())
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load and validate all definitions (default if no subcommand given)
    Check,

    /// Print the merged definitions of one kind
    Show(ShowArgs),

    /// Load definitions from files and write them into the configuration database
    Import(ImportArgs),
}

/// Definition kind selector for `show`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Databases,
    Queries,
    Endpoints,
}

impl From<KindArg> for DefinitionKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Databases => DefinitionKind::Database,
            KindArg::Queries => DefinitionKind::Query,
            KindArg::Endpoints => DefinitionKind::Endpoint,
        }
    }
}

/// Arguments for the show subcommand
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Which definitions to print
    #[arg(value_enum)]
    pub kind: KindArg,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

/// Arguments for the import subcommand
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// fresh: store must be empty; replace: clear first; merge: add unknown names only
    #[arg(short, long, default_value = "fresh", value_parser = parse_import_mode)]
    pub mode: ImportMode,
}

fn parse_import_mode(value: &str) -> Result<ImportMode, String> {
    value.parse::<ImportMode>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_no_subcommand() {
        let cli = Cli::try_parse_from(["generic-config"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.log, "2");
        assert!(cli.source.is_none());
    }

    #[test]
    fn test_global_overrides_apply_to_settings() {
        let cli = Cli::try_parse_from([
            "generic-config",
            "--source",
            "database",
            "--dir",
            "./a",
            "--dir",
            "./b",
            "--database",
            "store.db",
            "check",
        ])
        .unwrap();

        let mut settings = Settings::default();
        cli.apply_overrides(&mut settings);
        assert_eq!(settings.config.source, SourceMode::Database);
        assert_eq!(settings.config.directories, vec!["./a", "./b"]);
        assert_eq!(settings.database.path, PathBuf::from("store.db"));
    }

    #[test]
    fn test_show_parses_kind_and_format() {
        let cli = Cli::try_parse_from(["generic-config", "show", "queries", "--format", "yaml"])
            .unwrap();
        match cli.command {
            Some(Command::Show(args)) => {
                assert_eq!(DefinitionKind::from(args.kind), DefinitionKind::Query);
                assert_eq!(args.format, OutputFormat::Yaml);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_import_mode_flag() {
        let cli = Cli::try_parse_from(["generic-config", "import", "--mode", "merge"]).unwrap();
        match cli.command {
            Some(Command::Import(args)) => assert_eq!(args.mode, ImportMode::Merge),
            other => panic!("unexpected command: {:?}", other),
        }
        assert!(Cli::try_parse_from(["generic-config", "import", "--mode", "bogus"]).is_err());
    }
}
