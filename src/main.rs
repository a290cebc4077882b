//! generic-config
//!
//! Loads database, query and endpoint definitions from YAML files or the
//! configuration database and reports what was found.

use anyhow::Result;
use clap::Parser;
use generic_config::cli::{Cli, Command, ImportArgs, ShowArgs};
use generic_config::config::{Settings, SettingsLoader};
use generic_config::format::{OutputFormat, format_check_markdown, format_definitions};
use generic_config::loader::{ConfigurationLoader, FileConfigurationLoader};
use generic_config::logging::{self, LogTarget};
use generic_config::resolve::ResourceResolver;
use generic_config::startup;
use generic_config::types::DefinitionKind;
use tracing::info;

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&LogTarget::parse(&cli.log), cli.verbose)?;

    let resolver = ResourceResolver::for_process()?;
    let loader = SettingsLoader::load(&resolver, cli.config.as_deref())?;
    if let Some(origin) = loader.settings_origin() {
        info!(origin = %origin, "Settings loaded");
    }
    let mut settings = loader.into_settings();
    cli.apply_overrides(&mut settings);

    match cli.command {
        Some(Command::Show(args)) => run_show(resolver, &settings, args),
        Some(Command::Import(args)) => run_import(resolver, &settings, args),
        Some(Command::Check) | None => run_check(resolver, &settings),
    }
}

fn run_check(resolver: ResourceResolver, settings: &Settings) -> Result<()> {
    let set = startup::initialize_with(resolver, settings)?;
    let unresolved = set.unresolved_references();
    print!("{}", format_check_markdown(&set, &unresolved));
    Ok(())
}

fn run_show(resolver: ResourceResolver, settings: &Settings, args: ShowArgs) -> Result<()> {
    let set = startup::initialize_with(resolver, settings)?;
    let output = match DefinitionKind::from(args.kind) {
        DefinitionKind::Database => format_definitions(&set.databases, args.format)?,
        DefinitionKind::Query => format_definitions(&set.queries, args.format)?,
        DefinitionKind::Endpoint => format_definitions(&set.endpoints, args.format)?,
    };
    print!("{}", output);
    if args.format != OutputFormat::Markdown && !output.ends_with('\n') {
        println!();
    }
    Ok(())
}

fn run_import(resolver: ResourceResolver, settings: &Settings, args: ImportArgs) -> Result<()> {
    let file_loader = FileConfigurationLoader::from_settings(resolver.clone(), &settings.config);
    let set = file_loader.load_all()?;

    let unresolved = startup::log_unresolved_references(&set);
    if settings.validation.validate_only {
        println!(
            "Validation only: {} definitions loaded, {} unresolved references, nothing written",
            set.databases.len() + set.queries.len() + set.endpoints.len(),
            unresolved
        );
        return Ok(());
    }

    let db = startup::open_store(&resolver, settings)?;
    let result = db.import_configuration_set(&set, args.mode)?;

    println!("Import complete:");
    println!("  Mode: {}", args.mode);
    println!("  Rows imported:");
    for (table, count) in &result.rows_imported {
        println!("    {}: {}", table, count);
    }
    if !result.rows_skipped.is_empty() {
        println!("  Rows skipped:");
        for (table, count) in &result.rows_skipped {
            println!("    {}: {}", table, count);
        }
    }
    if !result.rows_deleted.is_empty() {
        println!("  Rows deleted:");
        for (table, count) in &result.rows_deleted {
            println!("    {}: {}", table, count);
        }
    }
    Ok(())
}
