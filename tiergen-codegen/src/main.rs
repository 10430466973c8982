//! CLI entry point for tiergen-codegen

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tiergen_codegen::codegen::TypeResolver;
use tiergen_codegen::config::CodegenConfig;
use tiergen_codegen::schema::{SchemaProvider, TableSchema};

#[derive(Parser)]
#[command(name = "tiergen-codegen")]
#[command(about = "Generate C# data-access and business-logic classes from SQL Server table metadata")]
#[command(version)]
struct Cli {
    /// Path to configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to schema file: DDL script or JSON catalog (overrides config)
    #[arg(short, long)]
    schema: Option<PathBuf>,

    /// Source database name (overrides config)
    #[arg(short, long)]
    database: Option<String>,

    /// Output root directory (overrides config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Tables to generate, comma-separated in generation order (overrides config)
    #[arg(short, long)]
    tables: Option<String>,

    /// Tables to skip, comma-separated (overrides config)
    #[arg(short, long)]
    exclude: Option<String>,

    /// Dry run - show what would be generated without writing files
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate both layers
    Generate,
    /// Generate only data-access classes
    Dal,
    /// Inspect schema (show columns, mapped types and resolved keys)
    Inspect,
    /// List databases in the schema source
    Databases,
    /// List tables of the selected database
    Tables,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (before logging, so we can use config.log_level)
    let mut config = CodegenConfig::load(cli.config.as_deref())?;

    // Initialize logging
    // Priority: RUST_LOG env var > config.log_level > default (debug for dev, info for release)
    let default_level = if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };
    let log_level = config.log_level.as_deref().unwrap_or(default_level);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .init();

    // Apply CLI overrides
    if let Some(schema) = cli.schema {
        config.schema_file = schema;
    }
    if let Some(database) = cli.database {
        config.database = Some(database);
    }
    if let Some(output) = cli.output {
        config.output_dir = output;
    }
    if let Some(tables) = cli.tables {
        config.include_tables = tables;
    }
    if let Some(exclude) = cli.exclude {
        config.exclude_tables = exclude;
    }
    if cli.dry_run {
        config.dry_run = true;
    }

    match &cli.command {
        Some(Commands::Dal) => {
            config.generate_bll = false;
        }
        Some(Commands::Inspect) => return inspect_schema(&config),
        Some(Commands::Databases) => return list_databases(&config),
        Some(Commands::Tables) => return list_tables(&config),
        Some(Commands::Generate) | None => {}
    }

    info!("Generating code from schema: {:?}", config.schema_file);

    let report = tiergen_codegen::generate(&config)?;

    for warning in &report.warnings {
        eprintln!("warning: {}", warning);
    }

    if config.dry_run {
        println!("Dry run mode - would generate:");
        for path in &report.written {
            println!("  {}", config.output_dir.join(path).display());
        }
        return Ok(());
    }

    if !report.is_success() {
        eprintln!("Failed to write {} files:", report.failures.len());
        for failure in &report.failures {
            eprintln!("  {}", failure);
        }
        bail!(
            "{} of {} files could not be written",
            report.failures.len(),
            report.failures.len() + report.written.len()
        );
    }

    info!(
        "Code generation completed successfully ({} files)",
        report.written.len()
    );
    Ok(())
}

fn open(config: &CodegenConfig) -> Result<Box<dyn SchemaProvider>> {
    if config.schema_file.as_os_str().is_empty() {
        bail!("schema_file is required (use --schema or a config file)");
    }
    Ok(tiergen_codegen::open_provider(config)?)
}

fn list_databases(config: &CodegenConfig) -> Result<()> {
    let provider = open(config)?;
    for database in provider.list_databases()? {
        println!("{}", database);
    }
    Ok(())
}

fn list_tables(config: &CodegenConfig) -> Result<()> {
    let provider = open(config)?;
    let database = tiergen_codegen::resolve_database(config.database.as_deref(), provider.as_ref())?;
    for table in provider.list_tables(&database)? {
        println!("{}", table);
    }
    Ok(())
}

fn inspect_schema(config: &CodegenConfig) -> Result<()> {
    let provider = open(config)?;
    let request = tiergen_codegen::build_request(config, provider.as_ref())?;
    let generator = tiergen_codegen::CodeGenerator::new(config.emit_options());

    println!(
        "Database {}: {} tables selected\n",
        request.database,
        request.tables.len()
    );
    for table in &request.tables {
        let columns = provider.get_columns(&request.database, table)?;
        let resolved = generator.resolve(TableSchema::new(table.as_str(), columns));

        println!("Table: {}", table);
        println!(
            "  Classes: {} / {}",
            resolved.identity.dal_class_name, resolved.identity.bll_class_name
        );
        println!("  Columns:");
        for col in &resolved.schema.columns {
            let nullable = if col.nullable { "NULL" } else { "NOT NULL" };
            let pk = if col.is_primary_key { " PK" } else { "" };
            let mapping = TypeResolver::map(&col.data_type);
            let unmapped = if mapping.recognized { "" } else { " (unmapped)" };
            println!(
                "    {}. {} {} {}{} -> {}{}",
                col.ordinal,
                col.name,
                col.data_type,
                nullable,
                pk,
                TypeResolver::resolve(col).to_type_string(),
                unmapped
            );
        }
        println!("  Key: {}", resolved.key.describe());
        println!();
    }

    Ok(())
}
