//! tiergen-codegen: Generate C# data-access and business-logic classes from SQL Server table metadata
//!
//! For every selected table the generator emits two ADO.NET classes:
//!
//! - `<Db>.DataAccess/cls<Entity>Data.cs` with static CRUD methods over `SqlCommand`
//! - `<Db>.BusinessLogic/cls<Entity>.cs` with typed properties, `Find`, `Save` and passthroughs
//!
//! Table metadata comes from a SQL Server `CREATE TABLE` script (parsed with
//! `sqlparser-rs`) or from a JSON dump of the information-schema catalog.
//!
//! # Usage in build.rs
//!
//! Configure in your `Cargo.toml`:
//!
//! ```toml
//! [package.metadata.tiergen]
//! schema_file = "schema.sql"
//! database = "School"
//! ```
//!
//! Then use a minimal `build.rs`:
//!
//! ```rust,ignore
//! fn main() {
//!     tiergen_codegen::generate_from_cargo_metadata()
//!         .expect("Failed to generate C# tiers");
//! }
//! ```
//!
//! # Programmatic Configuration
//!
//! ```rust,ignore
//! fn main() {
//!     let report = tiergen_codegen::CodegenBuilder::new("schema.sql")
//!         .database("School")
//!         .output_dir("generated")
//!         .include_tables(&["Students", "Courses"])
//!         .generate()
//!         .expect("Failed to generate C# tiers");
//!     assert!(report.is_success());
//! }
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! tiergen-codegen --schema schema.sql --database School --output ./generated generate
//! ```

pub mod codegen;
pub mod config;
pub mod error;
pub mod schema;

use std::path::{Path, PathBuf};

use tracing::{debug, info};

pub use codegen::{
    BatchSignal, CodeGenerator, GenerationReport, GenerationRequest, Layers, WriteFailure,
};
pub use config::{CodegenConfig, SchemaFormat};
pub use error::{CodegenError, Result};

use codegen::{DryRunSink, FsSink, OutputSink};
use schema::{CatalogProvider, DdlSchemaProvider, SchemaProvider};

/// Main entry point for code generation
///
/// Paths in the returned report are relative to `config.output_dir`.
pub fn generate(config: &CodegenConfig) -> Result<GenerationReport> {
    config.validate()?;

    let provider = open_provider(config)?;
    let request = build_request(config, provider.as_ref())?;
    info!(
        "Generating {} tables from database {}",
        request.tables.len(),
        request.database
    );

    let mut sink: Box<dyn OutputSink> = if config.dry_run {
        Box::new(DryRunSink::default())
    } else {
        info!("Writing to {:?}", config.output_dir);
        Box::new(FsSink::new(&config.output_dir))
    };

    CodeGenerator::new(config.emit_options()).generate(
        &request,
        provider.as_ref(),
        sink.as_mut(),
        &mut |signal: &BatchSignal| info!("{}", signal),
    )
}

/// Open the schema source named by the configuration
pub fn open_provider(config: &CodegenConfig) -> Result<Box<dyn SchemaProvider>> {
    info!("Reading schema: {:?}", config.schema_file);
    match config.resolved_schema_format() {
        SchemaFormat::Ddl => {
            let database = config.database.clone().ok_or_else(|| {
                CodegenError::ConfigError("database is required when reading a DDL schema".into())
            })?;
            Ok(Box::new(DdlSchemaProvider::from_file(
                database,
                &config.schema_file,
            )?))
        }
        SchemaFormat::Catalog => Ok(Box::new(CatalogProvider::from_file(&config.schema_file)?)),
    }
}

/// Turn configuration into an immutable request against `provider`
pub fn build_request(
    config: &CodegenConfig,
    provider: &dyn SchemaProvider,
) -> Result<GenerationRequest> {
    let database = resolve_database(config.database.as_deref(), provider)?;
    let tables = select_tables(
        provider,
        &database,
        &config.include_tables,
        &config.exclude_tables,
    )?;
    if tables.is_empty() {
        return Err(CodegenError::ConfigError(format!(
            "no tables selected from database {} (include={}, exclude={})",
            database, config.include_tables, config.exclude_tables
        )));
    }

    Ok(GenerationRequest::new(database, tables).with_layers(Layers {
        dal: config.generate_dal,
        bll: config.generate_bll,
    }))
}

/// The configured database, or the only one the provider offers
pub fn resolve_database(configured: Option<&str>, provider: &dyn SchemaProvider) -> Result<String> {
    if let Some(name) = configured.map(str::trim).filter(|n| !n.is_empty()) {
        return Ok(name.to_string());
    }

    let mut databases = provider.list_databases()?;
    match databases.len() {
        1 => Ok(databases.remove(0)),
        0 => Err(CodegenError::ConfigError(
            "schema source contains no databases".into(),
        )),
        _ => Err(CodegenError::ConfigError(format!(
            "schema source contains several databases ({}); set `database`",
            databases.join(", ")
        ))),
    }
}

/// Resolve include/exclude patterns to table names in selection order
pub fn select_tables(
    provider: &dyn SchemaProvider,
    database: &str,
    include: &str,
    exclude: &str,
) -> Result<Vec<String>> {
    let available = if include_all(include) {
        provider.list_tables(database)?
    } else {
        Vec::new()
    };
    let tables = filter_tables(&available, include, exclude);
    debug!(
        "Selected {} tables (include={}, exclude={})",
        tables.len(),
        include,
        exclude
    );
    Ok(tables)
}

fn include_all(include: &str) -> bool {
    include.trim() == "*" || include.trim().is_empty()
}

fn split_list(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|s| !s.is_empty())
}

/// Filter tables based on include/exclude patterns.
///
/// `*` keeps `available` in its own order; an explicit list keeps list order.
/// Names in an explicit list are not checked here; unknown tables fail at fetch time.
fn filter_tables(available: &[String], include: &str, exclude: &str) -> Vec<String> {
    let excluded: Vec<&str> = split_list(exclude).collect();

    let candidates: Vec<String> = if include_all(include) {
        available.to_vec()
    } else {
        split_list(include).map(str::to_string).collect()
    };

    candidates
        .into_iter()
        .filter(|t| !excluded.contains(&t.as_str()))
        .collect()
}

/// Builder pattern for easy configuration in build.rs
pub struct CodegenBuilder {
    config: CodegenConfig,
}

impl CodegenBuilder {
    /// Create a new builder with the given schema file
    pub fn new(schema_file: impl AsRef<Path>) -> Self {
        Self {
            config: CodegenConfig::default_with_schema(schema_file.as_ref().to_path_buf()),
        }
    }

    /// Set the source database name
    pub fn database(mut self, name: &str) -> Self {
        self.config.database = Some(name.to_string());
        self
    }

    /// Read the schema file as this format instead of inferring it
    pub fn schema_format(mut self, format: SchemaFormat) -> Self {
        self.config.schema_format = Some(format);
        self
    }

    /// Set the output root
    pub fn output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.output_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Set tables to include, in selection order
    pub fn include_tables(mut self, tables: &[&str]) -> Self {
        self.config.include_tables = tables.join(",");
        self
    }

    /// Set tables to exclude
    pub fn exclude_tables(mut self, tables: &[&str]) -> Self {
        self.config.exclude_tables = tables.join(",");
        self
    }

    /// Generate only data-access classes
    pub fn dal_only(mut self) -> Self {
        self.config.generate_bll = false;
        self
    }

    /// Set the class name prefix (default `cls`)
    pub fn class_prefix(mut self, prefix: &str) -> Self {
        self.config.class_prefix = prefix.to_string();
        self
    }

    /// Set the generated file extension (default `cs`)
    pub fn file_extension(mut self, extension: &str) -> Self {
        self.config.file_extension = extension.to_string();
        self
    }

    /// Set the C# expression generated code reads the connection string from
    pub fn connection_accessor(mut self, accessor: &str) -> Self {
        self.config.connection_accessor = accessor.to_string();
        self
    }

    /// Enable dry run mode (preview without writing files)
    pub fn dry_run(mut self) -> Self {
        self.config.dry_run = true;
        self
    }

    /// Generate the code
    pub fn generate(self) -> Result<GenerationReport> {
        generate(&self.config)
    }
}

/// Configuration for `[package.metadata.tiergen]` in Cargo.toml
#[derive(Debug, Clone, Default, serde::Deserialize)]
struct CargoMetadataConfig {
    /// Path to the schema file (required)
    schema_file: Option<String>,

    /// `ddl` or `catalog` (optional, inferred from the extension)
    schema_format: Option<SchemaFormat>,

    /// Source database name
    database: Option<String>,

    /// Tables to include in selection order (optional, defaults to all)
    #[serde(default)]
    include_tables: Vec<String>,

    /// Tables to exclude (optional)
    #[serde(default)]
    exclude_tables: Vec<String>,

    /// Whether to generate business-logic classes (default: true)
    generate_bll: Option<bool>,

    /// Output root, relative to the manifest (default: OUT_DIR)
    output_dir: Option<String>,

    class_prefix: Option<String>,

    file_extension: Option<String>,

    connection_accessor: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct CargoToml {
    package: Option<CargoPackage>,
}

#[derive(Debug, serde::Deserialize)]
struct CargoPackage {
    metadata: Option<CargoPackageMetadata>,
}

#[derive(Debug, serde::Deserialize)]
struct CargoPackageMetadata {
    tiergen: Option<CargoMetadataConfig>,
}

/// Generate code from `[package.metadata.tiergen]` in Cargo.toml
///
/// ```rust,ignore
/// // build.rs
/// fn main() {
///     tiergen_codegen::generate_from_cargo_metadata()
///         .expect("Failed to generate C# tiers");
/// }
/// ```
///
/// Configure in Cargo.toml:
///
/// ```toml
/// [package.metadata.tiergen]
/// schema_file = "schema.sql"
/// database = "School"
/// include_tables = ["Students", "Courses"]
/// exclude_tables = ["__Migrations"]
/// ```
pub fn generate_from_cargo_metadata() -> Result<GenerationReport> {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").map_err(|_| {
        CodegenError::ConfigError(
            "CARGO_MANIFEST_DIR not set - are you running from build.rs?".into(),
        )
    })?;

    let cargo_toml_path = PathBuf::from(&manifest_dir).join("Cargo.toml");
    let cargo_toml_content = std::fs::read_to_string(&cargo_toml_path)?;

    let cargo_toml: CargoToml = toml::from_str(&cargo_toml_content).map_err(|e| {
        CodegenError::ConfigError(format!(
            "Failed to parse {}: {}",
            cargo_toml_path.display(),
            e
        ))
    })?;

    let metadata_config = cargo_toml
        .package
        .and_then(|p| p.metadata)
        .and_then(|m| m.tiergen)
        .ok_or_else(|| {
            CodegenError::ConfigError("Missing [package.metadata.tiergen] section in Cargo.toml".into())
        })?;

    let schema_file = metadata_config.schema_file.ok_or_else(|| {
        CodegenError::ConfigError("schema_file is required in [package.metadata.tiergen]".into())
    })?;

    // Resolve schema_file relative to manifest dir
    let schema_path = PathBuf::from(&manifest_dir).join(&schema_file);

    let mut builder = CodegenBuilder::new(&schema_path);

    if let Some(output_dir) = metadata_config.output_dir {
        builder = builder.output_dir(PathBuf::from(&manifest_dir).join(output_dir));
    } else {
        let out_dir = std::env::var("OUT_DIR").map(PathBuf::from).map_err(|_| {
            CodegenError::ConfigError("OUT_DIR not set - are you running from build.rs?".into())
        })?;
        builder = builder.output_dir(out_dir);
    }

    if let Some(format) = metadata_config.schema_format {
        builder = builder.schema_format(format);
    }
    if let Some(database) = &metadata_config.database {
        builder = builder.database(database);
    }

    if !metadata_config.include_tables.is_empty() {
        let tables: Vec<&str> = metadata_config
            .include_tables
            .iter()
            .map(|s| s.as_str())
            .collect();
        builder = builder.include_tables(&tables);
    }
    if !metadata_config.exclude_tables.is_empty() {
        let tables: Vec<&str> = metadata_config
            .exclude_tables
            .iter()
            .map(|s| s.as_str())
            .collect();
        builder = builder.exclude_tables(&tables);
    }

    if let Some(false) = metadata_config.generate_bll {
        builder = builder.dal_only();
    }
    if let Some(prefix) = &metadata_config.class_prefix {
        builder = builder.class_prefix(prefix);
    }
    if let Some(extension) = &metadata_config.file_extension {
        builder = builder.file_extension(extension);
    }
    if let Some(accessor) = &metadata_config.connection_accessor {
        builder = builder.connection_accessor(accessor);
    }

    println!("cargo:rerun-if-changed={}", schema_path.display());
    println!("cargo:rerun-if-changed={}", cargo_toml_path.display());

    builder.generate()
}
