//! Configuration settings for tiergen-codegen

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::defaults;
use crate::codegen::EmitOptions;
use crate::error::{CodegenError, Result};

/// Where table metadata comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaFormat {
    /// SQL Server `CREATE TABLE` script
    Ddl,
    /// JSON dump of the information-schema catalog
    Catalog,
}

/// Main configuration struct for code generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodegenConfig {
    /// Path to the schema source (DDL script or JSON catalog)
    #[serde(default)]
    pub schema_file: PathBuf,

    /// Format of `schema_file`; inferred from the extension when unset
    #[serde(default)]
    pub schema_format: Option<SchemaFormat>,

    /// Source database name, used for namespaces and output folders.
    /// Required for DDL sources; optional for catalogs holding one database.
    #[serde(default)]
    pub database: Option<String>,

    /// Tables to generate (comma-separated in selection order, or "*" for all)
    #[serde(default = "default_include_tables")]
    pub include_tables: String,

    /// Tables to exclude (comma-separated)
    #[serde(default = "default_exclude_tables")]
    pub exclude_tables: String,

    /// Whether to generate data-access classes
    #[serde(default = "default_generate_dal")]
    pub generate_dal: bool,

    /// Whether to generate business-logic classes
    #[serde(default = "default_generate_bll")]
    pub generate_bll: bool,

    /// Output root; `<database>.DataAccess` and `<database>.BusinessLogic` go beneath it
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Prefix for generated class names
    #[serde(default = "default_class_prefix")]
    pub class_prefix: String,

    /// Extension for generated files (without the dot)
    #[serde(default = "default_file_extension")]
    pub file_extension: String,

    /// C# expression yielding the connection string inside generated DAL code
    #[serde(default = "default_connection_accessor")]
    pub connection_accessor: String,

    /// Dry run mode - preview without writing files
    #[serde(default = "default_dry_run")]
    pub dry_run: bool,

    /// Log level (trace, debug, info, warn, error)
    /// Can be overridden by RUST_LOG env var
    #[serde(default)]
    pub log_level: Option<String>,
}

// Default value functions for serde
fn default_include_tables() -> String {
    defaults::INCLUDE_TABLES.to_string()
}
fn default_exclude_tables() -> String {
    defaults::EXCLUDE_TABLES.to_string()
}
fn default_generate_dal() -> bool {
    defaults::GENERATE_DAL
}
fn default_generate_bll() -> bool {
    defaults::GENERATE_BLL
}
fn default_output_dir() -> PathBuf {
    PathBuf::from(defaults::OUTPUT_DIR)
}
fn default_class_prefix() -> String {
    defaults::CLASS_PREFIX.to_string()
}
fn default_file_extension() -> String {
    defaults::FILE_EXTENSION.to_string()
}
fn default_connection_accessor() -> String {
    defaults::CONNECTION_ACCESSOR.to_string()
}
fn default_dry_run() -> bool {
    defaults::DRY_RUN
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            schema_file: PathBuf::new(),
            schema_format: None,
            database: None,
            include_tables: default_include_tables(),
            exclude_tables: default_exclude_tables(),
            generate_dal: default_generate_dal(),
            generate_bll: default_generate_bll(),
            output_dir: default_output_dir(),
            class_prefix: default_class_prefix(),
            file_extension: default_file_extension(),
            connection_accessor: default_connection_accessor(),
            dry_run: default_dry_run(),
            log_level: None,
        }
    }
}

impl CodegenConfig {
    /// Create a default config with the given schema file
    pub fn default_with_schema(schema_file: PathBuf) -> Self {
        Self {
            schema_file,
            ..Default::default()
        }
    }

    /// Load configuration using config-rs (file + environment variables)
    ///
    /// Environment variables use the `TIERGEN_` prefix, e.g.
    /// `TIERGEN_SCHEMA_FILE` or `TIERGEN_DRY_RUN=true`.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from config file if specified
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path));
        } else {
            // Try default locations
            builder = builder.add_source(File::with_name("tiergen").required(false));
        }

        // Override with environment variables (TIERGEN_*)
        builder = builder.add_source(
            Environment::with_prefix("TIERGEN")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: CodegenConfig = builder.build()?.try_deserialize()?;

        Ok(config)
    }

    /// The schema format, falling back to the file extension
    pub fn resolved_schema_format(&self) -> SchemaFormat {
        if let Some(format) = self.schema_format {
            return format;
        }
        match self.schema_file.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => SchemaFormat::Catalog,
            _ => SchemaFormat::Ddl,
        }
    }

    /// Options that shape the emitted source text
    pub fn emit_options(&self) -> EmitOptions {
        EmitOptions {
            class_prefix: self.class_prefix.clone(),
            file_extension: self.file_extension.clone(),
            connection_accessor: self.connection_accessor.clone(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.schema_file.as_os_str().is_empty() {
            return Err(CodegenError::ValidationError(
                "schema_file is required".into(),
            ));
        }

        if !self.schema_file.exists() {
            return Err(CodegenError::ValidationError(format!(
                "Schema file not found: {}",
                self.schema_file.display()
            )));
        }

        if self.resolved_schema_format() == SchemaFormat::Ddl
            && self.database.as_deref().map_or(true, |d| d.trim().is_empty())
        {
            return Err(CodegenError::ValidationError(
                "database is required when reading a DDL schema".into(),
            ));
        }

        if !self.generate_dal && !self.generate_bll {
            return Err(CodegenError::ValidationError(
                "at least one of generate_dal / generate_bll must be true".into(),
            ));
        }

        if self.generate_bll && !self.generate_dal {
            return Err(CodegenError::ValidationError(
                "generate_dal must be true when generate_bll is true (business classes call the data-access classes)".into(),
            ));
        }

        if self.file_extension.trim().is_empty() {
            return Err(CodegenError::ValidationError(
                "file_extension must not be empty".into(),
            ));
        }

        if self.connection_accessor.trim().is_empty() {
            return Err(CodegenError::ValidationError(
                "connection_accessor must not be empty".into(),
            ));
        }

        Ok(())
    }
}
