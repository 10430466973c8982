//! Main code generator orchestrator

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::config::defaults;
use crate::error::{CodegenError, Result};
use crate::schema::{SchemaProvider, TableSchema};

use super::bll_generator::build_bll;
use super::dal_generator::build_dal;
use super::key_resolver::{ResolvedKey, ResolvedTable};
use super::naming::{EntityIdentity, NamingStrategy, TrailingS};
use super::output::OutputSink;
use super::type_resolver::TypeResolver;

/// Settings that shape the emitted text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    pub class_prefix: String,
    pub file_extension: String,
    /// C# expression yielding the connection string, emitted verbatim
    pub connection_accessor: String,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            class_prefix: defaults::CLASS_PREFIX.to_string(),
            file_extension: defaults::FILE_EXTENSION.to_string(),
            connection_accessor: defaults::CONNECTION_ACCESSOR.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Dal,
    Bll,
}

/// One generated source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    pub kind: ArtifactKind,
    pub relative_path: PathBuf,
    pub source_text: String,
}

/// Which layers to generate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layers {
    pub dal: bool,
    pub bll: bool,
}

impl Default for Layers {
    fn default() -> Self {
        Self {
            dal: true,
            bll: true,
        }
    }
}

/// Everything one run needs; built once, never mutated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub database: String,
    /// Table names in selection order, without repeats
    pub tables: Vec<String>,
    pub layers: Layers,
}

impl GenerationRequest {
    /// A request for both layers.
    ///
    /// A table listed twice, in any letter case, is kept at its first position;
    /// SQL Server's default collation treats `Students` and `students` as one table.
    pub fn new(database: impl Into<String>, tables: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let mut seen = HashSet::new();
        let tables = tables
            .into_iter()
            .map(Into::into)
            .filter(|t: &String| seen.insert(t.to_lowercase()))
            .collect();
        Self {
            database: database.into(),
            tables,
            layers: Layers::default(),
        }
    }

    pub fn with_layers(mut self, layers: Layers) -> Self {
        self.layers = layers;
        self
    }

    pub fn dal_namespace(&self) -> String {
        format!("{}.DataAccess", self.database)
    }

    pub fn bll_namespace(&self) -> String {
        format!("{}.BusinessLogic", self.database)
    }
}

/// Progress notices delivered between the two passes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchSignal {
    DataAccessComplete { count: usize },
    BusinessLogicComplete { count: usize },
}

impl fmt::Display for BatchSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchSignal::DataAccessComplete { count } => {
                write!(f, "Data access layer generated ({} classes)", count)
            }
            BatchSignal::BusinessLogicComplete { count } => {
                write!(f, "Business logic layer generated ({} classes)", count)
            }
        }
    }
}

/// An artifact that could not be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteFailure {
    pub table: String,
    pub path: PathBuf,
    pub message: String,
}

impl fmt::Display for WriteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.path.display(), self.table, self.message)
    }
}

/// A column whose source type fell back to `string`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmappedTypeWarning {
    pub table: String,
    pub column: String,
    pub data_type: String,
}

impl fmt::Display for UnmappedTypeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}: unrecognized type '{}' mapped to string",
            self.table, self.column, self.data_type
        )
    }
}

/// Outcome of a run that got as far as writing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    /// Paths written, in write order
    pub written: Vec<PathBuf>,
    pub failures: Vec<WriteFailure>,
    pub warnings: Vec<UnmappedTypeWarning>,
}

impl GenerationReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Main code generator that drives both layer builders over a table set
pub struct CodeGenerator {
    options: EmitOptions,
    naming: Box<dyn NamingStrategy>,
}

impl CodeGenerator {
    /// Create a new code generator using the trailing-`s` naming rule
    pub fn new(options: EmitOptions) -> Self {
        Self {
            options,
            naming: Box::new(TrailingS),
        }
    }

    pub fn with_naming_strategy(mut self, naming: Box<dyn NamingStrategy>) -> Self {
        self.naming = naming;
        self
    }

    /// Attach names and key to a fetched schema
    pub fn resolve(&self, schema: TableSchema) -> ResolvedTable {
        let identity = EntityIdentity::resolve(&schema.name, self.naming.as_ref(), &self.options.class_prefix);
        ResolvedTable::new(schema, identity)
    }

    /// Fetch, resolve and render the requested layers without writing anything.
    ///
    /// Artifacts come back DAL batch first, then BLL batch, each in selection order.
    pub fn build(
        &self,
        request: &GenerationRequest,
        provider: &dyn SchemaProvider,
    ) -> Result<(Vec<GeneratedArtifact>, Vec<UnmappedTypeWarning>)> {
        let tables = self.prepare(request, provider)?;
        let warnings = unmapped_types(&tables);
        let mut artifacts = Vec::new();
        if request.layers.dal {
            artifacts.extend(self.dal_artifacts(request, &tables));
        }
        if request.layers.bll {
            artifacts.extend(self.bll_artifacts(request, &tables));
        }
        Ok((artifacts, warnings))
    }

    /// Run the whole pipeline into `sink`.
    ///
    /// Collisions and schema fetch errors abort before anything is written.
    /// Write failures are collected and the remaining artifacts still go out.
    pub fn generate(
        &self,
        request: &GenerationRequest,
        provider: &dyn SchemaProvider,
        sink: &mut dyn OutputSink,
        on_signal: &mut dyn FnMut(&BatchSignal),
    ) -> Result<GenerationReport> {
        let tables = self.prepare(request, provider)?;

        let mut report = GenerationReport {
            warnings: unmapped_types(&tables),
            ..GenerationReport::default()
        };
        for warning in &report.warnings {
            warn!("{}", warning);
        }

        if request.layers.dal {
            let artifacts = self.dal_artifacts(request, &tables);
            let count = artifacts.len();
            write_all(sink, &tables, artifacts, &mut report);
            on_signal(&BatchSignal::DataAccessComplete { count });
        }

        if request.layers.bll {
            let artifacts = self.bll_artifacts(request, &tables);
            let count = artifacts.len();
            write_all(sink, &tables, artifacts, &mut report);
            on_signal(&BatchSignal::BusinessLogicComplete { count });
        }

        info!(
            "Generated {} files for {} tables ({} failed)",
            report.written.len(),
            tables.len(),
            report.failures.len()
        );
        Ok(report)
    }

    /// Check names, then fetch and resolve every table
    fn prepare(&self, request: &GenerationRequest, provider: &dyn SchemaProvider) -> Result<Vec<ResolvedTable>> {
        if request.layers.bll && !request.layers.dal {
            return Err(CodegenError::ConfigError(
                "business logic generation requires data access generation".to_string(),
            ));
        }

        self.check_collisions(&request.tables)?;

        let mut resolved = Vec::with_capacity(request.tables.len());
        for table in &request.tables {
            let columns = provider.get_columns(&request.database, table)?;
            if columns.is_empty() {
                return Err(CodegenError::schema_fetch(
                    &request.database,
                    format!("table '{}' has no columns", table),
                ));
            }
            let resolved_table = self.resolve(TableSchema::new(table, columns));
            debug!("Resolved {} key: {}", table, resolved_table.key.describe());
            if let ResolvedKey::Composite(_) = resolved_table.key {
                info!(
                    "Table {} has a {} key; generating read-all only",
                    table,
                    resolved_table.key.describe()
                );
            }
            resolved.push(resolved_table);
        }
        Ok(resolved)
    }

    /// Entity names must be unique ignoring case
    fn check_collisions(&self, tables: &[String]) -> Result<()> {
        let mut by_entity: Vec<(String, Vec<String>)> = Vec::new();
        for table in tables {
            let entity = self.naming.entity_name(table).to_lowercase();
            match by_entity.iter_mut().find(|(e, _)| *e == entity) {
                Some((_, group)) => group.push(table.clone()),
                None => by_entity.push((entity, vec![table.clone()])),
            }
        }

        match by_entity.into_iter().find(|(_, group)| group.len() > 1) {
            Some((_, group)) => Err(CodegenError::NameCollision {
                entity: self.naming.entity_name(&group[0]),
                tables: group,
            }),
            None => Ok(()),
        }
    }

    fn dal_artifacts(&self, request: &GenerationRequest, tables: &[ResolvedTable]) -> Vec<GeneratedArtifact> {
        let namespace = request.dal_namespace();
        let dir = PathBuf::from(&namespace);
        tables
            .iter()
            .map(|table| GeneratedArtifact {
                kind: ArtifactKind::Dal,
                relative_path: dir.join(table.identity.dal_file_name(&self.options.file_extension)),
                source_text: build_dal(table, &namespace, &self.options).render(),
            })
            .collect()
    }

    fn bll_artifacts(&self, request: &GenerationRequest, tables: &[ResolvedTable]) -> Vec<GeneratedArtifact> {
        let namespace = request.bll_namespace();
        let dal_namespace = request.dal_namespace();
        let dir = PathBuf::from(&namespace);
        tables
            .iter()
            .map(|table| GeneratedArtifact {
                kind: ArtifactKind::Bll,
                relative_path: dir.join(table.identity.bll_file_name(&self.options.file_extension)),
                source_text: build_bll(table, &namespace, &dal_namespace).render(),
            })
            .collect()
    }
}

fn unmapped_types(tables: &[ResolvedTable]) -> Vec<UnmappedTypeWarning> {
    tables
        .iter()
        .flat_map(|table| {
            table
                .schema
                .columns
                .iter()
                .filter(|c| !TypeResolver::map(&c.data_type).recognized)
                .map(move |c| UnmappedTypeWarning {
                    table: table.schema.name.clone(),
                    column: c.name.clone(),
                    data_type: c.data_type.clone(),
                })
        })
        .collect()
}

fn write_all(
    sink: &mut dyn OutputSink,
    tables: &[ResolvedTable],
    artifacts: Vec<GeneratedArtifact>,
    report: &mut GenerationReport,
) {
    for (table, artifact) in tables.iter().zip(artifacts) {
        match sink.write(&artifact.relative_path, &artifact.source_text) {
            Ok(()) => {
                debug!("Wrote {}", artifact.relative_path.display());
                report.written.push(artifact.relative_path);
            }
            Err(e) => {
                warn!("Failed to write {}: {}", artifact.relative_path.display(), e);
                report.failures.push(WriteFailure {
                    table: table.schema.name.clone(),
                    path: artifact.relative_path,
                    message: e.to_string(),
                });
            }
        }
    }
}
