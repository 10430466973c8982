//! The seam between the generator and wherever table metadata lives

use super::metadata::ColumnMetadata;
use crate::error::Result;

/// Source of database, table and column metadata.
///
/// Implementations report failures as [`CodegenError::SchemaFetch`]; the
/// generator treats any such failure as fatal for the whole run.
///
/// [`CodegenError::SchemaFetch`]: crate::CodegenError::SchemaFetch
pub trait SchemaProvider {
    /// Databases this provider can describe
    fn list_databases(&self) -> Result<Vec<String>>;

    /// Base tables of a database, in catalog order
    fn list_tables(&self, database: &str) -> Result<Vec<String>>;

    /// Columns of a table in ordinal order, with primary-key flags already set
    fn get_columns(&self, database: &str, table: &str) -> Result<Vec<ColumnMetadata>>;
}
