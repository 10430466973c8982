//! Schema provider backed by a JSON dump of the information schema
//!
//! The layout mirrors the rows the column query returns, grouped by
//! database and table:
//!
//! ```json
//! {
//!   "databases": [
//!     {
//!       "name": "School",
//!       "tables": [
//!         {
//!           "name": "Students",
//!           "columns": [
//!             { "name": "StudentID", "data_type": "int", "nullable": false, "is_primary_key": true },
//!             { "name": "GPA", "data_type": "decimal", "nullable": true }
//!           ]
//!         }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! `ordinal` may be given per column; when omitted the position in the
//! array is used.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::metadata::ColumnMetadata;
use super::provider::SchemaProvider;
use crate::error::{CodegenError, Result};

/// Root of a catalog document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub databases: Vec<CatalogDatabase>,
}

/// One database in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogDatabase {
    pub name: String,
    #[serde(default)]
    pub tables: Vec<CatalogTable>,
}

/// One base table in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogTable {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<CatalogColumn>,
}

/// One column row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogColumn {
    pub name: String,
    pub data_type: String,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub is_primary_key: bool,
    #[serde(default)]
    pub ordinal: Option<u32>,
}

/// Serves metadata from an in-memory [`Catalog`]
#[derive(Debug, Clone)]
pub struct CatalogProvider {
    catalog: Catalog,
}

impl CatalogProvider {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    /// Parse a catalog document
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    /// Read and parse a catalog document from disk
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    fn database(&self, database: &str) -> Result<&CatalogDatabase> {
        self.catalog
            .databases
            .iter()
            .find(|d| d.name == database)
            .ok_or_else(|| CodegenError::schema_fetch(database, "database not found in catalog"))
    }
}

impl SchemaProvider for CatalogProvider {
    fn list_databases(&self) -> Result<Vec<String>> {
        Ok(self.catalog.databases.iter().map(|d| d.name.clone()).collect())
    }

    fn list_tables(&self, database: &str) -> Result<Vec<String>> {
        Ok(self
            .database(database)?
            .tables
            .iter()
            .map(|t| t.name.clone())
            .collect())
    }

    fn get_columns(&self, database: &str, table: &str) -> Result<Vec<ColumnMetadata>> {
        let entry = self
            .database(database)?
            .tables
            .iter()
            .find(|t| t.name == table)
            .ok_or_else(|| CodegenError::schema_fetch(database, format!("table '{}' not found", table)))?;

        let mut columns: Vec<ColumnMetadata> = entry
            .columns
            .iter()
            .zip(1u32..)
            .map(|(col, position)| ColumnMetadata {
                name: col.name.clone(),
                data_type: col.data_type.clone(),
                nullable: col.nullable,
                is_primary_key: col.is_primary_key,
                ordinal: col.ordinal.unwrap_or(position),
            })
            .collect();
        columns.sort_by_key(|c| c.ordinal);
        Ok(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"{
        "databases": [
            {
                "name": "School",
                "tables": [
                    {
                        "name": "Students",
                        "columns": [
                            { "name": "StudentID", "data_type": "int", "is_primary_key": true },
                            { "name": "Name", "data_type": "nvarchar" },
                            { "name": "GPA", "data_type": "decimal", "nullable": true }
                        ]
                    },
                    { "name": "Logs", "columns": [] }
                ]
            },
            { "name": "Library" }
        ]
    }"#;

    #[test]
    fn test_lists_in_document_order() {
        let provider = CatalogProvider::from_json(CATALOG).unwrap();
        assert_eq!(provider.list_databases().unwrap(), ["School", "Library"]);
        assert_eq!(provider.list_tables("School").unwrap(), ["Students", "Logs"]);
        assert!(provider.list_tables("Library").unwrap().is_empty());
    }

    #[test]
    fn test_columns_get_positional_ordinals() {
        let provider = CatalogProvider::from_json(CATALOG).unwrap();
        let columns = provider.get_columns("School", "Students").unwrap();
        let ordinals: Vec<u32> = columns.iter().map(|c| c.ordinal).collect();
        assert_eq!(ordinals, [1, 2, 3]);
        assert!(columns[0].is_primary_key);
        assert!(!columns[1].nullable);
        assert!(columns[2].nullable);
    }

    #[test]
    fn test_explicit_ordinals_reorder_columns() {
        let provider = CatalogProvider::from_json(
            r#"{ "databases": [ { "name": "School", "tables": [ { "name": "Rooms", "columns": [
                { "name": "Label", "data_type": "nvarchar", "ordinal": 2 },
                { "name": "RoomID", "data_type": "int", "is_primary_key": true, "ordinal": 1 }
            ] } ] } ] }"#,
        )
        .unwrap();
        let columns = provider.get_columns("School", "Rooms").unwrap();
        let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["RoomID", "Label"]);
    }

    #[test]
    fn test_missing_entries_are_fetch_errors() {
        let provider = CatalogProvider::from_json(CATALOG).unwrap();
        assert!(matches!(
            provider.get_columns("School", "Teachers"),
            Err(CodegenError::SchemaFetch { .. })
        ));
        assert!(matches!(
            provider.list_tables("Hospital"),
            Err(CodegenError::SchemaFetch { .. })
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            CatalogProvider::from_json("{ not json"),
            Err(CodegenError::ParseError(_))
        ));
    }
}
