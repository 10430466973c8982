//! Metadata structures for a table's column catalog

use serde::{Deserialize, Serialize};

/// Metadata for a column, as reported by the information schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    /// Column name
    pub name: String,

    /// Source data type as reported by the catalog (e.g. "int", "NVARCHAR(100)")
    pub data_type: String,

    /// Whether the column admits NULL
    pub nullable: bool,

    /// Whether the column takes part in the table's primary key
    pub is_primary_key: bool,

    /// 1-based position in the table definition
    pub ordinal: u32,
}

/// A table and its columns in ordinal order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table name
    pub name: String,

    /// Columns, sorted by `ordinal`
    pub columns: Vec<ColumnMetadata>,
}

impl TableSchema {
    /// Build a schema, putting the columns into ordinal order.
    ///
    /// The sort is stable, so providers that already deliver catalog order
    /// are left untouched.
    pub fn new(name: impl Into<String>, mut columns: Vec<ColumnMetadata>) -> Self {
        columns.sort_by_key(|c| c.ordinal);
        Self {
            name: name.into(),
            columns,
        }
    }

    /// Get a column by name
    pub fn get_column(&self, name: &str) -> Option<&ColumnMetadata> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Columns flagged as primary key, in ordinal order
    pub fn primary_key_columns(&self) -> Vec<&ColumnMetadata> {
        self.columns.iter().filter(|c| c.is_primary_key).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, ordinal: u32, is_primary_key: bool) -> ColumnMetadata {
        ColumnMetadata {
            name: name.to_string(),
            data_type: "int".to_string(),
            nullable: false,
            is_primary_key,
            ordinal,
        }
    }

    #[test]
    fn test_new_sorts_by_ordinal() {
        let table = TableSchema::new(
            "Students",
            vec![column("GPA", 3, false), column("StudentID", 1, true), column("Name", 2, false)],
        );
        let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["StudentID", "Name", "GPA"]);
    }

    #[test]
    fn test_primary_key_columns() {
        let table = TableSchema::new(
            "Enrollments",
            vec![column("StudentID", 1, true), column("CourseID", 2, true), column("Grade", 3, false)],
        );
        assert_eq!(table.primary_key_columns().len(), 2);
        assert!(table.get_column("Grade").is_some());
        assert!(table.get_column("Missing").is_none());
    }
}
