//! Primary-key resolution and the resolved view of a table

use crate::schema::{ColumnMetadata, TableSchema};

use super::naming::EntityIdentity;

/// What the primary-key flags of a table amount to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedKey {
    /// Exactly one key column
    Single(ColumnMetadata),
    /// Several key columns; not supported, generated like `None`
    Composite(Vec<ColumnMetadata>),
    /// No key column
    None,
}

impl ResolvedKey {
    /// Resolve the key of `schema`. Never fails.
    pub fn resolve(schema: &TableSchema) -> Self {
        let mut keys = schema.primary_key_columns();
        match keys.len() {
            0 => ResolvedKey::None,
            1 => ResolvedKey::Single(keys.remove(0).clone()),
            _ => ResolvedKey::Composite(keys.into_iter().cloned().collect()),
        }
    }

    /// The key column, if the table has one the generated CRUD can use
    pub fn usable(&self) -> Option<&ColumnMetadata> {
        match self {
            ResolvedKey::Single(column) => Some(column),
            ResolvedKey::Composite(_) | ResolvedKey::None => None,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            ResolvedKey::Single(column) => format!("single ({})", column.name),
            ResolvedKey::Composite(columns) => {
                let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
                format!("composite ({}), read-only", names.join(", "))
            }
            ResolvedKey::None => "none, read-only".to_string(),
        }
    }
}

/// A table with its names and key resolved once, handed to both builders
#[derive(Debug, Clone)]
pub struct ResolvedTable {
    pub schema: TableSchema,
    pub identity: EntityIdentity,
    pub key: ResolvedKey,
}

impl ResolvedTable {
    pub fn new(schema: TableSchema, identity: EntityIdentity) -> Self {
        let key = ResolvedKey::resolve(&schema);
        Self {
            schema,
            identity,
            key,
        }
    }

    /// Columns other than the usable key, in ordinal order
    pub fn non_key_columns(&self) -> Vec<&ColumnMetadata> {
        let key = self.key.usable();
        self.schema
            .columns
            .iter()
            .filter(|c| key.map_or(true, |k| k.name != c.name))
            .collect()
    }

    /// The usable key followed by every other column in ordinal order
    pub fn key_first_columns(&self) -> Vec<&ColumnMetadata> {
        self.key
            .usable()
            .into_iter()
            .chain(self.non_key_columns())
            .collect()
    }
}
