//! SQL Server DDL parser using sqlparser-rs
//!
//! Accepts hand-written scripts as well as the ones SQL Server Management
//! Studio generates: `GO` batch separators, bracket-quoted type names and the
//! storage clauses (`ON [PRIMARY]`, `TEXTIMAGE_ON [PRIMARY]`,
//! `WITH (PAD_INDEX = OFF, ...)`) are handled before parsing. Batches that do
//! not create a table are skipped.

use std::path::Path;

use sqlparser::ast::{
    ColumnOption, DataType, Expr, Ident, IndexColumn, ObjectName, PrimaryKeyConstraint,
    Statement, TableConstraint,
};
use sqlparser::dialect::MsSqlDialect;
use sqlparser::parser::{Parser, ParserError};
use sqlparser::tokenizer::{Token, Tokenizer, Whitespace};
use tracing::debug;

use super::metadata::{ColumnMetadata, TableSchema};
use super::provider::SchemaProvider;
use crate::error::{CodegenError, Result};

/// Parse a SQL script into table schemas, in declaration order
pub fn parse_schema(sql: &str) -> Result<Vec<TableSchema>> {
    let dialect = MsSqlDialect {};
    let tokens = Tokenizer::new(&dialect, sql)
        .tokenize()
        .map_err(ParserError::from)?;

    let mut tables = Vec::new();

    for batch in split_batches(tokens) {
        if !creates_table(&batch) {
            continue;
        }

        let statements = Parser::new(&dialect)
            .with_tokens(strip_storage_clauses(batch))
            .parse_statements()?;

        for stmt in statements {
            if let Statement::CreateTable(create_table) = stmt {
                tables.push(extract_table_schema(&create_table));
            }
        }
    }

    Ok(tables)
}

/// Unquoted word `keyword`, ignoring case
fn is_word(token: &Token, keyword: &str) -> bool {
    matches!(token, Token::Word(w) if w.quote_style.is_none() && w.value.eq_ignore_ascii_case(keyword))
}

fn is_whitespace(token: &Token) -> bool {
    matches!(token, Token::Whitespace(_))
}

/// Index of the first non-whitespace token at or after `from`
fn next_significant(tokens: &[Token], from: usize) -> Option<usize> {
    (from..tokens.len()).find(|&i| !is_whitespace(&tokens[i]))
}

fn last_significant(tokens: &[Token]) -> Option<&Token> {
    tokens.iter().rev().find(|t| !is_whitespace(t))
}

/// Split a token stream at `GO` lines (with an optional repeat count)
fn split_batches(tokens: Vec<Token>) -> Vec<Vec<Token>> {
    let mut batches: Vec<Vec<Token>> = vec![Vec::new()];
    let mut line_start = true;
    let mut after_go = false;

    for token in tokens {
        if !is_whitespace(&token) {
            let go_count = after_go && matches!(token, Token::Number(..));
            after_go = false;
            if go_count {
                continue;
            }
        }

        if line_start && is_word(&token, "GO") {
            batches.push(Vec::new());
            line_start = false;
            after_go = true;
            continue;
        }

        match &token {
            Token::Whitespace(Whitespace::Newline)
            | Token::Whitespace(Whitespace::SingleLineComment { .. }) => line_start = true,
            Token::Whitespace(_) => {}
            _ => line_start = false,
        }

        if let Some(batch) = batches.last_mut() {
            batch.push(token);
        }
    }

    batches
}

/// Whether the batch contains `CREATE TABLE`
fn creates_table(tokens: &[Token]) -> bool {
    let significant: Vec<&Token> = tokens.iter().filter(|t| !is_whitespace(t)).collect();
    significant
        .windows(2)
        .any(|pair| is_word(pair[0], "CREATE") && is_word(pair[1], "TABLE"))
}

/// Index of the `)` matching the `(` at `open`
fn closing_paren(tokens: &[Token], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate().skip(open) {
        match token {
            Token::LParen => depth += 1,
            Token::RParen => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Drop filegroup placement and index options following a closing parenthesis.
///
/// `ON DELETE` / `ON UPDATE` of a foreign key are kept.
fn strip_storage_clauses(tokens: Vec<Token>) -> Vec<Token> {
    let mut kept: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut i = 0;

    while i < tokens.len() {
        let token = &tokens[i];
        let after_paren = matches!(last_significant(&kept), Some(Token::RParen));
        let next = next_significant(&tokens, i + 1);

        let placement = is_word(token, "TEXTIMAGE_ON")
            || is_word(token, "FILESTREAM_ON")
            || (after_paren
                && is_word(token, "ON")
                && next.is_some_and(|n| {
                    matches!(tokens[n], Token::Word(_))
                        && !is_word(&tokens[n], "DELETE")
                        && !is_word(&tokens[n], "UPDATE")
                }));
        if placement {
            i = next.map_or(tokens.len(), |n| n + 1);
            continue;
        }

        if after_paren && is_word(token, "WITH") {
            if let Some(open) = next.filter(|&n| tokens[n] == Token::LParen) {
                i = closing_paren(&tokens, open).map_or(tokens.len(), |close| close + 1);
                continue;
            }
        }

        kept.push(token.clone());
        i += 1;
    }

    kept
}

/// Extract a table schema from a CREATE TABLE statement
fn extract_table_schema(create: &sqlparser::ast::CreateTable) -> TableSchema {
    let name = extract_table_name(&create.name);

    let mut columns: Vec<ColumnMetadata> = create
        .columns
        .iter()
        .zip(1u32..)
        .map(|(col_def, ordinal)| extract_column_metadata(col_def, ordinal))
        .collect();

    // Table-level PRIMARY KEY (col, ...) flags each listed column
    for constraint in &create.constraints {
        if let TableConstraint::PrimaryKey(PrimaryKeyConstraint {
            columns: pk_cols, ..
        }) = constraint
        {
            for pk_col in pk_cols {
                let col_name = extract_ident_from_index_column(pk_col);
                if let Some(col) = columns.iter_mut().find(|c| c.name == col_name) {
                    col.is_primary_key = true;
                    col.nullable = false;
                }
            }
        }
    }

    debug!("Parsed table {} with {} columns", name, columns.len());
    TableSchema::new(name, columns)
}

/// Extract column metadata from a column definition
fn extract_column_metadata(col_def: &sqlparser::ast::ColumnDef, ordinal: u32) -> ColumnMetadata {
    let mut nullable = true; // SQL Server default
    let mut is_primary_key = false;

    for option in &col_def.options {
        match &option.option {
            ColumnOption::NotNull => nullable = false,
            ColumnOption::Null => nullable = true,
            ColumnOption::PrimaryKey(_) => {
                is_primary_key = true;
                nullable = false;
            }
            _ => {}
        }
    }

    ColumnMetadata {
        name: extract_ident(&col_def.name),
        data_type: data_type_name(&col_def.data_type),
        nullable,
        is_primary_key,
        ordinal,
    }
}

/// Type name without bracket quoting: `[nvarchar](100)` reads as `nvarchar(100)`
fn data_type_name(data_type: &DataType) -> String {
    match data_type {
        DataType::Custom(name, modifiers) if modifiers.is_empty() => extract_table_name(name),
        DataType::Custom(name, modifiers) => {
            format!("{}({})", extract_table_name(name), modifiers.join(", "))
        }
        other => other.to_string(),
    }
}

/// Extract the bare name from a possibly schema-qualified ObjectName
fn extract_table_name(name: &ObjectName) -> String {
    name.0
        .last()
        .and_then(|part| part.as_ident())
        .map(|ident| ident.value.clone())
        .unwrap_or_default()
}

/// Extract a string from an Ident, without brackets or quotes
fn extract_ident(ident: &Ident) -> String {
    ident.value.clone()
}

/// Extract a column name string from an IndexColumn
fn extract_ident_from_index_column(ic: &IndexColumn) -> String {
    match &ic.column.expr {
        Expr::Identifier(ident) => ident.value.clone(),
        other => format!("{}", other),
    }
}

/// Schema provider backed by a `CREATE TABLE` script.
///
/// A script carries no database name, so the provider serves exactly one
/// database whose name is supplied by the caller.
#[derive(Debug, Clone)]
pub struct DdlSchemaProvider {
    database: String,
    tables: Vec<TableSchema>,
}

impl DdlSchemaProvider {
    /// Parse `sql` and serve its tables under `database`
    pub fn from_sql(database: impl Into<String>, sql: &str) -> Result<Self> {
        Ok(Self {
            database: database.into(),
            tables: parse_schema(sql)?,
        })
    }

    /// Read and parse a script from disk
    pub fn from_file(database: impl Into<String>, path: &Path) -> Result<Self> {
        let sql = std::fs::read_to_string(path)?;
        Self::from_sql(database, &sql)
    }

    fn check_database(&self, database: &str) -> Result<()> {
        if database == self.database {
            Ok(())
        } else {
            Err(CodegenError::schema_fetch(
                database,
                format!("unknown database (this script describes '{}')", self.database),
            ))
        }
    }
}

impl SchemaProvider for DdlSchemaProvider {
    fn list_databases(&self) -> Result<Vec<String>> {
        Ok(vec![self.database.clone()])
    }

    fn list_tables(&self, database: &str) -> Result<Vec<String>> {
        self.check_database(database)?;
        Ok(self.tables.iter().map(|t| t.name.clone()).collect())
    }

    fn get_columns(&self, database: &str, table: &str) -> Result<Vec<ColumnMetadata>> {
        self.check_database(database)?;
        self.tables
            .iter()
            .find(|t| t.name == table)
            .map(|t| t.columns.clone())
            .ok_or_else(|| CodegenError::schema_fetch(database, format!("table '{}' not found", table)))
    }
}
