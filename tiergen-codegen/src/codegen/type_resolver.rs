//! SQL Server to C# type mapping

use crate::schema::ColumnMetadata;

/// Represents a C# type for code generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CsType {
    Short,
    Int,
    Long,
    Bool,
    Decimal,
    Double,
    DateTime,
    String,
    /// `T?` wrapper for nullable value types
    Nullable(Box<CsType>),
}

impl CsType {
    /// Get the type string for code generation
    pub fn to_type_string(&self) -> String {
        match self {
            CsType::Short => "short".to_string(),
            CsType::Int => "int".to_string(),
            CsType::Long => "long".to_string(),
            CsType::Bool => "bool".to_string(),
            CsType::Decimal => "decimal".to_string(),
            CsType::Double => "double".to_string(),
            CsType::DateTime => "DateTime".to_string(),
            CsType::String => "string".to_string(),
            CsType::Nullable(inner) => format!("{}?", inner.to_type_string()),
        }
    }

    /// Text already admits null in C#, so it is never wrapped
    pub fn is_text(&self) -> bool {
        matches!(self.inner_type(), CsType::String)
    }

    /// Get the inner type if this is a `T?`
    pub fn inner_type(&self) -> &CsType {
        match self {
            CsType::Nullable(inner) => inner,
            _ => self,
        }
    }

    /// Value marking a key that the database has not assigned yet
    pub fn sentinel(&self) -> &'static str {
        match self.inner_type() {
            CsType::String => "null",
            CsType::DateTime => "DateTime.MinValue",
            CsType::Bool => "false",
            _ => "-1",
        }
    }

    /// Natural zero of a non-nullable field in a freshly created entity
    pub fn zero_value(&self) -> &'static str {
        match self {
            CsType::Nullable(_) => "null",
            CsType::String => "string.Empty",
            CsType::DateTime => "DateTime.Now",
            CsType::Bool => "false",
            _ => "0",
        }
    }
}

/// Outcome of mapping one source type name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMapping {
    /// Mapped type before nullability is applied
    pub cs_type: CsType,
    /// False when the source type fell through to the text default
    pub recognized: bool,
}

/// Character types that map to `string` on purpose
const TEXT_FAMILY: &[&str] = &["char", "varchar", "nchar", "nvarchar", "text", "ntext"];

/// Resolve SQL Server data types to C# types
pub struct TypeResolver;

impl TypeResolver {
    /// Get the declared C# type for a column.
    ///
    /// This is the only place nullability is applied: a nullable column is
    /// wrapped as `T?` unless its type is text.
    pub fn resolve(column: &ColumnMetadata) -> CsType {
        let base_type = Self::map(&column.data_type).cs_type;

        if column.nullable && !base_type.is_text() {
            CsType::Nullable(Box::new(base_type))
        } else {
            base_type
        }
    }

    /// Map a source type name, ignoring nullability. Total: unknown types become `string`.
    pub fn map(source_type: &str) -> TypeMapping {
        let normalized = Self::normalize(source_type);

        let cs_type = match normalized.as_str() {
            "int" => CsType::Int,
            "bigint" => CsType::Long,
            "smallint" => CsType::Short,
            "bit" => CsType::Bool,
            "decimal" | "numeric" | "money" | "smallmoney" => CsType::Decimal,
            "datetime" | "smalldatetime" | "date" => CsType::DateTime,
            "float" => CsType::Double,
            other => {
                return TypeMapping {
                    cs_type: CsType::String,
                    recognized: TEXT_FAMILY.contains(&other),
                }
            }
        };

        TypeMapping {
            cs_type,
            recognized: true,
        }
    }

    /// Lower-case the type name and drop any `(length)` / `(precision, scale)` suffix
    pub fn normalize(source_type: &str) -> String {
        let base = match source_type.find('(') {
            Some(idx) => &source_type[..idx],
            None => source_type,
        };
        base.trim().to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_column(name: &str, data_type: &str, nullable: bool) -> ColumnMetadata {
        ColumnMetadata {
            name: name.to_string(),
            data_type: data_type.to_string(),
            nullable,
            is_primary_key: false,
            ordinal: 1,
        }
    }

    #[test]
    fn test_reference_table() {
        let cases = [
            ("int", CsType::Int),
            ("bigint", CsType::Long),
            ("smallint", CsType::Short),
            ("bit", CsType::Bool),
            ("decimal", CsType::Decimal),
            ("numeric", CsType::Decimal),
            ("money", CsType::Decimal),
            ("smallmoney", CsType::Decimal),
            ("datetime", CsType::DateTime),
            ("smalldatetime", CsType::DateTime),
            ("date", CsType::DateTime),
            ("float", CsType::Double),
            ("nvarchar", CsType::String),
        ];
        for (source, expected) in cases {
            let mapping = TypeResolver::map(source);
            assert_eq!(mapping.cs_type, expected, "source type {}", source);
            assert!(mapping.recognized, "source type {}", source);
        }
    }

    #[test]
    fn test_ddl_spellings_are_normalized() {
        assert_eq!(TypeResolver::map("INT").cs_type, CsType::Int);
        assert_eq!(TypeResolver::map("DECIMAL(3,2)").cs_type, CsType::Decimal);
        assert_eq!(TypeResolver::map("NVARCHAR(100)").cs_type, CsType::String);
        assert_eq!(TypeResolver::normalize(" VarChar (MAX)"), "varchar");
    }

    #[test]
    fn test_unknown_types_fall_back_to_text() {
        let mapping = TypeResolver::map("uniqueidentifier");
        assert_eq!(mapping.cs_type, CsType::String);
        assert!(!mapping.recognized);

        // datetime2 is not part of the datetime family
        assert!(!TypeResolver::map("datetime2").recognized);
    }

    #[test]
    fn test_nullable_wraps_value_types_only() {
        let col = make_column("GPA", "decimal", true);
        assert_eq!(
            TypeResolver::resolve(&col),
            CsType::Nullable(Box::new(CsType::Decimal))
        );
        assert_eq!(TypeResolver::resolve(&col).to_type_string(), "decimal?");

        let col = make_column("Email", "nvarchar", true);
        assert_eq!(TypeResolver::resolve(&col), CsType::String);

        let col = make_column("Token", "uniqueidentifier", true);
        assert_eq!(TypeResolver::resolve(&col).to_type_string(), "string");
    }

    #[test]
    fn test_nullable_differs_by_exactly_the_wrapper() {
        for source in ["int", "bigint", "smallint", "bit", "money", "date", "float"] {
            let plain = TypeResolver::resolve(&make_column("c", source, false)).to_type_string();
            let nullable = TypeResolver::resolve(&make_column("c", source, true)).to_type_string();
            assert_eq!(nullable, format!("{}?", plain));
        }
        for source in ["nvarchar", "text", "xml"] {
            let plain = TypeResolver::resolve(&make_column("c", source, false));
            let nullable = TypeResolver::resolve(&make_column("c", source, true));
            assert_eq!(plain, nullable);
        }
    }

    #[test]
    fn test_sentinel_and_zero_values() {
        assert_eq!(CsType::Int.sentinel(), "-1");
        assert_eq!(CsType::Nullable(Box::new(CsType::Long)).sentinel(), "-1");
        assert_eq!(CsType::String.sentinel(), "null");

        assert_eq!(CsType::String.zero_value(), "string.Empty");
        assert_eq!(CsType::DateTime.zero_value(), "DateTime.Now");
        assert_eq!(CsType::Bool.zero_value(), "false");
        assert_eq!(CsType::Decimal.zero_value(), "0");
        assert_eq!(CsType::Nullable(Box::new(CsType::Int)).zero_value(), "null");
    }
}
