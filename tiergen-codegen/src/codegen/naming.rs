//! Naming utilities for code generation

/// Derives an entity name from a table name.
///
/// Builders never singularize on their own; they only consume the
/// [`EntityIdentity`] built from this strategy, so a proper inflector can be
/// plugged in here without touching them.
pub trait NamingStrategy {
    fn entity_name(&self, table_name: &str) -> String;
}

/// Drops a single trailing lowercase `s` ("Students" -> "Student").
///
/// Not real singularization: "Status" becomes "Statu".
#[derive(Debug, Clone, Copy, Default)]
pub struct TrailingS;

impl NamingStrategy for TrailingS {
    fn entity_name(&self, table_name: &str) -> String {
        match table_name.strip_suffix('s') {
            Some(stem) if !stem.is_empty() => stem.to_string(),
            _ => table_name.to_string(),
        }
    }
}

/// Every name derived from one table, shared by both layer builders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityIdentity {
    pub table_name: String,
    pub entity_name: String,
    pub dal_class_name: String,
    pub bll_class_name: String,
}

impl EntityIdentity {
    /// Resolve all names for `table_name`
    pub fn resolve(table_name: &str, strategy: &dyn NamingStrategy, class_prefix: &str) -> Self {
        let entity_name = strategy.entity_name(table_name);
        Self {
            table_name: table_name.to_string(),
            dal_class_name: format!("{}{}Data", class_prefix, entity_name),
            bll_class_name: format!("{}{}", class_prefix, entity_name),
            entity_name,
        }
    }

    pub fn dal_file_name(&self, extension: &str) -> String {
        format!("{}.{}", self.dal_class_name, extension)
    }

    pub fn bll_file_name(&self, extension: &str) -> String {
        format!("{}.{}", self.bll_class_name, extension)
    }

    // Method names of the data-access surface. The business layer calls the
    // DAL through these, so both sides always agree.

    pub fn get_all_method(&self) -> String {
        format!("GetAll{}", self.table_name)
    }

    pub fn add_new_method(&self) -> String {
        format!("AddNew{}", self.entity_name)
    }

    pub fn get_by_id_method(&self) -> String {
        format!("Get{}ByID", self.entity_name)
    }

    pub fn update_method(&self) -> String {
        format!("Update{}", self.entity_name)
    }

    pub fn delete_method(&self) -> String {
        format!("Delete{}", self.entity_name)
    }

    pub fn exists_method(&self) -> String {
        format!("Is{}Exists", self.entity_name)
    }

    // Business-layer only

    pub fn find_method(&self) -> String {
        format!("Find{}", self.entity_name)
    }

    pub fn add_new_helper(&self) -> String {
        format!("_AddNew{}", self.entity_name)
    }

    pub fn update_helper(&self) -> String {
        format!("_Update{}", self.entity_name)
    }
}

/// Check if a name is a C# reserved keyword
pub fn is_csharp_keyword(name: &str) -> bool {
    matches!(
        name,
        "abstract"
            | "as"
            | "base"
            | "bool"
            | "break"
            | "byte"
            | "case"
            | "catch"
            | "char"
            | "checked"
            | "class"
            | "const"
            | "continue"
            | "decimal"
            | "default"
            | "delegate"
            | "do"
            | "double"
            | "else"
            | "enum"
            | "event"
            | "explicit"
            | "extern"
            | "false"
            | "finally"
            | "fixed"
            | "float"
            | "for"
            | "foreach"
            | "goto"
            | "if"
            | "implicit"
            | "in"
            | "int"
            | "interface"
            | "internal"
            | "is"
            | "lock"
            | "long"
            | "namespace"
            | "new"
            | "null"
            | "object"
            | "operator"
            | "out"
            | "override"
            | "params"
            | "private"
            | "protected"
            | "public"
            | "readonly"
            | "ref"
            | "return"
            | "sbyte"
            | "sealed"
            | "short"
            | "sizeof"
            | "stackalloc"
            | "static"
            | "string"
            | "struct"
            | "switch"
            | "this"
            | "throw"
            | "true"
            | "try"
            | "typeof"
            | "uint"
            | "ulong"
            | "unchecked"
            | "unsafe"
            | "ushort"
            | "using"
            | "virtual"
            | "void"
            | "volatile"
            | "while"
    )
}

/// Escape a column name for use as a C# identifier (`class` -> `@class`)
pub fn escape_identifier(name: &str) -> String {
    if is_csharp_keyword(name) {
        format!("@{}", name)
    } else {
        name.to_string()
    }
}

/// C# identifier for `name` that differs from every entry in `taken`.
///
/// `_` is appended until the name is free, then keywords are escaped.
/// C# identifiers are case-sensitive, so `taken` is compared exactly.
pub fn unique_identifier(name: &str, taken: &[&str]) -> String {
    let mut candidate = name.to_string();
    while taken.contains(&candidate.as_str()) {
        candidate.push('_');
    }
    escape_identifier(&candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_s() {
        assert_eq!(TrailingS.entity_name("Students"), "Student");
        assert_eq!(TrailingS.entity_name("People"), "People");
        assert_eq!(TrailingS.entity_name("Status"), "Statu");
        assert_eq!(TrailingS.entity_name("Address"), "Addres");
        // Uppercase S is left alone
        assert_eq!(TrailingS.entity_name("ORDERS"), "ORDERS");
    }

    #[test]
    fn test_trailing_s_never_empties_the_name() {
        assert_eq!(TrailingS.entity_name("s"), "s");
    }

    #[test]
    fn test_trailing_s_strips_once_and_is_idempotent_on_singulars() {
        assert_eq!(TrailingS.entity_name("Classess"), "Classes");
        for singular in ["Student", "Person", "AuditLog", "Category"] {
            let once = TrailingS.entity_name(singular);
            assert_eq!(once, singular);
            assert_eq!(TrailingS.entity_name(&once), once);
        }
    }

    #[test]
    fn test_entity_identity() {
        let identity = EntityIdentity::resolve("Students", &TrailingS, "cls");
        assert_eq!(identity.entity_name, "Student");
        assert_eq!(identity.dal_class_name, "clsStudentData");
        assert_eq!(identity.bll_class_name, "clsStudent");
        assert_eq!(identity.dal_file_name("cs"), "clsStudentData.cs");
        assert_eq!(identity.bll_file_name("cs"), "clsStudent.cs");
    }

    #[test]
    fn test_method_names() {
        let identity = EntityIdentity::resolve("Students", &TrailingS, "cls");
        assert_eq!(identity.get_all_method(), "GetAllStudents");
        assert_eq!(identity.add_new_method(), "AddNewStudent");
        assert_eq!(identity.get_by_id_method(), "GetStudentByID");
        assert_eq!(identity.update_method(), "UpdateStudent");
        assert_eq!(identity.delete_method(), "DeleteStudent");
        assert_eq!(identity.exists_method(), "IsStudentExists");
        assert_eq!(identity.find_method(), "FindStudent");
    }

    #[test]
    fn test_custom_strategy() {
        struct Verbatim;
        impl NamingStrategy for Verbatim {
            fn entity_name(&self, table_name: &str) -> String {
                table_name.to_string()
            }
        }

        let identity = EntityIdentity::resolve("Status", &Verbatim, "cls");
        assert_eq!(identity.bll_class_name, "clsStatus");
    }

    #[test]
    fn test_unique_identifier() {
        assert_eq!(unique_identifier("Name", &["query", "cmd"]), "Name");
        assert_eq!(unique_identifier("query", &["query", "cmd"]), "query_");
        assert_eq!(unique_identifier("query", &["query", "query_"]), "query__");
        assert_eq!(unique_identifier("Query", &["query"]), "Query");
        assert_eq!(unique_identifier("class", &["query"]), "@class");
    }

    #[test]
    fn test_escape_identifier() {
        assert_eq!(escape_identifier("class"), "@class");
        assert_eq!(escape_identifier("event"), "@event");
        assert_eq!(escape_identifier("Name"), "Name");
        // C# keywords are case-sensitive
        assert_eq!(escape_identifier("Class"), "Class");
    }
}
