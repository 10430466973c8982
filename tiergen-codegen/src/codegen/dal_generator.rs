//! DAL generator - builds the ADO.NET data-access class for one table

use tracing::debug;

use crate::schema::ColumnMetadata;

use super::code_generator::EmitOptions;
use super::key_resolver::ResolvedTable;
use super::naming::unique_identifier;
use super::template::{ClassTemplate, CodeBlock, Member, MethodTemplate, Param, SourceFile};
use super::type_resolver::TypeResolver;

/// Names the generated method bodies declare or refer to; parameters must not shadow them
const BODY_NAMES: &[&str] = &[
    "dt",
    "query",
    "connection",
    "cmd",
    "reader",
    "result",
    "insertedID",
    "newID",
    "isFound",
    "rowsAffected",
    "DataTable",
    "SqlConnection",
    "SqlCommand",
    "SqlDataReader",
    "DBNull",
];

/// Build the data-access class for `table` in `namespace`
pub fn build_dal(table: &ResolvedTable, namespace: &str, options: &EmitOptions) -> SourceFile {
    let identity = &table.identity;
    debug!(
        "Building DAL {} for {} (key: {})",
        identity.dal_class_name,
        identity.table_name,
        table.key.describe()
    );

    let builder = DalBuilder { table, options };
    let mut class = ClassTemplate::new(&identity.dal_class_name);

    class.push(Member::Method(builder.get_all()));

    if let Some(key) = table.key.usable() {
        class.push(Member::Method(builder.add_new(key)));
        class.push(Member::Method(builder.get_by_id(key)));
        class.push(Member::Method(builder.update(key)));
        class.push(Member::Method(builder.delete(key)));
        class.push(Member::Method(builder.exists(key)));
    }

    SourceFile::new(namespace, class)
        .using("System")
        .using("System.Data")
        .using("System.Data.SqlClient")
}

struct DalBuilder<'a> {
    table: &'a ResolvedTable,
    options: &'a EmitOptions,
}

impl DalBuilder<'_> {
    fn table_name(&self) -> &str {
        &self.table.identity.table_name
    }

    /// Parameter identifier for `column`, clear of the body's own names and of the other columns
    fn ident(&self, column: &ColumnMetadata) -> String {
        let mut taken: Vec<&str> = BODY_NAMES.to_vec();
        taken.extend(
            self.table
                .schema
                .columns
                .iter()
                .filter(|c| c.name != column.name)
                .map(|c| c.name.as_str()),
        );
        unique_identifier(&column.name, &taken)
    }

    fn value_param(&self, column: &ColumnMetadata) -> Param {
        Param::value(self.ident(column), TypeResolver::resolve(column).to_type_string())
    }

    /// `AddWithValue` for one column; nullable columns bind `DBNull.Value` when absent
    fn bind(&self, column: &ColumnMetadata) -> String {
        let ident = self.ident(column);
        let value = if column.nullable {
            format!("{} ?? (object)DBNull.Value", ident)
        } else {
            ident
        };
        format!("cmd.Parameters.AddWithValue(\"@{}\", {});", column.name, value)
    }

    /// Copy one reader field into its `ref` slot
    fn read_column(&self, column: &ColumnMetadata) -> String {
        let ident = self.ident(column);
        let ty = TypeResolver::resolve(column).to_type_string();
        if column.nullable {
            format!(
                "{} = reader[\"{}\"] == DBNull.Value ? null : ({})reader[\"{}\"];",
                ident, column.name, ty, column.name
            )
        } else {
            format!("{} = ({})reader[\"{}\"];", ident, ty, column.name)
        }
    }

    fn open_command(&self, body: &mut CodeBlock) {
        body.open(format!(
            "using (SqlConnection connection = new SqlConnection({}))",
            self.options.connection_accessor
        ));
        body.open("using (SqlCommand cmd = new SqlCommand(query, connection))");
    }

    fn close_command(&self, body: &mut CodeBlock) {
        body.close();
        body.close();
    }

    fn get_all(&self) -> MethodTemplate {
        let mut body = CodeBlock::new();
        body.line("DataTable dt = new DataTable();")
            .blank()
            .line(format!("string query = \"SELECT * FROM {}\";", self.table_name()))
            .blank();
        self.open_command(&mut body);
        body.line("connection.Open();")
            .blank()
            .line("SqlDataReader reader = cmd.ExecuteReader();")
            .blank()
            .line("if (reader.HasRows)")
            .nested("dt.Load(reader);")
            .blank()
            .line("reader.Close();");
        self.close_command(&mut body);
        body.blank().line("return dt;");

        MethodTemplate::public_static("DataTable", self.table.identity.get_all_method()).body(body)
    }

    fn add_new(&self, key: &ColumnMetadata) -> MethodTemplate {
        let columns = self.table.non_key_columns();
        let key_type = TypeResolver::resolve(key);
        let id_type = key_type.inner_type().to_type_string();

        let query = if columns.is_empty() {
            format!(
                "INSERT INTO {} DEFAULT VALUES; SELECT SCOPE_IDENTITY();",
                self.table_name()
            )
        } else {
            let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
            let placeholders: Vec<String> = columns.iter().map(|c| format!("@{}", c.name)).collect();
            format!(
                "INSERT INTO {} ({}) VALUES ({}); SELECT SCOPE_IDENTITY();",
                self.table_name(),
                names.join(", "),
                placeholders.join(", ")
            )
        };

        let mut body = CodeBlock::new();
        body.line(format!("{} insertedID = {};", id_type, key_type.sentinel()))
            .blank()
            .line(format!("string query = \"{}\";", query))
            .blank();
        self.open_command(&mut body);
        for column in &columns {
            body.line(self.bind(column));
        }
        if !columns.is_empty() {
            body.blank();
        }
        body.line("connection.Open();")
            .blank()
            .line("object result = cmd.ExecuteScalar();")
            .blank();
        if key_type.is_text() {
            body.line("if (result != null && result != DBNull.Value)")
                .nested("insertedID = result.ToString();");
        } else {
            body.line(format!(
                "if (result != null && result != DBNull.Value && {}.TryParse(result.ToString(), out {} newID))",
                id_type, id_type
            ))
            .nested("insertedID = newID;");
        }
        self.close_command(&mut body);
        body.blank().line("return insertedID;");

        MethodTemplate::public_static(id_type, self.table.identity.add_new_method())
            .params(columns.iter().map(|c| self.value_param(c)))
            .body(body)
    }

    fn get_by_id(&self, key: &ColumnMetadata) -> MethodTemplate {
        let columns = self.table.non_key_columns();

        let mut body = CodeBlock::new();
        body.line("bool isFound = false;")
            .blank()
            .line(format!(
                "string query = \"SELECT * FROM {} WHERE {} = @{}\";",
                self.table_name(),
                key.name,
                key.name
            ))
            .blank();
        self.open_command(&mut body);
        body.line(self.bind(key))
            .blank()
            .line("connection.Open();")
            .blank()
            .line("SqlDataReader reader = cmd.ExecuteReader();")
            .blank()
            .open("if (reader.Read())")
            .line("isFound = true;");
        if !columns.is_empty() {
            body.blank();
        }
        for column in &columns {
            body.line(self.read_column(column));
        }
        body.close().blank().line("reader.Close();");
        self.close_command(&mut body);
        body.blank().line("return isFound;");

        MethodTemplate::public_static("bool", self.table.identity.get_by_id_method())
            .param(self.value_param(key))
            .params(columns.iter().map(|c| {
                Param::by_ref(self.ident(c), TypeResolver::resolve(c).to_type_string())
            }))
            .body(body)
    }

    fn update(&self, key: &ColumnMetadata) -> MethodTemplate {
        let columns = self.table.non_key_columns();

        let assignments: Vec<String> = if columns.is_empty() {
            vec![format!("{} = @{}", key.name, key.name)]
        } else {
            columns
                .iter()
                .map(|c| format!("{} = @{}", c.name, c.name))
                .collect()
        };

        let mut body = CodeBlock::new();
        body.line("int rowsAffected = 0;")
            .blank()
            .line(format!(
                "string query = \"UPDATE {} SET {} WHERE {} = @{}\";",
                self.table_name(),
                assignments.join(", "),
                key.name,
                key.name
            ))
            .blank();
        self.open_command(&mut body);
        body.line(self.bind(key));
        for column in &columns {
            body.line(self.bind(column));
        }
        body.blank()
            .line("connection.Open();")
            .blank()
            .line("rowsAffected = cmd.ExecuteNonQuery();");
        self.close_command(&mut body);
        body.blank().line("return (rowsAffected > 0);");

        MethodTemplate::public_static("bool", self.table.identity.update_method())
            .param(self.value_param(key))
            .params(columns.iter().map(|c| self.value_param(c)))
            .body(body)
    }

    fn delete(&self, key: &ColumnMetadata) -> MethodTemplate {
        let mut body = CodeBlock::new();
        body.line("int rowsAffected = 0;")
            .blank()
            .line(format!(
                "string query = \"DELETE FROM {} WHERE {} = @{}\";",
                self.table_name(),
                key.name,
                key.name
            ))
            .blank();
        self.open_command(&mut body);
        body.line(self.bind(key))
            .blank()
            .line("connection.Open();")
            .blank()
            .line("rowsAffected = cmd.ExecuteNonQuery();");
        self.close_command(&mut body);
        body.blank().line("return (rowsAffected > 0);");

        MethodTemplate::public_static("bool", self.table.identity.delete_method())
            .param(self.value_param(key))
            .body(body)
    }

    fn exists(&self, key: &ColumnMetadata) -> MethodTemplate {
        let mut body = CodeBlock::new();
        body.line("bool isFound = false;")
            .blank()
            .line(format!(
                "string query = \"SELECT 1 FROM {} WHERE {} = @{}\";",
                self.table_name(),
                key.name,
                key.name
            ))
            .blank();
        self.open_command(&mut body);
        body.line(self.bind(key))
            .blank()
            .line("connection.Open();")
            .blank()
            .line("SqlDataReader reader = cmd.ExecuteReader();")
            .blank()
            .line("isFound = reader.HasRows;")
            .blank()
            .line("reader.Close();");
        self.close_command(&mut body);
        body.blank().line("return isFound;");

        MethodTemplate::public_static("bool", self.table.identity.exists_method())
            .param(self.value_param(key))
            .body(body)
    }
}
