//! BLL generator - builds the business-logic class for one table
//!
//! Every persistence call goes through the DAL method names on
//! [`EntityIdentity`](super::naming::EntityIdentity), so the two layers agree
//! by construction.

use tracing::debug;

use crate::schema::ColumnMetadata;

use super::key_resolver::ResolvedTable;
use super::naming::{escape_identifier, unique_identifier};
use super::template::{
    ClassTemplate, CodeBlock, Member, MethodTemplate, Param, SourceFile, Visibility,
};
use super::type_resolver::TypeResolver;

/// Build the business-logic class for `table` in `namespace`, importing `dal_namespace`
pub fn build_bll(table: &ResolvedTable, namespace: &str, dal_namespace: &str) -> SourceFile {
    let identity = &table.identity;
    debug!("Building BLL {} for {}", identity.bll_class_name, identity.table_name);

    let mut class = ClassTemplate::new(&identity.bll_class_name);

    if let Some(key) = table.key.usable() {
        let builder = BllBuilder::new(table, key);

        class.push(Member::Enum {
            name: builder.mode_enum.clone(),
            variants: vec![("AddNew".to_string(), 0), ("Update".to_string(), 1)],
        });
        class.push(Member::property(&builder.mode_property, &builder.mode_enum));
        for column in &table.schema.columns {
            class.push(Member::property(
                escape_identifier(&column.name),
                TypeResolver::resolve(column).to_type_string(),
            ));
        }

        class.push(Member::Constructor(builder.add_new_constructor()));
        class.push(Member::Constructor(builder.update_constructor()));
        class.push(Member::Method(builder.find()));
        class.push(Member::Method(builder.save()));
        class.push(Member::Method(builder.add_new_helper()));
        class.push(Member::Method(builder.update_helper()));
        class.push(Member::Method(builder.delete()));
        class.push(Member::Method(builder.exists()));
    }

    class.push(Member::Method(get_all(table)));

    SourceFile::new(namespace, class)
        .using("System")
        .using("System.Data")
        .using(dal_namespace)
}

fn get_all(table: &ResolvedTable) -> MethodTemplate {
    let identity = &table.identity;
    let mut body = CodeBlock::new();
    body.line(format!(
        "return {}.{}();",
        identity.dal_class_name,
        identity.get_all_method()
    ));
    MethodTemplate::public_static("DataTable", identity.get_all_method()).body(body)
}

struct BllBuilder<'a> {
    table: &'a ResolvedTable,
    key: &'a ColumnMetadata,
    /// `enMode`, or a suffixed name when a column already uses it
    mode_enum: String,
    /// `Mode`, or a suffixed name when a column already uses it
    mode_property: String,
}

impl<'a> BllBuilder<'a> {
    fn new(table: &'a ResolvedTable, key: &'a ColumnMetadata) -> Self {
        let columns: Vec<&str> = table.schema.columns.iter().map(|c| c.name.as_str()).collect();
        Self {
            table,
            key,
            mode_enum: unique_identifier("enMode", &columns),
            mode_property: unique_identifier("Mode", &columns),
        }
    }

    /// `Mode = enMode.<state>`
    fn set_mode(&self, state: &str) -> String {
        format!("{} = {}.{};", self.mode_property, self.mode_enum, state)
    }

    fn dal(&self) -> &str {
        &self.table.identity.dal_class_name
    }

    fn key_ident(&self) -> String {
        escape_identifier(&self.key.name)
    }

    fn key_param(&self) -> Param {
        param(self.key)
    }

    fn key_sentinel(&self) -> &'static str {
        TypeResolver::resolve(self.key).sentinel()
    }

    /// Non-key columns joined as `this.A, this.B`
    fn this_fields(&self) -> Vec<String> {
        self.table
            .non_key_columns()
            .iter()
            .map(|c| format!("this.{}", escape_identifier(&c.name)))
            .collect()
    }

    fn add_new_constructor(&self) -> MethodTemplate {
        let mut body = CodeBlock::new();
        for column in &self.table.schema.columns {
            let value = if column.name == self.key.name {
                self.key_sentinel()
            } else if column.nullable {
                "null"
            } else {
                TypeResolver::resolve(column).zero_value()
            };
            body.line(format!("this.{} = {};", escape_identifier(&column.name), value));
        }
        body.blank().line(self.set_mode("AddNew"));

        MethodTemplate::constructor(Visibility::Public, &self.table.identity.bll_class_name)
            .body(body)
    }

    fn update_constructor(&self) -> MethodTemplate {
        let columns = self.table.key_first_columns();

        let mut body = CodeBlock::new();
        for column in &columns {
            let ident = escape_identifier(&column.name);
            body.line(format!("this.{} = {};", ident, ident));
        }
        body.blank().line(self.set_mode("Update"));

        MethodTemplate::constructor(Visibility::Private, &self.table.identity.bll_class_name)
            .params(columns.iter().map(|c| param(c)))
            .body(body)
    }

    fn find(&self) -> MethodTemplate {
        let identity = &self.table.identity;
        let columns = self.table.non_key_columns();

        let mut body = CodeBlock::new();
        for column in &columns {
            body.line(format!(
                "{} {} = default;",
                TypeResolver::resolve(column).to_type_string(),
                escape_identifier(&column.name)
            ));
        }
        if !columns.is_empty() {
            body.blank();
        }

        let mut lookup_args = vec![self.key_ident()];
        lookup_args.extend(
            columns
                .iter()
                .map(|c| format!("ref {}", escape_identifier(&c.name))),
        );
        let ctor_args: Vec<String> = self
            .table
            .key_first_columns()
            .iter()
            .map(|c| escape_identifier(&c.name))
            .collect();

        body.line(format!(
            "if ({}.{}({}))",
            self.dal(),
            identity.get_by_id_method(),
            lookup_args.join(", ")
        ))
        .nested(format!(
            "return new {}({});",
            identity.bll_class_name,
            ctor_args.join(", ")
        ))
        .blank()
        .line("return null;");

        MethodTemplate::public_static(&identity.bll_class_name, identity.find_method())
            .param(self.key_param())
            .body(body)
    }

    fn save(&self) -> MethodTemplate {
        let identity = &self.table.identity;

        let mut body = CodeBlock::new();
        body.open(format!("if ({} == {}.AddNew)", self.mode_property, self.mode_enum))
            .open(format!("if ({}())", identity.add_new_helper()))
            .line(self.set_mode("Update"))
            .blank()
            .line("return true;")
            .close()
            .blank()
            .line("return false;")
            .close()
            .blank()
            .line(format!("return {}();", identity.update_helper()));

        MethodTemplate::new(Visibility::Public, "bool", "Save").body(body)
    }

    fn add_new_helper(&self) -> MethodTemplate {
        let identity = &self.table.identity;
        let key = self.key_ident();

        let mut body = CodeBlock::new();
        body.line(format!(
            "this.{} = {}.{}({});",
            key,
            self.dal(),
            identity.add_new_method(),
            self.this_fields().join(", ")
        ))
        .blank()
        .line(format!("return (this.{} != {});", key, self.key_sentinel()));

        MethodTemplate::new(Visibility::Private, "bool", identity.add_new_helper()).body(body)
    }

    fn update_helper(&self) -> MethodTemplate {
        let identity = &self.table.identity;

        let mut args = vec![format!("this.{}", self.key_ident())];
        args.extend(self.this_fields());

        let mut body = CodeBlock::new();
        body.line(format!(
            "return {}.{}({});",
            self.dal(),
            identity.update_method(),
            args.join(", ")
        ));

        MethodTemplate::new(Visibility::Private, "bool", identity.update_helper()).body(body)
    }

    fn delete(&self) -> MethodTemplate {
        self.key_passthrough(self.table.identity.delete_method())
    }

    fn exists(&self) -> MethodTemplate {
        self.key_passthrough(self.table.identity.exists_method())
    }

    /// `public static bool X(key) => Data.X(key)`
    fn key_passthrough(&self, method: String) -> MethodTemplate {
        let mut body = CodeBlock::new();
        body.line(format!("return {}.{}({});", self.dal(), method, self.key_ident()));
        MethodTemplate::public_static("bool", method)
            .param(self.key_param())
            .body(body)
    }
}

fn param(column: &ColumnMetadata) -> Param {
    Param::value(
        escape_identifier(&column.name),
        TypeResolver::resolve(column).to_type_string(),
    )
}
