//! Structured form of a generated C# source file
//!
//! Builders describe a class as a [`SourceFile`] and only [`SourceFile::render`]
//! turns it into text, so tests can check signatures and member sets without
//! scraping strings.

use std::fmt;

const INDENT: &str = "    ";

/// One `.cs` file: usings, a namespace and a single class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub usings: Vec<String>,
    pub namespace: String,
    pub class: ClassTemplate,
}

impl SourceFile {
    pub fn new(namespace: impl Into<String>, class: ClassTemplate) -> Self {
        Self {
            usings: Vec::new(),
            namespace: namespace.into(),
            class,
        }
    }

    pub fn using(mut self, namespace: impl Into<String>) -> Self {
        self.usings.push(namespace.into());
        self
    }

    /// Render to source text
    pub fn render(&self) -> String {
        let mut out = String::new();
        for using in &self.usings {
            out.push_str(&format!("using {};\n", using));
        }
        if !self.usings.is_empty() {
            out.push('\n');
        }
        out.push_str(&format!("namespace {}\n{{\n", self.namespace));
        self.class.render_into(&mut out, 1);
        out.push_str("}\n");
        out
    }
}

/// A public class and its members in emission order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassTemplate {
    pub name: String,
    pub members: Vec<Member>,
}

impl ClassTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    pub fn push(&mut self, member: Member) {
        self.members.push(member);
    }

    /// Look up a method (not a constructor) by name
    pub fn method(&self, name: &str) -> Option<&MethodTemplate> {
        self.members.iter().find_map(|m| match m {
            Member::Method(method) if method.name == name => Some(method),
            _ => None,
        })
    }

    /// Method names in emission order
    pub fn method_names(&self) -> Vec<&str> {
        self.members
            .iter()
            .filter_map(|m| match m {
                Member::Method(method) => Some(method.name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// `(name, type)` of each property in emission order
    pub fn properties(&self) -> Vec<(&str, &str)> {
        self.members
            .iter()
            .filter_map(|m| match m {
                Member::Property { name, ty } => Some((name.as_str(), ty.as_str())),
                _ => None,
            })
            .collect()
    }

    pub fn constructors(&self) -> Vec<&MethodTemplate> {
        self.members
            .iter()
            .filter_map(|m| match m {
                Member::Constructor(ctor) => Some(ctor),
                _ => None,
            })
            .collect()
    }

    fn render_into(&self, out: &mut String, depth: usize) {
        let pad = INDENT.repeat(depth);
        out.push_str(&format!("{}public class {}\n{}{{\n", pad, self.name, pad));

        let mut previous: Option<&Member> = None;
        for member in &self.members {
            if let Some(prev) = previous {
                let grouped = matches!(
                    (prev, member),
                    (Member::Property { .. }, Member::Property { .. })
                        | (Member::Enum { .. }, Member::Property { .. })
                );
                if !grouped {
                    out.push('\n');
                }
            }
            member.render_into(out, depth + 1);
            previous = Some(member);
        }

        out.push_str(&format!("{}}}\n", pad));
    }
}

/// A class member
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Member {
    /// `public enum Name { A = 0, B = 1 };`
    Enum {
        name: String,
        variants: Vec<(String, i32)>,
    },
    /// `public Type Name { get; set; }`
    Property { name: String, ty: String },
    Constructor(MethodTemplate),
    Method(MethodTemplate),
}

impl Member {
    pub fn property(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Member::Property {
            name: name.into(),
            ty: ty.into(),
        }
    }

    fn render_into(&self, out: &mut String, depth: usize) {
        let pad = INDENT.repeat(depth);
        match self {
            Member::Enum { name, variants } => {
                let body: Vec<String> = variants
                    .iter()
                    .map(|(variant, value)| format!("{} = {}", variant, value))
                    .collect();
                out.push_str(&format!(
                    "{}public enum {} {{ {} }};\n",
                    pad,
                    name,
                    body.join(", ")
                ));
            }
            Member::Property { name, ty } => {
                out.push_str(&format!("{}public {} {} {{ get; set; }}\n", pad, ty, name));
            }
            Member::Constructor(method) | Member::Method(method) => method.render_into(out, depth),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Private => write!(f, "private"),
        }
    }
}

/// How an argument is passed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamMode {
    Value,
    /// Caller-allocated slot the method fills
    Ref,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub ty: String,
    pub mode: ParamMode,
}

impl Param {
    pub fn value(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            mode: ParamMode::Value,
        }
    }

    pub fn by_ref(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            mode: ParamMode::Ref,
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            ParamMode::Value => write!(f, "{} {}", self.ty, self.name),
            ParamMode::Ref => write!(f, "ref {} {}", self.ty, self.name),
        }
    }
}

/// A method or constructor. Constructors have no return type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodTemplate {
    pub visibility: Visibility,
    pub is_static: bool,
    pub return_type: Option<String>,
    pub name: String,
    pub params: Vec<Param>,
    pub body: CodeBlock,
}

impl MethodTemplate {
    pub fn new(visibility: Visibility, return_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            visibility,
            is_static: false,
            return_type: Some(return_type.into()),
            name: name.into(),
            params: Vec::new(),
            body: CodeBlock::new(),
        }
    }

    pub fn public_static(return_type: impl Into<String>, name: impl Into<String>) -> Self {
        let mut method = Self::new(Visibility::Public, return_type, name);
        method.is_static = true;
        method
    }

    pub fn constructor(visibility: Visibility, class_name: impl Into<String>) -> Self {
        Self {
            visibility,
            is_static: false,
            return_type: None,
            name: class_name.into(),
            params: Vec::new(),
            body: CodeBlock::new(),
        }
    }

    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    pub fn params(mut self, params: impl IntoIterator<Item = Param>) -> Self {
        self.params.extend(params);
        self
    }

    pub fn body(mut self, body: CodeBlock) -> Self {
        self.body = body;
        self
    }

    pub fn param_names(&self) -> Vec<&str> {
        self.params.iter().map(|p| p.name.as_str()).collect()
    }

    /// Declaration line without the body
    pub fn signature(&self) -> String {
        let mut sig = self.visibility.to_string();
        if self.is_static {
            sig.push_str(" static");
        }
        if let Some(ret) = &self.return_type {
            sig.push(' ');
            sig.push_str(ret);
        }
        let params: Vec<String> = self.params.iter().map(Param::to_string).collect();
        sig.push_str(&format!(" {}({})", self.name, params.join(", ")));
        sig
    }

    fn render_into(&self, out: &mut String, depth: usize) {
        let pad = INDENT.repeat(depth);
        out.push_str(&format!("{}{}\n{}{{\n", pad, self.signature(), pad));
        self.body.render_into(out, depth + 1);
        out.push_str(&format!("{}}}\n", pad));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
    Code(usize, String),
    Blank,
}

/// Statement lines with relative indentation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeBlock {
    lines: Vec<Line>,
    depth: usize,
}

impl CodeBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, text: impl Into<String>) -> &mut Self {
        self.lines.push(Line::Code(self.depth, text.into()));
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.lines.push(Line::Blank);
        self
    }

    /// Emit `header` and an opening brace, then indent
    pub fn open(&mut self, header: impl Into<String>) -> &mut Self {
        self.line(header);
        self.line("{");
        self.depth += 1;
        self
    }

    /// Outdent and emit a closing brace
    pub fn close(&mut self) -> &mut Self {
        self.depth = self.depth.saturating_sub(1);
        self.line("}")
    }

    /// Emit `text` one level deeper than the current line (brace-less `if` bodies)
    pub fn nested(&mut self, text: impl Into<String>) -> &mut Self {
        self.lines.push(Line::Code(self.depth + 1, text.into()));
        self
    }

    /// Lines without indentation, for assertions
    pub fn lines(&self) -> Vec<&str> {
        self.lines
            .iter()
            .map(|line| match line {
                Line::Code(_, text) => text.as_str(),
                Line::Blank => "",
            })
            .collect()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }

    fn render_into(&self, out: &mut String, depth: usize) {
        for line in &self.lines {
            match line {
                Line::Code(level, text) => {
                    out.push_str(&INDENT.repeat(depth + level));
                    out.push_str(text);
                    out.push('\n');
                }
                Line::Blank => out.push('\n'),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SourceFile {
        let mut body = CodeBlock::new();
        body.open("if (Mode == enMode.AddNew)")
            .line("return true;")
            .close()
            .blank()
            .line("return false;");

        let mut class = ClassTemplate::new("clsThing");
        class.push(Member::Enum {
            name: "enMode".to_string(),
            variants: vec![("AddNew".to_string(), 0), ("Update".to_string(), 1)],
        });
        class.push(Member::property("Mode", "enMode"));
        class.push(Member::property("ThingID", "int"));
        class.push(Member::Method(
            MethodTemplate::new(Visibility::Public, "bool", "Save").body(body),
        ));

        SourceFile::new("Shop.BusinessLogic", class).using("System")
    }

    #[test]
    fn test_render_layout() {
        let expected = "\
using System;

namespace Shop.BusinessLogic
{
    public class clsThing
    {
        public enum enMode { AddNew = 0, Update = 1 };
        public enMode Mode { get; set; }
        public int ThingID { get; set; }

        public bool Save()
        {
            if (Mode == enMode.AddNew)
            {
                return true;
            }

            return false;
        }
    }
}
";
        assert_eq!(sample().render(), expected);
    }

    #[test]
    fn test_signature() {
        let method = MethodTemplate::public_static("bool", "GetThingByID")
            .param(Param::value("ThingID", "int"))
            .param(Param::by_ref("Price", "decimal?"));
        assert_eq!(
            method.signature(),
            "public static bool GetThingByID(int ThingID, ref decimal? Price)"
        );

        let ctor = MethodTemplate::constructor(Visibility::Private, "clsThing")
            .param(Param::value("ThingID", "int"));
        assert_eq!(ctor.signature(), "private clsThing(int ThingID)");
    }

    #[test]
    fn test_lookups() {
        let file = sample();
        assert_eq!(file.class.method_names(), ["Save"]);
        assert_eq!(file.class.properties(), [("Mode", "enMode"), ("ThingID", "int")]);
        assert!(file.class.method("Save").is_some());
        assert!(file.class.method("Find").is_none());
        assert!(file.class.constructors().is_empty());
    }

    #[test]
    fn test_nested_line() {
        let mut block = CodeBlock::new();
        block.line("if (reader.HasRows)").nested("dt.Load(reader);");
        let mut out = String::new();
        block.render_into(&mut out, 0);
        assert_eq!(out, "if (reader.HasRows)\n    dt.Load(reader);\n");
        assert!(block.contains("dt.Load"));
    }
}
