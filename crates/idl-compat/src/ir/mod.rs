//! Parsed IDL representation.
//!
//! This IR is produced by an IDL frontend and consumed by the compatibility
//! passes. Everything here is built once per run and never mutated afterwards.

mod access;
mod symbols;

pub use access::{AccessCheck, AccessCheckEntry, Privilege, SimpleAccessCheck};
pub use symbols::{Symbol, SymbolTable};

use std::fmt;
use std::path::PathBuf;

/// Name of the scalar that stands for an optional `bool`.
pub const OPTIONAL_BOOL: &str = "optionalBool";

/// A reference to a type as written in a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    /// A scalar, enum or struct name.
    Named(String),
    /// `array<T>`
    Array(Box<TypeRef>),
    /// `variant: [A, B, ...]`
    Variant(Vec<TypeRef>),
}

impl TypeRef {
    /// Parses a type name, unwrapping the `array<...>` form.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        match text
            .strip_prefix("array<")
            .and_then(|rest| rest.strip_suffix('>'))
        {
            Some(inner) => TypeRef::Array(Box::new(TypeRef::parse(inner))),
            None => TypeRef::Named(text.to_string()),
        }
    }

    pub fn is_named(&self, name: &str) -> bool {
        matches!(self, TypeRef::Named(n) if n == name)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(name) => f.write_str(name),
            TypeRef::Array(inner) => write!(f, "array<{}>", inner),
            TypeRef::Variant(members) => {
                f.write_str("variant<")?;
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", member)?;
                }
                f.write_str(">")
            }
        }
    }
}

/// Declared stability of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stability {
    Stable,
    Unstable,
    /// The declaration carries no stability tag.
    #[default]
    Unspecified,
}

impl Stability {
    /// Parse a `stability:` value. `internal` fields are outside the stable
    /// contract and behave like unstable ones.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "stable" => Some(Stability::Stable),
            "unstable" | "internal" => Some(Stability::Unstable),
            _ => None,
        }
    }

    /// Unspecified fields predate stability tagging and count as stable.
    pub fn is_unstable(self) -> bool {
        self == Stability::Unstable
    }

    pub fn is_specified(self) -> bool {
        self != Stability::Unspecified
    }
}

/// A struct or command field.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub type_ref: TypeRef,
    pub optional: bool,
    pub default: Option<serde_json::Value>,
    pub validator: Option<serde_json::Value>,
    pub stability: Stability,
}

impl Field {
    pub fn is_unstable(&self) -> bool {
        self.stability.is_unstable()
    }

    /// Optional either explicitly or through the `optionalBool` alias.
    pub fn is_optional(&self) -> bool {
        self.optional || self.type_ref.is_named(OPTIONAL_BOOL)
    }

    /// A caller must send this field.
    pub fn is_required(&self) -> bool {
        !self.is_optional() && self.default.is_none()
    }
}

/// A struct declaration. Commands carry one for their parameters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Struct {
    pub name: String,
    pub fields: Vec<Field>,
    pub chained_structs: Vec<String>,
    pub chained_types: Vec<String>,
}

/// A scalar type declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarType {
    pub name: String,
    pub bson_serialization_types: Vec<String>,
    pub cpp_type: Option<String>,
    pub serializer: Option<String>,
    pub deserializer: Option<String>,
}

impl ScalarType {
    /// Whether the escape-hatch `any` serialization tag is present.
    pub fn has_any(&self) -> bool {
        self.bson_serialization_types.iter().any(|t| t == "any")
    }

    /// The plain `bool` that `optionalBool` stands for.
    pub fn plain_bool() -> Self {
        Self {
            name: "bool".to_string(),
            bson_serialization_types: vec!["bool".to_string()],
            cpp_type: None,
            serializer: None,
            deserializer: None,
        }
    }
}

/// An enum declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    pub name: String,
    /// Wire values in declaration order.
    pub values: Vec<String>,
}

/// How a command interprets its first element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Ignored,
    ConcatenateWithDb,
    ConcatenateWithDbOrUuid,
    Type,
}

impl Namespace {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ignored" => Some(Namespace::Ignored),
            "concatenate_with_db" => Some(Namespace::ConcatenateWithDb),
            "concatenate_with_db_or_uuid" => Some(Namespace::ConcatenateWithDbOrUuid),
            "type" => Some(Namespace::Type),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Ignored => "ignored",
            Namespace::ConcatenateWithDb => "concatenate_with_db",
            Namespace::ConcatenateWithDbOrUuid => "concatenate_with_db_or_uuid",
            Namespace::Type => "type",
        }
    }
}

/// A command declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    /// Wire name of the command.
    pub name: String,
    /// Empty when the command is not part of a versioned API.
    pub api_version: String,
    /// Declared in an imported file rather than the file that lists it.
    pub imported: bool,
    pub strict: bool,
    pub namespace: Namespace,
    /// The command type, present when `namespace` is [`Namespace::Type`].
    pub command_type: Option<TypeRef>,
    /// The parameter struct (the command's own fields and chains).
    pub parameters: Struct,
    pub reply_type: Option<String>,
    pub access_check: Option<AccessCheck>,
}

/// A named list from the generic arguments file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericArgumentList {
    pub name: String,
    pub fields: Vec<String>,
}

/// One parsed IDL file together with everything it imports.
#[derive(Debug, Clone)]
pub struct ParsedFile {
    pub path: PathBuf,
    /// Commands declared in this file followed by imported ones.
    pub commands: Vec<Command>,
    /// Structs declared in this file.
    pub structs: Vec<Struct>,
    /// Types, enums and structs visible from this file, imports included.
    pub symbols: SymbolTable,
    pub generic_argument_lists: Vec<GenericArgumentList>,
    pub generic_reply_field_lists: Vec<GenericArgumentList>,
}

impl ParsedFile {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            commands: Vec::new(),
            structs: Vec::new(),
            symbols: SymbolTable::default(),
            generic_argument_lists: Vec::new(),
            generic_reply_field_lists: Vec::new(),
        }
    }

    pub fn generic_argument_list(&self, name: &str) -> Option<&GenericArgumentList> {
        self.generic_argument_lists.iter().find(|l| l.name == name)
    }

    pub fn generic_reply_field_list(&self, name: &str) -> Option<&GenericArgumentList> {
        self.generic_reply_field_lists.iter().find(|l| l.name == name)
    }
}
