//! Raw IDL document, as written in YAML.
//!
//! These types mirror the file layout and do no validation beyond shape;
//! `to_ir` turns them into the checker's IR.

use std::fmt;

use indexmap::IndexMap;
use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;

/// A parsed `.idl` document. Sections the checker does not use
/// (`global`, `server_parameters`, `feature_flags`, ...) are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct IdlDocument {
    pub imports: Vec<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub types: OrderedMap<TypeDecl>,
    #[serde(deserialize_with = "null_as_empty")]
    pub enums: OrderedMap<EnumDecl>,
    #[serde(deserialize_with = "null_as_empty")]
    pub structs: OrderedMap<StructDecl>,
    #[serde(deserialize_with = "null_as_empty")]
    pub commands: OrderedMap<CommandDecl>,
    #[serde(deserialize_with = "null_as_empty")]
    pub generic_argument_lists: OrderedMap<GenericListDecl>,
    #[serde(deserialize_with = "null_as_empty")]
    pub generic_reply_field_lists: OrderedMap<GenericListDecl>,
}

/// A YAML mapping that keeps declaration order. Keys may be any scalar.
pub type OrderedMap<V> = IndexMap<ScalarKey, V>;

/// A section present but left empty (`types:`) reads as an empty map.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A mapping key or list entry written as a string, number or bool.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScalarKey(pub String);

impl ScalarKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for ScalarKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct KeyVisitor;

        impl<'de> Visitor<'de> for KeyVisitor {
            type Value = ScalarKey;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a scalar")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<ScalarKey, E> {
                Ok(ScalarKey(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<ScalarKey, E> {
                Ok(ScalarKey(v))
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<ScalarKey, E> {
                Ok(ScalarKey(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<ScalarKey, E> {
                Ok(ScalarKey(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<ScalarKey, E> {
                Ok(ScalarKey(v.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<ScalarKey, E> {
                Ok(ScalarKey(v.to_string()))
            }
        }

        deserializer.deserialize_any(KeyVisitor)
    }
}

/// Names given either as mapping keys (`{Base: base}`) or as a list.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NameList(pub Vec<String>);

impl<'de> Deserialize<'de> for NameList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct NamesVisitor;

        impl<'de> Visitor<'de> for NamesVisitor {
            type Value = NameList;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping or a list of names")
            }

            fn visit_unit<E: de::Error>(self) -> Result<NameList, E> {
                Ok(NameList::default())
            }

            fn visit_none<E: de::Error>(self) -> Result<NameList, E> {
                Ok(NameList::default())
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<NameList, A::Error> {
                let mut names = Vec::new();
                while let Some(name) = seq.next_element::<ScalarKey>()? {
                    names.push(name.0);
                }
                Ok(NameList(names))
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<NameList, A::Error> {
                let mut names = Vec::new();
                while let Some((name, _)) = map.next_entry::<ScalarKey, de::IgnoredAny>()? {
                    names.push(name.0);
                }
                Ok(NameList(names))
            }
        }

        deserializer.deserialize_any(NamesVisitor)
    }
}

/// A single string or a list of strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl Default for OneOrMany {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

/// `types:` entry.
#[derive(Debug, Deserialize)]
pub struct TypeDecl {
    #[serde(default)]
    pub bson_serialization_type: OneOrMany,
    #[serde(default)]
    pub cpp_type: Option<String>,
    #[serde(default)]
    pub serializer: Option<String>,
    #[serde(default)]
    pub deserializer: Option<String>,
}

/// `enums:` entry.
#[derive(Debug, Deserialize)]
pub struct EnumDecl {
    #[serde(rename = "type", default)]
    pub base_type: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub values: OrderedMap<ScalarKey>,
}

/// `structs:` entry.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StructDecl {
    #[serde(deserialize_with = "null_as_empty")]
    pub fields: OrderedMap<FieldDecl>,
    pub chained_types: NameList,
    pub chained_structs: NameList,
}

/// A field, either `name: type` or the full mapping.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum FieldDecl {
    Short(String),
    Full(FieldBody),
}

#[derive(Debug, Deserialize)]
pub struct FieldBody {
    #[serde(rename = "type")]
    pub type_ref: TypeRefDecl,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub default: Option<serde_yaml::Value>,
    #[serde(default)]
    pub validator: Option<serde_yaml::Value>,
    #[serde(default)]
    pub stability: Option<String>,
    /// Legacy spelling of `stability`.
    #[serde(default)]
    pub unstable: Option<bool>,
}

/// `type:` value of a field or command.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TypeRefDecl {
    Named(String),
    Variant { variant: Vec<TypeRefDecl> },
}

/// `commands:` entry.
#[derive(Debug, Deserialize)]
pub struct CommandDecl {
    /// Wire name, when it differs from the declaration key.
    #[serde(default)]
    pub command_name: Option<String>,
    #[serde(default)]
    pub api_version: Option<ScalarKey>,
    pub namespace: String,
    #[serde(rename = "type", default)]
    pub command_type: Option<TypeRefDecl>,
    #[serde(default)]
    pub strict: Option<bool>,
    #[serde(default)]
    pub reply_type: Option<String>,
    #[serde(default)]
    pub access_check: Option<AccessCheckDecl>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub fields: OrderedMap<FieldDecl>,
    #[serde(default)]
    pub chained_types: NameList,
    #[serde(default)]
    pub chained_structs: NameList,
}

#[derive(Debug, Deserialize)]
pub struct AccessCheckDecl {
    #[serde(default)]
    pub simple: Option<AccessCheckEntryDecl>,
    #[serde(default)]
    pub complex: Option<Vec<AccessCheckEntryDecl>>,
}

/// `simple:` body or one `complex:` entry.
#[derive(Debug, Deserialize)]
pub struct AccessCheckEntryDecl {
    #[serde(default)]
    pub check: Option<String>,
    #[serde(default)]
    pub privilege: Option<PrivilegeDecl>,
}

#[derive(Debug, Deserialize)]
pub struct PrivilegeDecl {
    pub resource_pattern: String,
    #[serde(default)]
    pub action_type: OneOrMany,
    #[serde(default)]
    pub agg_stage: Option<String>,
}

/// `generic_argument_lists:` / `generic_reply_field_lists:` entry.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GenericListDecl {
    pub fields: NameList,
}
