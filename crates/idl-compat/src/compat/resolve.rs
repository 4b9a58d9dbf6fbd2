//! Resolution of type references against a file's symbol table.

use std::borrow::Cow;
use std::collections::HashSet;

use crate::ir::{EnumType, Field, ParsedFile, ScalarType, Struct, Symbol, TypeRef};

/// A type reference after symbol lookup.
#[derive(Debug, Clone)]
pub enum ResolvedType<'a> {
    Scalar(Cow<'a, ScalarType>),
    Enum(&'a EnumType),
    Struct(&'a Struct),
    Variant(ResolvedVariant<'a>),
    Array(Box<ResolvedType<'a>>),
}

/// A resolved variant. Struct alternatives are split out because they are
/// compared field by field rather than by name.
#[derive(Debug, Clone)]
pub struct ResolvedVariant<'a> {
    pub members: Vec<ResolvedType<'a>>,
    pub struct_member: Option<&'a Struct>,
}

impl<'a> ResolvedType<'a> {
    /// The name variants are matched by.
    pub fn name(&self) -> String {
        match self {
            ResolvedType::Scalar(t) => t.name.clone(),
            ResolvedType::Enum(e) => e.name.clone(),
            ResolvedType::Struct(s) => s.name.clone(),
            ResolvedType::Array(inner) => format!("array<{}>", inner.name()),
            ResolvedType::Variant(v) => {
                let mut names: Vec<String> = v.members.iter().map(|m| m.name()).collect();
                if let Some(s) = v.struct_member {
                    names.push(s.name.clone());
                }
                format!("variant<{}>", names.join(", "))
            }
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, ResolvedType::Array(_))
    }

    /// Element type of an array, or the type itself.
    pub fn into_element(self) -> ResolvedType<'a> {
        match self {
            ResolvedType::Array(inner) => *inner,
            other => other,
        }
    }

    /// The scalar at the bottom of any array nesting.
    pub fn innermost_scalar(&self) -> Option<&ScalarType> {
        match self {
            ResolvedType::Scalar(t) => Some(t.as_ref()),
            ResolvedType::Array(inner) => inner.innermost_scalar(),
            _ => None,
        }
    }
}

/// Resolves `type_ref` in `file`. On failure returns the name that did not
/// resolve.
pub fn resolve_type_ref<'a>(
    file: &'a ParsedFile,
    type_ref: &TypeRef,
) -> Result<ResolvedType<'a>, String> {
    match type_ref {
        TypeRef::Named(name) => match file.symbols.get(name) {
            Some(Symbol::Type(t)) => Ok(ResolvedType::Scalar(Cow::Borrowed(t))),
            Some(Symbol::Enum(e)) => Ok(ResolvedType::Enum(e)),
            Some(Symbol::Struct(s)) => Ok(ResolvedType::Struct(s)),
            None => Err(name.clone()),
        },
        TypeRef::Array(inner) => Ok(ResolvedType::Array(Box::new(resolve_type_ref(
            file, inner,
        )?))),
        TypeRef::Variant(alternatives) => {
            let mut variant = ResolvedVariant {
                members: Vec::with_capacity(alternatives.len()),
                struct_member: None,
            };
            for alternative in alternatives {
                match resolve_type_ref(file, alternative)? {
                    ResolvedType::Struct(s) if variant.struct_member.is_none() => {
                        variant.struct_member = Some(s);
                    }
                    other => variant.members.push(other),
                }
            }
            Ok(ResolvedType::Variant(variant))
        }
    }
}

/// Resolves a `chained_types` entry.
pub fn resolve_chained_type<'a>(file: &'a ParsedFile, name: &str) -> Result<ResolvedType<'a>, String> {
    resolve_type_ref(file, &TypeRef::Named(name.to_string()))
}

/// The struct's own fields followed by the fields of each chained struct,
/// depth first, in declaration order.
pub fn get_all_struct_fields<'a>(
    file: &'a ParsedFile,
    strukt: &'a Struct,
) -> Result<Vec<&'a Field>, String> {
    let mut fields = Vec::new();
    let mut visited = HashSet::new();
    collect_fields(file, strukt, &mut fields, &mut visited)?;
    Ok(fields)
}

fn collect_fields<'a>(
    file: &'a ParsedFile,
    strukt: &'a Struct,
    out: &mut Vec<&'a Field>,
    visited: &mut HashSet<&'a str>,
) -> Result<(), String> {
    out.extend(strukt.fields.iter());
    for chained in &strukt.chained_structs {
        let target = file
            .symbols
            .get_struct(chained)
            .ok_or_else(|| chained.clone())?;
        if visited.insert(target.name.as_str()) {
            collect_fields(file, target, out, visited)?;
        }
    }
    Ok(())
}
