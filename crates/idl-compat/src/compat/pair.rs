//! The values carried through the recursive comparators.

use std::borrow::Cow;
use std::path::Path;

use super::context::CompatContext;
use super::error_id::ErrorId;
use super::position::Position;
use super::resolve::{resolve_type_ref, ResolvedType};
use crate::ir::{Field, ParsedFile, ScalarType, OPTIONAL_BOOL};

/// One side of a comparison: a resolved type plus the attributes of the
/// field it came from.
#[derive(Debug, Clone)]
pub struct FieldCompatibility<'a> {
    pub field_type: ResolvedType<'a>,
    pub idl_file: &'a ParsedFile,
    pub unstable: bool,
    pub optional: bool,
}

impl<'a> FieldCompatibility<'a> {
    /// Builds a value, folding `optionalBool` into an optional `bool`.
    pub fn new(
        field_type: ResolvedType<'a>,
        idl_file: &'a ParsedFile,
        unstable: bool,
        optional: bool,
    ) -> Self {
        match field_type {
            ResolvedType::Scalar(ref t) if t.name == OPTIONAL_BOOL => Self {
                field_type: ResolvedType::Scalar(Cow::Owned(ScalarType::plain_bool())),
                idl_file,
                unstable,
                optional: true,
            },
            field_type => Self {
                field_type,
                idl_file,
                unstable,
                optional,
            },
        }
    }

    /// Resolves `field` in `idl_file`. On failure returns the name that did
    /// not resolve.
    pub fn from_field(field: &Field, idl_file: &'a ParsedFile) -> Result<Self, String> {
        let field_type = if field.type_ref.is_named(OPTIONAL_BOOL) {
            ResolvedType::Scalar(Cow::Owned(ScalarType::plain_bool()))
        } else {
            resolve_type_ref(idl_file, &field.type_ref)?
        };
        let mut value = Self::new(field_type, idl_file, field.is_unstable(), field.optional);
        value.optional |= field.is_optional();
        Ok(value)
    }

    pub fn file_path(&self) -> &'a Path {
        &self.idl_file.path
    }

    /// Replaces the type with another one from the same field.
    pub fn with_type(&self, field_type: ResolvedType<'a>) -> Self {
        Self::new(field_type, self.idl_file, self.unstable, self.optional)
    }

    fn into_element(self) -> Self {
        Self {
            field_type: self.field_type.into_element(),
            ..self
        }
    }
}

/// The unit of work of the comparators.
#[derive(Debug, Clone)]
pub struct FieldCompatibilityPair<'a> {
    pub old: FieldCompatibility<'a>,
    pub new: FieldCompatibility<'a>,
    pub cmd_name: &'a str,
    pub field_name: &'a str,
}

impl<'a> FieldCompatibilityPair<'a> {
    pub fn new(
        old: FieldCompatibility<'a>,
        new: FieldCompatibility<'a>,
        cmd_name: &'a str,
        field_name: &'a str,
    ) -> Self {
        Self {
            old,
            new,
            cmd_name,
            field_name,
        }
    }

    /// Same command and field, different types.
    pub fn with_types(&self, old: ResolvedType<'a>, new: ResolvedType<'a>) -> Self {
        Self {
            old: self.old.with_type(old),
            new: self.new.with_type(new),
            cmd_name: self.cmd_name,
            field_name: self.field_name,
        }
    }

    pub fn key(&self, position: Position) -> String {
        position.key(self.cmd_name, self.field_name)
    }

    /// The old side is unstable or its downgrade was reviewed. Exempt values
    /// skip the variance rules.
    pub fn old_is_exempt(&self, ctx: &CompatContext<'_>, position: Position) -> bool {
        self.old.unstable
            || ctx
                .exceptions()
                .ignores_stable_to_unstable(&self.key(position))
    }
}

/// Outcome of the array-dimension pre-check.
#[derive(Debug)]
pub enum ArrayCheck<'a> {
    /// Both sides were arrays; the pair now holds the element types.
    BothArrays(FieldCompatibilityPair<'a>),
    NeitherArrays(FieldCompatibilityPair<'a>),
    /// Exactly one side is an array. Nothing further to compare.
    Mixed,
}

pub fn check_array_type<'a>(
    ctx: &mut CompatContext<'_>,
    pair: FieldCompatibilityPair<'a>,
    position: Position,
) -> ArrayCheck<'a> {
    match (pair.old.field_type.is_array(), pair.new.field_type.is_array()) {
        (false, false) => ArrayCheck::NeitherArrays(pair),
        (true, true) => ArrayCheck::BothArrays(FieldCompatibilityPair {
            old: pair.old.into_element(),
            new: pair.new.into_element(),
            cmd_name: pair.cmd_name,
            field_name: pair.field_name,
        }),
        _ => {
            if !pair.old.unstable {
                ctx.add(
                    ErrorId::TypeNotArray,
                    pair.cmd_name,
                    format!(
                        "'{}' has {} '{}' with type '{}' while the old type was '{}'; \
                         array and non-array types are not interchangeable",
                        pair.cmd_name,
                        position.label(),
                        pair.field_name,
                        pair.new.field_type.name(),
                        pair.old.field_type.name()
                    ),
                    pair.new.file_path(),
                );
            }
            ArrayCheck::Mixed
        }
    }
}
