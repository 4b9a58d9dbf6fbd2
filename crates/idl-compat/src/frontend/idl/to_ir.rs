//! Convert raw IDL documents to the checker IR.

use std::path::Path;

use super::ast::*;
use crate::diagnostic::CheckerError;
use crate::ir::{
    AccessCheck, AccessCheckEntry, Command, EnumType, Field, GenericArgumentList, Namespace,
    ParsedFile, Privilege, ScalarType, SimpleAccessCheck, Stability, Struct, Symbol, TypeRef,
};

/// Lowers `document` and the documents it imports into one [`ParsedFile`].
///
/// Imported symbols are visible from the file; imported commands are kept
/// but flagged so the checker can skip them.
pub fn to_ir(
    path: &Path,
    document: &IdlDocument,
    imports: &[(&Path, &IdlDocument)],
) -> Result<ParsedFile, CheckerError> {
    let mut file = ParsedFile::new(path.to_path_buf());

    for (import_path, imported) in imports {
        declare_symbols(&mut file, imported, import_path)?;
    }
    // Local declarations shadow imported ones.
    declare_symbols(&mut file, document, path)?;

    for (key, decl) in document.structs.iter() {
        file.structs.push(convert_struct(key.as_str(), decl, path)?);
    }
    for (key, decl) in document.commands.iter() {
        file.commands.push(convert_command(key.as_str(), decl, path, false)?);
    }
    for (import_path, imported) in imports {
        for (key, decl) in imported.commands.iter() {
            file.commands.push(convert_command(key.as_str(), decl, import_path, true)?);
        }
    }

    file.generic_argument_lists = convert_generic_lists(&document.generic_argument_lists);
    file.generic_reply_field_lists = convert_generic_lists(&document.generic_reply_field_lists);

    Ok(file)
}

fn declare_symbols(
    file: &mut ParsedFile,
    document: &IdlDocument,
    path: &Path,
) -> Result<(), CheckerError> {
    for (name, decl) in document.types.iter() {
        file.symbols.insert(Symbol::Type(convert_type(name.as_str(), decl)));
    }
    for (name, decl) in document.enums.iter() {
        file.symbols.insert(Symbol::Enum(convert_enum(name.as_str(), decl)));
    }
    for (name, decl) in document.structs.iter() {
        file.symbols.insert(Symbol::Struct(convert_struct(name.as_str(), decl, path)?));
    }
    Ok(())
}

fn convert_type(name: &str, decl: &TypeDecl) -> ScalarType {
    ScalarType {
        name: name.to_string(),
        bson_serialization_types: decl.bson_serialization_type.clone().into_vec(),
        cpp_type: decl.cpp_type.clone(),
        serializer: decl.serializer.clone(),
        deserializer: decl.deserializer.clone(),
    }
}

fn convert_enum(name: &str, decl: &EnumDecl) -> EnumType {
    EnumType {
        name: name.to_string(),
        values: decl.values.iter().map(|(_, value)| value.0.clone()).collect(),
    }
}

fn convert_struct(name: &str, decl: &StructDecl, path: &Path) -> Result<Struct, CheckerError> {
    Ok(Struct {
        name: name.to_string(),
        fields: convert_fields(&decl.fields, path)?,
        chained_structs: decl.chained_structs.0.clone(),
        chained_types: decl.chained_types.0.clone(),
    })
}

fn convert_fields(fields: &OrderedMap<FieldDecl>, path: &Path) -> Result<Vec<Field>, CheckerError> {
    fields
        .iter()
        .map(|(name, decl)| convert_field(name.as_str(), decl, path))
        .collect()
}

fn convert_field(name: &str, decl: &FieldDecl, path: &Path) -> Result<Field, CheckerError> {
    let body = match decl {
        FieldDecl::Short(type_name) => {
            return Ok(Field {
                name: name.to_string(),
                type_ref: TypeRef::parse(type_name),
                optional: false,
                default: None,
                validator: None,
                stability: Stability::Unspecified,
            })
        }
        FieldDecl::Full(body) => body,
    };

    let stability = match (&body.stability, body.unstable) {
        (Some(value), _) => Stability::parse(value).ok_or_else(|| {
            CheckerError::invalid(
                path,
                format!("field '{}' has unknown stability '{}'", name, value),
            )
        })?,
        (None, Some(true)) => Stability::Unstable,
        (None, Some(false)) => Stability::Stable,
        (None, None) => Stability::Unspecified,
    };

    Ok(Field {
        name: name.to_string(),
        type_ref: convert_type_ref(&body.type_ref),
        optional: body.optional,
        default: opaque(body.default.as_ref(), name, path)?,
        validator: opaque(body.validator.as_ref(), name, path)?,
        stability,
    })
}

/// Stores an opaque YAML value as JSON so it compares by value.
fn opaque(
    value: Option<&serde_yaml::Value>,
    field: &str,
    path: &Path,
) -> Result<Option<serde_json::Value>, CheckerError> {
    match value {
        None | Some(serde_yaml::Value::Null) => Ok(None),
        Some(value) => serde_json::to_value(value).map(Some).map_err(|e| {
            CheckerError::invalid(path, format!("field '{}' has an unsupported value: {}", field, e))
        }),
    }
}

fn convert_type_ref(decl: &TypeRefDecl) -> TypeRef {
    match decl {
        TypeRefDecl::Named(name) => TypeRef::parse(name),
        TypeRefDecl::Variant { variant } => {
            TypeRef::Variant(variant.iter().map(convert_type_ref).collect())
        }
    }
}

fn convert_command(
    key: &str,
    decl: &CommandDecl,
    path: &Path,
    imported: bool,
) -> Result<Command, CheckerError> {
    let namespace = Namespace::parse(&decl.namespace).ok_or_else(|| {
        CheckerError::invalid(
            path,
            format!("command '{}' has unknown namespace '{}'", key, decl.namespace),
        )
    })?;

    let command_type = decl.command_type.as_ref().map(convert_type_ref);
    if namespace == Namespace::Type && command_type.is_none() {
        return Err(CheckerError::invalid(
            path,
            format!("command '{}' has namespace 'type' but no type", key),
        ));
    }

    let access_check = decl
        .access_check
        .as_ref()
        .map(|a| convert_access_check(key, a, path))
        .transpose()?;

    Ok(Command {
        name: decl.command_name.clone().unwrap_or_else(|| key.to_string()),
        api_version: decl
            .api_version
            .as_ref()
            .map(|v| v.0.clone())
            .unwrap_or_default(),
        imported,
        strict: decl.strict.unwrap_or(true),
        namespace,
        command_type,
        parameters: Struct {
            name: key.to_string(),
            fields: convert_fields(&decl.fields, path)?,
            chained_structs: decl.chained_structs.0.clone(),
            chained_types: decl.chained_types.0.clone(),
        },
        reply_type: decl.reply_type.clone(),
        access_check,
    })
}

fn convert_access_check(
    command: &str,
    decl: &AccessCheckDecl,
    path: &Path,
) -> Result<AccessCheck, CheckerError> {
    match (&decl.simple, &decl.complex) {
        (Some(simple), None) => Ok(AccessCheck::Simple(SimpleAccessCheck {
            check: simple.check.clone(),
            privilege: simple.privilege.as_ref().map(convert_privilege),
        })),
        (None, Some(entries)) => entries
            .iter()
            .map(|entry| match (&entry.check, &entry.privilege) {
                (Some(check), None) => Ok(AccessCheckEntry::Check(check.clone())),
                (None, Some(privilege)) => {
                    Ok(AccessCheckEntry::Privilege(convert_privilege(privilege)))
                }
                _ => Err(CheckerError::invalid(
                    path,
                    format!(
                        "command '{}' has a complex access check entry that is not exactly one of check or privilege",
                        command
                    ),
                )),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(AccessCheck::Complex),
        _ => Err(CheckerError::invalid(
            path,
            format!(
                "command '{}' must declare exactly one of simple or complex access checks",
                command
            ),
        )),
    }
}

fn convert_privilege(decl: &PrivilegeDecl) -> Privilege {
    Privilege {
        resource_pattern: decl.resource_pattern.clone(),
        action_types: decl.action_type.clone().into_vec(),
        agg_stage: decl.agg_stage.clone(),
    }
}

fn convert_generic_lists(lists: &OrderedMap<GenericListDecl>) -> Vec<GenericArgumentList> {
    lists
        .iter()
        .map(|(name, decl)| GenericArgumentList {
            name: name.0.clone(),
            fields: decl.fields.0.clone(),
        })
        .collect()
}
