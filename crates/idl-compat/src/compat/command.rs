//! Per-command comparison.

use super::access::check_access_checks;
use super::context::CompatContext;
use super::error_id::ErrorId;
use super::fields::report_invalid_type;
use super::pair::{FieldCompatibility, FieldCompatibilityPair};
use super::position::Position;
use super::resolve::{resolve_type_ref, ResolvedType};
use super::structs::{check_struct, StructRef};
use super::types::check_type;
use crate::diagnostic::CheckerError;
use crate::ir::{Command, Namespace, ParsedFile, TypeRef};

/// Old command type that may be replaced by an ignored namespace.
const NAMESPACE_STRING: &str = "namespacestring";

/// Compares two versions of the same command.
pub fn check_command<'a>(
    ctx: &mut CompatContext<'_>,
    old_cmd: &'a Command,
    old_file: &'a ParsedFile,
    new_cmd: &'a Command,
    new_file: &'a ParsedFile,
) -> Result<(), CheckerError> {
    let cmd_name = old_cmd.name.as_str();

    if !old_cmd.strict && new_cmd.strict {
        ctx.add(
            ErrorId::CommandStrictTrueError,
            cmd_name,
            format!("'{}' changed from strict: false to strict: true", cmd_name),
            &new_file.path,
        );
    }

    check_struct(
        ctx,
        StructRef::new(&old_cmd.parameters, old_file),
        StructRef::new(&new_cmd.parameters, new_file),
        cmd_name,
        Position::CommandParameter,
    )?;

    check_namespace(ctx, old_cmd, old_file, new_cmd, new_file)?;
    check_reply(ctx, old_cmd, old_file, new_cmd, new_file)?;
    check_access_checks(ctx, old_cmd, new_cmd, new_file);
    Ok(())
}

fn check_namespace<'a>(
    ctx: &mut CompatContext<'_>,
    old_cmd: &'a Command,
    old_file: &'a ParsedFile,
    new_cmd: &'a Command,
    new_file: &'a ParsedFile,
) -> Result<(), CheckerError> {
    let compatible = match (old_cmd.namespace, new_cmd.namespace) {
        (Namespace::Ignored, new) => new == Namespace::Ignored,
        (Namespace::ConcatenateWithDbOrUuid, new) => matches!(
            new,
            Namespace::Ignored | Namespace::ConcatenateWithDbOrUuid
        ),
        (Namespace::ConcatenateWithDb, new) => new != Namespace::Type,
        (Namespace::Type, Namespace::Type) => {
            return check_command_type(ctx, old_cmd, old_file, new_cmd, new_file)
        }
        (Namespace::Type, new) => {
            new == Namespace::Ignored
                && old_cmd
                    .command_type
                    .as_ref()
                    .is_some_and(|t| t.is_named(NAMESPACE_STRING))
        }
    };

    if !compatible {
        ctx.add(
            ErrorId::NewNamespaceIncompatible,
            &old_cmd.name,
            format!(
                "'{}' changed namespace from '{}' to '{}'",
                old_cmd.name,
                old_cmd.namespace.as_str(),
                new_cmd.namespace.as_str()
            ),
            &new_file.path,
        );
    }
    Ok(())
}

/// Both commands are `namespace: type`; compare the types as inputs.
fn check_command_type<'a>(
    ctx: &mut CompatContext<'_>,
    old_cmd: &'a Command,
    old_file: &'a ParsedFile,
    new_cmd: &'a Command,
    new_file: &'a ParsedFile,
) -> Result<(), CheckerError> {
    let (Some(old_ref), Some(new_ref)) = (&old_cmd.command_type, &new_cmd.command_type) else {
        return Ok(());
    };

    let old_type = resolve(old_file, old_ref)?;
    let new_type = match resolve_type_ref(new_file, new_ref) {
        Ok(t) => t,
        Err(name) => {
            report_invalid_type(ctx, &old_cmd.name, "", &name, Position::CommandType, new_file);
            return Ok(());
        }
    };

    let pair = FieldCompatibilityPair::new(
        FieldCompatibility::new(old_type, old_file, false, false),
        FieldCompatibility::new(new_type, new_file, false, false),
        &old_cmd.name,
        "",
    );
    check_type(ctx, pair, Position::CommandType)
}

fn check_reply<'a>(
    ctx: &mut CompatContext<'_>,
    old_cmd: &'a Command,
    old_file: &'a ParsedFile,
    new_cmd: &'a Command,
    new_file: &'a ParsedFile,
) -> Result<(), CheckerError> {
    let Some(old_name) = &old_cmd.reply_type else {
        return Ok(());
    };
    let old_reply = old_file
        .symbols
        .get_struct(old_name)
        .ok_or_else(|| CheckerError::UnresolvedType {
            name: old_name.clone(),
            file: old_file.path.clone(),
        })?;

    match new_cmd
        .reply_type
        .as_deref()
        .and_then(|name| new_file.symbols.get_struct(name))
    {
        Some(new_reply) => check_struct(
            ctx,
            StructRef::new(old_reply, old_file),
            StructRef::new(new_reply, new_file),
            &old_cmd.name,
            Position::Reply,
        ),
        None => {
            ctx.add(
                ErrorId::NewReplyFieldTypeInvalid,
                &old_cmd.name,
                format!(
                    "'{}' has reply type '{}' that is not a struct in the new version",
                    old_cmd.name,
                    new_cmd.reply_type.as_deref().unwrap_or("<none>")
                ),
                &new_file.path,
            );
            Ok(())
        }
    }
}

fn resolve<'a>(
    file: &'a ParsedFile,
    type_ref: &TypeRef,
) -> Result<ResolvedType<'a>, CheckerError> {
    resolve_type_ref(file, type_ref).map_err(|name| CheckerError::UnresolvedType {
        name,
        file: file.path.clone(),
    })
}
