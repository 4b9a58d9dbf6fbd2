//! Struct comparison: chained types, then fields joined by name.

use super::context::CompatContext;
use super::fields::{check_input_field, check_reply_field, report_invalid_type, FieldSides};
use super::pair::{FieldCompatibility, FieldCompatibilityPair};
use super::position::Position;
use super::resolve::{get_all_struct_fields, resolve_chained_type};
use super::types::check_type;
use crate::diagnostic::CheckerError;
use crate::ir::{Field, ParsedFile, Stability, Struct};

/// A struct together with the file its references resolve in.
#[derive(Debug, Clone, Copy)]
pub struct StructRef<'a> {
    pub def: &'a Struct,
    pub file: &'a ParsedFile,
}

impl<'a> StructRef<'a> {
    pub fn new(def: &'a Struct, file: &'a ParsedFile) -> Self {
        Self { def, file }
    }
}

/// Compares two versions of a struct at `position`.
pub(super) fn check_struct<'a>(
    ctx: &mut CompatContext<'_>,
    old: StructRef<'a>,
    new: StructRef<'a>,
    cmd_name: &'a str,
    position: Position,
) -> Result<(), CheckerError> {
    ctx.enter_struct(&old.def.name, cmd_name)?;
    let result = compare_structs(ctx, old, new, cmd_name, position);
    ctx.exit_struct();
    result
}

fn compare_structs<'a>(
    ctx: &mut CompatContext<'_>,
    old: StructRef<'a>,
    new: StructRef<'a>,
    cmd_name: &'a str,
    position: Position,
) -> Result<(), CheckerError> {
    check_chained_types(ctx, old, new, cmd_name, position)?;

    let old_fields = get_all_struct_fields(old.file, old.def).map_err(|name| {
        CheckerError::UnresolvedType {
            name,
            file: old.file.path.clone(),
        }
    })?;
    let new_fields = match get_all_struct_fields(new.file, new.def) {
        Ok(fields) => fields,
        Err(name) => {
            report_invalid_type(ctx, cmd_name, &new.def.name, &name, position, new.file);
            return Ok(());
        }
    };

    for &old_field in &old_fields {
        match new_fields.iter().copied().find(|f| f.name == old_field.name) {
            Some(new_field) => {
                let sides = FieldSides {
                    old: old_field,
                    old_file: old.file,
                    new: new_field,
                    new_file: new.file,
                };
                match position.as_input() {
                    Some(input) => check_input_field(ctx, sides, cmd_name, input)?,
                    None => check_reply_field(ctx, sides, cmd_name)?,
                }
            }
            None => report_missing_field(ctx, old_field, old.file, cmd_name, position),
        }
    }

    for &new_field in &new_fields {
        let old_field = old_fields.iter().copied().find(|f| f.name == new_field.name);
        // Fields that predate stability tags may keep omitting them.
        let needs_stability = old_field.map_or(true, |f| f.stability.is_specified());
        if needs_stability && !new_field.stability.is_specified() {
            ctx.add(
                position.requires_stability(),
                cmd_name,
                format!(
                    "'{}' has {} '{}' with no stability declaration",
                    cmd_name,
                    position.label(),
                    new_field.name
                ),
                &new.file.path,
            );
        }
        if old_field.is_none() {
            check_added_field(ctx, new_field, new.file, cmd_name, position);
        }
    }
    Ok(())
}

fn report_missing_field(
    ctx: &mut CompatContext<'_>,
    old_field: &Field,
    old_file: &ParsedFile,
    cmd_name: &str,
    position: Position,
) {
    if old_field.is_unstable() {
        return;
    }
    if position == Position::CommandParameter
        && ctx
            .exceptions()
            .permits_parameter_removal(&position.key(cmd_name, &old_field.name))
    {
        return;
    }
    ctx.add(
        position.field_missing(),
        cmd_name,
        format!(
            "'{}' has stable {} '{}' that is missing from the new version",
            cmd_name,
            position.label(),
            old_field.name
        ),
        &old_file.path,
    );
}

/// Rules that apply only to fields the new version introduces.
fn check_added_field(
    ctx: &mut CompatContext<'_>,
    new_field: &Field,
    new_file: &ParsedFile,
    cmd_name: &str,
    position: Position,
) {
    let key = position.key(cmd_name, &new_field.name);

    match FieldCompatibility::from_field(new_field, new_file) {
        Ok(value) => {
            let has_any = value
                .field_type
                .innermost_scalar()
                .is_some_and(|t| t.has_any());
            if has_any && !ctx.exceptions().allows_any_type(&key) {
                ctx.add(
                    position.any_not_allowed(),
                    cmd_name,
                    format!(
                        "'{}' has new {} '{}' with bson serialization type 'any', \
                         which is not in the allow list ('{}')",
                        cmd_name,
                        position.label(),
                        new_field.name,
                        key
                    ),
                    &new_file.path,
                );
            }
        }
        Err(name) => report_invalid_type(ctx, cmd_name, &new_field.name, &name, position, new_file),
    }

    if let Some(input) = position.as_input() {
        if new_field.is_required() && !new_field.is_unstable() {
            ctx.add(
                input.added_required(),
                cmd_name,
                format!(
                    "'{}' has new {} '{}' that is required with no default",
                    cmd_name,
                    position.label(),
                    new_field.name
                ),
                &new_file.path,
            );
        }
    }

    if ctx.stability_review()
        && new_field.stability == Stability::Stable
        && !ctx.exceptions().is_new_stable_field(&key)
    {
        ctx.add(
            position.added_as_stable(),
            cmd_name,
            format!(
                "'{}' has new {} '{}' added as stable without review ('{}')",
                cmd_name,
                position.label(),
                new_field.name,
                key
            ),
            &new_file.path,
        );
    }
}

/// Chained types pair by name. Replies may not gain one; inputs may not
/// lose one.
fn check_chained_types<'a>(
    ctx: &mut CompatContext<'_>,
    old: StructRef<'a>,
    new: StructRef<'a>,
    cmd_name: &'a str,
    position: Position,
) -> Result<(), CheckerError> {
    let (driving, other, missing_file) = if position.is_command_input() {
        (old, new, new.file)
    } else {
        (new, old, new.file)
    };

    for name in &driving.def.chained_types {
        if !other.def.chained_types.contains(name) {
            let change = if position.is_command_input() {
                "no longer chains"
            } else {
                "now chains"
            };
            ctx.add(
                position.chained_type_incompatible(),
                cmd_name,
                format!(
                    "'{}' has struct '{}' that {} type '{}'",
                    cmd_name, new.def.name, change, name
                ),
                &missing_file.path,
            );
            continue;
        }

        let old_type = resolve_chained_type(old.file, name).map_err(|name| {
            CheckerError::UnresolvedType {
                name,
                file: old.file.path.clone(),
            }
        })?;
        let new_type = match resolve_chained_type(new.file, name) {
            Ok(t) => t,
            Err(unresolved) => {
                report_invalid_type(ctx, cmd_name, name, &unresolved, position, new.file);
                continue;
            }
        };
        let pair = FieldCompatibilityPair::new(
            FieldCompatibility::new(old_type, old.file, false, false),
            FieldCompatibility::new(new_type, new.file, false, false),
            cmd_name,
            name,
        );
        check_type(ctx, pair, position)?;
    }
    Ok(())
}
