//! Field-level comparison of a matched old/new field pair.

use super::context::CompatContext;
use super::error_id::ErrorId;
use super::pair::{FieldCompatibility, FieldCompatibilityPair};
use super::position::{InputPosition, Position};
use super::types::check_type;
use crate::diagnostic::CheckerError;
use crate::ir::{Field, ParsedFile};

/// Both sides of a field comparison.
#[derive(Debug, Clone, Copy)]
pub(super) struct FieldSides<'a> {
    pub old: &'a Field,
    pub old_file: &'a ParsedFile,
    pub new: &'a Field,
    pub new_file: &'a ParsedFile,
}

/// Compares a reply field. Replies may narrow but never widen.
pub(super) fn check_reply_field<'a>(
    ctx: &mut CompatContext<'_>,
    sides: FieldSides<'a>,
    cmd_name: &'a str,
) -> Result<(), CheckerError> {
    let position = Position::Reply;
    let FieldSides { old, new, .. } = sides;
    let key = position.key(cmd_name, &new.name);
    let ignored = ctx.exceptions().ignores_stable_to_unstable(&key);

    if !old.is_unstable() && new.is_unstable() && !ignored {
        ctx.add(
            position.field_unstable(),
            cmd_name,
            format!(
                "'{}' has stable reply field '{}' that is unstable in the new version",
                cmd_name, new.name
            ),
            &sides.new_file.path,
        );
    }

    if new.is_optional() && !old.is_optional() && !old.is_unstable() {
        ctx.add(
            ErrorId::NewReplyFieldOptional,
            cmd_name,
            format!(
                "'{}' has reply field '{}' that is optional in the new version but was required",
                cmd_name, new.name
            ),
            &sides.new_file.path,
        );
    }

    check_stabilized(ctx, sides, cmd_name, position, &key);

    if !old.is_unstable() && !ignored {
        check_validators(ctx, sides, cmd_name, position);
    }

    match field_pair(ctx, sides, cmd_name, position)? {
        Some(pair) => check_type(ctx, pair, position),
        None => Ok(()),
    }
}

/// Compares a command parameter or command type field. Inputs may widen but
/// never narrow.
pub(super) fn check_input_field<'a>(
    ctx: &mut CompatContext<'_>,
    sides: FieldSides<'a>,
    cmd_name: &'a str,
    input: InputPosition,
) -> Result<(), CheckerError> {
    let position = Position::from(input);
    let FieldSides { old, new, .. } = sides;
    let key = position.key(cmd_name, &new.name);
    let ignored = ctx.exceptions().ignores_stable_to_unstable(&key);

    if !old.is_unstable() && new.is_unstable() && !ignored {
        ctx.add(
            position.field_unstable(),
            cmd_name,
            format!(
                "'{}' has stable {} '{}' that is unstable in the new version",
                cmd_name,
                position.label(),
                new.name
            ),
            &sides.new_file.path,
        );
    }

    if old.is_unstable() && !new.is_unstable() && new.is_required() {
        ctx.add(
            input.stable_required_no_default(),
            cmd_name,
            format!(
                "'{}' has {} '{}' that became stable while required with no default",
                cmd_name,
                position.label(),
                new.name
            ),
            &sides.new_file.path,
        );
    }

    check_stabilized(ctx, sides, cmd_name, position, &key);

    if !old.is_unstable() && old.is_optional() && new.is_required() {
        ctx.add(
            input.required(),
            cmd_name,
            format!(
                "'{}' has {} '{}' that was optional and is now required with no default",
                cmd_name,
                position.label(),
                new.name
            ),
            &sides.new_file.path,
        );
    }

    if !old.is_unstable() && !ignored {
        check_validators(ctx, sides, cmd_name, position);
    }

    match field_pair(ctx, sides, cmd_name, position)? {
        Some(pair) => check_type(ctx, pair, position),
        None => Ok(()),
    }
}

/// Reviewed-stability rule for an existing field promoted to stable.
fn check_stabilized(
    ctx: &mut CompatContext<'_>,
    sides: FieldSides<'_>,
    cmd_name: &str,
    position: Position,
    key: &str,
) {
    if ctx.stability_review()
        && sides.old.is_unstable()
        && !sides.new.is_unstable()
        && !ctx.exceptions().is_stabilized_field(key)
    {
        ctx.add(
            position.changed_to_stable(),
            cmd_name,
            format!(
                "'{}' has {} '{}' that changed from unstable to stable without review ('{}')",
                cmd_name,
                position.label(),
                sides.new.name,
                key
            ),
            &sides.new_file.path,
        );
    }
}

fn check_validators(
    ctx: &mut CompatContext<'_>,
    sides: FieldSides<'_>,
    cmd_name: &str,
    position: Position,
) {
    match (&sides.old.validator, &sides.new.validator) {
        (None, Some(_)) => ctx.add(
            position.contains_validator(),
            cmd_name,
            format!(
                "'{}' has {} '{}' that gained a validator",
                cmd_name,
                position.label(),
                sides.new.name
            ),
            &sides.new_file.path,
        ),
        (Some(old), Some(new)) if old != new => ctx.add(
            position.validators_not_equal(),
            cmd_name,
            format!(
                "'{}' has {} '{}' whose validator changed from {} to {}",
                cmd_name,
                position.label(),
                sides.new.name,
                old,
                new
            ),
            &sides.new_file.path,
        ),
        _ => {}
    }
}

/// Resolves both sides. An old side that does not resolve is an internal
/// error; a new side that does not resolve is reported and skipped.
fn field_pair<'a>(
    ctx: &mut CompatContext<'_>,
    sides: FieldSides<'a>,
    cmd_name: &'a str,
    position: Position,
) -> Result<Option<FieldCompatibilityPair<'a>>, CheckerError> {
    let old = FieldCompatibility::from_field(sides.old, sides.old_file).map_err(|name| {
        CheckerError::UnresolvedType {
            name,
            file: sides.old_file.path.clone(),
        }
    })?;
    let new = match FieldCompatibility::from_field(sides.new, sides.new_file) {
        Ok(new) => new,
        Err(name) => {
            report_invalid_type(ctx, cmd_name, &sides.new.name, &name, position, sides.new_file);
            return Ok(None);
        }
    };
    Ok(Some(FieldCompatibilityPair::new(
        old,
        new,
        cmd_name,
        &sides.new.name,
    )))
}

pub(super) fn report_invalid_type(
    ctx: &mut CompatContext<'_>,
    cmd_name: &str,
    field_name: &str,
    type_name: &str,
    position: Position,
    new_file: &ParsedFile,
) {
    ctx.add(
        position.invalid(),
        cmd_name,
        format!(
            "'{}' has {} '{}' with type '{}' that does not resolve in the new version",
            cmd_name,
            position.label(),
            field_name,
            type_name
        ),
        &new_file.path,
    );
}
