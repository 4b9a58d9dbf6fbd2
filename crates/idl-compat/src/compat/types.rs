//! Type-level comparison: the recursive core.
//!
//! One skeleton serves both directions. Reply values may only shrink
//! (new ⊆ old); command inputs may only grow (new ⊇ old).

use super::context::CompatContext;
use super::pair::{check_array_type, ArrayCheck, FieldCompatibilityPair};
use super::position::Position;
use super::resolve::{ResolvedType, ResolvedVariant};
use super::structs::{check_struct, StructRef};
use crate::diagnostic::CheckerError;
use crate::ir::{EnumType, ScalarType, Struct};

/// Compares the two sides of `pair` at `position`.
pub(super) fn check_type<'a>(
    ctx: &mut CompatContext<'_>,
    pair: FieldCompatibilityPair<'a>,
    position: Position,
) -> Result<(), CheckerError> {
    let pair = match check_array_type(ctx, pair, position) {
        ArrayCheck::Mixed => return Ok(()),
        ArrayCheck::BothArrays(pair) | ArrayCheck::NeitherArrays(pair) => pair,
    };

    // array<array<T>>
    if pair.old.field_type.is_array() {
        return check_type(ctx, pair, position);
    }

    match &pair.old.field_type {
        ResolvedType::Scalar(old) => check_scalar(ctx, &pair, old, position),
        ResolvedType::Enum(old) => {
            check_enum(ctx, &pair, old, position);
            Ok(())
        }
        ResolvedType::Struct(old) => check_struct_type(ctx, &pair, old, position),
        ResolvedType::Variant(old) if position.is_command_input() => {
            check_input_variant(ctx, &pair, old, position)
        }
        ResolvedType::Variant(old) => check_reply_variant(ctx, &pair, old),
        ResolvedType::Array(_) => Ok(()),
    }
}

fn check_scalar(
    ctx: &mut CompatContext<'_>,
    pair: &FieldCompatibilityPair<'_>,
    old: &ScalarType,
    position: Position,
) -> Result<(), CheckerError> {
    let exempt = pair.old_is_exempt(ctx, position);
    let new = match &pair.new.field_type {
        ResolvedType::Scalar(new) => new,
        ResolvedType::Variant(new) if position.is_command_input() => {
            if !exempt {
                check_scalar_in_variant(ctx, pair, old, new, position)?;
            }
            return Ok(());
        }
        ResolvedType::Variant(_) => {
            if !exempt {
                ctx.add(
                    position.not_variant(),
                    pair.cmd_name,
                    format!(
                        "'{}' has {} '{}' that changed from type '{}' to variant type '{}'",
                        pair.cmd_name,
                        position.label(),
                        pair.field_name,
                        old.name,
                        pair.new.field_type.name()
                    ),
                    pair.new.file_path(),
                );
            }
            return Ok(());
        }
        other => {
            if !exempt {
                ctx.add(
                    position.enum_or_struct(),
                    pair.cmd_name,
                    format!(
                        "'{}' has {} '{}' of type '{}' that is now an enum or struct ('{}')",
                        pair.cmd_name,
                        position.label(),
                        pair.field_name,
                        old.name,
                        other.name()
                    ),
                    pair.new.file_path(),
                );
            }
            return Ok(());
        }
    };

    let (old_any, new_any) = (old.has_any(), new.has_any());
    if old_any && !new_any {
        ctx.add(
            position.old_any(),
            pair.cmd_name,
            format!(
                "'{}' has {} '{}' whose old type '{}' has bson serialization type 'any' \
                 but new type '{}' does not",
                pair.cmd_name,
                position.label(),
                pair.field_name,
                old.name,
                new.name
            ),
            pair.old.file_path(),
        );
        return Ok(());
    }
    if new_any && !old_any {
        ctx.add(
            position.new_any(),
            pair.cmd_name,
            format!(
                "'{}' has {} '{}' whose new type '{}' has bson serialization type 'any' \
                 but old type '{}' does not",
                pair.cmd_name,
                position.label(),
                pair.field_name,
                new.name,
                old.name
            ),
            pair.new.file_path(),
        );
        return Ok(());
    }

    if old_any {
        let key = pair.key(position);
        if !ctx.exceptions().allows_any_type(&key) {
            ctx.add(
                position.any_not_allowed(),
                pair.cmd_name,
                format!(
                    "'{}' has {} '{}' of type '{}' with bson serialization type 'any', \
                     which is not in the allow list ('{}')",
                    pair.cmd_name,
                    position.label(),
                    pair.field_name,
                    old.name,
                    key
                ),
                pair.old.file_path(),
            );
            return Ok(());
        }

        if old.cpp_type != new.cpp_type {
            ctx.add(
                position.cpp_type_not_equal(),
                pair.cmd_name,
                format!(
                    "'{}' has {} '{}' whose cpp_type changed from '{}' to '{}'",
                    pair.cmd_name,
                    position.label(),
                    pair.field_name,
                    display_opt(&old.cpp_type),
                    display_opt(&new.cpp_type)
                ),
                pair.new.file_path(),
            );
        }
        if !exempt {
            if old.serializer != new.serializer {
                ctx.add(
                    position.serializer_not_equal(),
                    pair.cmd_name,
                    format!(
                        "'{}' has {} '{}' whose serializer changed from '{}' to '{}'",
                        pair.cmd_name,
                        position.label(),
                        pair.field_name,
                        display_opt(&old.serializer),
                        display_opt(&new.serializer)
                    ),
                    pair.new.file_path(),
                );
            }
            if old.deserializer != new.deserializer {
                ctx.add(
                    position.deserializer_not_equal(),
                    pair.cmd_name,
                    format!(
                        "'{}' has {} '{}' whose deserializer changed from '{}' to '{}'",
                        pair.cmd_name,
                        position.label(),
                        pair.field_name,
                        display_opt(&old.deserializer),
                        display_opt(&new.deserializer)
                    ),
                    pair.new.file_path(),
                );
            }
        }
    }

    if !exempt {
        check_variance(
            ctx,
            pair,
            position,
            "bson serialization types",
            &old.bson_serialization_types,
            &new.bson_serialization_types,
        );
    }
    Ok(())
}

/// Command input only: an old scalar may widen into a variant that still
/// accepts it.
fn check_scalar_in_variant<'a>(
    ctx: &mut CompatContext<'_>,
    pair: &FieldCompatibilityPair<'a>,
    old: &ScalarType,
    new: &ResolvedVariant<'a>,
    position: Position,
) -> Result<(), CheckerError> {
    let matching = new.members.iter().find(|member| {
        matches!(member, ResolvedType::Scalar(_)) && input_names_match(&old.name, &member.name())
    });
    match matching {
        Some(member) => check_type(
            ctx,
            pair.with_types(pair.old.field_type.clone(), member.clone()),
            position,
        ),
        None => {
            ctx.add(
                position.variant_incompatible(),
                pair.cmd_name,
                format!(
                    "'{}' has {} '{}' of type '{}' that became variant '{}' without accepting '{}'",
                    pair.cmd_name,
                    position.label(),
                    pair.field_name,
                    old.name,
                    pair.new.field_type.name(),
                    old.name
                ),
                pair.new.file_path(),
            );
            Ok(())
        }
    }
}

fn check_enum(
    ctx: &mut CompatContext<'_>,
    pair: &FieldCompatibilityPair<'_>,
    old: &EnumType,
    position: Position,
) {
    if pair.old_is_exempt(ctx, position) {
        return;
    }
    match &pair.new.field_type {
        ResolvedType::Enum(new) => {
            check_variance(ctx, pair, position, "enum values", &old.values, &new.values)
        }
        other => ctx.add(
            position.not_enum(),
            pair.cmd_name,
            format!(
                "'{}' has {} '{}' of enum type '{}' that is now '{}', which is not an enum",
                pair.cmd_name,
                position.label(),
                pair.field_name,
                old.name,
                other.name()
            ),
            pair.new.file_path(),
        ),
    }
}

fn check_struct_type<'a>(
    ctx: &mut CompatContext<'_>,
    pair: &FieldCompatibilityPair<'a>,
    old: &'a Struct,
    position: Position,
) -> Result<(), CheckerError> {
    match &pair.new.field_type {
        ResolvedType::Struct(new) => check_struct(
            ctx,
            StructRef::new(old, pair.old.idl_file),
            StructRef::new(new, pair.new.idl_file),
            pair.cmd_name,
            position,
        ),
        other => {
            if !pair.old_is_exempt(ctx, position) {
                ctx.add(
                    position.not_struct(),
                    pair.cmd_name,
                    format!(
                        "'{}' has {} '{}' of struct type '{}' that is now '{}', which is not a struct",
                        pair.cmd_name,
                        position.label(),
                        pair.field_name,
                        old.name,
                        other.name()
                    ),
                    pair.new.file_path(),
                );
            }
            Ok(())
        }
    }
}

/// Reply direction: every new alternative must already exist in the old
/// variant.
fn check_reply_variant<'a>(
    ctx: &mut CompatContext<'_>,
    pair: &FieldCompatibilityPair<'a>,
    old: &ResolvedVariant<'a>,
) -> Result<(), CheckerError> {
    let position = Position::Reply;
    let exempt = pair.old_is_exempt(ctx, position);

    match &pair.new.field_type {
        ResolvedType::Variant(new) => {
            for new_member in &new.members {
                let name = new_member.name();
                match old.members.iter().find(|m| m.name() == name) {
                    Some(old_member) => check_type(
                        ctx,
                        pair.with_types(old_member.clone(), new_member.clone()),
                        position,
                    )?,
                    None if !exempt => ctx.add(
                        position.variant_incompatible(),
                        pair.cmd_name,
                        format!(
                            "'{}' has reply field '{}' with variant type that gained '{}', \
                             which is not among the old alternatives",
                            pair.cmd_name, pair.field_name, name
                        ),
                        pair.new.file_path(),
                    ),
                    None => {}
                }
            }
            if let Some(new_struct) = new.struct_member {
                match old.struct_member {
                    Some(old_struct) => check_struct(
                        ctx,
                        StructRef::new(old_struct, pair.old.idl_file),
                        StructRef::new(new_struct, pair.new.idl_file),
                        pair.cmd_name,
                        position,
                    )?,
                    None if !exempt => ctx.add(
                        position.variant_incompatible(),
                        pair.cmd_name,
                        format!(
                            "'{}' has reply field '{}' with variant type that gained struct '{}'",
                            pair.cmd_name, pair.field_name, new_struct.name
                        ),
                        pair.new.file_path(),
                    ),
                    None => {}
                }
            }
            Ok(())
        }
        ResolvedType::Struct(new_struct) => match old.struct_member {
            Some(old_struct) => check_struct(
                ctx,
                StructRef::new(old_struct, pair.old.idl_file),
                StructRef::new(new_struct, pair.new.idl_file),
                pair.cmd_name,
                position,
            ),
            None => {
                if !exempt {
                    report_variant_shape_change(ctx, pair);
                }
                Ok(())
            }
        },
        new_single => {
            let name = new_single.name();
            match old.members.iter().find(|m| m.name() == name) {
                Some(old_member) => check_type(
                    ctx,
                    pair.with_types(old_member.clone(), new_single.clone()),
                    position,
                ),
                None => {
                    if !exempt {
                        report_variant_shape_change(ctx, pair);
                    }
                    Ok(())
                }
            }
        }
    }
}

fn report_variant_shape_change(ctx: &mut CompatContext<'_>, pair: &FieldCompatibilityPair<'_>) {
    ctx.add(
        Position::Reply.not_variant(),
        pair.cmd_name,
        format!(
            "'{}' has reply field '{}' that changed from variant type '{}' to '{}'",
            pair.cmd_name,
            pair.field_name,
            pair.old.field_type.name(),
            pair.new.field_type.name()
        ),
        pair.new.file_path(),
    );
}

/// Command-input direction: every old alternative must still be accepted.
fn check_input_variant<'a>(
    ctx: &mut CompatContext<'_>,
    pair: &FieldCompatibilityPair<'a>,
    old: &ResolvedVariant<'a>,
    position: Position,
) -> Result<(), CheckerError> {
    let exempt = pair.old_is_exempt(ctx, position);
    let new = match &pair.new.field_type {
        ResolvedType::Variant(new) => new,
        other => {
            if !exempt {
                ctx.add(
                    position.not_variant(),
                    pair.cmd_name,
                    format!(
                        "'{}' has {} '{}' of variant type '{}' that is now '{}', which is not a variant",
                        pair.cmd_name,
                        position.label(),
                        pair.field_name,
                        pair.old.field_type.name(),
                        other.name()
                    ),
                    pair.new.file_path(),
                );
            }
            return Ok(());
        }
    };

    for old_member in &old.members {
        let old_name = old_member.name();
        match new
            .members
            .iter()
            .find(|m| input_names_match(&old_name, &m.name()))
        {
            Some(new_member) => check_type(
                ctx,
                pair.with_types(old_member.clone(), new_member.clone()),
                position,
            )?,
            None if !exempt => ctx.add(
                position.variant_incompatible(),
                pair.cmd_name,
                format!(
                    "'{}' has {} '{}' with variant type that no longer accepts '{}'",
                    pair.cmd_name,
                    position.label(),
                    pair.field_name,
                    old_name
                ),
                pair.new.file_path(),
            ),
            None => {}
        }
    }

    if let Some(old_struct) = old.struct_member {
        match new.struct_member {
            Some(new_struct) => check_struct(
                ctx,
                StructRef::new(old_struct, pair.old.idl_file),
                StructRef::new(new_struct, pair.new.idl_file),
                pair.cmd_name,
                position,
            )?,
            None if !exempt => ctx.add(
                position.variant_incompatible(),
                pair.cmd_name,
                format!(
                    "'{}' has {} '{}' with variant type that no longer accepts struct '{}'",
                    pair.cmd_name,
                    position.label(),
                    pair.field_name,
                    old_struct.name
                ),
                pair.new.file_path(),
            ),
            None => {}
        }
    }
    Ok(())
}

/// Variant members pair by name. An input that took `object` may take
/// `object_owned` instead.
fn input_names_match(old: &str, new: &str) -> bool {
    old == new || (old == "object" && new == "object_owned")
}

/// Serialization tags and enum values: replies may only drop values,
/// inputs may only add them.
fn check_variance(
    ctx: &mut CompatContext<'_>,
    pair: &FieldCompatibilityPair<'_>,
    position: Position,
    what: &str,
    old_values: &[String],
    new_values: &[String],
) {
    let (offending, verb) = if position.is_command_input() {
        (difference(old_values, new_values), "dropped")
    } else {
        (difference(new_values, old_values), "added")
    };
    if offending.is_empty() {
        return;
    }
    ctx.add(
        position.type_incompatible(),
        pair.cmd_name,
        format!(
            "'{}' has {} '{}' of type '{}' whose {} {} {}",
            pair.cmd_name,
            position.label(),
            pair.field_name,
            pair.new.field_type.name(),
            what,
            verb,
            offending.join(", ")
        ),
        pair.new.file_path(),
    );
}

/// Values of `left` missing from `right`, in `left` order.
fn difference<'v>(left: &'v [String], right: &[String]) -> Vec<&'v str> {
    left.iter()
        .filter(|value| !right.contains(value))
        .map(String::as_str)
        .collect()
}

fn display_opt(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("<none>")
}
