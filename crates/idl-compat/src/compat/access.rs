//! Access-check comparison.
//!
//! A new server may demand the same or fewer privileges than the old one,
//! never more: check names and action types may only shrink, resource
//! patterns must not move.

use std::collections::{BTreeMap, BTreeSet};

use super::context::CompatContext;
use super::error_id::ErrorId;
use crate::ir::{AccessCheck, AccessCheckEntry, Command, ParsedFile, Privilege, SimpleAccessCheck};

pub(super) fn check_access_checks(
    ctx: &mut CompatContext<'_>,
    old_cmd: &Command,
    new_cmd: &Command,
    new_file: &ParsedFile,
) {
    let cmd_name = old_cmd.name.as_str();
    let file = new_file.path.as_path();

    match (&old_cmd.access_check, &new_cmd.access_check) {
        (None, None) => {}
        (Some(_), None) => ctx.add(
            ErrorId::RemovedAccessCheckField,
            cmd_name,
            format!("'{}' no longer declares an access check", cmd_name),
            file,
        ),
        (None, Some(_)) => {
            if new_cmd.api_version == "1" {
                ctx.add(
                    ErrorId::AddedAccessCheckField,
                    cmd_name,
                    format!("'{}' added an access check", cmd_name),
                    file,
                );
            }
        }
        (Some(AccessCheck::Simple(old)), Some(AccessCheck::Simple(new))) => {
            check_simple(ctx, cmd_name, old, new, file)
        }
        (Some(AccessCheck::Complex(old)), Some(AccessCheck::Complex(new))) => {
            check_complex(ctx, cmd_name, old, new, file)
        }
        (Some(old), Some(new)) => ctx.add(
            ErrorId::AccessCheckTypeNotEqual,
            cmd_name,
            format!(
                "'{}' changed its access check from {} to {}",
                cmd_name,
                old.kind(),
                new.kind()
            ),
            file,
        ),
    }
}

fn check_simple(
    ctx: &mut CompatContext<'_>,
    cmd_name: &str,
    old: &SimpleAccessCheck,
    new: &SimpleAccessCheck,
    file: &std::path::Path,
) {
    if old.check != new.check {
        ctx.add(
            ErrorId::CheckNotEqual,
            cmd_name,
            format!(
                "'{}' changed its access check from '{}' to '{}'",
                cmd_name,
                old.check.as_deref().unwrap_or("<none>"),
                new.check.as_deref().unwrap_or("<none>")
            ),
            file,
        );
    }

    let (Some(old_privilege), Some(new_privilege)) = (&old.privilege, &new.privilege) else {
        return;
    };
    if old_privilege.resource_pattern != new_privilege.resource_pattern {
        ctx.add(
            ErrorId::ResourcePatternNotEqual,
            cmd_name,
            format!(
                "'{}' changed its resource pattern from '{}' to '{}'",
                cmd_name, old_privilege.resource_pattern, new_privilege.resource_pattern
            ),
            file,
        );
    }
    let added: Vec<&str> = new_privilege
        .action_types
        .iter()
        .filter(|a| !old_privilege.action_types.contains(a))
        .map(String::as_str)
        .collect();
    if !added.is_empty() {
        ctx.add(
            ErrorId::NewActionTypesNotSubset,
            cmd_name,
            format!(
                "'{}' requires new action types: {}",
                cmd_name,
                added.join(", ")
            ),
            file,
        );
    }
}

/// Entries grouped by aggregation stage; bare checks go under `None`.
fn by_stage(entries: &[AccessCheckEntry]) -> BTreeMap<Option<&str>, Vec<&AccessCheckEntry>> {
    let mut stages: BTreeMap<Option<&str>, Vec<&AccessCheckEntry>> = BTreeMap::new();
    for entry in entries {
        stages.entry(entry.agg_stage()).or_default().push(entry);
    }
    stages
}

fn check_complex(
    ctx: &mut CompatContext<'_>,
    cmd_name: &str,
    old: &[AccessCheckEntry],
    new: &[AccessCheckEntry],
    file: &std::path::Path,
) {
    let old_stages = by_stage(old);
    // Stages only the new side knows bring their own authorization.
    for (stage, new_entries) in by_stage(new) {
        if let Some(old_entries) = old_stages.get(&stage) {
            check_stage(ctx, cmd_name, stage, old_entries, &new_entries, file);
        }
    }
}

fn check_stage(
    ctx: &mut CompatContext<'_>,
    cmd_name: &str,
    stage: Option<&str>,
    old: &[&AccessCheckEntry],
    new: &[&AccessCheckEntry],
    file: &std::path::Path,
) {
    let stage_label = stage.unwrap_or("<none>");

    if new.len() > old.len() {
        ctx.add(
            ErrorId::NewAdditionalComplexAccessCheck,
            cmd_name,
            format!(
                "'{}' has {} access checks for stage '{}' where there were {}",
                cmd_name,
                new.len(),
                stage_label,
                old.len()
            ),
            file,
        );
        return;
    }

    let exceptions = ctx.exceptions();
    let old_checks: BTreeSet<&str> = checks(old)
        .map(|c| exceptions.normalize_check_name(c))
        .collect();
    let added_checks: Vec<&str> = checks(new)
        .map(|c| exceptions.normalize_check_name(c))
        .filter(|c| !old_checks.contains(c))
        .collect();
    if !added_checks.is_empty() {
        let message = format!(
            "'{}' requires new access checks for stage '{}': {}",
            cmd_name,
            stage_label,
            added_checks.join(", ")
        );
        ctx.add(ErrorId::NewComplexChecksNotSubset, cmd_name, message, file);
    }

    let mut old_privileges = privileges(old);
    let new_privileges = privileges(new);
    if new_privileges.len() > old_privileges.len() {
        ctx.add(
            ErrorId::NewComplexPrivilegesNotSubset,
            cmd_name,
            format!(
                "'{}' requires {} privileges for stage '{}' where there were {}",
                cmd_name,
                new_privileges.len(),
                stage_label,
                old_privileges.len()
            ),
            file,
        );
        return;
    }

    // Each new privilege consumes the narrowest old privilege that covers it.
    for new_privilege in new_privileges {
        let found = old_privileges
            .iter()
            .enumerate()
            .filter(|(_, old_privilege)| {
                old_privilege.resource_pattern == new_privilege.resource_pattern
                    && new_privilege
                        .action_types
                        .iter()
                        .all(|a| old_privilege.action_types.contains(a))
            })
            .min_by_key(|(_, old_privilege)| old_privilege.action_types.len())
            .map(|(index, _)| index);
        match found {
            Some(index) => {
                old_privileges.remove(index);
            }
            None => ctx.add(
                ErrorId::NewComplexPrivilegesNotSubset,
                cmd_name,
                format!(
                    "'{}' requires privilege [{}] on '{}' for stage '{}' that no old privilege covers",
                    cmd_name,
                    new_privilege.action_types.join(", "),
                    new_privilege.resource_pattern,
                    stage_label
                ),
                file,
            ),
        }
    }
}

fn checks<'e>(entries: &'e [&AccessCheckEntry]) -> impl Iterator<Item = &'e str> {
    entries.iter().filter_map(|entry| match entry {
        AccessCheckEntry::Check(check) => Some(check.as_str()),
        AccessCheckEntry::Privilege(_) => None,
    })
}

fn privileges<'e>(entries: &[&'e AccessCheckEntry]) -> Vec<&'e Privilege> {
    entries
        .iter()
        .copied()
        .filter_map(|entry| match entry {
            AccessCheckEntry::Privilege(privilege) => Some(privilege),
            AccessCheckEntry::Check(_) => None,
        })
        .collect()
}
