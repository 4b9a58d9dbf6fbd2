//! Authored exception lists.
//!
//! Every list is append-only across releases: an entry records a reviewed,
//! deliberate deviation from the default rules. Keys take one of three forms:
//! `cmd` (the command type of a typed-namespace command), `cmd-param-field`,
//! or `cmd-reply-field`.

use std::collections::{BTreeMap, BTreeSet};

use crate::diagnostic::CheckerError;

/// Keys allowed to carry the `any` bson serialization type.
pub const ALLOW_ANY_TYPE_LIST: &[&str] = &[
    "aggregate-param-pipeline",
    "aggregate-param-explain",
    "aggregate-param-allowDiskUse",
    "aggregate-param-cursor",
    "aggregate-param-hint",
    "aggregate-param-needsMerge",
    "aggregate-param-fromMongos",
    "aggregate-param-$_requestReshardingResumeToken",
    "aggregate-param-isMapReduceCommand",
    "count-param-hint",
    "count-param-limit",
    "count-param-maxTimeMS",
    "find-param-filter",
    "find-param-projection",
    "find-param-sort",
    "find-param-hint",
    "find-param-collation",
    "find-param-singleBatch",
    "find-param-allowDiskUse",
    "find-param-min",
    "find-param-max",
    "find-param-let",
    "find-param-tailable",
    "find-param-awaitData",
    "find-param-readOnce",
    "find-param-allowSpeculativeMajorityRead",
    "find-param-$_requestResumeToken",
    "find-param-$_resumeAfter",
    "find-param-maxTimeMS",
    "update-param-u",
    "update-param-hint",
    "update-param-upsertSupplied",
    "update-reply-_id",
    "delete-param-limit",
    "delete-param-hint",
    "findAndModify-param-hint",
    "findAndModify-param-update",
    "findAndModify-reply-upserted",
    "insert-reply-opTime",
    "update-reply-opTime",
    "delete-reply-opTime",
    "aggregate-reply-partialResultsReturned",
    "aggregate-reply-invalidated",
    "find-reply-partialResultsReturned",
    "find-reply-invalidated",
    "getMore-reply-partialResultsReturned",
    "getMore-reply-invalidated",
    "create-param-backwards",
    "saslStart-param-payload",
    "saslStart-reply-payload",
    "saslContinue-param-payload",
    "saslContinue-reply-payload",
];

/// Keys whose stable-to-unstable downgrade was reviewed and accepted.
pub const IGNORE_STABLE_TO_UNSTABLE_LIST: &[&str] = &[
    "listIndexes-reply-originalSpec",
    "create-param-recordIdsReplicated",
    "aggregate-param-isClusterQueryWithoutShardKeyCmd",
    "findAndModify-param-isClusterQueryWithoutShardKeyCmd",
    "update-param-isClusterQueryWithoutShardKeyCmd",
    "delete-param-isClusterQueryWithoutShardKeyCmd",
    "aggregate-param-$_generateV2ResumeTokens",
    "find-param-$_generateV2ResumeTokens",
];

/// Commands withdrawn from API version 1 before any public release.
pub const IGNORE_COMMANDS_LIST: &[&str] = &[];

/// Parameters that were added and removed behind a feature flag and so were
/// never part of a released API.
pub const PERMITTED_PARAMETER_REMOVALS: &[&str] = &[
    "endSessions-param-stmtId",
    "refreshSessions-param-stmtId",
];

/// Complex access-check names that were renamed without changing meaning.
pub const ACCESS_CHECK_RENAMES: &[(&str, &str)] = &[
    ("get_single_user", "get_authenticated_user"),
    ("get_authenticated_usernames", "get_authenticated_username"),
    ("get_impersonated_usernames", "get_impersonated_username"),
];

/// Existing fields whose promotion from unstable to stable was reviewed.
/// Only consulted when stability review is enabled.
pub const STABILIZED_FIELDS_LIST: &[&str] = &[];

/// Newly added fields that were reviewed to enter the API as stable.
/// Only consulted when stability review is enabled.
pub const NEW_STABLE_FIELDS_LIST: &[&str] = &[];

/// Raw list contents used to build an [`Exceptions`] set.
#[derive(Debug, Clone, Default)]
pub struct ExceptionLists {
    pub allow_any_type: Vec<String>,
    pub ignore_stable_to_unstable: Vec<String>,
    pub ignore_commands: Vec<String>,
    pub permitted_parameter_removals: Vec<String>,
    pub access_check_renames: Vec<(String, String)>,
    pub stabilized_fields: Vec<String>,
    pub new_stable_fields: Vec<String>,
}

impl ExceptionLists {
    /// The compiled-in lists.
    pub fn builtin() -> Self {
        fn owned(list: &[&str]) -> Vec<String> {
            list.iter().map(|s| s.to_string()).collect()
        }

        Self {
            allow_any_type: owned(ALLOW_ANY_TYPE_LIST),
            ignore_stable_to_unstable: owned(IGNORE_STABLE_TO_UNSTABLE_LIST),
            ignore_commands: owned(IGNORE_COMMANDS_LIST),
            permitted_parameter_removals: owned(PERMITTED_PARAMETER_REMOVALS),
            access_check_renames: ACCESS_CHECK_RENAMES
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
            stabilized_fields: owned(STABILIZED_FIELDS_LIST),
            new_stable_fields: owned(NEW_STABLE_FIELDS_LIST),
        }
    }
}

/// Immutable, de-duplicated exception sets consulted by the comparators.
#[derive(Debug, Clone)]
pub struct Exceptions {
    allow_any_type: BTreeSet<String>,
    ignore_stable_to_unstable: BTreeSet<String>,
    ignore_commands: BTreeSet<String>,
    permitted_parameter_removals: BTreeSet<String>,
    access_check_renames: BTreeMap<String, String>,
    stabilized_fields: BTreeSet<String>,
    new_stable_fields: BTreeSet<String>,
}

impl Exceptions {
    /// Loads the compiled-in lists.
    pub fn builtin() -> Result<Self, CheckerError> {
        Self::from_lists(ExceptionLists::builtin())
    }

    /// Builds the sets, rejecting any list that names an entry twice.
    pub fn from_lists(lists: ExceptionLists) -> Result<Self, CheckerError> {
        let mut access_check_renames = BTreeMap::new();
        for (from, to) in lists.access_check_renames {
            if access_check_renames.contains_key(&from) {
                return Err(CheckerError::DuplicateExceptionEntry {
                    list: "access check rename".to_string(),
                    entry: from,
                });
            }
            access_check_renames.insert(from, to);
        }

        Ok(Self {
            allow_any_type: unique("allow any type", lists.allow_any_type)?,
            ignore_stable_to_unstable: unique(
                "ignore stable to unstable",
                lists.ignore_stable_to_unstable,
            )?,
            ignore_commands: unique("ignore commands", lists.ignore_commands)?,
            permitted_parameter_removals: unique(
                "permitted parameter removals",
                lists.permitted_parameter_removals,
            )?,
            access_check_renames,
            stabilized_fields: unique("stabilized fields", lists.stabilized_fields)?,
            new_stable_fields: unique("new stable fields", lists.new_stable_fields)?,
        })
    }

    pub fn allows_any_type(&self, key: &str) -> bool {
        self.allow_any_type.contains(key)
    }

    pub fn ignores_stable_to_unstable(&self, key: &str) -> bool {
        self.ignore_stable_to_unstable.contains(key)
    }

    pub fn ignores_command(&self, command_name: &str) -> bool {
        self.ignore_commands.contains(command_name)
    }

    pub fn permits_parameter_removal(&self, key: &str) -> bool {
        self.permitted_parameter_removals.contains(key)
    }

    pub fn is_stabilized_field(&self, key: &str) -> bool {
        self.stabilized_fields.contains(key)
    }

    pub fn is_new_stable_field(&self, key: &str) -> bool {
        self.new_stable_fields.contains(key)
    }

    /// Maps a complex access-check name onto its current spelling.
    pub fn normalize_check_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.access_check_renames
            .get(name)
            .map(String::as_str)
            .unwrap_or(name)
    }
}

fn unique(list: &str, entries: Vec<String>) -> Result<BTreeSet<String>, CheckerError> {
    let mut set = BTreeSet::new();
    for entry in entries {
        if set.contains(&entry) {
            return Err(CheckerError::DuplicateExceptionEntry {
                list: list.to_string(),
                entry,
            });
        }
        set.insert(entry);
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lists_load() {
        let exceptions = Exceptions::builtin().unwrap();
        assert!(exceptions.allows_any_type("find-param-filter"));
        assert!(exceptions.permits_parameter_removal("endSessions-param-stmtId"));
        assert!(!exceptions.allows_any_type("find-param-limit"));
    }

    #[test]
    fn test_duplicate_entry_rejected() {
        let lists = ExceptionLists {
            allow_any_type: vec!["foo-param-a".to_string(), "foo-param-a".to_string()],
            ..ExceptionLists::default()
        };
        match Exceptions::from_lists(lists) {
            Err(CheckerError::DuplicateExceptionEntry { list, entry }) => {
                assert_eq!(list, "allow any type");
                assert_eq!(entry, "foo-param-a");
            }
            other => panic!("expected duplicate entry error, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_rename_rejected() {
        let lists = ExceptionLists {
            access_check_renames: vec![
                ("a".to_string(), "b".to_string()),
                ("a".to_string(), "c".to_string()),
            ],
            ..ExceptionLists::default()
        };
        assert!(Exceptions::from_lists(lists).is_err());
    }

    #[test]
    fn test_check_name_normalization() {
        let exceptions = Exceptions::builtin().unwrap();
        assert_eq!(
            exceptions.normalize_check_name("get_single_user"),
            "get_authenticated_user"
        );
        assert_eq!(
            exceptions.normalize_check_name("is_authenticated"),
            "is_authenticated"
        );
    }
}
