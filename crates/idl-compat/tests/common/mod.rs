//! Snapshot fixtures shared by the integration tests.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use idl_compat::compat::exceptions::{ExceptionLists, Exceptions};
use idl_compat::compat::{BASIC_TYPES_FILE, GENERIC_ARGUMENT_FILE};
use idl_compat::{CheckReport, Checker, CheckerConfig, CheckerError};

/// Relative path of the command file most tests write.
pub const FOO_FILE: &str = "mongo/db/commands/foo.idl";

pub const BASIC_TYPES: &str = r#"
types:
  string:
    bson_serialization_type: string
    cpp_type: "std::string"
  int:
    bson_serialization_type: int
    cpp_type: "std::int32_t"
  double:
    bson_serialization_type: double
    cpp_type: "double"
  safeInt64:
    bson_serialization_type: [long, int, decimal, double]
    cpp_type: "std::int64_t"
  bool:
    bson_serialization_type: bool
    cpp_type: "bool"
  optionalBool:
    bson_serialization_type: any
    cpp_type: "mongo::OptionalBool"
    serializer: "mongo::OptionalBool::serializeToBSON"
    deserializer: "mongo::OptionalBool::parseFromBSON"
  object:
    bson_serialization_type: object
    cpp_type: "mongo::BSONObj"
  object_owned:
    bson_serialization_type: object
    cpp_type: "mongo::BSONObj"
  namespacestring:
    bson_serialization_type: string
    cpp_type: "mongo::NamespaceString"
  IDLAnyType:
    bson_serialization_type: any
    cpp_type: "mongo::IDLAnyType"
    serializer: "mongo::IDLAnyType::serializeToBSON"
    deserializer: "mongo::IDLAnyType::parseFromBSON"
  IDLAnyTypeOwned:
    bson_serialization_type: any
    cpp_type: "mongo::IDLAnyTypeOwned"
    serializer: "mongo::IDLAnyTypeOwned::serializeToBSON"
    deserializer: "mongo::IDLAnyTypeOwned::parseFromBSON"

structs:
  ErrorReply:
    fields:
      ok:
        type: double
        stability: stable
      errmsg:
        type: string
        stability: stable
"#;

/// `BASIC_TYPES` without the `ErrorReply` struct.
pub fn basic_types_without_error_reply() -> String {
    match BASIC_TYPES.find("structs:") {
        Some(index) => BASIC_TYPES[..index].to_string(),
        None => BASIC_TYPES.to_string(),
    }
}

pub const GENERIC_ARGUMENTS: &str = r#"
generic_argument_lists:
  generic_args_api_v1:
    fields:
      apiVersion: {}
      comment: {}
      maxTimeMS: {}
generic_reply_field_lists:
  generic_reply_fields_api_v1:
    fields:
      ok: {}
      operationTime: {}
"#;

/// Prefixes `body` with the import of the basic types file.
pub fn idl(body: &str) -> String {
    format!("imports:\n  - \"{}\"\n\n{}", BASIC_TYPES_FILE, body)
}

/// Where the field under test lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Site {
    /// Field `f` of `FooReply`, the reply of `foo`.
    Reply,
    /// Parameter `f` of `foo`.
    Param,
    /// Field `f` of `FooType`, the command type of `foo`.
    CommandType,
}

/// A `foo` command whose only field `f` is declared as `field` at `site`.
///
/// `decls` holds extra top-level `types:` / `enums:` sections and `structs`
/// extra struct entries indented by two spaces.
pub fn single_field(site: Site, field: &str, decls: &str, structs: &str) -> String {
    foo_command(site, Some(field), decls, structs)
}

/// The `foo` command shape of `site` with no field `f` at all.
pub fn no_field(site: Site) -> String {
    foo_command(site, None, "", "")
}

fn foo_command(site: Site, field: Option<&str>, decls: &str, structs: &str) -> String {
    let entry = |at: Site| match field {
        Some(field) if at == site => format!("\n      f: {}", field),
        _ => " {}".to_string(),
    };
    let param_fields = match field {
        Some(field) if site == Site::Param => format!("\n    fields:\n      f: {}", field),
        _ => String::new(),
    };
    let namespace = if site == Site::CommandType {
        "namespace: type\n    type: FooType"
    } else {
        "namespace: ignored"
    };

    idl(&format!(
        "{decls}
structs:
  FooReply:
    fields:{reply_fields}
  FooType:
    fields:{type_fields}
{structs}
commands:
  foo:
    command_name: foo
    api_version: \"1\"
    {namespace}
    reply_type: FooReply{param_fields}
",
        reply_fields = entry(Site::Reply),
        type_fields = entry(Site::CommandType),
    ))
}

/// An old/new snapshot pair in a temporary directory. Both sides start with
/// the basic types and generic argument files.
pub struct Snapshots {
    _dir: tempfile::TempDir,
    old: PathBuf,
    new: PathBuf,
}

impl Snapshots {
    pub fn new() -> Self {
        let dir = tempfile::TempDir::new().unwrap();
        let old = dir.path().join("old");
        let new = dir.path().join("new");
        let snapshots = Self {
            _dir: dir,
            old,
            new,
        };
        snapshots.both(BASIC_TYPES_FILE, BASIC_TYPES);
        snapshots.both(GENERIC_ARGUMENT_FILE, GENERIC_ARGUMENTS);
        snapshots
    }

    pub fn old_dir(&self) -> &Path {
        &self.old
    }

    pub fn new_dir(&self) -> &Path {
        &self.new
    }

    pub fn old(&self, relative: &str, contents: &str) -> &Self {
        write(&self.old, relative, contents);
        self
    }

    pub fn new_side(&self, relative: &str, contents: &str) -> &Self {
        write(&self.new, relative, contents);
        self
    }

    pub fn both(&self, relative: &str, contents: &str) -> &Self {
        self.old(relative, contents).new_side(relative, contents)
    }

    /// Writes `old` and `new` as the `foo` command file of each side.
    pub fn foo(&self, old: &str, new: &str) -> &Self {
        self.old(FOO_FILE, old).new_side(FOO_FILE, new)
    }

    pub fn config(&self) -> CheckerConfig {
        CheckerConfig::new(&self.old, &self.new)
    }

    pub fn run(&self, config: CheckerConfig) -> Result<CheckReport, CheckerError> {
        Checker::new(config)?.check()
    }

    pub fn check(&self) -> CheckReport {
        self.run(self.config()).unwrap()
    }

    pub fn check_with_review(&self) -> CheckReport {
        let mut config = self.config();
        config.require_stability_review = true;
        self.run(config).unwrap()
    }

    /// Runs with the built-in lists plus extra allow-listed `any` keys.
    pub fn check_allowing_any(&self, keys: &[&str]) -> CheckReport {
        let mut lists = ExceptionLists::builtin();
        lists
            .allow_any_type
            .extend(keys.iter().map(|k| k.to_string()));
        let exceptions = Exceptions::from_lists(lists).unwrap();
        Checker::with_exceptions(self.config(), exceptions)
            .check()
            .unwrap()
    }
}

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// The `ID####` codes of a report, in emission order.
pub fn codes(report: &CheckReport) -> Vec<&'static str> {
    report
        .errors
        .to_list()
        .iter()
        .map(|e| e.error_id.code())
        .collect()
}
