//! # IDL Compatibility Checker
//!
//! This crate decides whether a candidate release of an IDL-described API
//! is backward compatible with a previously released snapshot. Clients
//! built against the old definitions must still be able to call every
//! stable command on the new server and decode every reply it sends.
//!
//! ## Architecture
//!
//! ```text
//!  old snapshot        new snapshot
//!        │                   │
//!        ▼                   ▼
//! ┌──────────────────────────────────┐
//! │            Frontend              │  YAML IDL → raw AST, imports
//! │          (IDL → AST)             │
//! └────────────────┬─────────────────┘
//!                  │
//!                  ▼
//! ┌──────────────────────────────────┐
//! │               IR                 │  ParsedFile per .idl file
//! │           (AST → IR)             │
//! └────────────────┬─────────────────┘
//!                  │
//!                  ▼
//! ┌──────────────────────────────────┐
//! │             Compat               │  commands, structs, fields,
//! │     (old IR × new IR → errors)   │  types, access checks
//! └──────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use idl_compat::{Checker, CheckerConfig};
//!
//! let config = CheckerConfig::new("snapshots/7.0", "src");
//! let report = Checker::new(config)?.check()?;
//! if !report.is_compatible() {
//!     print!("{}", report.errors.dump());
//! }
//! ```

pub mod compat;
pub mod config;
pub mod diagnostic;
pub mod frontend;
pub mod ir;

use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;

use compat::{
    check_command, check_error_reply, check_generic_arguments, error_id, CompatContext,
    Exceptions, BASIC_TYPES_FILE, GENERIC_ARGUMENT_FILE,
};
use ir::{Command, ParsedFile};

pub use compat::{CompatError, ErrorCollection, ErrorId};
pub use config::CheckerConfig;
pub use diagnostic::CheckerError;

/// The only API version whose commands are checked.
pub const API_VERSION_1: &str = "1";

/// Runs a compatibility check between two snapshots.
pub struct Checker {
    config: CheckerConfig,
    exceptions: Exceptions,
}

/// Counts describing what a run looked at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckSummary {
    pub old_files: usize,
    pub new_files: usize,
    pub commands_checked: usize,
    pub errors: usize,
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct CheckReport {
    pub errors: ErrorCollection,
    pub summary: CheckSummary,
}

impl CheckReport {
    /// No diagnostic was recorded.
    pub fn is_compatible(&self) -> bool {
        !self.errors.has_errors()
    }

    /// Machine-readable report.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "summary": self.summary,
            "errors": self.errors.records(),
        })
    }
}

impl Checker {
    /// Creates a checker with the compiled-in exception lists.
    pub fn new(config: CheckerConfig) -> Result<Self, CheckerError> {
        Ok(Self::with_exceptions(config, Exceptions::builtin()?))
    }

    /// Creates a checker with caller-supplied exception lists.
    pub fn with_exceptions(config: CheckerConfig, exceptions: Exceptions) -> Self {
        Self { config, exceptions }
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    /// Loads both snapshots and compares them.
    ///
    /// Runs the full pipeline:
    /// 1. Verify the error-id table
    /// 2. Parse the new snapshot, then the old one
    /// 3. Compare every API version 1 command of the old snapshot
    /// 4. Compare the error reply and generic argument files
    pub fn check(&self) -> Result<CheckReport, CheckerError> {
        // Phase 1: Sanity of the id table
        error_id::verify_unique_codes()?;

        // Phase 2: Parse both snapshots
        let mut frontend = frontend::create_frontend(&self.config.format)?;
        let old_dirs = self.config.old_import_dirs();
        let new_dirs = self.config.new_import_dirs();

        let new_files = frontend.parse_directory(&self.config.new_dir, &new_dirs)?;
        self.log(format!(
            "📂 Loaded {} IDL files from {}",
            new_files.len(),
            self.config.new_dir.display()
        ));
        let old_files = frontend.parse_directory(&self.config.old_dir, &old_dirs)?;
        self.log(format!(
            "📂 Loaded {} IDL files from {}",
            old_files.len(),
            self.config.old_dir.display()
        ));

        let mut ctx = CompatContext::new(&self.exceptions, &self.config.old_dir, &self.config.new_dir)
            .with_stability_review(self.config.require_stability_review);

        // Phase 3: Commands
        let commands_checked = self.check_commands(&mut ctx, &old_files, &new_files)?;
        self.log(format!("🔍 Compared {} commands", commands_checked));

        // Phase 4: Special files
        let old_basic = frontend.parse_file(&self.config.old_dir.join(BASIC_TYPES_FILE), &old_dirs)?;
        let new_basic = frontend.parse_file(&self.config.new_dir.join(BASIC_TYPES_FILE), &new_dirs)?;
        check_error_reply(&mut ctx, &old_basic, &new_basic)?;

        let old_generic =
            frontend.parse_file(&self.config.old_dir.join(GENERIC_ARGUMENT_FILE), &old_dirs)?;
        let new_generic =
            frontend.parse_file(&self.config.new_dir.join(GENERIC_ARGUMENT_FILE), &new_dirs)?;
        check_generic_arguments(&mut ctx, &old_generic, &new_generic);
        self.log("🔍 Checked error reply and generic arguments");

        let errors = ctx.into_errors();
        Ok(CheckReport {
            summary: CheckSummary {
                old_files: old_files.len(),
                new_files: new_files.len(),
                commands_checked,
                errors: errors.count(),
            },
            errors,
        })
    }

    /// Pairs old and new commands by name and compares each pair. Returns
    /// the number of pairs compared.
    fn check_commands(
        &self,
        ctx: &mut CompatContext<'_>,
        old_files: &[ParsedFile],
        new_files: &[ParsedFile],
    ) -> Result<usize, CheckerError> {
        let new_commands = index_commands(ctx, new_files);

        let mut seen_old: HashMap<&str, &Path> = HashMap::new();
        let mut checked = 0;
        for old_file in old_files {
            for old_cmd in api_commands(old_file) {
                if !accept_command(ctx, old_cmd, old_file, &mut seen_old) {
                    continue;
                }
                match new_commands.get(old_cmd.name.as_str()) {
                    Some((new_cmd, new_file)) => {
                        check_command(ctx, old_cmd, old_file, new_cmd, new_file)?;
                        checked += 1;
                    }
                    None if self.exceptions.ignores_command(&old_cmd.name) => {}
                    None => ctx.add(
                        ErrorId::RemovedCommand,
                        &old_cmd.name,
                        format!("Old command '{}' was removed from the new version", old_cmd.name),
                        &old_file.path,
                    ),
                }
            }
        }
        Ok(checked)
    }

    fn log(&self, message: impl AsRef<str>) {
        if self.config.verbose {
            eprintln!("{}", message.as_ref());
        }
    }
}

/// Commands declared in `file` itself that belong to some API version.
fn api_commands(file: &ParsedFile) -> impl Iterator<Item = &Command> {
    file.commands
        .iter()
        .filter(|cmd| !cmd.imported && !cmd.api_version.is_empty())
}

/// Every valid API version 1 command of the new snapshot, by name.
fn index_commands<'a>(
    ctx: &mut CompatContext<'_>,
    files: &'a [ParsedFile],
) -> HashMap<&'a str, (&'a Command, &'a ParsedFile)> {
    let mut seen: HashMap<&str, &Path> = HashMap::new();
    let mut commands = HashMap::new();
    for file in files {
        for cmd in api_commands(file) {
            if accept_command(ctx, cmd, file, &mut seen) {
                commands.insert(cmd.name.as_str(), (cmd, file));
            }
        }
    }
    commands
}

/// Reports a bad API version or a duplicate name. Returns whether the
/// command should be compared.
fn accept_command<'a>(
    ctx: &mut CompatContext<'_>,
    cmd: &'a Command,
    file: &'a ParsedFile,
    seen: &mut HashMap<&'a str, &'a Path>,
) -> bool {
    if cmd.api_version != API_VERSION_1 {
        ctx.add(
            ErrorId::InvalidApiVersion,
            &cmd.name,
            format!(
                "'{}' has an invalid API version '{}'",
                cmd.name, cmd.api_version
            ),
            &file.path,
        );
        return false;
    }
    if let Some(first) = seen.get(cmd.name.as_str()) {
        ctx.add(
            ErrorId::DuplicateCommandName,
            &cmd.name,
            format!(
                "'{}' is declared more than once; first declaration in {}",
                cmd.name,
                first.display()
            ),
            &file.path,
        );
        return false;
    }
    seen.insert(cmd.name.as_str(), file.path.as_path());
    true
}
