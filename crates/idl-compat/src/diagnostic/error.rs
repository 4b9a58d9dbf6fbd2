//! Checker error types.
//!
//! These are the *internal* failures of a run: unreadable snapshots, IDL that
//! does not parse, references the old snapshot cannot resolve, or a checker
//! build whose constant tables are inconsistent. Compatibility findings are
//! never reported through this type; they go to the
//! [`ErrorCollection`](crate::compat::ErrorCollection).
#![allow(unused_assignments)]

use std::path::PathBuf;
use miette::Diagnostic;
use thiserror::Error;

/// Errors that abort a compatibility run.
#[allow(unused_assignments)]
#[derive(Error, Diagnostic, Debug)]
pub enum CheckerError {
    // =========================================================================
    // IO Errors
    // =========================================================================
    #[error("Failed to read file '{path}': {message}")]
    #[diagnostic(code(idl_compat::io::read_error))]
    IoError {
        path: PathBuf,
        message: String,
    },

    #[error("IDL snapshot directory not found: {}", path.display())]
    #[diagnostic(
        code(idl_compat::io::snapshot_not_found),
        help("Both the old and the new snapshot roots must be existing directories")
    )]
    SnapshotNotFound {
        path: PathBuf,
    },

    // =========================================================================
    // Parse Errors
    // =========================================================================
    #[error("Failed to parse IDL file {}: {message}", path.display())]
    #[diagnostic(code(idl_compat::parse::parse_failed))]
    ParseFailed {
        path: PathBuf,
        message: String,
        line: Option<usize>,
        column: Option<usize>,
    },

    #[error("Invalid IDL in {}: {message}", path.display())]
    #[diagnostic(code(idl_compat::parse::invalid_idl))]
    InvalidIdl {
        path: PathBuf,
        message: String,
    },

    #[error("Cannot find import '{import}' referenced from {}", file.display())]
    #[diagnostic(
        code(idl_compat::parse::import_not_found),
        help("Imports are resolved against the snapshot root, then each --old-include / --new-include directory")
    )]
    ImportNotFound {
        import: String,
        file: PathBuf,
    },

    // =========================================================================
    // Resolution Errors
    // =========================================================================
    #[error("Unknown type reference '{name}' in {}", file.display())]
    #[diagnostic(code(idl_compat::types::unknown_reference))]
    UnresolvedType {
        name: String,
        file: PathBuf,
    },

    #[error("Struct '{name}' contains itself while comparing command '{command}'")]
    #[diagnostic(
        code(idl_compat::types::cycle),
        help("Struct definitions must form an acyclic graph")
    )]
    TypeCycle {
        name: String,
        command: String,
    },

    // =========================================================================
    // Checker Build Errors
    // =========================================================================
    #[error("Duplicate error id {id} assigned to {first} and {second}")]
    #[diagnostic(code(idl_compat::internal::duplicate_error_id))]
    DuplicateErrorId {
        id: String,
        first: String,
        second: String,
    },

    #[error("Duplicate entry '{entry}' in the {list} list")]
    #[diagnostic(code(idl_compat::internal::duplicate_exception))]
    DuplicateExceptionEntry {
        list: String,
        entry: String,
    },

    // =========================================================================
    // Frontend Errors
    // =========================================================================
    #[error("Unsupported IDL format: {format}")]
    #[diagnostic(code(idl_compat::frontend::unsupported_format))]
    UnsupportedFormat {
        format: String,
    },
}

impl CheckerError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::IoError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid-IDL error.
    pub fn invalid(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::InvalidIdl {
            path: path.into(),
            message: message.into(),
        }
    }
}
