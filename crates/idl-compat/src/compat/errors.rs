//! Compatibility diagnostics and the append-only collection that holds them.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::error_id::ErrorId;

/// One compatibility finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompatError {
    pub error_id: ErrorId,
    pub command_name: String,
    pub message: String,
    pub old_idl_dir: PathBuf,
    pub new_idl_dir: PathBuf,
    pub file: PathBuf,
}

impl CompatError {
    /// The file path relative to whichever snapshot root contains it.
    pub fn relative_file(&self) -> PathBuf {
        [&self.old_idl_dir, &self.new_idl_dir]
            .into_iter()
            .filter(|root| self.file.starts_with(root))
            .find_map(|root| pathdiff::diff_paths(&self.file, root))
            .unwrap_or_else(|| self.file.clone())
    }
}

impl fmt::Display for CompatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Comparing {} and {}: Error in {}: {}: {}",
            self.old_idl_dir.display(),
            self.new_idl_dir.display(),
            self.file.display(),
            self.error_id,
            self.message
        )
    }
}

/// Machine-readable form of a [`CompatError`].
#[derive(Debug, Clone, Serialize)]
pub struct CompatErrorRecord<'a> {
    #[serde(flatten)]
    pub error: &'a CompatError,
    pub relative_file: PathBuf,
}

/// Append-only sink for the diagnostics of one run.
#[derive(Debug, Clone, Default)]
pub struct ErrorCollection {
    errors: Vec<CompatError>,
}

impl ErrorCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a diagnostic.
    pub fn add(
        &mut self,
        error_id: ErrorId,
        command_name: impl Into<String>,
        message: impl Into<String>,
        old_idl_dir: &Path,
        new_idl_dir: &Path,
        file: &Path,
    ) {
        self.errors.push(CompatError {
            error_id,
            command_name: command_name.into(),
            message: message.into(),
            old_idl_dir: old_idl_dir.to_path_buf(),
            new_idl_dir: new_idl_dir.to_path_buf(),
            file: file.to_path_buf(),
        });
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn contains(&self, error_id: ErrorId) -> bool {
        self.errors.iter().any(|e| e.error_id == error_id)
    }

    /// First diagnostic with the given id.
    pub fn get_by_id(&self, error_id: ErrorId) -> Option<&CompatError> {
        self.errors.iter().find(|e| e.error_id == error_id)
    }

    /// First diagnostic recorded against the given command.
    pub fn get_by_command(&self, command_name: &str) -> Option<&CompatError> {
        self.errors.iter().find(|e| e.command_name == command_name)
    }

    pub fn get_by_command_and_id(
        &self,
        command_name: &str,
        error_id: ErrorId,
    ) -> Option<&CompatError> {
        self.errors
            .iter()
            .find(|e| e.command_name == command_name && e.error_id == error_id)
    }

    pub fn get_all_by_command(&self, command_name: &str) -> Vec<&CompatError> {
        self.errors
            .iter()
            .filter(|e| e.command_name == command_name)
            .collect()
    }

    /// Number of diagnostics carrying the given id.
    pub fn count_by_id(&self, error_id: ErrorId) -> usize {
        self.errors.iter().filter(|e| e.error_id == error_id).count()
    }

    pub fn to_list(&self) -> &[CompatError] {
        &self.errors
    }

    pub fn records(&self) -> Vec<CompatErrorRecord<'_>> {
        self.errors
            .iter()
            .map(|error| CompatErrorRecord {
                error,
                relative_file: error.relative_file(),
            })
            .collect()
    }

    pub fn count(&self) -> usize {
        self.errors.len()
    }

    /// Human-readable report: a summary header followed by one paragraph
    /// per diagnostic.
    pub fn dump(&self) -> String {
        let mut out = format!(
            "Errors found while checking IDL compatibility: {} errors:\n",
            self.errors.len()
        );
        for error in &self.errors {
            out.push_str(&error.to_string());
            out.push_str("\n\n");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection() -> ErrorCollection {
        let old = Path::new("/snap/old");
        let new = Path::new("/snap/new");
        let mut errors = ErrorCollection::new();
        errors.add(
            ErrorId::RemovedCommand,
            "foo",
            "'foo' was removed",
            old,
            new,
            Path::new("/snap/old/mongo/db/foo.idl"),
        );
        errors.add(
            ErrorId::NewReplyFieldMissing,
            "bar",
            "'bar' lost 'a'",
            old,
            new,
            Path::new("/snap/old/mongo/db/bar.idl"),
        );
        errors.add(
            ErrorId::ReplyFieldNotSubset,
            "bar",
            "'bar' widened 'b'",
            old,
            new,
            Path::new("/snap/new/mongo/db/bar.idl"),
        );
        errors
    }

    #[test]
    fn test_empty_collection() {
        let errors = ErrorCollection::new();
        assert!(!errors.has_errors());
        assert_eq!(errors.count(), 0);
        assert!(errors.get_by_id(ErrorId::RemovedCommand).is_none());
    }

    #[test]
    fn test_queries() {
        let errors = collection();
        assert!(errors.has_errors());
        assert_eq!(errors.count(), 3);
        assert!(errors.contains(ErrorId::RemovedCommand));
        assert!(!errors.contains(ErrorId::DuplicateCommandName));

        assert_eq!(
            errors.get_by_id(ErrorId::NewReplyFieldMissing).map(|e| e.command_name.as_str()),
            Some("bar")
        );
        assert_eq!(
            errors.get_by_command("bar").map(|e| e.error_id),
            Some(ErrorId::NewReplyFieldMissing)
        );
        assert!(errors
            .get_by_command_and_id("bar", ErrorId::ReplyFieldNotSubset)
            .is_some());
        assert!(errors
            .get_by_command_and_id("foo", ErrorId::ReplyFieldNotSubset)
            .is_none());
        assert_eq!(errors.get_all_by_command("bar").len(), 2);
        assert_eq!(errors.count_by_id(ErrorId::RemovedCommand), 1);
    }

    #[test]
    fn test_display_format() {
        let errors = collection();
        let first = &errors.to_list()[0];
        assert_eq!(
            first.to_string(),
            "Comparing /snap/old and /snap/new: Error in /snap/old/mongo/db/foo.idl: ID0003: 'foo' was removed"
        );
    }

    #[test]
    fn test_dump_has_header_and_paragraphs() {
        let dump = collection().dump();
        assert!(dump.starts_with("Errors found while checking IDL compatibility: 3 errors:\n"));
        assert_eq!(dump.matches("Comparing /snap/old and /snap/new").count(), 3);
        assert!(dump.contains("ID0006: 'bar' lost 'a'\n\n"));
    }

    #[test]
    fn test_relative_file() {
        let errors = collection();
        assert_eq!(
            errors.to_list()[2].relative_file(),
            PathBuf::from("mongo/db/bar.idl")
        );
    }

    #[test]
    fn test_records_serialize() {
        let errors = collection();
        let json = serde_json::to_value(errors.records()).unwrap();
        assert_eq!(json[0]["error_id"], "ID0003");
        assert_eq!(json[0]["command_name"], "foo");
        assert_eq!(json[0]["relative_file"], "mongo/db/foo.idl");
    }
}
