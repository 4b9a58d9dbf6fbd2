//! Shared state threaded through the comparators.

use std::path::Path;

use super::error_id::ErrorId;
use super::errors::ErrorCollection;
use super::exceptions::Exceptions;
use crate::diagnostic::CheckerError;

/// Per-run comparison context: the diagnostic sink plus the settings every
/// comparator consults.
pub struct CompatContext<'a> {
    errors: ErrorCollection,
    exceptions: &'a Exceptions,
    old_dir: &'a Path,
    new_dir: &'a Path,
    require_stability_review: bool,
    struct_stack: Vec<String>,
}

impl<'a> CompatContext<'a> {
    pub fn new(exceptions: &'a Exceptions, old_dir: &'a Path, new_dir: &'a Path) -> Self {
        Self {
            errors: ErrorCollection::new(),
            exceptions,
            old_dir,
            new_dir,
            require_stability_review: false,
            struct_stack: Vec::new(),
        }
    }

    /// Enables the reviewed-stability rules.
    pub fn with_stability_review(mut self, enabled: bool) -> Self {
        self.require_stability_review = enabled;
        self
    }

    pub fn exceptions(&self) -> &'a Exceptions {
        self.exceptions
    }

    pub fn stability_review(&self) -> bool {
        self.require_stability_review
    }

    /// Records a diagnostic attributed to `file`.
    pub fn add(&mut self, error_id: ErrorId, command_name: &str, message: String, file: &Path) {
        self.errors.add(
            error_id,
            command_name,
            message,
            self.old_dir,
            self.new_dir,
            file,
        );
    }

    pub fn errors(&self) -> &ErrorCollection {
        &self.errors
    }

    pub fn into_errors(self) -> ErrorCollection {
        self.errors
    }

    /// Marks `name` as being compared. Fails if it is already on the stack.
    pub(super) fn enter_struct(&mut self, name: &str, command: &str) -> Result<(), CheckerError> {
        if self.struct_stack.iter().any(|s| s == name) {
            return Err(CheckerError::TypeCycle {
                name: name.to_string(),
                command: command.to_string(),
            });
        }
        self.struct_stack.push(name.to_string());
        Ok(())
    }

    pub(super) fn exit_struct(&mut self) {
        self.struct_stack.pop();
    }
}
