//! YAML IDL parser.

use std::path::Path;

use super::ast::IdlDocument;
use crate::diagnostic::CheckerError;

/// IDL parser.
#[derive(Debug, Default)]
pub struct IdlParser;

impl IdlParser {
    pub fn new() -> Self {
        Self
    }

    /// Parses one IDL source file.
    pub fn parse(&self, source: &str, path: &Path) -> Result<IdlDocument, CheckerError> {
        // A blank file or a bare comment block is a valid, empty document.
        if source
            .lines()
            .all(|line| line.trim().is_empty() || line.trim_start().starts_with('#'))
        {
            return Ok(IdlDocument::default());
        }

        serde_yaml::from_str(source).map_err(|e| {
            let location = e.location();
            CheckerError::ParseFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
                line: location.as_ref().map(|l| l.line()),
                column: location.as_ref().map(|l| l.column()),
            }
        })
    }
}
