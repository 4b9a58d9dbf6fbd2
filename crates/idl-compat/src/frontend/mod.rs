//! IDL frontends.
//!
//! A frontend reads snapshot files and lowers them into the checker IR.
//! The comparison passes only ever see [`ParsedFile`]s, so another IDL
//! dialect can be supported by adding a frontend here.

pub mod idl;

use std::path::{Path, PathBuf};

use crate::diagnostic::CheckerError;
use crate::ir::ParsedFile;

/// Trait for IDL frontends.
pub trait Frontend {
    /// Returns the format name (e.g., "idl").
    fn format(&self) -> &str;

    /// Returns file extensions this frontend handles.
    fn extensions(&self) -> &[&str];

    /// Parses one file, resolving its imports against `import_dirs` in order.
    fn parse_file(&mut self, path: &Path, import_dirs: &[PathBuf]) -> Result<ParsedFile, CheckerError>;

    /// Parses every matching file under `dir`, sorted by path.
    fn parse_directory(
        &mut self,
        dir: &Path,
        import_dirs: &[PathBuf],
    ) -> Result<Vec<ParsedFile>, CheckerError>;
}

/// Creates a frontend for the given format.
pub fn create_frontend(format: &str) -> Result<Box<dyn Frontend>, CheckerError> {
    match format {
        "idl" | "yaml" => Ok(Box::new(idl::IdlFrontend::new())),
        _ => Err(CheckerError::UnsupportedFormat {
            format: format.to_string(),
        }),
    }
}
