//! YAML IDL frontend.

pub mod ast;
pub mod parser;
pub mod to_ir;

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use walkdir::WalkDir;

use super::Frontend;
use crate::diagnostic::CheckerError;
use crate::ir::ParsedFile;
use ast::IdlDocument;
use parser::IdlParser;

/// Files that can appear in a snapshot but do not belong to the API:
/// test fixtures and platform files vendored from other projects.
pub const SKIPPED_FILES: &[&str] = &[
    "unittest.idl",
    "mozILocalization.idl",
    "mozILocaleService.idl",
    "mozIOSPreferences.idl",
    "nsICollation.idl",
    "nsIStringBundle.idl",
    "nsIScriptableUConv.idl",
    "nsITextToSubURI.idl",
];

/// IDL frontend implementation.
///
/// Raw documents are cached by path, so a file imported from many places
/// is read and parsed once.
pub struct IdlFrontend {
    parser: IdlParser,
    documents: HashMap<PathBuf, Rc<IdlDocument>>,
}

impl IdlFrontend {
    pub fn new() -> Self {
        Self {
            parser: IdlParser::new(),
            documents: HashMap::new(),
        }
    }

    fn load(&mut self, path: &Path) -> Result<Rc<IdlDocument>, CheckerError> {
        if let Some(doc) = self.documents.get(path) {
            return Ok(Rc::clone(doc));
        }
        let source = std::fs::read_to_string(path).map_err(|e| CheckerError::IoError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let doc = Rc::new(self.parser.parse(&source, path)?);
        self.documents.insert(path.to_path_buf(), Rc::clone(&doc));
        Ok(doc)
    }
}

impl Default for IdlFrontend {
    fn default() -> Self {
        Self::new()
    }
}

/// First search root that contains `import`.
fn resolve_import(import: &str, from: &Path, import_dirs: &[PathBuf]) -> Result<PathBuf, CheckerError> {
    import_dirs
        .iter()
        .map(|dir| dir.join(import))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| CheckerError::ImportNotFound {
            import: import.to_string(),
            file: from.to_path_buf(),
        })
}

fn is_skipped(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| SKIPPED_FILES.contains(&name))
}

impl Frontend for IdlFrontend {
    fn format(&self) -> &str {
        "idl"
    }

    fn extensions(&self) -> &[&str] {
        &["idl"]
    }

    fn parse_file(&mut self, path: &Path, import_dirs: &[PathBuf]) -> Result<ParsedFile, CheckerError> {
        let root = self.load(path)?;

        // Breadth-first over the import graph; each file joins once, so
        // repeated and mutually recursive imports are harmless.
        let mut visited: HashSet<PathBuf> = HashSet::from([path.to_path_buf()]);
        let mut pending: VecDeque<(String, PathBuf)> = root
            .imports
            .iter()
            .map(|import| (import.clone(), path.to_path_buf()))
            .collect();
        let mut imported: Vec<(PathBuf, Rc<IdlDocument>)> = Vec::new();

        while let Some((import, from)) = pending.pop_front() {
            let resolved = resolve_import(&import, &from, import_dirs)?;
            if !visited.insert(resolved.clone()) {
                continue;
            }
            let doc = self.load(&resolved)?;
            pending.extend(
                doc.imports
                    .iter()
                    .map(|next| (next.clone(), resolved.clone())),
            );
            imported.push((resolved, doc));
        }

        let imports: Vec<(&Path, &IdlDocument)> = imported
            .iter()
            .map(|(p, doc)| (p.as_path(), doc.as_ref()))
            .collect();
        to_ir::to_ir(path, &root, &imports)
    }

    fn parse_directory(
        &mut self,
        dir: &Path,
        import_dirs: &[PathBuf],
    ) -> Result<Vec<ParsedFile>, CheckerError> {
        if !dir.is_dir() {
            return Err(CheckerError::SnapshotNotFound {
                path: dir.to_path_buf(),
            });
        }

        let mut parsed_files = Vec::new();

        // Discover IDL files in a stable order
        for entry in WalkDir::new(dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
        {
            let entry = entry.map_err(|e| CheckerError::IoError {
                path: e.path().map(Path::to_path_buf).unwrap_or_else(|| dir.to_path_buf()),
                message: e.to_string(),
            })?;
            let path = entry.path();
            if !path.is_file() || is_skipped(path) {
                continue;
            }
            let matches_extension = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| self.extensions().contains(&ext));
            if matches_extension {
                parsed_files.push(self.parse_file(path, import_dirs)?);
            }
        }

        Ok(parsed_files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_directory_is_sorted_and_skips_list() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "b/second.idl", "");
        write(tmp.path(), "a/first.idl", "");
        write(tmp.path(), "a/unittest.idl", "not: [valid");
        write(tmp.path(), "a/notes.txt", "ignored");

        let mut frontend = IdlFrontend::new();
        let files = frontend
            .parse_directory(tmp.path(), &[tmp.path().to_path_buf()])
            .unwrap();
        let names: Vec<PathBuf> = files
            .iter()
            .map(|f| f.path.strip_prefix(tmp.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![PathBuf::from("a/first.idl"), PathBuf::from("b/second.idl")]
        );
    }

    #[test]
    fn test_imports_resolve_through_include_dirs() {
        let snapshot = TempDir::new().unwrap();
        let include = TempDir::new().unwrap();
        write(
            include.path(),
            "mongo/idl/basic_types.idl",
            "imports: [\"mongo/db/main.idl\"]\ntypes:\n  int: {bson_serialization_type: int}\n",
        );
        write(
            snapshot.path(),
            "mongo/db/main.idl",
            "imports: [\"mongo/idl/basic_types.idl\"]\nstructs:\n  S:\n    fields:\n      a: int\n",
        );

        let mut frontend = IdlFrontend::new();
        let dirs = vec![snapshot.path().to_path_buf(), include.path().to_path_buf()];
        let file = frontend
            .parse_file(&snapshot.path().join("mongo/db/main.idl"), &dirs)
            .unwrap();
        assert!(file.symbols.get("int").is_some());
        assert!(file.symbols.get_struct("S").is_some());
    }

    #[test]
    fn test_missing_import() {
        let snapshot = TempDir::new().unwrap();
        write(snapshot.path(), "a.idl", "imports: [\"nowhere.idl\"]\n");
        let mut frontend = IdlFrontend::new();
        let err = frontend
            .parse_file(&snapshot.path().join("a.idl"), &[snapshot.path().to_path_buf()])
            .unwrap_err();
        assert!(matches!(err, CheckerError::ImportNotFound { import, .. } if import == "nowhere.idl"));
    }

    #[test]
    fn test_missing_snapshot() {
        let mut frontend = IdlFrontend::new();
        let err = frontend
            .parse_directory(Path::new("/definitely/not/here"), &[])
            .unwrap_err();
        assert!(matches!(err, CheckerError::SnapshotNotFound { .. }));
    }
}
