//! File discovery and text extraction for the document store.
//!
//! Files are classified by extension into a [`FileKind`]; each kind has its
//! own extraction rule. Notebooks are parsed as JSON and their markdown and
//! code cell sources joined with blank lines; cell outputs are ignored.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use walkdir::WalkDir;

use dobi_types::document::{FileFailure, FileKind};
use dobi_types::error::DocumentError;

/// Collect every regular file under `dir`, in sorted path order.
///
/// Unreadable directory entries are returned as failures rather than
/// aborting the walk.
pub fn discover(dir: &Path) -> Result<(Vec<PathBuf>, Vec<FileFailure>), DocumentError> {
    if !dir.is_dir() {
        return Err(DocumentError::Io(format!(
            "{} is not a directory",
            dir.display()
        )));
    }

    let mut files = Vec::new();
    let mut failures = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        match entry {
            Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
            Ok(_) => {}
            Err(e) => failures.push(FileFailure {
                path: e.path().map(Path::to_path_buf).unwrap_or_else(|| dir.to_path_buf()),
                reason: DocumentError::Io(e.to_string()).to_string(),
            }),
        }
    }
    files.sort();
    Ok((files, failures))
}

/// Classify a path by extension, honouring the enabled extension list.
pub fn classify(path: &Path, enabled: &[String]) -> Result<FileKind, DocumentError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if !enabled.iter().any(|e| e.eq_ignore_ascii_case(&ext)) {
        return Err(DocumentError::UnsupportedFileType(ext));
    }
    FileKind::from_extension(&ext).ok_or(DocumentError::UnsupportedFileType(ext))
}

/// Turn raw file bytes into the text that gets chunked.
pub fn extract_text(kind: FileKind, bytes: Vec<u8>) -> Result<String, DocumentError> {
    let text = String::from_utf8(bytes).map_err(|_| DocumentError::InvalidUtf8)?;
    match kind {
        FileKind::Text | FileKind::Markdown => Ok(text),
        FileKind::Notebook => notebook_text(&text),
    }
}

#[derive(Deserialize)]
struct Notebook {
    cells: Vec<NotebookCell>,
}

#[derive(Deserialize)]
struct NotebookCell {
    cell_type: String,
    #[serde(default)]
    source: CellSource,
}

/// Notebook cell source is either one string or a list of lines.
#[derive(Deserialize)]
#[serde(untagged)]
enum CellSource {
    Text(String),
    Lines(Vec<String>),
}

impl Default for CellSource {
    fn default() -> Self {
        CellSource::Text(String::new())
    }
}

impl CellSource {
    fn into_text(self) -> String {
        match self {
            CellSource::Text(s) => s,
            CellSource::Lines(lines) => lines.concat(),
        }
    }
}

fn notebook_text(raw: &str) -> Result<String, DocumentError> {
    let notebook: Notebook =
        serde_json::from_str(raw).map_err(|e| DocumentError::MalformedNotebook(e.to_string()))?;

    let parts: Vec<String> = notebook
        .cells
        .into_iter()
        .filter(|c| c.cell_type == "markdown" || c.cell_type == "code")
        .map(|c| c.source.into_text())
        .filter(|s| !s.trim().is_empty())
        .collect();

    Ok(parts.join("\n\n"))
}
