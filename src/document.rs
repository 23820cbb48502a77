// SPDX-License-Identifier: MIT OR Apache-2.0

//! Document model and collection loading.
//!
//! A [`Document`] is an immutable, already-extracted text source: an
//! identifier plus an ordered list of pages. PDF (or other file format)
//! decoding is an external concern; docrank consumes plain text where
//! pages are separated by form-feed characters.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Page separator in extracted text files.
pub const PAGE_SEPARATOR: char = '\u{c}';

/// An immutable ingested document: a name and its ordered pages.
#[derive(Debug, Clone)]
pub struct Document {
    /// Source identifier (usually the file name).
    pub name: String,
    /// Ordered raw page texts. May be empty for a blank document.
    pub pages: Vec<String>,
}

impl Document {
    /// Builds a document from raw text, splitting pages on form feeds.
    ///
    /// Text without any form feed becomes a single page. Pages that are
    /// entirely whitespace are kept (page numbering must stay aligned
    /// with the source) but contribute no sections downstream.
    pub fn from_text(name: impl Into<String>, text: &str) -> Self {
        let pages = if text.trim().is_empty() {
            Vec::new()
        } else {
            text.split(PAGE_SEPARATOR).map(|p| p.to_string()).collect()
        };
        Self {
            name: name.into(),
            pages,
        }
    }
}

/// A document that could not be loaded or processed.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DocumentFailure {
    /// Source identifier of the failed document.
    pub document: String,
    /// Human-readable failure description.
    pub error: String,
}

/// Collection manifest: persona, task and the documents to rank.
///
/// Mirrors the common "challenge input" layout so existing collections
/// can be fed in unchanged.
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionManifest {
    pub persona: PersonaSpec,
    pub job_to_be_done: JobSpec,
    #[serde(default)]
    pub documents: Vec<DocumentEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PersonaSpec {
    pub role: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobSpec {
    pub task: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentEntry {
    pub filename: String,
    #[serde(default)]
    pub title: Option<String>,
}

impl CollectionManifest {
    /// Loads a manifest from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse manifest: {}", path.display()))
    }
}

/// Loads the documents named by a manifest from `docs_dir`.
///
/// A document that cannot be read is recorded as a failure and skipped;
/// one bad input never aborts the collection.
pub fn load_documents(
    entries: &[DocumentEntry],
    docs_dir: &Path,
) -> (Vec<Document>, Vec<DocumentFailure>) {
    let mut documents = Vec::with_capacity(entries.len());
    let mut failures = Vec::new();

    for entry in entries {
        let path = docs_dir.join(&entry.filename);
        match std::fs::read_to_string(&path) {
            Ok(text) => documents.push(Document::from_text(&entry.filename, &text)),
            Err(err) => {
                tracing::warn!(document = %entry.filename, %err, "skipping unreadable document");
                failures.push(DocumentFailure {
                    document: entry.filename.clone(),
                    error: err.to_string(),
                });
            }
        }
    }

    (documents, failures)
}

/// Scans a directory for `.txt` documents when no manifest is given.
///
/// Paths are returned sorted for deterministic run order.
pub fn scan_documents_dir(dir: &Path) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"))
        })
        .map(|e| e.into_path())
        .collect();
    paths.sort();
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn from_text_splits_pages_on_form_feed() {
        let doc = Document::from_text("a.txt", "page one\u{c}page two\u{c}page three");
        assert_eq!(doc.pages.len(), 3);
        assert_eq!(doc.pages[1], "page two");
    }

    #[test]
    fn from_text_single_page_without_form_feed() {
        let doc = Document::from_text("a.txt", "just one page of text");
        assert_eq!(doc.pages.len(), 1);
    }

    #[test]
    fn from_text_blank_document_has_no_pages() {
        let doc = Document::from_text("empty.txt", "   \n  ");
        assert!(doc.pages.is_empty());
    }

    #[test]
    fn load_documents_records_missing_file_as_failure() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("ok.txt"), "hello world").unwrap();

        let entries = vec![
            DocumentEntry {
                filename: "ok.txt".into(),
                title: None,
            },
            DocumentEntry {
                filename: "missing.txt".into(),
                title: None,
            },
        ];

        let (docs, failures) = load_documents(&entries, dir.path());
        assert_eq!(docs.len(), 1);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].document, "missing.txt");
    }

    #[test]
    fn scan_documents_dir_is_sorted_and_txt_only() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.txt"), "b").unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::write(dir.path().join("notes.md"), "md").unwrap();

        let paths = scan_documents_dir(dir.path());
        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with("a.txt"));
        assert!(paths[1].ends_with("b.txt"));
    }
}
