// PDF discovery and text extraction

use std::path::{Path, PathBuf};

use lopdf::Document;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::{Metadata, SourceDocument};
use crate::types::{AppError, AppResult};

pub struct DocumentProcessor;

impl DocumentProcessor {
    /// All `*.pdf` files under `directory`, recursively, in path order.
    /// A missing directory yields an empty list.
    pub fn discover_pdfs(directory: &Path) -> Vec<PathBuf> {
        if !directory.exists() {
            warn!(directory = %directory.display(), "PDF directory does not exist");
            return Vec::new();
        }

        let mut files: Vec<PathBuf> = WalkDir::new(directory)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| ext.eq_ignore_ascii_case("pdf"))
                    .unwrap_or(false)
            })
            .collect();
        files.sort();
        files
    }

    /// Extract one `SourceDocument` per page that has text
    pub fn load_pdf(path: &Path) -> AppResult<Vec<SourceDocument>> {
        let document = Document::load(path)
            .map_err(|e| AppError::Ingestion(format!("Failed to load {}: {}", path.display(), e)))?;

        let source_file = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut pages = Vec::new();
        for page_number in document.get_pages().keys() {
            let text = match document.extract_text(&[*page_number]) {
                Ok(text) => text,
                Err(e) => {
                    debug!(file = %source_file, page = page_number, error = %e, "Skipping unreadable page");
                    continue;
                }
            };
            if text.trim().is_empty() {
                continue;
            }

            let mut metadata = Metadata::new();
            metadata.insert("source_file".to_string(), source_file.clone());
            metadata.insert("file_type".to_string(), "pdf".to_string());
            metadata.insert("page".to_string(), page_number.to_string());
            pages.push(SourceDocument { text, metadata });
        }

        Ok(pages)
    }

    /// Load every PDF under `directory`. Files that fail to load are logged
    /// and skipped.
    pub fn process_directory(directory: &Path) -> Vec<SourceDocument> {
        let files = Self::discover_pdfs(directory);
        info!(count = files.len(), directory = %directory.display(), "Found PDFs to process");

        let mut documents = Vec::new();
        for file in files {
            match Self::load_pdf(&file) {
                Ok(pages) => documents.extend(pages),
                Err(e) => warn!(error = %e, "Error loading PDF"),
            }
        }
        documents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_discover_is_recursive_and_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("reports/2023")).unwrap();
        fs::write(dir.path().join("a.pdf"), b"x").unwrap();
        fs::write(dir.path().join("reports/2023/B.PDF"), b"x").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        let found = DocumentProcessor::discover_pdfs(dir.path());
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"a.pdf".to_string()));
        assert!(names.contains(&"B.PDF".to_string()));
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(DocumentProcessor::discover_pdfs(&dir.path().join("absent")).is_empty());
    }

    #[test]
    fn test_corrupt_pdf_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("broken.pdf"), b"not really a pdf").unwrap();

        assert!(DocumentProcessor::load_pdf(&dir.path().join("broken.pdf")).is_err());
        assert!(DocumentProcessor::process_directory(dir.path()).is_empty());
    }
}
