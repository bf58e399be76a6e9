use async_trait::async_trait;
use lopdf::Document as PdfDocument;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{DocumentError, Result};
use crate::source::PageSource;

const PDF_EXTENSION: &str = "pdf";

/// Directory of `{document_id}.pdf` files
#[derive(Debug, Clone)]
pub struct PdfDirectory {
    root: PathBuf,
}

impl PdfDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the PDF backing `document_id`.
    ///
    /// Ids that could escape the directory are reported as not found.
    pub fn pdf_path(&self, document_id: &str) -> Result<PathBuf> {
        if !is_safe_id(document_id) {
            return Err(DocumentError::NotFound(document_id.to_string()));
        }
        Ok(self.root.join(format!("{document_id}.{PDF_EXTENSION}")))
    }

    /// Raw file bytes, for serving the original PDF
    pub async fn read_bytes(&self, document_id: &str) -> Result<Vec<u8>> {
        let path = self.pdf_path(document_id)?;
        tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => DocumentError::NotFound(document_id.to_string()),
            _ => DocumentError::Io(e),
        })
    }
}

#[async_trait]
impl PageSource for PdfDirectory {
    async fn load_pages(&self, document_id: &str) -> Result<Vec<String>> {
        let path = self.pdf_path(document_id)?;
        if !tokio::fs::try_exists(&path).await? {
            return Err(DocumentError::NotFound(document_id.to_string()));
        }

        let id = document_id.to_string();
        let pages = tokio::task::spawn_blocking(move || extract_pages(&path))
            .await
            .map_err(|e| DocumentError::Extraction {
                document_id: id.clone(),
                message: e.to_string(),
            })?
            .map_err(|message| DocumentError::Extraction {
                document_id: id.clone(),
                message,
            })?;

        debug!(document_id = %document_id, pages = pages.len(), "Extracted PDF text");
        Ok(pages)
    }

    async fn list_available(&self) -> Result<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(directory = %self.root.display(), "Document directory does not exist");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(PDF_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                ids.push(stem.to_string());
            }
        }
        Ok(ids)
    }
}

fn is_safe_id(document_id: &str) -> bool {
    !document_id.is_empty()
        && !document_id.contains(['/', '\\', '\0'])
        && !document_id.contains("..")
}

fn extract_pages(path: &Path) -> std::result::Result<Vec<String>, String> {
    let doc = PdfDocument::load(path).map_err(|e| format!("failed to load PDF: {e}"))?;

    // Pages whose content stream can't be decoded count as empty
    let pages = doc
        .get_pages()
        .keys()
        .map(|&number| doc.extract_text(&[number]).unwrap_or_default())
        .collect();

    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_ids() {
        assert!(is_safe_id("annual_report"));
        assert!(is_safe_id("report-2024.v2"));
        assert!(!is_safe_id(""));
        assert!(!is_safe_id("../secrets"));
        assert!(!is_safe_id("nested/doc"));
        assert!(!is_safe_id("nested\\doc"));
    }

    #[test]
    fn test_pdf_path() {
        let dir = PdfDirectory::new("/data/pdfs");
        assert_eq!(dir.pdf_path("doc_a").unwrap(), PathBuf::from("/data/pdfs/doc_a.pdf"));
        assert!(dir.pdf_path("../etc/passwd").unwrap_err().is_not_found());
    }
}
