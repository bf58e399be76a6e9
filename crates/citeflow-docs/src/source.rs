use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::{DocumentError, Result};

/// Backing storage for documents
///
/// Implementations return raw page texts; the store derives everything else.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Text of every page of `document_id`, in page order
    async fn load_pages(&self, document_id: &str) -> Result<Vec<String>>;

    /// Ids currently present in storage
    async fn list_available(&self) -> Result<Vec<String>>;
}

/// Page source held entirely in memory
#[derive(Debug, Default)]
pub struct InMemorySource {
    documents: RwLock<HashMap<String, Vec<String>>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document<I, S>(mut self, document_id: impl Into<String>, pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.documents
            .get_mut()
            .insert(document_id.into(), pages.into_iter().map(Into::into).collect());
        self
    }

    pub async fn insert(&self, document_id: impl Into<String>, pages: Vec<String>) {
        self.documents.write().await.insert(document_id.into(), pages);
    }

    pub async fn remove(&self, document_id: &str) -> bool {
        self.documents.write().await.remove(document_id).is_some()
    }
}

#[async_trait]
impl PageSource for InMemorySource {
    async fn load_pages(&self, document_id: &str) -> Result<Vec<String>> {
        self.documents
            .read()
            .await
            .get(document_id)
            .cloned()
            .ok_or_else(|| DocumentError::NotFound(document_id.to_string()))
    }

    async fn list_available(&self) -> Result<Vec<String>> {
        Ok(self.documents.read().await.keys().cloned().collect())
    }
}
