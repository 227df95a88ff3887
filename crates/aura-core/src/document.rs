//! Documents and the workspace content capability
//!
//! Workspace tabs hold arbitrary panels. A panel that edits a document exposes
//! it through [`HasDocument`]; everything else simply does not, and the
//! registry treats that as a normal case.

use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: Uuid,
    pub name: String,
}

impl Document {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

/// Content that edits a document
pub trait HasDocument {
    fn document(&self) -> &Arc<Document>;
}

/// Anything that can sit in a workspace tab
pub trait WorkspaceContent: fmt::Debug + Send + Sync {
    /// The document capability, if this content has one
    fn as_document_host(&self) -> Option<&dyn HasDocument> {
        None
    }
}

/// Editor panel for a single document
#[derive(Debug, Clone)]
pub struct DocumentView {
    document: Arc<Document>,
}

impl DocumentView {
    pub fn new(document: Arc<Document>) -> Self {
        Self { document }
    }
}

impl HasDocument for DocumentView {
    fn document(&self) -> &Arc<Document> {
        &self.document
    }
}

impl WorkspaceContent for DocumentView {
    fn as_document_host(&self) -> Option<&dyn HasDocument> {
        Some(self)
    }
}
