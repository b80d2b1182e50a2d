use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::document::Document;
use crate::registry::SessionSummary;

/// Per-document line of the diagnostics report
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DocumentSummary {
    pub name: String,
    pub length: usize,
    pub attached_sessions: usize,
    pub session_ids: Vec<Uuid>,
    pub pending_requests: usize,
}

impl From<&Document> for DocumentSummary {
    fn from(doc: &Document) -> Self {
        Self {
            name: doc.name().to_string(),
            length: doc.len(),
            attached_sessions: doc.attached_count(),
            session_ids: doc.attached_sessions().copied().collect(),
            pending_requests: doc.queue().len(),
        }
    }
}

/// Response for diagnostics information
#[derive(Debug, Serialize, ToSchema)]
pub struct DiagnosticsResponse {
    pub n_conn: usize,
    pub n_documents: usize,
    pub n_cached_patterns: u64,
    pub documents: Vec<DocumentSummary>,
    pub sessions: Vec<SessionSummary>,
    pub cpu_usage: f32,
    pub memory_alloc: u64,
    pub memory_total: u64,
    pub memory_free: u64,
}
