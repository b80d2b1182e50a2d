use crate::models::{DiagnosticsResponse, DocumentSummary};
use crate::state::AppState;
use axum::{extract::State, Json};
use parking_lot::Mutex;
use std::sync::{Arc, OnceLock};
use sysinfo::System;
use tracing::info;

static SYSTEM_MONITOR: OnceLock<Mutex<System>> = OnceLock::new();

/// Snapshot of sessions, documents and process resources
pub async fn diagnostics(State(state): State<Arc<AppState>>) -> Json<DiagnosticsResponse> {
    // Store lock is released before each document is locked in turn
    let documents: Vec<DocumentSummary> = state
        .documents
        .all()
        .iter()
        .map(|doc| DocumentSummary::from(&*doc.lock()))
        .collect();
    let sessions = state.sessions.summaries();
    let n_conn = state.sessions.connected_count();

    // System stats
    let (cpu_usage, memory_alloc, memory_free, memory_total) = {
        let mut sys = SYSTEM_MONITOR
            .get_or_init(|| Mutex::new(System::new_all()))
            .lock();
        sys.refresh_cpu();
        sys.refresh_memory();
        (
            sys.global_cpu_info().cpu_usage(),
            sys.used_memory(),
            sys.free_memory(),
            sys.total_memory(),
        )
    };

    info!(
        "Diagnostics: CPU: {:.2}%, Mem: {}/{} MB (Free: {} MB), Conn: {}, Docs: {}",
        cpu_usage,
        memory_alloc / 1024 / 1024,
        memory_total / 1024 / 1024,
        memory_free / 1024 / 1024,
        n_conn,
        documents.len()
    );

    Json(DiagnosticsResponse {
        n_conn,
        n_documents: documents.len(),
        n_cached_patterns: state.patterns.entry_count(),
        documents,
        sessions,
        cpu_usage,
        memory_alloc,
        memory_total,
        memory_free,
    })
}
