//! Application state for shared services

use std::sync::Arc;

use crate::infrastructure::services::AuditServiceTrait;

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub audit_service: Arc<dyn AuditServiceTrait>,
}

impl AppState {
    pub fn new(audit_service: Arc<dyn AuditServiceTrait>) -> Self {
        Self { audit_service }
    }
}
