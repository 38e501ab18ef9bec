//! Application services

mod audit_service;

pub use audit_service::{AuditService, AuditServiceTrait, CacheStatsSnapshot};
