pub mod audit;
pub mod error;
pub mod json;

pub use audit::{
    AuditRequest, ClearCacheResponse, FeedbackRequest, FeedbackResponse, NormalizeRequest,
    NormalizeResponse,
};
pub use error::{ApiError, ApiErrorResponse, ApiErrorType};
pub use json::Json;
