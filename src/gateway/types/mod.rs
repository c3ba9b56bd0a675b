//! Gateway types module
//!
//! ## Submodules
//! - [`response`]: `ApiResponse<T>` envelope and error codes
//! - [`error`]: `ApiError` and the handler result helpers

pub mod error;
pub mod response;

// Re-export commonly used types at module root
pub use error::{ApiError, ApiResult, created, ok};
pub use response::{ApiResponse, error_codes};
