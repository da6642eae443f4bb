//! Course Service Integration
//!
//! Access to the remote course service through a common trait interface.
//!
//! # Usage
//!
//! ```ignore
//! use buddy_conductor::backend::{CourseService, HttpCourseService, ServiceConfig};
//!
//! let service = HttpCourseService::new(ServiceConfig::new("http://localhost:8000"))?;
//! let outcome = service.submit_query("python for data analysis").await?;
//! ```

mod http;
mod traits;

pub use http::{
    HttpCourseService, ServiceConfig, DEFAULT_BASE_URL, DEFAULT_SEARCH_PATH,
    DEFAULT_SUGGESTIONS_PATH, DEFAULT_TIMEOUT_SECS,
};
pub use traits::{CourseService, SearchOutcome, ServiceError, EMPTY_SUCCESS_PACING_TEXT};
