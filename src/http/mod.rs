//! HTTP protocol layer module
//!
//! Response builders and cache validation, independent of summary semantics.

pub mod cache;
pub mod response;

// Re-export commonly used types
pub use response::{
    build_304_response, build_404_response, build_405_response, build_health_response,
    build_json_response, build_options_response, CommonHeaders, JSON_CONTENT_TYPE,
};
