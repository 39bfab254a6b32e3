//! Request handler module
//!
//! Responsible for request routing dispatch; summary semantics live in `crate::summary`.

pub mod router;

// Re-export main entry point
pub use router::{handle_request, status_for};
