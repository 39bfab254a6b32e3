//! Attendance summary server
//!
//! Serves pre-generated monthly attendance and weekly summary JSON files by
//! `month` and `type` query parameters over HTTP.

pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
pub mod summary;
