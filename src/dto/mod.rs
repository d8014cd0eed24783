//! DTO modules that bridge services with templates and JSON responses.

pub mod activity;
pub mod review;
pub mod upload;
