//! HTTP REST API
//!
//! - `common`: response envelope and validated JSON extractor
//! - `modules`: handlers grouped by resource
//! - `router`: route table and middleware stack

pub mod common;
pub mod modules;
pub mod router;

pub use router::create_api_router;
