//! Identity module: signup, login and token refresh
//!
//! Contains the `AuthService` which orchestrates the credential flows.

pub mod service;

pub use service::{AuthResult, AuthService, Signup};
