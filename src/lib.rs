//! # Tweeter service
//!
//! Authentication core of the Tweeter social API: users sign up and log in
//! with email and password and receive JWT access and refresh tokens that
//! guard the rest of the API.
//!
//! ## Architecture
//!
//! - **domain**: user model and the `UserStore` port
//! - **application**: signup, login and refresh use-cases
//! - **auth**: token issuing and verification, password hashing, bearer middleware
//! - **infrastructure**: SeaORM and in-memory user stores
//! - **interfaces**: REST API
//! - **config**: TOML configuration with environment overrides

pub mod application;
pub mod auth;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod shared;

pub use config::{default_config_path, AppConfig};

pub use application::AuthService;
pub use infrastructure::{init_database, DatabaseConfig, InMemoryUserStore, SeaOrmUserStore};
pub use interfaces::create_api_router;
