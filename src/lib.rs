//! User Directory - HTTP service for user records
//!
//! Exposes create, read, update and delete over a single "user" resource
//! backed by PostgreSQL, enforcing one live record per username and per
//! email.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: User entity, request payload and response views
//! - **services**: The directory operations (check-then-act against the store)
//! - **infra**: Database, migrations and repositories
//! - **api**: HTTP handlers, extractors and routes
//! - **types**: Response envelopes
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Start without a database
//! cargo run -- serve --in-memory
//!
//! # Run migrations
//! cargo run -- migrate up
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::{create_router, AppState};
pub use config::Config;
pub use domain::{User, UserPayload};
pub use errors::{AppError, AppResult};
