//! Token authentication and role-gated access for the factory management API.
//!
//! - `services::auth::TokenService` issues / verifies signed, time-bounded credentials
//! - `services::auth::AccessGate` puts "valid credential AND required role" in front of an operation
//! - `middleware::auth::require_role` is the same gate as an axum layer

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod repos;
pub mod services;
pub mod state;
