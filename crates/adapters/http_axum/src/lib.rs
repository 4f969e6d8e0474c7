//! # switchyard-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Accept action requests from producers (`POST /api/actions`,
//!   `POST /api/plans/cheapest`)
//! - Expose the audit trail (`GET /api/actions`, `GET /api/actions/{id}`)
//! - Map application errors into HTTP status codes
//!
//! Execution is never triggered over HTTP; the daemon's tick loop owns it.
//!
//! ## Dependency rule
//! Depends on `switchyard-app` (for port traits and services) and
//! `switchyard-domain` (for request/response mapping). Never leaks axum types
//! into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;

#[cfg(test)]
mod testing;
