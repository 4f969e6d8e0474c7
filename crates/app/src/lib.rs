//! # switchyard-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `ActionRepository` — append pending actions, query the audit trail,
//!     cancel superseded rows, record execution outcomes
//!   - `CredentialStore` — per-device credential lookup
//!   - `DeviceDriver` / `DriverFactory` — talk to one device family
//! - Define **driving/inbound ports** as use-case structs:
//!   - `ActionService` — producer interface and audit queries
//!   - `ExecutionEngine` — one resolve-then-execute cycle per call
//! - Orchestrate domain objects without knowing *how* persistence or IO works
//!
//! ## Dependency rule
//! Depends on `switchyard-domain` only.
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod engine;
pub mod ports;
pub mod services;

#[cfg(test)]
mod testing;
