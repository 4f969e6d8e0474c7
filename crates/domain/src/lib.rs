//! # switchyard-domain
//!
//! Pure domain model for the switchyard action scheduler.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Actions** (time-stamped device commands with a lifecycle status)
//! - Define **Device types** and **power states** (the closed driver registry keys)
//! - Define **Credentials** (opaque per-driver configuration)
//! - Resolve **conflicts** between pending actions for the same device and time
//! - Plan actions from **tariff** slots
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod action;
pub mod conflict;
pub mod credentials;
pub mod device;
pub mod tariff;
