//! # switchyard-adapter-devices
//!
//! Device drivers for the supported device families.
//!
//! ## Provided drivers
//!
//! | Device type | Driver | Transport |
//! |-------------|--------|-----------|
//! | `virtual` | [`VirtualSwitch`] | in-process, state shared through the registry |
//! | `sonoff` | [`SonoffDriver`] | eWeLink cloud API v2 |
//! | `shelly` | [`ShellyDriver`] | Shelly Gen1 local HTTP (`/relay/<channel>`) |
//! | `tasmota` | [`TasmotaDriver`] | Tasmota local HTTP (`/cm?cmnd=Power`) |
//!
//! [`DeviceRegistry`] implements the `DriverFactory` port: it owns one shared
//! HTTP client and builds a fresh driver from credentials for every action.
//!
//! ## Dependency rule
//!
//! Depends on `switchyard-app` (port traits) and `switchyard-domain` only.

mod error;
mod http;
mod registry;
mod shelly;
mod sonoff;
mod tasmota;
mod virtual_switch;

pub use error::DeviceError;
pub use registry::{AnyDriver, DeviceRegistry};
pub use shelly::ShellyDriver;
pub use sonoff::SonoffDriver;
pub use tasmota::TasmotaDriver;
pub use virtual_switch::{Fault, VirtualStates, VirtualSwitch};
