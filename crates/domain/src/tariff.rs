//! Tariff planning: turn the cheapest half-hourly price slots into actions.
//!
//! Rates come from the caller; fetching them from an energy supplier is not
//! part of this crate.

use serde::{Deserialize, Serialize};

use crate::action::{Command, NewAction};
use crate::device::DeviceType;
use crate::error::{SwitchyardError, ValidationError};
use crate::time::Timestamp;

/// One price slot, as published by the supplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffRate {
    pub valid_from: Timestamp,
    pub valid_to: Timestamp,
    /// Price per kWh including VAT, in the supplier's minor unit.
    pub value_inc_vat: f64,
}

/// A contiguous period made of one or more selected slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: Timestamp,
    pub end: Timestamp,
}

/// What to schedule for the cheapest slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheapestPlan {
    pub device_type: DeviceType,
    pub device_id: String,
    /// How many slots to pick.
    pub slots: usize,
    /// Issued at the start of every window; `None` skips it.
    #[serde(default = "default_start")]
    pub start: Option<Command>,
    /// Issued at the end of every window; `None` skips it.
    #[serde(default = "default_end")]
    pub end: Option<Command>,
}

#[allow(clippy::unnecessary_wraps)]
fn default_start() -> Option<Command> {
    Some(Command::On)
}

#[allow(clippy::unnecessary_wraps)]
fn default_end() -> Option<Command> {
    Some(Command::Off)
}

impl CheapestPlan {
    #[must_use]
    pub fn new(device_type: DeviceType, device_id: impl Into<String>, slots: usize) -> Self {
        Self {
            device_type,
            device_id: device_id.into(),
            slots,
            start: default_start(),
            end: default_end(),
        }
    }

    /// Build the actions for `rates`, as seen at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`SwitchyardError::Validation`] when `slots` is zero, the device
    /// id is empty, or no slot ends after `now`.
    pub fn actions(&self, rates: &[TariffRate], now: Timestamp) -> Result<Vec<NewAction>, SwitchyardError> {
        if self.slots == 0 {
            return Err(ValidationError::NotPositive { field: "slots" }.into());
        }
        let selected = cheapest(rates, self.slots, now);
        if selected.is_empty() {
            return Err(ValidationError::NoFutureSlots.into());
        }

        let mut actions = Vec::new();
        for window in windows(&selected) {
            let edges = [(window.start, self.start), (window.end, self.end)];
            for (at, command) in edges {
                let Some(command) = command else { continue };
                actions.push(
                    NewAction::builder()
                        .created_at(now)
                        .scheduled_at(at)
                        .device_type(self.device_type)
                        .device_id(self.device_id.clone())
                        .command(command)
                        .build()?,
                );
            }
        }
        Ok(actions)
    }
}

/// The `n` cheapest slots that have not ended by `now`, cheapest first.
#[must_use]
pub fn cheapest(rates: &[TariffRate], n: usize, now: Timestamp) -> Vec<TariffRate> {
    let mut future: Vec<TariffRate> = rates
        .iter()
        .filter(|rate| rate.valid_to > now)
        .cloned()
        .collect();
    future.sort_by(|a, b| {
        a.value_inc_vat
            .total_cmp(&b.value_inc_vat)
            .then(a.valid_from.cmp(&b.valid_from))
    });
    future.truncate(n);
    future
}

/// Merge slots that touch or overlap into windows, ordered by start.
#[must_use]
pub fn windows(slots: &[TariffRate]) -> Vec<Window> {
    let mut sorted: Vec<Window> = slots
        .iter()
        .map(|slot| Window {
            start: slot.valid_from,
            end: slot.valid_to,
        })
        .collect();
    sorted.sort_by_key(|w| w.start);

    let mut merged: Vec<Window> = Vec::with_capacity(sorted.len());
    for window in sorted {
        match merged.last_mut() {
            Some(last) if window.start <= last.end => {
                last.end = last.end.max(window.end);
            }
            _ => merged.push(window),
        }
    }
    merged
}
