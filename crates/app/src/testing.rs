//! In-memory port implementations shared by the unit tests of this crate.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use switchyard_domain::action::{Action, ActionStatus, NewAction, Outcome};
use switchyard_domain::credentials::Credentials;
use switchyard_domain::device::{DeviceType, PowerState};
use switchyard_domain::error::{ConfigurationError, ExecutionError, SwitchyardError};
use switchyard_domain::id::ActionId;
use switchyard_domain::time::Timestamp;

use crate::ports::{ActionRepository, CredentialStore, DeviceDriver, DriverFactory};

// ── Action repository ──────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct InMemoryActionRepo {
    rows: Arc<Mutex<Vec<Action>>>,
    fail_outcomes: Arc<AtomicBool>,
}

impl InMemoryActionRepo {
    pub fn all(&self) -> Vec<Action> {
        self.rows.lock().unwrap().clone()
    }

    pub fn get(&self, id: ActionId) -> Action {
        self.all().into_iter().find(|a| a.id == id).unwrap()
    }

    /// Make every `record_outcome` call fail with a storage error.
    pub fn fail_outcomes(&self) {
        self.fail_outcomes.store(true, Ordering::SeqCst);
    }

    fn append(rows: &mut Vec<Action>, action: NewAction) -> Action {
        let id = ActionId::new(i64::try_from(rows.len()).unwrap() + 1);
        let stored = Action {
            id,
            created_at: action.created_at,
            scheduled_at: action.scheduled_at,
            device_type: action.device_type,
            device_id: action.device_id,
            command: action.command,
            executed_at: None,
            status: ActionStatus::Pending,
            failure: None,
        };
        rows.push(stored.clone());
        stored
    }

    fn newest_first(mut actions: Vec<Action>, limit: u32) -> Vec<Action> {
        actions.sort_by(|a, b| b.id.cmp(&a.id));
        actions.truncate(limit as usize);
        actions
    }
}

fn storage_error() -> SwitchyardError {
    SwitchyardError::Storage(Box::new(std::io::Error::other("disk I/O error")))
}

impl ActionRepository for InMemoryActionRepo {
    fn insert(
        &self,
        action: NewAction,
    ) -> impl Future<Output = Result<Action, SwitchyardError>> + Send {
        let stored = Self::append(&mut self.rows.lock().unwrap(), action);
        async { Ok(stored) }
    }

    fn insert_many(
        &self,
        actions: Vec<NewAction>,
    ) -> impl Future<Output = Result<Vec<Action>, SwitchyardError>> + Send {
        let mut rows = self.rows.lock().unwrap();
        let stored: Vec<Action> = actions
            .into_iter()
            .map(|a| Self::append(&mut rows, a))
            .collect();
        async { Ok(stored) }
    }

    fn get_by_id(
        &self,
        id: ActionId,
    ) -> impl Future<Output = Result<Option<Action>, SwitchyardError>> + Send {
        let found = self.all().into_iter().find(|a| a.id == id);
        async { Ok(found) }
    }

    fn get_recent(
        &self,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<Action>, SwitchyardError>> + Send {
        let result = Self::newest_first(self.all(), limit);
        async { Ok(result) }
    }

    fn find_for_device(
        &self,
        device_id: &str,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<Action>, SwitchyardError>> + Send {
        let matching = self
            .all()
            .into_iter()
            .filter(|a| a.device_id == device_id)
            .collect();
        let result = Self::newest_first(matching, limit);
        async { Ok(result) }
    }

    fn find_pending(&self) -> impl Future<Output = Result<Vec<Action>, SwitchyardError>> + Send {
        let result: Vec<Action> = self
            .all()
            .into_iter()
            .filter(|a| a.status == ActionStatus::Pending)
            .collect();
        async { Ok(result) }
    }

    fn cancel(
        &self,
        ids: &[ActionId],
    ) -> impl Future<Output = Result<u64, SwitchyardError>> + Send {
        let mut rows = self.rows.lock().unwrap();
        let mut changed = 0;
        for row in rows.iter_mut() {
            if ids.contains(&row.id) && row.status == ActionStatus::Pending {
                row.status = ActionStatus::Cancelled;
                changed += 1;
            }
        }
        async move { Ok(changed) }
    }

    fn find_due(
        &self,
        now: Timestamp,
    ) -> impl Future<Output = Result<Vec<Action>, SwitchyardError>> + Send {
        let mut due: Vec<Action> = self.all().into_iter().filter(|a| a.is_due(now)).collect();
        due.sort_by(|a, b| b.scheduled_at.cmp(&a.scheduled_at).then(b.id.cmp(&a.id)));
        async { Ok(due) }
    }

    fn record_outcome(
        &self,
        id: ActionId,
        outcome: &Outcome,
        executed_at: Timestamp,
    ) -> impl Future<Output = Result<bool, SwitchyardError>> + Send {
        let result = if self.fail_outcomes.load(Ordering::SeqCst) {
            Err(storage_error())
        } else {
            let mut rows = self.rows.lock().unwrap();
            match rows
                .iter_mut()
                .find(|a| a.id == id && a.status == ActionStatus::Pending)
            {
                Some(row) => {
                    row.status = outcome.status();
                    row.failure = outcome.failure().cloned();
                    row.executed_at = row.status.records_execution().then_some(executed_at);
                    Ok(true)
                }
                None => Ok(false),
            }
        };
        async { result }
    }
}

// ── Credential store ───────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryCredentials {
    entries: HashMap<(DeviceType, String), Credentials>,
    lookups: AtomicUsize,
}

impl InMemoryCredentials {
    pub fn with(mut self, device_type: DeviceType, device_id: &str, credentials: Credentials) -> Self {
        self.entries
            .insert((device_type, device_id.to_string()), credentials);
        self
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl CredentialStore for InMemoryCredentials {
    fn lookup(
        &self,
        device_type: DeviceType,
        device_id: &str,
    ) -> impl Future<Output = Result<Credentials, ConfigurationError>> + Send {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let result = self
            .entries
            .get(&(device_type, device_id.to_string()))
            .cloned()
            .ok_or_else(|| ConfigurationError::MissingCredentials {
                device_type,
                device_id: device_id.to_string(),
            });
        async { result }
    }
}

// ── Drivers ────────────────────────────────────────────────────────

struct FakeDevice {
    state: PowerState,
    stuck: bool,
    unreachable: bool,
    calls: Vec<String>,
}

/// Scriptable driver; clones share one simulated device.
#[derive(Clone)]
pub struct FakeDriver {
    device: Arc<Mutex<FakeDevice>>,
}

impl FakeDriver {
    fn with(state: PowerState, stuck: bool, unreachable: bool) -> Self {
        Self {
            device: Arc::new(Mutex::new(FakeDevice {
                state,
                stuck,
                unreachable,
                calls: Vec::new(),
            })),
        }
    }

    pub fn new(state: PowerState) -> Self {
        Self::with(state, false, false)
    }

    /// Accepts commands but never changes state.
    pub fn stuck(state: PowerState) -> Self {
        Self::with(state, true, false)
    }

    /// Every call fails with a network error.
    pub fn unreachable() -> Self {
        Self::with(PowerState::Off, false, true)
    }

    pub fn state(&self) -> PowerState {
        self.device.lock().unwrap().state
    }

    pub fn calls(&self) -> Vec<String> {
        self.device.lock().unwrap().calls.clone()
    }
}

impl DeviceDriver for FakeDriver {
    fn switch(
        &self,
        state: PowerState,
    ) -> impl Future<Output = Result<(), ExecutionError>> + Send {
        let mut device = self.device.lock().unwrap();
        device.calls.push(format!("switch:{state}"));
        let result = if device.unreachable {
            Err(ExecutionError::network(std::io::Error::other("connection refused")))
        } else {
            if !device.stuck {
                device.state = state;
            }
            Ok(())
        };
        async { result }
    }

    fn status(&self) -> impl Future<Output = Result<PowerState, ExecutionError>> + Send {
        let mut device = self.device.lock().unwrap();
        device.calls.push("status".to_string());
        let result = if device.unreachable {
            Err(ExecutionError::network(std::io::Error::other("connection refused")))
        } else {
            Ok(device.state)
        };
        async { result }
    }
}

/// Hands out registered [`FakeDriver`]s; requires a `host` credential.
#[derive(Default)]
pub struct FakeFactory {
    devices: Mutex<HashMap<String, FakeDriver>>,
    built: Mutex<Vec<String>>,
}

impl FakeFactory {
    pub fn with(self, device_id: &str, driver: FakeDriver) -> Self {
        self.devices
            .lock()
            .unwrap()
            .insert(device_id.to_string(), driver);
        self
    }

    pub fn driver(&self, device_id: &str) -> FakeDriver {
        self.devices.lock().unwrap()[device_id].clone()
    }

    pub fn built(&self) -> Vec<String> {
        self.built.lock().unwrap().clone()
    }
}

impl DriverFactory for FakeFactory {
    type Driver = FakeDriver;

    fn build(
        &self,
        _device_type: DeviceType,
        device_id: &str,
        credentials: Credentials,
    ) -> Result<FakeDriver, ExecutionError> {
        credentials.require("host")?;
        self.built.lock().unwrap().push(device_id.to_string());
        let driver = self
            .devices
            .lock()
            .unwrap()
            .entry(device_id.to_string())
            .or_insert_with(|| FakeDriver::new(PowerState::Off))
            .clone();
        Ok(driver)
    }
}

pub fn host_credentials() -> Credentials {
    Credentials::new().with("host", "192.168.1.50")
}
