//! In-memory repository and request helpers for the handler tests.

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Request, Response};
use http_body_util::BodyExt;

use switchyard_app::ports::ActionRepository;
use switchyard_app::services::ActionService;
use switchyard_domain::action::{Action, ActionStatus, NewAction, Outcome};
use switchyard_domain::error::SwitchyardError;
use switchyard_domain::id::ActionId;
use switchyard_domain::time::Timestamp;

use crate::state::AppState;

#[derive(Clone, Default)]
pub struct MemoryRepo {
    rows: Arc<Mutex<Vec<Action>>>,
}

impl MemoryRepo {
    pub fn all(&self) -> Vec<Action> {
        self.rows.lock().unwrap().clone()
    }

    fn newest_first(mut actions: Vec<Action>, limit: u32) -> Vec<Action> {
        actions.sort_by(|a, b| b.id.cmp(&a.id));
        actions.truncate(limit as usize);
        actions
    }
}

impl ActionRepository for MemoryRepo {
    async fn insert(&self, action: NewAction) -> Result<Action, SwitchyardError> {
        let mut rows = self.rows.lock().unwrap();
        let stored = Action {
            id: ActionId::new(i64::try_from(rows.len()).unwrap() + 1),
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
        Ok(stored)
    }

    async fn insert_many(&self, actions: Vec<NewAction>) -> Result<Vec<Action>, SwitchyardError> {
        let mut stored = Vec::with_capacity(actions.len());
        for action in actions {
            stored.push(self.insert(action).await?);
        }
        Ok(stored)
    }

    async fn get_by_id(&self, id: ActionId) -> Result<Option<Action>, SwitchyardError> {
        Ok(self.all().into_iter().find(|a| a.id == id))
    }

    async fn get_recent(&self, limit: u32) -> Result<Vec<Action>, SwitchyardError> {
        Ok(Self::newest_first(self.all(), limit))
    }

    async fn find_for_device(
        &self,
        device_id: &str,
        limit: u32,
    ) -> Result<Vec<Action>, SwitchyardError> {
        let matching = self
            .all()
            .into_iter()
            .filter(|a| a.device_id == device_id)
            .collect();
        Ok(Self::newest_first(matching, limit))
    }

    async fn find_pending(&self) -> Result<Vec<Action>, SwitchyardError> {
        Ok(vec![])
    }

    async fn cancel(&self, _ids: &[ActionId]) -> Result<u64, SwitchyardError> {
        Ok(0)
    }

    async fn find_due(&self, _now: Timestamp) -> Result<Vec<Action>, SwitchyardError> {
        Ok(vec![])
    }

    async fn record_outcome(
        &self,
        _id: ActionId,
        _outcome: &Outcome,
        _executed_at: Timestamp,
    ) -> Result<bool, SwitchyardError> {
        Ok(false)
    }
}

/// A repository whose every call fails.
pub struct BrokenRepo;

fn storage_error() -> SwitchyardError {
    SwitchyardError::Storage(Box::new(std::io::Error::other("database is locked")))
}

impl ActionRepository for BrokenRepo {
    async fn insert(&self, _action: NewAction) -> Result<Action, SwitchyardError> {
        Err(storage_error())
    }
    async fn insert_many(&self, _actions: Vec<NewAction>) -> Result<Vec<Action>, SwitchyardError> {
        Err(storage_error())
    }
    async fn get_by_id(&self, _id: ActionId) -> Result<Option<Action>, SwitchyardError> {
        Err(storage_error())
    }
    async fn get_recent(&self, _limit: u32) -> Result<Vec<Action>, SwitchyardError> {
        Err(storage_error())
    }
    async fn find_for_device(
        &self,
        _device_id: &str,
        _limit: u32,
    ) -> Result<Vec<Action>, SwitchyardError> {
        Err(storage_error())
    }
    async fn find_pending(&self) -> Result<Vec<Action>, SwitchyardError> {
        Err(storage_error())
    }
    async fn cancel(&self, _ids: &[ActionId]) -> Result<u64, SwitchyardError> {
        Err(storage_error())
    }
    async fn find_due(&self, _now: Timestamp) -> Result<Vec<Action>, SwitchyardError> {
        Err(storage_error())
    }
    async fn record_outcome(
        &self,
        _id: ActionId,
        _outcome: &Outcome,
        _executed_at: Timestamp,
    ) -> Result<bool, SwitchyardError> {
        Err(storage_error())
    }
}

pub fn test_state() -> (AppState<MemoryRepo>, MemoryRepo) {
    let repo = MemoryRepo::default();
    (AppState::new(ActionService::new(repo.clone())), repo)
}

pub fn json_request(method: &str, uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}
