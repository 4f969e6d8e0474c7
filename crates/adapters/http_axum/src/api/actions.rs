//! JSON REST handlers for actions.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use switchyard_app::ports::ActionRepository;
use switchyard_domain::action::{Action, NewAction};
use switchyard_domain::device::DeviceType;
use switchyard_domain::error::{SwitchyardError, ValidationError};
use switchyard_domain::id::ActionId;
use switchyard_domain::time::Timestamp;

use crate::error::ApiError;
use crate::state::AppState;

/// Page size when the caller gives no `limit`.
pub const DEFAULT_LIMIT: u32 = 50;

/// Device type given either by name (`"shelly"`) or by stored code (`2`).
///
/// Codes this build does not know are accepted; the action then fails when
/// it executes.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum DeviceTypeParam {
    Name(DeviceType),
    Code(i64),
}

impl DeviceTypeParam {
    fn code(&self) -> i64 {
        match self {
            Self::Name(device_type) => device_type.code(),
            Self::Code(code) => *code,
        }
    }
}

/// Request body for requesting an action.
#[derive(Debug, Deserialize)]
pub struct CreateActionRequest {
    pub device_type: DeviceTypeParam,
    pub device_id: String,
    pub command: String,
    /// Defaults to now.
    pub scheduled_at: Option<Timestamp>,
}

/// Query string of the list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<u32>,
    pub device_id: Option<String>,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<Action>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get endpoint.
pub enum GetResponse {
    Ok(Json<Action>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<Action>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// `GET /api/actions`
pub async fn list<R>(
    State(state): State<AppState<R>>,
    Query(query): Query<ListQuery>,
) -> Result<ListResponse, ApiError>
where
    R: ActionRepository + Send + Sync + 'static,
{
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    let actions = match query.device_id {
        Some(device_id) => {
            state
                .action_service
                .list_for_device(&device_id, limit)
                .await?
        }
        None => state.action_service.list_recent(limit).await?,
    };
    Ok(ListResponse::Ok(Json(actions)))
}

/// `GET /api/actions/{id}`
pub async fn get<R>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
) -> Result<GetResponse, ApiError>
where
    R: ActionRepository + Send + Sync + 'static,
{
    let action_id = ActionId::from_str(&id)
        .map_err(|_| ApiError::from(SwitchyardError::from(ValidationError::InvalidId(id))))?;
    let action = state.action_service.get_action(action_id).await?;
    Ok(GetResponse::Ok(Json(action)))
}

/// `POST /api/actions`
pub async fn create<R>(
    State(state): State<AppState<R>>,
    Json(req): Json<CreateActionRequest>,
) -> Result<CreateResponse, ApiError>
where
    R: ActionRepository + Send + Sync + 'static,
{
    let mut builder = NewAction::builder()
        .device_type_code(req.device_type.code())
        .device_id(req.device_id)
        .raw_command(req.command);
    if let Some(scheduled_at) = req.scheduled_at {
        builder = builder.scheduled_at(scheduled_at);
    }

    let action = builder.build()?;
    let created = state.action_service.request(action).await?;
    Ok(CreateResponse::Created(Json(created)))
}
