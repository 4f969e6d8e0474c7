//! JSON REST handler for tariff-based planning.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use switchyard_app::ports::ActionRepository;
use switchyard_domain::action::Action;
use switchyard_domain::tariff::{CheapestPlan, TariffRate};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body: the plan fields plus the rates to choose from.
#[derive(Debug, Deserialize)]
pub struct CheapestRequest {
    #[serde(flatten)]
    pub plan: CheapestPlan,
    pub rates: Vec<TariffRate>,
}

/// Possible responses from the cheapest-plan endpoint.
pub enum CheapestResponse {
    Created(Json<Vec<Action>>),
}

impl IntoResponse for CheapestResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// `POST /api/plans/cheapest`
pub async fn cheapest<R>(
    State(state): State<AppState<R>>,
    Json(req): Json<CheapestRequest>,
) -> Result<CheapestResponse, ApiError>
where
    R: ActionRepository + Send + Sync + 'static,
{
    let actions = state
        .action_service
        .plan_cheapest(&req.plan, &req.rates)
        .await?;
    Ok(CheapestResponse::Created(Json(actions)))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use chrono::{Duration, DurationRound, Utc};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::router::build;
    use crate::testing::{body_json, json_request, test_state};

    fn rates(prices: &[f64]) -> Value {
        let start = Utc::now().duration_trunc(Duration::minutes(30)).unwrap() + Duration::hours(1);
        let slots: Vec<Value> = prices
            .iter()
            .enumerate()
            .map(|(i, price)| {
                let from = start + Duration::minutes(30 * i64::try_from(i).unwrap());
                json!({
                    "valid_from": from,
                    "valid_to": from + Duration::minutes(30),
                    "value_inc_vat": price,
                })
            })
            .collect();
        Value::Array(slots)
    }

    #[tokio::test]
    async fn should_insert_start_and_end_for_merged_window() {
        let (state, repo) = test_state();
        let body = json!({
            "device_type": "shelly",
            "device_id": "immersion",
            "slots": 2,
            "rates": rates(&[30.0, 5.0, 4.0, 25.0]),
        });

        let response = build(state)
            .oneshot(json_request("POST", "/api/plans/cheapest", &body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body_json(response).await;
        let commands: Vec<&str> = created
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["command"].as_str().unwrap())
            .collect();
        assert_eq!(commands, vec!["on", "off"]);
        assert_eq!(repo.all().len(), 2);
    }

    #[tokio::test]
    async fn should_skip_end_command_when_null() {
        let (state, repo) = test_state();
        let body = json!({
            "device_type": "virtual",
            "device_id": "lamp",
            "slots": 1,
            "end": null,
            "rates": rates(&[10.0]),
        });

        let response = build(state)
            .oneshot(json_request("POST", "/api/plans/cheapest", &body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(repo.all().len(), 1);
        assert_eq!(repo.all()[0].command, "on");
    }

    #[tokio::test]
    async fn should_reject_plan_without_future_slots() {
        let (state, repo) = test_state();
        let body = json!({
            "device_type": "virtual",
            "device_id": "lamp",
            "slots": 1,
            "rates": [],
        });

        let response = build(state)
            .oneshot(json_request("POST", "/api/plans/cheapest", &body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(repo.all().is_empty());
    }
}
