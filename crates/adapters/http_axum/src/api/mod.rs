//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod actions;
#[allow(clippy::missing_errors_doc)]
pub mod plans;

use axum::Router;
use axum::routing::{get, post};

use switchyard_app::ports::ActionRepository;

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<R>() -> Router<AppState<R>>
where
    R: ActionRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/actions", get(actions::list::<R>).post(actions::create::<R>))
        .route("/actions/{id}", get(actions::get::<R>))
        .route("/plans/cheapest", post(plans::cheapest::<R>))
}
