//! Shared application state for axum handlers.

use std::sync::Arc;

use switchyard_app::ports::ActionRepository;
use switchyard_app::services::ActionService;

/// Application state shared across all axum handlers.
///
/// `Clone` is implemented manually so the repository does not need to be
/// `Clone`; only the `Arc` is cloned.
pub struct AppState<R> {
    pub action_service: Arc<ActionService<R>>,
}

impl<R> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            action_service: Arc::clone(&self.action_service),
        }
    }
}

impl<R> AppState<R>
where
    R: ActionRepository + Send + Sync + 'static,
{
    pub fn new(action_service: ActionService<R>) -> Self {
        Self {
            action_service: Arc::new(action_service),
        }
    }
}
