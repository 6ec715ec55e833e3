use std::sync::Arc;

use selflow_brain::CentralBrain;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub brain: Arc<CentralBrain>,
}

impl AppState {
    pub fn new(brain: Arc<CentralBrain>) -> Self {
        Self { brain }
    }
}
