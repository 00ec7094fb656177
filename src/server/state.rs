use std::sync::Arc;

use crate::router::SeverityRouter;

/// Shared application state accessible to all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<SeverityRouter>,
}

impl AppState {
    pub fn new(router: Arc<SeverityRouter>) -> Self {
        Self { router }
    }
}
