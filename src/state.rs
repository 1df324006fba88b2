use std::sync::Arc;

use axum::extract::FromRef;

use crate::{broker::CallBroker, config::Config, store::PlatformStore};

/// Composition root shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<PlatformStore>,
    pub calls: Arc<CallBroker>,
    pub config: Config,
}

impl AppState {
    pub fn new(store: PlatformStore, config: Config) -> Self {
        Self {
            store: Arc::new(store),
            calls: Arc::new(CallBroker::new()),
            config,
        }
    }
}

impl FromRef<AppState> for Arc<PlatformStore> {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for Arc<CallBroker> {
    fn from_ref(state: &AppState) -> Self {
        state.calls.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
