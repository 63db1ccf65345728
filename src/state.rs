// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    config::Config,
    notify::Notifier,
    store::{ExamStore, ResourceStore, SubscriptionStore},
};

#[derive(Clone)]
pub struct AppState {
    pub exams: Arc<dyn ExamStore>,
    pub subscriptions: Arc<dyn SubscriptionStore>,
    pub resources: Arc<dyn ResourceStore>,
    pub notifier: Arc<Notifier>,
    pub config: Config,
}

impl AppState {
    /// Builds state where one backend serves every store trait.
    pub fn new<S>(store: S, notifier: Notifier, config: Config) -> Self
    where
        S: ExamStore + SubscriptionStore + ResourceStore + 'static,
    {
        let store = Arc::new(store);
        Self {
            exams: store.clone(),
            subscriptions: store.clone(),
            resources: store,
            notifier: Arc::new(notifier),
            config,
        }
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
