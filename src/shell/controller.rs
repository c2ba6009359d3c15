//! Async load orchestration on top of [`ShellState`].

use std::sync::{Arc, Mutex, MutexGuard};

use crate::service::HistoryService;
use crate::types::history::HistoricalEntity;

use super::state::{ShellState, LOAD_FAILED_MESSAGE};

/// Application shell: the fetch service plus the shared visible state.
///
/// Cloning is cheap; clones share the same state and service.
#[derive(Clone)]
pub struct Shell {
    service: Arc<HistoryService>,
    state: Arc<Mutex<ShellState>>,
}

impl Shell {
    /// Creates a shell with `initial_year` selected and nothing loaded.
    pub fn new(service: Arc<HistoryService>, initial_year: i32) -> Self {
        Self {
            service,
            state: Arc::new(Mutex::new(ShellState::new(initial_year))),
        }
    }

    /// Locks the visible state. Never hold the guard across an `.await`.
    pub fn state(&self) -> MutexGuard<'_, ShellState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Copy of the visible state, for rendering.
    pub fn snapshot(&self) -> ShellState {
        self.state().clone()
    }

    /// The fetch service behind this shell.
    pub fn service(&self) -> &Arc<HistoryService> {
        &self.service
    }

    /// Loads `year` and commits the result unless a newer load started.
    ///
    /// Returns whether this call's result was committed.
    pub async fn load_history(&self, year: i32) -> bool {
        let token = self.state().begin_load();
        tracing::debug!(year, token = token.value(), "Load started");

        let service = Arc::clone(&self.service);
        let outcome = tokio::spawn(async move { service.fetch_historical_data(year).await })
            .await
            .map_err(|e| {
                tracing::error!(year, error = %e, "Fetch task failed");
                LOAD_FAILED_MESSAGE.to_string()
            });

        let committed = self.state().commit(token, outcome);
        if !committed {
            tracing::debug!(year, token = token.value(), "Superseded load ignored");
        }
        committed
    }

    /// Validates the input field. Returns the year to load, if valid.
    pub fn submit_input(&self) -> Option<i32> {
        let mut state = self.state();
        match state.submit_input() {
            Ok(year) => Some(year),
            Err(e) => {
                tracing::debug!(input = %state.input, error = %e, "Rejected year input");
                None
            }
        }
    }

    /// Replaces the input text and submits it.
    pub async fn submit_year(&self, text: &str) -> Option<bool> {
        let year = {
            let mut state = self.state();
            state.input = text.to_string();
            state.submit_input().ok()?
        };
        Some(self.load_history(year).await)
    }

    /// Selects an entity (map click).
    pub fn select_entity(&self, entity: HistoricalEntity) {
        tracing::debug!(entity = %entity.name, "Entity selected");
        self.state().select_entity(entity);
    }

    /// Closes the detail panel.
    pub fn clear_selection(&self) {
        self.state().clear_selection();
    }
}
