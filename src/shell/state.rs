//! Visible application state and the stale-response guard.

use std::sync::Arc;

use crate::types::history::{format_year, HistoricalEntity, HistoryData};

use super::year_input::{parse_year, YearInputError};

/// Message shown when a load fails outside the fetch service.
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load historical data.";

/// Identity of one load call. Only the newest token may commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadToken(u64);

impl LoadToken {
    /// Counter value captured when the load started.
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Single source of truth for what the UI shows.
#[derive(Debug, Clone)]
pub struct ShellState {
    /// Year currently selected in the form.
    pub year: i32,

    /// Raw text of the year field.
    pub input: String,

    /// A load is in flight.
    pub loading: bool,

    /// Last committed data, if any.
    pub data: Option<Arc<HistoryData>>,

    /// User-visible error message.
    pub error: Option<String>,

    /// Entity shown in the detail panel.
    pub selected: Option<HistoricalEntity>,

    request_counter: u64,
}

impl ShellState {
    /// Creates the state with `year` selected and nothing loaded.
    pub fn new(year: i32) -> Self {
        Self {
            year,
            input: year.to_string(),
            loading: false,
            data: None,
            error: None,
            selected: None,
            request_counter: 0,
        }
    }

    /// Starts a load: bumps the counter, clears error and selection.
    pub fn begin_load(&mut self) -> LoadToken {
        self.request_counter += 1;
        self.loading = true;
        self.error = None;
        self.selected = None;
        LoadToken(self.request_counter)
    }

    /// Whether no newer load started after `token`.
    pub fn is_current(&self, token: LoadToken) -> bool {
        token.0 == self.request_counter
    }

    /// Applies a settled load if `token` is still current.
    ///
    /// Returns `false` (and changes nothing) for superseded loads. On error
    /// the previous data stays visible.
    pub fn commit(&mut self, token: LoadToken, outcome: Result<Arc<HistoryData>, String>) -> bool {
        if !self.is_current(token) {
            tracing::debug!(
                token = token.0,
                current = self.request_counter,
                "Discarding stale response"
            );
            return false;
        }

        match outcome {
            Ok(data) => self.data = Some(data),
            Err(message) => self.error = Some(message),
        }
        self.loading = false;
        true
    }

    /// Parses the input field. On success selects the year and returns it.
    ///
    /// Invalid input sets the error and leaves year and data untouched.
    pub fn submit_input(&mut self) -> Result<i32, YearInputError> {
        match parse_year(&self.input) {
            Ok(year) => {
                self.year = year;
                Ok(year)
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Replaces the current selection.
    pub fn select_entity(&mut self, entity: HistoricalEntity) {
        self.selected = Some(entity);
    }

    /// Closes the detail panel.
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Name of the selected entity, used for map highlighting.
    pub fn selected_name(&self) -> Option<&str> {
        self.selected.as_ref().map(|e| e.name.as_str())
    }

    /// Era label: the data's label, or the formatted selected year.
    pub fn era_label(&self) -> String {
        match &self.data {
            Some(data) if !data.label.is_empty() => data.label.clone(),
            _ => format_year(self.year),
        }
    }

    /// Entities currently displayed.
    pub fn entities(&self) -> &[HistoricalEntity] {
        self.data.as_deref().map(|d| d.entities.as_slice()).unwrap_or(&[])
    }

    /// Number of entities displayed.
    pub fn entity_count(&self) -> usize {
        self.entities().len()
    }

    /// Current value of the request counter.
    pub fn request_counter(&self) -> u64 {
        self.request_counter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(year: i32, names: &[&str]) -> Arc<HistoryData> {
        Arc::new(HistoryData {
            year,
            label: format_year(year),
            entities: names
                .iter()
                .map(|n| {
                    HistoricalEntity::new(
                        *n,
                        "#111827",
                        vec![[40.0, -4.0], [41.0, -3.0], [40.0, -2.0]],
                        "",
                    )
                })
                .collect(),
        })
    }

    #[test]
    fn test_initial_state() {
        let state = ShellState::new(2024);
        assert_eq!(state.input, "2024");
        assert_eq!(state.era_label(), "2024 CE");
        assert_eq!(state.entity_count(), 0);
        assert!(!state.loading);
    }

    #[test]
    fn test_begin_load_clears_error_and_selection() {
        let mut state = ShellState::new(711);
        state.error = Some("old".into());
        state.select_entity(data(711, &["A"]).entities[0].clone());

        let token = state.begin_load();

        assert_eq!(token.value(), 1);
        assert!(state.loading);
        assert!(state.error.is_none());
        assert!(state.selected.is_none());
    }

    #[test]
    fn test_stale_commit_is_discarded() {
        let mut state = ShellState::new(711);
        let first = state.begin_load();
        let second = state.begin_load();

        assert!(state.commit(second, Ok(data(1492, &["Castile"]))));
        assert!(!state.loading);

        assert!(!state.commit(first, Ok(data(711, &["Umayyad"]))));
        assert_eq!(state.data.as_ref().unwrap().year, 1492);
    }

    #[test]
    fn test_stale_commit_keeps_loading_flag() {
        let mut state = ShellState::new(711);
        let first = state.begin_load();
        let _second = state.begin_load();

        assert!(!state.commit(first, Ok(data(711, &["A"]))));
        assert!(state.loading);
        assert!(state.data.is_none());
    }

    #[test]
    fn test_error_commit_keeps_previous_data() {
        let mut state = ShellState::new(711);
        let token = state.begin_load();
        state.commit(token, Ok(data(711, &["A"])));

        let token = state.begin_load();
        state.commit(token, Err(LOAD_FAILED_MESSAGE.to_string()));

        assert_eq!(state.error.as_deref(), Some(LOAD_FAILED_MESSAGE));
        assert_eq!(state.entity_count(), 1);
        assert!(!state.loading);
    }

    #[test]
    fn test_submit_invalid_input() {
        let mut state = ShellState::new(711);
        let token = state.begin_load();
        state.commit(token, Ok(data(711, &["A"])));

        state.input = "2027".into();
        assert!(state.submit_input().is_err());
        assert_eq!(state.year, 711);
        assert_eq!(state.error.as_deref(), Some("Valid range: 3000 BC to 2026 CE"));
        assert_eq!(state.data.as_ref().unwrap().year, 711);
    }

    #[test]
    fn test_submit_valid_input() {
        let mut state = ShellState::new(2024);
        state.input = "300 BC".into();
        assert_eq!(state.submit_input(), Ok(-300));
        assert_eq!(state.year, -300);
        assert_eq!(state.era_label(), "300 BC");
    }

    #[test]
    fn test_selection_replaces_and_clears() {
        let loaded = data(711, &["X", "Y"]);
        let mut state = ShellState::new(711);

        state.select_entity(loaded.entities[0].clone());
        assert_eq!(state.selected_name(), Some("X"));

        state.select_entity(loaded.entities[1].clone());
        assert_eq!(state.selected_name(), Some("Y"));

        state.clear_selection();
        assert!(state.selected.is_none());
    }

    #[test]
    fn test_era_label_prefers_data_label() {
        let mut state = ShellState::new(711);
        let token = state.begin_load();
        let mut custom = (*data(711, &["A"])).clone();
        custom.label = "Early 8th century".into();
        state.commit(token, Ok(Arc::new(custom)));

        assert_eq!(state.era_label(), "Early 8th century");
    }
}
