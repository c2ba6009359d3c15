//! Application shell: year selection, visible state and the race guard.
//!
//! Every load captures a token from a monotonically increasing counter and
//! may only commit while that token is still the newest one
//! ("last-started-wins").

mod controller;
mod state;
mod year_input;

pub use controller::Shell;
pub use state::{LoadToken, ShellState, LOAD_FAILED_MESSAGE};
pub use year_input::{parse_year, YearInputError, INITIAL_YEAR, MAX_YEAR, MIN_YEAR};
