//! Explorer event loop.

use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use tokio::runtime::Handle;
use tracing::{debug, info};

use crate::map::{MapView, TileSource};
use crate::service::CacheStatus;
use crate::shell::Shell;
use crate::types::history::{HistoricalEntity, HistoryData};
use crate::ChronosResult;

use super::ui::{draw_ui, map_aspect, Screen, UiState};

const MAX_INPUT_LEN: usize = 32;
const DRAW_INTERVAL: Duration = Duration::from_millis(80);
const POLL_INTERVAL: Duration = Duration::from_millis(50);
const PAN_STEP: f64 = 0.2;

/// Terminal explorer: year form, map and detail panel.
pub struct ExplorerApp {
    terminal: Terminal<CrosstermBackend<std::io::Stdout>>,
    shell: Shell,
    runtime: Handle,
    map: MapView,
    tiles: TileSource,
    ui_state: UiState,
    log_receiver: Receiver<String>,
    map_area: Rect,
    shown: Option<Arc<HistoryData>>,
    cache: Option<CacheStatus>,
    restored: bool,
}

impl ExplorerApp {
    /// Takes over the terminal. Loads are spawned on `runtime`.
    pub fn new(
        shell: Shell,
        runtime: Handle,
        map: MapView,
        tiles: TileSource,
        log_receiver: Receiver<String>,
    ) -> ChronosResult<Self> {
        let mut stdout = std::io::stdout();
        crossterm::terminal::enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        terminal.hide_cursor()?;

        Ok(Self {
            terminal,
            shell,
            runtime,
            map,
            tiles,
            ui_state: UiState::default(),
            log_receiver,
            map_area: Rect::default(),
            shown: None,
            cache: None,
            restored: false,
        })
    }

    /// Runs until the user quits, then restores the terminal.
    ///
    /// If the loop panics, `Drop` restores the terminal during unwinding.
    pub fn run(mut self) -> ChronosResult<()> {
        let result = self.event_loop();
        self.restore_terminal()?;
        result
    }

    fn restore_terminal(&mut self) -> ChronosResult<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;

        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        self.terminal.show_cursor()?;
        crossterm::terminal::disable_raw_mode()?;
        Ok(())
    }

    fn event_loop(&mut self) -> ChronosResult<()> {
        self.draw()?;
        let mut last_draw = Instant::now();

        loop {
            while let Ok(line) = self.log_receiver.try_recv() {
                self.ui_state.push_log(line);
            }

            if last_draw.elapsed() >= DRAW_INTERVAL {
                self.draw()?;
                last_draw = Instant::now();
            }

            if !event::poll(POLL_INTERVAL)? {
                continue;
            }

            let keep_running = match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => self.on_key(key),
                Event::Mouse(mouse) => {
                    self.on_mouse(mouse);
                    true
                }
                _ => true,
            };
            if !keep_running {
                info!("Explorer closed");
                return Ok(());
            }
        }
    }

    fn draw(&mut self) -> ChronosResult<()> {
        let state = self.shell.snapshot();

        let changed = match (&self.shown, &state.data) {
            (Some(a), Some(b)) => !Arc::ptr_eq(a, b),
            (None, None) => false,
            _ => true,
        };
        if changed {
            self.map.reset_hover();
            self.shown = state.data.clone();
        }

        // keep the last status while a load holds the cache lock
        if let Some(status) = self.shell.service().try_cache_status(state.year) {
            self.cache = Some(status);
        }

        self.ui_state.tick();
        let screen = Screen {
            state: &state,
            map: &self.map,
            tiles: &self.tiles,
            ui: &self.ui_state,
            cache: self.cache.as_ref(),
        };
        let mut map_area = self.map_area;
        self.terminal.draw(|frame| {
            map_area = draw_ui(frame, &screen);
        })?;
        self.map_area = map_area;
        Ok(())
    }

    /// Handles a key press. Returns `false` to quit.
    fn on_key(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char('c') if ctrl => return false,
            KeyCode::Char(c) if !ctrl => {
                let mut state = self.shell.state();
                if state.input.chars().count() < MAX_INPUT_LEN {
                    state.input.push(c);
                }
            }
            KeyCode::Backspace => {
                self.shell.state().input.pop();
            }
            KeyCode::Enter => self.submit(),
            KeyCode::Esc => {
                let mut state = self.shell.state();
                if state.selected.is_none() {
                    return false;
                }
                state.clear_selection();
            }
            KeyCode::Tab => self.cycle_selection(true),
            KeyCode::BackTab => self.cycle_selection(false),
            KeyCode::PageUp => self.map.zoom_in(),
            KeyCode::PageDown => self.map.zoom_out(),
            KeyCode::Up => self.map.pan(PAN_STEP, 0.0),
            KeyCode::Down => self.map.pan(-PAN_STEP, 0.0),
            KeyCode::Left => self.map.pan(0.0, -PAN_STEP),
            KeyCode::Right => self.map.pan(0.0, PAN_STEP),
            _ => {}
        }
        true
    }

    fn submit(&mut self) {
        if self.shell.state().loading {
            debug!("Submit ignored while loading");
            return;
        }
        let Some(year) = self.shell.submit_input() else {
            return;
        };

        let shell = self.shell.clone();
        self.runtime.spawn(async move {
            shell.load_history(year).await;
        });
    }

    fn cycle_selection(&mut self, forward: bool) {
        let state = self.shell.snapshot();
        let entities = state.entities();
        if let Some(index) = next_selection(entities, state.selected_name(), forward) {
            self.shell.select_entity(entities[index].clone());
        }
    }

    fn on_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::ScrollUp => self.map.zoom_in(),
            MouseEventKind::ScrollDown => self.map.zoom_out(),
            MouseEventKind::Down(MouseButton::Left) => {
                let Some((lat, lon)) = self.pointer_to_geo(mouse.column, mouse.row) else {
                    return;
                };
                let state = self.shell.snapshot();
                if let Some(entity) = self.map.click(state.entities(), lat, lon) {
                    self.shell.select_entity(entity.clone());
                }
            }
            MouseEventKind::Moved => {
                let state = self.shell.snapshot();
                match self.pointer_to_geo(mouse.column, mouse.row) {
                    Some((lat, lon)) => {
                        self.map.pointer_moved(state.entities(), lat, lon);
                    }
                    None => {
                        self.map.set_hover(None);
                    }
                }
            }
            _ => {}
        }
    }

    fn pointer_to_geo(&self, column: u16, row: u16) -> Option<(f64, f64)> {
        let area = self.map_area;
        if column < area.x || row < area.y {
            return None;
        }
        self.map.viewport(map_aspect(area)).cell_to_geo(
            column - area.x,
            row - area.y,
            area.width,
            area.height,
        )
    }
}

impl Drop for ExplorerApp {
    fn drop(&mut self) {
        if let Err(e) = self.restore_terminal() {
            tracing::error!(error = %e, "Failed to restore the terminal");
        }
    }
}

/// Index of the entity after (or before) the selected one, wrapping around.
fn next_selection(
    entities: &[HistoricalEntity],
    selected: Option<&str>,
    forward: bool,
) -> Option<usize> {
    if entities.is_empty() {
        return None;
    }
    let len = entities.len();
    let current = selected.and_then(|name| entities.iter().position(|e| e.name == name));

    Some(match (current, forward) {
        (None, true) => 0,
        (None, false) => len - 1,
        (Some(i), true) => (i + 1) % len,
        (Some(i), false) => (i + len - 1) % len,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entities() -> Vec<HistoricalEntity> {
        ["Castile", "Aragon", "Navarre"]
            .iter()
            .map(|name| {
                HistoricalEntity::new(*name, "red", vec![[38.0, -6.0], [38.0, -5.0], [39.0, -5.0]], "")
            })
            .collect()
    }

    #[test]
    fn test_next_selection_starts_at_ends() {
        let entities = entities();
        assert_eq!(next_selection(&entities, None, true), Some(0));
        assert_eq!(next_selection(&entities, None, false), Some(2));
    }

    #[test]
    fn test_next_selection_wraps() {
        let entities = entities();
        assert_eq!(next_selection(&entities, Some("Navarre"), true), Some(0));
        assert_eq!(next_selection(&entities, Some("Castile"), false), Some(2));
        assert_eq!(next_selection(&entities, Some("Aragon"), true), Some(2));
    }

    #[test]
    fn test_next_selection_empty_or_unknown() {
        assert_eq!(next_selection(&[], Some("Castile"), true), None);
        assert_eq!(next_selection(&entities(), Some("Portugal"), true), Some(0));
    }
}
