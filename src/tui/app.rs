//! Main TUI application state machine.
//!
//! Handles:
//! - Screen navigation
//! - Input event handling
//! - Engine integration
//! - Background assessment via a worker thread

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};

use crate::application::{CardioEngine, EngineConfig};

use super::ui::{
    dashboard::{render_dashboard, DashboardState},
    form::{render_form, FormState},
    render_disclaimer,
    results::{render_results, ResultsState},
};
use super::worker::{AssessmentProgress, AssessmentWorker, AssessmentWorkerHandle};

/// Current screen/view in the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Dashboard,
    Form,
    Results,
}

/// Main application state
pub struct App {
    /// Current screen
    screen: Screen,

    /// Whether the app should quit
    should_quit: bool,

    /// The prediction & attribution engine (read-only after bootstrap)
    engine: Arc<CardioEngine>,

    /// Dashboard state
    dashboard_state: DashboardState,

    /// Form state
    form_state: FormState,

    /// Results state
    results_state: ResultsState,

    /// Pending assessment worker (if running)
    pending_worker: Option<AssessmentWorkerHandle>,
}

impl App {
    /// Create a new application instance, bootstrapping the engine from the
    /// environment-configured artifact paths.
    ///
    /// Refuses to start if the model or dataset cannot be loaded: a process
    /// that failed initialization accepts no requests.
    ///
    /// # Errors
    /// Returns error if the engine cannot be bootstrapped.
    pub fn new() -> Result<Self> {
        let config = EngineConfig::from_env();

        if !config.model_path.exists() {
            return Err(anyhow!(
                "Model path not found at {:?}. Set CARDIOWISE_MODEL_PATH to the artifact file or its directory.",
                config.model_path
            ));
        }

        let engine = CardioEngine::bootstrap(&config)
            .map_err(|e| anyhow!("Failed to initialize risk engine: {e}"))?;

        Ok(Self::with_engine(Arc::new(engine)))
    }

    /// Create the application around an already-bootstrapped engine
    /// (Composition Root pattern; used by tests and `main`).
    #[must_use]
    pub fn with_engine(engine: Arc<CardioEngine>) -> Self {
        let dashboard_state = DashboardState {
            info: engine.info().clone(),
        };

        Self {
            screen: Screen::Dashboard,
            should_quit: false,
            engine,
            dashboard_state,
            form_state: FormState::default(),
            results_state: ResultsState::default(),
            pending_worker: None,
        }
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Main loop
        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            // Poll pending worker for progress updates
            self.poll_worker();

            // Draw current screen
            terminal.draw(|f| {
                let area = f.area();
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(0), Constraint::Length(2)])
                    .split(area);

                let content_area = chunks[0];
                let disclaimer_area = chunks[1];

                match self.screen {
                    Screen::Dashboard => {
                        render_dashboard(f, content_area, &self.dashboard_state)
                    }
                    Screen::Form => render_form(f, content_area, &self.form_state),
                    Screen::Results => render_results(f, content_area, &self.results_state),
                }

                render_disclaimer(f, disclaimer_area);
            })?;

            // Handle input (short poll to stay responsive)
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key.code, key.modifiers);
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Poll the background worker for progress updates.
    fn poll_worker(&mut self) {
        if self.pending_worker.is_none() {
            return;
        }

        loop {
            let progress = match self
                .pending_worker
                .as_ref()
                .and_then(|worker| worker.try_recv())
            {
                Some(p) => p,
                None => break,
            };

            match progress {
                AssessmentProgress::Scoring | AssessmentProgress::Explaining => {
                    self.results_state = ResultsState::Running;
                }
                AssessmentProgress::Complete(report) => {
                    self.results_state = ResultsState::Complete { report };
                    self.pending_worker = None;
                    break;
                }
                AssessmentProgress::Error(message) => {
                    self.results_state = ResultsState::Error { message };
                    self.pending_worker = None;
                    break;
                }
            }
        }
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        // Global quit handling
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Dashboard => self.handle_dashboard_key(key),
            Screen::Form => self.handle_form_key(key),
            Screen::Results => self.handle_results_key(key),
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('n') | KeyCode::Char('N') => {
                self.form_state = FormState::default();
                self.screen = Screen::Form;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            _ => {}
        }
    }

    fn handle_form_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.screen = Screen::Dashboard;
            }
            KeyCode::Up => {
                self.form_state.prev_field();
            }
            KeyCode::Down | KeyCode::Tab => {
                self.form_state.next_field();
            }
            KeyCode::Left => {
                self.form_state.cycle_choice(false);
            }
            KeyCode::Right => {
                self.form_state.cycle_choice(true);
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                self.form_state.load_sample_data();
            }
            KeyCode::Char(c) => {
                self.form_state.input_char(c);
            }
            KeyCode::Backspace => {
                self.form_state.delete_char();
            }
            KeyCode::Delete => {
                self.form_state.clear_field();
            }
            KeyCode::Enter => {
                self.submit_form();
            }
            _ => {}
        }
    }

    fn handle_results_key(&mut self, key: KeyCode) {
        match &self.results_state {
            ResultsState::Complete { .. } => match key {
                KeyCode::Enter | KeyCode::Esc => {
                    self.screen = Screen::Dashboard;
                }
                KeyCode::Char('n') | KeyCode::Char('N') => {
                    self.form_state = FormState::default();
                    self.screen = Screen::Form;
                }
                _ => {}
            },
            ResultsState::Error { .. } => match key {
                KeyCode::Enter => {
                    self.screen = Screen::Form;
                }
                KeyCode::Esc => {
                    self.screen = Screen::Dashboard;
                }
                _ => {}
            },
            _ => {}
        }
    }

    fn submit_form(&mut self) {
        match self.form_state.to_record() {
            Ok(record) => {
                // Switch to the results screen and run the pipeline off the
                // UI thread.
                self.screen = Screen::Results;
                self.results_state = ResultsState::Running;

                let worker = AssessmentWorker::spawn(Arc::clone(&self.engine), record);
                self.pending_worker = Some(worker);

                // Clear raw input buffers from the UI immediately.
                self.form_state.clear_sensitive();
            }
            Err(e) => {
                self.form_state.error_message = Some(e);
            }
        }
    }
}
