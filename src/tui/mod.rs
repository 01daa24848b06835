//! Interactive profile picker.
//!
//! Drawn on standard error: the init snippet captures standard output for
//! `eval`, so nothing but shell statements may ever go there.

pub mod input;
pub mod select;
pub mod state;
pub mod theme;
pub mod ui;

use crate::config::StoreSnapshot;
use crate::error::SwitchError;
use crate::tui::input::Outcome;
use crate::tui::state::PickerState;
use crate::tui::theme::Theme;
use anyhow::{bail, Result};
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::{self, IsTerminal, Stderr};
use std::time::Duration;

/// Let the user choose a profile. Cancelling yields `SwitchError::SelectionCancelled`.
pub fn pick_profile(snapshot: &StoreSnapshot, theme: &Theme) -> Result<String> {
    let names: Vec<String> = snapshot
        .list_profiles()
        .into_iter()
        .map(str::to_string)
        .collect();
    if names.is_empty() {
        return Err(SwitchError::NoProfiles.into());
    }
    if !io::stderr().is_terminal() {
        bail!("the profile picker needs a terminal on standard error; pass a profile name instead");
    }

    let active = snapshot.active_profile().map(|a| a.name.clone());
    let mut app = PickerState::new(names, active);

    let choice = {
        let mut session = TerminalSession::enter()?;
        session.run(&mut app, theme)?
    };

    match choice {
        Some(name) => {
            log::debug!("picked profile `{name}`");
            Ok(name)
        }
        None => Err(SwitchError::SelectionCancelled.into()),
    }
}

/// Raw mode plus alternate screen on stderr, undone on drop.
struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stderr>>,
}

impl TerminalSession {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        let mut stderr = io::stderr();
        if let Err(e) = execute!(stderr, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(e.into());
        }
        match Terminal::new(CrosstermBackend::new(stderr)) {
            Ok(terminal) => Ok(Self { terminal }),
            Err(e) => {
                let _ = disable_raw_mode();
                let _ = execute!(io::stderr(), LeaveAlternateScreen);
                Err(e.into())
            }
        }
    }

    fn run(&mut self, app: &mut PickerState, theme: &Theme) -> Result<Option<String>> {
        loop {
            self.terminal.draw(|f| ui::draw(f, app, theme))?;

            if event::poll(Duration::from_millis(200))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    match input::handle_key_event(app, key) {
                        Outcome::Continue => {}
                        Outcome::Chosen(name) => return Ok(Some(name)),
                        Outcome::Cancelled => return Ok(None),
                    }
                }
            }
        }
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}
