use crate::tui::select;
use crate::tui::state::PickerState;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

const PAGE: isize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Chosen(String),
    Cancelled,
}

pub fn handle_key_event(app: &mut PickerState, key: KeyEvent) -> Outcome {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => return Outcome::Cancelled,
        KeyCode::Char('c') if ctrl => return Outcome::Cancelled,

        KeyCode::Enter => {
            if let Some(name) = select::selected_profile(app) {
                return Outcome::Chosen(name.to_string());
            }
        }

        KeyCode::Down => move_selection(app, 1),
        KeyCode::Up => move_selection(app, -1),
        KeyCode::Char('n') if ctrl => move_selection(app, 1),
        KeyCode::Char('p') if ctrl => move_selection(app, -1),
        KeyCode::PageDown => jump_by(app, PAGE),
        KeyCode::PageUp => jump_by(app, -PAGE),
        KeyCode::Home => jump_by(app, isize::MIN),
        KeyCode::End => jump_by(app, isize::MAX),

        KeyCode::Backspace => {
            app.filter.pop();
            reset_selection(app);
        }
        KeyCode::Char(c) if !ctrl => {
            app.filter.push(c);
            reset_selection(app);
        }
        _ => {}
    }
    Outcome::Continue
}

/// Single steps wrap around.
fn move_selection(app: &mut PickerState, delta: isize) {
    let len = select::visible_profile_indices(app).len();
    if len == 0 {
        app.list_state.select(None);
        return;
    }
    let current = app.list_state.selected().unwrap_or(0).min(len - 1);
    let next = if delta >= 0 {
        (current + 1) % len
    } else if current == 0 {
        len - 1
    } else {
        current - 1
    };
    app.list_state.select(Some(next));
}

/// Larger jumps stop at the ends.
fn jump_by(app: &mut PickerState, delta: isize) {
    let len = select::visible_profile_indices(app).len();
    if len == 0 {
        app.list_state.select(None);
        return;
    }
    let current = app.list_state.selected().unwrap_or(0) as isize;
    let next = current.saturating_add(delta).clamp(0, len as isize - 1);
    app.list_state.select(Some(next as usize));
}

fn reset_selection(app: &mut PickerState) {
    let len = select::visible_profile_indices(app).len();
    app.list_state.select(if len == 0 { None } else { Some(0) });
}
