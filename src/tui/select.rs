use crate::tui::state::PickerState;
use ratatui::widgets::ListState;

pub fn clamp_list_state(state: &mut ListState, len: usize) {
    if len == 0 {
        state.select(None);
        return;
    }
    let selected = state.selected().unwrap_or(0);
    let next = selected.min(len.saturating_sub(1));
    state.select(Some(next));
}

/// Indices into `profiles` that match the current filter, in list order.
pub fn visible_profile_indices(app: &PickerState) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..app.profiles.len()).collect();
    if !app.filter.is_empty() {
        let q = app.filter.to_lowercase();
        indices.retain(|i| app.profiles[*i].to_lowercase().contains(&q));
    }
    indices
}

pub fn selected_profile(app: &PickerState) -> Option<&str> {
    let indices = visible_profile_indices(app);
    app.list_state
        .selected()
        .and_then(|i| indices.get(i).copied())
        .map(|i| app.profiles[i].as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn picker(names: &[&str]) -> PickerState {
        PickerState::new(names.iter().map(|n| n.to_string()).collect(), None)
    }

    #[test]
    fn filter_is_case_insensitive_substring() {
        let mut app = picker(&["dev", "Prod", "preview"]);
        app.filter = "PR".to_string();
        assert_eq!(visible_profile_indices(&app), vec![1, 2]);
    }

    #[test]
    fn selection_maps_through_filter() {
        let mut app = picker(&["dev", "prod", "preview"]);
        app.filter = "p".to_string();
        app.list_state.select(Some(1));
        assert_eq!(selected_profile(&app), Some("preview"));
    }

    #[test]
    fn clamp_handles_shrinking_and_empty_lists() {
        let mut state = ListState::default();
        state.select(Some(5));
        clamp_list_state(&mut state, 2);
        assert_eq!(state.selected(), Some(1));
        clamp_list_state(&mut state, 0);
        assert_eq!(state.selected(), None);
        clamp_list_state(&mut state, 3);
        assert_eq!(state.selected(), Some(0));
    }
}
