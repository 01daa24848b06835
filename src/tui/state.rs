use ratatui::widgets::ListState;

/// Everything the picker needs between frames.
pub struct PickerState {
    pub profiles: Vec<String>,
    /// Shown with a marker; preselected when present.
    pub active: Option<String>,
    pub filter: String,
    pub list_state: ListState,
}

impl PickerState {
    pub fn new(profiles: Vec<String>, active: Option<String>) -> Self {
        let mut list_state = ListState::default();
        if !profiles.is_empty() {
            let start = active
                .as_ref()
                .and_then(|a| profiles.iter().position(|p| p == a))
                .unwrap_or(0);
            list_state.select(Some(start));
        }
        Self {
            profiles,
            active,
            filter: String::new(),
            list_state,
        }
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.active.as_deref() == Some(name)
    }
}
