use crate::tui::select;
use crate::tui::state::PickerState;
use crate::tui::theme::Theme;
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

const HELP: &str = "↑/↓ move · type to filter · Enter activate · Esc cancel";

pub fn draw<B: Backend>(f: &mut ratatui::Frame<B>, app: &mut PickerState, theme: &Theme) {
    let size = f.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Min(3),
                Constraint::Length(1),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(size);

    let indices = select::visible_profile_indices(app);
    let items: Vec<ListItem> = indices
        .iter()
        .map(|i| {
            let name = &app.profiles[*i];
            if app.is_active(name) {
                ListItem::new(format!("* {name}")).style(theme.active_marker())
            } else {
                ListItem::new(format!("  {name}"))
            }
        })
        .collect();

    select::clamp_list_state(&mut app.list_state, items.len());
    let title = if items.is_empty() {
        format!("{} (no matches)", theme.title)
    } else {
        theme.title.clone()
    };
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border())
                .title(title),
        )
        .highlight_style(theme.list_highlight())
        .highlight_symbol("» ");
    f.render_stateful_widget(list, chunks[0], &mut app.list_state);

    let search = Paragraph::new(format!("Search: {}", app.filter));
    f.render_widget(search, chunks[1]);

    let help = Paragraph::new(HELP).style(theme.dim_text());
    f.render_widget(help, chunks[2]);
}
