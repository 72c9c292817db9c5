use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use cepbook_core::utils::truncate;

use crate::app::{App, Focus};
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::List;
    let saved = app.saved();

    let block = Block::default()
        .title(format!(" Saved addresses ({}) ", saved.len()))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    if saved.is_empty() {
        let paragraph = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(" No saved addresses.", styles::muted_style())),
        ])
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let width = area.width.saturating_sub(4) as usize;

    let items: Vec<ListItem> = saved
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let address = &entry.address;
            let mut cep_line = format!("CEP: {}", address.cep_display());
            if let Some(age) = entry.age_display() {
                cep_line.push_str(&format!("  ({})", age));
            }

            let lines = vec![
                Line::from(Span::styled(
                    truncate(&address.street_line(), width),
                    styles::highlight_style(),
                )),
                Line::from(truncate(&address.city_line(), width)),
                Line::from(Span::styled(cep_line, styles::muted_style())),
                Line::from(""),
            ];

            let style = if focused && i == app.list_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };

            ListItem::new(lines).style(style)
        })
        .collect();

    let list = List::new(items).block(block);

    let mut state = ListState::default();
    state.select(Some(app.list_selection));

    frame.render_stateful_widget(list, area, &mut state);
}
