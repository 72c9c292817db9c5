use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, AppState, Focus};

use super::panels;
use super::styles;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Title bar
            Constraint::Min(12),   // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, chunks[0]);
    render_main_content(frame, app, chunks[1]);
    render_status_bar(frame, app, chunks[2]);

    // Render overlays
    match app.state {
        AppState::ShowingHelp => render_help_overlay(frame),
        AppState::ConfirmingRemove => render_remove_overlay(frame, app),
        AppState::ConfirmingQuit => render_quit_overlay(frame),
        AppState::Normal | AppState::Quitting => {}
    }
}

fn render_title_bar(frame: &mut Frame, area: Rect) {
    let title = "  cepbook";
    let help_hint = "[F1] Help";

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            area.width
                .saturating_sub(title.len() as u16 + help_hint.len() as u16 + 4)
                as usize,
        )),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    panels::form::render(frame, app, chunks[0]);
    panels::saved::render(frame, app, chunks[1]);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = match app.focus {
        Focus::Form => "[Tab] next field | [F2] saved list | [Ctrl+Q] quit",
        Focus::List => "[d] remove | [Esc] form | [q] quit",
    };

    let left_text = match app.status_message {
        Some(ref msg) => format!(" {} ", msg),
        None => format!(" {} saved ", app.saved().len()),
    };
    let right_text = format!(" {} ", shortcuts);

    let width = area.width as usize;
    let padding_len = width.saturating_sub(left_text.len()).saturating_sub(right_text.len());
    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn help_line(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<12}", key), styles::help_key_style()),
        Span::styled(desc, styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 23, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("  Form", styles::title_style())),
        help_line("Tab / ↓", "Next field (leaving CEP looks it up)"),
        help_line("S-Tab / ↑", "Previous field"),
        help_line("Enter", "Search CEP"),
        help_line("Ctrl+S", "Save address"),
        help_line("Esc", "Clear form"),
        help_line("F2", "Go to saved list"),
        Line::from(""),
        Line::from(Span::styled("  Saved list", styles::title_style())),
        help_line("↑ / ↓", "Select address"),
        help_line("d / Del", "Remove address"),
        help_line("Esc / F2", "Back to form"),
        help_line("q", "Quit"),
        help_line("?", "Show this help"),
        Line::from(""),
        Line::from(Span::styled("  Anywhere", styles::title_style())),
        help_line("Ctrl+Q", "Quit"),
        help_line("F1", "Show this help"),
        Line::from(""),
        Line::from(Span::styled("  Press any key to close", styles::muted_style())),
    ];

    let block = Block::default()
        .title(" Help ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_remove_overlay(frame: &mut Frame, app: &App) {
    let area = centered_rect_fixed(46, 8, frame.area());
    frame.render_widget(Clear, area);

    let description = app
        .selected_address()
        .map(|a| cepbook_core::utils::truncate(&a.address.street_line(), 40))
        .unwrap_or_default();

    let lines = vec![
        Line::from(""),
        Line::from("  Remove this address?"),
        Line::from(Span::styled(format!("  {}", description), styles::highlight_style())),
        Line::from(""),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("[y]", styles::help_key_style()),
            Span::raw(" yes    "),
            Span::styled("[n]", styles::help_key_style()),
            Span::raw(" no"),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 7, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from("  Quit cepbook?"),
        Line::from(""),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("[y]", styles::help_key_style()),
            Span::raw(" yes    "),
            Span::styled("[n]", styles::help_key_style()),
            Span::raw(" no"),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal.backend().buffer().content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_help_lists_letter_keys_under_saved_list() {
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal.draw(render_help_overlay).unwrap();
        let text = screen_text(&terminal);

        let saved = text.find("Saved list").unwrap();
        let anywhere = text.find("Anywhere").unwrap();
        let quit_letter = text.find("  q ").unwrap();
        assert!(saved < quit_letter && quit_letter < anywhere);
        assert!(text.find("Ctrl+Q").unwrap() > anywhere);
        assert!(!text.contains("F1 / ?"));
        assert!(text.contains("Press any key to close"));
    }

    #[test]
    fn test_centered_rect_fixed() {
        let outer = Rect::new(0, 0, 100, 40);
        let inner = centered_rect_fixed(46, 8, outer);
        assert_eq!(inner, Rect::new(27, 16, 46, 8));

        // Never larger than the terminal
        let tiny = centered_rect_fixed(46, 8, Rect::new(0, 0, 20, 5));
        assert_eq!(tiny, Rect::new(0, 0, 20, 5));
    }
}
