use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use cepbook_core::form::{FormField, FormState, NoticeKind};

use crate::app::{App, Focus};
use crate::ui::styles;

/// Width of the label column, including the required marker
const LABEL_WIDTH: usize = 15;

/// Width of the value box
const VALUE_WIDTH: usize = 36;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Form;
    let mut lines = vec![Line::from("")];

    for field in FormField::ALL {
        lines.push(field_line(app, field, focused && app.field_focus == field));
    }

    lines.push(Line::from(""));

    if app.form.state() == FormState::Searching {
        lines.push(Line::from(Span::styled(" Searching...", styles::highlight_style())));
    } else if let Some(notice) = app.form.notice() {
        let style = match notice.kind {
            NoticeKind::Success => styles::success_style(),
            NoticeKind::Error => styles::error_style(),
        };
        lines.push(Line::from(Span::styled(format!(" {}", notice.text), style)));
    } else {
        lines.push(Line::from(""));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(" [Enter]", styles::help_key_style()),
        Span::styled(" search  ", styles::muted_style()),
        Span::styled("[Ctrl+S]", styles::help_key_style()),
        Span::styled(" save  ", styles::muted_style()),
        Span::styled("[Esc]", styles::help_key_style()),
        Span::styled(" clear", styles::muted_style()),
    ]));

    let block = Block::default()
        .title(" Address lookup ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn field_line(app: &App, field: FormField, focused: bool) -> Line<'static> {
    let marker = if field.is_required() { " *" } else { "" };
    let label = format!(" {}{}", field.label(), marker);

    let value = app.form.value(field);
    let cursor = if focused && app.form.is_editable(field) { "▌" } else { "" };
    let display = format!("{:<width$}", format!("{}{}", value, cursor), width = VALUE_WIDTH);

    let value_style = if focused {
        styles::selected_style()
    } else if field.is_user_editable() {
        styles::list_item_style()
    } else {
        styles::muted_style()
    };

    let mut spans = vec![
        Span::styled(format!("{:<width$}", label, width = LABEL_WIDTH), styles::muted_style()),
        Span::styled("[", styles::muted_style()),
        Span::styled(display, value_style),
        Span::styled("]", styles::muted_style()),
    ];

    if focused && field == FormField::Cep && value.is_empty() {
        spans.push(Span::styled(" 00000-000", styles::muted_style()));
    }

    Line::from(spans)
}
