use harvest_core::{Submission, ViewMode};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, FocusPane, InputMode};

/// Sidebar entries are cut to this many characters.
const HISTORY_LABEL_WIDTH: usize = 40;

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    let [sidebar_area, main_area] = Layout::horizontal([
        Constraint::Percentage(30),
        Constraint::Percentage(70),
    ])
    .areas(body_area);

    render_header(app, frame, header_area);
    render_sidebar(app, frame, sidebar_area);
    render_main(app, frame, main_area);
    render_footer(app, frame, footer_area);
}

fn border_color(focused: bool) -> Color {
    if focused {
        Color::Cyan
    } else {
        Color::DarkGray
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" Harvest Readiness Q&A ", Style::default().fg(Color::Green).bold()),
        Span::styled(
            format!("v{} ", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
        Span::styled(app.service_url.as_str(), Style::default().fg(Color::Gray)),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_sidebar(app: &mut App, frame: &mut Frame, area: Rect) {
    let [search_area, list_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .areas(area);

    let history_focused = app.focus == FocusPane::History;
    let search_editing = history_focused && app.input_mode == InputMode::Editing;

    let search_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if search_editing {
            Color::Yellow
        } else {
            Color::DarkGray
        }))
        .title(" Search ");

    let search = Paragraph::new(app.view.search.as_str())
        .style(Style::default().fg(Color::Cyan))
        .block(search_block);
    frame.render_widget(search, search_area);

    if search_editing {
        frame.set_cursor_position((
            search_area.x + app.view.search.chars().count() as u16 + 1,
            search_area.y + 1,
        ));
    }

    let selected_id = app.view.selected_id();
    let visible = app.view.visible_history();
    let title = format!(" History ({}/{}) ", visible.len(), app.view.history().len());

    let items: Vec<ListItem> = visible
        .iter()
        .map(|item| {
            let mut label: String = item.question.chars().take(HISTORY_LABEL_WIDTH).collect();
            if item.question.chars().count() > HISTORY_LABEL_WIDTH {
                label.push('…');
            }
            let style = if Some(item.id) == selected_id {
                Style::default().fg(Color::Green)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(vec![
                Span::styled(label, style),
                Span::styled(
                    format!("  {}", item.created_at.format("%H:%M")),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let list_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color(history_focused)))
        .title(title);

    let list = if items.is_empty() {
        let hint = if app.view.history().is_empty() {
            "No questions yet"
        } else {
            "No matches"
        };
        List::new(vec![ListItem::new(Span::styled(
            hint,
            Style::default().fg(Color::DarkGray),
        ))])
        .block(list_block)
    } else {
        List::new(items)
            .block(list_block)
            .highlight_style(
                Style::default()
                    .bg(Color::Blue)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ")
    };

    app.history_area = Some(list_area);
    frame.render_stateful_widget(list, list_area, &mut app.history_state);
}

fn render_main(app: &mut App, frame: &mut Frame, area: Rect) {
    let [conversation_area, composer_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(area);

    app.conversation_area = Some(conversation_area);

    render_conversation(app, frame, conversation_area);
    render_composer(app, frame, composer_area);
}

fn render_conversation(app: &App, frame: &mut Frame, area: Rect) {
    let title = match app.view.mode() {
        ViewMode::NewChat => " New chat ".to_string(),
        ViewMode::Viewing(_) => " Conversation ".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color(app.focus == FocusPane::Conversation)))
        .title(title);

    let user_label = Span::styled(
        "User:",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    );
    let ai_label = Span::styled(
        "AI:",
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    );

    let mut lines: Vec<Line> = Vec::new();
    if let Some(item) = app.view.selected() {
        lines.push(Line::from(user_label));
        lines.push(Line::from(item.question.as_str()));
        lines.push(Line::default());
        lines.push(Line::from(ai_label.clone()));
        lines.extend(item.answer.lines().map(Line::from));
        lines.push(Line::default());
    }

    match app.view.submission() {
        Submission::Submitting => {
            lines.push(Line::from(ai_label));
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!("Submitting{}", dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }
        Submission::Failed(message) => {
            lines.push(Line::from(Span::styled(
                format!("Request failed: {}", message),
                Style::default().fg(Color::Red),
            )));
            lines.push(Line::from(Span::styled(
                "Your question is still in the composer. Press Enter to try again.",
                Style::default().fg(Color::DarkGray),
            )));
        }
        Submission::Idle => {}
    }

    let text = if lines.is_empty() {
        Text::from(Span::styled(
            "Ask a harvest-readiness question...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Text::from(lines)
    };

    let conversation = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.conversation_scroll, 0));
    frame.render_widget(conversation, area);
}

fn render_composer(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.focus == FocusPane::Composer && app.input_mode == InputMode::Editing;
    let border = if editing {
        Color::Yellow
    } else {
        border_color(app.focus == FocusPane::Composer)
    };
    let title = if app.view.is_submitting() {
        " Submitting... "
    } else {
        " Question "
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(title);

    let question = app.view.question();
    let content = if question.is_empty() && !editing {
        Paragraph::new(Span::styled(
            "Press i to type a question",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Paragraph::new(question)
    };
    frame.render_widget(content.block(block), area);

    if editing {
        let inner_width = area.width.saturating_sub(2);
        let cursor_x = (app.query_cursor as u16).min(inner_width.saturating_sub(1));
        frame.set_cursor_position((area.x + 1 + cursor_x, area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let (mode_text, mode_style) = match app.input_mode {
        InputMode::Normal => (" NORMAL ", Style::default().bg(Color::Blue).fg(Color::White)),
        InputMode::Editing => (" EDIT ", Style::default().bg(Color::Yellow).fg(Color::Black)),
    };

    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let keys: &[(&str, &str)] = match (app.input_mode, app.focus) {
        (InputMode::Editing, FocusPane::Composer) => &[(" Enter ", " submit "), (" Esc ", " stop typing ")],
        (InputMode::Editing, _) => &[(" Enter ", " done "), (" Esc ", " done ")],
        (InputMode::Normal, FocusPane::History) => &[
            (" j/k ", " nav "),
            (" Enter ", " open "),
            (" / ", " search "),
            (" n ", " new chat "),
            (" Tab ", " focus "),
            (" q ", " quit "),
        ],
        (InputMode::Normal, _) => &[
            (" i ", " ask "),
            (" j/k ", " scroll "),
            (" c ", " copy "),
            (" n ", " new chat "),
            (" / ", " search "),
            (" Tab ", " focus "),
            (" q ", " quit "),
        ],
    };

    let mut spans = vec![
        Span::styled(mode_text, mode_style),
        Span::styled(" ", label_style),
    ];
    for (key, label) in keys {
        spans.push(Span::styled(*key, key_style));
        spans.push(Span::styled(*label, label_style));
    }
    if let Some(status) = &app.status {
        spans.push(Span::styled(
            format!(" {} ", status),
            Style::default().bg(Color::Black).fg(Color::Green),
        ));
    }

    let footer = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}
