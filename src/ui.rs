use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, FocusPane, InputMode};
use crate::conversation::Role;

/// Colors that differ between the light and dark themes
struct Palette {
    background: Color,
    text: Color,
    dim: Color,
    accent: Color,
    user: Color,
    assistant: Color,
}

fn palette(dark_mode: bool) -> Palette {
    if dark_mode {
        Palette {
            background: Color::Black,
            text: Color::White,
            dim: Color::DarkGray,
            accent: Color::Cyan,
            user: Color::Cyan,
            assistant: Color::Yellow,
        }
    } else {
        Palette {
            background: Color::White,
            text: Color::Black,
            dim: Color::Gray,
            accent: Color::Blue,
            user: Color::Blue,
            assistant: Color::Magenta,
        }
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    let colors = palette(app.dark_mode);

    frame.render_widget(
        Block::default().style(Style::default().bg(colors.background)),
        area,
    );

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area, &colors);
    render_body(app, frame, body_area, &colors);
    render_footer(app, frame, footer_area, &colors);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect, colors: &Palette) {
    let mode = if app.dark_mode { "sombre" } else { "clair" };
    let title = Line::from(vec![
        Span::styled(" causerie ", Style::default().fg(colors.accent).bold()),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(colors.dim),
        ),
        Span::raw(" "),
        Span::styled(format!("[{}]", mode), Style::default().fg(colors.dim)),
    ]);

    frame.render_widget(Paragraph::new(title), area);
}

fn render_body(app: &mut App, frame: &mut Frame, area: Rect, colors: &Palette) {
    let [sidebar_area, main_area] =
        Layout::horizontal([Constraint::Length(30), Constraint::Min(0)]).areas(area);

    let [chat_area, input_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(3)]).areas(main_area);

    // Store areas for mouse hit-testing
    app.sidebar_area = Some(sidebar_area);
    app.chat_area = Some(chat_area);

    // Store chat dimensions for scroll calculations (inner size minus borders)
    app.chat_height = chat_area.height.saturating_sub(2);
    app.chat_width = chat_area.width.saturating_sub(2);

    render_sidebar(app, frame, sidebar_area, colors);
    render_chat(app, frame, chat_area, colors);
    render_input(app, frame, input_area, colors);
}

fn render_sidebar(app: &mut App, frame: &mut Frame, area: Rect, colors: &Palette) {
    let focused = app.focus == FocusPane::Sidebar;
    let border_color = if focused { colors.accent } else { colors.dim };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Conversations ");

    let active_id = app.store.active_id();
    let selected = app.selected_index();

    let items: Vec<ListItem> = app
        .store
        .conversations()
        .iter()
        .enumerate()
        .map(|(i, conv)| {
            // Inline rename editor replaces the title of the selected row
            let title: String = if i == selected && app.rename_input.is_some() {
                app.rename_input.clone().unwrap_or_default()
            } else {
                conv.title.clone()
            };

            let is_active = Some(conv.id) == active_id;
            let title_style = if is_active {
                Style::default()
                    .fg(colors.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.text)
            };

            let date = conv.created_at.format("%d %b").to_string();
            let mut meta = vec![Span::styled(date, Style::default().fg(colors.dim))];
            if is_active && app.store.is_loading() {
                meta.push(Span::styled(
                    " ...",
                    Style::default().fg(colors.assistant),
                ));
            }

            ListItem::new(vec![
                Line::from(Span::styled(title, title_style)),
                Line::from(meta),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(border_color).fg(colors.background))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.sidebar_state);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect, colors: &Palette) {
    let focused = app.focus == FocusPane::Chat;
    let border_color = if focused { colors.accent } else { colors.dim };

    let title = app
        .store
        .active()
        .map(|conv| format!(" {} ", conv.title))
        .unwrap_or_else(|| " causerie ".to_string());

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    let messages = app.store.active().map(|c| c.messages.as_slice()).unwrap_or(&[]);

    let chat_text = if messages.is_empty() && !app.store.is_loading() {
        Text::from(Span::styled(
            "Écrivez un message pour commencer...",
            Style::default().fg(colors.dim),
        ))
    } else {
        let mut lines: Vec<Line> = Vec::new();

        for msg in messages {
            let (label, label_color) = match msg.role {
                Role::User => ("Vous :", colors.user),
                Role::Assistant => ("IA :", colors.assistant),
            };
            lines.push(Line::from(Span::styled(
                label,
                Style::default()
                    .fg(label_color)
                    .add_modifier(Modifier::BOLD),
            )));
            for line in msg.content.lines() {
                lines.push(Line::from(Span::styled(
                    line.to_string(),
                    Style::default().fg(colors.text),
                )));
            }
            lines.push(Line::default());
        }

        if app.store.is_loading() {
            lines.push(Line::from(Span::styled(
                "IA :",
                Style::default()
                    .fg(colors.assistant)
                    .add_modifier(Modifier::BOLD),
            )));
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!("Réflexion{}", dots),
                Style::default().fg(colors.dim).add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    let chat = Paragraph::new(chat_text)
        .block(block)
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect, colors: &Palette) {
    let editing = app.input_mode == InputMode::Editing;
    let border_color = if editing { colors.accent } else { colors.dim };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Message (i pour écrire) ");

    // Horizontal scroll keeps the cursor visible in a narrow input
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.message_cursor;
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app
        .message_input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(colors.user))
        .block(block);

    frame.render_widget(input, area);

    if editing {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect, colors: &Palette) {
    let help = if app.rename_input.is_some() {
        " Entrée: valider  Échap: annuler "
    } else {
        match app.input_mode {
            InputMode::Editing => " Entrée: envoyer  Échap: quitter la saisie ",
            InputMode::Normal => {
                " n: nouvelle  d: supprimer  r: renommer  J/K: déplacer  t: thème  q: quitter "
            }
        }
    };

    frame.render_widget(
        Paragraph::new(Span::styled(help, Style::default().fg(colors.dim))),
        area,
    );
}
