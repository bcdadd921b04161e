use std::sync::OnceLock;
use std::time::Instant;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Popup, Section};
use crate::config::ThemeConfig;
use crate::contact::{BannerKind, Field};
use crate::gallery::LoadState;
use crate::theme::Theme;

// Loaded once at startup from the config's [theme] table
static THEME: OnceLock<Theme> = OnceLock::new();

pub fn init_theme(config: &ThemeConfig) {
    let _ = THEME.set(Theme::load(config));
}

fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::default)
}

// Helper functions to get theme colors
fn accent() -> Color { theme().accent }
fn inactive() -> Color { theme().inactive }
fn success() -> Color { theme().success }
fn warning() -> Color { theme().warning }
fn danger() -> Color { theme().danger }
fn text() -> Color { theme().text }
fn text_dim() -> Color { theme().text_dim }
fn bg_selected() -> Color { theme().bg_selected }
fn header() -> Color { theme().header }

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Info line
            Constraint::Min(10),   // Contact + Projects
            Constraint::Length(1), // Footer
        ])
        .split(area);

    // Stack the boxes on narrow terminals
    let body = if area.width < 90 {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[1])
    } else {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(chunks[1])
    };

    draw_info_line(f, app, chunks[0]);
    draw_contact_box(f, app, body[0]);
    draw_projects_box(f, app, body[1]);
    draw_footer(f, app, chunks[2]);

    // Draw popups on top
    match app.popup {
        Popup::None => {}
        Popup::Help => draw_help_popup(f),
        Popup::ProjectDetail => draw_detail_popup(f, app),
    }
}

fn section_block(title: &str, is_active: bool) -> Block<'_> {
    let border_color = if is_active { accent() } else { inactive() };
    let title_style = if is_active {
        Style::default().fg(accent()).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(inactive())
    };

    Block::default()
        .title(Span::styled(title, title_style))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
}

fn draw_info_line(f: &mut Frame, app: &App, area: Rect) {
    // Priority: status message > success countdown > API origin
    let line = if let Some(ref status) = app.status_message {
        Line::from(Span::styled(status, Style::default().fg(warning())))
    } else if let Some(secs) = app.contact.reset_remaining(Instant::now()) {
        Line::from(vec![
            Span::styled("󰔟 ", Style::default().fg(success())),
            Span::styled(format!("Form clears in {}s", secs), Style::default().fg(text())),
        ])
    } else {
        Line::from(vec![
            Span::styled("󰖟 ", Style::default().fg(text_dim())),
            Span::styled(app.api_url(), Style::default().fg(text_dim())),
        ])
    };

    let info = Paragraph::new(line).alignment(Alignment::Center);
    f.render_widget(info, area);
}

fn draw_contact_box(f: &mut Frame, app: &App, area: Rect) {
    let is_active = app.section == Section::Contact && app.popup == Popup::None;
    let block = section_block(" Send a Message ", is_active);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let methods = app.config.contact_methods.len() as u16;
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),              // Name
            Constraint::Length(3),              // Email
            Constraint::Length(3),              // Subject
            Constraint::Min(4),                 // Message
            Constraint::Length(3),              // Banner / send hint
            Constraint::Length(methods.min(4) + 2), // Contact methods
        ])
        .split(inner);

    for (idx, field) in Field::ALL.iter().enumerate() {
        draw_field(f, app, *field, rows[idx]);
    }
    draw_banner(f, app, rows[4]);
    draw_contact_methods(f, app, rows[5]);
}

fn draw_field(f: &mut Frame, app: &App, field: Field, area: Rect) {
    let focused = app.section == Section::Contact && app.focused_field == field;
    let editable = app.contact.is_editable();
    let value = app.contact.form().draft().get(field);

    let border_color = match (focused, editable) {
        (true, true) => accent(),
        (true, false) => text_dim(),
        _ => inactive(),
    };

    let content: Vec<Line> = if value.is_empty() && !focused {
        vec![Line::from(Span::styled(field.placeholder(), Style::default().fg(text_dim())))]
    } else {
        let mut lines: Vec<Line> = value
            .split('\n')
            .map(|l| Line::from(Span::styled(l.to_string(), Style::default().fg(text()))))
            .collect();
        if focused && editable {
            if let Some(last) = lines.last_mut() {
                last.spans.push(Span::styled("▏", Style::default().fg(accent())));
            }
        }
        lines
    };

    // Keep the cursor line visible in the message box
    let visible = area.height.saturating_sub(2) as usize;
    let scroll = content.len().saturating_sub(visible) as u16;

    let widget = Paragraph::new(content)
        .block(
            Block::default()
                .title(Span::styled(format!(" {} ", field.label()), Style::default().fg(border_color)))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color)),
        )
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));

    f.render_widget(widget, area);
}

fn draw_banner(f: &mut Frame, app: &App, area: Rect) {
    let line = match app.contact.banner() {
        Some((kind, message)) => {
            let (icon, color) = match kind {
                BannerKind::Info => ("󰔟", warning()),
                BannerKind::Success => ("󰄬", success()),
                BannerKind::Error => ("󰅚", danger()),
            };
            Line::from(vec![
                Span::styled(format!("{} ", icon), Style::default().fg(color)),
                Span::styled(message.to_string(), Style::default().fg(color).add_modifier(Modifier::BOLD)),
            ])
        }
        None => Line::from(vec![
            Span::styled("F2", Style::default().fg(accent())),
            Span::styled("/", Style::default().fg(inactive())),
            Span::styled("Ctrl+S", Style::default().fg(accent())),
            Span::styled(" Send Message", Style::default().fg(text_dim())),
        ]),
    };

    let banner = Paragraph::new(line)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::TOP).border_style(Style::default().fg(inactive())));

    f.render_widget(banner, area);
}

fn draw_contact_methods(f: &mut Frame, app: &App, area: Rect) {
    let lines: Vec<Line> = app
        .config
        .contact_methods
        .iter()
        .map(|m| {
            Line::from(vec![
                Span::styled(format!("{:<10}", m.label), Style::default().fg(header())),
                Span::styled(m.value.clone(), Style::default().fg(text())),
            ])
        })
        .collect();

    let widget = Paragraph::new(lines).block(
        Block::default()
            .title(Span::styled(" Reach me ", Style::default().fg(inactive())))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(inactive())),
    );
    f.render_widget(widget, area);
}

fn draw_projects_box(f: &mut Frame, app: &App, area: Rect) {
    let is_active = app.section == Section::Projects && app.popup == Popup::None;
    let title = format!(
        " Projects ({} of {} techs) ",
        app.gallery.filter_label(),
        app.gallery.techs().len()
    );
    let block = section_block(&title, is_active);
    let inner = block.inner(area);
    f.render_widget(block, area);

    match &app.gallery.state {
        LoadState::Loading => {
            let loading = Paragraph::new(Span::styled("Loading projects...", Style::default().fg(text_dim())))
                .alignment(Alignment::Center);
            f.render_widget(loading, inner);
            return;
        }
        LoadState::Failed(message) => {
            let failed = Paragraph::new(vec![
                Line::from(Span::styled(message.as_str(), Style::default().fg(danger()))),
                Line::from(""),
                Line::from(vec![
                    Span::styled("r", Style::default().fg(accent())),
                    Span::styled(" Retry", Style::default().fg(text_dim())),
                ]),
            ])
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
            f.render_widget(failed, inner);
            return;
        }
        LoadState::Loaded => {}
    }

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(5)])
        .split(inner);

    let projects = app.gallery.filtered();
    if projects.is_empty() {
        let empty = Paragraph::new(Span::styled("No projects", Style::default().fg(text_dim())))
            .alignment(Alignment::Center);
        f.render_widget(empty, parts[0]);
        return;
    }

    let items: Vec<ListItem> = projects
        .iter()
        .map(|p| {
            ListItem::new(vec![
                Line::from(Span::styled(p.title.clone(), Style::default().fg(text()).add_modifier(Modifier::BOLD))),
                Line::from(Span::styled(format!("  {}", p.tech_stack.join(" · ")), Style::default().fg(text_dim()))),
            ])
        })
        .collect();

    let list = List::new(items)
        .highlight_style(Style::default().bg(bg_selected()))
        .highlight_symbol("▶ ");
    let mut state = ListState::default().with_selected(Some(app.gallery.selected_index()));
    f.render_stateful_widget(list, parts[0], &mut state);

    if let Some(project) = app.gallery.selected() {
        let summary = Paragraph::new(Span::styled(project.description.as_str(), Style::default().fg(text())))
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::TOP).border_style(Style::default().fg(inactive())));
        f.render_widget(summary, parts[1]);
    }
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let hints: Vec<(&str, &str)> = match app.section {
        Section::Contact => vec![
            ("Tab", "Next"),
            ("F2", "Send"),
            ("F5", "Reload"),
            ("F1", "Help"),
            ("Ctrl+Q", "Quit"),
        ],
        Section::Projects => vec![
            ("↑↓", "Nav"),
            ("Enter", "Details"),
            ("f", "Filter"),
            ("r", "Reload"),
            ("Tab", "Form"),
            ("q", "Quit"),
        ],
    };

    // Responsive: show fewer hints on narrow terminals
    let max_hints = if area.width < 60 { 4 } else { hints.len() };

    let hint_spans: Vec<Span> = hints
        .iter()
        .take(max_hints)
        .flat_map(|(key, action)| {
            vec![
                Span::styled(*key, Style::default().fg(accent())),
                Span::styled(format!(" {} │ ", action), Style::default().fg(text_dim())),
            ]
        })
        .collect();

    let footer = Paragraph::new(Line::from(hint_spans)).alignment(Alignment::Center);
    f.render_widget(footer, area);
}

fn draw_detail_popup(f: &mut Frame, app: &App) {
    let Some(project) = app.detail.as_ref() else {
        return;
    };

    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 80 { 90 } else { 60 },
        if area.height < 30 { 80 } else { 50 },
        area,
    );
    f.render_widget(Clear, popup_area);

    let link = |label: &'static str, value: Option<&String>| {
        Line::from(vec![
            Span::styled(format!("  {:<8}", label), Style::default().fg(header())),
            match value {
                Some(url) => Span::styled(url.clone(), Style::default().fg(accent())),
                None => Span::styled("n/a", Style::default().fg(text_dim())),
            },
        ])
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!("  {}", project.description), Style::default().fg(text()))),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Stack   ", Style::default().fg(header())),
            Span::styled(project.tech_stack.join(", "), Style::default().fg(text())),
        ]),
        link("GitHub", project.github_url.as_ref()),
        link("Live", project.live_url.as_ref()),
    ];
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("  Press ", Style::default().fg(text_dim())),
        Span::styled("Esc", Style::default().fg(accent())),
        Span::styled(" to close", Style::default().fg(text_dim())),
    ]));

    let detail = Paragraph::new(lines)
        .block(
            Block::default()
                .title(Span::styled(format!(" {} ", project.title), Style::default().fg(accent())))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent())),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(detail, popup_area);
}

fn draw_help_popup(f: &mut Frame) {
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 80 { 95 } else { 70 },
        if area.height < 40 { 95 } else { 80 },
        area,
    );

    f.render_widget(Clear, popup_area);

    let heading = |title: &'static str| {
        Line::from(Span::styled(title, Style::default().fg(header()).add_modifier(Modifier::BOLD)))
    };
    let entry = |keys: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<12}", keys), Style::default().fg(accent())),
            Span::raw(what),
        ])
    };

    let help_text = vec![
        heading("═══ Navigation ═══"),
        entry("Tab", "Next field (Name → Email → Subject → Message → Projects)"),
        entry("Shift+Tab", "Previous field"),
        entry("↑/↓", "Move between fields or projects"),
        Line::from(""),
        heading("═══ Contact Form ═══"),
        entry("F2 / Ctrl+S", "Send the message (all fields required)"),
        entry("Enter", "Next field; newline inside Message"),
        entry("Backspace", "Delete the last character"),
        Line::from(vec![Span::raw("              The form clears a few seconds after a successful send")]),
        Line::from(""),
        heading("═══ Projects ═══"),
        entry("Enter", "Show project details"),
        entry("f", "Cycle technology filter"),
        entry("r / F5", "Reload projects"),
        Line::from(""),
        heading("═══ Command Line ═══"),
        entry("folio", "Launch this TUI"),
        entry("--projects", "Print projects as JSON"),
        entry("--health", "Check the API"),
        entry("--send", "Send a message without the TUI"),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", Style::default().fg(text_dim())),
            Span::styled("F1", Style::default().fg(accent())),
            Span::styled("/", Style::default().fg(text_dim())),
            Span::styled("Esc", Style::default().fg(accent())),
            Span::styled(" to close, ", Style::default().fg(text_dim())),
            Span::styled("Ctrl+Q", Style::default().fg(accent())),
            Span::styled(" to quit", Style::default().fg(text_dim())),
        ]),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(Span::styled(" 󰋖 folio Help ", Style::default().fg(accent())))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent())),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::config::AppConfig;
    use ratatui::{backend::TestBackend, Terminal};

    fn render(app: &App) -> String {
        let backend = TestBackend::new(120, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_renders_form_and_loading_gallery() {
        let client = ApiClient::new("http://localhost:5000", None).unwrap();
        let app = App::new(AppConfig::default(), client);
        let screen = render(&app);

        assert!(screen.contains("Send a Message"));
        assert!(screen.contains("Subject"));
        assert!(screen.contains("Loading projects..."));
        assert!(screen.contains("hello@example.com"));
    }

    #[test]
    fn test_centered_rect_fits_inside() {
        let outer = Rect::new(0, 0, 100, 50);
        let inner = centered_rect(60, 50, outer);
        assert_eq!(inner.width, 60);
        assert_eq!(inner.height, 25);
        assert_eq!(inner.x, 20);
    }
}
