use crate::application::App;
use crate::domain::{FieldKind, FieldValue, Screen};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub fn render_ui(f: &mut Frame, app: &App) {
    let debug_height = if app.options.debug { app.debug_lines().len() as u16 + 2 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(3),
            Constraint::Length(debug_height),
        ])
        .split(f.area());

    render_header(f, app, chunks[0]);
    match app.screen {
        Screen::Loading => render_notice(
            f,
            chunks[1],
            "Загрузка",
            "Проверяем статус заявки...",
            Color::Gray,
        ),
        Screen::HostRequired => render_notice(
            f,
            chunks[1],
            "Нужен Telegram",
            "Это приложение работает только внутри Telegram. Открой его через бота.",
            Color::Yellow,
        ),
        Screen::Form => render_form(f, app, chunks[1]),
        Screen::Pending => render_notice(
            f,
            chunks[1],
            "Заявка на рассмотрении",
            &format!(
                "Мы получили твою заявку. Статус обновляется каждые {} с.",
                app.options.poll_interval.as_secs()
            ),
            Color::Cyan,
        ),
        Screen::Approved => render_notice(
            f,
            chunks[1],
            "Заявка одобрена",
            "Добро пожаловать!",
            Color::Green,
        ),
    }
    render_status_bar(f, app, chunks[2]);
    if app.options.debug {
        render_debug(f, app, chunks[3]);
    }
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let status = app.status().map_or("—", |s| s.as_str());
    let title = format!("tgapply | экран: {} | статус: {}", app.screen.name(), status);
    let header = Paragraph::new(title).style(Style::default().fg(Color::Cyan));
    f.render_widget(header, area);
}

fn render_notice(f: &mut Frame, area: Rect, title: &str, body: &str, color: Color) {
    let notice = Paragraph::new(body.to_string())
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
        .style(Style::default().fg(color));
    f.render_widget(notice, area);
}

fn render_form(f: &mut Frame, app: &App, area: Rect) {
    let mut lines = Vec::new();
    for (index, spec) in app.form.schema().fields().iter().enumerate() {
        let focused = index == app.focus;
        let marker = if focused { "> " } else { "  " };
        let style = if focused { Style::default().fg(Color::Yellow) } else { Style::default() };

        match app.form.value_at(index) {
            Some(FieldValue::Checked(checked)) => {
                let mark = if *checked { "[x]" } else { "[ ]" };
                let label = format!("{marker}{mark} {}", spec.label);
                lines.push(Line::from(Span::styled(label, style)));
            }
            Some(FieldValue::Text(text)) => {
                let (count, max) = app.form.char_count(index).unwrap_or((0, spec.max_len));
                lines.push(Line::from(vec![
                    Span::styled(
                        format!("{marker}{}: ", spec.label),
                        style.add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(format!("{count}/{max}"), Style::default().fg(Color::DarkGray)),
                ]));
                if spec.kind == FieldKind::Multiline {
                    for part in text.split('\n') {
                        lines.push(Line::from(format!("    {part}")));
                    }
                } else {
                    lines.push(Line::from(format!("    {text}")));
                }
            }
            None => {}
        }
    }

    lines.push(Line::from(""));
    let button_style = match (app.submit_enabled, app.focus == app.submit_index()) {
        (true, true) => Style::default().bg(Color::Blue).fg(Color::White),
        (true, false) => Style::default().fg(Color::Blue),
        (false, _) => Style::default().fg(Color::DarkGray),
    };
    let marker = if app.focus == app.submit_index() { "> " } else { "  " };
    lines.push(Line::from(Span::styled(format!("{marker}[ {} ]", app.submit_label), button_style)));

    let form = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Заявка"));
    f.render_widget(form, area);
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let (text, style) = match &app.message {
        Some(line) if line.is_error => (line.text.clone(), Style::default().fg(Color::Red)),
        Some(line) => (line.text.clone(), Style::default().fg(Color::Green)),
        None => {
            let hint = match app.screen {
                Screen::Form => {
                    "Tab/↑↓: поле | Enter: далее/отметить/отправить | Пробел: флажок | Esc: выход"
                }
                _ => "Esc/Ctrl+C: выход",
            };
            (hint.to_string(), Style::default())
        }
    };
    let bar = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Статус"))
        .style(style);
    f.render_widget(bar, area);
}

fn render_debug(f: &mut Frame, app: &App, area: Rect) {
    let lines: Vec<Line> = app
        .debug_lines()
        .into_iter()
        .map(|(label, value)| {
            Line::from(vec![
                Span::styled(format!("{label}: "), Style::default().fg(Color::DarkGray)),
                Span::raw(value),
            ])
        })
        .collect();
    let block = Block::default().borders(Borders::ALL).title("DEBUG (Ctrl+Y: копировать)");
    let panel = Paragraph::new(lines).block(block);
    f.render_widget(panel, area);
}
