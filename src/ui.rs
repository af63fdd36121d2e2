// Layout and rendering: status block with title badge, liveness line,
// progress gauge, optional diagnostics panel, and the key help footer.
// Draws straight from `Session`; no I/O.

use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Gauge, Padding, Paragraph};
use ratatui::Frame;

use crate::app::{Phase, Session, FULL_HELP, SHORT_HELP};
use crate::theme::Theme;

pub const SPINNER: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

const TITLE: &str = "VBS player";
const MAX_WIDTH: u16 = 80;
const TITLE_WIDTH: u16 = 18;
const STATUS_HEIGHT: u16 = 7;

pub fn draw(frame: &mut Frame, session: &Session, theme: &Theme) {
    let outer = Block::default().padding(Padding::new(4, 0, 2, 0));
    let mut area = outer.inner(frame.area());
    area.width = area.width.min(MAX_WIDTH);

    let diagnostics_height = if session.show_diagnostics() {
        u16::try_from(session.event_log().capacity())
            .unwrap_or(u16::MAX)
            .saturating_add(2)
    } else {
        0
    };
    let help_height = if session.show_help() {
        FULL_HELP.iter().map(|col| col.len()).max().unwrap_or(0) as u16
    } else {
        1
    };

    let rows = Layout::vertical([
        Constraint::Length(STATUS_HEIGHT),
        Constraint::Length(2),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(diagnostics_height),
        Constraint::Length(help_height),
        Constraint::Min(0),
    ])
    .split(area);

    draw_status(frame, rows[0], session, theme);
    draw_activity(frame, rows[1], session, theme);
    draw_progress(frame, rows[2], session, theme);
    if session.show_diagnostics() {
        draw_diagnostics(frame, rows[4], session, theme);
    }
    draw_help(frame, rows[5], session.show_help(), theme);
}

fn draw_status(frame: &mut Frame, area: Rect, session: &Session, theme: &Theme) {
    let cols = Layout::horizontal([Constraint::Min(0), Constraint::Length(TITLE_WIDTH)]).split(area);

    let field = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("{}: ", label), Style::default().fg(theme.label)),
            Span::styled(value, Style::default().fg(theme.text)),
        ])
    };

    let lines = vec![
        field("Current item", session.media_path().display().to_string()),
        field("Remaining time", format_remaining(session.seconds_remaining())),
        field("Output screen", session.output_screen().to_string()),
        field("Fullscreen", session.is_full_screen().to_string()),
        field("Playing", session.is_playing().to_string()),
        field("State", phase_label(session).to_string()),
    ];
    frame.render_widget(Paragraph::new(lines), cols[0]);

    let title = Paragraph::new(TITLE)
        .alignment(Alignment::Center)
        .style(Style::default().fg(theme.title_fg).bg(theme.title_bg))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .padding(Padding::vertical(1)),
        );
    frame.render_widget(title, cols[1]);
}

fn draw_activity(frame: &mut Frame, area: Rect, session: &Session, theme: &Theme) {
    let spinner = SPINNER[(session.frame_count() as usize) % SPINNER.len()];
    let mut lines = vec![Line::from(vec![
        Span::styled(spinner, Style::default().fg(theme.spinner)),
        Span::raw(format!(" Events received: {}", session.response_count())),
    ])];
    if let Some(err) = session.connect_error() {
        lines.push(Line::from(Span::styled(
            format!("Could not connect to mpv: {}", err),
            Style::default().fg(theme.error),
        )));
    }
    frame.render_widget(Paragraph::new(lines), area);
}

fn draw_progress(frame: &mut Frame, area: Rect, session: &Session, theme: &Theme) {
    let ratio = progress_ratio(session.percent_position());
    let gauge = Gauge::default()
        .ratio(ratio)
        .label(format!("{:.0}%", ratio * 100.0))
        .gauge_style(Style::default().fg(theme.gauge));
    frame.render_widget(gauge, area);
}

fn draw_diagnostics(frame: &mut Frame, area: Rect, session: &Session, theme: &Theme) {
    let lines: Vec<Line> = session
        .event_log()
        .iter()
        .map(|entry| Line::from(entry.to_string()))
        .collect();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .title(" Debug messages ")
        .title_alignment(Alignment::Right);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_help(frame: &mut Frame, area: Rect, expanded: bool, theme: &Theme) {
    let key_style = Style::default().fg(theme.key).add_modifier(Modifier::BOLD);
    let desc_style = Style::default().fg(theme.text_dim);

    if !expanded {
        let mut spans = Vec::new();
        for (i, (key, desc)) in SHORT_HELP.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" • ", desc_style));
            }
            spans.push(Span::styled(*key, key_style));
            spans.push(Span::styled(format!(" {}", desc), desc_style));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
        return;
    }

    let constraints = vec![Constraint::Ratio(1, FULL_HELP.len() as u32); FULL_HELP.len()];
    let cols = Layout::horizontal(constraints).split(area);
    for (column, col_area) in FULL_HELP.iter().zip(cols.iter()) {
        let lines: Vec<Line> = column
            .iter()
            .map(|(key, desc)| {
                Line::from(vec![
                    Span::styled(*key, key_style),
                    Span::styled(format!(" {}", desc), desc_style),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), *col_area);
    }
}

fn phase_label(session: &Session) -> &'static str {
    match session.phase() {
        Phase::Connecting => "connecting",
        Phase::Active => "connected",
        Phase::Quitting => "quitting",
        Phase::Terminated => "stopped",
    }
}

/// Gauge ratio for a progress fraction, clamped to `0.0..=1.0`.
pub fn progress_ratio(percent: f64) -> f64 {
    if percent.is_finite() {
        percent.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// `h:mm:ss` or `m:ss`; `--:--` while unknown.
pub fn format_remaining(seconds: Option<f64>) -> String {
    let Some(seconds) = seconds.filter(|s| s.is_finite()) else {
        return "--:--".to_string();
    };
    let total = seconds.max(0.0).round() as u64;
    let (hours, minutes, secs) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}
