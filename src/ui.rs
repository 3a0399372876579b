use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget, Wrap},
    Frame,
};

use focusplan::{
    celebration::CelebrationAnimation,
    display::{format_clock, motivation_line, progress_ratio, session_label},
    Phase, TimerStatus,
};

use crate::{App, Surface};

const HORIZONTAL_MARGIN: u16 = 5;
const WIDGET_WIDTH: u16 = 36;
const WIDGET_HEIGHT: u16 = 9;
const HELP: &str = "space start/pause · p pause · r reset · m switch preset · q quit";
const COMPLETION_MESSAGE: &str = "Plan complete! Every focus session is done.";

pub fn draw(f: &mut Frame, app: &App) {
    f.render_widget(app, f.area());
}

fn phase_color(phase: Phase) -> Color {
    match phase {
        Phase::Focus => Color::Magenta,
        Phase::Break => Color::Cyan,
    }
}

fn status_text(app: &App) -> String {
    if let Some(notice) = &app.notice {
        return notice.clone();
    }
    match app.timer.status() {
        TimerStatus::Unconfigured => "Not configured".to_string(),
        TimerStatus::Paused => "Paused".to_string(),
        TimerStatus::Running => "Running".to_string(),
        TimerStatus::Complete => COMPLETION_MESSAGE.to_string(),
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.surface {
            Surface::Page => render_page(self, area, buf),
            Surface::Widget => render_widget(self, area, buf),
        }

        let celebration = self.timer.celebration();
        if celebration.is_active {
            render_confetti(celebration, area, buf);
        }
    }
}

fn render_page(app: &App, area: Rect, buf: &mut Buffer) {
    let timer = &app.timer;
    let color = phase_color(timer.phase());
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(2), // phase
            Constraint::Length(2), // clock
            Constraint::Length(1), // progress
            Constraint::Length(2), // motivation
            Constraint::Length(2), // status
            Constraint::Length(1), // help
            Constraint::Min(0),
        ])
        .split(area);

    let phase_name = match timer.phase() {
        Phase::Focus => "FOCUS",
        Phase::Break => "BREAK",
    };
    Paragraph::new(Span::styled(phase_name, bold.fg(color)))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    Paragraph::new(Span::styled(
        format_clock(timer.remaining_ms()),
        bold.fg(Color::White),
    ))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);

    Gauge::default()
        .gauge_style(Style::default().fg(color))
        .ratio(progress_ratio(timer.remaining_ms(), timer.total_duration_ms()))
        .label("")
        .render(chunks[3], buf);

    if timer.plan().is_some() {
        Paragraph::new(Span::styled(
            motivation_line(
                timer.phase(),
                timer.completed_focus_sessions(),
                timer.total_focus_sessions(),
            ),
            Style::default().add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[4], buf);
    }

    let status_style = if timer.celebration().message_visible {
        bold.fg(Color::Green)
    } else {
        Style::default().fg(Color::Yellow)
    };
    Paragraph::new(Span::styled(status_text(app), status_style))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[5], buf);

    Paragraph::new(Span::styled(
        HELP,
        Style::default().add_modifier(Modifier::DIM),
    ))
    .alignment(Alignment::Center)
    .render(chunks[6], buf);
}

/// The dashboard card: same timer, smaller footprint
fn render_widget(app: &App, area: Rect, buf: &mut Buffer) {
    let timer = &app.timer;
    let color = phase_color(timer.phase());
    let card = centered_rect(WIDGET_WIDTH, WIDGET_HEIGHT, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(" Pomodoro ");
    let inner = block.inner(card);
    block.render(card, buf);

    let mut lines = vec![
        Line::from(Span::styled(
            timer.phase().to_string(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format_clock(timer.remaining_ms()),
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ];
    if timer.plan().is_some() {
        lines.push(Line::from(session_label(
            timer.phase(),
            timer.completed_focus_sessions(),
            timer.total_focus_sessions(),
        )));
    }
    lines.push(Line::from(Span::styled(
        status_text(app),
        Style::default().fg(Color::Yellow),
    )));

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(inner, buf);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Render confetti on top of whatever surface is showing
fn render_confetti(celebration: &CelebrationAnimation, area: Rect, buf: &mut Buffer) {
    let colors = [
        Color::LightRed,
        Color::Yellow,
        Color::Green,
        Color::Blue,
        Color::Magenta,
        Color::LightMagenta,
    ];

    for piece in &celebration.pieces {
        if piece.x < 0.0 || piece.y < 0.0 {
            continue;
        }
        let x = piece.x as u16;
        let y = piece.y as u16;

        if x < area.width && y < area.height {
            let color = colors[piece.color_index % colors.len()];
            if let Some(cell) = buf.cell_mut((area.x + x, area.y + y)) {
                cell.set_symbol(&piece.symbol.to_string());
                cell.set_style(Style::default().fg(color));
            }
        }
    }
}
