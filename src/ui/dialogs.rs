use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::app::App;
use crate::ui::help::centered_rect;

/// Custom frequency entry (GHz within the detected hardware range).
pub fn draw_custom_freq(f: &mut Frame, app: &App) {
    let min_ghz = app.caps.hw_min_khz as f64 / 1_000_000.0;
    let max_ghz = app.caps.hw_max_khz as f64 / 1_000_000.0;
    draw_input_popup(
        f,
        app,
        " Custom CPU Frequency ",
        &format!(
            "Enter max CPU frequency in GHz\nRange: {:.2} - {:.2} GHz",
            min_ghz, max_ghz
        ),
        "GHz",
    );
}

/// Custom undervolt entry (0 to -200 mV).
pub fn draw_custom_undervolt(f: &mut Frame, app: &App) {
    draw_input_popup(
        f,
        app,
        " Custom Undervolt ",
        "Enter undervolt offset in mV (0 to -200)\nWARNING: Aggressive values may cause crashes.",
        "mV",
    );
}

fn draw_input_popup(f: &mut Frame, app: &App, title: &str, prompt: &str, unit: &str) {
    let area = fixed_popup(f.area(), 46, 8);
    f.render_widget(Clear, area);

    let mut lines: Vec<Line> = prompt.lines().map(Line::from).collect();
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("> ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            app.input_buffer.clone(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::styled("▏", Style::default().fg(Color::Cyan)),
        Span::styled(format!(" {}", unit), Style::default().fg(Color::DarkGray)),
    ]));
    if let Some(err) = &app.input_error {
        lines.push(Line::from(Span::styled(
            err.clone(),
            Style::default().fg(Color::Red),
        )));
    }

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title.to_string())
                .title_alignment(Alignment::Center)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .style(Style::default().fg(Color::White).bg(Color::Black))
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, area);
}

/// GPU switch confirmation — a reboot is required, so never one-key apply.
pub fn draw_confirm_gpu(f: &mut Frame, app: &App) {
    let area = fixed_popup(f.area(), 46, 7);
    f.render_widget(Clear, area);

    let mode = app
        .gpu_target
        .map(|m| m.as_str())
        .unwrap_or("unknown");

    let lines = vec![
        Line::from(format!("Switch GPU to {}?", mode)),
        Line::from(""),
        Line::from(Span::styled(
            "A reboot is required for the change to take effect.",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " y/Enter confirm   n/Esc cancel ",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Switch GPU Mode ")
                .title_alignment(Alignment::Center)
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .style(Style::default().fg(Color::White).bg(Color::Black))
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, area);
}

/// Modal info/error popup (helper failures, GPU switch notice).
pub fn draw_message(f: &mut Frame, app: &App) {
    let area = centered_rect(50, 30, f.area());
    f.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(app.message_body.clone()),
        Line::from(""),
        Line::from(Span::styled(
            " Press Esc or Enter to close ",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", app.message_title))
                .title_alignment(Alignment::Center)
                .border_style(Style::default().fg(Color::Red)),
        )
        .style(Style::default().fg(Color::White).bg(Color::Black))
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, area);
}

/// Fixed-size popup clamped to the terminal.
fn fixed_popup(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect {
        x: area.x + (area.width - w) / 2,
        y: area.y + (area.height - h) / 2,
        width: w,
        height: h,
    }
}
