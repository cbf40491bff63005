use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

/// Draw the Help popup (F1)
pub fn draw_help(f: &mut Frame) {
    let area = centered_rect(60, 70, f.area());
    f.render_widget(Clear, area);

    let help_text = vec![
        Line::from(Span::styled(
            " wattsaver - power manager for Linux laptops ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(" Navigation ", Style::default().add_modifier(Modifier::BOLD).fg(Color::Yellow))),
        Line::from("  ↑/↓ or k/j  Move selection up/down"),
        Line::from("  Home/End    Jump to first/last entry"),
        Line::from(""),
        Line::from(Span::styled(" Actions ", Style::default().add_modifier(Modifier::BOLD).fg(Color::Yellow))),
        Line::from("  Enter/Space Apply the selected profile/preset/mode"),
        Line::from("  c           Set a custom max frequency (GHz)"),
        Line::from("  v           Set a custom undervolt offset (mV)"),
        Line::from("  F5/r        Re-detect live state and sensors"),
        Line::from(""),
        Line::from(Span::styled(" General ", Style::default().add_modifier(Modifier::BOLD).fg(Color::Yellow))),
        Line::from("  F1/h/?      Show this help"),
        Line::from("  F10/q       Quit wattsaver"),
        Line::from("  Ctrl+C      Quit"),
        Line::from(""),
        Line::from("  Changes are applied through pkexec and the"),
        Line::from("  wattsaver helper script; nothing is written"),
        Line::from("  to sysfs without authentication."),
        Line::from(""),
        Line::from(Span::styled(
            " Press Esc or F1 to close ",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help ")
                .title_alignment(Alignment::Center)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .style(Style::default().fg(Color::White).bg(Color::Black))
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, area);
}

/// Create a centered rectangle with percentage width/height
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
