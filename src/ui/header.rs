use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::App;
use crate::system::profiles::ProfileKey;

/// Draw the header block: CPU identity on top, live sensor readings below.
///
///   ┌ WattSaver ────────────────────────────────┐
///   │ Intel(R) Core(TM) i7-8550U CPU @ 1.80GHz  │
///   │ Driver: intel_pstate | Cores: 8           │
///   │ CPU: 1823 MHz (8 cores)    Temp: 47 °C    │
///   │ Profile: ▄ Balanced (1.80 GHz)            │
///   └───────────────────────────────────────────┘
pub fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let label_style = Style::default().fg(Color::DarkGray);
    let value_style = Style::default().fg(Color::White);

    let freq_text = match app.sensors.avg_freq_mhz {
        Some(mhz) => format!("{:.0} MHz  ({} cores)", mhz, app.sensors.cores_read),
        None => "N/A".to_string(),
    };
    let temp_text = match app.sensors.temp_c {
        Some(t) => format!("{:.0} °C", t),
        None => "N/A".to_string(),
    };

    let profile_line = match app.profile(app.current_profile) {
        Some(p) => Line::from(vec![
            Span::styled("Profile: ", label_style),
            Span::styled(
                format!("{} {}", p.icon.glyph(), p.label),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
        ]),
        None => Line::from(vec![
            Span::styled("Profile: ", label_style),
            Span::styled(
                app.current_profile.name(),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ]),
    };

    let mut info = Line::from(vec![
        Span::styled("Driver: ", label_style),
        Span::styled(app.caps.driver.clone(), value_style),
        Span::styled("  |  Cores: ", label_style),
        Span::styled(app.caps.online_cores.to_string(), value_style),
        Span::styled("  |  Governors: ", label_style),
        Span::styled(app.caps.governors.join(" "), value_style),
    ]);
    // Unknown profiles happen when external tooling set a frequency; flag it
    if app.current_profile == ProfileKey::Custom {
        info.spans.push(Span::styled(
            "  [custom]",
            Style::default().fg(Color::Yellow),
        ));
    }

    let lines = vec![
        Line::from(Span::styled(
            app.caps.model.clone(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        info,
        Line::from(vec![
            Span::styled("CPU: ", label_style),
            Span::styled(freq_text, value_style),
            Span::styled("    Temp: ", label_style),
            Span::styled(temp_text, value_style),
        ]),
        profile_line,
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" WattSaver ")
        .title_alignment(Alignment::Left)
        .border_style(Style::default().fg(Color::DarkGray));

    f.render_widget(Paragraph::new(lines).block(block), area);
}
