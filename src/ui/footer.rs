use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{App, AppMode};

/// Key definitions: (key_label, description)
const KEYS_NORMAL: &[(&str, &str)] = &[
    ("F1", "Help  "),
    ("↑↓", "Select"),
    ("Enter", "Apply "),
    ("c", "Custom GHz "),
    ("v", "Custom mV "),
    ("F5", "Redetect "),
    ("F10", "Quit "),
];

const KEYS_INPUT: &[(&str, &str)] = &[
    ("Esc", "Cancel "),
    ("Enter", "Accept "),
    ("F10", "Quit "),
];

const KEYS_CONFIRM: &[(&str, &str)] = &[
    ("y/Enter", "Confirm "),
    ("n/Esc", "Cancel "),
];

/// Draw the bottom key bar plus the status line above it.
pub fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    // Status line (row 0): pending action or last applied change
    let status = if let Some(pending) = &app.pending {
        format!("Applying {}...", describe_pending(pending))
    } else {
        app.status_line.clone()
    };
    let status_area = Rect { height: 1, ..area };
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            status,
            Style::default().fg(Color::Indexed(245)),
        ))),
        status_area,
    );

    if area.height < 2 {
        return;
    }
    let bar_area = Rect {
        y: area.y + 1,
        height: 1,
        ..area
    };

    // Full-width dark background first
    let bg_fill = " ".repeat(bar_area.width as usize);
    f.render_widget(
        Paragraph::new(bg_fill).style(Style::default().bg(Color::Indexed(234))),
        bar_area,
    );

    let keys = match app.mode {
        AppMode::CustomFreq | AppMode::CustomUndervolt => KEYS_INPUT,
        AppMode::ConfirmGpu => KEYS_CONFIRM,
        _ => KEYS_NORMAL,
    };

    let mut spans: Vec<Span> = Vec::new();
    for (key, desc) in keys {
        // Key label: black text on cyan background (htop style)
        spans.push(Span::styled(
            key.to_string(),
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));
        // Description: light text on dark background
        spans.push(Span::styled(
            desc.to_string(),
            Style::default()
                .fg(Color::Indexed(252))
                .bg(Color::Indexed(234)),
        ));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), bar_area);
}

fn describe_pending(pending: &crate::app::PendingAction) -> &'static str {
    use crate::app::ActionKind;
    match pending.kind {
        ActionKind::Profile(..) | ActionKind::CustomFreq(_) => "frequency change",
        ActionKind::Undervolt(_) | ActionKind::CustomUndervolt(_) => "undervolt",
        ActionKind::Gpu(_) => "GPU switch",
    }
}
