use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

use crate::app::{App, MenuEntry};
use crate::system::profiles::{UndervoltKey, UNDERVOLT_PRESETS};

/// Draw the sectioned selection menu: power profiles, undervolt presets
/// (when intel-undervolt is installed) and GPU modes (when envycontrol is).
pub fn draw_menu(f: &mut Frame, app: &App, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();
    let mut prev_section = None;

    // Widest label decides the marker column so radio rows line up.
    let label_width = app
        .entries
        .iter()
        .map(|e| entry_label(app, *e).width())
        .max()
        .unwrap_or(0);

    for (idx, entry) in app.entries.iter().enumerate() {
        let section = section_of(*entry);
        if prev_section != Some(section) {
            if prev_section.is_some() {
                lines.push(Line::from(""));
            }
            lines.push(Line::from(Span::styled(
                section_title(section),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )));
            prev_section = Some(section);
        }
        lines.push(entry_line(app, *entry, idx == app.selected_index, label_width));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    f.render_widget(Paragraph::new(lines).block(block), area);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Profiles,
    Undervolt,
    Gpu,
}

fn section_of(entry: MenuEntry) -> Section {
    match entry {
        MenuEntry::Profile(_) | MenuEntry::CustomFreq => Section::Profiles,
        MenuEntry::Undervolt(_) | MenuEntry::CustomUndervolt => Section::Undervolt,
        MenuEntry::Gpu(_) => Section::Gpu,
    }
}

fn section_title(section: Section) -> &'static str {
    match section {
        Section::Profiles => " Power Profile ",
        Section::Undervolt => " Undervolt Preset ",
        Section::Gpu => " GPU Mode ",
    }
}

fn entry_label(app: &App, entry: MenuEntry) -> String {
    match entry {
        MenuEntry::Profile(i) => {
            let p = &app.profiles[i];
            format!("{} {}", p.icon.glyph(), p.label)
        }
        MenuEntry::CustomFreq => "Custom frequency...".to_string(),
        MenuEntry::Undervolt(i) => UNDERVOLT_PRESETS[i].1.to_string(),
        MenuEntry::CustomUndervolt => "Custom undervolt...".to_string(),
        MenuEntry::Gpu(mode) => {
            let name = mode.as_str();
            let mut chars = name.chars();
            match chars.next() {
                Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        }
    }
}

fn is_active(app: &App, entry: MenuEntry) -> bool {
    match entry {
        MenuEntry::Profile(i) => app.profiles[i].key == app.current_profile,
        MenuEntry::Undervolt(i) => UNDERVOLT_PRESETS[i].0 == app.current_undervolt,
        MenuEntry::Gpu(mode) => mode == app.gpu_mode,
        MenuEntry::CustomFreq => false,
        MenuEntry::CustomUndervolt => {
            app.current_undervolt == UndervoltKey::Custom
        }
    }
}

fn entry_line(app: &App, entry: MenuEntry, selected: bool, label_width: usize) -> Line<'static> {
    let label = entry_label(app, entry);
    let pad = " ".repeat(label_width.saturating_sub(label.width()));
    let marker = match entry {
        // Custom frequency is a dialog, not a radio state
        MenuEntry::CustomFreq => "   ",
        _ if is_active(app, entry) => "(x)",
        _ => "( )",
    };

    let mut style = Style::default().fg(Color::White);
    if is_active(app, entry) {
        style = style.fg(Color::Green);
    }
    if selected {
        style = style.bg(Color::Indexed(238)).add_modifier(Modifier::BOLD);
    }

    let mut spans = vec![
        Span::styled(format!("  {} ", marker), style),
        Span::styled(label, style),
    ];
    // Pad the highlight out to the widest label so selection bars align
    if selected {
        spans.push(Span::styled(pad, style));
    }
    // GPU submenu hint matches the original tray: switching needs a reboot
    if let MenuEntry::Gpu(mode) = entry {
        if mode != app.gpu_mode && selected {
            spans.push(Span::styled(
                "  (reboot required)",
                Style::default().fg(Color::DarkGray),
            ));
        }
    }

    Line::from(spans)
}
