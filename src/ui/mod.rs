pub mod dialogs;
pub mod footer;
pub mod header;
pub mod help;
pub mod menu;

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::Frame;

use crate::app::{App, AppMode};

/// Header rows: CPU model, driver/cores/governors, live frequency, live
/// temperature, plus a border row.
pub const HEADER_HEIGHT: u16 = 6;

/// Render the complete UI
pub fn draw(f: &mut Frame, app: &App) {
    let size = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT), // CPU info + live sensors
            Constraint::Min(5),                // profile/undervolt/GPU menu
            Constraint::Length(2),             // key bar + status line
        ])
        .split(size);

    header::draw_header(f, app, chunks[0]);
    menu::draw_menu(f, app, chunks[1]);
    footer::draw_footer(f, app, chunks[2]);

    // Overlay popups
    match app.mode {
        AppMode::Help => help::draw_help(f),
        AppMode::CustomFreq => dialogs::draw_custom_freq(f, app),
        AppMode::CustomUndervolt => dialogs::draw_custom_undervolt(f, app),
        AppMode::ConfirmGpu => dialogs::draw_confirm_gpu(f, app),
        AppMode::Message => dialogs::draw_message(f, app),
        AppMode::Normal => {}
    }
}
