use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, AppMode};
use crate::system::state;

/// Handle a single key input event.
pub fn handle_input(app: &mut App, key: KeyEvent) {
    match app.mode {
        AppMode::Normal => handle_normal_mode(app, key),
        AppMode::Help => handle_help_mode(app, key),
        AppMode::CustomFreq | AppMode::CustomUndervolt => handle_custom_input_mode(app, key),
        AppMode::ConfirmGpu => handle_confirm_gpu_mode(app, key),
        AppMode::Message => handle_message_mode(app, key),
    }
}

// ── Normal mode ─────────────────────────────────────────────────────────

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        // ── Quit ──
        KeyCode::F(10) | KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
        }

        // ── Navigation ──
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),

        // ── Apply the selected entry ──
        KeyCode::Enter | KeyCode::Char(' ') => app.activate_selected(),

        // ── Custom dialogs (also reachable via their menu rows) ──
        KeyCode::Char('c') => {
            app.input_buffer.clear();
            app.input_error = None;
            app.mode = AppMode::CustomFreq;
        }
        KeyCode::Char('v') if app.has_undervolt => {
            app.input_buffer.clear();
            app.input_error = None;
            app.mode = AppMode::CustomUndervolt;
        }

        // ── F5 — re-reconcile live state on demand ──
        KeyCode::F(5) | KeyCode::Char('r') => {
            app.current_profile = state::detect_profile(&app.profiles);
            app.current_undervolt = state::detect_undervolt();
            if app.has_envycontrol {
                app.gpu_mode = state::detect_gpu_mode();
            }
            app.refresh_sensors();
        }

        // ── Help ──
        KeyCode::F(1) | KeyCode::Char('?') | KeyCode::Char('h') => {
            app.mode = AppMode::Help;
        }

        _ => {}
    }
}

// ── Help popup ──────────────────────────────────────────────────────────

fn handle_help_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('q') | KeyCode::Enter => {
            app.mode = AppMode::Normal;
        }
        _ => {}
    }
}

// ── Custom value dialogs ────────────────────────────────────────────────

/// Shared editing for the frequency (GHz) and undervolt (mV) dialogs:
/// digits, one leading minus, one decimal point.
fn handle_custom_input_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_buffer.clear();
            app.input_error = None;
            app.mode = AppMode::Normal;
        }
        KeyCode::Enter => match app.mode {
            AppMode::CustomFreq => app.submit_custom_freq(),
            AppMode::CustomUndervolt => app.submit_custom_undervolt(),
            _ => unreachable!(),
        },
        KeyCode::Backspace => {
            app.input_buffer.pop();
            app.input_error = None;
        }
        KeyCode::Char(ch @ '0'..='9') => {
            app.input_buffer.push(ch);
            app.input_error = None;
        }
        KeyCode::Char('.') if app.mode == AppMode::CustomFreq => {
            if !app.input_buffer.contains('.') {
                app.input_buffer.push('.');
                app.input_error = None;
            }
        }
        KeyCode::Char('-') if app.mode == AppMode::CustomUndervolt => {
            if app.input_buffer.is_empty() {
                app.input_buffer.push('-');
                app.input_error = None;
            }
        }
        _ => {}
    }
}

// ── GPU switch confirmation ─────────────────────────────────────────────

fn handle_confirm_gpu_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Char('y') => app.confirm_gpu(),
        KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('q') => {
            app.gpu_target = None;
            app.mode = AppMode::Normal;
        }
        _ => {}
    }
}

// ── Message popup ───────────────────────────────────────────────────────

fn handle_message_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => {
            app.mode = AppMode::Normal;
        }
        _ => {}
    }
}
