//! wattsaver — a TUI power manager for Linux laptops, written in Rust.
//!
//! Features:
//!   - Auto-detected CPU power profiles (adapts to any intel_pstate or
//!     acpi-cpufreq machine)
//!   - Undervolt presets via intel-undervolt
//!   - GPU mode switching via envycontrol
//!   - Live average frequency & CPU temperature monitoring
//!
//! Hardware changes go through `pkexec wattsaver-helper.sh`; this process
//! itself only reads sysfs. Press F1 or '?' for help.

#![allow(dead_code)]

mod app;
mod config;
mod input;
mod system;
mod ui;

use std::io;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use app::App;
use config::WattSaverConfig;

fn main() -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Run the app
    let result = run_app(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Main application loop
fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    // Hardware probing and initial state reconciliation happen here, once
    let mut app = App::new(WattSaverConfig::load());
    let tick_rate = Duration::from_millis(app.config.update_interval_ms);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui::draw(f, &app))?;

        if app.should_quit {
            return Ok(());
        }

        // Handle events with short timeout for responsiveness
        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Press {
                        input::handle_input(&mut app, key);
                        if app.should_quit {
                            return Ok(());
                        }
                    }
                }
                Event::Resize(_, _) => {
                    // Handled on next draw
                }
                _ => {}
            }
        }

        // A finished helper invocation updates state as soon as it lands
        app.poll_pending();

        // Time to refresh sensors?
        let now = Instant::now();
        if now.duration_since(last_tick) >= tick_rate {
            app.refresh_sensors();
            last_tick = now;
        }
    }
}
