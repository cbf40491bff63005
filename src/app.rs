use std::path::Path;
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::thread;

use chrono::Local;

use crate::config::WattSaverConfig;
use crate::system::cpu::CpuCapabilities;
use crate::system::helper::{self, HelperError};
use crate::system::profiles::{
    build_profiles, fmt_ghz, Profile, ProfileKey, UndervoltKey, UNDERVOLT_PRESETS,
};
use crate::system::sensors::{self, SensorSample};
use crate::system::state::{self, GpuMode};

/// Which view/mode the app is currently in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Normal,
    Help,
    CustomFreq,      // c: enter a max frequency in GHz
    CustomUndervolt, // v: enter an undervolt offset in mV
    ConfirmGpu,      // GPU switch needs an explicit yes (reboot required)
    Message,         // modal info/error popup
}

/// One actionable row in the menu. Section headers are rendered around
/// these but are not themselves selectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEntry {
    Profile(usize),
    CustomFreq,
    Undervolt(usize),
    CustomUndervolt,
    Gpu(GpuMode),
}

/// What a background helper invocation is trying to change.
#[derive(Debug, Clone, Copy)]
pub enum ActionKind {
    Profile(ProfileKey, i64),
    CustomFreq(i64),
    Undervolt(UndervoltKey),
    CustomUndervolt(i64),
    Gpu(GpuMode),
}

impl ActionKind {
    fn describe(&self) -> String {
        match self {
            ActionKind::Profile(key, khz) => {
                format!("{} ({})", key.name(), fmt_ghz(*khz))
            }
            ActionKind::CustomFreq(khz) => format!("Custom ({})", fmt_ghz(*khz)),
            ActionKind::Undervolt(key) => format!("undervolt {}", key.name()),
            ActionKind::CustomUndervolt(mv) => format!("undervolt {} mV", mv),
            ActionKind::Gpu(mode) => format!("GPU {}", mode.as_str()),
        }
    }
}

/// A helper invocation running on its own thread so a stalled pkexec
/// prompt never freezes sensor polling.
pub struct PendingAction {
    pub kind: ActionKind,
    rx: Receiver<Result<String, HelperError>>,
}

/// Main application state: hardware snapshot, synthesized profiles,
/// current selections and UI bookkeeping. Capabilities and the profile
/// list are read-only after construction.
pub struct App {
    pub mode: AppMode,
    pub should_quit: bool,

    // Hardware snapshot + derived profiles (immutable after startup)
    pub caps: CpuCapabilities,
    pub profiles: Vec<Profile>,
    pub has_undervolt: bool,
    pub has_envycontrol: bool,

    // Reconciled live state
    pub current_profile: ProfileKey,
    pub current_undervolt: UndervoltKey,
    pub gpu_mode: GpuMode,

    // Latest sensor sample (recomputed every tick)
    pub sensors: SensorSample,

    // Menu
    pub entries: Vec<MenuEntry>,
    pub selected_index: usize,

    // Custom dialog input buffer
    pub input_buffer: String,
    pub input_error: Option<String>,

    // GPU mode awaiting confirmation
    pub gpu_target: Option<GpuMode>,

    // Message popup
    pub message_title: String,
    pub message_body: String,

    // In-flight helper invocation (at most one)
    pub pending: Option<PendingAction>,

    // Bottom status line, timestamped on each applied change
    pub status_line: String,

    pub config: WattSaverConfig,
    pub tick: u64,
}

impl App {
    pub fn new(config: WattSaverConfig) -> Self {
        let caps = CpuCapabilities::detect();
        let profiles = build_profiles(&caps);
        let has_undervolt = helper::has_command("intel-undervolt");
        let has_envycontrol = helper::has_command("envycontrol");

        let current_profile = state::detect_profile(&profiles);
        let current_undervolt = state::detect_undervolt();
        let gpu_mode = if has_envycontrol {
            state::detect_gpu_mode()
        } else {
            GpuMode::Unknown
        };

        let mut app = Self {
            mode: AppMode::Normal,
            should_quit: false,
            caps,
            profiles,
            has_undervolt,
            has_envycontrol,
            current_profile,
            current_undervolt,
            gpu_mode,
            sensors: SensorSample::default(),
            entries: Vec::new(),
            selected_index: 0,
            input_buffer: String::new(),
            input_error: None,
            gpu_target: None,
            message_title: String::new(),
            message_body: String::new(),
            pending: None,
            status_line: String::new(),
            config,
            tick: 0,
        };
        app.build_entries();
        app.refresh_sensors();
        app
    }

    /// Flatten the sectioned menu into the actionable entry list. The
    /// undervolt and GPU sections only exist when their tooling does.
    fn build_entries(&mut self) {
        self.entries.clear();
        for i in 0..self.profiles.len() {
            self.entries.push(MenuEntry::Profile(i));
        }
        self.entries.push(MenuEntry::CustomFreq);
        if self.has_undervolt {
            for i in 0..UNDERVOLT_PRESETS.len() {
                self.entries.push(MenuEntry::Undervolt(i));
            }
            self.entries.push(MenuEntry::CustomUndervolt);
        }
        if self.has_envycontrol {
            for mode in GpuMode::ALL {
                self.entries.push(MenuEntry::Gpu(mode));
            }
        }
    }

    // ── Navigation ──────────────────────────────────────────────────────

    pub fn select_prev(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    pub fn select_next(&mut self) {
        if self.selected_index + 1 < self.entries.len() {
            self.selected_index += 1;
        }
    }

    pub fn select_first(&mut self) {
        self.selected_index = 0;
    }

    pub fn select_last(&mut self) {
        self.selected_index = self.entries.len().saturating_sub(1);
    }

    pub fn selected_entry(&self) -> Option<MenuEntry> {
        self.entries.get(self.selected_index).copied()
    }

    // ── Sensor polling ──────────────────────────────────────────────────

    pub fn refresh_sensors(&mut self) {
        self.sensors = sensors::sample();
        self.tick += 1;
    }

    // ── Actions ─────────────────────────────────────────────────────────

    /// Enter on the selected menu entry.
    pub fn activate_selected(&mut self) {
        if self.pending.is_some() {
            return; // one helper run at a time
        }
        match self.selected_entry() {
            Some(MenuEntry::Profile(i)) => {
                let (key, khz) = (self.profiles[i].key, self.profiles[i].freq_khz);
                if key == self.current_profile {
                    return;
                }
                self.spawn_action(ActionKind::Profile(key, khz));
            }
            Some(MenuEntry::CustomFreq) => {
                self.input_buffer.clear();
                self.input_error = None;
                self.mode = AppMode::CustomFreq;
            }
            Some(MenuEntry::Undervolt(i)) => {
                let (key, _, _) = UNDERVOLT_PRESETS[i];
                if key == self.current_undervolt {
                    return;
                }
                self.spawn_action(ActionKind::Undervolt(key));
            }
            Some(MenuEntry::CustomUndervolt) => {
                self.input_buffer.clear();
                self.input_error = None;
                self.mode = AppMode::CustomUndervolt;
            }
            Some(MenuEntry::Gpu(mode)) => {
                if mode == self.gpu_mode {
                    return;
                }
                self.gpu_target = Some(mode);
                self.mode = AppMode::ConfirmGpu;
            }
            None => {}
        }
    }

    /// Parse and validate the custom frequency dialog (GHz in, kHz out).
    pub fn submit_custom_freq(&mut self) {
        let Ok(ghz) = self.input_buffer.trim().parse::<f64>() else {
            self.input_error = Some("Enter a number, e.g. 2.4".to_string());
            return;
        };
        let khz = (ghz * 1_000_000.0) as i64;
        if let Err(msg) = helper::validate_freq_khz(khz, &self.caps) {
            self.input_error = Some(msg);
            return;
        }
        self.mode = AppMode::Normal;
        self.spawn_action(ActionKind::CustomFreq(khz));
    }

    /// Parse and validate the custom undervolt dialog (mV).
    pub fn submit_custom_undervolt(&mut self) {
        let Ok(mv) = self.input_buffer.trim().parse::<i64>() else {
            self.input_error = Some("Enter a whole number, e.g. -80".to_string());
            return;
        };
        if let Err(msg) = helper::validate_undervolt_mv(mv) {
            self.input_error = Some(msg);
            return;
        }
        self.mode = AppMode::Normal;
        self.spawn_action(ActionKind::CustomUndervolt(mv));
    }

    /// User confirmed the GPU switch.
    pub fn confirm_gpu(&mut self) {
        self.mode = AppMode::Normal;
        if let Some(mode) = self.gpu_target.take() {
            self.spawn_action(ActionKind::Gpu(mode));
        }
    }

    /// Run the helper on a background thread; the main loop polls the
    /// channel via `poll_pending` every iteration.
    fn spawn_action(&mut self, kind: ActionKind) {
        let (tx, rx) = channel();
        let helper_path = self.config.helper_path.clone();
        thread::spawn(move || {
            let path: Option<&Path> = helper_path.as_deref();
            let result = match kind {
                ActionKind::Profile(_, khz) | ActionKind::CustomFreq(khz) => {
                    helper::set_freq(path, khz)
                }
                ActionKind::Undervolt(key) => {
                    let offset = UNDERVOLT_PRESETS
                        .iter()
                        .find(|(k, _, _)| *k == key)
                        .map(|(_, _, mv)| *mv)
                        .unwrap_or(0);
                    helper::set_undervolt(path, offset)
                }
                ActionKind::CustomUndervolt(mv) => helper::set_undervolt(path, mv),
                ActionKind::Gpu(mode) => helper::set_gpu(path, mode.as_str()),
            };
            let _ = tx.send(result);
        });
        self.pending = Some(PendingAction { kind, rx });
    }

    /// Drain a finished helper invocation, if any. Success re-runs the
    /// relevant state detection; failure pops a message and leaves the
    /// previous selection in place.
    pub fn poll_pending(&mut self) {
        let Some(pending) = &self.pending else {
            return;
        };
        let result = match pending.rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => {
                Err(HelperError::Command("Helper thread vanished".to_string()))
            }
        };
        let kind = pending.kind;
        self.pending = None;

        match result {
            Ok(_) => self.on_action_applied(kind),
            Err(err) => {
                let title = match kind {
                    ActionKind::Profile(..) | ActionKind::CustomFreq(_) => {
                        "Profile Switch Failed"
                    }
                    ActionKind::Undervolt(_) | ActionKind::CustomUndervolt(_) => {
                        "Undervolt Failed"
                    }
                    ActionKind::Gpu(_) => "GPU Switch Failed",
                };
                self.show_message(title, &err.to_string());
            }
        }
    }

    fn on_action_applied(&mut self, kind: ActionKind) {
        match kind {
            ActionKind::Profile(..) => {
                // Reconcile against what the kernel actually accepted
                self.current_profile = state::detect_profile(&self.profiles);
            }
            ActionKind::CustomFreq(_) => {
                self.current_profile = ProfileKey::Custom;
            }
            ActionKind::Undervolt(_) => {
                self.current_undervolt = state::detect_undervolt();
            }
            ActionKind::CustomUndervolt(_) => {
                self.current_undervolt = UndervoltKey::Custom;
            }
            ActionKind::Gpu(mode) => {
                self.gpu_mode = mode;
                self.show_message(
                    "GPU Mode Changed",
                    &format!("Switched to {}. Please reboot.", mode.as_str()),
                );
            }
        }
        self.status_line = format!(
            "Applied {} at {}",
            kind.describe(),
            Local::now().format("%H:%M:%S")
        );
    }

    pub fn show_message(&mut self, title: &str, body: &str) {
        self.message_title = title.to_string();
        self.message_body = body.to_string();
        self.mode = AppMode::Message;
    }

    /// Profile owning a key, if it survived synthesis.
    pub fn profile(&self, key: ProfileKey) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.key == key)
    }
}
