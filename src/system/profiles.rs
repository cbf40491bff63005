//! Power profile synthesis.
//!
//! Five candidate profiles are generated across the detected frequency range
//! and deduplicated to the nearest 100 MHz, so a narrow-range CPU never shows
//! two menu entries that differ only in name.

use crate::system::cpu::CpuCapabilities;

/// Closed set of synthesized profile identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileKey {
    PowerSaver,
    Low,
    Balanced,
    High,
    Performance,
    /// Sentinel for a frequency set outside the synthesized list
    /// (custom dialog or external tooling).
    Custom,
}

impl ProfileKey {
    pub fn name(&self) -> &'static str {
        match self {
            ProfileKey::PowerSaver => "Power Saver",
            ProfileKey::Low => "Low",
            ProfileKey::Balanced => "Balanced",
            ProfileKey::High => "High",
            ProfileKey::Performance => "Performance",
            ProfileKey::Custom => "Custom",
        }
    }
}

/// Role styling for a profile (the original tray app used GNOME symbolic
/// icons; the TUI maps these to glyphs and colors).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileIcon {
    PowerSaver,
    Balanced,
    Performance,
}

impl ProfileIcon {
    pub fn glyph(&self) -> &'static str {
        match self {
            ProfileIcon::PowerSaver => "▂",
            ProfileIcon::Balanced => "▄",
            ProfileIcon::Performance => "▇",
        }
    }
}

/// A named target maximum frequency.
#[derive(Debug, Clone)]
pub struct Profile {
    pub key: ProfileKey,
    pub label: String,
    pub freq_khz: i64,
    pub icon: ProfileIcon,
}

/// Undervolt preset identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndervoltKey {
    None,
    Light,
    Medium,
    Aggressive,
    Custom,
}

impl UndervoltKey {
    pub fn name(&self) -> &'static str {
        match self {
            UndervoltKey::None => "None",
            UndervoltKey::Light => "Light",
            UndervoltKey::Medium => "Medium",
            UndervoltKey::Aggressive => "Aggressive",
            UndervoltKey::Custom => "Custom",
        }
    }
}

/// Static preset table: (key, label, CPU plane offset in mV).
pub const UNDERVOLT_PRESETS: &[(UndervoltKey, &str, i64)] = &[
    (UndervoltKey::None, "None (0 mV)", 0),
    (UndervoltKey::Light, "Light (-50 mV)", -50),
    (UndervoltKey::Medium, "Medium (-100 mV)", -100),
    (UndervoltKey::Aggressive, "Aggressive (-125 mV)", -125),
];

/// Generate power profiles adapted to this CPU's actual capabilities.
///
/// Candidates, low to high:
///   - Power Saver: hardware minimum
///   - Low:         min + span/4
///   - Balanced:    base frequency
///   - High:        min + 3*span/4
///   - Performance: hardware maximum (turbo)
///
/// Candidates whose frequency rounds to an already-seen 100 MHz bucket are
/// dropped; the first candidate per bucket survives, ascending order
/// preserved. A degenerate range (min >= max) still yields at least one
/// profile and never panics.
pub fn build_profiles(caps: &CpuCapabilities) -> Vec<Profile> {
    let lo = caps.hw_min_khz;
    let hi = caps.hw_max_khz;
    let base = caps.base_khz;
    let span = hi - lo;

    let candidates = [
        (ProfileKey::PowerSaver, lo, ProfileIcon::PowerSaver),
        (ProfileKey::Low, lo + span / 4, ProfileIcon::PowerSaver),
        (ProfileKey::Balanced, base, ProfileIcon::Balanced),
        (ProfileKey::High, lo + 3 * span / 4, ProfileIcon::Performance),
        (ProfileKey::Performance, hi, ProfileIcon::Performance),
    ];

    let mut seen = Vec::new();
    let mut profiles = Vec::new();
    for (key, freq_khz, icon) in candidates {
        let bucket = (freq_khz as f64 / 100_000.0).round() as i64;
        if seen.contains(&bucket) {
            continue;
        }
        seen.push(bucket);
        profiles.push(Profile {
            key,
            label: format!("{} ({})", key.name(), fmt_ghz(freq_khz)),
            freq_khz,
            icon,
        });
    }
    profiles
}

/// Human-readable GHz: one decimal for whole GHz values, two otherwise.
pub fn fmt_ghz(khz: i64) -> String {
    let ghz = khz as f64 / 1_000_000.0;
    if ghz == ghz.trunc() {
        format!("{:.1} GHz", ghz)
    } else {
        format!("{:.2} GHz", ghz)
    }
}
