//! Live state detection — which profile, undervolt preset and GPU mode the
//! machine is actually running right now.
//!
//! All three detections are read-only. Live values are set by external
//! tooling and rarely land exactly on a synthesized boundary, so profile
//! detection is nearest-neighbor, not exact matching.

use std::fs;
use std::path::Path;
use std::process::Command;
use std::time::Duration;

use crate::system::cpu::SYSFS_CPU_BASE;
use crate::system::helper::run_with_timeout;
use crate::system::profiles::{Profile, ProfileKey, UndervoltKey};
use crate::system::sysfs;

const UNDERVOLT_CONF: &str = "/etc/intel-undervolt.conf";
const GPU_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Known GPU switching modes (envycontrol vocabulary).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpuMode {
    Integrated,
    Hybrid,
    Nvidia,
    Unknown,
}

impl GpuMode {
    pub const ALL: [GpuMode; 3] = [GpuMode::Integrated, GpuMode::Hybrid, GpuMode::Nvidia];

    pub fn as_str(&self) -> &'static str {
        match self {
            GpuMode::Integrated => "integrated",
            GpuMode::Hybrid => "hybrid",
            GpuMode::Nvidia => "nvidia",
            GpuMode::Unknown => "unknown",
        }
    }
}

/// Match a live scaling_max_freq value against the synthesized profiles.
///
/// `None` (unreadable sysfs) defaults to Balanced. Otherwise the profile
/// with the smallest absolute difference wins; exact ties go to the first
/// profile encountered, which is the lower frequency since the list is
/// ascending.
pub fn match_profile(profiles: &[Profile], live_khz: Option<i64>) -> ProfileKey {
    let Some(live) = live_khz else {
        return ProfileKey::Balanced;
    };
    let Some(first) = profiles.first() else {
        return ProfileKey::Balanced;
    };

    let mut best_key = first.key;
    let mut best_diff = (live - first.freq_khz).abs();
    for p in &profiles[1..] {
        let diff = (live - p.freq_khz).abs();
        if diff < best_diff {
            best_diff = diff;
            best_key = p.key;
        }
    }
    best_key
}

/// Read the live max-scaling frequency and classify it.
pub fn detect_profile(profiles: &[Profile]) -> ProfileKey {
    let live = sysfs::read_int(
        Path::new(SYSFS_CPU_BASE).join("cpu0/cpufreq/scaling_max_freq"),
    );
    match_profile(profiles, live)
}

/// Bucket an undervolt offset (mV, zero or negative) into a preset.
pub fn classify_undervolt(offset_mv: i64) -> UndervoltKey {
    if offset_mv == 0 {
        UndervoltKey::None
    } else if offset_mv >= -50 {
        UndervoltKey::Light
    } else if offset_mv >= -100 {
        UndervoltKey::Medium
    } else {
        UndervoltKey::Aggressive
    }
}

/// Extract the CPU plane offset from intel-undervolt.conf content.
///
/// The line of interest starts with the `undervolt` directive, names the
/// `'CPU'` plane and is not the Cache plane line; the trailing field is the
/// offset, possibly fractional in the file but truncated to whole mV here.
pub fn parse_undervolt_conf(content: &str) -> Option<i64> {
    for line in content.lines() {
        let line = line.trim();
        if line.starts_with("undervolt") && line.contains("'CPU'") && !line.contains("Cache")
        {
            let last = line.split_whitespace().last()?;
            return last.parse::<f64>().ok().map(|v| v as i64);
        }
    }
    None
}

/// Read the undervolt config and classify the active offset. Any failure
/// (missing file, malformed line) reads as no undervolt.
pub fn detect_undervolt() -> UndervoltKey {
    detect_undervolt_at(Path::new(UNDERVOLT_CONF))
}

pub fn detect_undervolt_at(conf: &Path) -> UndervoltKey {
    match fs::read_to_string(conf).ok().as_deref().and_then(parse_undervolt_conf) {
        Some(offset) => classify_undervolt(offset),
        None => UndervoltKey::None,
    }
}

/// Pick the first known mode named in a GPU query output.
pub fn match_gpu_mode(output: &str) -> GpuMode {
    let lower = output.to_lowercase();
    for mode in GpuMode::ALL {
        if lower.contains(mode.as_str()) {
            return mode;
        }
    }
    GpuMode::Unknown
}

/// Query envycontrol for the active GPU mode, bounded at 5 seconds.
pub fn detect_gpu_mode() -> GpuMode {
    let mut cmd = Command::new("envycontrol");
    cmd.arg("--query");
    match run_with_timeout(&mut cmd, GPU_QUERY_TIMEOUT) {
        Ok(Some(out)) => match_gpu_mode(&out.stdout),
        _ => GpuMode::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::cpu::CpuCapabilities;
    use crate::system::profiles::build_profiles;

    fn profiles() -> Vec<Profile> {
        build_profiles(&CpuCapabilities {
            model: "Test CPU".into(),
            driver: "intel_pstate".into(),
            hw_min_khz: 800_000,
            hw_max_khz: 4_000_000,
            base_khz: 2_400_000,
            online_cores: 4,
            governors: vec![],
        })
    }

    #[test]
    fn unreadable_live_value_defaults_to_balanced() {
        assert_eq!(match_profile(&profiles(), None), ProfileKey::Balanced);
    }

    #[test]
    fn nearest_profile_wins() {
        // 2,390,000 is 10,000 from Balanced and 790,000 from Low.
        assert_eq!(
            match_profile(&profiles(), Some(2_390_000)),
            ProfileKey::Balanced
        );
        assert_eq!(
            match_profile(&profiles(), Some(3_900_000)),
            ProfileKey::Performance
        );
    }

    #[test]
    fn exact_live_value_selects_that_profile() {
        let ps = profiles();
        for p in &ps {
            assert_eq!(match_profile(&ps, Some(p.freq_khz)), p.key);
        }
    }

    #[test]
    fn exact_tie_goes_to_lower_frequency() {
        // 1,200,000 is equidistant from Power Saver (800k) and Low (1.6M).
        assert_eq!(
            match_profile(&profiles(), Some(1_200_000)),
            ProfileKey::PowerSaver
        );
    }

    #[test]
    fn undervolt_classification_boundaries() {
        assert_eq!(classify_undervolt(0), UndervoltKey::None);
        assert_eq!(classify_undervolt(-1), UndervoltKey::Light);
        assert_eq!(classify_undervolt(-50), UndervoltKey::Light);
        assert_eq!(classify_undervolt(-51), UndervoltKey::Medium);
        assert_eq!(classify_undervolt(-75), UndervoltKey::Medium);
        assert_eq!(classify_undervolt(-100), UndervoltKey::Medium);
        assert_eq!(classify_undervolt(-101), UndervoltKey::Aggressive);
        assert_eq!(classify_undervolt(-125), UndervoltKey::Aggressive);
        assert_eq!(classify_undervolt(-1000), UndervoltKey::Aggressive);
    }

    #[test]
    fn conf_parsing_finds_cpu_plane() {
        let conf = "\
# intel-undervolt configuration
undervolt 0 'CPU' -75
undervolt 1 'GPU' -50
undervolt 2 'CPU Cache' -75
";
        assert_eq!(parse_undervolt_conf(conf), Some(-75));
    }

    #[test]
    fn conf_parsing_skips_cache_plane() {
        let conf = "undervolt 2 'CPU Cache' -110\n";
        assert_eq!(parse_undervolt_conf(conf), None);
    }

    #[test]
    fn conf_parsing_truncates_fractional_offsets() {
        let conf = "undervolt 0 'CPU' -99.6\n";
        assert_eq!(parse_undervolt_conf(conf), Some(-99));
    }

    #[test]
    fn conf_parsing_tolerates_garbage() {
        assert_eq!(parse_undervolt_conf(""), None);
        assert_eq!(parse_undervolt_conf("undervolt 'CPU' not-a-number\n"), None);
        assert_eq!(parse_undervolt_conf("interval 5000\n"), None);
    }

    #[test]
    fn missing_conf_reads_as_none_preset() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            detect_undervolt_at(&dir.path().join("missing.conf")),
            UndervoltKey::None
        );
    }

    #[test]
    fn example_conf_line_classifies_medium() {
        let key = parse_undervolt_conf("undervolt 0 'CPU' -75\n")
            .map(classify_undervolt)
            .unwrap();
        assert_eq!(key, UndervoltKey::Medium);
    }

    #[test]
    fn gpu_mode_substring_match() {
        assert_eq!(
            match_gpu_mode("Current GPU mode: Integrated\n"),
            GpuMode::Integrated
        );
        assert_eq!(match_gpu_mode("mode is HYBRID"), GpuMode::Hybrid);
        assert_eq!(match_gpu_mode("nvidia dgpu active"), GpuMode::Nvidia);
        assert_eq!(match_gpu_mode("no idea"), GpuMode::Unknown);
        assert_eq!(match_gpu_mode(""), GpuMode::Unknown);
    }
}
