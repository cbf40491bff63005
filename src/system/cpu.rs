//! One-shot CPU capability detection from sysfs and /proc/cpuinfo.
//!
//! Runs once at startup. Every datum has a documented fallback so the probe
//! succeeds on hardware it has never seen — a laptop with a broken cpufreq
//! driver still gets a usable (if generic) capability snapshot.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::system::sysfs;

/// Default kernel paths. Tests point the probe at a fixture tree instead.
pub const SYSFS_CPU_BASE: &str = "/sys/devices/system/cpu";
pub const PROC_CPUINFO: &str = "/proc/cpuinfo";

/// Fallback frequency bounds (kHz) when cpuinfo_{min,max}_freq are absent.
const DEFAULT_MIN_KHZ: i64 = 800_000;
const DEFAULT_MAX_KHZ: i64 = 4_000_000;

/// Immutable snapshot of what this CPU can do, detected once at startup.
#[derive(Debug, Clone)]
pub struct CpuCapabilities {
    pub model: String,
    pub driver: String,
    pub hw_min_khz: i64,
    pub hw_max_khz: i64,
    pub base_khz: i64,
    pub online_cores: usize,
    pub governors: Vec<String>,
}

impl CpuCapabilities {
    /// Probe the live system.
    pub fn detect() -> Self {
        Self::detect_at(Path::new(SYSFS_CPU_BASE), Path::new(PROC_CPUINFO))
    }

    /// Probe rooted at explicit paths (fixture trees in tests).
    pub fn detect_at(cpu_base: &Path, cpuinfo: &Path) -> Self {
        let cpu0 = cpu_base.join("cpu0/cpufreq");

        let model = read_model(cpuinfo);
        let driver = sysfs::read_text(cpu0.join("scaling_driver"))
            .unwrap_or_else(|| "unknown".to_string());

        let hw_min_khz =
            sysfs::read_int(cpu0.join("cpuinfo_min_freq")).unwrap_or(DEFAULT_MIN_KHZ);
        let hw_max_khz =
            sysfs::read_int(cpu0.join("cpuinfo_max_freq")).unwrap_or(DEFAULT_MAX_KHZ);

        let base_khz = detect_base_khz(&cpu0, &model, hw_min_khz, hw_max_khz);
        let online_cores = count_online_cores(cpu_base);
        let governors = read_governors(&cpu0);

        Self {
            model,
            driver,
            hw_min_khz,
            hw_max_khz,
            base_khz,
            online_cores,
            governors,
        }
    }
}

/// First "model name" line of /proc/cpuinfo, value after the colon.
fn read_model(cpuinfo: &Path) -> String {
    if let Ok(content) = fs::read_to_string(cpuinfo) {
        for line in content.lines() {
            if line.starts_with("model name") {
                if let Some((_, value)) = line.split_once(':') {
                    return value.trim().to_string();
                }
            }
        }
    }
    "Unknown CPU".to_string()
}

/// Base frequency, best effort:
///   1. base_frequency sysfs node (intel_pstate on newer kernels)
///   2. "@ X.XXGHz" suffix in the model string
///   3. midpoint of the hardware min/max range
fn detect_base_khz(cpu0: &Path, model: &str, hw_min: i64, hw_max: i64) -> i64 {
    if let Some(val) = sysfs::read_int(cpu0.join("base_frequency")) {
        return val;
    }

    if let Ok(re) = Regex::new(r"@\s*([\d.]+)\s*GHz") {
        if let Some(caps) = re.captures(model) {
            if let Ok(ghz) = caps[1].parse::<f64>() {
                return (ghz * 1_000_000.0) as i64;
            }
        }
    }

    (hw_min + hw_max) / 2
}

/// Count cpuN entries that expose a cpufreq interface. Falls back to the
/// logical processor count when the directory can't be enumerated at all.
fn count_online_cores(cpu_base: &Path) -> usize {
    match fs::read_dir(cpu_base) {
        Ok(entries) => entries
            .flatten()
            .filter(|e| {
                is_cpu_entry(&e.file_name().to_string_lossy())
                    && e.path().join("cpufreq").is_dir()
            })
            .count(),
        Err(_) => logical_cpu_count(),
    }
}

fn logical_cpu_count() -> usize {
    let mut sys = sysinfo::System::new();
    sys.refresh_cpu_all();
    sys.cpus().len().max(4)
}

/// Matches `cpu<digits>` exactly — not `cpufreq` or `cpuidle`.
pub fn is_cpu_entry(name: &str) -> bool {
    name.strip_prefix("cpu")
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}

fn read_governors(cpu0: &Path) -> Vec<String> {
    match sysfs::read_text(cpu0.join("scaling_available_governors")) {
        Some(val) if !val.is_empty() => {
            val.split_whitespace().map(str::to_string).collect()
        }
        _ => vec!["powersave".to_string(), "performance".to_string()],
    }
}

/// Ordered list of per-core cpufreq directories under `cpu_base`.
pub fn core_freq_dirs(cpu_base: &Path) -> Vec<PathBuf> {
    let mut names: Vec<String> = match fs::read_dir(cpu_base) {
        Ok(entries) => entries
            .flatten()
            .map(|e| e.file_name().to_string_lossy().to_string())
            .filter(|n| is_cpu_entry(n))
            .collect(),
        Err(_) => return Vec::new(),
    };
    names.sort();
    names
        .into_iter()
        .map(|n| cpu_base.join(n).join("cpufreq"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    fn fixture(cores: usize) -> (TempDir, PathBuf, PathBuf) {
        let dir = tempdir().unwrap();
        let cpu_base = dir.path().join("cpu");
        for i in 0..cores {
            fs::create_dir_all(cpu_base.join(format!("cpu{}/cpufreq", i))).unwrap();
        }
        // Non-core entries that must not be counted
        fs::create_dir_all(cpu_base.join("cpufreq")).unwrap();
        fs::create_dir_all(cpu_base.join("cpuidle")).unwrap();
        let cpuinfo = dir.path().join("cpuinfo");
        (dir, cpu_base, cpuinfo)
    }

    fn write(base: &Path, rel: &str, content: &str) {
        fs::write(base.join(rel), content).unwrap();
    }

    #[test]
    fn probe_reads_populated_tree() {
        let (_dir, cpu_base, cpuinfo) = fixture(8);
        fs::write(
            &cpuinfo,
            "processor\t: 0\nmodel name\t: Intel(R) Core(TM) i7-8550U CPU @ 1.80GHz\n",
        )
        .unwrap();
        write(&cpu_base, "cpu0/cpufreq/scaling_driver", "intel_pstate\n");
        write(&cpu_base, "cpu0/cpufreq/cpuinfo_min_freq", "400000\n");
        write(&cpu_base, "cpu0/cpufreq/cpuinfo_max_freq", "4000000\n");
        write(&cpu_base, "cpu0/cpufreq/base_frequency", "1800000\n");
        write(
            &cpu_base,
            "cpu0/cpufreq/scaling_available_governors",
            "powersave performance\n",
        );

        let caps = CpuCapabilities::detect_at(&cpu_base, &cpuinfo);
        assert_eq!(caps.model, "Intel(R) Core(TM) i7-8550U CPU @ 1.80GHz");
        assert_eq!(caps.driver, "intel_pstate");
        assert_eq!(caps.hw_min_khz, 400_000);
        assert_eq!(caps.hw_max_khz, 4_000_000);
        assert_eq!(caps.base_khz, 1_800_000);
        assert_eq!(caps.online_cores, 8);
        assert_eq!(caps.governors, vec!["powersave", "performance"]);
    }

    #[test]
    fn probe_degrades_to_defaults_on_empty_tree() {
        let dir = tempdir().unwrap();
        // cpu_base exists but is empty: enumeration succeeds, finds nothing
        let cpu_base = dir.path().join("cpu");
        fs::create_dir_all(&cpu_base).unwrap();
        let caps = CpuCapabilities::detect_at(&cpu_base, &dir.path().join("missing"));
        assert_eq!(caps.model, "Unknown CPU");
        assert_eq!(caps.driver, "unknown");
        assert_eq!(caps.hw_min_khz, 800_000);
        assert_eq!(caps.hw_max_khz, 4_000_000);
        // Midpoint fallback
        assert_eq!(caps.base_khz, 2_400_000);
        assert_eq!(caps.online_cores, 0);
        assert_eq!(caps.governors, vec!["powersave", "performance"]);
    }

    #[test]
    fn enumeration_failure_falls_back_to_logical_count() {
        let dir = tempdir().unwrap();
        let caps = CpuCapabilities::detect_at(
            &dir.path().join("does_not_exist"),
            &dir.path().join("missing"),
        );
        assert!(caps.online_cores >= 4);
    }

    #[test]
    fn base_freq_extracted_from_model_string() {
        let (_dir, cpu_base, cpuinfo) = fixture(2);
        fs::write(
            &cpuinfo,
            "model name\t: Intel(R) Core(TM) i5-6200U CPU @ 2.30GHz\n",
        )
        .unwrap();
        write(&cpu_base, "cpu0/cpufreq/cpuinfo_min_freq", "400000\n");
        write(&cpu_base, "cpu0/cpufreq/cpuinfo_max_freq", "2800000\n");
        // No base_frequency node: model string wins over midpoint.
        let caps = CpuCapabilities::detect_at(&cpu_base, &cpuinfo);
        assert_eq!(caps.base_khz, 2_300_000);
    }

    #[test]
    fn base_freq_midpoint_when_model_has_no_clock() {
        let (_dir, cpu_base, cpuinfo) = fixture(2);
        fs::write(&cpuinfo, "model name\t: AMD Ryzen 7 4700U\n").unwrap();
        write(&cpu_base, "cpu0/cpufreq/cpuinfo_min_freq", "1400000\n");
        write(&cpu_base, "cpu0/cpufreq/cpuinfo_max_freq", "2000000\n");
        let caps = CpuCapabilities::detect_at(&cpu_base, &cpuinfo);
        assert_eq!(caps.base_khz, 1_700_000);
    }

    #[test]
    fn cores_without_cpufreq_are_offline() {
        let (_dir, cpu_base, cpuinfo) = fixture(4);
        // cpu4 exists but exposes no cpufreq directory
        fs::create_dir_all(cpu_base.join("cpu4")).unwrap();
        let caps = CpuCapabilities::detect_at(&cpu_base, &cpuinfo);
        assert_eq!(caps.online_cores, 4);
    }

    #[test]
    fn cpu_entry_matcher_is_exact() {
        assert!(is_cpu_entry("cpu0"));
        assert!(is_cpu_entry("cpu15"));
        assert!(!is_cpu_entry("cpu"));
        assert!(!is_cpu_entry("cpufreq"));
        assert!(!is_cpu_entry("cpuidle"));
        assert!(!is_cpu_entry("cpu0x"));
    }

    #[test]
    fn core_freq_dirs_sorted_and_filtered() {
        let (_dir, cpu_base, _) = fixture(3);
        let dirs = core_freq_dirs(&cpu_base);
        assert_eq!(dirs.len(), 3);
        assert!(dirs[0].ends_with("cpu0/cpufreq"));
        assert!(dirs[2].ends_with("cpu2/cpufreq"));
    }
}
