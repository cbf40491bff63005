//! Periodic sensor sampling: average core frequency and CPU temperature.
//!
//! One sample per tick, recomputed from scratch — nothing here is cached
//! across ticks. Both reads are bounded file operations and degrade to an
//! explicit unavailable state instead of erroring.

use std::fs;
use std::path::Path;

use crate::system::cpu::{core_freq_dirs, SYSFS_CPU_BASE};
use crate::system::sysfs;

pub const SYSFS_HWMON: &str = "/sys/class/hwmon";
pub const THERMAL_ZONE0_TEMP: &str = "/sys/class/thermal/thermal_zone0/temp";

/// Hwmon chips that report CPU package temperature, in match order.
const CPU_TEMP_CHIPS: &[&str] = &["coretemp", "k10temp"];

/// One polling tick's worth of readings.
#[derive(Debug, Clone, Default)]
pub struct SensorSample {
    /// Average scaling_cur_freq across cores that could be read, in MHz.
    pub avg_freq_mhz: Option<f64>,
    /// How many cores contributed to the average.
    pub cores_read: usize,
    /// CPU temperature in °C.
    pub temp_c: Option<f64>,
}

/// Sample the live system.
pub fn sample() -> SensorSample {
    sample_at(
        Path::new(SYSFS_CPU_BASE),
        Path::new(SYSFS_HWMON),
        Path::new(THERMAL_ZONE0_TEMP),
    )
}

/// Sample rooted at explicit paths (fixture trees in tests).
pub fn sample_at(cpu_base: &Path, hwmon_base: &Path, thermal_fallback: &Path) -> SensorSample {
    let (avg_freq_mhz, cores_read) = read_avg_freq(cpu_base);
    SensorSample {
        avg_freq_mhz,
        cores_read,
        temp_c: read_cpu_temp(hwmon_base, thermal_fallback),
    }
}

/// Average current frequency across all readable cores. Zero readable cores
/// is `(None, 0)`, never a division by zero.
fn read_avg_freq(cpu_base: &Path) -> (Option<f64>, usize) {
    let freqs: Vec<i64> = core_freq_dirs(cpu_base)
        .iter()
        .filter_map(|dir| sysfs::read_int(dir.join("scaling_cur_freq")))
        .collect();

    if freqs.is_empty() {
        return (None, 0);
    }
    let avg_khz = freqs.iter().sum::<i64>() as f64 / freqs.len() as f64;
    (Some(avg_khz / 1000.0), freqs.len())
}

/// CPU temperature: first hwmon chip named coretemp (Intel) or k10temp
/// (AMD), else the thermal_zone0 fallback. Millidegrees in, degrees out.
fn read_cpu_temp(hwmon_base: &Path, thermal_fallback: &Path) -> Option<f64> {
    if let Ok(entries) = fs::read_dir(hwmon_base) {
        for entry in entries.flatten() {
            let chip = entry.path();
            let Some(name) = sysfs::read_text(chip.join("name")) else {
                continue;
            };
            if CPU_TEMP_CHIPS.contains(&name.as_str()) {
                if let Some(mdeg) = sysfs::read_int(chip.join("temp1_input")) {
                    return Some(mdeg as f64 / 1000.0);
                }
            }
        }
    }

    sysfs::read_int(thermal_fallback).map(|mdeg| mdeg as f64 / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::{tempdir, TempDir};

    struct Fixture {
        _dir: TempDir,
        cpu_base: PathBuf,
        hwmon_base: PathBuf,
        thermal: PathBuf,
    }

    fn fixture() -> Fixture {
        let dir = tempdir().unwrap();
        let cpu_base = dir.path().join("cpu");
        let hwmon_base = dir.path().join("hwmon");
        let thermal = dir.path().join("thermal_zone0_temp");
        fs::create_dir_all(&cpu_base).unwrap();
        fs::create_dir_all(&hwmon_base).unwrap();
        Fixture {
            _dir: dir,
            cpu_base,
            hwmon_base,
            thermal,
        }
    }

    fn add_core(fx: &Fixture, id: usize, cur_khz: Option<i64>) {
        let dir = fx.cpu_base.join(format!("cpu{}/cpufreq", id));
        fs::create_dir_all(&dir).unwrap();
        if let Some(khz) = cur_khz {
            fs::write(dir.join("scaling_cur_freq"), format!("{}\n", khz)).unwrap();
        }
    }

    fn add_chip(fx: &Fixture, dir_name: &str, chip_name: &str, temp_mdeg: i64) {
        let dir = fx.hwmon_base.join(dir_name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("name"), format!("{}\n", chip_name)).unwrap();
        fs::write(dir.join("temp1_input"), format!("{}\n", temp_mdeg)).unwrap();
    }

    #[test]
    fn averages_readable_cores_only() {
        let fx = fixture();
        add_core(&fx, 0, Some(1_200_000));
        add_core(&fx, 1, Some(1_800_000));
        add_core(&fx, 2, None); // online but unreadable

        let s = sample_at(&fx.cpu_base, &fx.hwmon_base, &fx.thermal);
        assert_eq!(s.cores_read, 2);
        assert_eq!(s.avg_freq_mhz, Some(1500.0));
    }

    #[test]
    fn zero_readable_cores_is_unavailable() {
        let fx = fixture();
        add_core(&fx, 0, None);

        let s = sample_at(&fx.cpu_base, &fx.hwmon_base, &fx.thermal);
        assert_eq!(s.cores_read, 0);
        assert_eq!(s.avg_freq_mhz, None);
    }

    #[test]
    fn coretemp_chip_preferred_over_thermal_zone() {
        let fx = fixture();
        add_chip(&fx, "hwmon0", "acpitz", 30_000);
        add_chip(&fx, "hwmon1", "coretemp", 54_000);
        fs::write(&fx.thermal, "99000\n").unwrap();

        let s = sample_at(&fx.cpu_base, &fx.hwmon_base, &fx.thermal);
        assert_eq!(s.temp_c, Some(54.0));
    }

    #[test]
    fn k10temp_is_recognized() {
        let fx = fixture();
        add_chip(&fx, "hwmon0", "k10temp", 61_500);

        let s = sample_at(&fx.cpu_base, &fx.hwmon_base, &fx.thermal);
        assert_eq!(s.temp_c, Some(61.5));
    }

    #[test]
    fn thermal_zone_fallback_when_no_known_chip() {
        let fx = fixture();
        add_chip(&fx, "hwmon0", "nvme", 40_000);
        fs::write(&fx.thermal, "47000\n").unwrap();

        let s = sample_at(&fx.cpu_base, &fx.hwmon_base, &fx.thermal);
        assert_eq!(s.temp_c, Some(47.0));
    }

    #[test]
    fn everything_absent_is_unavailable() {
        let fx = fixture();
        let s = sample_at(&fx.cpu_base, &fx.hwmon_base, &fx.thermal);
        assert_eq!(s.avg_freq_mhz, None);
        assert_eq!(s.cores_read, 0);
        assert_eq!(s.temp_c, None);
    }
}
