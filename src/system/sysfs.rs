//! Fail-soft readers for kernel pseudo-filesystem values.
//!
//! Every accessor returns `Option` — a missing node, a permission error or
//! garbage content all collapse to `None`. Callers pick their own default;
//! nothing in this module can abort the process.

use std::fs;
use std::path::Path;

/// Read a sysfs text value, trimmed. `None` on any I/O failure.
pub fn read_text(path: impl AsRef<Path>) -> Option<String> {
    fs::read_to_string(path).ok().map(|s| s.trim().to_string())
}

/// Read a sysfs integer value. Accepts an optional leading minus sign;
/// anything else non-numeric is `None`.
pub fn read_int(path: impl AsRef<Path>) -> Option<i64> {
    let val = read_text(path)?;
    let digits = val.strip_prefix('-').unwrap_or(&val);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    val.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn read_text_trims_newline() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scaling_driver");
        fs::write(&path, "intel_pstate\n").unwrap();
        assert_eq!(read_text(&path), Some("intel_pstate".to_string()));
    }

    #[test]
    fn read_text_missing_file_is_none() {
        let dir = tempdir().unwrap();
        assert_eq!(read_text(dir.path().join("nope")), None);
    }

    #[test]
    fn read_int_parses_plain_and_negative() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("val");

        fs::write(&path, "4000000\n").unwrap();
        assert_eq!(read_int(&path), Some(4_000_000));

        fs::write(&path, "-125\n").unwrap();
        assert_eq!(read_int(&path), Some(-125));
    }

    #[test]
    fn read_int_rejects_garbage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("val");

        fs::write(&path, "fast\n").unwrap();
        assert_eq!(read_int(&path), None);

        fs::write(&path, "3.5\n").unwrap();
        assert_eq!(read_int(&path), None);

        fs::write(&path, "-\n").unwrap();
        assert_eq!(read_int(&path), None);

        fs::write(&path, "\n").unwrap();
        assert_eq!(read_int(&path), None);
    }
}
