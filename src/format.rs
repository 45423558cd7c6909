use std::fmt;

/// Byte count rendered with binary units, e.g. `1.50 KB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteSize(pub u64);

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

        if self.0 < 1024 {
            return write!(f, "{} B", self.0);
        }

        let mut value = self.0 as f64;
        let mut unit = 0_usize;
        while value >= 1024.0 && unit + 1 < UNITS.len() {
            value /= 1024.0;
            unit += 1;
        }

        let precision = if value >= 10.0 { 1 } else { 2 };
        write!(f, "{value:.precision$} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_counts_stay_in_bytes() {
        assert_eq!(ByteSize(0).to_string(), "0 B");
        assert_eq!(ByteSize(1023).to_string(), "1023 B");
    }

    #[test]
    fn larger_counts_scale_units() {
        assert_eq!(ByteSize(1536).to_string(), "1.50 KB");
        assert_eq!(ByteSize(20 * 1024 * 1024).to_string(), "20.0 MB");
    }
}
