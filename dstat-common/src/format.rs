//! Text helpers shared by every status line fragment.

use crate::error::{Error, Result};

/// Byte capacity of a single formatted fragment, terminator included.
pub const FRAGMENT_CAPACITY: usize = 64;

/// Byte capacity of a complete status line, terminator included.
pub const LINE_CAPACITY: usize = 2048;

const BARS: [&str; 9] = ["▁", "▂", "▃", "▄", "▅", "▆", "▇", "█", "█"];

const DOTS: [&str; 5] = ["  ", " .", "..", ".:", "::"];

const SCALE_UNITS: [char; 7] = ['B', 'K', 'M', 'G', 'T', 'P', 'E'];

/// Bar glyph for a percentage, eight steps with 100 sharing the top glyph.
pub fn bar(percent: u8) -> &'static str {
    let p = usize::from(percent.min(100));
    BARS[(8 * p) / 100]
}

/// Dot pair for a signal quality percentage, five steps.
pub fn dots(quality: u8) -> &'static str {
    let q = usize::from(quality.min(100));
    DOTS[(4 * q) / 100]
}

/// Human readable byte count using base 1024 units.
///
/// Values below 1024 print as `<n>B`. Larger values print one decimal while
/// the whole part stays below 100 (`1.5K`) and a rounded integer above
/// (`123K`).
pub fn scaled(bytes: u64) -> String {
    let mut unit = 0;
    let mut whole = bytes;
    let mut fract = 0;

    for (i, _) in SCALE_UNITS.iter().enumerate() {
        let factor = 1024u64.pow(i as u32);
        if bytes / 1024 < factor {
            unit = i;
            whole = bytes / factor;
            if i > 0 {
                fract = (bytes % factor) / 1024u64.pow(i as u32 - 1);
            }
            break;
        }
    }

    let mut fract = (10 * fract + 512) / 1024;
    if fract >= 10 {
        whole += 1;
        fract = 0;
    }

    if whole == 0 {
        "0B".to_string()
    } else if unit == 0 || whole >= 100 {
        if fract >= 5 {
            whole += 1;
        }
        format!("{}{}", whole, SCALE_UNITS[unit])
    } else {
        format!("{}.{}{}", whole, fract, SCALE_UNITS[unit])
    }
}

/// Reject text that would not fit a buffer of `capacity` bytes.
pub fn bounded(text: String, capacity: usize) -> Result<String> {
    if text.len() >= capacity {
        return Err(Error::Overflow { limit: capacity });
    }
    Ok(text)
}

/// Bound a fragment to [`FRAGMENT_CAPACITY`].
pub fn fragment(text: String) -> Result<String> {
    bounded(text, FRAGMENT_CAPACITY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_steps() {
        assert_eq!(bar(0), "▁");
        assert_eq!(bar(12), "▁");
        assert_eq!(bar(13), "▂");
        assert_eq!(bar(50), "▅");
        assert_eq!(bar(87), "▇");
        assert_eq!(bar(88), "█");
        assert_eq!(bar(99), "█");
        assert_eq!(bar(100), "█");
        assert_eq!(bar(250), "█");
    }

    #[test]
    fn test_dots_steps() {
        assert_eq!(dots(0), "  ");
        assert_eq!(dots(19), "  ");
        assert_eq!(dots(25), " .");
        assert_eq!(dots(50), "..");
        assert_eq!(dots(75), ".:");
        assert_eq!(dots(100), "::");
    }

    #[test]
    fn test_scaled_bytes() {
        assert_eq!(scaled(0), "0B");
        assert_eq!(scaled(1), "1B");
        assert_eq!(scaled(1023), "1023B");
        assert_eq!(scaled(1024), "1.0K");
        assert_eq!(scaled(1536), "1.5K");
        assert_eq!(scaled(2048), "2.0K");
        assert_eq!(scaled(12_595), "12.3K");
        assert_eq!(scaled(46_694), "45.6K");
        assert_eq!(scaled(1024 * 1024), "1.0M");
        assert_eq!(scaled(150 * 1024), "150K");
        assert_eq!(scaled(150 * 1024 + 600), "151K");
    }

    #[test]
    fn test_scaled_rounds_fraction_into_whole() {
        // 2047 bytes is 1.999K, which rounds up to 2.0K
        assert_eq!(scaled(2047), "2.0K");
    }

    #[test]
    fn test_bounded() {
        assert_eq!(fragment("CPU 7%".to_string()).unwrap(), "CPU 7%");
        assert!(fragment("x".repeat(63)).is_ok());
        assert!(matches!(
            fragment("x".repeat(64)),
            Err(Error::Overflow { limit: 64 })
        ));
    }
}
