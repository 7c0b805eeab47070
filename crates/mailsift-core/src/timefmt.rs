//! Timestamp rendering for export rows.

use chrono::{DateTime, Datelike, Local, Timelike};

/// Render a received timestamp as `YYYY-MM-DDTHH:MM:SSZ` — always exactly
/// 20 characters, all fields zero-padded.
///
/// The fields are the timestamp's **local** wall-clock components; the `Z`
/// is a literal suffix, not a UTC conversion. Downstream consumers sort on
/// this exact shape, so the rendering stays bit-for-bit compatible with
/// the historical export format instead of switching to true UTC.
pub fn format_received(ts: DateTime<Local>) -> String {
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
        ts.year(),
        ts.month(),
        ts.day(),
        ts.hour(),
        ts.minute(),
        ts.second()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_always_20_chars() {
        assert_eq!(format_received(local(2026, 8, 25, 9, 30, 0)).len(), 20);
        assert_eq!(format_received(local(999, 1, 1, 0, 0, 0)).len(), 20);
    }

    #[test]
    fn test_zero_padding() {
        let s = format_received(local(2026, 1, 2, 3, 4, 5));
        assert_eq!(s, "2026-01-02T03:04:05Z");
    }

    #[test]
    fn test_shape() {
        let s = format_received(Local::now());
        let bytes = s.as_bytes();
        assert_eq!(bytes[4], b'-');
        assert_eq!(bytes[7], b'-');
        assert_eq!(bytes[10], b'T');
        assert_eq!(bytes[13], b':');
        assert_eq!(bytes[16], b':');
        assert_eq!(bytes[19], b'Z');
        for i in [0, 1, 2, 3, 5, 6, 8, 9, 11, 12, 14, 15, 17, 18] {
            assert!(bytes[i].is_ascii_digit(), "byte {i} of {s} not a digit");
        }
    }

    #[test]
    fn test_literal_z_keeps_local_fields() {
        let ts = local(2026, 8, 25, 23, 59, 59);
        // Whatever the host timezone, the rendered fields are the local
        // wall clock, not a UTC conversion.
        assert_eq!(format_received(ts), "2026-08-25T23:59:59Z");
    }
}
