use chrono::NaiveDateTime;

/// Timestamp layout used inside EXIF DateTimeOriginal.
const EXIF_DATETIME: &str = "%Y:%m:%d %H:%M:%S";
/// Layout shown to the user, e.g. "2024-06-01 02:30:15 PM".
const DISPLAY_DATETIME: &str = "%Y-%m-%d %I:%M:%S %p";

/// Rewrite a sub-second exposure ("0.004") as the conventional "1/250".
/// Anything else, including exposures of a second or longer and strings that
/// are not numbers at all, passes through unchanged.
pub fn format_shutter_speed(raw: &str) -> String {
    if let Ok(secs) = raw.trim().parse::<f64>()
        && secs > 0.0
        && secs < 1.0
    {
        return format!("1/{}", (1.0 / secs).round() as i64);
    }
    raw.to_string()
}

/// Rewrite an EXIF timestamp into the display form. Strings that do not
/// match the EXIF layout pass through unchanged.
pub fn format_capture_datetime(raw: &str) -> String {
    match NaiveDateTime::parse_from_str(raw.trim(), EXIF_DATETIME) {
        Ok(dt) => dt.format(DISPLAY_DATETIME).to_string(),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shutter_decimal_becomes_reciprocal() {
        assert_eq!(format_shutter_speed("0.004"), "1/250");
        assert_eq!(format_shutter_speed("0.005"), "1/200");
        assert_eq!(format_shutter_speed("0.0005"), "1/2000");
    }

    #[test]
    fn test_shutter_rounds_inexact_reciprocal() {
        assert_eq!(format_shutter_speed("0.3333333333333333"), "1/3");
        assert_eq!(format_shutter_speed("0.0166"), "1/60");
    }

    #[test]
    fn test_shutter_long_exposure_passes_through() {
        assert_eq!(format_shutter_speed("1"), "1");
        assert_eq!(format_shutter_speed("2"), "2");
        assert_eq!(format_shutter_speed("30"), "30");
    }

    #[test]
    fn test_shutter_non_numeric_passes_through() {
        assert_eq!(format_shutter_speed("bogus"), "bogus");
        assert_eq!(format_shutter_speed(""), "");
        assert_eq!(format_shutter_speed("0"), "0");
    }

    #[test]
    fn test_datetime_reformatted_for_display() {
        assert_eq!(
            format_capture_datetime("2024:06:01 14:30:15"),
            "2024-06-01 02:30:15 PM"
        );
        assert_eq!(
            format_capture_datetime("2023:12:24 04:05:06"),
            "2023-12-24 04:05:06 AM"
        );
    }

    #[test]
    fn test_datetime_midnight_is_twelve_am() {
        assert_eq!(
            format_capture_datetime("2024:01:01 00:30:00"),
            "2024-01-01 12:30:00 AM"
        );
    }

    #[test]
    fn test_datetime_unparsable_passes_through() {
        assert_eq!(format_capture_datetime("bogus"), "bogus");
        assert_eq!(format_capture_datetime("2024-06-01 14:30:15"), "2024-06-01 14:30:15");
    }
}
