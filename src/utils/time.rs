//! Time parsing and formatting utilities

use crate::domain::errors::RejectionReason;

/// Parser for the time notations accepted in timestamp CSVs:
/// `SS(.frac)`, `MM:SS(.frac)` and `HH:MM:SS(.frac)`.
pub struct TimeParser;

impl TimeParser {
    /// Parse a time string to seconds
    pub fn parse_time(time_str: &str) -> Result<f64, RejectionReason> {
        let time_str = time_str.trim();
        let malformed = || RejectionReason::MalformedTime {
            value: time_str.to_string(),
        };

        let seconds = if time_str.contains(':') {
            let parts: Vec<&str> = time_str.split(':').collect();
            match parts.as_slice() {
                [minutes, seconds] => {
                    let minutes = Self::parse_whole(minutes).ok_or_else(malformed)?;
                    let seconds = Self::parse_fraction(seconds).ok_or_else(malformed)?;
                    minutes as f64 * 60.0 + seconds
                }
                [hours, minutes, seconds] => {
                    let hours = Self::parse_whole(hours).ok_or_else(malformed)?;
                    let minutes = Self::parse_whole(minutes).ok_or_else(malformed)?;
                    let seconds = Self::parse_fraction(seconds).ok_or_else(malformed)?;
                    hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds
                }
                _ => return Err(malformed()),
            }
        } else {
            Self::parse_fraction(time_str).ok_or_else(malformed)?
        };

        Ok(seconds)
    }

    fn parse_whole(part: &str) -> Option<u64> {
        part.trim().parse::<u64>().ok()
    }

    // Negative and non-finite values never describe a position in a video.
    fn parse_fraction(part: &str) -> Option<f64> {
        let value = part.trim().parse::<f64>().ok()?;
        (value.is_finite() && value >= 0.0).then_some(value)
    }

    /// Render seconds for a clip filename.
    ///
    /// Shortest text that parses back to the same value, always with a
    /// fractional part (`10.0`, `10.5`, `16.25`), which is also how clips
    /// written by earlier runs are named.
    pub fn format_for_filename(seconds: f64) -> String {
        let text = format!("{}", seconds);
        if text.contains('.') {
            text
        } else {
            format!("{}.0", text)
        }
    }

    /// Format seconds as `MM:SS.mmm` or `H:MM:SS.mmm` for log output
    pub fn format_time(seconds: f64) -> String {
        let total_millis = (seconds * 1000.0).round() as u64;
        let hours = total_millis / 3_600_000;
        let minutes = (total_millis % 3_600_000) / 60_000;
        let secs = (total_millis % 60_000) / 1000;
        let millis = total_millis % 1000;

        if hours > 0 {
            format!("{}:{:02}:{:02}.{:03}", hours, minutes, secs, millis)
        } else {
            format!("{:02}:{:02}.{:03}", minutes, secs, millis)
        }
    }
}
