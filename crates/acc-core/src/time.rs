//! Time model.
//!
//! All times are `f64` seconds.  Absolute times are seconds after midnight of
//! the service day (values past 86 400 are allowed for after-midnight trips,
//! as in GTFS); durations are plain seconds.

use crate::{CoreError, CoreResult};

pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Parse `HH:MM` or `HH:MM:SS` into seconds after midnight.
///
/// Hours above 23 are accepted so service-day times like `25:10:00` parse.
pub fn parse_clock(value: &str) -> CoreResult<f64> {
    let invalid = || CoreError::InvalidClock(value.to_owned());

    let parts: Vec<&str> = value.trim().split(':').collect();
    if !(2..=3).contains(&parts.len()) {
        return Err(invalid());
    }
    let mut fields = [0u32; 3];
    for (slot, part) in fields.iter_mut().zip(&parts) {
        *slot = part.parse().map_err(|_| invalid())?;
    }
    let [h, m, s] = fields;
    if m >= 60 || s >= 60 {
        return Err(invalid());
    }
    Ok(f64::from(h * 3_600 + m * 60 + s))
}

/// Render seconds after midnight as `HH:MM:SS` (for log lines).
pub fn format_clock(secs: f64) -> String {
    let total = secs.max(0.0).round() as u64;
    format!("{:02}:{:02}:{:02}", total / 3_600, (total % 3_600) / 60, total % 60)
}
