// private sub-module defined in other files
mod record_reader;

// exports identifiers from private sub-modules in the current module namespace
pub use self::record_reader::RecordReader;

use std::time::Instant;

/// Returns a formatted string of elapsed time, e.g. `1min 34.852s`. Used by
/// the run orchestrator and terrain builder to log how long an external
/// process invocation took.
pub fn get_formatted_elapsed_time(instant: Instant) -> String {
    let dur = instant.elapsed();
    let minutes = dur.as_secs() / 60;
    let sub_sec = dur.as_secs() % 60;
    let sub_milli = dur.subsec_millis();
    if minutes > 0 {
        return format!("{}min {}.{}s", minutes, sub_sec, sub_milli);
    }
    format!("{}.{}s", sub_sec, sub_milli)
}

/// Rounds `value` to `decimals` decimal places. Used throughout the terrain
/// agreement metrics (spec §4.6, §8 numeric precision table) and rating
/// curve extraction (spec §4.7, 0.1 ft rounding).
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_to_matches_precision() {
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert_eq!(round_to(1.005, 2), 1.01);
        assert_eq!(round_to(12.3, 0), 12.0);
    }
}
