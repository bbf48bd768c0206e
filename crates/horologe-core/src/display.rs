//! Text formatting for renderers.

use chrono::{DateTime, FixedOffset, Offset, TimeZone, Timelike, Utc};

/// `MM:SS.cc` (minutes are not wrapped at an hour).
pub fn stopwatch(ms: u64) -> String {
    let minutes = ms / 60_000;
    let seconds = (ms % 60_000) / 1000;
    let centis = (ms % 1000) / 10;
    format!("{minutes:02}:{seconds:02}.{centis:02}")
}

/// `HH:MM:SS`, rounding partial seconds up so a running countdown shows `00:00:01`
/// until it actually completes.
pub fn countdown(ms: u64) -> String {
    let secs = ms.div_ceil(1000);
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// `MM:SS` for a pomodoro phase, rounding partial seconds up.
pub fn pomodoro(ms: u64) -> String {
    let secs = ms.div_ceil(1000);
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Accumulated work time as `{h}h {m}m`.
pub fn work_total(ms: u64) -> String {
    let secs = ms / 1000;
    format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
}

/// Digital clock readout: `HH:MM[:SS]` in 24h, `hh:MM[:SS] AM|PM` in 12h.
pub fn clock<T: Timelike>(time: &T, hour24: bool, seconds: bool) -> String {
    let (hour, suffix) = if hour24 {
        (time.hour(), "")
    } else {
        let h = time.hour() % 12;
        (if h == 0 { 12 } else { h }, if time.hour() >= 12 { " PM" } else { " AM" })
    };
    let mut out = format!("{hour:02}:{:02}", time.minute());
    if seconds {
        out.push_str(&format!(":{:02}", time.second()));
    }
    out.push_str(suffix);
    out
}

/// World-clock readout `HH:MM:SS` at a fixed UTC offset in minutes.
/// Offsets outside ±24h fall back to UTC.
pub fn world_clock<Tz: TimeZone>(now: &DateTime<Tz>, offset_minutes: i32) -> String {
    let offset = FixedOffset::east_opt(offset_minutes.saturating_mul(60)).unwrap_or(Utc.fix());
    clock(&now.with_timezone(&offset), true, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn stopwatch_format() {
        assert_eq!(stopwatch(0), "00:00.00");
        assert_eq!(stopwatch(61_234), "01:01.23");
        assert_eq!(stopwatch(3_600_000), "60:00.00");
    }

    #[test]
    fn countdown_rounds_up() {
        assert_eq!(countdown(3_723_000), "01:02:03");
        assert_eq!(countdown(1), "00:00:01");
        assert_eq!(countdown(0), "00:00:00");
    }

    #[test]
    fn pomodoro_and_totals() {
        assert_eq!(pomodoro(25 * 60_000), "25:00");
        assert_eq!(work_total(100 * 60_000), "1h 40m");
    }

    #[test]
    fn twelve_hour_clock() {
        let t = NaiveTime::from_hms_opt(0, 5, 9).unwrap();
        assert_eq!(clock(&t, false, false), "12:05 AM");
        let t = NaiveTime::from_hms_opt(13, 5, 9).unwrap();
        assert_eq!(clock(&t, false, true), "01:05:09 PM");
        assert_eq!(clock(&t, true, true), "13:05:09");
    }

    #[test]
    fn world_clock_applies_offset() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 23, 30, 0).unwrap();
        assert_eq!(world_clock(&now, 9 * 60), "08:30:00");
        assert_eq!(world_clock(&now, -5 * 60), "18:30:00");
    }
}
