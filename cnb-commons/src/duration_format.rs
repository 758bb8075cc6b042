use std::time::Duration;

/// Rounds a duration to the nearest millisecond, halfway values away from zero.
#[must_use]
pub fn round_to_millis(duration: Duration) -> Duration {
    let millis = (duration.as_nanos() + 500_000) / 1_000_000;
    Duration::from_millis(u64::try_from(millis).unwrap_or(u64::MAX))
}

// Returns the part of a duration only in milliseconds
fn milliseconds(duration: &Duration) -> u32 {
    duration.subsec_millis()
}

fn seconds(duration: &Duration) -> u64 {
    duration.as_secs() % 60
}

fn minutes(duration: &Duration) -> u64 {
    (duration.as_secs() / 60) % 60
}

fn hours(duration: &Duration) -> u64 {
    duration.as_secs() / 3600
}

/// Formats a duration with millisecond precision the way Go prints a `time.Duration`:
/// `0s`, `250ms`, `1.5s`, `2m3.004s`, `1h0m1s`.
///
/// ```
/// use cnb_commons::duration_format::human;
/// use std::time::Duration;
///
/// assert_eq!(human(&Duration::from_millis(1500)), "1.5s");
/// ```
#[must_use]
pub fn human(duration: &Duration) -> String {
    let hours = hours(duration);
    let minutes = minutes(duration);
    let seconds = seconds(duration);
    let milliseconds = milliseconds(duration);

    if duration.as_secs() == 0 {
        return if milliseconds == 0 {
            String::from("0s")
        } else {
            format!("{milliseconds}ms")
        };
    }

    let fraction = if milliseconds == 0 {
        String::new()
    } else {
        format!(".{milliseconds:0>3}").trim_end_matches('0').to_string()
    };

    if hours > 0 {
        format!("{hours}h{minutes}m{seconds}{fraction}s")
    } else if minutes > 0 {
        format!("{minutes}m{seconds}{fraction}s")
    } else {
        format!("{seconds}{fraction}s")
    }
}
