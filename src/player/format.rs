use std::time::Duration;

/// Render seconds as `M:SS`.
///
/// Minutes are unpadded, seconds are floored and zero-padded. Anything that
/// isn't a finite, non-negative number renders as `0:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }

    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// `format_time` for an optional duration; unknown renders as `0:00`.
pub fn format_duration(d: Option<Duration>) -> String {
    match d {
        Some(d) => format_time(d.as_secs_f64()),
        None => format_time(f64::NAN),
    }
}

/// Fraction of `duration` covered by `elapsed`, in `[0, 1]`.
///
/// Unknown or zero duration yields 0.
pub fn progress_fraction(elapsed: Duration, duration: Option<Duration>) -> f64 {
    let Some(total) = duration.map(|d| d.as_secs_f64()).filter(|t| *t > 0.0) else {
        return 0.0;
    };

    let ratio = elapsed.as_secs_f64() / total;
    if ratio.is_finite() {
        ratio.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
