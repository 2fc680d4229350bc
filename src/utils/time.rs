//! Playback time helpers

/// Format seconds as `m:ss`, the way the player shows elapsed and total time
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }

    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Clamp a playback position into `[0, duration]`
pub fn clamp_position(time: f64, duration: f64) -> f64 {
    if !time.is_finite() || time < 0.0 {
        return 0.0;
    }
    if duration.is_finite() && duration > 0.0 && time > duration {
        return duration;
    }
    time
}
