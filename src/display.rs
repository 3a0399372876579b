use crate::timer::Phase;

/// `MM:SS` for a millisecond count. Minutes are not wrapped at 60.
pub fn format_clock(ms: u64) -> String {
    let total_secs = ms / 1000;
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

/// Fraction of the phase already elapsed, in `[0, 1]`
pub fn progress_ratio(remaining_ms: u64, total_ms: u64) -> f64 {
    if total_ms == 0 {
        return 0.0;
    }
    (1.0 - remaining_ms as f64 / total_ms as f64).clamp(0.0, 1.0)
}

/// The session counter counts the running focus session as in progress.
pub fn session_number(phase: Phase, completed: u32, target: u32) -> u32 {
    let in_progress = u32::from(phase == Phase::Focus);
    (completed + in_progress).min(target)
}

pub fn session_label(phase: Phase, completed: u32, target: u32) -> String {
    format!(
        "{} - Session {} of {}",
        phase,
        session_number(phase, completed, target),
        target
    )
}

pub fn motivation_line(phase: Phase, completed: u32, target: u32) -> String {
    format!(
        "{}. Stay focused, you got this!",
        session_label(phase, completed, target)
    )
}
