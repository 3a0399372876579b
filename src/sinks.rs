use std::io::{self, Write};
use std::time::Duration;

use thiserror::Error;

/// Bell length and loudness at the end of a focus phase
pub const ALERT_MAX_DURATION: Duration = Duration::from_millis(2000);
pub const ALERT_VOLUME: f32 = 0.7;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("alert device unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Audible alert. Calls are fire-and-forget; the timer only logs failures.
pub trait AlertSink {
    fn play_alert(&mut self, max_duration: Duration, volume: f32) -> Result<(), SinkError>;

    /// Play-then-silence so later automatic alerts aren't blocked.
    fn unlock(&mut self) -> Result<(), SinkError> {
        self.play_alert(Duration::ZERO, 0.0)
    }
}

/// Plan-complete display toggles
pub trait CelebrationSink {
    fn show_completion(&mut self);
    fn hide_completion(&mut self);
}

/// Rings the terminal bell (BEL). The terminal decides length and loudness.
#[derive(Debug, Default)]
pub struct TerminalBell {
    muted: bool,
    rung: u32,
}

impl TerminalBell {
    pub fn new(muted: bool) -> Self {
        Self { muted, rung: 0 }
    }

    pub fn times_rung(&self) -> u32 {
        self.rung
    }
}

impl AlertSink for TerminalBell {
    fn play_alert(&mut self, max_duration: Duration, volume: f32) -> Result<(), SinkError> {
        if self.muted || volume <= 0.0 || max_duration.is_zero() {
            return Ok(());
        }
        let mut out = io::stdout();
        out.write_all(b"\x07")?;
        out.flush()?;
        self.rung += 1;
        Ok(())
    }

    // A BEL needs no unlocking; just check the terminal is writable.
    fn unlock(&mut self) -> Result<(), SinkError> {
        io::stdout().flush()?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAlert;

impl AlertSink for NoopAlert {
    fn play_alert(&mut self, _max_duration: Duration, _volume: f32) -> Result<(), SinkError> {
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCelebration;

impl CelebrationSink for NoopCelebration {
    fn show_completion(&mut self) {}
    fn hide_completion(&mut self) {}
}
