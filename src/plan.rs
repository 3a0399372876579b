use std::time::Duration;

use thiserror::Error;

/// Reasons a study plan can't be built from user input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("study duration must be a positive, finite number")]
    InvalidDuration,
    #[error("unknown preset; expected one of \"25-5\" or \"50-10\"")]
    UnknownPreset,
}

/// Supported (focus, break) pairs
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Preset {
    #[strum(serialize = "25-5")]
    Classic,
    #[strum(serialize = "50-10")]
    Extended,
}

impl Preset {
    pub const ALL: [Preset; 2] = [Preset::Classic, Preset::Extended];

    /// Exact match on the stored id; no trimming or case folding.
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "25-5" => Some(Preset::Classic),
            "50-10" => Some(Preset::Extended),
            _ => None,
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Preset::Classic => "25-5",
            Preset::Extended => "50-10",
        }
    }

    /// The preset the dashboard switch flips to
    pub fn other(&self) -> Self {
        match self {
            Preset::Classic => Preset::Extended,
            Preset::Extended => Preset::Classic,
        }
    }

    pub fn focus_minutes(&self) -> u32 {
        match self {
            Preset::Classic => 25,
            Preset::Extended => 50,
        }
    }

    pub fn break_minutes(&self) -> u32 {
        match self {
            Preset::Classic => 5,
            Preset::Extended => 10,
        }
    }
}

/// Parse a stored study duration in hours. Either `.` or `,` works as the
/// decimal separator.
///
/// The whole value must be a number: trailing text such as `"2h"`,
/// `"1.5 hours"` or a second separator (`"1,5,0"`) is rejected rather than
/// read as a numeric prefix, so a malformed value leaves the timer
/// unconfigured.
pub fn parse_study_hours(raw: &str) -> Result<f64, ConfigError> {
    let normalized = raw.trim().replacen(',', ".", 1);
    let hours = normalized
        .parse::<f64>()
        .map_err(|_| ConfigError::InvalidDuration)?;
    if hours.is_finite() && hours > 0.0 {
        Ok(hours)
    } else {
        Err(ConfigError::InvalidDuration)
    }
}

/// Immutable configuration for one run of focus/break cycles.
///
/// Built once from the requested total study time and a preset; a new plan
/// replaces the old one wholesale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionPlan {
    preset: Preset,
    total_study_minutes: f64,
    total_focus_sessions: u32,
}

impl SessionPlan {
    pub fn new(total_study_minutes: f64, preset_id: &str) -> Result<Self, ConfigError> {
        if !total_study_minutes.is_finite() || total_study_minutes <= 0.0 {
            return Err(ConfigError::InvalidDuration);
        }
        let preset = Preset::from_id(preset_id).ok_or(ConfigError::UnknownPreset)?;

        let sessions = (total_study_minutes / preset.focus_minutes() as f64).ceil();
        // Clamp so absurd requests saturate instead of wrapping.
        let total_focus_sessions = sessions.clamp(1.0, u32::MAX as f64) as u32;

        Ok(Self {
            preset,
            total_study_minutes,
            total_focus_sessions,
        })
    }

    pub fn from_hours(hours: f64, preset_id: &str) -> Result<Self, ConfigError> {
        Self::new(hours * 60.0, preset_id)
    }

    pub fn preset(&self) -> Preset {
        self.preset
    }

    pub fn total_study_minutes(&self) -> f64 {
        self.total_study_minutes
    }

    pub fn total_focus_sessions(&self) -> u32 {
        self.total_focus_sessions
    }

    pub fn focus_duration(&self) -> Duration {
        Duration::from_secs(self.preset.focus_minutes() as u64 * 60)
    }

    pub fn break_duration(&self) -> Duration {
        Duration::from_secs(self.preset.break_minutes() as u64 * 60)
    }
}
