//! The focus/break countdown state machine.
//!
//! `SessionTimer` owns all mutable timer state and is driven by three kinds
//! of calls: user commands (`configure`, `start`, `pause`, `reset`), and
//! `tick`, which the run loop delivers while the scheduler has a ticker
//! armed. Each call takes `&mut self`, so a command and a tick can never
//! interleave mid-update.
//!
//! The countdown subtracts real elapsed clock time on every tick rather than
//! a fixed step, so late or missed ticks don't accumulate drift.

use std::time::Duration;

use thiserror::Error;

use crate::clock::Clock;
use crate::plan::{ConfigError, Preset, SessionPlan};
use crate::scheduler::{tick_interval, Scheduler, TickHandle};
use crate::sinks::{AlertSink, CelebrationSink, ALERT_MAX_DURATION, ALERT_VOLUME};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("no study plan configured")]
    NotConfigured,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    Focus,
    Break,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum TimerStatus {
    Unconfigured,
    Paused,
    Running,
    Complete,
}

/// What a tick changed, if it finished a phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    BreakStarted { completed_focus_sessions: u32 },
    FocusStarted,
    PlanComplete,
}

pub struct SessionTimer<C, S, A, K> {
    clock: C,
    scheduler: S,
    alert: A,
    celebration: K,
    tick_interval: Duration,
    plan: Option<SessionPlan>,
    phase: Phase,
    completed_focus_sessions: u32,
    total_duration_ms: u64,
    remaining_ms: u64,
    is_running: bool,
    last_tick_ms: Option<u64>,
    ticker: Option<TickHandle>,
    complete: bool,
}

fn as_ms(d: Duration) -> u64 {
    d.as_millis() as u64
}

impl<C, S, A, K> SessionTimer<C, S, A, K>
where
    C: Clock,
    S: Scheduler,
    A: AlertSink,
    K: CelebrationSink,
{
    pub fn new(clock: C, scheduler: S, alert: A, celebration: K) -> Self {
        // Unconfigured timers show a default focus length.
        let default_ms = Preset::Classic.focus_minutes() as u64 * 60 * 1000;
        Self {
            clock,
            scheduler,
            alert,
            celebration,
            tick_interval: tick_interval(),
            plan: None,
            phase: Phase::Focus,
            completed_focus_sessions: 0,
            total_duration_ms: default_ms,
            remaining_ms: default_ms,
            is_running: false,
            last_tick_ms: None,
            ticker: None,
            complete: false,
        }
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Build a plan from the requested total study minutes and install it.
    /// On error the current state (and any previous plan) is left alone.
    pub fn configure(
        &mut self,
        total_study_minutes: f64,
        preset_id: &str,
    ) -> Result<SessionPlan, ConfigError> {
        let plan = SessionPlan::new(total_study_minutes, preset_id).inspect_err(|err| {
            tracing::warn!(total_study_minutes, preset_id, %err, "rejected study plan");
        })?;
        self.apply_plan(plan);
        Ok(plan)
    }

    /// Install `plan`, discarding all progress on the previous one.
    pub fn apply_plan(&mut self, plan: SessionPlan) {
        self.halt_ticking();
        self.is_running = false;
        self.plan = Some(plan);
        self.restart_plan();
        tracing::info!(
            preset = %plan.preset(),
            sessions = plan.total_focus_sessions(),
            "study plan configured"
        );
    }

    pub fn start(&mut self) -> Result<TimerStatus, CommandError> {
        if self.is_running {
            return Ok(TimerStatus::Running);
        }
        if self.plan.is_none() {
            tracing::info!("start requested without a study plan");
            return Err(CommandError::NotConfigured);
        }
        if self.complete {
            return Ok(TimerStatus::Complete);
        }

        if let Err(err) = self.alert.unlock() {
            tracing::debug!(%err, "alert unlock failed");
        }
        self.resume();
        tracing::info!(phase = %self.phase, remaining_ms = self.remaining_ms, "timer started");
        Ok(TimerStatus::Running)
    }

    pub fn pause(&mut self) {
        if !self.is_running {
            return;
        }
        self.halt_ticking();
        self.is_running = false;
        self.last_tick_ms = None;
        tracing::info!(phase = %self.phase, remaining_ms = self.remaining_ms, "timer paused");
    }

    /// Start when paused, pause when running.
    pub fn toggle(&mut self) -> Result<TimerStatus, CommandError> {
        if self.is_running {
            self.pause();
            Ok(self.status())
        } else {
            self.start()
        }
    }

    /// Back to the first focus session of the current plan.
    pub fn reset(&mut self) {
        self.halt_ticking();
        self.is_running = false;
        self.restart_plan();
        tracing::info!("timer reset");
    }

    pub fn tick(&mut self) -> Option<Transition> {
        if !self.is_running || self.ticker.is_none() {
            return None;
        }

        let now = self.clock.now_ms();
        let elapsed = now.saturating_sub(self.last_tick_ms.unwrap_or(now));
        self.last_tick_ms = Some(now);
        self.remaining_ms = self.remaining_ms.saturating_sub(elapsed);
        tracing::trace!(elapsed, remaining_ms = self.remaining_ms, "tick");

        if self.remaining_ms > 0 {
            return None;
        }

        self.halt_ticking();
        self.is_running = false;
        self.last_tick_ms = None;
        Some(self.complete_phase())
    }

    fn complete_phase(&mut self) -> Transition {
        match self.phase {
            Phase::Focus => {
                self.completed_focus_sessions += 1;
                if let Err(err) = self.alert.play_alert(ALERT_MAX_DURATION, ALERT_VOLUME) {
                    tracing::debug!(%err, "alert failed");
                }

                if self.completed_focus_sessions >= self.target() {
                    self.complete = true;
                    self.celebration.show_completion();
                    tracing::info!(
                        completed = self.completed_focus_sessions,
                        "study plan complete"
                    );
                    return Transition::PlanComplete;
                }

                self.enter_phase(Phase::Break);
                self.resume();
                tracing::info!(
                    completed = self.completed_focus_sessions,
                    sessions = self.target(),
                    "focus session done, break started"
                );
                Transition::BreakStarted {
                    completed_focus_sessions: self.completed_focus_sessions,
                }
            }
            Phase::Break => {
                self.enter_phase(Phase::Focus);
                self.resume();
                tracing::info!("break over, focus started");
                Transition::FocusStarted
            }
        }
    }

    fn restart_plan(&mut self) {
        self.completed_focus_sessions = 0;
        self.last_tick_ms = None;
        self.complete = false;
        self.celebration.hide_completion();
        if self.plan.is_some() {
            self.enter_phase(Phase::Focus);
        } else {
            self.phase = Phase::Focus;
        }
    }

    fn enter_phase(&mut self, phase: Phase) {
        let Some(plan) = self.plan else {
            return;
        };
        self.phase = phase;
        self.total_duration_ms = match phase {
            Phase::Focus => as_ms(plan.focus_duration()),
            Phase::Break => as_ms(plan.break_duration()),
        };
        self.remaining_ms = self.total_duration_ms;
    }

    fn resume(&mut self) {
        self.halt_ticking();
        self.is_running = true;
        self.last_tick_ms = Some(self.clock.now_ms());
        self.ticker = Some(self.scheduler.schedule_repeating(self.tick_interval));
    }

    fn halt_ticking(&mut self) {
        if let Some(handle) = self.ticker.take() {
            self.scheduler.cancel(handle);
        }
    }

    fn target(&self) -> u32 {
        self.plan.map_or(0, |p| p.total_focus_sessions())
    }

    pub fn status(&self) -> TimerStatus {
        if self.plan.is_none() {
            TimerStatus::Unconfigured
        } else if self.complete {
            TimerStatus::Complete
        } else if self.is_running {
            TimerStatus::Running
        } else {
            TimerStatus::Paused
        }
    }

    pub fn plan(&self) -> Option<&SessionPlan> {
        self.plan.as_ref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn completed_focus_sessions(&self) -> u32 {
        self.completed_focus_sessions
    }

    pub fn total_focus_sessions(&self) -> u32 {
        self.target()
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.total_duration_ms
    }

    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn last_tick_ms(&self) -> Option<u64> {
        self.last_tick_ms
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn alert(&self) -> &A {
        &self.alert
    }

    pub fn celebration(&self) -> &K {
        &self.celebration
    }

    pub fn celebration_mut(&mut self) -> &mut K {
        &mut self.celebration
    }
}
