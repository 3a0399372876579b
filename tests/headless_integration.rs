use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc;
use std::time::Duration;

use focusplan::clock::ManualClock;
use focusplan::config::{self, MemoryStore};
use focusplan::runtime::{ChannelEventSource, Command, Runner, TimerEvent};
use focusplan::scheduler::IntervalScheduler;
use focusplan::sinks::{AlertSink, CelebrationSink, SinkError};
use focusplan::{CommandError, Phase, SessionTimer, TimerStatus, Transition};

const MIN: u64 = 60 * 1000;

#[derive(Debug, Clone, PartialEq)]
enum SideEffect {
    Unlock,
    Alert(Duration, f32),
    Show,
    Hide,
}

type Log = Rc<RefCell<Vec<SideEffect>>>;

struct RecordingAlert(Log);

impl AlertSink for RecordingAlert {
    fn play_alert(&mut self, max_duration: Duration, volume: f32) -> Result<(), SinkError> {
        self.0.borrow_mut().push(SideEffect::Alert(max_duration, volume));
        Ok(())
    }

    fn unlock(&mut self) -> Result<(), SinkError> {
        self.0.borrow_mut().push(SideEffect::Unlock);
        Err(SinkError::Unavailable("autoplay blocked".into()))
    }
}

struct RecordingCelebration(Log);

impl CelebrationSink for RecordingCelebration {
    fn show_completion(&mut self) {
        self.0.borrow_mut().push(SideEffect::Show);
    }

    fn hide_completion(&mut self) {
        self.0.borrow_mut().push(SideEffect::Hide);
    }
}

type Timer = SessionTimer<ManualClock, IntervalScheduler, RecordingAlert, RecordingCelebration>;

fn build() -> (Timer, ManualClock, Log) {
    let clock = ManualClock::new(0);
    let log: Log = Rc::default();
    let timer = SessionTimer::new(
        clock.clone(),
        IntervalScheduler::new(),
        RecordingAlert(log.clone()),
        RecordingCelebration(log.clone()),
    );
    (timer, clock, log)
}

fn command(command: Command) -> TimerEvent {
    TimerEvent::Command(command)
}

/// Deliver one tick after `ms` of simulated time
fn tick_after(timer: &mut Timer, clock: &ManualClock, ms: u64) -> Option<Transition> {
    clock.advance(ms);
    timer.tick()
}

#[test]
fn stored_plan_runs_to_completion() {
    let mut store = MemoryStore::new();
    config::save_plan(&mut store, "1", "25-5").unwrap();
    let plan = config::load_plan(&store).unwrap();

    let (mut timer, clock, log) = build();
    timer.apply_plan(plan);
    assert_eq!(timer.total_focus_sessions(), 3);
    timer.start().unwrap();

    let mut transitions = Vec::new();
    // 250ms ticks with jitter, well past three focus blocks and two breaks
    let mut step = 0u64;
    while timer.is_running() {
        let jitter = [250, 260, 240, 900, 250][step as usize % 5];
        step += 1;
        if let Some(t) = tick_after(&mut timer, &clock, jitter) {
            transitions.push(t);
        }
        assert!(step < 1_000_000, "timer never finished");
    }

    assert_eq!(
        transitions,
        vec![
            Transition::BreakStarted {
                completed_focus_sessions: 1
            },
            Transition::FocusStarted,
            Transition::BreakStarted {
                completed_focus_sessions: 2
            },
            Transition::FocusStarted,
            Transition::PlanComplete,
        ]
    );
    assert_eq!(timer.status(), TimerStatus::Complete);
    assert_eq!(timer.remaining_ms(), 0);

    let alerts = log
        .borrow()
        .iter()
        .filter(|e| matches!(e, SideEffect::Alert(..)))
        .count();
    assert_eq!(alerts, 3);
    assert_eq!(log.borrow().last(), Some(&SideEffect::Show));
}

#[test]
fn alerts_use_bounded_duration_and_volume() {
    let (mut timer, clock, log) = build();
    timer.configure(50.0, "25-5").unwrap();
    timer.start().unwrap();
    tick_after(&mut timer, &clock, 25 * MIN);

    assert!(log
        .borrow()
        .contains(&SideEffect::Alert(Duration::from_millis(2000), 0.7)));
}

#[test]
fn unlock_failure_does_not_block_start() {
    let (mut timer, _clock, log) = build();
    timer.configure(60.0, "50-10").unwrap();
    assert_eq!(timer.start(), Ok(TimerStatus::Running));
    assert!(log.borrow().contains(&SideEffect::Unlock));
}

#[test]
fn break_auto_resumes_without_start() {
    let (mut timer, clock, _log) = build();
    timer.configure(120.0, "50-10").unwrap();
    timer.start().unwrap();

    tick_after(&mut timer, &clock, 50 * MIN);
    assert_eq!(timer.phase(), Phase::Break);
    assert!(timer.is_running());
    tick_after(&mut timer, &clock, 4 * MIN);
    assert_eq!(timer.remaining_ms(), 6 * MIN);

    tick_after(&mut timer, &clock, 6 * MIN);
    assert_eq!(timer.phase(), Phase::Focus);
    assert!(timer.is_running());
    assert_eq!(timer.scheduler().active_count(), 1);
}

#[test]
fn unconfigured_start_is_rejected() {
    let (mut timer, _clock, log) = build();
    assert_eq!(timer.start(), Err(CommandError::NotConfigured));
    assert!(!timer.is_running());
    assert!(log.borrow().is_empty());
}

#[test]
fn reset_from_completion_clears_celebration() {
    let (mut timer, clock, log) = build();
    timer.configure(10.0, "25-5").unwrap();
    timer.start().unwrap();
    tick_after(&mut timer, &clock, 30 * MIN);
    assert!(timer.is_complete());

    timer.reset();
    assert_eq!(log.borrow().last(), Some(&SideEffect::Hide));
    assert_eq!(timer.status(), TimerStatus::Paused);
    assert_eq!(timer.total_focus_sessions(), 1);
}

// Drive the timer through the runner exactly like the binary's event loop.
#[test]
fn runner_drives_commands_and_ticks() {
    let (mut timer, clock, _log) = build();
    timer.configure(25.0, "25-5").unwrap();

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(ChannelEventSource::new(rx), Duration::from_millis(1));

    tx.send(command(Command::Toggle)).unwrap();
    tx.send(command(Command::Toggle)).unwrap(); // pause
    tx.send(command(Command::Toggle)).unwrap(); // resume

    let mut completed = false;
    for _ in 0..200u32 {
        match runner.next_event() {
            TimerEvent::Tick => {
                // Each simulated tick stands for a quarter of the session
                clock.advance(25 * MIN / 4);
                if timer.tick() == Some(Transition::PlanComplete) {
                    completed = true;
                    break;
                }
            }
            TimerEvent::Command(Command::Toggle) => {
                timer.toggle().unwrap();
            }
            TimerEvent::Command(Command::Pause) => timer.pause(),
            TimerEvent::Command(Command::Reset) => timer.reset(),
            TimerEvent::Command(Command::SwitchPreset) | TimerEvent::Command(Command::Quit) => {}
            TimerEvent::Resize(..) => {}
        }
    }

    assert!(completed, "plan should complete after four ticks");
    assert_eq!(timer.completed_focus_sessions(), 1);
    assert!(!timer.scheduler().is_armed());
}

#[test]
fn repeated_start_pause_never_stacks_tickers() {
    let (mut timer, clock, _log) = build();
    timer.configure(60.0, "25-5").unwrap();
    for _ in 0..20 {
        timer.start().unwrap();
        timer.start().unwrap();
        assert_eq!(timer.scheduler().active_count(), 1);
        tick_after(&mut timer, &clock, 1_000);
        timer.pause();
        assert_eq!(timer.scheduler().active_count(), 0);
    }
    assert_eq!(timer.remaining_ms(), 25 * MIN - 20_000);
    assert_eq!(timer.scheduler().times_armed(), 20);
}
