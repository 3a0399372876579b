//! Event plumbing between the terminal and the timer.
//!
//! Key presses are turned into [`Command`]s where they are read, so the run
//! loop only ever sees timer-level events. A `Tick` is produced whenever no
//! command arrives within one tick interval; the timer measures real elapsed
//! time itself, so a tick delayed by a burst of key presses loses nothing.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// What a key press asks the timer to do
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Toggle,
    Pause,
    Reset,
    SwitchPreset,
    Quit,
}

impl Command {
    pub fn from_key(key: &KeyEvent) -> Option<Self> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Command::Quit);
        }
        match key.code {
            KeyCode::Char(' ') | KeyCode::Char('s') | KeyCode::Enter => Some(Command::Toggle),
            KeyCode::Char('p') => Some(Command::Pause),
            KeyCode::Char('r') => Some(Command::Reset),
            KeyCode::Char('m') => Some(Command::SwitchPreset),
            KeyCode::Char('q') | KeyCode::Esc => Some(Command::Quit),
            _ => None,
        }
    }
}

/// Everything the run loop reacts to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerEvent {
    Command(Command),
    Resize(u16, u16),
    Tick,
}

impl TimerEvent {
    /// Translate a raw terminal event; unbound keys and releases yield `None`.
    pub fn from_terminal(event: CtEvent) -> Option<Self> {
        match event {
            CtEvent::Key(key) if key.kind == KeyEventKind::Press => {
                Command::from_key(&key).map(TimerEvent::Command)
            }
            CtEvent::Resize(w, h) => Some(TimerEvent::Resize(w, h)),
            _ => None,
        }
    }
}

/// Anything that can hand the loop timer events with a timeout
pub trait TimerEventSource: Send + 'static {
    fn recv_timeout(&self, timeout: Duration) -> Result<TimerEvent, RecvTimeoutError>;
}

/// Reads crossterm events on a background thread
pub struct CrosstermEventSource {
    rx: Receiver<TimerEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let raw = match event::read() {
                Ok(raw) => raw,
                Err(err) => {
                    tracing::error!(%err, "terminal event reader stopped");
                    break;
                }
            };
            let Some(ev) = TimerEvent::from_terminal(raw) else {
                continue;
            };
            if tx.send(ev).is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<TimerEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Channel-fed source for headless runs
pub struct ChannelEventSource {
    rx: Receiver<TimerEvent>,
}

impl ChannelEventSource {
    pub fn new(rx: Receiver<TimerEvent>) -> Self {
        Self { rx }
    }
}

impl TimerEventSource for ChannelEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<TimerEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Paces the run loop at the timer's tick interval
pub struct Runner<E: TimerEventSource> {
    events: E,
    tick: Duration,
}

impl<E: TimerEventSource> Runner<E> {
    pub fn new(events: E, tick: Duration) -> Self {
        Self { events, tick }
    }

    /// Next command or resize, or `Tick` once the interval passes quietly.
    /// A closed source degrades to plain ticking.
    pub fn next_event(&self) -> TimerEvent {
        self.events
            .recv_timeout(self.tick)
            .unwrap_or(TimerEvent::Tick)
    }
}
