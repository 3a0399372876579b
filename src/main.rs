mod ui;

use anyhow::{Context, Result};
use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use focusplan::{
    app_dirs::AppDirs,
    celebration::CelebrationAnimation,
    clock::SystemClock,
    config::{self, FileStore, KeyValueStore},
    logging,
    plan::{parse_study_hours, Preset, SessionPlan},
    runtime::{Command, CrosstermEventSource, Runner, TimerEvent},
    scheduler::IntervalScheduler,
    sinks::TerminalBell,
    CommandError, SessionTimer, Transition,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::io::{self, stdin};

pub const SETUP_HINT: &str = "No study plan yet. Run `focusplan setup --hours <H> --mode <25-5|50-10>`";

/// focus/break pomodoro cycles sized to how long you want to study
#[derive(Parser, Debug, Clone)]
#[clap(version, about)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// render the small dashboard widget instead of the full timer page
    #[clap(long)]
    compact: bool,

    /// don't ring the terminal bell when a focus session ends
    #[clap(long)]
    mute: bool,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Save the study plan used by the timer
    Setup {
        /// total study time in hours; `1.5` and `1,5` both work
        #[clap(long)]
        hours: String,

        /// focus/break preset in minutes
        #[clap(long, value_parser = ["25-5", "50-10"], default_value = "25-5")]
        mode: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Page,
    Widget,
}

pub type AppTimer = SessionTimer<SystemClock, IntervalScheduler, TerminalBell, CelebrationAnimation>;

pub struct App {
    pub timer: AppTimer,
    pub surface: Surface,
    pub notice: Option<String>,
}

impl App {
    pub fn new(surface: Surface, muted: bool) -> Self {
        Self {
            timer: SessionTimer::new(
                SystemClock::new(),
                IntervalScheduler::new(),
                TerminalBell::new(muted),
                CelebrationAnimation::new(),
            ),
            surface,
            notice: None,
        }
    }

    /// Seed the timer from the stored plan, if there is a valid one.
    pub fn load_plan<S: KeyValueStore + ?Sized>(&mut self, store: &S) {
        match config::load_plan(store) {
            Ok(plan) => self.timer.apply_plan(plan),
            Err(err) => tracing::warn!(%err, "no usable study plan in settings"),
        }
    }

    pub fn apply(&mut self, command: Command) {
        match command {
            Command::Toggle => match self.timer.toggle() {
                Ok(_) => self.notice = None,
                Err(CommandError::NotConfigured) => self.notice = Some(SETUP_HINT.to_string()),
            },
            Command::Pause => {
                self.timer.pause();
                self.notice = None;
            }
            Command::Reset => {
                self.timer.reset();
                self.notice = None;
            }
            Command::SwitchPreset => self.switch_preset(),
            Command::Quit => {}
        }
    }

    /// Rebuild the plan with the other preset, keeping the study time.
    /// Like any reconfiguration this stops the ticker and starts over.
    fn switch_preset(&mut self) {
        let Some(plan) = self.timer.plan().copied() else {
            self.notice = Some(SETUP_HINT.to_string());
            return;
        };
        let preset = plan.preset().other();
        match self.timer.configure(plan.total_study_minutes(), preset.id()) {
            Ok(_) => self.notice = Some(format!("Switched to {preset}.")),
            Err(err) => tracing::warn!(%err, "preset switch rejected"),
        }
    }

    pub fn on_tick(&mut self) {
        if let Some(transition) = self.timer.tick() {
            self.notice = match transition {
                Transition::BreakStarted { .. } => Some("Nice work. Take a break.".to_string()),
                Transition::FocusStarted => Some("Break's over. Back to it.".to_string()),
                Transition::PlanComplete => None,
            };
        }
        self.timer.celebration_mut().update();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::Setup { hours, mode }) = &cli.command {
        return setup(hours, mode);
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Some(path) = AppDirs::log_path() {
        if let Err(err) = logging::init(&path) {
            eprintln!("logging disabled: {err:#}");
        }
    }

    let surface = if cli.compact {
        Surface::Widget
    } else {
        Surface::Page
    };
    let mut app = App::new(surface, cli.mute);
    app.load_plan(&FileStore::new());

    enable_raw_mode().context("enabling raw mode")?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn setup(hours: &str, mode: &str) -> Result<()> {
    let parsed = parse_study_hours(hours).context("invalid --hours")?;
    let plan = SessionPlan::from_hours(parsed, mode).context("invalid --mode")?;

    let mut store = FileStore::new();
    config::save_plan(&mut store, hours, mode)
        .with_context(|| format!("writing {}", store.path().display()))?;

    let preset: Preset = plan.preset();
    println!(
        "Planned {} focus session(s) of {} min with {} min breaks.",
        plan.total_focus_sessions(),
        preset.focus_minutes(),
        preset.break_minutes()
    );
    println!("Saved to {}", store.path().display());
    Ok(())
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let size = terminal.size()?;
    app.timer.celebration_mut().resize(size.width, size.height);

    let runner = Runner::new(CrosstermEventSource::new(), app.timer.tick_interval());

    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        match runner.next_event() {
            TimerEvent::Tick => app.on_tick(),
            TimerEvent::Resize(width, height) => {
                app.timer.celebration_mut().resize(width, height);
            }
            TimerEvent::Command(Command::Quit) => break,
            TimerEvent::Command(command) => app.apply(command),
        }
    }

    Ok(())
}
