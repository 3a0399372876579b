// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod celebration;
pub mod clock;
pub mod config;
pub mod display;
pub mod logging;
pub mod plan;
pub mod runtime;
pub mod scheduler;
pub mod sinks;
pub mod timer;

pub use plan::{ConfigError, Preset, SessionPlan};
pub use timer::{CommandError, Phase, SessionTimer, TimerStatus, Transition};
