use clap::ValueEnum;
use tracing::Level;

/// Verbosity of diagnostics on stderr. The listing itself always goes to stdout.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    #[default]
    Warn,
    Error,
    /// No diagnostics at all
    Silent,
}

impl LogLevel {
    pub fn to_tracing_level(self) -> Option<Level> {
        Some(match self {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
            LogLevel::Silent => return None,
        })
    }
}
