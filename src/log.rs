use std::fmt;

/// Severity of a compiler diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
    Debug,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Debug => "DEBUG",
        };
        f.write_str(tag)
    }
}

/// Sink for severity-tagged diagnostics produced during compilation.
///
/// How messages are presented (console, buffer, remote push) is up to the
/// implementation; the compiler only ever calls these methods.
pub trait Logger {
    fn log(&mut self, level: LogLevel, message: &str);

    fn info(&mut self, message: &str) {
        self.log(LogLevel::Info, message);
    }
    fn warning(&mut self, message: &str) {
        self.log(LogLevel::Warning, message);
    }
    fn error(&mut self, message: &str) {
        self.log(LogLevel::Error, message);
    }
    fn debug(&mut self, message: &str) {
        self.log(LogLevel::Debug, message);
    }
}

/// Buffers formatted messages in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemoryLog {
    messages: Vec<String>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

impl Logger for MemoryLog {
    fn log(&mut self, level: LogLevel, message: &str) {
        self.messages.push(format!("[{level}] {message}"));
    }
}

/// Forwards diagnostics to whatever `tracing` subscriber the host installed.
#[derive(Debug, Default)]
pub struct TracingLog;

impl Logger for TracingLog {
    fn log(&mut self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Info => tracing::info!("{message}"),
            LogLevel::Warning => tracing::warn!("{message}"),
            LogLevel::Error => tracing::error!("{message}"),
            LogLevel::Debug => tracing::debug!("{message}"),
        }
    }
}
