use tracing::info;

use crate::types::migration::Direction;

/// Receives one line per applied or reverted migration step.
pub trait MigrationLogger: Send + Sync {
    fn log(&self, line: &str);
}

impl<F> MigrationLogger for F
where
    F: Fn(&str) + Send + Sync,
{
    fn log(&self, line: &str) {
        (self)(line)
    }
}

/// Forwards step lines to `tracing` at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl MigrationLogger for TracingLogger {
    fn log(&self, line: &str) {
        info!(target: "mongo_migrate", "{}", line);
    }
}

/// Formats the line handed to a [`MigrationLogger`], e.g. `MIGRATED UP: 3 add index`.
pub fn step_line(direction: Direction, version: u64, description: &str) -> String {
    format!("MIGRATED {}: {} {}", direction, version, description)
}
