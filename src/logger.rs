use log::{Level, LevelFilter, Log, Metadata, Record};

use crate::serial_println;

static LOGGER: SerialLogger = SerialLogger;

/// Routes `log` records to COM1. The text display stays reserved for the terminal.
pub struct SerialLogger;

pub fn init(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    log::set_logger(&LOGGER).map(|()| log::set_max_level(level))
}

fn level_tag(level: Level) -> char {
    match level {
        Level::Error => 'E',
        Level::Warn => 'W',
        Level::Info => '*',
        Level::Debug => 'D',
        Level::Trace => 'T',
    }
}

impl Log for SerialLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            serial_println!(
                "[{}] {}: {}",
                level_tag(record.level()),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}
