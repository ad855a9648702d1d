use colored::*;
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Writes level-coloured log lines to stderr so they never mix with
/// program output on stdout.
pub struct ColorLogger {
    level: LevelFilter,
}

impl ColorLogger {
    pub fn new(level: LevelFilter) -> Self {
        Self { level }
    }
}

impl Log for ColorLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let level = match record.level() {
            Level::Error => "ERROR".red().bold(),
            Level::Warn => "WARN ".yellow().bold(),
            Level::Info => "INFO ".green(),
            Level::Debug => "DEBUG".blue(),
            Level::Trace => "TRACE".dimmed(),
        };
        eprintln!("{} {} {}", level, record.target().dimmed(), record.args());
    }

    fn flush(&self) {}
}

/// Level for a `-v` count: warnings by default, debug with one flag,
/// trace with two or more.
pub fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

pub fn init(verbosity: u8) -> Result<(), SetLoggerError> {
    let level = level_for(verbosity);
    log::set_boxed_logger(Box::new(ColorLogger::new(level)))?;
    log::set_max_level(level);
    Ok(())
}
