//! Logging setup for the harvest binary.

use std::fs::File;
use std::path::Path;

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

/// Start a combined terminal and file logger.
///
/// The terminal logger is always installed. A file logger is added when
/// `log_file` is given and the file can be created; otherwise a warning goes
/// to stderr and the run continues with terminal logging alone.
pub fn initialize(log_file: Option<&Path>, verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        config.clone(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let Some(path) = log_file {
        match File::create(path) {
            Ok(file) => loggers.push(WriteLogger::new(level, config, file)),
            Err(err) => eprintln!(
                "warning: could not create log file {}: {}",
                path.display(),
                err
            ),
        }
    }

    let _ = CombinedLogger::init(loggers);
}
