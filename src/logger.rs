use std::io;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;
use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;

/// Crates whose chatter is capped at `warn` regardless of the chosen level
const NOISY_TARGETS: &[&str] = &["hyper", "reqwest", "rustls", "h2"];

pub struct LogConfig {
    /// Level for stdout
    pub console_level: LevelFilter,
    /// Level for the log file, if there is one
    pub file_level: LevelFilter,
    pub log_file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            console_level: LevelFilter::Info,
            file_level: LevelFilter::Debug,
            log_file: None,
        }
    }
}

impl LogConfig {
    pub fn new(level: &str, log_file: Option<PathBuf>) -> Self {
        let console_level = parse_log_level(level);
        Self {
            console_level,
            // the file never records less than the console does
            file_level: console_level.max(LevelFilter::Debug),
            log_file,
        }
    }
}

pub fn init(config: LogConfig) -> Result<()> {
    let colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::Magenta);

    let console = fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{} [{}] [{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.target(),
                colors.color(record.level()),
                message
            ))
        })
        .level(config.console_level)
        .chain(io::stdout());

    let mut dispatch = fern::Dispatch::new().level(LevelFilter::Trace).chain(console);
    for target in NOISY_TARGETS {
        dispatch = dispatch.level_for(*target, LevelFilter::Warn);
    }

    if let Some(log_file) = config.log_file {
        // no color codes in the file
        let file = fern::Dispatch::new()
            .format(|out, message, record| {
                out.finish(format_args!(
                    "{} [{}] [{}] {}",
                    chrono::Utc::now().to_rfc3339(),
                    record.target(),
                    record.level(),
                    message
                ))
            })
            .level(config.file_level)
            .chain(fern::log_file(log_file)?);
        dispatch = dispatch.chain(file);
    }

    dispatch.apply()?;
    Ok(())
}

/// Unknown names fall back to `info`.
pub fn parse_log_level(level: &str) -> LevelFilter {
    LevelFilter::from_str(level.trim()).unwrap_or(LevelFilter::Info)
}
