use log::{LevelFilter, Metadata, Record};
use once_cell::sync::OnceCell;
use std::fs::{OpenOptions, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;

pub const LOG_FILE: &str = "log.txt";

#[derive(Debug)]
struct FileLogger {
    log_file: PathBuf,
    level: LevelFilter,
}

static LOGGER: OnceCell<FileLogger> = OnceCell::new();

impl log::Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let log_entry = format!(
                "{} {} - {}\n",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            );

            // The terminal belongs to the UI, so a failed write is dropped silently.
            if let Ok(mut file) = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.log_file)
            {
                let _ = file.write_all(log_entry.as_bytes());
            }
        }
    }

    fn flush(&self) {}
}

/// Installs the file logger writing to `<log_dir>/log.txt`.
///
/// Only the first call wins; later calls keep the existing logger and return `Ok`.
pub fn init(log_dir: &Path, level: LevelFilter) -> Result<()> {
    create_dir_all(log_dir)?;

    let mut installed = false;
    let logger = LOGGER.get_or_init(|| {
        installed = true;
        FileLogger {
            log_file: log_dir.join(LOG_FILE),
            level,
        }
    });

    if installed {
        log::set_logger(logger)?;
        log::set_max_level(level);
    }
    Ok(())
}
