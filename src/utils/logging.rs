use chrono::Local;
use flate2::{write::GzEncoder, Compression};
use std::{
    fs::{self, File, OpenOptions},
    io::{self, Write},
    path::Path,
};

pub const DEFAULT_LOG_FILE: &str = "/var/log/provider-canonical.log";
pub const DEFAULT_MAX_LOG_BYTES: u64 = 10 * 1024 * 1024;
pub const DEFAULT_MAX_LOG_BACKUPS: usize = 5;

pub trait Logger: Send + Sync {
    fn log(&mut self, message: &str);
    fn debug_log(&mut self, message: &str);
}

/// Appends to a log file. Once the file reaches `max_bytes` it is gzipped
/// to `<file>.1.gz`, older backups shift up and at most `max_backups` are
/// kept.
#[derive(Debug)]
pub struct FileLogger {
    log_file: String,
    debug: bool,
    max_bytes: u64,
    max_backups: usize,
}

impl FileLogger {
    pub fn new(log_file: &str, debug: bool) -> io::Result<Self> {
        // Create log directory if it doesn't exist
        if let Some(parent) = Path::new(log_file).parent() {
            fs::create_dir_all(parent)?;
        }

        Ok(FileLogger {
            log_file: log_file.to_string(),
            debug,
            max_bytes: DEFAULT_MAX_LOG_BYTES,
            max_backups: DEFAULT_MAX_LOG_BACKUPS,
        })
    }

    pub fn with_rotation(mut self, max_bytes: u64, max_backups: usize) -> Self {
        self.max_bytes = max_bytes;
        self.max_backups = max_backups;
        self
    }

    fn backup_path(&self, index: usize) -> String {
        format!("{}.{}.gz", self.log_file, index)
    }

    fn rotate_if_needed(&self) -> io::Result<()> {
        let size = match fs::metadata(&self.log_file) {
            Ok(metadata) => metadata.len(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e),
        };
        if size < self.max_bytes {
            return Ok(());
        }
        if self.max_backups == 0 {
            return fs::remove_file(&self.log_file);
        }

        for index in (1..self.max_backups).rev() {
            let from = self.backup_path(index);
            if Path::new(&from).exists() {
                fs::rename(&from, self.backup_path(index + 1))?;
            }
        }

        let mut current = File::open(&self.log_file)?;
        let mut encoder = GzEncoder::new(File::create(self.backup_path(1))?, Compression::default());
        io::copy(&mut current, &mut encoder)?;
        encoder.finish()?;
        fs::remove_file(&self.log_file)
    }

    fn write_to_file(&self, message: &str) -> io::Result<()> {
        self.rotate_if_needed()?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file)?;

        writeln!(
            file,
            "{}: [v{}] {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            env!("CARGO_PKG_VERSION"),
            message
        )
    }
}

impl Logger for FileLogger {
    fn log(&mut self, message: &str) {
        if let Err(e) = self.write_to_file(message) {
            eprintln!("Failed to write to log file: {}", e);
        }
    }

    fn debug_log(&mut self, message: &str) {
        if self.debug {
            if let Err(e) = self.write_to_file(&format!("[DEBUG] {}", message)) {
                eprintln!("Failed to write debug log: {}", e);
            }
        }
    }
}

/// Writes to stderr so stdout stays reserved for the rendered stages.
#[derive(Debug, Default)]
pub struct StderrLogger {
    debug: bool,
}

impl StderrLogger {
    pub fn new(debug: bool) -> Self {
        Self { debug }
    }
}

impl Logger for StderrLogger {
    fn log(&mut self, message: &str) {
        eprintln!("{}", message);
    }

    fn debug_log(&mut self, message: &str) {
        if self.debug {
            eprintln!("[DEBUG] {}", message);
        }
    }
}

// MultiLogger allows logging to multiple destinations
pub struct MultiLogger {
    loggers: Vec<Box<dyn Logger>>,
}

impl MultiLogger {
    pub fn new(loggers: Vec<Box<dyn Logger>>) -> Self {
        Self { loggers }
    }
}

impl Logger for MultiLogger {
    fn log(&mut self, message: &str) {
        for logger in &mut self.loggers {
            logger.log(message);
        }
    }

    fn debug_log(&mut self, message: &str) {
        for logger in &mut self.loggers {
            logger.debug_log(message);
        }
    }
}

#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryLogger {
    pub logs: Vec<String>,
}

#[cfg(test)]
impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.logs.iter().any(|line| line.contains(needle))
    }
}

#[cfg(test)]
impl Logger for MemoryLogger {
    fn log(&mut self, message: &str) {
        self.logs.push(message.to_string());
    }

    fn debug_log(&mut self, message: &str) {
        self.logs.push(format!("DEBUG: {}", message));
    }
}
