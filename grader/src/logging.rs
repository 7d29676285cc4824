use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing::Level;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::error::{GraderError, GraderResult};

/// Map a configured level name to a tracing level.
pub fn level(name: &str) -> GraderResult<Level> {
    match name.trim().to_ascii_lowercase().as_str() {
        "" => Ok(Level::INFO),
        "warning" => Ok(Level::WARN),
        "fatal" | "critical" => Ok(Level::ERROR),
        other => other
            .parse()
            .map_err(|_| GraderError::Config(format!("unknown log level {name:?}"))),
    }
}

/// Log destination: stdout, stderr or a file opened for appending.
pub fn writer(path: &str) -> GraderResult<BoxMakeWriter> {
    match path.trim() {
        "" | "stdout" | "-" => Ok(BoxMakeWriter::new(std::io::stdout)),
        "stderr" => Ok(BoxMakeWriter::new(std::io::stderr)),
        file => {
            let file = Path::new(file);
            if let Some(dir) = file.parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir)?;
            }
            let f = OpenOptions::new()
                .create(true)
                .append(true)
                .open(file)
                .map_err(|e| GraderError::Config(format!("log file {}: {e}", file.display())))?;
            Ok(BoxMakeWriter::new(Mutex::new(f)))
        }
    }
}

pub fn is_terminal(path: &str) -> bool {
    use std::io::IsTerminal;
    match path.trim() {
        "" | "stdout" | "-" => std::io::stdout().is_terminal(),
        "stderr" => std::io::stderr().is_terminal(),
        _ => false,
    }
}
