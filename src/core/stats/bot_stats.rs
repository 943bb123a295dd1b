use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use chrono::{DateTime, Utc};

use crate::core::formatting::Uptime;

/// Process-wide counters shown by `about` and `admin`.
pub struct BotStats {
    pub started_at: DateTime<Utc>,
    started: Instant,
    commands_used: AtomicU64,
    total_lines: u64,
}

impl BotStats {
    pub fn new(total_lines: u64) -> Self {
        Self {
            started_at: Utc::now(),
            started: Instant::now(),
            commands_used: AtomicU64::new(0),
            total_lines,
        }
    }

    /// Commands run since the process started.
    pub fn commands_used(&self) -> u64 {
        self.commands_used.load(Ordering::Relaxed)
    }

    pub fn record_command(&self) -> u64 {
        self.commands_used.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn total_lines(&self) -> u64 {
        self.total_lines
    }

    pub fn uptime(&self) -> Uptime {
        Uptime(self.started.elapsed())
    }
}

/// Machine statistics for the `about` embed.
#[derive(Debug, Clone, PartialEq)]
pub struct HostStats {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub os_name: String,
    pub os_version: String,
}

impl HostStats {
    /// `12.5% CPU\n40.2% RAM`
    pub fn activity(&self) -> String {
        format!(
            "{:.1}% CPU\n{:.1}% RAM",
            self.cpu_percent, self.memory_percent
        )
    }

    /// OS line plus the toolchain the bot was built with.
    pub fn host(&self) -> String {
        format!(
            "{} {}\nRust edition 2021",
            self.os_name, self.os_version
        )
        .replace(" \n", "\n")
    }
}

/// Counts the lines of every `.rs` file under `root`.
pub fn count_source_lines(root: &Path) -> std::io::Result<u64> {
    let mut total = 0;
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|ext| ext == "rs") {
                let contents = std::fs::read_to_string(&path)?;
                total += contents.lines().count() as u64;
            }
        }
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_counter() {
        let stats = BotStats::new(10);
        assert_eq!(stats.commands_used(), 0);
        assert_eq!(stats.record_command(), 1);
        assert_eq!(stats.record_command(), 2);
        assert_eq!(stats.commands_used(), 2);
        assert_eq!(stats.total_lines(), 10);
    }

    #[test]
    fn test_host_stats_lines() {
        let host = HostStats {
            cpu_percent: 12.345,
            memory_percent: 40.0,
            os_name: "Debian GNU/Linux".into(),
            os_version: "12".into(),
        };
        assert_eq!(host.activity(), "12.3% CPU\n40.0% RAM");
        assert_eq!(host.host(), "Debian GNU/Linux 12\nRust edition 2021");

        let unknown = HostStats {
            os_version: String::new(),
            ..host
        };
        assert_eq!(unknown.host(), "Debian GNU/Linux\nRust edition 2021");
    }

    #[test]
    fn test_count_source_lines() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("main.rs"), "fn main() {\n}\n").unwrap();
        std::fs::create_dir(dir.path().join("core")).unwrap();
        std::fs::write(dir.path().join("core/lib.rs"), "a\nb\nc").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored\nlines\n").unwrap();

        assert_eq!(count_source_lines(dir.path()).unwrap(), 5);
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(count_source_lines(&dir.path().join("missing")).is_err());
    }
}
