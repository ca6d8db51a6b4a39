use chrono::{DateTime, FixedOffset, NaiveDate};
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::clock::{logical_date, Clock, SystemClock, DEFAULT_CUTOFF_HOUR};

pub const DEFAULT_DAYS_TO_KEEP: i64 = 7;

const LEDGER_PREFIX: &str = "seen_topics_";
const LEDGER_SUFFIX: &str = ".txt";

/// What `TopicMemory::reset` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetOutcome {
    Removed(PathBuf),
    NothingToRemove,
    Ephemeral,
    Failed(String),
}

/// File-backed ledger of topics already reported during the current logical
/// day. One plain-text file per day, one cleaned title per line.
///
/// Without a directory the memory is ephemeral: loads are empty and writes
/// are dropped, so previews never touch disk.
pub struct TopicMemory {
    dir: Option<PathBuf>,
    cutoff_hour: u32,
    clock: Box<dyn Clock>,
}

impl TopicMemory {
    pub fn new(dir: Option<PathBuf>, cutoff_hour: u32) -> Self {
        Self::with_clock(dir, cutoff_hour, SystemClock)
    }

    pub fn ephemeral() -> Self {
        Self::new(None, DEFAULT_CUTOFF_HOUR)
    }

    pub fn with_clock(dir: Option<PathBuf>, cutoff_hour: u32, clock: impl Clock + 'static) -> Self {
        Self {
            dir,
            cutoff_hour,
            clock: Box::new(clock),
        }
    }

    pub fn is_ephemeral(&self) -> bool {
        self.dir.is_none()
    }

    /// Current instant according to this memory's clock.
    pub fn now(&self) -> DateTime<FixedOffset> {
        self.clock.now()
    }

    pub fn logical_date(&self) -> NaiveDate {
        logical_date(self.clock.now().naive_local(), self.cutoff_hour)
    }

    /// Ledger file for the current logical day.
    pub fn ledger_path(&self) -> Option<PathBuf> {
        let dir = self.dir.as_ref()?;
        Some(dir.join(ledger_file_name(self.logical_date())))
    }

    /// Topics already reported today. Never fails: an unreadable ledger is
    /// treated as "nothing seen yet".
    pub fn load(&self) -> HashSet<String> {
        let Some(path) = self.ledger_path() else {
            return HashSet::new();
        };

        match fs::read_to_string(&path) {
            Ok(content) => {
                let topics: HashSet<String> = content
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string)
                    .collect();
                debug!(path = %path.display(), count = topics.len(), "Loaded seen topics");
                topics
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => HashSet::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not read seen topics, starting empty");
                HashSet::new()
            }
        }
    }

    /// Record newly reported topics, one per line.
    pub fn append<S: AsRef<str>>(&self, titles: &[S]) {
        let Some(path) = self.ledger_path() else {
            return;
        };
        if titles.is_empty() {
            return;
        }

        if let Err(e) = write_lines(&path, titles) {
            warn!(path = %path.display(), error = %e, "Could not save seen topics");
            return;
        }
        debug!(path = %path.display(), count = titles.len(), "Saved seen topics");
    }

    /// Delete ledgers more than `days_to_keep` days older than today's
    /// calendar date. A ledger exactly `days_to_keep` days old survives.
    pub fn sweep_retention(&self, days_to_keep: i64) {
        let Some(dir) = self.dir.as_ref() else {
            return;
        };

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Could not scan seen-topic ledgers");
                return;
            }
        };

        let today = self.clock.now().date_naive();
        for entry in entries.flatten() {
            let path = entry.path();
            let Some(file_date) = ledger_date(&path) else {
                continue;
            };
            if (today - file_date).num_days() <= days_to_keep {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => info!(path = %path.display(), "Removed expired seen-topic ledger"),
                Err(e) => warn!(path = %path.display(), error = %e, "Could not remove expired ledger"),
            }
        }
    }

    /// Forget everything reported today.
    pub fn reset(&self) -> ResetOutcome {
        let Some(path) = self.ledger_path() else {
            info!("Seen-topic memory is ephemeral, nothing to reset");
            return ResetOutcome::Ephemeral;
        };

        match fs::remove_file(&path) {
            Ok(()) => {
                info!(path = %path.display(), "Cleared today's seen topics");
                ResetOutcome::Removed(path)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "No seen-topic ledger to clear");
                ResetOutcome::NothingToRemove
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not clear seen topics");
                ResetOutcome::Failed(e.to_string())
            }
        }
    }
}

fn ledger_file_name(date: NaiveDate) -> String {
    format!("{}{}{}", LEDGER_PREFIX, date.format("%Y-%m-%d"), LEDGER_SUFFIX)
}

fn ledger_date(path: &Path) -> Option<NaiveDate> {
    let name = path.file_name()?.to_str()?;
    let date_str = name.strip_prefix(LEDGER_PREFIX)?.strip_suffix(LEDGER_SUFFIX)?;
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").ok()
}

/// A ledger entry must stay on one line to be read back as one title.
fn single_line(title: &str) -> String {
    title
        .split(['\r', '\n'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn write_lines<S: AsRef<str>>(path: &Path, lines: &[S]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    for line in lines {
        writeln!(file, "{}", single_line(line.as_ref()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use tempfile::TempDir;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn memory_at(dir: &TempDir, now: NaiveDateTime) -> TopicMemory {
        TopicMemory::with_clock(Some(dir.path().to_path_buf()), DEFAULT_CUTOFF_HOUR, now)
    }

    fn touch(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, "topic\n").unwrap();
        path
    }

    #[test]
    fn test_load_missing_ledger_is_empty() {
        let dir = TempDir::new().unwrap();
        let memory = memory_at(&dir, at(2026, 3, 10, 12));
        assert!(memory.load().is_empty());
    }

    #[test]
    fn test_append_then_load() {
        let dir = TempDir::new().unwrap();
        let memory = memory_at(&dir, at(2026, 3, 10, 12));

        memory.append(&["Fed raises rates", "기준금리 인상"]);
        memory.append(&["Tesla recalls cars".to_string()]);

        let seen = memory.load();
        assert_eq!(seen.len(), 3);
        assert!(seen.contains("Fed raises rates"));
        assert!(seen.contains("기준금리 인상"));
        assert!(seen.contains("Tesla recalls cars"));

        let content = fs::read_to_string(memory.ledger_path().unwrap()).unwrap();
        assert_eq!(content, "Fed raises rates\n기준금리 인상\nTesla recalls cars\n");
    }

    #[test]
    fn test_multiline_title_round_trips_as_one_entry() {
        let dir = TempDir::new().unwrap();
        let memory = memory_at(&dir, at(2026, 3, 10, 12));

        memory.append(&["Fed raises\nrates", "Tesla\r\nrecalls cars"]);

        let seen = memory.load();
        assert_eq!(seen.len(), 2);
        assert!(seen.contains("Fed raises rates"));
        assert!(seen.contains("Tesla recalls cars"));
    }

    #[test]
    fn test_unreadable_ledger_loads_empty() {
        let dir = TempDir::new().unwrap();
        let memory = memory_at(&dir, at(2026, 3, 10, 12));
        fs::create_dir(memory.ledger_path().unwrap()).unwrap();

        assert!(memory.load().is_empty());
    }

    #[test]
    fn test_invalid_utf8_ledger_loads_empty() {
        let dir = TempDir::new().unwrap();
        let memory = memory_at(&dir, at(2026, 3, 10, 12));
        fs::write(memory.ledger_path().unwrap(), [0xff, 0xfe, b'\n']).unwrap();

        assert!(memory.load().is_empty());
    }

    #[test]
    fn test_ledger_file_name() {
        let dir = TempDir::new().unwrap();
        let memory = memory_at(&dir, at(2026, 3, 10, 12));
        assert_eq!(
            memory.ledger_path().unwrap(),
            dir.path().join("seen_topics_2026-03-10.txt")
        );
    }

    #[test]
    fn test_append_creates_directory_lazily() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("output").join("news");
        let memory = TopicMemory::with_clock(Some(nested.clone()), DEFAULT_CUTOFF_HOUR, at(2026, 3, 10, 12));

        assert!(!nested.exists());
        memory.append(&["Fed raises rates"]);
        assert!(nested.join("seen_topics_2026-03-10.txt").exists());
    }

    #[test]
    fn test_load_ignores_blank_lines() {
        let dir = TempDir::new().unwrap();
        let memory = memory_at(&dir, at(2026, 3, 10, 12));
        fs::write(memory.ledger_path().unwrap(), "\nFed raises rates\n  \n").unwrap();

        let seen = memory.load();
        assert_eq!(seen.len(), 1);
        assert!(seen.contains("Fed raises rates"));
    }

    #[test]
    fn test_ephemeral_memory_never_touches_disk() {
        let memory = TopicMemory::ephemeral();
        assert!(memory.is_ephemeral());
        assert!(memory.ledger_path().is_none());

        memory.append(&["Fed raises rates"]);
        assert!(memory.load().is_empty());
        memory.sweep_retention(DEFAULT_DAYS_TO_KEEP);
        assert_eq!(memory.reset(), ResetOutcome::Ephemeral);
    }

    #[test]
    fn test_rollover_at_cutoff_uses_distinct_ledgers() {
        let dir = TempDir::new().unwrap();
        let before = memory_at(&dir, at(2026, 3, 10, 5));
        let after = memory_at(&dir, at(2026, 3, 10, 6));

        assert_ne!(before.ledger_path(), after.ledger_path());

        before.append(&["Late night story"]);
        assert!(after.load().is_empty());

        after.append(&["Morning story"]);
        assert!(before.load().contains("Late night story"));
        assert!(!before.load().contains("Morning story"));
        assert!(dir.path().join("seen_topics_2026-03-09.txt").exists());
        assert!(dir.path().join("seen_topics_2026-03-10.txt").exists());
    }

    #[test]
    fn test_sweep_retention_boundary() {
        let dir = TempDir::new().unwrap();
        let memory = memory_at(&dir, at(2026, 3, 10, 12));

        let expired = touch(&dir, "seen_topics_2026-03-02.txt");
        let boundary = touch(&dir, "seen_topics_2026-03-03.txt");
        let recent = touch(&dir, "seen_topics_2026-03-09.txt");

        memory.sweep_retention(7);

        assert!(!expired.exists());
        assert!(boundary.exists());
        assert!(recent.exists());
    }

    #[test]
    fn test_sweep_skips_unrelated_and_malformed_files() {
        let dir = TempDir::new().unwrap();
        let memory = memory_at(&dir, at(2026, 3, 10, 12));

        let malformed = touch(&dir, "seen_topics_not-a-date.txt");
        let other = touch(&dir, "news_summary_2020-01-01.json");
        let wrong_suffix = touch(&dir, "seen_topics_2020-01-01.bak");

        memory.sweep_retention(7);

        assert!(malformed.exists());
        assert!(other.exists());
        assert!(wrong_suffix.exists());
    }

    #[test]
    fn test_sweep_missing_directory_is_noop() {
        let dir = TempDir::new().unwrap();
        let memory = TopicMemory::with_clock(
            Some(dir.path().join("absent")),
            DEFAULT_CUTOFF_HOUR,
            at(2026, 3, 10, 12),
        );
        memory.sweep_retention(7);
    }

    #[test]
    fn test_reset() {
        let dir = TempDir::new().unwrap();
        let memory = memory_at(&dir, at(2026, 3, 10, 12));

        assert_eq!(memory.reset(), ResetOutcome::NothingToRemove);

        memory.append(&["Fed raises rates"]);
        let path = memory.ledger_path().unwrap();
        assert_eq!(memory.reset(), ResetOutcome::Removed(path.clone()));
        assert!(!path.exists());
        assert!(memory.load().is_empty());
    }
}
