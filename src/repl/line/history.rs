//! Bounded input history
//!
//! Newline-delimited text on disk, most recent entry last.

use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::Path;

/// Bounded FIFO of submitted lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryBuffer {
    entries: VecDeque<String>,
    max_len: usize,
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(4096)
    }
}

impl HistoryBuffer {
    pub fn new(max_len: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_len,
        }
    }

    /// Change the cap, dropping the oldest entries if needed
    pub fn set_max_len(
        &mut self,
        max_len: usize,
    ) {
        self.max_len = max_len;
        self.trim();
    }

    /// Append a line; blank lines are not recorded
    pub fn add(
        &mut self,
        line: &str,
    ) -> bool {
        if line.trim().is_empty() || self.max_len == 0 {
            return false;
        }
        self.entries.push_back(line.to_string());
        self.trim();
        true
    }

    fn trim(&mut self) {
        while self.entries.len() > self.max_len {
            self.entries.pop_front();
        }
    }

    /// Append the lines of a history file after the current entries
    pub fn load(
        &mut self,
        path: &Path,
    ) -> io::Result<()> {
        let content = fs::read_to_string(path)?;
        for line in content.lines() {
            self.add(line);
        }
        Ok(())
    }

    /// Rewrite the history file in full
    pub fn save(
        &self,
        path: &Path,
    ) -> io::Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        let mut content = String::new();
        for entry in &self.entries {
            content.push_str(entry);
            content.push('\n');
        }
        fs::write(path, content)
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cap_keeps_most_recent() {
        let mut history = HistoryBuffer::new(2);
        history.add("a");
        history.add("b");
        history.add("c");
        assert_eq!(history.entries(), vec!["b", "c"]);
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let mut history = HistoryBuffer::new(10);
        assert!(!history.add("   "));
        assert!(history.add("x = 1"));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_load_appends_then_save_rewrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("history");

        let mut first = HistoryBuffer::new(3);
        first.add("one");
        first.add("two");
        first.save(&path).unwrap();

        let mut second = HistoryBuffer::new(3);
        second.load(&path).unwrap();
        second.add("three");
        second.add("four");
        second.save(&path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "two\nthree\nfour\n");
    }

    #[test]
    fn test_shrinking_cap_drops_oldest() {
        let mut history = HistoryBuffer::new(5);
        for line in ["a", "b", "c"] {
            history.add(line);
        }
        history.set_max_len(1);
        assert_eq!(history.entries(), vec!["c"]);
    }
}
