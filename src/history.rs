use std::env;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

const MAX_ENTRIES: usize = 500;

/// Command history backing the editor's Up/Down keys, persisted to
/// `~/.npshell_history`.
pub struct History {
    entries: Vec<String>,
    cursor: usize,
    file_path: PathBuf,
}

impl History {
    pub fn new() -> Self {
        let file_path = Self::history_path();
        let mut entries = Self::load(&file_path);
        if entries.len() > MAX_ENTRIES {
            entries.drain(..entries.len() - MAX_ENTRIES);
        }
        let cursor = entries.len();

        Self {
            entries,
            cursor,
            file_path,
        }
    }

    fn history_path() -> PathBuf {
        let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".npshell_history")
    }

    fn load(path: &PathBuf) -> Vec<String> {
        match File::open(path) {
            Ok(file) => BufReader::new(file).lines().map_while(Result::ok).collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn add(&mut self, line: String) {
        if line.trim().is_empty() {
            return;
        }

        // Skip immediate repeats.
        if self.entries.last() != Some(&line) {
            self.append_to_file(&line);
            self.entries.push(line);
            if self.entries.len() > MAX_ENTRIES {
                self.entries.remove(0);
            }
        }

        self.cursor = self.entries.len();
    }

    fn append_to_file(&self, line: &str) {
        if let Ok(mut file) = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)
        {
            let _ = writeln!(file, "{}", line);
        }
    }

    /// Step back toward older entries.
    pub fn previous(&mut self) -> Option<&String> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    /// Step forward toward newer entries; `None` once past the newest.
    pub fn next(&mut self) -> Option<&String> {
        if self.cursor + 1 < self.entries.len() {
            self.cursor += 1;
            self.entries.get(self.cursor)
        } else {
            self.cursor = self.entries.len();
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty() -> History {
        History {
            entries: Vec::new(),
            cursor: 0,
            file_path: std::env::temp_dir().join(format!(".npshell_history_test_{}", std::process::id())),
        }
    }

    #[test]
    fn deduplicates_consecutive_entries() {
        let mut history = empty();
        history.add("ls".to_string());
        history.add("ls".to_string());
        history.add("wc".to_string());
        assert_eq!(history.entries, vec!["ls", "wc"]);
        let _ = std::fs::remove_file(&history.file_path);
    }

    #[test]
    fn walks_backward_and_forward() {
        let mut history = empty();
        history.add("first".to_string());
        history.add("second".to_string());

        assert_eq!(history.previous().map(String::as_str), Some("second"));
        assert_eq!(history.previous().map(String::as_str), Some("first"));
        assert_eq!(history.previous(), None);
        assert_eq!(history.next().map(String::as_str), Some("second"));
        assert_eq!(history.next(), None);
        let _ = std::fs::remove_file(&history.file_path);
    }

    #[test]
    fn empty_history_has_nothing_to_walk() {
        let mut history = empty();
        assert_eq!(history.previous(), None);
        assert_eq!(history.next(), None);
    }
}
