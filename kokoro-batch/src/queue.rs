// Ordered queue of input files

use std::path::{Path, PathBuf};

/// Files waiting to be synthesized, in processing order
#[derive(Debug, Clone, Default)]
pub struct FileQueue {
    files: Vec<PathBuf>,
}

impl FileQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expand glob patterns (including `**`) and queue every existing
    /// file not already present. Returns how many files were added.
    pub fn add_patterns<S: AsRef<str>>(&mut self, patterns: &[S]) -> usize {
        let mut added = 0;

        for pattern in patterns {
            let pattern = pattern.as_ref();
            let mut matched = false;

            match glob::glob(pattern) {
                Ok(paths) => {
                    for entry in paths {
                        match entry {
                            Ok(path) => {
                                matched = true;
                                if self.push(&path) {
                                    added += 1;
                                }
                            }
                            Err(e) => log::warn!("Skipping unreadable path: {}", e),
                        }
                    }
                }
                Err(e) => log::debug!("Not a glob pattern '{}': {}", pattern, e),
            }

            // Literal file names that happen to contain glob syntax
            if !matched {
                let path = Path::new(pattern);
                if path.is_file() {
                    if self.push(path) {
                        added += 1;
                    }
                } else {
                    log::warn!("No files matched: {}", pattern);
                }
            }
        }

        added
    }

    /// Queue a single file. Returns false for non-files and duplicates.
    pub fn push(&mut self, path: &Path) -> bool {
        if !path.is_file() {
            return false;
        }
        let path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        if self.files.contains(&path) {
            return false;
        }
        self.files.push(path);
        true
    }

    /// Remove the entries at `indices`; out-of-range indices are ignored
    pub fn remove(&mut self, indices: &[usize]) {
        let mut indices = indices.to_vec();
        indices.sort_unstable();
        indices.dedup();
        for index in indices.into_iter().rev() {
            if index < self.files.len() {
                self.files.remove(index);
            }
        }
    }

    /// Move one entry up (`-1`) or down (`1`). Returns the new index, or
    /// `None` when the move would leave the queue bounds.
    pub fn move_item(&mut self, index: usize, direction: isize) -> Option<usize> {
        let target = index.checked_add_signed(direction)?;
        if index >= self.files.len() || target >= self.files.len() {
            return None;
        }
        let path = self.files.remove(index);
        self.files.insert(target, path);
        Some(target)
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        self.files.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, "text").unwrap();
        path
    }

    fn names(queue: &FileQueue) -> Vec<String> {
        queue
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    fn pattern(dir: &Path, rest: &str) -> String {
        format!("{}/{}", dir.display(), rest)
    }

    #[test]
    fn test_add_patterns_recursive() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.txt");
        touch(dir.path(), "nested/deeper/b.txt");
        touch(dir.path(), "c.epub");

        let mut queue = FileQueue::new();
        let added = queue.add_patterns(&[pattern(dir.path(), "**/*.txt")]);

        assert_eq!(added, 2);
        let mut found = names(&queue);
        found.sort();
        assert_eq!(found, vec!["a.txt", "b.txt"]);
        assert!(queue.iter().all(|p| p.is_absolute()));
    }

    #[test]
    fn test_add_patterns_skips_duplicates_and_directories() {
        let dir = TempDir::new().unwrap();
        let a = touch(dir.path(), "a.txt");
        fs::create_dir(dir.path().join("folder")).unwrap();

        let mut queue = FileQueue::new();
        let added = queue.add_patterns(&[
            a.display().to_string(),
            pattern(dir.path(), "*"),
            pattern(dir.path(), "missing-*.txt"),
        ]);

        assert_eq!(added, 1);
        assert_eq!(names(&queue), vec!["a.txt"]);
    }

    #[test]
    fn test_add_literal_name_with_brackets() {
        let dir = TempDir::new().unwrap();
        let odd = touch(dir.path(), "chapter[1].txt");

        let mut queue = FileQueue::new();
        assert_eq!(queue.add_patterns(&[odd.display().to_string()]), 1);
        assert_eq!(names(&queue), vec!["chapter[1].txt"]);
    }

    #[test]
    fn test_move_item() {
        let dir = TempDir::new().unwrap();
        let mut queue = FileQueue::new();
        for name in ["a.txt", "b.txt", "c.txt"] {
            assert!(queue.push(&touch(dir.path(), name)));
        }

        assert_eq!(queue.move_item(0, 1), Some(1));
        assert_eq!(names(&queue), vec!["b.txt", "a.txt", "c.txt"]);

        assert_eq!(queue.move_item(2, -1), Some(1));
        assert_eq!(names(&queue), vec!["b.txt", "c.txt", "a.txt"]);

        assert_eq!(queue.move_item(0, -1), None);
        assert_eq!(queue.move_item(2, 1), None);
        assert_eq!(queue.move_item(7, -1), None);
        assert_eq!(names(&queue), vec!["b.txt", "c.txt", "a.txt"]);
    }

    #[test]
    fn test_remove_and_clear() {
        let dir = TempDir::new().unwrap();
        let mut queue = FileQueue::new();
        for name in ["a.txt", "b.txt", "c.txt", "d.txt"] {
            queue.push(&touch(dir.path(), name));
        }

        queue.remove(&[3, 0, 9, 0]);
        assert_eq!(names(&queue), vec!["b.txt", "c.txt"]);

        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.len(), 0);
    }
}
