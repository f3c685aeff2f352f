//! Input enumeration.
//!
//! Turns a mix of file and directory paths into an ordered, indexed
//! sequence of work items. Ordering is stable across runs: files are
//! sorted by full path string, never by filesystem enumeration order.

use std::path::PathBuf;

use regex::Regex;
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

use crate::models::WorkItem;

/// Default file pattern for directory inputs.
pub const DEFAULT_PATTERN: &str = "*.pdf";

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Input path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Invalid file pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

/// Options for input enumeration.
#[derive(Debug, Clone)]
pub struct DispatchOptions {
    /// Glob pattern matched against file names in directory inputs
    /// (case-insensitive). Direct file arguments bypass the pattern.
    pub pattern: String,
    /// Whether directory inputs are walked recursively.
    pub recursive: bool,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.to_string(),
            recursive: false,
        }
    }
}

/// Enumerates input files into work items.
pub struct WorkDispatcher {
    matcher: Regex,
    recursive: bool,
}

impl WorkDispatcher {
    pub fn new(options: &DispatchOptions) -> Result<Self, DispatchError> {
        let matcher = glob_to_regex(&options.pattern).map_err(|e| DispatchError::InvalidPattern {
            pattern: options.pattern.clone(),
            message: e.to_string(),
        })?;
        Ok(Self {
            matcher,
            recursive: options.recursive,
        })
    }

    /// Enumerate all inputs into indexed work items.
    ///
    /// Fails fast when an input path does not exist. A directory that
    /// matches nothing is not an error; the empty result surfaces
    /// later as an empty report.
    pub fn dispatch(&self, inputs: &[PathBuf]) -> Result<Vec<WorkItem>, DispatchError> {
        let mut files: Vec<PathBuf> = Vec::new();

        for input in inputs {
            if !input.exists() {
                return Err(DispatchError::PathNotFound(input.clone()));
            }
            if input.is_file() {
                files.push(input.clone());
            } else {
                self.collect_dir(input, &mut files);
            }
        }

        files.sort_by(|a, b| a.to_string_lossy().cmp(&b.to_string_lossy()));
        files.dedup();

        Ok(files
            .into_iter()
            .enumerate()
            .map(|(index, path)| WorkItem::new(index, path))
            .collect())
    }

    fn collect_dir(&self, dir: &PathBuf, files: &mut Vec<PathBuf>) {
        let max_depth = if self.recursive { usize::MAX } else { 1 };
        for entry in WalkDir::new(dir).max_depth(max_depth) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    debug!("Skipping unreadable entry under {}: {}", dir.display(), e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if self.matcher.is_match(&name) {
                files.push(entry.into_path());
            }
        }
    }
}

/// Compile a shell-style glob (`*`, `?`) into an anchored,
/// case-insensitive regex.
fn glob_to_regex(pattern: &str) -> Result<Regex, regex::Error> {
    let mut translated = String::with_capacity(pattern.len() + 8);
    translated.push_str("(?i)^");
    for ch in pattern.chars() {
        match ch {
            '*' => translated.push_str(".*"),
            '?' => translated.push('.'),
            other => translated.push_str(&regex::escape(&other.to_string())),
        }
    }
    translated.push('$');
    Regex::new(&translated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &std::path::Path) {
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn sorts_by_full_path_and_assigns_contiguous_indices() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("b.pdf"));
        touch(&dir.path().join("a.pdf"));
        touch(&dir.path().join("c.pdf"));

        let dispatcher = WorkDispatcher::new(&DispatchOptions::default()).unwrap();
        let items = dispatcher.dispatch(&[dir.path().to_path_buf()]).unwrap();

        let names: Vec<_> = items
            .iter()
            .map(|i| i.path.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.pdf", "b.pdf", "c.pdf"]);
        let indices: Vec<_> = items.iter().map(|i| i.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn pattern_match_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("upper.PDF"));
        touch(&dir.path().join("lower.pdf"));
        touch(&dir.path().join("other.txt"));

        let dispatcher = WorkDispatcher::new(&DispatchOptions::default()).unwrap();
        let items = dispatcher.dispatch(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn recursion_is_opt_in() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("top.pdf"));
        fs::create_dir(dir.path().join("sub")).unwrap();
        touch(&dir.path().join("sub").join("nested.pdf"));

        let flat = WorkDispatcher::new(&DispatchOptions::default()).unwrap();
        assert_eq!(flat.dispatch(&[dir.path().to_path_buf()]).unwrap().len(), 1);

        let recursive = WorkDispatcher::new(&DispatchOptions {
            recursive: true,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            recursive.dispatch(&[dir.path().to_path_buf()]).unwrap().len(),
            2
        );
    }

    #[test]
    fn direct_file_arguments_bypass_the_pattern() {
        let dir = tempfile::tempdir().unwrap();
        let notes = dir.path().join("notes.txt");
        touch(&notes);

        let dispatcher = WorkDispatcher::new(&DispatchOptions::default()).unwrap();
        let items = dispatcher.dispatch(&[notes.clone()]).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].path, notes);
    }

    #[test]
    fn missing_input_fails_fast() {
        let dispatcher = WorkDispatcher::new(&DispatchOptions::default()).unwrap();
        let err = dispatcher
            .dispatch(&[PathBuf::from("/no/such/path.pdf")])
            .unwrap_err();
        assert!(matches!(err, DispatchError::PathNotFound(_)));
    }

    #[test]
    fn empty_directory_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let dispatcher = WorkDispatcher::new(&DispatchOptions::default()).unwrap();
        let items = dispatcher.dispatch(&[dir.path().to_path_buf()]).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn custom_pattern() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("scan_001.pdf"));
        touch(&dir.path().join("report.pdf"));

        let dispatcher = WorkDispatcher::new(&DispatchOptions {
            pattern: "scan_*.pdf".to_string(),
            recursive: false,
        })
        .unwrap();
        let items = dispatcher.dispatch(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn duplicate_inputs_collapse() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.pdf");
        touch(&file);

        let dispatcher = WorkDispatcher::new(&DispatchOptions::default()).unwrap();
        let items = dispatcher
            .dispatch(&[file.clone(), file.clone()])
            .unwrap();
        assert_eq!(items.len(), 1);
    }
}
