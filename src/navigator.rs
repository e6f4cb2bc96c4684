use std::collections::HashSet;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "tiff", "bmp", "gif"];

/// Images found in one folder plus a cursor that wraps around at both ends.
#[derive(Debug, Default)]
pub struct ImageSet {
    files: Vec<PathBuf>,
    cursor: usize,
}

impl ImageSet {
    pub fn from_files(files: Vec<PathBuf>) -> Self {
        Self { files, cursor: 0 }
    }

    /// Scan `dir` (not recursively) for regular files with one of `extensions`.
    ///
    /// Matching is case-sensitive on the raw file name bytes and skips dot-files, so
    /// names that are not valid UTF-8 are found too. Files come back grouped by
    /// extension in directory order; nothing is sorted. Each file appears once even
    /// when several extensions match it (`gz` and `tar.gz`). A folder that cannot be
    /// read simply yields an empty set.
    pub fn discover(dir: &Path, extensions: &[String]) -> Self {
        let Ok(read) = fs::read_dir(dir) else {
            return Self::default();
        };
        let entries: Vec<PathBuf> = read
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.file_name().is_some_and(|n| !is_hidden(n)))
            .collect();

        let mut seen: HashSet<&Path> = HashSet::new();
        let mut files: Vec<PathBuf> = vec![];
        for ext in extensions.iter().filter(|e| !e.is_empty()) {
            for p in &entries {
                if seen.contains(p.as_path()) || !has_extension(p, ext) || !p.is_file() {
                    continue;
                }
                seen.insert(p.as_path());
                files.push(p.clone());
            }
        }
        Self::from_files(files)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Cursor index, or `None` when there is nothing to show.
    pub fn position(&self) -> Option<usize> {
        if self.files.is_empty() { None } else { Some(self.cursor) }
    }

    pub fn current(&self) -> Option<&Path> {
        self.files.get(self.cursor).map(PathBuf::as_path)
    }

    pub fn advance(&mut self) {
        if !self.files.is_empty() {
            self.cursor = (self.cursor + 1) % self.files.len();
        }
    }

    pub fn retreat(&mut self) {
        if !self.files.is_empty() {
            // add len first so the index never underflows
            self.cursor = (self.files.len() + self.cursor - 1) % self.files.len();
        }
    }
}

fn is_hidden(name: &OsStr) -> bool {
    name.as_encoded_bytes().first() == Some(&b'.')
}

/// `name` ends in `.<ext>` with at least one byte before the dot.
fn has_extension(path: &Path, ext: &str) -> bool {
    let Some(name) = path.file_name() else {
        return false;
    };
    let name = name.as_encoded_bytes();
    let ext = ext.as_bytes();
    name.len() > ext.len() + 1
        && name.ends_with(ext)
        && name[name.len() - ext.len() - 1] == b'.'
}
