use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum CommitError {
    #[error("invalid label {label:?}: not usable as a folder name")]
    InvalidLabel { label: char },

    #[error("could not create {}: {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("{} has no file name", path.display())]
    NoFileName { path: PathBuf },

    #[error("{} no longer exists", path.display())]
    SourceMissing { path: PathBuf },

    #[error("destination {} already exists", path.display())]
    DestinationExists { path: PathBuf },

    #[error("could not move {} to {}: {source}", from.display(), to.display())]
    Move { from: PathBuf, to: PathBuf, source: io::Error },

    #[error("copied {} to {} but could not remove the original: {source}", from.display(), to.display())]
    RemoveAfterCopy { from: PathBuf, to: PathBuf, source: io::Error },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommitSummary {
    pub moved: usize,
    pub directories: usize,
}

pub type CommitResult = Result<CommitSummary, CommitError>;

/// Label assigned to each image, one character per file. Assigning again replaces
/// the previous label.
#[derive(Debug, Default)]
pub struct LabelMap {
    labels: BTreeMap<PathBuf, char>,
}

impl LabelMap {
    pub fn set_label(&mut self, file: &Path, label: char) {
        self.labels.insert(file.to_path_buf(), label);
    }

    /// `None` means the file has not been labeled.
    pub fn label_of(&self, file: &Path) -> Option<char> {
        self.labels.get(file).copied()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn distinct_labels(&self) -> BTreeSet<char> {
        self.labels.values().copied().collect()
    }

    /// Move every labeled file into `base/<label>/`, creating the label folders first.
    ///
    /// Stops at the first failure. Files moved before that point stay where they were
    /// moved to; nothing is rolled back. An existing file at the destination counts as
    /// a failure and is never overwritten.
    pub fn commit(&self, base: &Path) -> CommitResult {
        let mut summary = CommitSummary::default();

        for label in self.distinct_labels() {
            let dir = label_dir(base, label)?;
            fs::create_dir_all(&dir).map_err(|source| CommitError::CreateDir {
                path: dir.clone(),
                source,
            })?;
            summary.directories += 1;
        }

        for (file, &label) in &self.labels {
            let dir = label_dir(base, label)?;
            move_into(file, &dir)?;
            summary.moved += 1;
        }

        Ok(summary)
    }
}

fn label_dir(base: &Path, label: char) -> Result<PathBuf, CommitError> {
    let name = label.to_string();
    let mut parts = Path::new(&name).components();
    match (parts.next(), parts.next()) {
        (Some(Component::Normal(_)), None) => Ok(base.join(name)),
        _ => Err(CommitError::InvalidLabel { label }),
    }
}

fn move_into(file: &Path, dir: &Path) -> Result<(), CommitError> {
    let Some(name) = file.file_name() else {
        return Err(CommitError::NoFileName { path: file.to_path_buf() });
    };
    let dest = dir.join(name);

    if fs::symlink_metadata(file).is_err() {
        return Err(CommitError::SourceMissing { path: file.to_path_buf() });
    }
    if fs::symlink_metadata(&dest).is_ok() {
        return Err(CommitError::DestinationExists { path: dest });
    }

    let renamed = fs::rename(file, &dest);
    finish_move(renamed, file, &dest)
}

/// Turn the result of `rename` into the move result. A cross-device rename is
/// redone as copy + remove; if only the remove fails the file exists in both places
/// and the error says so.
fn finish_move(renamed: io::Result<()>, file: &Path, dest: &Path) -> Result<(), CommitError> {
    let move_err = |source| CommitError::Move {
        from: file.to_path_buf(),
        to: dest.to_path_buf(),
        source,
    };
    match renamed {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            fs::copy(file, dest).map_err(move_err)?;
            fs::remove_file(file).map_err(|source| CommitError::RemoveAfterCopy {
                from: file.to_path_buf(),
                to: dest.to_path_buf(),
                source,
            })
        }
        Err(e) => Err(move_err(e)),
    }
}
