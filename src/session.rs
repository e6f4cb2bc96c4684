use crate::labels::{CommitResult, LabelMap};
use crate::navigator::ImageSet;
use std::path::{Path, PathBuf};

/// Everything the user can ask of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Next,
    Previous,
    Commit,
    SetLabel(char),
}

#[derive(Debug)]
pub enum Outcome {
    Moved,
    Labeled(char),
    Committed(CommitResult),
    AlreadyCommitted,
    Ignored,
}

/// State of one labeling run over a single folder.
pub struct Session {
    base_dir: PathBuf,
    images: ImageSet,
    labels: LabelMap,
    committed: bool,
}

impl Session {
    pub fn new(base_dir: PathBuf, images: ImageSet) -> Self {
        Self {
            base_dir,
            images,
            labels: LabelMap::default(),
            committed: false,
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn images(&self) -> &ImageSet {
        &self.images
    }

    pub fn labels(&self) -> &LabelMap {
        &self.labels
    }

    pub fn is_committed(&self) -> bool {
        self.committed
    }

    pub fn current(&self) -> Option<&Path> {
        self.images.current()
    }

    pub fn current_label(&self) -> Option<char> {
        self.current().and_then(|f| self.labels.label_of(f))
    }

    pub fn status_text(&self) -> String {
        if self.images.is_empty() {
            return "No images".to_owned();
        }
        match self.current_label() {
            Some(label) => format!("Mapped to {}", label),
            None => "unmapped".to_owned(),
        }
    }

    pub fn dispatch(&mut self, cmd: Command) -> Outcome {
        match cmd {
            Command::Next => {
                self.images.advance();
                Outcome::Moved
            }
            Command::Previous => {
                self.images.retreat();
                Outcome::Moved
            }
            Command::SetLabel(label) => match self.images.current() {
                Some(file) => {
                    self.labels.set_label(file, label);
                    Outcome::Labeled(label)
                }
                None => Outcome::Ignored,
            },
            Command::Commit => match self.commit_once() {
                Some(result) => Outcome::Committed(result),
                None => Outcome::AlreadyCommitted,
            },
        }
    }

    /// Runs the commit unless one already happened in this session.
    pub fn commit_once(&mut self) -> Option<CommitResult> {
        if self.committed {
            return None;
        }
        self.committed = true;
        Some(self.labels.commit(&self.base_dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn session_with(names: &[&str]) -> (TempDir, Session) {
        let tmp = TempDir::new().unwrap();
        let files = names
            .iter()
            .map(|n| {
                let p = tmp.path().join(n);
                fs::write(&p, b"img").unwrap();
                p
            })
            .collect();
        let session = Session::new(tmp.path().to_path_buf(), ImageSet::from_files(files));
        (tmp, session)
    }

    #[test]
    fn empty_session_reports_no_images() {
        let (_tmp, mut session) = session_with(&[]);
        assert_eq!(session.status_text(), "No images");
        assert!(matches!(session.dispatch(Command::Next), Outcome::Moved));
        assert!(matches!(session.dispatch(Command::SetLabel('1')), Outcome::Ignored));
        assert!(session.labels().is_empty());
        assert_eq!(session.current(), None);
    }

    #[test]
    fn labels_follow_the_cursor() {
        let (_tmp, mut session) = session_with(&["a.png", "b.png"]);
        assert_eq!(session.status_text(), "unmapped");

        assert!(matches!(session.dispatch(Command::SetLabel('5')), Outcome::Labeled('5')));
        assert_eq!(session.status_text(), "Mapped to 5");

        session.dispatch(Command::Next);
        assert_eq!(session.status_text(), "unmapped");
        session.dispatch(Command::SetLabel('2'));

        session.dispatch(Command::Previous);
        assert_eq!(session.current_label(), Some('5'));
        session.dispatch(Command::SetLabel('9'));
        assert_eq!(session.status_text(), "Mapped to 9");
    }

    #[test]
    fn commit_runs_once() {
        let (tmp, mut session) = session_with(&["a.png"]);
        session.dispatch(Command::SetLabel('1'));

        match session.dispatch(Command::Commit) {
            Outcome::Committed(Ok(summary)) => assert_eq!(summary.moved, 1),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(tmp.path().join("1").join("a.png").is_file());
        assert!(session.is_committed());

        assert!(matches!(session.dispatch(Command::Commit), Outcome::AlreadyCommitted));
        assert!(session.commit_once().is_none());
    }

    #[test]
    fn failed_commit_is_reported_and_not_retried() {
        let (tmp, mut session) = session_with(&["a.png"]);
        session.dispatch(Command::SetLabel('1'));
        fs::remove_file(tmp.path().join("a.png")).unwrap();

        assert!(matches!(session.dispatch(Command::Commit), Outcome::Committed(Err(_))));
        assert!(session.commit_once().is_none());
    }
}
