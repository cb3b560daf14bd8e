use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::MinerError;

/// Bumped whenever the checkpoint layout changes.
pub const CHECKPOINT_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Loaded,
    Reviewing,
    Finished,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Loaded => "loaded",
            SessionState::Reviewing => "reviewing",
            SessionState::Finished => "finished",
        };
        f.write_str(name)
    }
}

/// A review shown to the operator. `index` is the row position in the input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub index: usize,
    pub text: String,
}

impl Item {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }
}

/// Cursor over a list of items with one optional judgment per item.
///
/// `Idle → Loaded → Reviewing → Finished`; [`previous`](Self::previous) moves a
/// finished session back to `Reviewing`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelingSession<J> {
    version: u32,
    pub input: PathBuf,
    pub output: PathBuf,
    state: SessionState,
    items: Vec<Item>,
    cursor: usize,
    judgments: Vec<Option<J>>,
}

impl<J> LabelingSession<J> {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            version: CHECKPOINT_VERSION,
            input: input.into(),
            output: output.into(),
            state: SessionState::Idle,
            items: Vec::new(),
            cursor: 0,
            judgments: Vec::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn load(&mut self, items: Vec<Item>) -> Result<()> {
        if self.state != SessionState::Idle {
            return Err(self.invalid("load"));
        }
        self.judgments = items.iter().map(|_| None).collect();
        self.items = items;
        self.cursor = 0;
        self.state = if self.items.is_empty() {
            SessionState::Finished
        } else {
            SessionState::Loaded
        };
        Ok(())
    }

    /// The item under the cursor; `None` before loading and once finished.
    pub fn current(&self) -> Option<&Item> {
        match self.state {
            SessionState::Loaded | SessionState::Reviewing => self.items.get(self.cursor),
            SessionState::Idle | SessionState::Finished => None,
        }
    }

    /// Record (or overwrite) the judgment for the current item and advance.
    pub fn commit(&mut self, judgment: J) -> Result<()> {
        if self.current().is_none() {
            return Err(self.invalid("commit to"));
        }
        self.judgments[self.cursor] = Some(judgment);
        self.cursor += 1;
        self.state = if self.cursor >= self.items.len() {
            SessionState::Finished
        } else {
            SessionState::Reviewing
        };
        Ok(())
    }

    /// Step back one item. Returns `false` when already at the first item.
    pub fn previous(&mut self) -> bool {
        if self.state == SessionState::Idle || self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.state = SessionState::Reviewing;
        true
    }

    pub fn is_done(&self) -> bool {
        self.state == SessionState::Finished
    }

    /// Stored judgment for the item at `position` (0-based, in review order).
    pub fn judgment_for(&self, position: usize) -> Option<&J> {
        self.judgments.get(position).and_then(Option::as_ref)
    }

    /// Stored judgment for the item under the cursor, used to pre-fill the prompt.
    pub fn current_judgment(&self) -> Option<&J> {
        self.current().and_then(|_| self.judgment_for(self.cursor))
    }

    /// `(position, total)`; position equals total once finished.
    pub fn progress(&self) -> (usize, usize) {
        (self.cursor, self.items.len())
    }

    /// Items that carry a judgment, in review order.
    pub fn judged(&self) -> impl Iterator<Item = (&Item, &J)> {
        self.items
            .iter()
            .zip(&self.judgments)
            .filter_map(|(item, judgment)| judgment.as_ref().map(|j| (item, j)))
    }

    fn invalid(&self, action: &'static str) -> anyhow::Error {
        MinerError::InvalidTransition {
            action,
            state: self.state.to_string(),
        }
        .into()
    }
}

impl<J: Serialize> LabelingSession<J> {
    pub fn to_checkpoint(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize labeling session")
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        std::fs::write(path, self.to_checkpoint()?)
            .with_context(|| format!("failed to write checkpoint {}", path.display()))
    }
}

impl<J: DeserializeOwned> LabelingSession<J> {
    pub fn from_checkpoint(json: &str) -> Result<Self> {
        let session: Self = serde_json::from_str(json)
            .map_err(|e| MinerError::Checkpoint(format!("unreadable checkpoint: {}", e)))?;

        if session.version != CHECKPOINT_VERSION {
            return Err(MinerError::Checkpoint(format!(
                "unsupported checkpoint version {} (expected {})",
                session.version, CHECKPOINT_VERSION
            ))
            .into());
        }
        if session.judgments.len() != session.items.len() || session.cursor > session.items.len()
        {
            return Err(MinerError::Checkpoint(format!(
                "inconsistent checkpoint: {} items, {} judgments, cursor {}",
                session.items.len(),
                session.judgments.len(),
                session.cursor
            ))
            .into());
        }
        Ok(session)
    }

    /// Resume a saved session.
    ///
    /// Returns `Ok(None)` when there is no checkpoint. A checkpoint that cannot be
    /// read, or whose input file no longer exists, is deleted and ignored.
    pub fn load_file(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read checkpoint {}", path.display()))?;

        match Self::from_checkpoint(&content) {
            Ok(session) if session.input.exists() => Ok(Some(session)),
            Ok(session) => {
                tracing::info!(
                    "discarding checkpoint {}: input {} no longer exists",
                    path.display(),
                    session.input.display()
                );
                discard(path)?;
                Ok(None)
            }
            Err(err) => {
                tracing::warn!("discarding checkpoint {}: {:#}", path.display(), err);
                discard(path)?;
                Ok(None)
            }
        }
    }
}

/// Remove a checkpoint file if present.
pub fn discard(path: &Path) -> Result<()> {
    if path.exists() {
        std::fs::remove_file(path)
            .with_context(|| format!("failed to remove checkpoint {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn items(n: usize) -> Vec<Item> {
        (0..n).map(|i| Item::new(i * 2, format!("review {}", i))).collect()
    }

    fn loaded(n: usize) -> LabelingSession<bool> {
        let mut session = LabelingSession::new("in.csv", "out.csv");
        session.load(items(n)).unwrap();
        session
    }

    #[test]
    fn test_state_transitions() {
        let mut session: LabelingSession<bool> = LabelingSession::new("in.csv", "out.csv");
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.current().is_none());
        assert!(session.commit(true).is_err());

        session.load(items(2)).unwrap();
        assert_eq!(session.state(), SessionState::Loaded);
        assert_eq!(session.current().unwrap().index, 0);

        session.commit(true).unwrap();
        assert_eq!(session.state(), SessionState::Reviewing);
        session.commit(false).unwrap();
        assert!(session.is_done());
        assert!(session.current().is_none());
        assert_eq!(session.progress(), (2, 2));
        assert!(session.load(items(1)).is_err());
    }

    #[test]
    fn test_empty_load_finishes_immediately() {
        let session = loaded(0);
        assert!(session.is_done());
        assert_eq!(session.progress(), (0, 0));
    }

    #[test]
    fn test_previous_at_first_item_is_noop() {
        let mut session = loaded(3);
        assert!(!session.previous());
        assert_eq!(session.progress(), (0, 3));
        assert_eq!(session.state(), SessionState::Loaded);
    }

    #[test]
    fn test_previous_reopens_finished_session_and_prefills() {
        let mut session = loaded(2);
        session.commit(true).unwrap();
        session.commit(false).unwrap();
        assert!(session.is_done());

        assert!(session.previous());
        assert_eq!(session.state(), SessionState::Reviewing);
        assert_eq!(session.current().unwrap().index, 2);
        assert_eq!(session.current_judgment(), Some(&false));

        session.commit(true).unwrap();
        assert!(session.is_done());
        let judged: Vec<bool> = session.judged().map(|(_, j)| *j).collect();
        assert_eq!(judged, vec![true, true]);
    }

    #[test]
    fn test_checkpoint_round_trip_resumes_same_item() {
        let mut session = loaded(4);
        session.commit(true).unwrap();
        session.commit(false).unwrap();

        let json = session.to_checkpoint().unwrap();
        let restored: LabelingSession<bool> = LabelingSession::from_checkpoint(&json).unwrap();
        assert_eq!(restored, session);
        assert_eq!(restored.current().unwrap().index, 4);
        assert_eq!(restored.judgment_for(0), Some(&true));
        assert_eq!(restored.judgment_for(1), Some(&false));
        assert_eq!(restored.judgment_for(2), None);
    }

    #[test]
    fn test_checkpoint_version_mismatch_rejected() {
        let json = loaded(1).to_checkpoint().unwrap().replace(
            &format!("\"version\": {}", CHECKPOINT_VERSION),
            "\"version\": 99",
        );
        let err = LabelingSession::<bool>::from_checkpoint(&json).unwrap_err();
        assert!(matches!(err.downcast_ref::<MinerError>(), Some(MinerError::Checkpoint(_))));
    }

    #[test]
    fn test_load_file_discards_checkpoint_of_missing_input() {
        let dir = tempdir().unwrap();
        let checkpoint = dir.path().join("session.json");
        let mut session = LabelingSession::<bool>::new(dir.path().join("gone.csv"), "out.csv");
        session.load(items(1)).unwrap();
        session.save(&checkpoint).unwrap();

        assert!(LabelingSession::<bool>::load_file(&checkpoint).unwrap().is_none());
        assert!(!checkpoint.exists());
    }

    #[test]
    fn test_load_file_resumes_existing_input() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("reviews.csv");
        std::fs::write(&input, "review\nfine\n").unwrap();
        let checkpoint = dir.path().join("nested").join("session.json");

        let mut session = LabelingSession::<bool>::new(&input, "out.csv");
        session.load(items(2)).unwrap();
        session.commit(true).unwrap();
        session.save(&checkpoint).unwrap();

        let restored = LabelingSession::<bool>::load_file(&checkpoint).unwrap().unwrap();
        assert_eq!(restored.progress(), (1, 2));
        assert!(LabelingSession::<bool>::load_file(&dir.path().join("none.json"))
            .unwrap()
            .is_none());
    }
}
