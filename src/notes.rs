//! Per-puzzle scratch notes kept on local disk

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

const FILE_PREFIX: &str = "puzzle_notes_";
const FILE_SUFFIX: &str = ".txt";

#[derive(Error, Debug)]
pub enum NotesError {
    #[error("Invalid puzzle id {0:?}")]
    InvalidId(String),

    #[error("Notes I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A directory of notes, one file per puzzle
#[derive(Debug, Clone)]
pub struct NoteBook {
    dir: PathBuf,
}

impl NoteBook {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, puzzle_id: &str) -> Result<PathBuf, NotesError> {
        let valid = !puzzle_id.is_empty()
            && puzzle_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(NotesError::InvalidId(puzzle_id.to_string()));
        }
        Ok(self
            .dir
            .join(format!("{}{}{}", FILE_PREFIX, puzzle_id, FILE_SUFFIX)))
    }

    /// Notes for a puzzle; empty if none were saved
    pub fn load(&self, puzzle_id: &str) -> Result<String, NotesError> {
        match fs::read_to_string(self.path_for(puzzle_id)?) {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Replace a puzzle's notes; saving empty text deletes them
    pub fn save(&self, puzzle_id: &str, text: &str) -> Result<(), NotesError> {
        if text.is_empty() {
            return self.clear(puzzle_id);
        }

        let path = self.path_for(puzzle_id)?;
        fs::create_dir_all(&self.dir)?;
        fs::write(&path, text)?;
        debug!(puzzle_id, path = %path.display(), "Saved notes");
        Ok(())
    }

    /// Add a line to a puzzle's notes
    pub fn append(&self, puzzle_id: &str, line: &str) -> Result<(), NotesError> {
        let mut text = self.load(puzzle_id)?;
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        text.push_str(line);
        text.push('\n');
        self.save(puzzle_id, &text)
    }

    pub fn clear(&self, puzzle_id: &str) -> Result<(), NotesError> {
        match fs::remove_file(self.path_for(puzzle_id)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Ids of puzzles that have notes, sorted
    pub fn puzzles(&self) -> Result<Vec<String>, NotesError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        for entry in entries {
            let name = entry?.file_name();
            if let Some(id) = name
                .to_str()
                .and_then(|n| n.strip_prefix(FILE_PREFIX))
                .and_then(|n| n.strip_suffix(FILE_SUFFIX))
            {
                ids.push(id.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }
}
