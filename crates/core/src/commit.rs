//! Answer commitments
//!
//! A commitment is the compact hex digest of `answer || salt`. Puzzle
//! creation stores one and the puzzle process recomputes it from a player's
//! plaintext, so both sides must turn the same text into the same code units.

use alloc::string::String;
use alloc::vec::Vec;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::CommitError;
use crate::lanehash::{Digest, LaneHasher, Mixing};
use crate::params::HASH_SALT;

/// How characters of the salted answer become hash units
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CodeUnits {
    /// ASCII only. Any other character is an [`CommitError::EncodingMismatch`]:
    /// browser and byte-oriented hashers disagree outside this range.
    #[default]
    Ascii,
    /// One unit per UTF-16 code unit, as the browser client hashes text
    Utf16,
    /// One unit per UTF-8 byte
    Utf8,
}

/// Commitment settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Committer {
    salt: String,
    code_units: CodeUnits,
    mixing: Mixing,
}

impl Committer {
    /// Shared salt, ASCII units, chained mixing
    pub fn new() -> Self {
        Self {
            salt: HASH_SALT.into(),
            code_units: CodeUnits::default(),
            mixing: Mixing::default(),
        }
    }

    pub fn with_salt(mut self, salt: impl Into<String>) -> Self {
        self.salt = salt.into();
        self
    }

    pub fn with_code_units(mut self, code_units: CodeUnits) -> Self {
        self.code_units = code_units;
        self
    }

    pub fn with_mixing(mut self, mixing: Mixing) -> Self {
        self.mixing = mixing;
        self
    }

    pub fn salt(&self) -> &str {
        &self.salt
    }

    pub fn code_units(&self) -> CodeUnits {
        self.code_units
    }

    pub fn mixing(&self) -> Mixing {
        self.mixing
    }

    /// Digest of `raw || salt`
    pub fn digest(&self, raw: &str) -> Result<Digest, CommitError> {
        let mut hasher = LaneHasher::with_mixing(self.mixing);
        self.absorb(&mut hasher, raw, 0)?;
        self.absorb(&mut hasher, &self.salt, raw.chars().count())?;
        Ok(hasher.finalize())
    }

    /// Compact hex commitment of `raw || salt`
    pub fn commit(&self, raw: &str) -> Result<String, CommitError> {
        self.digest(raw).map(|digest| digest.to_hex())
    }

    /// Commit raw bytes, which must be UTF-8 text
    pub fn commit_bytes(&self, raw: &[u8]) -> Result<String, CommitError> {
        let text = core::str::from_utf8(raw).map_err(|e| {
            CommitError::InvalidInput(alloc::format!(
                "answer is not UTF-8 text (valid up to byte {})",
                e.valid_up_to()
            ))
        })?;
        self.commit(text)
    }

    /// Check `raw` against a stored compact hex commitment
    pub fn verify(&self, raw: &str, expected: &str) -> Result<bool, CommitError> {
        let expected = Digest::from_hex(expected)?;
        Ok(self.digest(raw)? == expected)
    }

    /// Commit many answers; results keep the input order
    #[cfg(feature = "parallel")]
    pub fn commit_batch<S>(&self, answers: &[S]) -> Vec<Result<String, CommitError>>
    where
        S: AsRef<str> + Sync,
    {
        answers
            .par_iter()
            .map(|answer| self.commit(answer.as_ref()))
            .collect()
    }

    /// Commit many answers; results keep the input order
    #[cfg(not(feature = "parallel"))]
    pub fn commit_batch<S>(&self, answers: &[S]) -> Vec<Result<String, CommitError>>
    where
        S: AsRef<str>,
    {
        answers
            .iter()
            .map(|answer| self.commit(answer.as_ref()))
            .collect()
    }

    fn absorb(
        &self,
        hasher: &mut LaneHasher,
        text: &str,
        offset: usize,
    ) -> Result<(), CommitError> {
        match self.code_units {
            CodeUnits::Ascii => {
                if let Some((index, ch)) = text.chars().enumerate().find(|(_, ch)| !ch.is_ascii())
                {
                    return Err(CommitError::EncodingMismatch {
                        index: offset + index,
                        ch,
                    });
                }
                hasher.update(text.as_bytes());
            }
            CodeUnits::Utf16 => {
                for unit in text.encode_utf16() {
                    hasher.absorb_unit(u32::from(unit));
                }
            }
            CodeUnits::Utf8 => {
                hasher.update(text.as_bytes());
            }
        }
        Ok(())
    }
}

impl Default for Committer {
    fn default() -> Self {
        Self::new()
    }
}

/// Commit an answer with the shared salt and default settings
///
/// The answer is hashed exactly as given; trimming or case folding is up to
/// the caller.
///
/// # Example
///
/// ```rust
/// use riddle_hash::commit_answer;
///
/// let commitment = commit_answer("paris").unwrap();
/// assert_eq!(commitment, "a6f1adf840219a71c4e8f24bc87d003a");
/// ```
pub fn commit_answer(raw: &str) -> Result<String, CommitError> {
    Committer::default().commit(raw)
}

/// Commit raw bytes with the shared salt, rejecting anything that is not UTF-8
pub fn commit_bytes(raw: &[u8]) -> Result<String, CommitError> {
    Committer::default().commit_bytes(raw)
}

/// Check an answer against a stored commitment with default settings
pub fn verify_answer(raw: &str, expected: &str) -> Result<bool, CommitError> {
    Committer::default().verify(raw, expected)
}

/// Commit a batch of answers with default settings
#[cfg(feature = "parallel")]
pub fn commit_batch<S>(answers: &[S]) -> Vec<Result<String, CommitError>>
where
    S: AsRef<str> + Sync,
{
    Committer::default().commit_batch(answers)
}

/// Commit a batch of answers with default settings
#[cfg(not(feature = "parallel"))]
pub fn commit_batch<S>(answers: &[S]) -> Vec<Result<String, CommitError>>
where
    S: AsRef<str>,
{
    Committer::default().commit_batch(answers)
}
