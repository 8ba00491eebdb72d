//! Riddle Client Library
//!
//! Client for a puzzle game hosted by an AO process.
//!
//! # Overview
//!
//! Admins post puzzles whose answers are committed with a salted lane hash;
//! players submit answers and the process compares commitments. Reads are dry
//! runs, writes are signed ANS-104 messages.
//!
//! # Example
//!
//! ```rust
//! use riddle::commitment::commit_answer;
//! use riddle::puzzle::AnswerSheet;
//!
//! let answers = AnswerSheet::new(["red", "blue", "green"]);
//! let hashed = commit_answer(&answers.combined()).unwrap();
//! assert_eq!(hashed, "3aaa84e08116547c747a7f210516f749");
//! ```

// Re-export the commitment hash
pub use riddle_hash as commitment;

pub mod notes;
pub mod profile;
pub mod puzzle;
pub mod rpc;
pub mod wallet;

// Convenience re-exports
pub use commitment::{commit_answer, verify_answer, Committer};
