//! # Riddle answer-commitment hash
//!
//! A small, deterministic four-lane hash used to commit puzzle answers before
//! they are handed to the puzzle process. Admins store the commitment of the
//! correct answer; the process recomputes it from a player's plaintext and
//! compares the two strings.
//!
//! **Not a cryptographic hash.** It keeps answers out of request payloads and
//! logs and avoids accidental collisions between casual answers. It offers no
//! resistance to a motivated attacker.
//!
//! ## Construction
//!
//! - 4 lanes of 32 bits, seeded with the SHA-256 initialization words
//! - one absorption sweep per input unit, lane1 through lane4
//! - 64 mixing rounds
//! - output rendered as 8 lowercase hex digits per lane
//!
//! ## Example
//!
//! ```rust
//! use riddle_hash::{commit_answer, verify_answer, hash};
//!
//! // The empty answer still carries the salt
//! let commitment = commit_answer("").unwrap();
//! assert_eq!(commitment, "173016a60ee677e3cad1fe2b76878292");
//!
//! assert!(verify_answer("", &commitment).unwrap());
//! assert!(!verify_answer("cat", &commitment).unwrap());
//!
//! // Raw digests for arbitrary bytes
//! let digest = hash(b"abc");
//! assert_eq!(digest.to_hex().len(), 32);
//! assert_eq!(digest.to_wide_hex().len(), 64);
//! ```
//!
//! ## no_std Support
//!
//! The crate builds without `std` (it needs `alloc`):
//!
//! ```toml
//! [dependencies]
//! riddle-hash = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod commit;
mod error;
mod lanehash;
mod params;
pub mod primitives;

pub use commit::{
    CodeUnits, Committer, commit_answer, commit_batch, commit_bytes, verify_answer,
};
pub use error::CommitError;
pub use lanehash::{Digest, LaneHasher, Mixing, hash, hash_with};
pub use params::*;

#[cfg(test)]
mod tests;
