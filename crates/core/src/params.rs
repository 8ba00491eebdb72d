//! Lane hash parameters
//!
//! These values are part of the commitment format. Changing any of them
//! invalidates every digest already stored by the puzzle process.

/// Number of 32-bit lanes in the hash state
pub const LANES: usize = 4;

/// Initial lane values, lane1 first
pub const INITIAL_LANES: [u32; LANES] = [0x6a09e667, 0xbb67ae85, 0x3c6ef372, 0xa54ff53a];

/// Per-lane left rotation applied while absorbing a unit
pub const ABSORB_ROTATE: [u32; LANES] = [13, 17, 19, 23];

/// Per-lane additive constant applied while absorbing a unit
pub const ABSORB_CONSTANT: [u32; LANES] = [0x5a827999, 0x6ed9eba1, 0x8f1bbcdc, 0xca62c1d6];

/// Per-lane right rotation applied to the successor lane while absorbing
pub const SUCCESSOR_SHIFT: [u32; LANES] = [7, 5, 11, 13];

/// Number of mixing rounds after absorption
pub const MIX_ROUNDS: usize = 64;

/// Size of a digest in bytes
pub const DIGEST_SIZE: usize = LANES * 4;

/// Length of the compact hex rendering (8 digits per lane)
pub const HEX_LEN: usize = DIGEST_SIZE * 2;

/// Length of the wide hex rendering (16 digits per lane)
pub const WIDE_HEX_LEN: usize = LANES * 16;

/// Salt appended to every answer before hashing
///
/// Shared with the puzzle process; commit-time and verify-time must agree.
pub const HASH_SALT: &str = "saltyDumDumz";
