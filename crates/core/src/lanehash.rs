//! Four-lane absorbing hash
//!
//! Input units are absorbed into four 32-bit lanes one at a time, lane1
//! through lane4 in order. Each lane folds in the current value of its cyclic
//! successor, so lane1 sees lane2 from the previous unit while lane4 sees
//! lane1 from this unit. After absorption a fixed number of mixing rounds
//! spreads every lane into every other one.

use alloc::string::String;
use core::fmt;

use crate::error::CommitError;
use crate::params::*;
use crate::primitives::{add_mod32, rotate_left32, rotate_right32, xor32};

/// Read schedule for the mixing rounds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Mixing {
    /// Each lane update reads lanes already rewritten earlier in the same
    /// round. This is the schedule every stored commitment was made with.
    #[default]
    Chained,
    /// Every lane update reads the values from before the round started.
    Snapshot,
}

/// Output of the lane hash: the four final lanes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest([u32; LANES]);

impl Digest {
    /// Build a digest from raw lanes, lane1 first
    pub const fn from_lanes(lanes: [u32; LANES]) -> Self {
        Self(lanes)
    }

    /// The four lanes, lane1 first
    pub const fn lanes(&self) -> [u32; LANES] {
        self.0
    }

    /// Big-endian bytes of each lane, concatenated
    pub fn to_bytes(&self) -> [u8; DIGEST_SIZE] {
        let mut out = [0u8; DIGEST_SIZE];
        for (chunk, lane) in out.chunks_exact_mut(4).zip(self.0.iter()) {
            chunk.copy_from_slice(&lane.to_be_bytes());
        }
        out
    }

    /// Inverse of [`Digest::to_bytes`]
    pub fn from_bytes(bytes: [u8; DIGEST_SIZE]) -> Self {
        let mut lanes = [0u32; LANES];
        for (lane, chunk) in lanes.iter_mut().zip(bytes.chunks_exact(4)) {
            *lane = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Self(lanes)
    }

    /// Compact lowercase hex: 8 zero-padded digits per lane
    ///
    /// This is the form stored by the puzzle process and compared by string
    /// equality, so it is the commitment format.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Wide lowercase hex: 16 zero-padded digits per lane, 64 characters
    pub fn to_wide_hex(&self) -> String {
        use core::fmt::Write;

        let mut out = String::with_capacity(WIDE_HEX_LEN);
        for lane in self.0 {
            // Writing into a String cannot fail
            let _ = write!(out, "{:016x}", lane);
        }
        out
    }

    /// Parse the compact form produced by [`Digest::to_hex`]
    ///
    /// Only lowercase digits are accepted, matching the string comparison the
    /// puzzle process performs.
    pub fn from_hex(s: &str) -> Result<Self, CommitError> {
        if s.len() != HEX_LEN {
            return Err(CommitError::InvalidInput(alloc::format!(
                "digest must be {} hex characters, got {}",
                HEX_LEN,
                s.len()
            )));
        }
        if !s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return Err(CommitError::InvalidInput(
                "digest must be lowercase hexadecimal".into(),
            ));
        }

        let mut bytes = [0u8; DIGEST_SIZE];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|e| CommitError::InvalidInput(alloc::format!("{}", e)))?;
        Ok(Self::from_bytes(bytes))
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for lane in self.0 {
            write!(f, "{:08x}", lane)?;
        }
        Ok(())
    }
}

/// Streaming lane hasher
///
/// Owns its state for a single computation; [`LaneHasher::finalize`]
/// consumes it.
#[derive(Debug, Clone)]
pub struct LaneHasher {
    lanes: [u32; LANES],
    mixing: Mixing,
}

impl LaneHasher {
    /// Create a hasher with the default (chained) mixing schedule
    pub fn new() -> Self {
        Self::with_mixing(Mixing::default())
    }

    /// Create a hasher with an explicit mixing schedule
    pub fn with_mixing(mixing: Mixing) -> Self {
        Self {
            lanes: INITIAL_LANES,
            mixing,
        }
    }

    /// Absorb a byte slice, one unit per byte
    pub fn update(&mut self, bytes: &[u8]) -> &mut Self {
        for &byte in bytes {
            self.absorb_unit(u32::from(byte));
        }
        self
    }

    /// Absorb a single unit
    ///
    /// Units are normally bytes; UTF-16 code units (up to `0xffff`) are
    /// absorbed the same way.
    #[inline(always)]
    pub fn absorb_unit(&mut self, unit: u32) {
        for lane in 0..LANES {
            // Successor is read at this point in the sweep: lane1..3 see the
            // previous value, lane4 sees lane1 already updated.
            let successor = self.lanes[(lane + 1) % LANES];

            let mut value = xor32(self.lanes[lane], unit);
            value = add_mod32(
                rotate_left32(value, ABSORB_ROTATE[lane]),
                ABSORB_CONSTANT[lane],
            );
            self.lanes[lane] = add_mod32(value, rotate_right32(successor, SUCCESSOR_SHIFT[lane]));
        }
    }

    #[cfg(test)]
    pub(crate) fn lanes(&self) -> [u32; LANES] {
        self.lanes
    }

    /// Run the mixing rounds and return the digest
    pub fn finalize(self) -> Digest {
        let lanes = match self.mixing {
            Mixing::Chained => mix_chained(self.lanes),
            Mixing::Snapshot => mix_snapshot(self.lanes),
        };
        Digest(lanes)
    }
}

impl Default for LaneHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[inline(always)]
fn mix_chained(lanes: [u32; LANES]) -> [u32; LANES] {
    let [mut h1, mut h2, mut h3, mut h4] = lanes;

    for _ in 0..MIX_ROUNDS {
        h1 = add_mod32(xor32(h1, h2), rotate_left32(h3, 7));
        h2 = add_mod32(xor32(h2, h3), rotate_right32(h4, 11));
        h3 = add_mod32(xor32(h3, h4), rotate_left32(h1, 5));
        h4 = add_mod32(xor32(h4, h1), rotate_right32(h2, 19));
    }

    [h1, h2, h3, h4]
}

#[inline(always)]
fn mix_snapshot(lanes: [u32; LANES]) -> [u32; LANES] {
    let mut state = lanes;

    for _ in 0..MIX_ROUNDS {
        let [h1, h2, h3, h4] = state;
        state = [
            add_mod32(xor32(h1, h2), rotate_left32(h3, 7)),
            add_mod32(xor32(h2, h3), rotate_right32(h4, 11)),
            add_mod32(xor32(h3, h4), rotate_left32(h1, 5)),
            add_mod32(xor32(h4, h1), rotate_right32(h2, 19)),
        ];
    }

    state
}

/// Single-shot hash of a byte slice with the default mixing schedule
pub fn hash(input: &[u8]) -> Digest {
    hash_with(input, Mixing::default())
}

/// Single-shot hash of a byte slice with an explicit mixing schedule
pub fn hash_with(input: &[u8], mixing: Mixing) -> Digest {
    let mut hasher = LaneHasher::with_mixing(mixing);
    hasher.update(input);
    hasher.finalize()
}
