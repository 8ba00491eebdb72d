use riddle_hash::{Committer, hash};
use serde_json::json;
use wasm_bindgen::prelude::*;

/// Same ASCII-only policy as the native client, so a non-ASCII answer is
/// refused here instead of producing a digest other verifiers disagree with
fn browser_committer() -> Committer {
    Committer::new()
}

/// Commitment of an answer, identical to what the puzzle process stores
#[wasm_bindgen]
pub fn commit_answer(answer: &str) -> Result<String, JsError> {
    browser_committer()
        .commit(answer)
        .map_err(|e| JsError::new(&e.to_string()))
}

/// Check an answer against a stored commitment
#[wasm_bindgen]
pub fn verify_answer(answer: &str, expected: &str) -> Result<bool, JsError> {
    browser_committer()
        .verify(answer, expected)
        .map_err(|e| JsError::new(&e.to_string()))
}

/// Unsalted digest of raw bytes, as 32 hex characters
#[wasm_bindgen]
pub fn hash_hex(input: &[u8]) -> String {
    hash(input).to_hex()
}

#[wasm_bindgen]
pub struct Benchmark {
    committer: Committer,
}

impl Default for Benchmark {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl Benchmark {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            committer: browser_committer(),
        }
    }

    /// Run benchmark with specified number of commitments
    /// Returns commitments per second
    #[wasm_bindgen]
    pub fn run(&self, count: u32) -> Result<f64, JsError> {
        let performance = web_sys::window()
            .and_then(|w| w.performance())
            .ok_or_else(|| JsError::new("performance timer unavailable"))?;

        let start = performance.now();

        for i in 0..count {
            let answer = format!("benchmark answer {}", i);
            self.committer
                .commit(&answer)
                .map_err(|e| JsError::new(&e.to_string()))?;
        }

        let elapsed_s = (performance.now() - start) / 1000.0;
        Ok(count as f64 / elapsed_s)
    }

    /// Get algorithm parameters as JSON string
    #[wasm_bindgen]
    pub fn get_params(&self) -> String {
        json!({
            "lanes": riddle_hash::LANES,
            "mix_rounds": riddle_hash::MIX_ROUNDS,
            "hex_len": riddle_hash::HEX_LEN,
            "salt": self.committer.salt(),
        })
        .to_string()
    }
}
