//! Tests for the lane hash and answer commitments

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use crate::{
    CodeUnits, CommitError, Committer, Digest, HASH_SALT, HEX_LEN, LaneHasher, Mixing,
    WIDE_HEX_LEN, commit_answer, commit_batch, commit_bytes, hash, hash_with, verify_answer,
};

fn is_lower_hex(s: &str) -> bool {
    s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

#[test]
fn test_golden_vector_empty_answer() {
    // Captured from the deployed browser client: secureHash("") with the
    // shared salt. Every stored commitment depends on this staying fixed.
    assert_eq!(
        commit_answer("").unwrap(),
        "173016a60ee677e3cad1fe2b76878292"
    );
}

#[test]
fn test_reference_vectors() {
    let vectors = [
        ("cat", "72b6a2e319eb6e72be86b2f72ba9beb5"),
        ("bat", "d0f174d954aae876d9812dd2090137a7"),
        ("Cat", "6e8c53a45087194a9ad2d1388a6c4486"),
        ("paris", "a6f1adf840219a71c4e8f24bc87d003a"),
        ("Paris", "5deb72d6b558f59f5ede25f7da359921"),
        ("red,blue,green", "3aaa84e08116547c747a7f210516f749"),
    ];

    for (answer, expected) in vectors {
        assert_eq!(commit_answer(answer).unwrap(), expected, "answer {:?}", answer);
    }
}

#[test]
fn test_unsalted_vectors() {
    assert_eq!(hash(b"").to_hex(), "1c9dd94bfaee14ff5c7d45cf3022c6e3");
    assert_eq!(hash(b"a").to_hex(), "7c6e2d7593955417e942f4458df994ba");
    assert_eq!(hash(b"abc").to_hex(), "892e6a61e29e147a8b2474100fc62b94");
    assert_eq!(hash(&[0xff, 0x00]).to_hex(), "8bcbca772e889df1a672f100e4b49622");
}

#[test]
fn test_snapshot_mixing_vectors() {
    assert_eq!(
        hash_with(b"", Mixing::Snapshot).to_hex(),
        "4b536b70590956b2ce19b5d2eb48d266"
    );

    let committer = Committer::new().with_mixing(Mixing::Snapshot);
    assert_eq!(
        committer.commit("").unwrap(),
        "6bfd8867f0bb9d0e837432827442949e"
    );
    assert_eq!(
        committer.commit("cat").unwrap(),
        "71833541ad82e842f10c63271d548068"
    );
}

#[test]
fn test_mixing_schedules_differ() {
    assert_ne!(hash_with(b"abc", Mixing::Chained), hash_with(b"abc", Mixing::Snapshot));
}

#[test]
fn test_absorb_single_unit_lanes() {
    // One sweep over 'a' from the initial lanes, before any mixing. Lane4
    // must fold in lane1's freshly written value.
    let mut hasher = LaneHasher::new();
    hasher.absorb_unit(u32::from(b'a'));

    assert_eq!(
        hasher.lanes(),
        [0xa2ba1637, 0x5e86da0b, 0xcf0a4a51, 0x29f27fa0]
    );
}

#[test]
fn test_streaming_matches_single_shot() {
    let mut hasher = LaneHasher::new();
    hasher.update(b"red,").update(b"blue,").update(b"green");
    hasher.update(HASH_SALT.as_bytes());

    assert_eq!(hasher.finalize().to_hex(), commit_answer("red,blue,green").unwrap());
}

#[test]
fn test_commit_is_hash_of_salted_input() {
    for answer in ["", "cat", "forty two", "a,b,c"] {
        let mut salted = String::from(answer);
        salted.push_str(HASH_SALT);
        assert_eq!(commit_answer(answer).unwrap(), hash(salted.as_bytes()).to_hex());
    }
}

#[test]
fn test_determinism() {
    let first = commit_answer("the answer is 42").unwrap();
    for _ in 0..5 {
        assert_eq!(commit_answer("the answer is 42").unwrap(), first);
    }
}

#[test]
fn test_format_invariant() {
    let long = "x".repeat(10_000);
    let inputs: [&str; 5] = ["", "a", "cat", "with spaces and, commas", &long];

    for input in inputs {
        let digest = Committer::new().digest(input).unwrap();

        let compact = digest.to_hex();
        assert_eq!(compact.len(), HEX_LEN);
        assert!(is_lower_hex(&compact));

        let wide = digest.to_wide_hex();
        assert_eq!(wide.len(), WIDE_HEX_LEN);
        assert!(is_lower_hex(&wide));
    }
}

#[test]
fn test_wide_hex_pads_each_lane() {
    let digest = Digest::from_lanes([0x1, 0xdeadbeef, 0, 0xffffffff]);
    assert_eq!(
        digest.to_wide_hex(),
        "0000000000000001\
         00000000deadbeef\
         0000000000000000\
         00000000ffffffff"
    );
    assert_eq!(digest.to_hex(), "00000001deadbeef00000000ffffffff");
}

#[test]
fn test_display_matches_hex() {
    let digest = hash(b"display");
    assert_eq!(alloc::format!("{}", digest), digest.to_hex());
}

#[test]
fn test_avalanche_single_character() {
    assert_ne!(commit_answer("cat").unwrap(), commit_answer("bat").unwrap());

    // Count differing bits between the two digests
    let a = Committer::new().digest("cat").unwrap().to_bytes();
    let b = Committer::new().digest("bat").unwrap().to_bytes();
    let diff_bits: u32 = a.iter().zip(b.iter()).map(|(x, y)| (x ^ y).count_ones()).sum();
    assert!(diff_bits > 16, "only {} bits differ", diff_bits);
}

#[test]
fn test_salt_sensitivity() {
    let salted_a = Committer::new().with_salt("A").commit("cat").unwrap();
    let salted_b = Committer::new().with_salt("B").commit("cat").unwrap();

    assert_eq!(salted_a, "5fb74cb4ad2a002d4e1e9530d7387dcc");
    assert_eq!(salted_b, "aa308b40141c8eeb334c40a008b4294b");
    assert_ne!(salted_a, salted_b);
}

#[test]
fn test_case_is_preserved() {
    assert_ne!(commit_answer("Cat").unwrap(), commit_answer("cat").unwrap());
}

#[test]
fn test_verify_answer() {
    let stored = commit_answer("paris").unwrap();

    assert!(verify_answer("paris", &stored).unwrap());
    assert!(!verify_answer("Paris", &stored).unwrap());
    assert!(!verify_answer("london", &stored).unwrap());
}

#[test]
fn test_verify_rejects_malformed_digest() {
    assert!(matches!(
        verify_answer("paris", "a6f1ad"),
        Err(CommitError::InvalidInput(_))
    ));
    assert!(matches!(
        verify_answer("paris", "A6F1ADF840219A71C4E8F24BC87D003A"),
        Err(CommitError::InvalidInput(_))
    ));
    assert!(matches!(
        verify_answer("paris", "g6f1adf840219a71c4e8f24bc87d003a"),
        Err(CommitError::InvalidInput(_))
    ));
}

#[test]
fn test_digest_hex_roundtrip() {
    let digest = hash(b"roundtrip");
    assert_eq!(Digest::from_hex(&digest.to_hex()).unwrap(), digest);
    assert_eq!(Digest::from_bytes(digest.to_bytes()), digest);
}

#[test]
fn test_commit_bytes_rejects_non_utf8() {
    let err = commit_bytes(&[b'c', b'a', 0xff]).unwrap_err();
    assert!(matches!(err, CommitError::InvalidInput(_)));

    assert_eq!(commit_bytes(b"cat").unwrap(), commit_answer("cat").unwrap());
}

#[test]
fn test_ascii_policy_rejects_non_ascii() {
    let err = commit_answer("café").unwrap_err();
    assert_eq!(err, CommitError::EncodingMismatch { index: 3, ch: 'é' });
}

#[test]
fn test_ascii_policy_checks_salt() {
    let err = Committer::new().with_salt("sel-é").commit("ab").unwrap_err();
    assert_eq!(err, CommitError::EncodingMismatch { index: 6, ch: 'é' });
}

#[test]
fn test_utf16_matches_browser_client() {
    let committer = Committer::new().with_code_units(CodeUnits::Utf16);

    assert_eq!(
        committer.commit("café").unwrap(),
        "32093ebdcd10a7f6b14e01ec071f3813"
    );
    assert_eq!(
        committer.commit("日本").unwrap(),
        "63befe7223744853a9e3103d3b0d5f96"
    );
    // Surrogate pairs contribute both halves
    assert_eq!(
        committer.commit("🦀").unwrap(),
        "429668cc2624a9c0443cfe9acea6033c"
    );
    // ASCII input is identical under every policy
    assert_eq!(committer.commit("cat").unwrap(), commit_answer("cat").unwrap());
}

#[test]
fn test_utf8_policy_hashes_bytes() {
    let committer = Committer::new().with_code_units(CodeUnits::Utf8);

    assert_eq!(
        committer.commit("café").unwrap(),
        "6b0379139ebd81a94fc9a6a0ea024a1c"
    );
    assert_eq!(committer.commit("cat").unwrap(), commit_answer("cat").unwrap());
}

#[test]
fn test_commit_batch_keeps_order() {
    let answers = vec!["cat", "bat", "café", ""];
    let results = commit_batch(&answers);

    assert_eq!(results.len(), 4);
    assert_eq!(results[0].as_deref(), Ok("72b6a2e319eb6e72be86b2f72ba9beb5"));
    assert_eq!(results[1].as_deref(), Ok("d0f174d954aae876d9812dd2090137a7"));
    assert!(matches!(results[2], Err(CommitError::EncodingMismatch { .. })));
    assert_eq!(results[3].as_deref(), Ok("173016a60ee677e3cad1fe2b76878292"));
}

#[test]
fn test_large_input() {
    let large: Vec<u8> = vec![0xAB; 100_000];
    let digest = hash(&large);
    assert_eq!(hash(&large), digest);
    assert_ne!(digest, hash(&large[1..]));
}
