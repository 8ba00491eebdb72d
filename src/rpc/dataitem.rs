//! ANS-104 data items
//!
//! Messages sent to an AO process are signed data items. The signature covers
//! a SHA-384 "deep hash" of the item's fields rather than its raw bytes.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha384};

use crate::rpc::AoError;
use crate::wallet::{SignatureType, Signer};

/// Maximum number of tags on a data item
pub const MAX_TAGS: usize = 128;

/// Maximum tag name length in bytes
pub const MAX_TAG_NAME_LEN: usize = 1024;

/// Maximum tag value length in bytes
pub const MAX_TAG_VALUE_LEN: usize = 3072;

/// Length of targets and anchors in bytes
pub const ADDRESS_LEN: usize = 32;

/// A name/value tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub value: String,
}

impl Tag {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A signed data item
#[derive(Debug, Clone)]
pub struct DataItem {
    signature_type: SignatureType,
    signature: Vec<u8>,
    owner: Vec<u8>,
    target: Option<[u8; ADDRESS_LEN]>,
    anchor: Option<[u8; ADDRESS_LEN]>,
    tags: Vec<Tag>,
    raw_tags: Vec<u8>,
    data: Vec<u8>,
}

impl DataItem {
    /// Build and sign a data item
    pub fn sign(
        signer: &dyn Signer,
        target: Option<[u8; ADDRESS_LEN]>,
        anchor: Option<[u8; ADDRESS_LEN]>,
        tags: Vec<Tag>,
        data: Vec<u8>,
    ) -> Result<Self, AoError> {
        validate_tags(&tags)?;

        let signature_type = signer.signature_type();
        let owner = signer.owner();
        if owner.len() != signature_type.owner_len() {
            return Err(AoError::DataItem(format!(
                "owner must be {} bytes, got {}",
                signature_type.owner_len(),
                owner.len()
            )));
        }

        let mut item = Self {
            signature_type,
            signature: Vec::new(),
            owner,
            target,
            anchor,
            raw_tags: encode_tags(&tags),
            tags,
            data,
        };

        let signature = signer.sign(&item.signature_message())?;
        if signature.len() != signature_type.signature_len() {
            return Err(AoError::DataItem(format!(
                "signature must be {} bytes, got {}",
                signature_type.signature_len(),
                signature.len()
            )));
        }
        item.signature = signature;

        Ok(item)
    }

    /// Message the signature is computed over
    pub fn signature_message(&self) -> [u8; 48] {
        let signature_type = self.signature_type.code().to_string();
        let target = self.target.as_ref().map(|t| t.as_slice()).unwrap_or(&[]);
        let anchor = self.anchor.as_ref().map(|a| a.as_slice()).unwrap_or(&[]);

        deep_hash(&DeepHashChunk::List(vec![
            DeepHashChunk::Blob(b"dataitem"),
            DeepHashChunk::Blob(b"1"),
            DeepHashChunk::Blob(signature_type.as_bytes()),
            DeepHashChunk::Blob(&self.owner),
            DeepHashChunk::Blob(target),
            DeepHashChunk::Blob(anchor),
            DeepHashChunk::Blob(&self.raw_tags),
            DeepHashChunk::Blob(&self.data),
        ]))
    }

    /// Item id: base64url SHA-256 of the signature
    pub fn id(&self) -> String {
        URL_SAFE_NO_PAD.encode(Sha256::digest(&self.signature))
    }

    pub fn owner(&self) -> &[u8] {
        &self.owner
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Binary encoding as accepted by a messenger unit
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(
            2 + self.signature.len()
                + self.owner.len()
                + 2
                + 2 * ADDRESS_LEN
                + 16
                + self.raw_tags.len()
                + self.data.len(),
        );

        out.extend_from_slice(&self.signature_type.code().to_le_bytes());
        out.extend_from_slice(&self.signature);
        out.extend_from_slice(&self.owner);

        for field in [&self.target, &self.anchor] {
            match field {
                Some(bytes) => {
                    out.push(1);
                    out.extend_from_slice(bytes);
                }
                None => out.push(0),
            }
        }

        out.extend_from_slice(&(self.tags.len() as u64).to_le_bytes());
        out.extend_from_slice(&(self.raw_tags.len() as u64).to_le_bytes());
        out.extend_from_slice(&self.raw_tags);
        out.extend_from_slice(&self.data);
        out
    }
}

/// Decode a base64url process id or wallet address into a 32-byte target
pub fn decode_address(id: &str) -> Result<[u8; ADDRESS_LEN], AoError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(id)
        .map_err(|e| AoError::DataItem(format!("invalid id {}: {}", id, e)))?;

    bytes
        .try_into()
        .map_err(|bytes: Vec<u8>| {
            AoError::DataItem(format!(
                "id {} decodes to {} bytes, expected {}",
                id,
                bytes.len(),
                ADDRESS_LEN
            ))
        })
}

fn validate_tags(tags: &[Tag]) -> Result<(), AoError> {
    if tags.len() > MAX_TAGS {
        return Err(AoError::DataItem(format!(
            "{} tags exceed the limit of {}",
            tags.len(),
            MAX_TAGS
        )));
    }

    for tag in tags {
        if tag.name.is_empty() || tag.name.len() > MAX_TAG_NAME_LEN {
            return Err(AoError::DataItem(format!(
                "tag name {:?} must be 1..={} bytes",
                tag.name, MAX_TAG_NAME_LEN
            )));
        }
        if tag.value.is_empty() || tag.value.len() > MAX_TAG_VALUE_LEN {
            return Err(AoError::DataItem(format!(
                "value of tag {:?} must be 1..={} bytes",
                tag.name, MAX_TAG_VALUE_LEN
            )));
        }
    }

    Ok(())
}

/// Avro encoding of a tag array: one block, then the zero terminator
fn encode_tags(tags: &[Tag]) -> Vec<u8> {
    if tags.is_empty() {
        return Vec::new();
    }

    let mut out = Vec::new();
    write_long(&mut out, tags.len() as i64);
    for tag in tags {
        write_bytes(&mut out, tag.name.as_bytes());
        write_bytes(&mut out, tag.value.as_bytes());
    }
    write_long(&mut out, 0);
    out
}

fn write_long(out: &mut Vec<u8>, value: i64) {
    let mut zigzag = ((value << 1) ^ (value >> 63)) as u64;
    loop {
        let byte = (zigzag & 0x7f) as u8;
        zigzag >>= 7;
        if zigzag == 0 {
            out.push(byte);
            break;
        }
        out.push(byte | 0x80);
    }
}

fn write_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    write_long(out, bytes.len() as i64);
    out.extend_from_slice(bytes);
}

enum DeepHashChunk<'a> {
    Blob(&'a [u8]),
    List(Vec<DeepHashChunk<'a>>),
}

fn sha384(parts: &[&[u8]]) -> [u8; 48] {
    let mut hasher = Sha384::new();
    for part in parts {
        hasher.update(part);
    }
    let mut out = [0u8; 48];
    out.copy_from_slice(&hasher.finalize());
    out
}

fn deep_hash(chunk: &DeepHashChunk<'_>) -> [u8; 48] {
    match chunk {
        DeepHashChunk::Blob(data) => {
            let tag = format!("blob{}", data.len());
            let tag_hash = sha384(&[tag.as_bytes()]);
            let data_hash = sha384(&[*data]);
            sha384(&[tag_hash.as_slice(), data_hash.as_slice()])
        }
        DeepHashChunk::List(items) => {
            let tag = format!("list{}", items.len());
            items
                .iter()
                .fold(sha384(&[tag.as_bytes()]), |acc, item| {
                    sha384(&[acc.as_slice(), deep_hash(item).as_slice()])
                })
        }
    }
}
