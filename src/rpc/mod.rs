//! AO client for puzzle process interaction
//!
//! Handles signed message submission to the messenger unit (MU), and result
//! retrieval and dry runs against the compute unit (CU).

pub mod dataitem;
#[cfg(test)]
pub(crate) mod mock;

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::wallet::{Signer, WalletError};
pub use dataitem::{decode_address, DataItem, Tag};

/// Default messenger unit
pub const DEFAULT_MU: &str = "https://mu.ao-testnet.xyz";

/// Default compute unit
pub const DEFAULT_CU: &str = "https://cu.ao-testnet.xyz";

/// Default Arweave gateway
pub const DEFAULT_GATEWAY: &str = "https://arweave.net";

/// Puzzle process on AO testnet
pub const PUZZLE_PROCESS: &str = "ytMAMNW_48T7rJiaGOV5F102YrUNWYYmQoVljJBXoKg";

/// Bazar profile registry process
pub const BAZAR_PROCESS: &str = "SNy4m-DrqxWl01YqGM4sxI8qCni-58re8uuJLvZPypY";

/// Value of the `SDK` tag on every message
pub const SDK_NAME: &str = "riddle";

/// Owner and id placeholder used for unsigned dry runs
const DRYRUN_PLACEHOLDER: &str = "1234";

#[derive(Error, Debug)]
pub enum AoError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid data item: {0}")]
    DataItem(String),

    #[error(transparent)]
    Signing(#[from] WalletError),
}

/// AO client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AoConfig {
    /// Messenger unit URL
    pub mu_url: String,
    /// Compute unit URL
    pub cu_url: String,
    /// Arweave gateway URL
    pub gateway_url: String,
    /// Puzzle process id
    pub process_id: String,
    /// Bazar profile registry process id
    pub bazar_process_id: String,
    /// HTTP timeout in seconds
    pub timeout_secs: u64,
}

impl Default for AoConfig {
    fn default() -> Self {
        Self {
            mu_url: DEFAULT_MU.to_string(),
            cu_url: DEFAULT_CU.to_string(),
            gateway_url: DEFAULT_GATEWAY.to_string(),
            process_id: PUZZLE_PROCESS.to_string(),
            bazar_process_id: BAZAR_PROCESS.to_string(),
            timeout_secs: 30,
        }
    }
}

impl AoConfig {
    /// Resolve a gateway-relative path such as a banner image
    pub fn gateway_link(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!(
            "{}/{}",
            self.gateway_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// A message emitted by a process evaluation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OutboxMessage {
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub anchor: Option<String>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub data: Value,
}

impl OutboxMessage {
    /// Message data as text, if present and non-empty
    pub fn data_text(&self) -> Option<String> {
        match &self.data {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Value of the first tag with the given name
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.value.as_str())
    }
}

/// Outcome of evaluating a message or dry run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProcessResult {
    #[serde(default)]
    pub messages: Vec<OutboxMessage>,
    #[serde(default)]
    pub spawns: Vec<Value>,
    #[serde(default)]
    pub output: Value,
    #[serde(default)]
    pub error: Value,
}

impl ProcessResult {
    /// Error reported by the process, if any
    pub fn error_message(&self) -> Option<String> {
        match &self.error {
            Value::Null | Value::Bool(false) => None,
            Value::String(s) if s.trim().is_empty() => None,
            Value::String(s) => Some(s.clone()),
            Value::Object(map) if map.is_empty() => None,
            other => Some(other.to_string()),
        }
    }

    /// Data of the first outbox message
    pub fn first_data(&self) -> Option<String> {
        self.messages.first().and_then(OutboxMessage::data_text)
    }
}

/// Tags attached to every message and dry run, followed by `Action`
pub fn protocol_tags(action: &str, extra: &[Tag]) -> Vec<Tag> {
    let mut tags = vec![
        Tag::new("Data-Protocol", "ao"),
        Tag::new("Variant", "ao.TN.1"),
        Tag::new("Type", "Message"),
        Tag::new("SDK", SDK_NAME),
        Tag::new("Action", action),
    ];
    tags.extend_from_slice(extra);
    tags
}

/// JSON body of a dry-run request
pub fn dryrun_body(process: &str, owner: Option<&str>, tags: &[Tag], data: &str) -> Value {
    serde_json::json!({
        "Id": DRYRUN_PLACEHOLDER,
        "Target": process,
        "Owner": owner.unwrap_or(DRYRUN_PLACEHOLDER),
        "Anchor": "0",
        "Data": data,
        "Tags": tags,
    })
}

/// Calls the puzzle and profile operations are built on
///
/// [`AoClient`] implements this over HTTP.
pub trait AoTransport: Send + Sync {
    /// Sign and submit a message; returns the message id
    fn message(
        &self,
        process: &str,
        tags: Vec<Tag>,
        data: String,
        signer: &dyn Signer,
    ) -> impl Future<Output = Result<String, AoError>> + Send;

    /// Fetch the evaluation result of a submitted message
    fn result(
        &self,
        process: &str,
        message_id: &str,
    ) -> impl Future<Output = Result<ProcessResult, AoError>> + Send;

    /// Evaluate a message without committing it
    fn dryrun(
        &self,
        process: &str,
        tags: Vec<Tag>,
        data: String,
    ) -> impl Future<Output = Result<ProcessResult, AoError>> + Send;
}

/// HTTP client for AO units
pub struct AoClient {
    config: AoConfig,
    http_client: reqwest::Client,
}

impl AoClient {
    /// Create a client with default configuration
    pub fn new() -> Result<Self, AoError> {
        Self::with_config(AoConfig::default())
    }

    /// Create a client with custom configuration
    pub fn with_config(config: AoConfig) -> Result<Self, AoError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Get the current configuration
    pub fn config(&self) -> &AoConfig {
        &self.config
    }

    async fn read_json<T: for<'de> Deserialize<'de>>(
        url: &str,
        resp: reqwest::Response,
    ) -> Result<T, AoError> {
        let status = resp.status();
        let body = resp.text().await?;
        debug!(url, status = status.as_u16(), body = %body, "AO response");

        if !status.is_success() {
            return Err(AoError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

impl AoTransport for AoClient {
    async fn message(
        &self,
        process: &str,
        tags: Vec<Tag>,
        data: String,
        signer: &dyn Signer,
    ) -> Result<String, AoError> {
        let target = decode_address(process)?;

        let mut anchor = [0u8; dataitem::ADDRESS_LEN];
        getrandom::getrandom(&mut anchor)
            .map_err(|e| AoError::DataItem(format!("anchor generation failed: {}", e)))?;

        let item = DataItem::sign(signer, Some(target), Some(anchor), tags, data.into_bytes())?;
        let id = item.id();
        debug!(id = %id, process, from = %signer.address(), "Submitting message");

        let url = format!("{}/", self.config.mu_url.trim_end_matches('/'));
        let resp = self
            .http_client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .header(reqwest::header::ACCEPT, "application/json")
            .body(item.to_bytes())
            .send()
            .await?;

        let _: Value = Self::read_json(&url, resp).await?;
        Ok(id)
    }

    async fn result(&self, process: &str, message_id: &str) -> Result<ProcessResult, AoError> {
        let url = format!(
            "{}/result/{}?process-id={}",
            self.config.cu_url.trim_end_matches('/'),
            message_id,
            process
        );

        let resp = self.http_client.get(&url).send().await?;
        Self::read_json(&url, resp).await
    }

    async fn dryrun(
        &self,
        process: &str,
        tags: Vec<Tag>,
        data: String,
    ) -> Result<ProcessResult, AoError> {
        let url = format!(
            "{}/dry-run?process-id={}",
            self.config.cu_url.trim_end_matches('/'),
            process
        );
        let body = dryrun_body(process, None, &tags, &data);
        debug!(process, body = %body, "Dry run");

        let resp = self.http_client.post(&url).json(&body).send().await?;
        Self::read_json(&url, resp).await
    }
}
