//! Bazar profile lookup and caching
//!
//! A wallet address maps to a profile process through the Bazar registry. The
//! lookup costs two dry runs, so resolved profiles are cached for an hour in
//! a [`ProfileCache`] backed by a pluggable [`ProfileStore`].

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::rpc::{protocol_tags, AoError, AoTransport, ProcessResult};

/// How long a cached profile stays valid
pub const CACHE_TTL: Duration = Duration::from_secs(60 * 60);

/// Retries after the first lookup attempt
pub const MAX_RETRIES: u32 = 3;

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Profile store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Profile store is corrupt: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Ao(#[from] AoError),
}

/// Public profile of a wallet on Bazar
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BazarProfile {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub date_updated: Option<u64>,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub date_created: Option<u64>,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<String>,
}

/// A cache entry; `timestamp` is in milliseconds since the Unix epoch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedProfile {
    pub profile: BazarProfile,
    pub timestamp: u64,
}

pub type CacheEntries = HashMap<String, CachedProfile>;

/// Persistence for [`ProfileCache`]
pub trait ProfileStore {
    fn load(&self) -> Result<CacheEntries, ProfileError>;
    fn save(&self, entries: &CacheEntries) -> Result<(), ProfileError>;
}

/// Store that keeps entries for the life of the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<CacheEntries>,
}

impl ProfileStore for MemoryStore {
    // Saves replace the whole map, so a poisoned lock never holds a half write.
    fn load(&self) -> Result<CacheEntries, ProfileError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.clone())
    }

    fn save(&self, entries: &CacheEntries) -> Result<(), ProfileError> {
        let mut stored = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        *stored = entries.clone();
        Ok(())
    }
}

/// Store backed by a JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProfileStore for JsonFileStore {
    fn load(&self) -> Result<CacheEntries, ProfileError> {
        if !self.path.exists() {
            return Ok(CacheEntries::new());
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, entries: &CacheEntries) -> Result<(), ProfileError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(entries)?)?;
        Ok(())
    }
}

/// Milliseconds since the Unix epoch
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Profile cache with expiry
///
/// Times are passed in explicitly so expiry can be checked against any clock.
pub struct ProfileCache<S> {
    store: S,
    entries: CacheEntries,
    ttl: Duration,
}

impl<S: ProfileStore> ProfileCache<S> {
    /// Open a cache over a store
    ///
    /// An unreadable store starts the cache empty rather than failing.
    pub fn open(store: S) -> Self {
        let entries = store.load().unwrap_or_else(|e| {
            warn!(error = %e, "Discarding unreadable profile cache");
            CacheEntries::new()
        });

        Self {
            store,
            entries,
            ttl: CACHE_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached profile for an address; expired entries are evicted
    pub fn get(&mut self, address: &str, now: u64) -> Option<BazarProfile> {
        if self.is_expired(address, now) {
            if self.entries.remove(address).is_some() {
                self.persist();
            }
            return None;
        }

        self.entries.get(address).map(|e| e.profile.clone())
    }

    /// Cache a profile as of `now`
    pub fn set(&mut self, address: &str, profile: BazarProfile, now: u64) -> Result<(), ProfileError> {
        self.entries.insert(
            address.to_string(),
            CachedProfile {
                profile,
                timestamp: now,
            },
        );
        self.store.save(&self.entries)
    }

    /// Drop every entry
    pub fn clear(&mut self) -> Result<(), ProfileError> {
        self.entries.clear();
        self.store.save(&self.entries)
    }

    /// Whether the address has no entry or one older than the TTL
    pub fn is_expired(&self, address: &str, now: u64) -> bool {
        match self.entries.get(address) {
            Some(entry) => now.saturating_sub(entry.timestamp) > self.ttl.as_millis() as u64,
            None => true,
        }
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(&self.entries) {
            warn!(error = %e, "Failed to save profile cache");
        }
    }
}

enum Attempt {
    /// The registry returned no messages
    Empty,
    Done(Option<BazarProfile>),
}

/// Resolves wallet addresses to Bazar profiles through a cache
pub struct ProfileResolver<'a, T, S> {
    transport: &'a T,
    registry: String,
    cache: ProfileCache<S>,
    retry_delay: Duration,
}

impl<'a, T: AoTransport, S: ProfileStore> ProfileResolver<'a, T, S> {
    pub fn new(transport: &'a T, registry: impl Into<String>, cache: ProfileCache<S>) -> Self {
        Self {
            transport,
            registry: registry.into(),
            cache,
            retry_delay: Duration::from_secs(1),
        }
    }

    /// Base delay between retries
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn cache(&self) -> &ProfileCache<S> {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut ProfileCache<S> {
        &mut self.cache
    }

    /// Profile for an address, or `None` if it has none
    ///
    /// Empty registry replies are retried after the base delay; transport
    /// errors are retried with a delay growing by the base delay each time.
    /// Lookup failures after the last retry resolve to `None`.
    pub async fn resolve(&mut self, address: &str) -> Option<BazarProfile> {
        if let Some(profile) = self.cache.get(address, now_millis()) {
            debug!(address, "Using cached Bazar profile");
            return Some(profile);
        }

        let mut retry = 0;
        loop {
            match self.attempt(address).await {
                Ok(Attempt::Done(profile)) => {
                    if let Some(profile) = &profile {
                        if let Err(e) = self.cache.set(address, profile.clone(), now_millis()) {
                            warn!(error = %e, "Failed to cache Bazar profile");
                        }
                    }
                    return profile;
                }
                Ok(Attempt::Empty) if retry < MAX_RETRIES => {
                    warn!(address, attempt = retry + 1, "Empty profile reply, retrying");
                    tokio::time::sleep(self.retry_delay).await;
                }
                Ok(Attempt::Empty) => return None,
                Err(e) if retry < MAX_RETRIES => {
                    warn!(address, attempt = retry + 1, error = %e, "Profile lookup failed, retrying");
                    tokio::time::sleep(self.retry_delay * (retry + 1)).await;
                }
                Err(e) => {
                    warn!(address, error = %e, "Profile lookup failed");
                    return None;
                }
            }
            retry += 1;
        }
    }

    async fn attempt(&self, address: &str) -> Result<Attempt, ProfileError> {
        let data = serde_json::json!({ "Address": address }).to_string();
        let result = self
            .transport
            .dryrun(&self.registry, protocol_tags("Get-Profiles-By-Delegate", &[]), data)
            .await?;

        if result.messages.is_empty() {
            return Ok(Attempt::Empty);
        }

        let Some(profile_id) = profile_id_of(&result) else {
            return Ok(Attempt::Done(None));
        };
        debug!(address, profile_id = %profile_id, "Found profile id");

        let data = serde_json::json!({ "ProfileId": profile_id }).to_string();
        let info = self
            .transport
            .dryrun(&profile_id, protocol_tags("Info", &[]), data)
            .await?;

        Ok(Attempt::Done(profile_of(&info, &profile_id)))
    }
}

/// `ProfileId` of the first delegate entry
fn profile_id_of(result: &ProcessResult) -> Option<String> {
    let data = result.first_data()?;
    let entries: Value = serde_json::from_str(&data).ok()?;
    entries
        .as_array()?
        .first()?
        .get("ProfileId")?
        .as_str()
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

/// Profile from an `Info` reply; one without a display name counts as absent
fn profile_of(result: &ProcessResult, profile_id: &str) -> Option<BazarProfile> {
    let data = result.first_data()?;
    let info: Value = serde_json::from_str(&data).ok()?;
    let mut profile: BazarProfile = serde_json::from_value(info.get("Profile")?.clone()).ok()?;

    if profile.display_name.is_empty() {
        return None;
    }
    profile.profile_id.get_or_insert_with(|| profile_id.to_string());
    Some(profile)
}
