//! Identity tokens for output documents
//!
//! Every node of an exported document carries a fresh 24-character lowercase
//! hexadecimal token. Tokens are derived from a per-call timestamp, the
//! process id and a process-wide counter, hashed with blake3: collision-free
//! within a process without being cryptographically unpredictable.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Length of a token in hexadecimal characters
pub const OBJECT_ID_LEN: usize = 24;

static COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Invalid object id: expected {OBJECT_ID_LEN} lowercase hex characters, got '{0}'")]
    InvalidObjectId(String),
}

/// A 24-character lowercase hexadecimal identity token
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectId(String);

impl ObjectId {
    /// Generates a fresh token
    pub fn generate() -> Self {
        let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0);
        let sequence = COUNTER.fetch_add(1, Ordering::Relaxed);

        let mut hasher = blake3::Hasher::new();
        hasher.update(&nanos.to_le_bytes());
        hasher.update(&std::process::id().to_le_bytes());
        hasher.update(&sequence.to_le_bytes());
        let hex = hasher.finalize().to_hex();

        Self(hex.as_str()[..OBJECT_ID_LEN].to_string())
    }

    /// Returns the token as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ObjectId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let valid = s.len() == OBJECT_ID_LEN
            && s.chars()
                .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase());
        if !valid {
            return Err(IdError::InvalidObjectId(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for ObjectId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ObjectId> for String {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}
