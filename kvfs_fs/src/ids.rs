//! Storage key generation for new nodes.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD as B64_URL};
use rand::RngCore;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::path::{ROOT_PATH, SEPARATOR};
use crate::{FsError, FsResult};

/// Source of fresh storage keys for newly created nodes.
pub trait IdGenerator: std::fmt::Debug + Send + Sync {
    fn next_id(&self) -> String;
}

/// 128 random bits, base64url-encoded without padding.
///
/// Collisions are treated as impossible and not checked for.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&self) -> String {
        let mut bytes = [0u8; 16];
        rand::rng().fill_bytes(&mut bytes);
        B64_URL.encode(bytes)
    }
}

/// Deterministic ids `<prefix>0`, `<prefix>1`, ... for tests and tooling.
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(0),
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new("node-")
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}{}", self.prefix, n)
    }
}

/// Rejects ids that could not safely be used as a child's store key.
pub(crate) fn check_id(id: &str) -> FsResult<()> {
    let unusable = id.is_empty()
        || id == ROOT_PATH
        || id.contains(SEPARATOR)
        || id.chars().any(char::is_control);
    if unusable {
        return Err(FsError::InvalidId { id: id.to_owned() });
    }
    Ok(())
}
