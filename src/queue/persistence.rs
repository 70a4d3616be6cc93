//! Queue persistence for passivation
//!
//! A long-running conversation can be passivated between requests: the
//! primary queues are written out and later reconstructed against a new
//! session. The binary form is the contract:
//!
//! ```text
//! u32 format version (little endian)
//! insertions, deletions, updates, collection updates, collection removals,
//! collection creations  (each: u64 count, then that many action records)
//! ```
//!
//! The order of the six sequences is historical and differs from flush
//! order; it must not change. The post-completion list and the session are
//! never written. JSON and gzip-compressed JSON renderings of the same
//! structure exist for diagnostics.

use bincode::Options;
use serde::{Deserialize, Serialize};
use crate::action::{CollectionAction, EntityDelete, EntityInsert, EntityUpdate};
use crate::config::SERIALIZED_FORMAT_VERSION;
use crate::error::{QueueError, QueueResult};
use super::state::ActionLists;

/// Serialized queue format for passivation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedQueue {
    /// Format version; readers fail closed on anything else
    pub version: u32,
    pub insertions: Vec<EntityInsert>,
    pub deletions: Vec<EntityDelete>,
    pub updates: Vec<EntityUpdate>,
    pub collection_updates: Vec<CollectionAction>,
    pub collection_removals: Vec<CollectionAction>,
    pub collection_creations: Vec<CollectionAction>,
}

impl SerializedQueue {
    /// Snapshot the primary queues
    pub fn from_lists(lists: &ActionLists) -> Self {
        Self {
            version: SERIALIZED_FORMAT_VERSION,
            insertions: lists.insertions.clone(),
            deletions: lists.deletions.clone(),
            updates: lists.updates.clone(),
            collection_updates: lists.collection_updates.clone(),
            collection_removals: lists.collection_removals.clone(),
            collection_creations: lists.collection_creations.clone(),
        }
    }

    /// Convert back into primary queues
    pub fn into_lists(self) -> ActionLists {
        ActionLists {
            insertions: self.insertions,
            updates: self.updates,
            deletions: self.deletions,
            collection_creations: self.collection_creations,
            collection_updates: self.collection_updates,
            collection_removals: self.collection_removals,
        }
    }

    /// Serialize to the binary passivation format
    pub fn to_binary(&self) -> QueueResult<Vec<u8>> {
        Ok(binary_options().serialize(self)?)
    }

    /// Deserialize from the binary passivation format.
    ///
    /// Rejects other format versions before touching the body, and rejects
    /// trailing bytes after the six sequences.
    pub fn from_binary(data: &[u8]) -> QueueResult<Self> {
        let header: [u8; 4] = data
            .get(..4)
            .and_then(|h| h.try_into().ok())
            .ok_or_else(|| QueueError::SerializationError {
                message: format!("Truncated queue: {} bytes, no version header", data.len()),
            })?;

        let version = u32::from_le_bytes(header);
        if version != SERIALIZED_FORMAT_VERSION {
            return Err(QueueError::FormatVersionMismatch {
                found: version,
                expected: SERIALIZED_FORMAT_VERSION,
            });
        }

        Ok(binary_options().deserialize(data)?)
    }

    /// Serialize to JSON (human-readable, easier debugging)
    pub fn to_json(&self) -> QueueResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from JSON
    pub fn from_json(json: &str) -> QueueResult<Self> {
        let queue: Self = serde_json::from_str(json)?;
        queue.check_version()?;
        Ok(queue)
    }

    /// Serialize to gzip-compressed JSON (balance of readability and size)
    pub fn to_compressed_json(&self) -> QueueResult<Vec<u8>> {
        use flate2::write::GzEncoder;
        use flate2::Compression;
        use std::io::Write;

        let json = serde_json::to_vec(self)?;

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&json)?;
        Ok(encoder.finish()?)
    }

    /// Deserialize from gzip-compressed JSON
    pub fn from_compressed_json(data: &[u8]) -> QueueResult<Self> {
        use flate2::read::GzDecoder;
        use std::io::Read;

        let mut decoder = GzDecoder::new(data);
        let mut json_bytes = Vec::new();
        decoder.read_to_end(&mut json_bytes)?;

        let queue: Self = serde_json::from_slice(&json_bytes)?;
        queue.check_version()?;
        Ok(queue)
    }

    /// Total number of actions across the six sequences
    pub fn action_count(&self) -> usize {
        self.insertions.len()
            + self.deletions.len()
            + self.updates.len()
            + self.collection_updates.len()
            + self.collection_removals.len()
            + self.collection_creations.len()
    }

    fn check_version(&self) -> QueueResult<()> {
        if self.version != SERIALIZED_FORMAT_VERSION {
            return Err(QueueError::FormatVersionMismatch {
                found: self.version,
                expected: SERIALIZED_FORMAT_VERSION,
            });
        }
        Ok(())
    }
}

/// Fixed-width little-endian integers so the version header is always the
/// first four bytes; trailing garbage is an error.
fn binary_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .reject_trailing_bytes()
}
