use serde::Deserialize;
use crate::error::{QueueError, QueueResult};

/// Sort updates (and collection actions) by primary key before flushing
pub const DEFAULT_ORDER_UPDATES: bool = false;

/// Regroup inserts by entity type before flushing
pub const DEFAULT_ORDER_INSERTS: bool = false;

/// Query-result cache enabled system-wide
pub const DEFAULT_QUERY_CACHE_ENABLED: bool = false;

/// Format version written in front of every passivated queue
pub const SERIALIZED_FORMAT_VERSION: u32 = 1;

/// How long a pre-invalidated space stays "in flight" before the
/// confirm-invalidation lands (milliseconds)
pub const CACHE_PRE_INVALIDATION_TIMEOUT_MS: i64 = 60_000;

/// Flush-time settings for one action queue.
///
/// Handed to the queue at construction; the queue never consults global
/// state to decide whether to sort or to talk to the query cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QueueSettings {
    /// Stable-sort updates and collection actions by their ordering key
    pub order_updates: bool,
    /// Run the insert dependency sorter
    pub order_inserts: bool,
    /// Pre-invalidate / confirm-invalidate property spaces in the query cache
    pub query_cache_enabled: bool,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            order_updates: DEFAULT_ORDER_UPDATES,
            order_inserts: DEFAULT_ORDER_INSERTS,
            query_cache_enabled: DEFAULT_QUERY_CACHE_ENABLED,
        }
    }
}

impl QueueSettings {
    pub fn with_order_updates(mut self, enabled: bool) -> Self {
        self.order_updates = enabled;
        self
    }

    pub fn with_order_inserts(mut self, enabled: bool) -> Self {
        self.order_inserts = enabled;
        self
    }

    pub fn with_query_cache(mut self, enabled: bool) -> Self {
        self.query_cache_enabled = enabled;
        self
    }

    /// Build settings from `key = value` pairs (session-factory properties).
    ///
    /// Recognised keys: `order_updates`, `order_inserts`, `query_cache`.
    /// Unknown keys belong to other components and are skipped.
    pub fn from_properties<'a, I>(properties: I) -> QueueResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut settings = Self::default();

        for (key, value) in properties {
            let key = key.trim();
            match key {
                "order_updates" => settings.order_updates = parse_bool(key, value)?,
                "order_inserts" => settings.order_inserts = parse_bool(key, value)?,
                "query_cache" => settings.query_cache_enabled = parse_bool(key, value)?,
                _ => {}
            }
        }

        Ok(settings)
    }

    /// Parse settings from a JSON object; missing fields take their defaults
    pub fn from_json(json: &str) -> QueueResult<Self> {
        serde_json::from_str(json).map_err(|e| QueueError::ConfigError {
            setting: "queue settings".to_string(),
            value: json.to_string(),
            reason: e.to_string(),
        })
    }
}

fn parse_bool(setting: &str, value: &str) -> QueueResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Ok(true),
        "false" | "0" | "off" | "no" => Ok(false),
        _ => Err(QueueError::ConfigError {
            setting: setting.to_string(),
            value: value.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}
