use std::fmt;

pub mod testing;

/// Main error type for the write-behind action queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    // ============ Execution Errors (XX000 / 08xxx) ============
    /// A queued action failed while executing against the store
    ExecutionFailed {
        action: String,
        reason: String,
    },

    /// Flushing the pending statement batch failed
    BatchFailed {
        reason: String,
    },

    // ============ Cache Errors (55xxx) ============
    /// Releasing a cache lock (soft lock or space invalidation) failed.
    ///
    /// This is the one failure the post-completion sweep tolerates.
    CacheLockRelease {
        spaces: Vec<String>,
        reason: String,
    },

    /// Cache error (poisoned mutex, corruption)
    CacheError {
        cache_name: String,
        reason: String,
    },

    // ============ Invariant Errors (XX000) ============
    /// Broken invariant (bug in the queue or one of its collaborators)
    AssertionFailure {
        message: String,
        file: &'static str,
        line: u32,
    },

    // ============ Passivation Errors (22xxx) ============
    /// Serialization/deserialization failed
    SerializationError {
        message: String,
    },

    /// Serialized queue was written by an incompatible format version
    FormatVersionMismatch {
        found: u32,
        expected: u32,
    },

    // ============ Configuration Errors (22023) ============
    /// Invalid queue setting
    ConfigError {
        setting: String,
        value: String,
        reason: String,
    },
}

impl QueueError {
    /// Get the SQLSTATE code the owning session reports for this error
    pub fn sqlstate(&self) -> &'static str {
        use QueueError::*;
        match self {
            ExecutionFailed { .. } => "XX000", // Internal error (store rejected the action)
            BatchFailed { .. } => "08006",     // Connection failure during batch

            CacheLockRelease { .. } => "55P03", // Lock not available
            CacheError { .. } => "55000",       // Object not in prerequisite state

            AssertionFailure { .. } => "XX001", // Data corrupted / broken invariant

            SerializationError { .. } => "22P03",    // Invalid binary representation
            FormatVersionMismatch { .. } => "0A000", // Feature not supported

            ConfigError { .. } => "22023", // Invalid parameter value
        }
    }

    /// Create assertion failure with file/line info
    pub fn assertion(message: String, file: &'static str, line: u32) -> Self {
        QueueError::AssertionFailure { message, file, line }
    }

    /// Whether the post-completion sweep may log this error and carry on
    pub fn is_cache_lock_failure(&self) -> bool {
        matches!(self, QueueError::CacheLockRelease { .. })
    }
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use QueueError::*;
        match self {
            ExecutionFailed { action, reason } => {
                write!(f, "Failed to execute {}: {}", action, reason)
            }
            BatchFailed { reason } => {
                write!(f, "Failed to execute statement batch: {}", reason)
            }
            CacheLockRelease { spaces, reason } => {
                write!(f, "Could not release a cache lock on [{}]: {}", spaces.join(", "), reason)
            }
            CacheError { cache_name, reason } => {
                write!(f, "Cache '{}' error: {}", cache_name, reason)
            }
            AssertionFailure { message, file, line } => {
                write!(f, "Assertion failure at {}:{}: {}\nPlease report this bug.",
                       file, line, message)
            }
            SerializationError { message } => {
                write!(f, "Serialization error: {}", message)
            }
            FormatVersionMismatch { found, expected } => {
                write!(f, "Serialized action queue has format version {}, expected {}",
                       found, expected)
            }
            ConfigError { setting, value, reason } => {
                write!(f, "Configuration error for '{}': {} (value: {})", setting, reason, value)
            }
        }
    }
}

impl std::error::Error for QueueError {}

/// Result type for action queue operations
pub type QueueResult<T> = Result<T, QueueError>;

/// Convert serde_json::Error to QueueError
impl From<serde_json::Error> for QueueError {
    fn from(e: serde_json::Error) -> Self {
        QueueError::SerializationError {
            message: format!("JSON serialization error: {}", e),
        }
    }
}

/// Convert bincode::Error to QueueError
impl From<bincode::Error> for QueueError {
    fn from(e: bincode::Error) -> Self {
        QueueError::SerializationError {
            message: format!("Binary serialization error: {}", e),
        }
    }
}

/// Convert std::io::Error to QueueError
impl From<std::io::Error> for QueueError {
    fn from(e: std::io::Error) -> Self {
        QueueError::SerializationError {
            message: format!("I/O error: {}", e),
        }
    }
}

/// Helper macro for creating assertion failures with automatic file/line
#[macro_export]
macro_rules! assertion_failure {
    ($msg:expr) => {
        $crate::error::QueueError::assertion($msg.to_string(), file!(), line!())
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::QueueError::assertion(format!($fmt, $($arg)*), file!(), line!())
    };
}
