//! Error types for the thread segmentation library.

use thiserror::Error;

/// Result type used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error returned by external collaborators (publishers, media resolvers).
///
/// Collaborators keep their own error types; the publish loop wraps them with
/// the index of the unit that failed.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error types that can occur when assembling or publishing a thread.
#[derive(Debug, Error)]
pub enum Error {
    /// The thread context or platform configuration is unusable
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Platform configuration could not be parsed
    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// An image could not be resolved to bytes before publishing
    #[error("Failed to resolve image {image} for unit {index} ({published} units already published): {source}")]
    Resolve {
        /// Index of the unit whose media failed
        index: usize,
        /// The image reference that failed to resolve
        image: String,
        /// Number of units published before the failure
        published: usize,
        /// Error reported by the resolver
        #[source]
        source: BoxError,
    },

    /// The publisher rejected or failed to post a unit
    #[error("Failed to publish unit {index} ({published} units already published): {source}")]
    Publish {
        /// Index of the unit that failed
        index: usize,
        /// Number of units published before the failure
        published: usize,
        /// Error reported by the publisher
        #[source]
        source: BoxError,
    },

    /// Attempted to resume a thread from a position it does not have
    #[error("Cannot resume at unit {index}: thread has {len} units")]
    InvalidResume {
        /// Requested resume position
        index: usize,
        /// Number of units in the thread
        len: usize,
    },
}

impl Error {
    /// Index of the unit that failed, for publish-time errors.
    pub fn unit_index(&self) -> Option<usize> {
        match self {
            Error::Resolve { index, .. } | Error::Publish { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// Whether some units reached the platform before this error occurred.
    ///
    /// A partially posted thread has to be reconciled by hand or resumed.
    pub fn is_partial(&self) -> bool {
        match self {
            Error::Resolve { published, .. } | Error::Publish { published, .. } => *published > 0,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_error_reports_progress() {
        let err = Error::Publish {
            index: 3,
            published: 3,
            source: "rate limited".into(),
        };
        assert_eq!(err.unit_index(), Some(3));
        assert!(err.is_partial());
        assert_eq!(
            err.to_string(),
            "Failed to publish unit 3 (3 units already published): rate limited"
        );
    }

    #[test]
    fn test_first_unit_failure_is_not_partial() {
        let err = Error::Resolve {
            index: 0,
            image: "/data/a.jpg".to_string(),
            published: 0,
            source: "not found".into(),
        };
        assert_eq!(err.unit_index(), Some(0));
        assert!(!err.is_partial());
    }

    #[test]
    fn test_config_error_has_no_unit() {
        let err = Error::Config("bad".to_string());
        assert_eq!(err.unit_index(), None);
        assert!(!err.is_partial());
    }
}
