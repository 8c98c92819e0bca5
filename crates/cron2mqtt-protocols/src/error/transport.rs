//! Transport-related errors.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("could not publish to {topic}: {message}")]
    Publish { topic: String, message: String },

    #[error("could not subscribe to {topic}: {message}")]
    Subscribe { topic: String, message: String },

    #[error("could not unsubscribe from {topic}: {message}")]
    Unsubscribe { topic: String, message: String },

    #[error("not connected to broker")]
    NotConnected,

    #[error("{0}")]
    Custom(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_error() {
        let err = TransportError::Publish {
            topic: "a/b".to_string(),
            message: "timeout".to_string(),
        };
        let display = err.to_string();
        assert!(display.contains("publish"));
        assert!(display.contains("a/b"));
        assert!(display.contains("timeout"));
    }

    #[test]
    fn test_subscribe_error() {
        let err = TransportError::Subscribe {
            topic: "a/#".to_string(),
            message: "refused".to_string(),
        };
        assert!(err.to_string().contains("subscribe to a/#"));
    }

    #[test]
    fn test_all_error_variants() {
        let errors = vec![
            TransportError::Publish {
                topic: "t".to_string(),
                message: "m".to_string(),
            },
            TransportError::Subscribe {
                topic: "t".to_string(),
                message: "m".to_string(),
            },
            TransportError::Unsubscribe {
                topic: "t".to_string(),
                message: "m".to_string(),
            },
            TransportError::NotConnected,
            TransportError::Custom("c".to_string()),
        ];

        for err in errors {
            assert!(!err.to_string().is_empty());
        }
    }
}
