//! Topic validation errors.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopicError {
    #[error("{component:?} cannot be used in a topic string. Topic strings can only contain {allowed}")]
    InvalidComponent {
        component: String,
        allowed: &'static str,
    },
}
