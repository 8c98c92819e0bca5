//! Topic namespace rules.

use cron2mqtt_protocols::TopicError;

/// First segment of every topic this crate owns.
pub const NAMESPACE_ROOT: &str = "cron2mqtt";

/// Characters a namespace segment may contain.
pub const ALLOWED_TOPIC_CHARACTERS: &str = "[a-zA-Z0-9_-]";

/// Check that `component` can be used as one `/`-delimited topic segment.
pub fn validate_topic_component(component: &str) -> Result<(), TopicError> {
    let valid = !component.is_empty()
        && component
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(TopicError::InvalidComponent {
            component: component.to_string(),
            allowed: ALLOWED_TOPIC_CHARACTERS,
        })
    }
}

/// Extract the segment `topic` holds between `prefix/` and `/suffix`.
pub(crate) fn strip_segment<'a>(topic: &'a str, prefix: &str, suffix: &str) -> Option<&'a str> {
    topic
        .strip_prefix(prefix)?
        .strip_prefix('/')?
        .strip_suffix(suffix)?
        .strip_suffix('/')
}
