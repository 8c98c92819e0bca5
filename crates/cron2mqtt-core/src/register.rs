//! Topic claims made by plugins while a cron job initializes.

use std::collections::HashMap;

use tracing::trace;

use cron2mqtt_protocols::{MultiError, RegistryError, RetainMode};

use crate::topic::validate_topic_component;

#[cfg(test)]
#[path = "register_tests.rs"]
mod tests;

/// Topics one plugin owns, with the retain mode each was claimed for.
pub type TopicMap = HashMap<String, RetainMode>;

/// Collects topic claims from every plugin of one cron job.
///
/// Only one plugin may own a topic. A plugin may publish with
/// [`RetainMode::Retain`] only to topics claimed with it, while
/// [`RetainMode::DoNotRetain`] is always allowed.
///
/// Collisions do not stop the pass; they are recorded and reported together
/// once every plugin has initialized.
pub struct TopicRegister {
    prefix: String,
    suffixes: HashMap<String, usize>,
    topics: HashMap<String, usize>,
    plugins: Vec<(String, TopicMap)>,
    errors: MultiError<RegistryError>,
}

impl TopicRegister {
    pub(crate) fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffixes: HashMap::new(),
            topics: HashMap::new(),
            plugins: Vec::new(),
            errors: MultiError::new(),
        }
    }

    /// Attribute subsequent claims to a new plugin.
    pub(crate) fn begin(&mut self, plugin: &str) {
        self.plugins.push((plugin.to_string(), TopicMap::new()));
    }

    /// Record an error that did not come from a claim.
    pub(crate) fn record(&mut self, err: RegistryError) {
        self.errors.push(err);
    }

    /// The job's topic prefix, without a trailing `/`.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Claim `<prefix>/<suffix>` for retained publishing.
    ///
    /// Returns the full topic, or an empty string if the claim failed.
    pub fn register_suffix(&mut self, suffix: &str) -> String {
        if let Err(err) = validate_topic_component(suffix) {
            self.errors.push(RegistryError::InvalidTopic(err));
            return String::new();
        }

        let current = self.current();
        if let Some(&owner) = self.suffixes.get(suffix) {
            if owner != current {
                self.errors.push(RegistryError::SuffixCollision {
                    plugin: self.name(current),
                    suffix: suffix.to_string(),
                    owner: self.name(owner),
                });
                return String::new();
            }
        }

        let topic = format!("{}/{}", self.prefix, suffix);
        if !self.claim(&topic, RetainMode::Retain) {
            return String::new();
        }
        self.suffixes.insert(suffix.to_string(), current);
        topic
    }

    /// Claim an arbitrary topic, which need not live under the prefix.
    pub fn register_topic(&mut self, topic: &str, retain: RetainMode) {
        self.claim(topic, retain);
    }

    fn claim(&mut self, topic: &str, retain: RetainMode) -> bool {
        let current = self.current();
        if let Some(&owner) = self.topics.get(topic) {
            if owner != current {
                self.errors.push(RegistryError::TopicCollision {
                    plugin: self.name(current),
                    topic: topic.to_string(),
                    owner: self.name(owner),
                });
                return false;
            }
        }

        self.topics.insert(topic.to_string(), current);
        if let Some((_, claimed)) = self.plugins.get_mut(current) {
            claimed.insert(topic.to_string(), retain);
        }
        true
    }

    fn current(&self) -> usize {
        self.plugins.len().saturating_sub(1)
    }

    fn name(&self, index: usize) -> String {
        self.plugins
            .get(index)
            .map(|(name, _)| name.clone())
            .unwrap_or_default()
    }

    /// Topics claimed per plugin, in plugin order, or every recorded error.
    pub(crate) fn finish(self) -> Result<Vec<TopicMap>, RegistryError> {
        if !self.errors.is_empty() {
            return Err(RegistryError::from(self.errors));
        }

        Ok(self
            .plugins
            .into_iter()
            .map(|(name, claimed)| {
                let mut topics: Vec<&String> = claimed.keys().collect();
                topics.sort();
                trace!(plugin = %name, ?topics, "Registered topics");
                claimed
            })
            .collect())
    }
}
