use super::*;

const PREFIX: &str = "cron2mqtt/dev/1000/abcd";

#[test]
fn test_register_suffix_returns_full_topic() {
    let mut reg = TopicRegister::new(PREFIX);
    reg.begin("CorePlugin");
    assert_eq!(reg.register_suffix("discovery"), format!("{PREFIX}/discovery"));

    let topics = reg.finish().unwrap();
    assert_eq!(topics.len(), 1);
    assert_eq!(
        topics[0].get(&format!("{PREFIX}/discovery")),
        Some(&RetainMode::Retain)
    );
}

#[test]
fn test_suffix_collision_names_both_plugins() {
    let mut reg = TopicRegister::new(PREFIX);
    reg.begin("First");
    reg.register_suffix("x");
    reg.begin("Second");
    assert_eq!(reg.register_suffix("x"), "");

    let err = reg.finish().unwrap_err();
    match &err {
        RegistryError::SuffixCollision { plugin, suffix, owner } => {
            assert_eq!(plugin, "Second");
            assert_eq!(suffix, "x");
            assert_eq!(owner, "First");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    let display = err.to_string();
    assert!(display.contains("First"));
    assert!(display.contains("Second"));
    assert!(display.contains("\"x\""));
}

#[test]
fn test_topic_collision() {
    let mut reg = TopicRegister::new(PREFIX);
    reg.begin("First");
    reg.register_topic("homeassistant/x/config", RetainMode::Retain);
    reg.begin("Second");
    reg.register_topic("homeassistant/x/config", RetainMode::DoNotRetain);

    assert!(matches!(
        reg.finish(),
        Err(RegistryError::TopicCollision { .. })
    ));
}

#[test]
fn test_suffix_colliding_with_full_topic() {
    let mut reg = TopicRegister::new(PREFIX);
    reg.begin("First");
    reg.register_topic(&format!("{PREFIX}/results"), RetainMode::DoNotRetain);
    reg.begin("Second");
    assert_eq!(reg.register_suffix("results"), "");

    match reg.finish() {
        Err(RegistryError::TopicCollision { plugin, owner, .. }) => {
            assert_eq!(plugin, "Second");
            assert_eq!(owner, "First");
        }
        other => panic!("unexpected result: {:?}", other.map(|t| t.len())),
    }
}

#[test]
fn test_same_plugin_may_reclaim() {
    let mut reg = TopicRegister::new(PREFIX);
    reg.begin("Only");
    let first = reg.register_suffix("x");
    let second = reg.register_suffix("x");
    reg.register_topic("other", RetainMode::DoNotRetain);
    reg.register_topic("other", RetainMode::Retain);

    assert_eq!(first, second);
    let topics = reg.finish().unwrap();
    assert_eq!(topics[0].len(), 2);
    assert_eq!(topics[0].get("other"), Some(&RetainMode::Retain));
}

#[test]
fn test_multiple_collisions_are_aggregated() {
    let mut reg = TopicRegister::new(PREFIX);
    reg.begin("First");
    reg.register_suffix("a");
    reg.register_suffix("b");
    reg.begin("Second");
    reg.register_suffix("a");
    reg.register_suffix("b");

    match reg.finish() {
        Err(RegistryError::Multiple(errs)) => assert_eq!(errs.len(), 2),
        other => panic!("unexpected result: {:?}", other.map(|t| t.len())),
    }
}

#[test]
fn test_invalid_suffix_is_rejected() {
    let mut reg = TopicRegister::new(PREFIX);
    reg.begin("Bad");
    assert_eq!(reg.register_suffix("a/b"), "");
    assert!(matches!(reg.finish(), Err(RegistryError::InvalidTopic(_))));
}

#[test]
fn test_topics_are_kept_per_plugin() {
    let mut reg = TopicRegister::new(PREFIX);
    reg.begin("First");
    reg.register_suffix("a");
    reg.begin("Second");
    reg.register_topic("elsewhere", RetainMode::DoNotRetain);
    reg.begin("Third");

    let topics = reg.finish().unwrap();
    assert_eq!(topics.len(), 3);
    assert!(topics[0].contains_key(&format!("{PREFIX}/a")));
    assert_eq!(topics[1].get("elsewhere"), Some(&RetainMode::DoNotRetain));
    assert!(topics[2].is_empty());
}

#[test]
fn test_prefix() {
    let reg = TopicRegister::new(PREFIX);
    assert_eq!(reg.prefix(), PREFIX);
}
