use super::*;

use std::io::Write;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use crate::config::{ConfigLoader, ConfigValidator};
use crate::memory::MemoryBroker;
use crate::protocols::{ExecResult, FixedClock, Transport};
use crate::registry::{
    CronJob, Device, JobInfo, JobOptions, JobSchedule, SweepOutcome, discover_remote_cron_jobs,
};

const CONFIG: &str = r#"
[broker]
url = "tcp://localhost:1883"

[discovery]
quiescence_ms = 50
timeout_ms = 5000

[publish]
max_concurrency = 4

[hass]
enabled = true
discovery_prefix = "ha"
"#;

fn now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2000-01-01T00:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

#[tokio::test]
async fn test_create_discover_and_prune() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(CONFIG.as_bytes()).unwrap();
    let config = ConfigLoader::load(file.path()).unwrap();
    let warnings = ConfigValidator::validate(&config).unwrap().into_result().unwrap();
    assert!(warnings.is_empty());

    let broker = MemoryBroker::new();
    let transport: Arc<dyn Transport> = Arc::new(broker.clone());
    let options = JobOptions::from_config(&config).with_clock(Arc::new(FixedClock(now())));
    let device = Device::from_parts("0123456789abcdef", 1000, "alice", "nas").unwrap();
    let factories = plugin_factories(&config);
    assert_eq!(factories.len(), 1);

    for id in ["backup", "report"] {
        let info = JobInfo::new(id, device.clone())
            .unwrap()
            .with_schedule(JobSchedule::parse("0 3 * * *").unwrap())
            .with_command(format!("cron2mqtt exec {id} -- /usr/local/bin/{id}"));
        let plugins = factories.iter().map(|factory| factory()).collect();
        CronJob::create(info, transport.clone(), plugins, options.clone())
            .await
            .unwrap();
    }
    // discovery + metadata + hass config, per job
    assert_eq!(broker.retained_topics().len(), 6);

    let cancel = CancellationToken::new();
    let found = discover_remote_cron_jobs(transport.clone(), &device, &cancel, &options, &factories)
        .await
        .unwrap();
    assert_eq!(found.outcome, SweepOutcome::Quiescent);
    assert_eq!(found.jobs.len(), 2);

    let backup = found
        .jobs
        .iter()
        .find(|job| job.id() == "backup")
        .unwrap();
    let result = ExecResult {
        args: vec!["/usr/local/bin/backup".to_string()],
        start: now(),
        end: now(),
        stdout: b"done\n".to_vec(),
        stderr: Vec::new(),
        exit_code: 0,
    };
    backup.publish_result(&result).await.unwrap();
    assert!(broker.retained(&backup.core_topics().last_success).is_some());

    for job in &found.jobs {
        job.unpublish(&cancel).await.unwrap();
    }
    assert!(broker.retained_topics().is_empty());
}

#[test]
fn test_hass_disabled() {
    let config = ConfigLoader::load_str("[hass]\nenabled = false\n").unwrap();
    assert!(plugin_factories(&config).is_empty());
}
