//! Execution results.

use chrono::{DateTime, Duration, Utc};

/// The outcome of running a cron job's command once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecResult {
    /// The full argument list, program first.
    pub args: Vec<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub exit_code: i32,
}

impl ExecResult {
    /// Wall-clock time the command ran for.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(exit_code: i32) -> ExecResult {
        let start = DateTime::parse_from_rfc3339("2024-03-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        ExecResult {
            args: vec!["echo".to_string(), "ok".to_string()],
            start,
            end: start + Duration::milliseconds(1500),
            stdout: b"ok\n".to_vec(),
            stderr: Vec::new(),
            exit_code,
        }
    }

    #[test]
    fn test_duration() {
        assert_eq!(result(0).duration().num_milliseconds(), 1500);
    }

    #[test]
    fn test_succeeded() {
        assert!(result(0).succeeded());
        assert!(!result(1).succeeded());
        assert!(!result(-1).succeeded());
    }
}
