//! Crontab schedules.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use cron::Schedule;

use cron2mqtt_protocols::ScheduleError;

const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// A crontab schedule expression such as `*/5 * * * *` or `@daily`.
#[derive(Debug, Clone)]
pub struct JobSchedule {
    expression: String,
    schedule: Schedule,
}

impl JobSchedule {
    pub fn parse(expression: &str) -> Result<Self, ScheduleError> {
        let expression = expression.trim();
        let normalized = normalize(expression)?;
        let schedule = Schedule::from_str(&normalized).map_err(|e| ScheduleError::Invalid {
            expression: expression.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            expression: expression.to_string(),
            schedule,
        })
    }

    /// The expression as written.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// First execution strictly after `after`.
    pub fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedule.after(&after).next()
    }
}

impl fmt::Display for JobSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression)
    }
}

impl FromStr for JobSchedule {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Rewrite a crontab expression into the seconds-first form `cron` expects.
fn normalize(expression: &str) -> Result<String, ScheduleError> {
    if let Some(name) = expression.strip_prefix('@') {
        let expanded = match name {
            "yearly" | "annually" => "0 0 0 1 1 *",
            "monthly" => "0 0 0 1 * *",
            "weekly" => "0 0 0 * * Sun",
            "daily" | "midnight" => "0 0 0 * * *",
            "hourly" => "0 0 * * * *",
            _ => return Err(ScheduleError::Unsupported(expression.to_string())),
        };
        return Ok(expanded.to_string());
    }

    let fields: Vec<&str> = expression.split_whitespace().collect();
    let [minute, hour, day_of_month, month, day_of_week] = fields.as_slice() else {
        return Err(ScheduleError::Invalid {
            expression: expression.to_string(),
            message: format!("expected 5 fields, found {}", fields.len()),
        });
    };
    Ok(format!(
        "0 {} {} {} {} {}",
        minute,
        hour,
        day_of_month,
        month,
        day_of_week_names(day_of_week)
    ))
}

/// Crontab numbers days 0-7 from Sunday while `cron` numbers them 1-7, so
/// numeric days are rewritten as names.
fn day_of_week_names(field: &str) -> String {
    field
        .split(',')
        .flat_map(|item| {
            let (range, step) = match item.split_once('/') {
                Some((range, step)) => (range, Some(step)),
                None => (item, None),
            };
            let with_step = |range: String| match step {
                Some(step) => format!("{}/{}", range, step),
                None => range,
            };

            match range.split_once('-') {
                Some((start, end)) => match (day_number(start), day_number(end)) {
                    (Some(start), Some(7)) if (1..7).contains(&start) && step.is_none() => {
                        vec![format!("{}-Sat", DAY_NAMES[start]), "Sun".to_string()]
                    }
                    (Some(0), Some(7)) => vec![with_step("Sun-Sat".to_string())],
                    (Some(start), Some(end)) => {
                        vec![with_step(format!("{}-{}", DAY_NAMES[start % 7], DAY_NAMES[end % 7]))]
                    }
                    _ => vec![item.to_string()],
                },
                None => match day_number(range) {
                    Some(day) => vec![with_step(DAY_NAMES[day % 7].to_string())],
                    None => vec![item.to_string()],
                },
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

fn day_number(s: &str) -> Option<usize> {
    s.parse::<usize>().ok().filter(|day| *day <= 7)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_hourly() {
        let schedule = JobSchedule::parse("0 * * * *").unwrap();
        assert_eq!(
            schedule.next_after(at("2000-01-01T00:00:00Z")),
            Some(at("2000-01-01T01:00:00Z"))
        );
    }

    #[test]
    fn test_every_minute() {
        let schedule = JobSchedule::parse("* * * * *").unwrap();
        assert_eq!(
            schedule.next_after(at("2000-01-01T00:00:30Z")),
            Some(at("2000-01-01T00:01:00Z"))
        );
    }

    #[test]
    fn test_expression_is_kept_verbatim() {
        let schedule: JobSchedule = " */5 * * * * ".parse().unwrap();
        assert_eq!(schedule.expression(), "*/5 * * * *");
        assert_eq!(schedule.to_string(), "*/5 * * * *");
    }

    #[test]
    fn test_macros() {
        let daily = JobSchedule::parse("@daily").unwrap();
        assert_eq!(
            daily.next_after(at("2000-01-01T12:00:00Z")),
            Some(at("2000-01-02T00:00:00Z"))
        );
        let hourly = JobSchedule::parse("@hourly").unwrap();
        assert_eq!(
            hourly.next_after(at("2000-01-01T12:30:00Z")),
            Some(at("2000-01-01T13:00:00Z"))
        );
    }

    #[test]
    fn test_reboot_is_unsupported() {
        assert!(matches!(
            JobSchedule::parse("@reboot"),
            Err(ScheduleError::Unsupported(_))
        ));
    }

    #[test]
    fn test_wrong_field_count() {
        let err = JobSchedule::parse("* * * *").unwrap_err();
        assert!(err.to_string().contains("expected 5 fields"));
    }

    #[test]
    fn test_out_of_range() {
        assert!(matches!(
            JobSchedule::parse("61 * * * *"),
            Err(ScheduleError::Invalid { .. })
        ));
    }

    #[test]
    fn test_sunday_is_zero_or_seven() {
        // 2000-01-01 was a Saturday.
        for expression in ["0 0 * * 0", "0 0 * * 7"] {
            let schedule = JobSchedule::parse(expression).unwrap();
            assert_eq!(
                schedule.next_after(at("2000-01-01T00:00:00Z")),
                Some(at("2000-01-02T00:00:00Z")),
                "{expression}"
            );
        }
    }

    #[test]
    fn test_day_of_week_names() {
        assert_eq!(day_of_week_names("*"), "*");
        assert_eq!(day_of_week_names("1-5"), "Mon-Fri");
        assert_eq!(day_of_week_names("0,6"), "Sun,Sat");
        assert_eq!(day_of_week_names("5-7"), "Fri-Sat,Sun");
        assert_eq!(day_of_week_names("0-7"), "Sun-Sat");
        assert_eq!(day_of_week_names("1-5/2"), "Mon-Fri/2");
        assert_eq!(day_of_week_names("MON"), "MON");
    }

    #[test]
    fn test_weekdays() {
        let schedule = JobSchedule::parse("30 9 * * 1-5").unwrap();
        // Saturday morning rolls over to Monday.
        assert_eq!(
            schedule.next_after(at("2000-01-01T10:00:00Z")),
            Some(at("2000-01-03T09:30:00Z"))
        );
    }
}
