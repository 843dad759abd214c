use std::{fmt::Formatter, str::FromStr, time::Duration};

use chrono::Local;
use croner::Cron;
use serde::{de::{self, Visitor}, Deserialize};
use snafu::{OptionExt, ResultExt, Snafu};

/// When to run the next supply check: either a fixed interval
/// (e.g. `5m`) or a cron expression.
#[derive(Debug)]
pub enum TimeSchedule {
    Interval(Duration),
    Cron(Cron),
}

impl TimeSchedule {
    /// Accepts cron syntax first, then humantime durations.
    fn parse(value: &str) -> Option<TimeSchedule> {
        if let Ok(cron) = Cron::from_str(value) {
            return Some(TimeSchedule::Cron(cron));
        }
        humantime::parse_duration(value).ok().map(TimeSchedule::Interval)
    }

    pub fn get_duration_till_next_occurrence(&self) -> Result<Duration, ScheduleError> {
        match self {
            TimeSchedule::Cron(cron) => {
                let now = Local::now();
                let next_occurrence = cron
                    .find_next_occurrence(&now, true)
                    .context(NextOccurrenceSnafu { pattern: cron.to_string() })?;
                (next_occurrence - now)
                    .to_std()
                    .ok()
                    .context(OccurrencePassedSnafu { pattern: cron.to_string() })
            },
            TimeSchedule::Interval(duration) => Ok(*duration),
        }
    }
}

impl<'de> Deserialize<'de> for TimeSchedule {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error> where D: serde::Deserializer<'de> {
        struct TimeScheduleVisitor;

        impl<'de> Visitor<'de> for TimeScheduleVisitor {
            type Value = TimeSchedule;

            fn expecting(&self, formatter: &mut Formatter) -> Result<(), std::fmt::Error> {
                formatter.write_str("a cron expression or a duration string")
            }

            fn visit_str<E>(self, value: &str) -> Result<TimeSchedule, E>
            where
                E: de::Error,
            {
                TimeSchedule::parse(value)
                    .ok_or_else(|| E::custom(format!("Invalid time schedule string: '{}'", value)))
            }
        }

        deserializer.deserialize_str(TimeScheduleVisitor)
    }
}

// ////// //
// Errors //
// ////// //

#[derive(Debug, Snafu)]
pub enum ScheduleError {
    #[snafu(display("No next occurrence for cron '{pattern}': {source}"))]
    NextOccurrence { pattern: String, source: croner::errors::CronError },

    #[snafu(display("Next occurrence of cron '{pattern}' is already in the past"))]
    OccurrencePassed { pattern: String },
}
