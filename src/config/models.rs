use std::time::Duration;

use serde_derive::Deserialize;

use super::schedule::TimeSchedule;

// When changing anything here, make sure to add
// #[serde(alias = "ihavenounderscores")]
// where needed, so it can be read from the ENV vars.

#[derive(Debug, Deserialize)]
pub struct Printer {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct Vendor {
    #[serde(alias = "dllpath")]
    pub dll_path: String,
}

#[derive(Debug, Deserialize)]
pub struct Smtp {
    pub host: String,
    pub port: u16,
    pub from: String,
    pub to: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct Monitor {
    pub schedule: TimeSchedule,
    #[serde(with = "humantime_serde")]
    pub grace: Duration,
    #[serde(alias = "lowthresholdpercent")]
    pub low_threshold_percent: f64,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub printer: Printer,
    pub vendor: Vendor,
    pub smtp: Smtp,
    pub monitor: Monitor,
}
