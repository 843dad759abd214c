use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, error};

use crate::cli::{Cli, Commands};
use crate::config::models::Settings;
use crate::config::schedule::TimeSchedule;
use crate::mail::client::AlertMailer;
use crate::monitor::cycle::{remaining_percent, run_cycle};
use crate::monitor::idle::IdleTracker;
use crate::spooler::probe::SystemSpooler;
use crate::vendor::client::{discover_port, read_counters, VendorInterface};

mod cli;
mod config;
mod mail;
mod monitor;
mod spooler;
mod vendor;

pub fn get_settings() -> &'static Settings {
    static SETTINGS: OnceLock<Settings> = OnceLock::new();
    SETTINGS.get_or_init(|| crate::config::loading::load_config())
}

fn main() -> Result<()> {
    colog::init();

    let cli = Cli::parse();
    let settings = get_settings();

    // Required exports missing is a configuration error; fail before the
    // loop rather than on the first cycle.
    let vendor = VendorInterface::load(&settings.vendor.dll_path)
        .context("vendor status DLL is unusable")?;

    match cli.command {
        Some(Commands::Status) => print_counters(&vendor),
        Some(Commands::Check) => run_single_check(settings, &vendor),
        None => run_monitor(settings, &vendor),
    }
}

/// How long to wait before re-resolving the schedule after it failed.
const SCHEDULE_RETRY: Duration = Duration::from_secs(1);

/// Resolves the wait until the next check. A schedule that cannot produce
/// a next occurrence is logged and retried shortly; once the loop is
/// running, nothing short of a kill takes the process down.
fn next_check_in(schedule: &TimeSchedule) -> Duration {
    match schedule.get_duration_till_next_occurrence() {
        Ok(wait) => wait,
        Err(e) => {
            error!("Could not resolve the next check time: {e}");
            SCHEDULE_RETRY
        }
    }
}

fn run_monitor(settings: &Settings, vendor: &VendorInterface) -> Result<()> {
    let mailer = AlertMailer::new(&settings.smtp).context("SMTP settings are unusable")?;
    let mut tracker = IdleTracker::new(settings.monitor.grace, Instant::now());

    loop {
        let wait = next_check_in(&settings.monitor.schedule);
        debug!("Next supply check in {}.", humantime::format_duration(wait));
        sleep_with_ticks(wait);

        let outcome = run_cycle(
            &settings.printer.name,
            settings.monitor.low_threshold_percent,
            &SystemSpooler,
            vendor,
            &mailer,
            &mut tracker,
            Instant::now(),
        );
        match outcome {
            Ok(outcome) => debug!("Check cycle finished: {outcome:?}"),
            Err(e) => error!("Check cycle aborted: {e}"),
        }
    }
}

fn run_single_check(settings: &Settings, vendor: &VendorInterface) -> Result<()> {
    let mailer = AlertMailer::new(&settings.smtp).context("SMTP settings are unusable")?;
    let now = Instant::now();
    // A one-shot check has no activity history to wait out.
    let mut tracker = IdleTracker::with_elapsed_grace(settings.monitor.grace, now);

    let outcome = run_cycle(
        &settings.printer.name,
        settings.monitor.low_threshold_percent,
        &SystemSpooler,
        vendor,
        &mailer,
        &mut tracker,
        now,
    )?;
    debug!("Check cycle finished: {outcome:?}");
    Ok(())
}

/// Reads the counters without the spooler gate. Diagnostic aid; the output
/// mirrors what the vendor tooling reports.
fn print_counters(vendor: &VendorInterface) -> Result<()> {
    let port = discover_port(vendor)
        .context("no vendor port answered (is the printer connected and idle?)")?;
    let reading = read_counters(vendor, port)?;

    println!("Vendor port: {port}");
    println!("Remaining prints: {}", reading.remaining);
    if let Some(initial) = reading.initial {
        println!("Roll capacity: {initial}");
        if let Some(percent) = remaining_percent(reading.remaining, Some(initial)) {
            println!("Remaining percent: {percent:.1}%");
        }
    }
    if let Some(status) = reading.raw_status {
        println!("Raw status code: {status}");
    }
    Ok(())
}

/// Sleeps toward the next scheduled check in one-second ticks, so the
/// process stays promptly killable without a dedicated signal handler.
fn sleep_with_ticks(mut remaining: Duration) {
    const TICK: Duration = Duration::from_secs(1);
    while !remaining.is_zero() {
        let step = remaining.min(TICK);
        std::thread::sleep(step);
        remaining = remaining.saturating_sub(step);
    }
}
