use std::time::{Duration, Instant};

use chrono::Local;
use log::{error, info, warn};

use crate::mail::client::AlertTransport;
use crate::mail::models::LowSupplyAlert;
use crate::spooler::probe::{SpoolerError, SpoolerProbe};
use crate::vendor::client::{discover_port, read_counters, CounterSource};
use crate::vendor::models::CounterReading;

use super::idle::IdleTracker;

/// What a single check cycle decided. Every variant short of `Checked`
/// means the counters were deliberately left alone this cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// The spooler reported activity; counters were not touched.
    SpoolerBusy { pending_jobs: u32 },
    /// The spooler is quiet but the engine may still be finishing.
    WithinGrace { idle_for: Duration },
    /// No vendor port answered; printer disconnected or mid-print.
    PortNotFound,
    /// The required counter read failed at the native layer.
    ReadFailed,
    /// Counters were read; `alert_sent` is true only on a delivered mail.
    Checked {
        reading: CounterReading,
        percent: Option<f64>,
        alert_sent: bool,
    },
}

/// Remaining supply as a percentage, when the roll capacity is known and
/// positive. Computed as `remaining * 100 / initial` so that clean ratios
/// stay exact in floating point.
pub fn remaining_percent(remaining: i32, initial: Option<i32>) -> Option<f64> {
    match initial {
        Some(initial) if initial > 0 => Some(remaining as f64 * 100.0 / initial as f64),
        _ => None,
    }
}

/// Runs one supply check, strictly sequentially: probe the spooler, wait
/// out the grace window, discover the vendor port, read the counters and
/// finally evaluate the alert threshold.
///
/// A failed alert send is logged here and never propagated; a failed
/// spooler probe aborts the cycle with an error. There is no alert
/// de-duplication: every cycle below the threshold mails again.
pub fn run_cycle<S, C, M>(
    printer_name: &str,
    threshold_percent: f64,
    spooler: &S,
    counters: &C,
    mailer: &M,
    tracker: &mut IdleTracker,
    now: Instant,
) -> Result<CycleOutcome, SpoolerError>
where
    S: SpoolerProbe,
    C: CounterSource,
    M: AlertTransport,
{
    let snapshot = spooler.probe(printer_name)?;
    tracker.observe(&snapshot, now);

    if snapshot.indicates_activity() {
        info!(
            "Spooler busy for '{printer_name}' ({} job(s) pending), leaving the counters alone.",
            snapshot.pending_jobs
        );
        print_status_line(printer_name, "busy", None, None, "no alert");
        return Ok(CycleOutcome::SpoolerBusy { pending_jobs: snapshot.pending_jobs });
    }

    if !tracker.is_effectively_idle(&snapshot, now) {
        let idle_for = tracker.idle_for(now);
        info!(
            "'{printer_name}' idle for {}, waiting out the {} grace window.",
            humantime::format_duration(idle_for),
            humantime::format_duration(tracker.grace())
        );
        print_status_line(printer_name, "settling", None, None, "no alert");
        return Ok(CycleOutcome::WithinGrace { idle_for });
    }

    let Some(port) = discover_port(counters) else {
        warn!("No vendor port answered for '{printer_name}'; is the printer connected?");
        print_status_line(printer_name, "idle", None, None, "no alert");
        return Ok(CycleOutcome::PortNotFound);
    };

    let reading = match read_counters(counters, port) {
        Ok(reading) => reading,
        Err(e) => {
            error!("Counter read failed on port {port}: {e}");
            print_status_line(printer_name, "idle", None, None, "no alert");
            return Ok(CycleOutcome::ReadFailed);
        }
    };

    let percent = remaining_percent(reading.remaining, reading.initial);

    let mut alert_sent = false;
    let mut alert_note = "no alert";
    if let (Some(percent), Some(initial)) = (percent, reading.initial) {
        if percent < threshold_percent {
            let alert = LowSupplyAlert {
                printer_name: printer_name.to_string(),
                remaining: reading.remaining,
                initial,
                percent,
            };
            match mailer.send(&alert) {
                Ok(()) => {
                    info!("Low-supply alert sent for '{printer_name}' ({percent:.1}% remaining).");
                    alert_sent = true;
                    alert_note = "alert sent";
                }
                Err(e) => {
                    error!("Low-supply alert could not be sent: {e}");
                    alert_note = "alert failed";
                }
            }
        }
    }

    print_status_line(printer_name, "idle", Some(&reading), percent, alert_note);
    Ok(CycleOutcome::Checked { reading, percent, alert_sent })
}

/// The one console line per cycle: timestamp, busy/idle decision,
/// remaining/total, percent and the alert decision.
fn print_status_line(
    printer_name: &str,
    state: &str,
    reading: Option<&CounterReading>,
    percent: Option<f64>,
    alert_note: &str,
) {
    let counters = match reading {
        Some(reading) => {
            let initial = reading
                .initial
                .map_or_else(|| "?".to_string(), |initial| initial.to_string());
            format!("remaining {}/{initial}", reading.remaining)
        }
        None => "remaining ?/?".to_string(),
    };
    let percent = percent.map_or_else(|| "n/a".to_string(), |p| format!("{p:.1}%"));
    println!(
        "[{}] {printer_name}: {state}, {counters} ({percent}), {alert_note}",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );
}
