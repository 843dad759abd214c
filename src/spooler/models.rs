/// Printer-level status bits as reported by the Windows print spooler
/// (the `Status` field of `PRINTER_INFO_2`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PrinterStatus(pub u32);

impl PrinterStatus {
    const BUSY: u32 = 0x200;
    const PRINTING: u32 = 0x400;
    const WAITING: u32 = 0x2000;
    const PROCESSING: u32 = 0x4000;
    const INITIALIZING: u32 = 0x8000;
    const WARMING_UP: u32 = 0x10000;

    /// Bits that mean the print engine is, or is about to be, moving
    /// media. Paused (0x1) is deliberately not in this set: a paused
    /// printer is not feeding media.
    const ENGINE_ACTIVE: u32 = Self::BUSY
        | Self::PRINTING
        | Self::WAITING
        | Self::PROCESSING
        | Self::INITIALIZING
        | Self::WARMING_UP;

    pub fn indicates_activity(self) -> bool {
        self.0 & Self::ENGINE_ACTIVE != 0
    }
}

/// Job-level status bits (the `Status` field of `JOB_INFO_1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JobStatus(pub u32);

impl JobStatus {
    const PAUSED: u32 = 0x1;
    const SPOOLING: u32 = 0x8;
    const PRINTING: u32 = 0x10;
    const BLOCKED: u32 = 0x200;
    const RESTART: u32 = 0x800;

    const ACTIVE: u32 =
        Self::PAUSED | Self::SPOOLING | Self::PRINTING | Self::BLOCKED | Self::RESTART;

    pub fn indicates_activity(self) -> bool {
        self.0 & Self::ACTIVE != 0
    }
}

/// One observation of the spooler's view of a printer: the printer-level
/// status word, the queue length and the status of every queued job.
#[derive(Debug, Clone, Default)]
pub struct SpoolerSnapshot {
    pub printer_status: PrinterStatus,
    pub pending_jobs: u32,
    pub job_statuses: Vec<JobStatus>,
}

impl SpoolerSnapshot {
    /// True when the printer status or any queued job signals that the
    /// device is (or will shortly be) working. While this holds, the
    /// vendor counters must not be trusted.
    pub fn indicates_activity(&self) -> bool {
        self.printer_status.indicates_activity()
            || self.pending_jobs > 0
            || self.job_statuses.iter().any(|job| job.indicates_activity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_snapshot_indicates_no_activity() {
        let snapshot = SpoolerSnapshot::default();
        assert!(!snapshot.indicates_activity());
    }

    #[test]
    fn printer_busy_bits_indicate_activity() {
        for bits in [0x200, 0x400, 0x2000, 0x4000, 0x8000, 0x10000] {
            let snapshot = SpoolerSnapshot {
                printer_status: PrinterStatus(bits),
                ..Default::default()
            };
            assert!(snapshot.indicates_activity(), "bits {bits:#x}");
        }
    }

    #[test]
    fn paused_printer_without_jobs_is_not_active() {
        // PRINTER_STATUS_PAUSED alone does not touch the media path.
        let snapshot = SpoolerSnapshot {
            printer_status: PrinterStatus(0x1),
            ..Default::default()
        };
        assert!(!snapshot.indicates_activity());
    }

    #[test]
    fn pending_job_count_indicates_activity() {
        let snapshot = SpoolerSnapshot {
            pending_jobs: 1,
            ..Default::default()
        };
        assert!(snapshot.indicates_activity());
    }

    #[test]
    fn active_job_bits_indicate_activity() {
        for bits in [0x1, 0x8, 0x10, 0x200, 0x800] {
            let snapshot = SpoolerSnapshot {
                job_statuses: vec![JobStatus(bits)],
                ..Default::default()
            };
            assert!(snapshot.indicates_activity(), "bits {bits:#x}");
        }
    }
}
