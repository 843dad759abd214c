use snafu::Snafu;

use super::models::SpoolerSnapshot;

/// Source of [`SpoolerSnapshot`]s. The production implementation talks to
/// the Windows print spooler; tests substitute canned snapshots.
pub trait SpoolerProbe {
    fn probe(&self, printer_name: &str) -> Result<SpoolerSnapshot, SpoolerError>;
}

/// Queries the OS print spooler for the named printer.
pub struct SystemSpooler;

impl SpoolerProbe for SystemSpooler {
    #[cfg(windows)]
    fn probe(&self, printer_name: &str) -> Result<SpoolerSnapshot, SpoolerError> {
        winspool::query(printer_name)
    }

    #[cfg(not(windows))]
    fn probe(&self, _printer_name: &str) -> Result<SpoolerSnapshot, SpoolerError> {
        UnsupportedPlatformSnafu.fail()
    }
}

// ////// //
// Errors //
// ////// //

#[derive(Debug, Snafu)]
pub enum SpoolerError {
    #[snafu(display("Could not open printer '{printer}' (Win32 error {code})"))]
    OpenPrinter { printer: String, code: u32 },

    #[snafu(display("{call} failed for printer '{printer}' (Win32 error {code})"))]
    Query { printer: String, call: &'static str, code: u32 },

    #[snafu(display("Print spooler queries are only available on Windows"))]
    UnsupportedPlatform,
}

/// Copies `count` records of `T` out of a byte buffer the spooler filled.
///
/// The spooler writes its record arrays into caller-supplied byte buffers,
/// and a `Vec<u8>` allocation carries no alignment guarantee for `T`, so
/// each record must be copied out unaligned instead of referenced in place.
#[cfg(any(windows, test))]
fn read_records<T: Copy>(buffer: &[u8], count: usize) -> Vec<T> {
    assert!(buffer.len() >= count * std::mem::size_of::<T>());
    (0..count)
        // SAFETY: the bounds check above keeps every read inside `buffer`,
        // and read_unaligned places no alignment requirement on the source.
        .map(|i| unsafe { std::ptr::read_unaligned((buffer.as_ptr() as *const T).add(i)) })
        .collect()
}

// /////////////// //
// Windows backend //
// /////////////// //

#[cfg(windows)]
mod winspool {
    use std::ffi::c_void;
    use std::ptr;

    use windows_sys::Win32::Foundation::GetLastError;
    use windows_sys::Win32::Graphics::Printing::{
        ClosePrinter, EnumJobsW, GetPrinterW, OpenPrinterW, JOB_INFO_1W, PRINTER_INFO_2W,
    };

    use super::{read_records, OpenPrinterSnafu, QuerySnafu, SpoolerError};
    use crate::spooler::models::{JobStatus, PrinterStatus, SpoolerSnapshot};

    struct PrinterHandle(*mut c_void);

    impl Drop for PrinterHandle {
        fn drop(&mut self) {
            // SAFETY: the handle came from a successful OpenPrinterW.
            unsafe { ClosePrinter(self.0) };
        }
    }

    pub(super) fn query(printer_name: &str) -> Result<SpoolerSnapshot, SpoolerError> {
        let wide: Vec<u16> = printer_name.encode_utf16().chain(std::iter::once(0)).collect();

        let mut raw: *mut c_void = ptr::null_mut();
        // SAFETY: `wide` is a NUL-terminated UTF-16 string; OpenPrinterW does
        // not write through the name pointer despite its mutable type.
        let opened = unsafe { OpenPrinterW(wide.as_ptr() as *mut u16, &mut raw, ptr::null_mut()) };
        if opened == 0 {
            return OpenPrinterSnafu {
                printer: printer_name,
                code: unsafe { GetLastError() },
            }
            .fail();
        }
        let handle = PrinterHandle(raw);

        let info = printer_info(&handle, printer_name)?;
        let printer_status = PrinterStatus(info.Status);
        let pending_jobs = info.cJobs;

        let job_statuses = if pending_jobs > 0 {
            enum_job_statuses(&handle, printer_name, pending_jobs)?
        } else {
            Vec::new()
        };

        Ok(SpoolerSnapshot { printer_status, pending_jobs, job_statuses })
    }

    fn printer_info(handle: &PrinterHandle, printer_name: &str) -> Result<PRINTER_INFO_2W, SpoolerError> {
        let mut needed = 0u32;
        // First call sizes the buffer, second call fills it.
        unsafe { GetPrinterW(handle.0, 2, ptr::null_mut(), 0, &mut needed) };
        if needed == 0 {
            return QuerySnafu {
                printer: printer_name,
                call: "GetPrinter",
                code: unsafe { GetLastError() },
            }
            .fail();
        }

        let mut buffer = vec![0u8; needed as usize];
        let ok = unsafe { GetPrinterW(handle.0, 2, buffer.as_mut_ptr(), needed, &mut needed) };
        if ok == 0 {
            return QuerySnafu {
                printer: printer_name,
                call: "GetPrinter",
                code: unsafe { GetLastError() },
            }
            .fail();
        }

        // SAFETY: a successful level-2 GetPrinterW call places a
        // PRINTER_INFO_2W at the start of the buffer.
        Ok(unsafe { ptr::read_unaligned(buffer.as_ptr() as *const PRINTER_INFO_2W) })
    }

    fn enum_job_statuses(
        handle: &PrinterHandle,
        printer_name: &str,
        job_count: u32,
    ) -> Result<Vec<JobStatus>, SpoolerError> {
        let mut needed = 0u32;
        let mut returned = 0u32;
        unsafe {
            EnumJobsW(handle.0, 0, job_count, 1, ptr::null_mut(), 0, &mut needed, &mut returned)
        };
        if needed == 0 {
            return Ok(Vec::new());
        }

        let mut buffer = vec![0u8; needed as usize];
        let ok = unsafe {
            EnumJobsW(
                handle.0,
                0,
                job_count,
                1,
                buffer.as_mut_ptr(),
                needed,
                &mut needed,
                &mut returned,
            )
        };
        if ok == 0 {
            return QuerySnafu {
                printer: printer_name,
                call: "EnumJobs",
                code: unsafe { GetLastError() },
            }
            .fail();
        }

        // A successful level-1 EnumJobsW call places `returned` JOB_INFO_1W
        // records at the start of the buffer.
        let jobs = read_records::<JOB_INFO_1W>(&buffer, returned as usize);
        Ok(jobs.iter().map(|job| JobStatus(job.Status)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::read_records;

    // Stand-in for a spooler record: pointer-aligned, like JOB_INFO_1W.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    #[repr(C)]
    struct Record {
        name: u64,
        status: u32,
        priority: u32,
    }

    #[test]
    fn records_survive_a_misaligned_buffer() {
        let records = [
            Record { name: 1, status: 0x10, priority: 1 },
            Record { name: 2, status: 0x200, priority: 99 },
        ];
        let size = std::mem::size_of::<Record>();

        // Offset the records by one byte so they cannot be aligned for a
        // direct reinterpretation of the buffer.
        let mut bytes = vec![0u8; 1 + size * records.len()];
        for (i, record) in records.iter().enumerate() {
            let src = record as *const Record as *const u8;
            unsafe {
                std::ptr::copy_nonoverlapping(src, bytes.as_mut_ptr().add(1 + i * size), size)
            };
        }

        let out: Vec<Record> = read_records(&bytes[1..], records.len());
        assert_eq!(out, records);
    }

    #[test]
    fn zero_records_read_as_empty() {
        let out: Vec<Record> = read_records(&[], 0);
        assert!(out.is_empty());
    }
}
