use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Aggregate progress of a partitioned copy.
///
/// Written only by the coordinator (once per poll tick), read by whatever renders progress.
#[derive(Debug)]
pub struct Progress {
    bytes_copied: AtomicU64,
    total_bytes: AtomicU64,
    workers_running: AtomicUsize,
    start_time: std::time::Instant,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Status {
    pub bytes_copied: u64,
    pub total_bytes: u64,
    pub workers_running: usize,
}

impl Progress {
    #[must_use]
    pub fn new() -> Self {
        Self {
            bytes_copied: AtomicU64::new(0),
            total_bytes: AtomicU64::new(0),
            workers_running: AtomicUsize::new(0),
            start_time: std::time::Instant::now(),
        }
    }

    pub fn set_total(&self, total_bytes: u64) {
        self.total_bytes.store(total_bytes, Ordering::Relaxed);
    }

    pub fn report(&self, bytes_copied: u64, workers_running: usize) {
        self.bytes_copied.store(bytes_copied, Ordering::Relaxed);
        self.workers_running
            .store(workers_running, Ordering::Relaxed);
    }

    #[must_use]
    pub fn get(&self) -> Status {
        let mut status = Status {
            bytes_copied: self.bytes_copied.load(Ordering::Relaxed),
            total_bytes: self.total_bytes.load(Ordering::Relaxed),
            workers_running: self.workers_running.load(Ordering::Relaxed),
        };
        if status.bytes_copied > status.total_bytes {
            tracing::debug!(
                "Progress inversion - copied: {}, total {}",
                status.bytes_copied,
                status.total_bytes
            );
            status.total_bytes = status.bytes_copied;
        }
        status
    }

    #[must_use]
    pub fn get_duration(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders [`Progress`] as periodic text updates, suitable for logs and non-interactive terminals.
pub struct ProgressPrinter<'a> {
    progress: &'a Progress,
    last_bytes: u64,
    last_update: std::time::Instant,
}

impl<'a> ProgressPrinter<'a> {
    #[must_use]
    pub fn new(progress: &'a Progress) -> Self {
        Self {
            progress,
            last_bytes: progress.get().bytes_copied,
            last_update: std::time::Instant::now(),
        }
    }

    pub fn print(&mut self) -> String {
        let time_now = std::time::Instant::now();
        let status = self.progress.get();
        let total_duration_secs = self.progress.get_duration().as_secs_f64();
        let curr_duration_secs = (time_now - self.last_update).as_secs_f64();
        let average_bytes_rate = status.bytes_copied as f64 / total_duration_secs;
        let current_bytes_rate =
            status.bytes_copied.saturating_sub(self.last_bytes) as f64 / curr_duration_secs;
        let percent = if status.total_bytes == 0 {
            100.0
        } else {
            status.bytes_copied as f64 * 100.0 / status.total_bytes as f64
        };
        self.last_bytes = status.bytes_copied;
        self.last_update = time_now;
        format!(
            "---------------------\n\
            COPIED:\n\
            done:    {:>10} / {} ({:.1}%)\n\
            average: {:>10}/s\n\
            current: {:>10}/s\n\
            workers: {:>10}",
            bytesize::ByteSize(status.bytes_copied),
            bytesize::ByteSize(status.total_bytes),
            percent,
            bytesize::ByteSize(average_bytes_rate as u64),
            bytesize::ByteSize(current_bytes_rate as u64),
            status.workers_running,
        )
    }
}
