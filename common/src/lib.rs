//! Partitioned parallel copy engine shared by the `pcp` tool
//!
//! A single large file is copied by splitting it into N contiguous byte ranges, copying every
//! range concurrently into its own intermediate file, and concatenating the intermediates into
//! the destination once all of them are done. This helps when throughput is bounded by
//! per-stream latency (e.g. network filesystems) rather than by raw disk bandwidth.
//!
//! # Components
//!
//! - [`partition`] - computes the byte ranges, a pure function of file size and part count
//! - [`worker`] - copies one range into `"<dst>.<index>"` in fixed-size blocks
//! - [`channel`] - request/report protocol used to query a worker for progress without ever
//!   blocking its copy loop
//! - [`coordinator`] - spawns the workers, polls them on a fixed interval and aggregates progress
//! - [`merge`] - appends the intermediates in index order and renames the result into place
//! - [`copy`] - the whole operation: plan, copy, merge
//!
//! ```text
//! plan(size, parts) ──> coordinator ──spawns──> worker 0 ──writes──> dst.0 ─┐
//!                           │   ▲               worker 1 ──writes──> dst.1 ─┤
//!                   Request │   │ Report        ...                         ├─merge─> dst
//!                           ▼   │               worker N-1 ─writes─> dst.N-1┘
//! ```
//!
//! # Failure model
//!
//! Errors carry the [`copy::Stage`] they happened in:
//!
//! - **Planning** - bad settings, or a source that is missing or not a regular file. Nothing is
//!   spawned.
//! - **Copy** - a worker hit an I/O error. Workers report an explicit terminal status, so a
//!   failed worker is never mistaken for a completed one. The remaining workers run to
//!   completion (there is no cancellation), then all intermediates are removed and nothing is
//!   merged.
//! - **Merge** - an intermediate is missing or unreadable. The final rename is skipped so a
//!   partially merged file never appears under the destination name.
//!
//! # Progress
//!
//! The coordinator publishes `(bytes copied, total bytes)` into a [`progress::Progress`] once per
//! tick. [`run`] renders it on stderr as a progress bar or as periodic text updates.

use std::io::IsTerminal;

pub mod channel;
pub mod config;
pub mod coordinator;
pub mod copy;
pub mod merge;
pub mod partition;
pub mod progress;
pub mod testutils;
pub mod worker;

pub use config::{OutputConfig, ProgressSettings, ProgressType, RuntimeConfig};

static PROGRESS: std::sync::LazyLock<progress::Progress> =
    std::sync::LazyLock::new(progress::Progress::new);

/// Copies `src` to `dst` in parallel, tracking progress in the process-wide tracker that [`run`]
/// displays.
pub async fn copy(
    src: &std::path::Path,
    dst: &std::path::Path,
    settings: &copy::Settings,
) -> Result<copy::Summary, copy::Error> {
    copy::copy(&PROGRESS, src, dst, settings).await
}

enum ProgressDisplay {
    Bar(indicatif::ProgressBar),
    Text(progress::ProgressPrinter<'static>),
}

impl ProgressDisplay {
    fn new(progress: &'static progress::Progress, progress_type: ProgressType) -> Self {
        match progress_type {
            ProgressType::TextUpdates => Self::Text(progress::ProgressPrinter::new(progress)),
            ProgressType::ProgressBar | ProgressType::Auto => {
                let bar = indicatif::ProgressBar::new(progress.get().total_bytes);
                let style = indicatif::ProgressStyle::with_template(
                    "{spinner} [{elapsed_precise}] [{wide_bar}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})",
                )
                .unwrap_or_else(|_| indicatif::ProgressStyle::default_bar());
                bar.set_style(style);
                Self::Bar(bar)
            }
        }
    }

    fn update(&mut self, progress: &progress::Progress) {
        match self {
            Self::Bar(bar) => {
                let status = progress.get();
                bar.set_length(status.total_bytes);
                bar.set_position(status.bytes_copied);
            }
            Self::Text(printer) => eprintln!("{}", printer.print()),
        }
    }

    fn finish(&mut self, progress: &progress::Progress) {
        self.update(progress);
        if let Self::Bar(bar) = self {
            bar.finish();
        }
    }
}

/// Renders progress on a background thread until dropped.
struct ProgressTracker {
    done: std::sync::Arc<(std::sync::Mutex<bool>, std::sync::Condvar)>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl ProgressTracker {
    fn new(
        progress: &'static progress::Progress,
        progress_type: ProgressType,
        delay: std::time::Duration,
    ) -> Self {
        let done = std::sync::Arc::new((std::sync::Mutex::new(false), std::sync::Condvar::new()));
        let thread = {
            let done = done.clone();
            std::thread::spawn(move || {
                let mut display = ProgressDisplay::new(progress, progress_type);
                let (lock, cvar) = &*done;
                let mut is_done = match lock.lock() {
                    Ok(guard) => guard,
                    Err(poisoned) => poisoned.into_inner(),
                };
                while !*is_done {
                    display.update(progress);
                    is_done = match cvar.wait_timeout(is_done, delay) {
                        Ok((guard, _)) => guard,
                        Err(poisoned) => poisoned.into_inner().0,
                    };
                }
                display.finish(progress);
            })
        };
        Self {
            done,
            thread: Some(thread),
        }
    }
}

impl Drop for ProgressTracker {
    fn drop(&mut self) {
        let (lock, cvar) = &*self.done;
        match lock.lock() {
            Ok(mut is_done) => *is_done = true,
            Err(poisoned) => *poisoned.into_inner() = true,
        }
        cvar.notify_one();
        let panicked = self
            .thread
            .take()
            .is_some_and(|thread| thread.join().is_err());
        if panicked {
            tracing::error!("progress thread panicked");
        }
    }
}

fn init_logging(output: &OutputConfig) {
    if output.quiet {
        return;
    }
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(output.log_level()));
    if let Err(error) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stdout)
        .try_init()
    {
        eprintln!("failed to initialize logging: {error}");
    }
}

/// Sets up logging, the tokio runtime and the progress display, then runs `func` to completion.
///
/// Returns `None` if anything failed; the error has already been logged (unless quiet).
pub fn run<Fut, Summary, Error>(
    progress: Option<ProgressSettings>,
    output: OutputConfig,
    runtime: RuntimeConfig,
    func: impl FnOnce() -> Fut,
) -> Option<Summary>
where
    Summary: std::fmt::Display,
    Error: std::fmt::Display,
    Fut: std::future::Future<Output = Result<Summary, Error>>,
{
    init_logging(&output);
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if runtime.max_workers > 0 {
        builder.worker_threads(runtime.max_workers);
    }
    if runtime.max_blocking_threads > 0 {
        builder.max_blocking_threads(runtime.max_blocking_threads);
    }
    let tokio_runtime = match builder.build() {
        Ok(tokio_runtime) => tokio_runtime,
        Err(error) => {
            tracing::error!("failed to start tokio runtime: {}", &error);
            return None;
        }
    };
    let progress = match progress
        .map(|settings| settings.resolve(std::io::stderr().is_terminal()))
        .transpose()
    {
        Ok(progress) => progress,
        Err(error) => {
            tracing::error!("{:#}", &error);
            return None;
        }
    };
    let res = {
        let _tracker = progress.map(|(progress_type, delay)| {
            ProgressTracker::new(&PROGRESS, progress_type, delay)
        });
        tokio_runtime.block_on(func())
    };
    match res {
        Ok(summary) => {
            if output.print_summary || output.verbose > 0 {
                println!("{summary}");
            }
            Some(summary)
        }
        Err(error) => {
            if !output.quiet {
                tracing::error!("{:#}", &error);
            }
            None
        }
    }
}
