//! Spawns one copy worker per partition and tracks them until all have exited
//!
//! Each worker is a tokio task owning one partition and one [`channel::WorkerEnd`]. On every tick
//! the coordinator reaps workers that finished, collecting their terminal status, and asks the
//! rest for progress. The sum of everything it knows is published to [`progress::Progress`].

use anyhow::anyhow;
use tracing::instrument;

use crate::channel;
use crate::copy::{Error, Settings, Stage, Summary};
use crate::partition::Partition;
use crate::progress;
use crate::worker;

/// Coordinator-private view of a single running worker.
struct WorkerHandle {
    partition: Partition,
    task: tokio::task::JoinHandle<Result<u64, worker::Error>>,
    channel: channel::CoordinatorEnd,
    bytes_copied: u64,
}

impl WorkerHandle {
    fn spawn(
        src: &std::path::Path,
        dst: &std::path::Path,
        partition: Partition,
        block_size: u64,
    ) -> Self {
        let (coordinator_end, worker_end) = channel::progress_channel();
        let src = src.to_path_buf();
        let dst = dst.to_path_buf();
        let task = tokio::spawn(async move {
            worker::copy_partition(&src, &dst, partition, block_size, worker_end).await
        });
        Self {
            partition,
            task,
            channel: coordinator_end,
            bytes_copied: 0,
        }
    }

    /// Picks up the answer to the previous request, if it arrived, and asks again.
    fn update(&mut self) {
        if let Some(report) = self.channel.try_report() {
            self.bytes_copied = report.bytes_copied;
        }
        self.channel.request();
    }
}

/// Outcome of a worker that has exited.
enum Finished {
    Copied(u64),
    Failed { bytes_copied: u64, reason: String },
}

async fn reap(handle: WorkerHandle) -> Finished {
    match handle.task.await {
        Ok(Ok(bytes_copied)) => {
            tracing::debug!("{} finished", handle.partition);
            Finished::Copied(bytes_copied)
        }
        Ok(Err(error)) => {
            tracing::error!("{:#}", &error);
            Finished::Failed {
                bytes_copied: error.bytes_copied,
                reason: format!("{error:#}"),
            }
        }
        // panics abort the process outside of tests, so this is only reached under cargo test
        Err(error) => {
            tracing::error!("{} worker terminated abnormally: {}", handle.partition, &error);
            Finished::Failed {
                bytes_copied: handle.bytes_copied,
                reason: format!("{} worker terminated abnormally: {}", handle.partition, error),
            }
        }
    }
}

/// Copies every partition concurrently and returns once all workers have exited.
///
/// Progress is published once per `settings.poll_interval`. There is no cancellation: a failing
/// worker does not stop the others. If any worker failed the result is a [`Stage::Copy`] error
/// whose summary counts both the completed and the failed parts.
#[instrument(skip(prog_track, partitions))]
pub async fn run(
    prog_track: &progress::Progress,
    src: &std::path::Path,
    dst: &std::path::Path,
    partitions: &[Partition],
    settings: &Settings,
) -> Result<Summary, Error> {
    // partitions are already planned, only the polling and block settings matter here
    if settings.block_size == 0 {
        return Err(Error::new(
            anyhow!("block size must be greater than 0"),
            Stage::Planning,
            Default::default(),
        ));
    }
    if settings.poll_interval.is_zero() {
        return Err(Error::new(
            anyhow!("poll interval must be greater than 0"),
            Stage::Planning,
            Default::default(),
        ));
    }
    let mut running: Vec<WorkerHandle> = partitions
        .iter()
        .map(|partition| WorkerHandle::spawn(src, dst, *partition, settings.block_size))
        .collect();
    tracing::debug!("spawned {} workers", running.len());
    let mut summary = Summary::default();
    let mut failures = Vec::new();
    let mut ticker = tokio::time::interval(settings.poll_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let mut still_running = Vec::with_capacity(running.len());
        for mut handle in running {
            if !handle.task.is_finished() {
                handle.update();
                still_running.push(handle);
                continue;
            }
            match reap(handle).await {
                Finished::Copied(bytes_copied) => {
                    summary.bytes_copied += bytes_copied;
                    summary.parts_copied += 1;
                }
                Finished::Failed {
                    bytes_copied,
                    reason,
                } => {
                    summary.bytes_copied += bytes_copied;
                    summary.parts_failed += 1;
                    failures.push(reason);
                }
            }
        }
        running = still_running;
        let in_flight: u64 = running.iter().map(|handle| handle.bytes_copied).sum();
        prog_track.report(summary.bytes_copied + in_flight, running.len());
        tracing::trace!(
            "{} bytes copied, {} workers running",
            summary.bytes_copied + in_flight,
            running.len()
        );
        if running.is_empty() {
            break;
        }
    }
    if !failures.is_empty() {
        return Err(Error::new(
            anyhow!(
                "{} of {} parts failed:\n{}",
                failures.len(),
                partitions.len(),
                failures.join("\n")
            ),
            Stage::Copy,
            summary,
        ));
    }
    Ok(summary)
}
