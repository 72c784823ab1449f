use anyhow::{anyhow, Context};
use tracing::instrument;

use crate::coordinator;
use crate::merge;
use crate::partition;
use crate::progress;
use crate::worker;

/// Phase of the partitioned copy in which an error occurred.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Invalid settings or a source whose size can't be determined; nothing was spawned.
    Planning,
    /// At least one copy worker failed; nothing was merged.
    Copy,
    /// Concatenating the partition outputs failed; the destination was not produced.
    Merge,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            Stage::Planning => "planning",
            Stage::Copy => "copy",
            Stage::Merge => "merge",
        };
        write!(f, "{name}")
    }
}

/// Error type for the partitioned copy that preserves the operation summary even on failure.
///
/// # Logging Convention
/// The Display implementation shows the full error chain, so any format specifier works:
/// ```ignore
/// tracing::error!("copy failed: {}", &error);
/// tracing::error!("copy failed: {:#}", &error);
/// ```
#[derive(Debug, thiserror::Error)]
#[error("{stage} failed: {source:#}")]
pub struct Error {
    #[source]
    pub source: anyhow::Error,
    pub stage: Stage,
    pub summary: Summary,
}

impl Error {
    #[must_use]
    pub fn new(source: anyhow::Error, stage: Stage, summary: Summary) -> Self {
        Error {
            source,
            stage,
            summary,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub bytes_copied: u64,
    pub parts_copied: usize,
    pub parts_failed: usize,
    pub parts_merged: usize,
}

impl std::ops::Add for Summary {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            bytes_copied: self.bytes_copied + other.bytes_copied,
            parts_copied: self.parts_copied + other.parts_copied,
            parts_failed: self.parts_failed + other.parts_failed,
            parts_merged: self.parts_merged + other.parts_merged,
        }
    }
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "bytes copied: {}\n\
            parts copied: {}\n\
            parts failed: {}\n\
            parts merged: {}",
            bytesize::ByteSize(self.bytes_copied),
            self.parts_copied,
            self.parts_failed,
            self.parts_merged,
        )
    }
}

#[derive(Copy, Clone, Debug)]
pub struct Settings {
    /// Number of partitions, and therefore of concurrent workers
    pub parts: usize,
    /// Largest single read/write issued by a worker (bytes)
    pub block_size: u64,
    /// How often the coordinator polls workers for progress
    pub poll_interval: std::time::Duration,
}

pub const DEFAULT_PARTS: usize = 5;
pub const DEFAULT_BLOCK_SIZE: u64 = 1024 * 1024;
pub const DEFAULT_POLL_INTERVAL: std::time::Duration = std::time::Duration::from_secs(1);

impl Default for Settings {
    fn default() -> Self {
        Self {
            parts: DEFAULT_PARTS,
            block_size: DEFAULT_BLOCK_SIZE,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl Settings {
    /// Validate settings and return errors if invalid
    pub fn validate(&self) -> Result<(), String> {
        if self.parts == 0 {
            return Err("number of parts must be at least 1".to_string());
        }
        if self.block_size == 0 {
            return Err("block size must be greater than 0".to_string());
        }
        if self.poll_interval.is_zero() {
            return Err("poll interval must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Removes whatever partition outputs exist. Used when a copy is abandoned before merging.
async fn discard_parts(dst: &std::path::Path, parts: usize) {
    for index in 0..parts {
        let part = worker::part_path(dst, index);
        match tokio::fs::remove_file(&part).await {
            Ok(()) => tracing::debug!("removed {:?}", &part),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
            Err(error) => tracing::warn!("failed removing {:?}: {}", &part, &error),
        }
    }
}

/// Fails if `src` is the same file as one of the partition outputs of `dst`. A worker would
/// truncate it while the others are still reading.
async fn check_source_is_not_a_part(
    src: &std::path::Path,
    dst: &std::path::Path,
    parts: usize,
) -> anyhow::Result<()> {
    let src_canonical = tokio::fs::canonicalize(src)
        .await
        .with_context(|| format!("failed resolving {src:?}"))?;
    for index in 0..parts {
        let part = worker::part_path(dst, index);
        match tokio::fs::canonicalize(&part).await {
            Ok(part_canonical) if part_canonical == src_canonical => {
                return Err(anyhow!(
                    "source {:?} would be overwritten by partition output {:?}",
                    src,
                    &part
                ));
            }
            Ok(_) => {}
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
            Err(error) => {
                return Err(error).with_context(|| format!("failed resolving {part:?}"));
            }
        }
    }
    Ok(())
}

/// Copies `src` to `dst` by splitting it into `settings.parts` ranges copied concurrently and
/// merged in order afterwards.
#[instrument(skip(prog_track))]
pub async fn copy(
    prog_track: &progress::Progress,
    src: &std::path::Path,
    dst: &std::path::Path,
    settings: &Settings,
) -> Result<Summary, Error> {
    settings
        .validate()
        .map_err(|msg| Error::new(anyhow!(msg), Stage::Planning, Default::default()))?;
    tracing::debug!("reading source metadata");
    let src_metadata = tokio::fs::metadata(src)
        .await
        .with_context(|| format!("failed reading metadata from {src:?}"))
        .map_err(|err| Error::new(err, Stage::Planning, Default::default()))?;
    if !src_metadata.is_file() {
        return Err(Error::new(
            anyhow!(
                "{:?} is not a regular file: {:?}",
                src,
                src_metadata.file_type()
            ),
            Stage::Planning,
            Default::default(),
        ));
    }
    check_source_is_not_a_part(src, dst, settings.parts)
        .await
        .map_err(|err| Error::new(err, Stage::Planning, Default::default()))?;
    let file_size = src_metadata.len();
    let partitions = partition::plan(file_size, settings.parts)
        .map_err(|err| Error::new(err.into(), Stage::Planning, Default::default()))?;
    prog_track.set_total(file_size);
    tracing::info!(
        "copying {} bytes from {:?} to {:?} using {} workers",
        file_size,
        src,
        dst,
        partitions.len()
    );
    let copy_summary = match coordinator::run(prog_track, src, dst, &partitions, settings).await {
        Ok(summary) => summary,
        Err(error) => {
            tracing::info!("copy failed, discarding partial outputs");
            discard_parts(dst, settings.parts).await;
            return Err(error);
        }
    };
    tracing::info!("merging {} copied parts", partitions.len());
    let merge_summary = merge::merge(dst, partitions.len())
        .await
        .map_err(|mut err| {
            err.summary = copy_summary + err.summary;
            err
        })?;
    tracing::info!("copy of {:?} complete", src);
    Ok(copy_summary + merge_summary)
}
