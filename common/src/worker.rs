use anyhow::{anyhow, Context};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tracing::instrument;

use crate::channel;
use crate::partition::Partition;

/// Failure inside a single copy worker.
///
/// Carries how far the worker got so the coordinator can account for partial progress.
#[derive(Debug, thiserror::Error)]
#[error("{partition} failed after copying {bytes_copied} bytes: {source:#}")]
pub struct Error {
    #[source]
    pub source: anyhow::Error,
    pub partition: Partition,
    pub bytes_copied: u64,
}

impl Error {
    #[must_use]
    pub fn new(source: anyhow::Error, partition: Partition, bytes_copied: u64) -> Self {
        Error {
            source,
            partition,
            bytes_copied,
        }
    }
}

/// Name of the intermediate output for partition `index`: `"<dst>.<index>"`.
#[must_use]
pub fn part_path(dst: &std::path::Path, index: usize) -> std::path::PathBuf {
    let mut name = dst.as_os_str().to_owned();
    name.push(format!(".{index}"));
    std::path::PathBuf::from(name)
}

/// Copies exactly `partition.len()` bytes starting at `partition.start` of `src` into the
/// partition output derived from `dst`.
///
/// Data moves in blocks of at most `block_size` bytes. After every block a pending progress
/// request, if any, is answered with the running total. Returns the number of bytes copied,
/// which on success always equals the partition length.
#[instrument(skip(channel))]
pub async fn copy_partition(
    src: &std::path::Path,
    dst: &std::path::Path,
    partition: Partition,
    block_size: u64,
    mut channel: channel::WorkerEnd,
) -> Result<u64, Error> {
    if block_size == 0 {
        return Err(Error::new(
            anyhow!("block size must be greater than 0"),
            partition,
            0,
        ));
    }
    let out_path = part_path(dst, partition.index);
    tracing::debug!("opening {:?} for reading and {:?} for writing", src, &out_path);
    let mut reader = tokio::fs::File::open(src)
        .await
        .with_context(|| format!("cannot open {src:?} for reading"))
        .map_err(|err| Error::new(err, partition, 0))?;
    reader
        .seek(std::io::SeekFrom::Start(partition.start))
        .await
        .with_context(|| format!("failed seeking {src:?} to offset {}", partition.start))
        .map_err(|err| Error::new(err, partition, 0))?;
    let mut writer = tokio::fs::File::create(&out_path)
        .await
        .with_context(|| format!("cannot open {out_path:?} for writing"))
        .map_err(|err| Error::new(err, partition, 0))?;
    let length = partition.len();
    let buffer_size = usize::try_from(block_size.min(length))
        .with_context(|| format!("block size {block_size} does not fit in memory"))
        .map_err(|err| Error::new(err, partition, 0))?;
    let mut buffer = vec![0u8; buffer_size];
    let mut bytes_copied = 0u64;
    while bytes_copied < length {
        // fits: bounded by buffer_size which is a usize
        let chunk = (length - bytes_copied).min(block_size) as usize;
        reader
            .read_exact(&mut buffer[..chunk])
            .await
            .with_context(|| {
                format!(
                    "failed reading {} bytes from {:?} at offset {}",
                    chunk,
                    src,
                    partition.start + bytes_copied
                )
            })
            .map_err(|err| Error::new(err, partition, bytes_copied))?;
        writer
            .write_all(&buffer[..chunk])
            .await
            .with_context(|| format!("failed writing to {out_path:?}"))
            .map_err(|err| Error::new(err, partition, bytes_copied))?;
        bytes_copied += chunk as u64;
        if channel.answer_pending(bytes_copied) {
            tracing::trace!("reported {bytes_copied} bytes");
        }
    }
    writer
        .flush()
        .await
        .with_context(|| format!("failed flushing {out_path:?}"))
        .map_err(|err| Error::new(err, partition, bytes_copied))?;
    tracing::debug!("copied {bytes_copied} bytes");
    Ok(bytes_copied)
}
