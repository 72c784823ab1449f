use anyhow::{anyhow, Context};
use tokio::io::AsyncWriteExt;
use tracing::instrument;

use crate::copy::{Error, Stage, Summary};
use crate::worker::part_path;

/// Concatenates the partition outputs of `dst` into `dst` itself.
///
/// Parts `1..parts` are appended to part 0 in ascending index order, each one deleted once it
/// has been consumed, and part 0 is finally renamed to `dst`. A missing or unreadable part aborts
/// the merge before the rename, so a partially merged file is never presented as `dst`.
#[instrument]
pub async fn merge(dst: &std::path::Path, parts: usize) -> Result<Summary, Error> {
    if parts == 0 {
        return Err(Error::new(
            anyhow!("nothing to merge into {:?}", dst),
            Stage::Merge,
            Default::default(),
        ));
    }
    let mut summary = Summary::default();
    let first = part_path(dst, 0);
    let mut writer = tokio::fs::OpenOptions::new()
        .append(true)
        .open(&first)
        .await
        .with_context(|| format!("cannot open {first:?} for appending"))
        .map_err(|err| Error::new(err, Stage::Merge, summary))?;
    summary.parts_merged += 1;
    for index in 1..parts {
        let part = part_path(dst, index);
        tracing::debug!("appending {:?}", &part);
        let mut reader = tokio::fs::File::open(&part)
            .await
            .with_context(|| format!("cannot open {part:?} for reading"))
            .map_err(|err| Error::new(err, Stage::Merge, summary))?;
        let bytes = tokio::io::copy(&mut reader, &mut writer)
            .await
            .with_context(|| format!("failed appending {part:?} to {first:?}"))
            .map_err(|err| Error::new(err, Stage::Merge, summary))?;
        drop(reader);
        tokio::fs::remove_file(&part)
            .await
            .with_context(|| format!("failed removing {part:?}"))
            .map_err(|err| Error::new(err, Stage::Merge, summary))?;
        tracing::trace!("appended {} bytes from {:?}", bytes, &part);
        summary.parts_merged += 1;
    }
    writer
        .flush()
        .await
        .with_context(|| format!("failed flushing {first:?}"))
        .map_err(|err| Error::new(err, Stage::Merge, summary))?;
    drop(writer);
    tokio::fs::rename(&first, dst)
        .await
        .with_context(|| format!("failed renaming {first:?} to {dst:?}"))
        .map_err(|err| Error::new(err, Stage::Merge, summary))?;
    Ok(summary)
}
