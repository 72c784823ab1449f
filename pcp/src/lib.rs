//! Parallel file copy tool - `pcp`
//!
//! `pcp` copies a single large file by splitting it into several contiguous byte ranges that are
//! copied concurrently and then stitched back together. It helps when copy throughput is limited
//! by per-stream latency or bandwidth sharing (typically network mounted filesystems) rather than
//! by the disks themselves, at the cost of extra local disk I/O for the merge.
//!
//! # Usage
//!
//! ```bash
//! # copy in 5 parts (the default) with a progress bar
//! pcp /mnt/nfs/big.iso /data/big.iso --progress
//!
//! # copy into an existing directory using 8 parts and 4 MiB blocks
//! pcp /mnt/nfs/big.iso /data/ --parts 8 --block-size 4MiB --summary
//! ```
//!
//! # How It Works
//!
//! 1. The source size is read once and split into `--parts` ranges of (nearly) equal length
//! 2. One worker per range copies it into `<destination>.<index>`
//! 3. Every `--poll-interval` the coordinator asks each worker how far it got and publishes the
//!    total for the progress display
//! 4. Once every worker has exited the parts are appended to `<destination>.0` in order and the
//!    result is renamed to `<destination>`
//!
//! If any worker fails, the remaining ones still finish, then all parts are removed and `pcp`
//! exits with an error without producing the destination.
//!
//! # Destination Semantics
//!
//! - A destination ending with `/`, or naming an existing directory, means "copy into": the
//!   source's file name is appended
//! - Anything else is the final file name; an existing file is replaced
//!
//! ## Progress & Logging
//!
//! - `--progress`: Show progress (auto-detects terminal type)
//! - `--summary`: Print summary statistics at the end
//! - `-v/-vv/-vvv`: Control log verbosity (INFO/DEBUG/TRACE)
//! - Progress goes to stderr, logs to stdout

pub mod path;
