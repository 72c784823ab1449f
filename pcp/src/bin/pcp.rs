use anyhow::anyhow;
use clap::Parser;
use tracing::instrument;

use pcp_tools_pcp::path;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "pcp",
    version,
    about = "Copy a single large file in multiple parts simultaneously",
    long_about = "`pcp` copies one large file by splitting it into several byte ranges that are copied concurrently and then merged back together.

This minimizes the slowing effects of latency or a shared connection (e.g. network mounted filesystems) at the expense of increased local disk I/O.

EXAMPLES:
    # Copy in 5 parts with progress
    pcp /mnt/nfs/big.iso /data/big.iso --progress

    # Copy into a directory using 8 parts
    pcp /mnt/nfs/big.iso /data/ --parts 8 --summary"
)]
struct Args {
    // Copy options
    /// Number of parts to split the copy into
    #[arg(
        short,
        long,
        default_value = "5",
        value_name = "N",
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..),
        help_heading = "Copy options"
    )]
    parts: usize,

    /// Size of a single read/write issued by each part
    ///
    /// Accepts byte sizes like "64KiB", "4MiB", or plain numbers in bytes.
    #[arg(
        long,
        default_value = "1MiB",
        value_name = "SIZE",
        help_heading = "Copy options"
    )]
    block_size: bytesize::ByteSize,

    /// How often parts are polled for progress
    ///
    /// Accepts human-readable durations like "500ms", "1s".
    #[arg(
        long,
        default_value = "1s",
        value_name = "DELAY",
        value_parser = humantime::parse_duration,
        help_heading = "Copy options"
    )]
    poll_interval: std::time::Duration,

    // Progress & output
    /// Show progress
    #[arg(long, help_heading = "Progress & output")]
    progress: bool,

    /// Set the type of progress display
    ///
    /// If specified, --progress flag is implied.
    #[arg(long, value_name = "TYPE", help_heading = "Progress & output")]
    progress_type: Option<common::ProgressType>,

    /// Set delay between progress updates
    ///
    /// Default is 200ms for interactive mode (progress-bar) and 10s for non-interactive mode (text-updates). If specified, --progress flag is implied. Accepts human-readable durations like "200ms", "10s", "5min".
    #[arg(long, value_name = "DELAY", help_heading = "Progress & output")]
    progress_delay: Option<String>,

    /// Print summary at the end
    #[arg(long, help_heading = "Progress & output")]
    summary: bool,

    /// Verbose level (implies "summary"): -v INFO / -vv DEBUG / -vvv TRACE (default: ERROR)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, help_heading = "Progress & output")]
    verbose: u8,

    /// Quiet mode, don't report errors
    #[arg(short = 'q', long = "quiet", help_heading = "Progress & output")]
    quiet: bool,

    // Advanced settings
    /// Number of worker threads (0 = number of CPU cores)
    #[arg(
        long,
        default_value = "0",
        value_name = "N",
        help_heading = "Advanced settings"
    )]
    max_workers: usize,

    /// Number of blocking worker threads (0 = Tokio default of 512)
    #[arg(
        long,
        default_value = "0",
        value_name = "N",
        help_heading = "Advanced settings"
    )]
    max_blocking_threads: usize,

    // ARGUMENTS
    /// Source file
    #[arg()]
    src: String,

    /// Destination file, or directory to copy into
    ///
    /// If it ends with '/' or names an existing directory, the source file name is appended.
    #[arg()]
    dst: String,
}

#[instrument]
async fn async_main(args: Args) -> anyhow::Result<common::copy::Summary> {
    let src = std::path::PathBuf::from(&args.src);
    let dst = path::resolve_destination_path(&args.src, &args.dst)?;
    let settings = common::copy::Settings {
        parts: args.parts,
        block_size: args.block_size.as_u64(),
        poll_interval: args.poll_interval,
    };
    tracing::debug!("copy settings: {:?}", &settings);
    match common::copy(&src, &dst, &settings).await {
        Ok(summary) => Ok(summary),
        Err(error) => {
            if args.summary {
                return Err(anyhow!("{}\n\n{}", error, &error.summary));
            }
            Err(anyhow!("{}", error))
        }
    }
}

fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();
    let func = {
        let args = args.clone();
        || async_main(args)
    };
    let output = common::OutputConfig {
        quiet: args.quiet,
        verbose: args.verbose,
        print_summary: args.summary,
    };
    let runtime = common::RuntimeConfig {
        max_workers: args.max_workers,
        max_blocking_threads: args.max_blocking_threads,
    };
    let res = common::run(
        if args.progress || args.progress_type.is_some() || args.progress_delay.is_some() {
            Some(common::ProgressSettings {
                progress_type: args.progress_type.unwrap_or_default(),
                progress_delay: args.progress_delay,
            })
        } else {
            None
        },
        output,
        runtime,
        func,
    );
    if res.is_none() {
        std::process::exit(1);
    }
    Ok(())
}
