//! Minimal demonstration CLI for `cachesim-core` (6, "external interfaces"):
//! reads a CSV access trace, replays it against one named eviction policy,
//! and writes interval/final statistics to stdout as CSV.
//!
//! Everything this binary does — trace parsing, argument parsing, output
//! formatting — sits outside the core by design (1, "explicitly out of
//! scope"); this is the "minimal one" `cachesim-core`'s own docs point a
//! caller at.

mod trace;

use std::path::PathBuf;
use std::process::ExitCode;

use cachesim_core::{CacheParams, Driver, DriverMetrics, SnapshotKind};
use clap::Parser;

use trace::TraceReader;

/// Replays a CSV trace against a `cachesim-core` eviction policy.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the trace file: one row per access, no header, columns
    /// `clock_time,obj_id,obj_size,op[,next_access_vtime,ttl]`.
    #[arg(short, long, value_name = "PATH")]
    trace: PathBuf,

    /// Eviction policy: one of lru, fifo, clock, random, lfu, slru, arc,
    /// car, belady.
    #[arg(short, long, default_value = "lru")]
    policy: String,

    /// Cache capacity, in bytes.
    #[arg(short, long, default_value_t = 1024 * 1024)]
    capacity: u64,

    /// Policy-specific parameters as `k1=v1,k2=v2` (6). For example
    /// `car` recognizes `p`; `slru` recognizes `protected-ratio`.
    #[arg(long, default_value = "")]
    params: String,

    /// Count fixed per-object metadata overhead against capacity.
    #[arg(long)]
    consider_object_metadata: bool,

    /// Advisory hash-table bucket-count hint; has no live effect on this
    /// core's auto-growing table (see DESIGN.md).
    #[arg(long, default_value_t = 0)]
    hash_buckets: u64,

    /// Requests per periodic snapshot row; 0 reports only the final line.
    #[arg(short, long, default_value_t = 0)]
    interval: u64,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let params = CacheParams {
        capacity: args.capacity,
        default_ttl: None,
        hash_bucket_count: args.hash_buckets,
        consider_object_metadata: args.consider_object_metadata,
    };

    let cache = match cachesim_core::create(&args.policy, params, &args.params) {
        Ok(cache) => cache,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let reader = match TraceReader::open(&args.trace) {
        Ok(reader) => reader,
        Err(err) => {
            eprintln!("error opening {}: {err}", args.trace.display());
            return ExitCode::FAILURE;
        }
    };

    let mut io_error = None;
    let requests = reader.filter_map(|item| match item {
        Ok(req) => Some(req),
        Err(err) => {
            io_error = Some(err);
            None
        }
    });

    let mut driver = Driver::new(cache, args.interval);
    let mut writer = csv::WriterBuilder::new().from_writer(std::io::stdout());
    let mut header_written = false;
    let mut write_error = None;

    driver.replay(requests, |kind, stats| {
        if write_error.is_some() {
            return;
        }
        let metrics = stats.metrics();
        if !header_written {
            let mut header = vec!["kind".to_string()];
            header.extend(metrics.keys().cloned());
            if let Err(err) = writer.write_record(&header) {
                write_error = Some(err);
                return;
            }
            header_written = true;
        }
        let kind_label = match kind {
            SnapshotKind::Interval => "interval",
            SnapshotKind::Final => "final",
        };
        let mut row = vec![kind_label.to_string()];
        row.extend(metrics.values().map(|v| format!("{v:.6}")));
        if let Err(err) = writer.write_record(&row) {
            write_error = Some(err);
        }
    });

    if write_error.is_none() {
        if let Err(err) = writer.flush() {
            write_error = Some(csv::Error::from(err));
        }
    }

    if let Some(err) = write_error {
        eprintln!("error writing statistics: {err}");
        return ExitCode::FAILURE;
    }

    match io_error {
        Some(err) => {
            eprintln!("error reading {}: {err}", args.trace.display());
            ExitCode::FAILURE
        }
        None => ExitCode::SUCCESS,
    }
}
