//! A minimal CSV trace reader: the concrete "request iterator in" half of
//! the core's external interface (6). The core does not parse bytes; this
//! is the one place in the workspace that does.
//!
//! Expected columns, no header: `clock_time,obj_id,obj_size,op[,next_access_vtime,ttl]`.
//! `op` is `get` or `set` (case-insensitive); the trailing two columns are
//! optional and may be left empty. A row that fails to parse becomes an
//! invalid [`Request`] (`valid = false`) rather than aborting the replay,
//! per the driver's tolerance for malformed trace lines (6); only an I/O
//! failure reading the file itself is fatal.

use std::io;
use std::path::Path;

use cachesim_core::{Operation, Request};

/// Reads [`Request`]s from a CSV file, one row at a time.
pub struct TraceReader {
    records: csv::StringRecordsIntoIter<std::fs::File>,
}

impl TraceReader {
    /// Opens `path` for streaming read. Fails only on the initial file
    /// open; row-level parse failures are reported per-row by `next`.
    pub fn open(path: &Path) -> io::Result<Self> {
        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)
            .map_err(csv_to_io_error)?;
        Ok(Self {
            records: reader.into_records(),
        })
    }
}

fn csv_to_io_error(err: csv::Error) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err)
}

fn parse_operation(field: &str) -> Option<Operation> {
    match field.trim().to_ascii_lowercase().as_str() {
        "get" | "read" | "r" => Some(Operation::Get),
        "set" | "write" | "w" => Some(Operation::Set),
        _ => None,
    }
}

fn parse_row(record: &csv::StringRecord) -> Option<Request> {
    let clock_time = record.get(0)?.trim().parse::<i64>().ok()?;
    let obj_id = record.get(1)?.trim().parse::<u64>().ok()?;
    let obj_size = record.get(2)?.trim().parse::<i64>().ok()?;
    let op = parse_operation(record.get(3)?)?;

    let mut req = Request::new(clock_time, obj_id, obj_size, op);
    if let Some(next) = record.get(4).map(str::trim).filter(|s| !s.is_empty()) {
        req = req.with_next_access(next.parse::<i64>().ok()?);
    }
    if let Some(ttl) = record.get(5).map(str::trim).filter(|s| !s.is_empty()) {
        req = req.with_ttl(ttl.parse::<i64>().ok()?);
    }
    Some(req)
}

impl Iterator for TraceReader {
    type Item = io::Result<Request>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(err) => return Some(Err(csv_to_io_error(err))),
        };
        match parse_row(&record) {
            Some(req) => Some(Ok(req)),
            None => {
                log::warn!("skipping malformed trace row: {record:?}");
                let mut invalid = Request::new(0, 0, 0, Operation::Get);
                invalid.valid = false;
                Some(Ok(invalid))
            }
        }
    }
}
