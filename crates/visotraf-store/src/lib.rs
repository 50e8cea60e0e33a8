//! Append-only count log: one `timestamp,north,south,east,west` line per record.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;
use visotraf_core::{CountRecord, CountSink, CountSnapshot, CountSource};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("count log I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },
    #[error("timestamp {0}us is out of range")]
    TimestampRange(i64),
}

/// Render one record as a log line (no trailing newline).
pub fn format_record(record: &CountRecord) -> Result<String, StoreError> {
    let ts = DateTime::<Utc>::from_timestamp_micros(record.ts_us)
        .ok_or(StoreError::TimestampRange(record.ts_us))?;
    let c = &record.counts;
    Ok(format!(
        "{},{},{},{},{}",
        ts.to_rfc3339_opts(SecondsFormat::Micros, true),
        c.north,
        c.south,
        c.east,
        c.west
    ))
}

/// Parse one log line. `line_no` is only used for error reporting.
pub fn parse_record(line: &str, line_no: usize) -> Result<CountRecord, StoreError> {
    let malformed = |reason: String| StoreError::Malformed { line: line_no, reason };
    let fields: Vec<&str> = line.trim().split(',').map(str::trim).collect();
    if fields.len() != 5 {
        return Err(malformed(format!("expected 5 fields, found {}", fields.len())));
    }
    let ts = DateTime::parse_from_rfc3339(fields[0])
        .map_err(|e| malformed(format!("bad timestamp {:?}: {e}", fields[0])))?;
    let mut counts = [0u32; 4];
    for (slot, raw) in counts.iter_mut().zip(&fields[1..]) {
        *slot = raw
            .parse()
            .map_err(|e| malformed(format!("bad count {raw:?}: {e}")))?;
    }
    Ok(CountRecord {
        ts_us: ts.timestamp_micros(),
        counts: CountSnapshot::new(counts[0], counts[1], counts[2], counts[3]),
    })
}

/// Writer half of the log. Records are only ever appended.
#[derive(Debug)]
pub struct CountLog {
    path: PathBuf,
    file: File,
}

impl CountLog {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        log::debug!("count log open at {}", path.display());
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CountSink for CountLog {
    type Error = StoreError;

    fn append(&mut self, record: &CountRecord) -> Result<(), StoreError> {
        let mut line = format_record(record)?;
        line.push('\n');
        self.file.write_all(line.as_bytes())?;
        self.file.flush()?;
        Ok(())
    }
}

/// Read every record of a log, skipping blank lines.
pub fn read_records(path: impl AsRef<Path>) -> Result<Vec<CountRecord>, StoreError> {
    let reader = BufReader::new(File::open(path)?);
    let mut out = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        out.push(parse_record(&line, idx + 1)?);
    }
    Ok(out)
}

/// Plays recorded counts back as a detector, one record per poll.
#[derive(Debug, Clone)]
pub struct ReplaySource {
    records: std::vec::IntoIter<CountRecord>,
    last_ts_us: Option<i64>,
}

impl ReplaySource {
    pub fn new(records: Vec<CountRecord>) -> Self {
        Self { records: records.into_iter(), last_ts_us: None }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Ok(Self::new(read_records(path)?))
    }

    /// Timestamp of the record most recently returned by `poll`.
    pub fn last_ts_us(&self) -> Option<i64> {
        self.last_ts_us
    }

    pub fn next_record(&mut self) -> Option<CountRecord> {
        let rec = self.records.next()?;
        self.last_ts_us = Some(rec.ts_us);
        Some(rec)
    }
}

impl CountSource for ReplaySource {
    fn poll(&mut self) -> Option<CountSnapshot> {
        self.next_record().map(|r| r.counts)
    }
}
