//! JSON Lines record sink
//!
//! Writes one sync record per line, the hand-off format for whatever host
//! process performs the project/task upserts.

use super::RecordSink;
use crate::sync::SyncRecord;
use crate::Result;
use std::io::{self, BufWriter, Stdout, Write};

/// JSONL writer for sync records
pub struct JsonLinesSink<W: Write> {
    writer: BufWriter<W>,
    written: usize,
}

impl JsonLinesSink<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
            written: 0,
        }
    }

    /// Write a single record
    pub fn write(&mut self, record: &SyncRecord) -> Result<()> {
        let json = serde_json::to_string(record)?;
        writeln!(self.writer, "{}", json)?;
        self.written += 1;
        Ok(())
    }

    /// Records written so far
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flush and return the underlying writer
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| crate::SyncError::Io(e.into_error()))
    }
}

impl<W: Write> RecordSink for JsonLinesSink<W> {
    fn accept(&mut self, records: &[SyncRecord]) -> Result<()> {
        for record in records {
            self.write(record)?;
        }
        self.flush()
    }
}
