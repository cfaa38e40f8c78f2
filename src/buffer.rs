//! Bounded FIFO buffer with drop-on-overflow semantics.

use crate::record::LogRecord;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Ordered sequence of [`LogRecord`] with a hard capacity, exclusively owned by
/// the client and mutated only under its own mutex.
pub struct Buffer {
    records: Mutex<VecDeque<LogRecord>>,
    max_size: usize,
}

/// Outcome of pushing a record onto the buffer.
pub enum PushOutcome {
    /// Accepted; the buffer's length after this push did not cross `batch_size`.
    Accepted,
    /// Accepted, and length after this push reached or exceeded `batch_size`,
    /// so the caller should schedule an immediate flush.
    AcceptedAtThreshold,
    /// Rejected: the buffer was already at `max_buffer_size`.
    Full,
}

impl Buffer {
    pub fn new(max_size: usize) -> Self {
        Self { records: Mutex::new(VecDeque::with_capacity(max_size.min(1024))), max_size }
    }

    /// Appends `record` unless the buffer is already at capacity.
    pub fn push(&self, record: LogRecord, batch_size: usize) -> PushOutcome {
        let mut records = self.records.lock().unwrap_or_else(|p| p.into_inner());
        if records.len() >= self.max_size {
            return PushOutcome::Full;
        }
        records.push_back(record);
        if records.len() >= batch_size {
            PushOutcome::AcceptedAtThreshold
        } else {
            PushOutcome::Accepted
        }
    }

    /// Moves the entire buffer contents out and resets it to empty, returning
    /// `None` if it was already empty. The mutex is held only for the O(1) move.
    pub fn snapshot_and_clear(&self) -> Option<Vec<LogRecord>> {
        let mut records = self.records.lock().unwrap_or_else(|p| p.into_inner());
        if records.is_empty() {
            return None;
        }
        let drained: Vec<LogRecord> = records.drain(..).collect();
        Some(drained)
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
