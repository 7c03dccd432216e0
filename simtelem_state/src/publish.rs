//! Per-worker scratch buffers threaded through the Extract → Transform →
//! Enrich → Dashboard pipeline.
//!
//! Each worker owns one [`WorkerBuffer`] for the lifetime of the process,
//! reused batch after batch. `modified` is filled fresh by Extract and read
//! by Transform; [`WorkerBuffer::publish`] then swaps it into `processed`,
//! which is what Enrich drains and what the dashboard renders — the
//! previous batch's `processed` content becomes the new `modified` scratch
//! space, cleared at the start of the next batch.

use parking_lot::Mutex;

use simtelem_common::PlateKey;

#[derive(Debug, Default)]
pub struct WorkerBuffer {
    /// Plates this worker's Extract slice touched this batch, in encounter
    /// order. Transform reads this list; it is never shown to the
    /// dashboard directly.
    pub modified: Vec<PlateKey>,
    /// The previous batch's `modified`, swapped in by [`WorkerBuffer::publish`].
    /// Enrich iterates this; the dashboard's navigation scan reads it too.
    pub processed: Vec<PlateKey>,
}

impl WorkerBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the working buffer ahead of a new batch's Extract pass.
    /// `processed` is left untouched — it still holds the previously
    /// published batch until the next [`WorkerBuffer::publish`] call.
    pub fn reset(&mut self) {
        self.modified.clear();
    }

    /// Swaps `modified` into `processed`, making this batch's output the
    /// published one. The old `processed` becomes the new `modified`
    /// buffer and is cleared on the next [`WorkerBuffer::reset`].
    pub fn publish(&mut self) {
        std::mem::swap(&mut self.modified, &mut self.processed);
    }
}

/// Shared, per-worker publish state: `num_workers` independently-locked
/// [`WorkerBuffer`]s. Extract/Transform/Enrich each lock their own slot
/// (contention-free across workers); the dashboard briefly locks a slot to
/// read its `processed` list.
pub struct PublishBuffers {
    workers: Vec<Mutex<WorkerBuffer>>,
}

impl PublishBuffers {
    pub fn new(num_workers: usize) -> Self {
        Self {
            workers: (0..num_workers).map(|_| Mutex::new(WorkerBuffer::new())).collect(),
        }
    }

    pub fn num_workers(&self) -> usize {
        self.workers.len()
    }

    /// Clears every worker's `modified` buffer ahead of a new batch.
    pub fn reset_for_batch(&self) {
        for w in &self.workers {
            w.lock().reset();
        }
    }

    /// Swaps every worker's `modified` into `processed`, publishing the
    /// batch that just finished Transform.
    pub fn publish_all(&self) {
        for w in &self.workers {
            w.lock().publish();
        }
    }

    pub fn with_worker<R>(&self, worker: usize, f: impl FnOnce(&mut WorkerBuffer) -> R) -> R {
        f(&mut self.workers[worker].lock())
    }

    pub fn processed_len(&self, worker: usize) -> usize {
        self.workers[worker].lock().processed.len()
    }

    pub fn processed_at(&self, worker: usize, slot: usize) -> Option<PlateKey> {
        self.workers[worker].lock().processed.get(slot).copied()
    }

    pub fn processed_snapshot(&self, worker: usize) -> Vec<PlateKey> {
        self.workers[worker].lock().processed.clone()
    }
}
