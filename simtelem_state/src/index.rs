//! Concurrent vehicle index.
//!
//! The Extract stage runs a fixed worker pool over disjoint slices of a
//! cycle batch; two or more workers can observe the same plate for the
//! first time in the same batch. [`VehicleIndex`] is a sharded concurrent
//! map so that a lookup miss followed by an insert never needs a
//! whole-table lock — only the shard holding that plate's hash is briefly
//! exclusive.

use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use simtelem_common::PlateKey;

use crate::vehicle::{Position, VehicleData};

/// Sharded map from plate to accumulated vehicle data.
pub struct VehicleIndex {
    map: DashMap<PlateKey, Mutex<VehicleData>>,
    len: AtomicUsize,
}

impl VehicleIndex {
    pub fn with_capacity(initial_capacity: usize) -> Self {
        Self {
            map: DashMap::with_capacity(initial_capacity),
            len: AtomicUsize::new(0),
        }
    }

    /// Reserves room for at least `additional` more entries beyond the
    /// current length. Mirrors the original ETL's `expand_map`: called once
    /// between the count and insert phases of an Extract batch so that no
    /// worker pays for a shard rehash mid-flight.
    pub fn reserve(&self, additional: usize) {
        self.map.reserve(additional);
    }

    pub fn len(&self) -> usize {
        self.len.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Looks up `plate`, inserting a fresh [`VehicleData`] anchored at
    /// `highway_index`/`pos` if absent. Returns true if this call performed
    /// the insert (i.e. the vehicle is new this run).
    pub fn get_or_insert_with(
        &self,
        plate: PlateKey,
        highway_index: usize,
        pos: Position,
        mut apply: impl FnMut(&mut VehicleData, bool),
    ) {
        let mut inserted = false;
        let entry = self.map.entry(plate).or_insert_with(|| {
            inserted = true;
            Mutex::new(VehicleData::new(highway_index, pos))
        });
        if inserted {
            self.len.fetch_add(1, Ordering::Relaxed);
        }
        let mut guard = entry.lock();
        apply(&mut guard, inserted);
    }

    /// Cheap presence check used by Extract's counting phase — does not
    /// clone or lock the per-plate data, only the shard the plate hashes to.
    pub fn contains(&self, plate: &PlateKey) -> bool {
        self.map.contains_key(plate)
    }

    /// Runs `f` against the vehicle data for `plate`, if present.
    pub fn with_vehicle<R>(&self, plate: &PlateKey, f: impl FnOnce(&mut VehicleData) -> R) -> Option<R> {
        self.map.get(plate).map(|entry| f(&mut entry.lock()))
    }

    /// Snapshots the current vehicle data for `plate`.
    pub fn get(&self, plate: &PlateKey) -> Option<VehicleData> {
        self.map.get(plate).map(|entry| entry.lock().clone())
    }
}
