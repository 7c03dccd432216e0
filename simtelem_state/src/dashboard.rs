//! Dashboard navigation/filter state machine.
//!
//! Folds the free-form globals of the original implementation (current
//! filter, current vehicle cursor, redraw/exit flags) into one value with
//! named transition methods, per the "DashboardState" design-note guidance:
//! every field that `load_mutex` used to protect now lives here, behind a
//! single [`parking_lot::Mutex`] owned by the caller.

use simtelem_common::consts::COLLISION_RISK_THRESHOLD;
use simtelem_common::PlateKey;

use crate::index::VehicleIndex;
use crate::publish::PublishBuffers;
use crate::vehicle::VehicleFilter;

/// A cursor into the published buckets: `(worker, slot)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub worker: usize,
    pub slot: usize,
}

/// Navigation + filter state for the terminal dashboard. Everything that
/// was a loose global in the original implementation — `current_filter`,
/// `vehicle_i`/`vehicle_j`, `should_draw`, `should_exit` — is a named field
/// here, mutated only through the methods below.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub vehicle_filter: VehicleFilter,
    /// Reserved: highway filtering ('h' key) is disabled in this build,
    /// matching the commented-out `case 'h':` branch upstream. The field
    /// exists so a future UI can wire it without a state-shape change.
    pub highway_filter: Option<usize>,
    pub cursor: Cursor,
    /// 1-based ordinal of the selected vehicle within the current filter;
    /// `0` means no vehicle matches the filter.
    pub absolute_value: usize,
    pub num_vehicles: [usize; VehicleFilter::COUNT],
    pub should_draw: bool,
    pub should_exit: bool,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            vehicle_filter: VehicleFilter::All,
            highway_filter: None,
            cursor: Cursor::default(),
            absolute_value: 0,
            num_vehicles: [0; VehicleFilter::COUNT],
            should_draw: false,
            should_exit: false,
        }
    }
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    fn matches(buffers: &PublishBuffers, index: &VehicleIndex, filter: VehicleFilter, worker: usize, slot: usize) -> Option<PlateKey> {
        let plate = buffers.processed_at(worker, slot)?;
        let matches = index.with_vehicle(&plate, |data| data.vehicle.matches(filter)).unwrap_or(false);
        matches.then_some(plate)
    }

    /// Scans buckets right-to-left from the current cursor for the
    /// previous entry matching `vehicle_filter`. Returns true (and moves
    /// the cursor) if one was found.
    pub fn find_previous(&mut self, buffers: &PublishBuffers, index: &VehicleIndex) -> bool {
        let mut i = self.cursor.worker as isize;
        let mut first = true;
        while i >= 0 {
            let worker = i as usize;
            let len = buffers.processed_len(worker);
            let start = if first {
                first = false;
                (self.cursor.slot as isize) - 1
            } else {
                len as isize - 1
            };
            let mut j = start;
            while j >= 0 {
                let slot = j as usize;
                if Self::matches(buffers, index, self.vehicle_filter, worker, slot).is_some() {
                    self.cursor = Cursor { worker, slot };
                    self.absolute_value = self.absolute_value.saturating_sub(1);
                    return true;
                }
                j -= 1;
            }
            i -= 1;
        }
        false
    }

    /// Scans buckets left-to-right from the current cursor for the next
    /// entry matching `vehicle_filter`. Returns true (and moves the
    /// cursor) if one was found.
    pub fn find_next(&mut self, buffers: &PublishBuffers, index: &VehicleIndex) -> bool {
        let num_workers = buffers.num_workers();
        let mut first = true;
        for worker in self.cursor.worker..num_workers {
            let len = buffers.processed_len(worker);
            let start = if first {
                first = false;
                self.cursor.slot + 1
            } else {
                0
            };
            for slot in start..len {
                if Self::matches(buffers, index, self.vehicle_filter, worker, slot).is_some() {
                    self.cursor = Cursor { worker, slot };
                    self.absolute_value += 1;
                    return true;
                }
            }
        }
        false
    }

    /// Switches the active filter, resetting the cursor to the first
    /// matching entry (or `(0, 0)`/`absolute_value = 0` if none match).
    /// Returns true if anything changed.
    pub fn set_filter(&mut self, filter: VehicleFilter, buffers: &PublishBuffers, index: &VehicleIndex) -> bool {
        if filter == self.vehicle_filter {
            return false;
        }
        self.vehicle_filter = filter;
        self.cursor = Cursor::default();
        if self.num_vehicles[filter.index()] == 0 {
            self.absolute_value = 0;
            return true;
        }
        let first_matches = Self::matches(buffers, index, filter, 0, 0).is_some();
        if first_matches {
            self.absolute_value = 1;
        } else {
            // cursor.slot = 0 means find_next's "first" branch starts at
            // slot 1, so temporarily back up one to search from slot 0.
            self.cursor.slot = 0;
            self.absolute_value = 0;
            if self.find_next(buffers, index) {
                // find_next already incremented absolute_value to 1.
            }
        }
        true
    }

    /// Publishes fresh filter counts and resets the cursor to the current
    /// filter's first match — called by the orchestrator after every
    /// publish.
    pub fn on_publish(&mut self, counts: [usize; VehicleFilter::COUNT], buffers: &PublishBuffers, index: &VehicleIndex) {
        self.num_vehicles = counts;
        self.cursor = Cursor::default();
        if counts[self.vehicle_filter.index()] == 0 {
            self.absolute_value = 0;
            self.should_draw = true;
            return;
        }
        if Self::matches(buffers, index, self.vehicle_filter, 0, 0).is_some() {
            self.absolute_value = 1;
        } else {
            self.absolute_value = 0;
            self.find_next(buffers, index);
        }
        self.should_draw = true;
    }

    /// The plate currently selected by the cursor, if any.
    pub fn selected(&self, buffers: &PublishBuffers) -> Option<PlateKey> {
        if self.absolute_value == 0 {
            return None;
        }
        buffers.processed_at(self.cursor.worker, self.cursor.slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::Position;

    fn pos(distance: i64, cycle: u64) -> Position {
        Position { lane: 0, distance, cycle }
    }

    fn setup() -> (PublishBuffers, VehicleIndex) {
        let buffers = PublishBuffers::new(2);
        let index = VehicleIndex::with_capacity(16);
        for (i, plate) in ["AAA0001", "AAA0002", "AAA0003"].iter().enumerate() {
            let key = PlateKey::from_str_exact(plate);
            index.get_or_insert_with(key, 0, pos(i as i64, 0), |_, _| {});
            buffers.with_worker(0, |w| w.modified.push(key));
        }
        let key = PlateKey::from_str_exact("BBB0001");
        index.get_or_insert_with(key, 0, pos(99, 0), |data, _| {
            data.vehicle.flags[VehicleFilter::CollisionRisk.index()] = true;
        });
        buffers.with_worker(1, |w| w.modified.push(key));
        buffers.publish_all();
        (buffers, index)
    }

    #[test]
    fn find_next_scans_across_worker_buckets() {
        let (buffers, index) = setup();
        let mut state = DashboardState::new();
        state.on_publish([4, 1, 0], &buffers, &index);
        assert_eq!(state.absolute_value, 1);
        assert_eq!(state.cursor, Cursor { worker: 0, slot: 0 });

        assert!(state.find_next(&buffers, &index));
        assert_eq!(state.cursor, Cursor { worker: 0, slot: 1 });
        assert!(state.find_next(&buffers, &index));
        assert_eq!(state.cursor, Cursor { worker: 0, slot: 2 });
        assert!(state.find_next(&buffers, &index));
        assert_eq!(state.cursor, Cursor { worker: 1, slot: 0 });
        assert!(!state.find_next(&buffers, &index), "no more entries");
    }

    #[test]
    fn find_previous_reverses_find_next() {
        let (buffers, index) = setup();
        let mut state = DashboardState::new();
        state.on_publish([4, 1, 0], &buffers, &index);
        state.find_next(&buffers, &index);
        state.find_next(&buffers, &index);
        assert_eq!(state.absolute_value, 3);
        assert!(state.find_previous(&buffers, &index));
        assert_eq!(state.absolute_value, 2);
        assert_eq!(state.cursor, Cursor { worker: 0, slot: 1 });
    }

    #[test]
    fn set_filter_selects_first_match_of_new_filter() {
        let (buffers, index) = setup();
        let mut state = DashboardState::new();
        state.on_publish([4, 1, 0], &buffers, &index);
        assert!(state.set_filter(VehicleFilter::CollisionRisk, &buffers, &index));
        assert_eq!(state.cursor, Cursor { worker: 1, slot: 0 });
        assert_eq!(state.absolute_value, 1);
    }

    #[test]
    fn set_filter_with_no_matches_clears_selection() {
        let (buffers, index) = setup();
        let mut state = DashboardState::new();
        state.on_publish([4, 1, 0], &buffers, &index);
        assert!(state.set_filter(VehicleFilter::AboveSpeedLimit, &buffers, &index));
        assert_eq!(state.absolute_value, 0);
        assert!(state.selected(&buffers).is_none());
    }

    #[test]
    fn risk_threshold_constant_is_one_half() {
        assert_eq!(COLLISION_RISK_THRESHOLD, 0.5);
    }
}
