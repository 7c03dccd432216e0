//! Per-vehicle state accumulated across cycles.

/// A single recorded position of a vehicle within one ingest cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    /// Lane index, already folded with direction (see
    /// [`crate::highway::Highway::lanes`]).
    pub lane: i64,
    /// Distance travelled along the highway, in the transport's native
    /// integer unit.
    pub distance: i64,
    /// The ingest cycle number this position was recorded in. Kinematics
    /// are derived from the delta between consecutive cycle numbers, not
    /// wall-clock timestamps, so that replay speed never affects the
    /// computed speed/acceleration.
    pub cycle: u64,
}

/// Which subset of vehicles a dashboard view or a count is restricted to.
///
/// The three variants double as indices into fixed-size `[T; 3]` count and
/// flag arrays, so reordering them is a breaking change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VehicleFilter {
    All = 0,
    CollisionRisk = 1,
    AboveSpeedLimit = 2,
}

impl VehicleFilter {
    pub const COUNT: usize = 3;

    pub const ALL: [VehicleFilter; 3] = [
        VehicleFilter::All,
        VehicleFilter::CollisionRisk,
        VehicleFilter::AboveSpeedLimit,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            VehicleFilter::All => "all",
            VehicleFilter::CollisionRisk => "collision risk",
            VehicleFilter::AboveSpeedLimit => "above speed limit",
        }
    }
}

/// Enrichment + kinematics state for one vehicle, keyed externally by its
/// plate.
#[derive(Debug, Clone)]
pub struct Vehicle {
    /// Owner's first+last name, filled in once enrichment succeeds.
    pub name: Option<String>,
    /// Vehicle model, filled in once enrichment succeeds.
    pub model: Option<String>,
    /// Model year, filled in once enrichment succeeds. `None` is the
    /// "not yet enriched" sentinel, the idiomatic replacement for the
    /// original implementation's `year == -1`.
    pub year: Option<u16>,
    /// Index into the highway registry this vehicle was last seen on.
    pub highway_index: usize,
    /// Most recent recorded position.
    pub last_pos: Position,
    /// Instantaneous speed, distance units per cycle. `-1.0` until at
    /// least two positions have been recorded.
    pub speed: f64,
    /// Instantaneous acceleration, speed units per cycle. `0.0` until at
    /// least three positions have been recorded.
    pub acceleration: f64,
    /// Collision risk score in `[0, 1)`, or `-1.0` until at least four
    /// positions have been recorded.
    pub risk: f64,
    /// `flags[VehicleFilter::All]` is always true once a vehicle exists;
    /// the other two mirror the thresholds in
    /// [`crate::kinematics`](../simtelem_etl/index.html).
    pub flags: [bool; 3],
}

impl Vehicle {
    /// A freshly observed vehicle: no enrichment, no kinematics yet.
    pub fn new(highway_index: usize, pos: Position) -> Self {
        Self {
            name: None,
            model: None,
            year: None,
            highway_index,
            last_pos: pos,
            speed: -1.0,
            acceleration: 0.0,
            risk: -1.0,
            flags: [true, false, false],
        }
    }

    /// Whether enrichment has populated the owner fields.
    pub fn is_enriched(&self) -> bool {
        self.year.is_some()
    }

    pub fn matches(&self, filter: VehicleFilter) -> bool {
        self.flags[filter.index()]
    }
}

/// Everything tracked for one plate: its position history plus the derived
/// [`Vehicle`] snapshot.
#[derive(Debug, Clone)]
pub struct VehicleData {
    pub positions: Vec<Position>,
    pub vehicle: Vehicle,
}

impl VehicleData {
    pub fn new(highway_index: usize, pos: Position) -> Self {
        Self {
            positions: vec![pos],
            vehicle: Vehicle::new(highway_index, pos),
        }
    }
}
