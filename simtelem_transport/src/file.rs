//! File-drop transport: per-highway directories containing rotating
//! `<n>.csv`/`<n>.tmp` cycle files.
//!
//! The `.tmp` sentinel marks a fully-written `.csv`, `n` cycles through
//! `0..n_files`, and the directory name supplies the highway identity the
//! CSV header itself does not carry. Waits for the sentinel by polling with
//! a bounded sleep between stats rather than busy-looping.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use simtelem_common::conv::{parse_f64, parse_i64};
use simtelem_common::{EngineError, EngineResult, PlateKey};

use crate::cycle::{HighwayDescriptor, RawVehicle, SimulationCycle};
use crate::source::CycleSource;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

struct WatchedHighway {
    dir: PathBuf,
    name: String,
    next_file: usize,
}

/// Watches one or more per-highway directories for rotating cycle files.
pub struct FileDropTransport {
    highways: Vec<WatchedHighway>,
    n_files: usize,
    /// Round-robin cursor into `highways`, persisted across calls so
    /// `recv_timeout` doesn't always favor the first directory.
    cursor: usize,
}

impl FileDropTransport {
    pub fn new(dirs: Vec<PathBuf>, n_files: usize) -> Self {
        let highways = dirs
            .into_iter()
            .map(|dir| {
                let name = dir
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| dir.to_string_lossy().into_owned());
                WatchedHighway { dir, name, next_file: 0 }
            })
            .collect();
        Self { highways, n_files, cursor: 0 }
    }

    /// Attempts to read the next rotating cycle for `highway`. Returns
    /// `Ok(None)` if the sentinel `.tmp` file is not yet present.
    fn try_read(highway: &mut WatchedHighway, n_files: usize) -> EngineResult<Option<SimulationCycle>> {
        let tmp_path = highway.dir.join(format!("{}.tmp", highway.next_file));
        if !tmp_path.exists() {
            return Ok(None);
        }
        let csv_path = highway.dir.join(format!("{}.csv", highway.next_file));
        let result = Self::parse_csv(&csv_path, &highway.name);

        // The sentinel is consumed whether or not the payload parsed: a
        // malformed file is skipped, not retried.
        let _ = fs::remove_file(&tmp_path);
        highway.next_file = (highway.next_file + 1) % n_files;

        match result {
            Ok(cycle) => Ok(Some(cycle)),
            Err(err) => {
                tracing::warn!(highway = %highway.name, file = %csv_path.display(), error = %err, "skipping malformed cycle file");
                Ok(None)
            }
        }
    }

    fn parse_csv(path: &Path, highway_name: &str) -> EngineResult<SimulationCycle> {
        let contents = fs::read(path).map_err(|source| EngineError::TransportDirectory {
            path: path.display().to_string(),
            source,
        })?;

        let mut contents = contents;
        if contents.last() != Some(&b'\n') {
            contents.push(b'\n');
        }

        let newline = contents
            .iter()
            .position(|&b| b == b'\n')
            .ok_or_else(|| EngineError::MalformedRecord("missing header line".to_string()))?;
        // Parsers stop at an explicit terminator byte, so the header slice
        // keeps its trailing '\n' for the last field to stop on.
        let header = &contents[..=newline];

        // "cycle ts lanes extent speed_limit"
        let (cycle, i) = parse_i64(header, 0, b' ');
        let (timestamp, i) = parse_f64(header, i + 1, b' ');
        let (lanes, i) = parse_i64(header, i + 1, b' ');
        // `extent` (highway length) is part of the wire header but is not
        // part of this engine's data model; parsed to find the next field
        // boundary and discarded.
        let (_extent, i) = parse_f64(header, i + 1, b' ');
        let (speed_limit, _) = parse_f64(header, i + 1, b'\n');

        let highway = HighwayDescriptor {
            name: highway_name.to_string(),
            lanes: lanes as u32,
            speed_limit,
        };

        let mut vehicles = Vec::new();
        let mut line_start = newline + 1;
        while line_start < contents.len() {
            let line_end = contents[line_start..]
                .iter()
                .position(|&b| b == b'\n')
                .map(|p| line_start + p)
                .unwrap_or(contents.len() - 1);
            if line_end <= line_start {
                break;
            }
            // Keep the trailing '\n' in the slice as the distance field's terminator.
            let line = &contents[line_start..=line_end];
            if line.len() < 8 {
                break;
            }
            let plate = PlateKey::new(&line[..7]);
            let i = 8; // skip the space after the plate
            let (direction, next) = parse_i64(line, i, b' ');
            let i = next + 1;
            let (lane, next) = parse_i64(line, i, b' ');
            let i = next + 1;
            let (distance, _) = parse_i64(line, i, b'\n');

            vehicles.push(RawVehicle {
                plate,
                lane: lane as u32,
                direction: direction as u8,
                distance,
            });
            line_start = line_end + 1;
        }

        Ok(SimulationCycle {
            highway,
            cycle: cycle as u64,
            timestamp,
            vehicles,
        })
    }
}

impl CycleSource for FileDropTransport {
    fn recv_timeout(&mut self, timeout: Duration) -> EngineResult<Option<SimulationCycle>> {
        if self.highways.is_empty() {
            std::thread::sleep(timeout);
            return Ok(None);
        }

        let deadline = Instant::now() + timeout;
        loop {
            for _ in 0..self.highways.len() {
                let idx = self.cursor;
                self.cursor = (self.cursor + 1) % self.highways.len();
                if let Some(cycle) = Self::try_read(&mut self.highways[idx], self.n_files)? {
                    return Ok(Some(cycle));
                }
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            std::thread::sleep(POLL_INTERVAL.min(deadline.saturating_duration_since(Instant::now())));
        }
    }
}
