//! Simulated surface-elevation output

use chrono::{DateTime, Utc};
use ndarray::Array2;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use super::error::{Result, ScoreError};
use crate::observation::parse_time;

/// Element-centred output: one value per (time step, element)
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedField {
    times: Vec<DateTime<Utc>>,
    positions: Vec<[f64; 2]>,
    /// `values[[t, e]]`, NaN where the output holds no value
    values: Array2<f64>,
}

impl SimulatedField {
    pub fn new(times: Vec<DateTime<Utc>>, positions: Vec<[f64; 2]>, values: Array2<f64>) -> Self {
        debug_assert_eq!(values.dim(), (times.len(), positions.len()));
        Self {
            times,
            positions,
            values,
        }
    }

    pub fn times(&self) -> &[DateTime<Utc>] {
        &self.times
    }

    pub fn positions(&self) -> &[[f64; 2]] {
        &self.positions
    }

    pub fn value(&self, step: usize, element: usize) -> f64 {
        self.values[[step, element]]
    }

    /// Value of `element` at `time`, linear in time between output steps
    ///
    /// `None` outside the simulated period or where either bracketing step
    /// holds no value.
    pub fn interpolate(&self, element: usize, time: DateTime<Utc>) -> Option<f64> {
        let first = *self.times.first()?;
        let last = *self.times.last()?;
        if time < first || time > last {
            return None;
        }

        let upper = self.times.partition_point(|t| *t < time);
        if self.times[upper] == time {
            let v = self.value(upper, element);
            return v.is_finite().then_some(v);
        }

        let lower = upper - 1;
        let (t0, t1) = (self.times[lower], self.times[upper]);
        let (v0, v1) = (self.value(lower, element), self.value(upper, element));
        if !(v0.is_finite() && v1.is_finite()) {
            return None;
        }
        let span = seconds(t1 - t0);
        if span <= 0.0 {
            return None;
        }
        let w = seconds(time - t0) / span;
        Some(v0 + w * (v1 - v0))
    }
}

/// Duration in seconds at nanosecond resolution
fn seconds(d: chrono::Duration) -> f64 {
    d.num_nanoseconds()
        .map_or_else(|| d.num_milliseconds() as f64 / 1e3, |ns| ns as f64 / 1e9)
}

/// Loads simulated output produced by the solver
pub trait ResultReader: std::fmt::Debug {
    fn read(&self, path: &Path) -> Result<SimulatedField>;
}

/// Long-format CSV exchange file: `time,x,y,value`, one row per element per step
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvResultReader;

impl ResultReader for CsvResultReader {
    fn read(&self, path: &Path) -> Result<SimulatedField> {
        let load_err = |message: String| ScoreError::ResultLoad {
            path: path.to_path_buf(),
            message,
        };

        let file = File::open(path).map_err(|e| load_err(e.to_string()))?;
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(BufReader::new(file));

        let mut rows: Vec<(DateTime<Utc>, [f64; 2], f64)> = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            let record = record.map_err(|e| load_err(e.to_string()))?;
            let row = idx + 1;
            let get = |i: usize| record.get(i).unwrap_or("");
            let time = parse_time(get(0)).map_err(|e| load_err(format!("row {row}: {e}")))?;
            let mut nums = [0.0; 3];
            for (slot, i) in nums.iter_mut().zip(1..4) {
                *slot = get(i)
                    .parse::<f64>()
                    .map_err(|_| load_err(format!("row {row}: invalid number '{}'", get(i))))?;
            }
            rows.push((time, [nums[0], nums[1]], nums[2]));
        }

        if rows.is_empty() {
            return Err(ScoreError::EmptyResult(path.to_path_buf()));
        }

        let mut times: Vec<DateTime<Utc>> = rows.iter().map(|r| r.0).collect();
        times.sort();
        times.dedup();

        let mut element_of: HashMap<(u64, u64), usize> = HashMap::new();
        let mut positions = Vec::new();
        for (_, pos, _) in &rows {
            element_of
                .entry((pos[0].to_bits(), pos[1].to_bits()))
                .or_insert_with(|| {
                    positions.push(*pos);
                    positions.len() - 1
                });
        }

        let mut values = Array2::<f64>::from_elem((times.len(), positions.len()), f64::NAN);
        for (time, pos, value) in rows {
            let step = times.partition_point(|t| *t < time);
            let element = element_of[&(pos[0].to_bits(), pos[1].to_bits())];
            values[[step, element]] = value;
        }

        Ok(SimulatedField::new(times, positions, values))
    }
}
