//! Scoring a simulation against altimetry tracks
//!
//! For every track the observations are matched to the nearest output
//! element and interpolated in time, the skill table is computed, and the
//! objective is the unweighted mean of the per-track RMSE.

mod error;
mod matcher;
mod result;
mod skill;


pub use error::{Result, ScoreError};
pub use matcher::{match_track, ElementIndex, MatchedSeries};
pub use result::{CsvResultReader, ResultReader, SimulatedField};
pub use skill::{aggregate, rmse, SkillMetrics};

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::observation::ObservationTrack;

/// Skill of one track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackScore {
    pub track: String,
    pub skill: SkillMetrics,
}

/// Result of scoring one simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub tracks: Vec<TrackScore>,
    /// Mean RMSE across tracks (the objective)
    pub aggregate: f64,
}

/// Scores simulated output against a fixed set of tracks
#[derive(Debug)]
pub struct Scorer {
    tracks: Vec<ObservationTrack>,
    reader: Box<dyn ResultReader>,
    max_distance: Option<f64>,
}

impl Scorer {
    pub fn new(tracks: Vec<ObservationTrack>, reader: Box<dyn ResultReader>) -> Self {
        Self {
            tracks,
            reader,
            max_distance: None,
        }
    }

    /// Drop observations farther than `distance` from every element
    pub fn with_max_distance(mut self, distance: Option<f64>) -> Self {
        self.max_distance = distance;
        self
    }

    pub fn tracks(&self) -> &[ObservationTrack] {
        &self.tracks
    }

    /// Load the result file and score it
    pub fn score_file(&self, result_file: &Path) -> Result<ScoreReport> {
        let field = self.reader.read(result_file)?;
        if field.positions().is_empty() || field.times().is_empty() {
            return Err(ScoreError::EmptyResult(result_file.to_path_buf()));
        }
        self.score(&field)
    }

    /// Score an already loaded field
    pub fn score(&self, field: &SimulatedField) -> Result<ScoreReport> {
        if self.tracks.is_empty() {
            return Err(ScoreError::NoObservations);
        }

        let index = ElementIndex::new(field.positions());
        let mut tracks = Vec::with_capacity(self.tracks.len());
        for track in &self.tracks {
            let matched = match_track(field, &index, track, self.max_distance);
            let skill = SkillMetrics::compute(&matched).ok_or_else(|| ScoreError::NoOverlap {
                track: track.name().to_string(),
            })?;
            tracing::debug!(
                track = track.name(),
                n = skill.n,
                rmse = skill.rmse,
                bias = skill.bias,
                "track skill"
            );
            tracks.push(TrackScore {
                track: track.name().to_string(),
                skill,
            });
        }

        let rmses: Vec<f64> = tracks.iter().map(|t| t.skill.rmse).collect();
        let aggregate = aggregate(&rmses).ok_or(ScoreError::NoObservations)?;
        Ok(ScoreReport { tracks, aggregate })
    }
}
