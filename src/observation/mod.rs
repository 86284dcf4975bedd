//! Satellite-altimetry observation tracks
//!
//! A track is a time-ordered series of `(time, x, y, value)` points read
//! from CSV. Tracks are read once per study and never modified.

mod time;

pub use time::parse_time;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObservationError {
    #[error("Failed to open observation file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Column '{column}' not found in {path}")]
    MissingColumn { path: PathBuf, column: String },

    #[error("{path}, row {row}: {message}")]
    Parse {
        path: PathBuf,
        row: usize,
        message: String,
    },

    #[error("Observation track '{0}' holds no points")]
    Empty(String),
}

pub type Result<T> = std::result::Result<T, ObservationError>;

/// One observed value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObsPoint {
    pub time: DateTime<Utc>,
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

fn default_time_column() -> String {
    "time".to_string()
}
fn default_x_column() -> String {
    "x".to_string()
}
fn default_y_column() -> String {
    "y".to_string()
}
fn default_value_column() -> String {
    "value".to_string()
}

/// Where and how to read one observation track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationSource {
    /// Track name used in logs and stored skill metrics
    pub name: String,
    pub path: PathBuf,
    #[serde(default = "default_time_column")]
    pub time_column: String,
    #[serde(default = "default_x_column")]
    pub x_column: String,
    #[serde(default = "default_y_column")]
    pub y_column: String,
    #[serde(default = "default_value_column")]
    pub value_column: String,
}

impl ObservationSource {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            time_column: default_time_column(),
            x_column: default_x_column(),
            y_column: default_y_column(),
            value_column: default_value_column(),
        }
    }

    /// Read the track
    pub fn load(&self) -> Result<ObservationTrack> {
        let file = File::open(&self.path).map_err(|source| ObservationError::Io {
            path: self.path.clone(),
            source,
        })?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(BufReader::new(file));

        let headers = reader
            .headers()
            .map_err(|source| ObservationError::Csv {
                path: self.path.clone(),
                source,
            })?
            .clone();
        let column = |name: &str| -> Result<usize> {
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
                .ok_or_else(|| ObservationError::MissingColumn {
                    path: self.path.clone(),
                    column: name.to_string(),
                })
        };
        let (t_idx, x_idx, y_idx, v_idx) = (
            column(&self.time_column)?,
            column(&self.x_column)?,
            column(&self.y_column)?,
            column(&self.value_column)?,
        );

        let mut points = Vec::new();
        for (row_idx, record) in reader.records().enumerate() {
            let row = row_idx + 1;
            let record = record.map_err(|source| ObservationError::Csv {
                path: self.path.clone(),
                source,
            })?;
            let field = |idx: usize| record.get(idx).unwrap_or("");
            let parse_err = |message: String| ObservationError::Parse {
                path: self.path.clone(),
                row,
                message,
            };

            let time = parse_time(field(t_idx)).map_err(parse_err)?;
            let number = |idx: usize, what: &str| -> Result<f64> {
                field(idx)
                    .parse::<f64>()
                    .map_err(|_| parse_err(format!("invalid {what} '{}'", field(idx))))
            };
            let x = number(x_idx, "x")?;
            let y = number(y_idx, "y")?;
            let value = number(v_idx, "value")?;
            if !value.is_finite() {
                tracing::debug!(track = %self.name, row, "skipping non-finite observation");
                continue;
            }
            points.push(ObsPoint { time, x, y, value });
        }

        ObservationTrack::new(self.name.clone(), points)
    }
}

/// Time-sorted observation series
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationTrack {
    name: String,
    points: Vec<ObsPoint>,
}

impl ObservationTrack {
    /// Build a track, sorting points by time
    pub fn new(name: impl Into<String>, mut points: Vec<ObsPoint>) -> Result<Self> {
        let name = name.into();
        if points.is_empty() {
            return Err(ObservationError::Empty(name));
        }
        points.sort_by_key(|p| p.time);
        Ok(Self { name, points })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn points(&self) -> &[ObsPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Load every configured track, resolving relative paths against `base_dir`
pub fn load_tracks(sources: &[ObservationSource], base_dir: &Path) -> Result<Vec<ObservationTrack>> {
    sources
        .iter()
        .map(|source| {
            let mut resolved = source.clone();
            resolved.path = crate::io::resolve_path(base_dir, &source.path);
            let track = resolved.load()?;
            tracing::info!(track = track.name(), points = track.len(), "loaded observations");
            Ok(track)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_sorts_by_time() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "c2.csv",
            "time,x,y,value\n\
             2022-01-01 02:00:00,3.1,55.0,0.41\n\
             2022-01-01T01:00:00Z,3.0,54.9,0.35\n",
        );

        let track = ObservationSource::new("c2", &path).load().unwrap();
        assert_eq!(track.name(), "c2");
        assert_eq!(track.len(), 2);
        assert_eq!(track.points()[0].value, 0.35);
        assert_eq!(track.points()[1].x, 3.1);
    }

    #[test]
    fn test_load_custom_columns() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "s3a.csv", "date, lon, lat, adt\n2022-01-01 00:00:00, 1, 2, 0.5\n");

        let mut source = ObservationSource::new("s3a", &path);
        source.time_column = "date".to_string();
        source.x_column = "lon".to_string();
        source.y_column = "lat".to_string();
        source.value_column = "adt".to_string();

        let track = source.load().unwrap();
        assert_eq!(track.points()[0].value, 0.5);
    }

    #[test]
    fn test_missing_column() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "bad.csv", "time,x,value\n");
        let err = ObservationSource::new("bad", &path).load().unwrap_err();
        assert!(matches!(err, ObservationError::MissingColumn { ref column, .. } if column == "y"));
    }

    #[test]
    fn test_bad_number_reports_row() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "bad.csv",
            "time,x,y,value\n2022-01-01 00:00:00,1,2,0.5\n2022-01-01 00:00:01,1,oops,0.5\n",
        );
        match ObservationSource::new("bad", &path).load().unwrap_err() {
            ObservationError::Parse { row, .. } => assert_eq!(row, 2),
            other => panic!("unexpected {other}"),
        }
    }

    #[test]
    fn test_empty_track_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "empty.csv", "time,x,y,value\n");
        assert!(matches!(
            ObservationSource::new("empty", &path).load(),
            Err(ObservationError::Empty(_))
        ));
    }

    #[test]
    fn test_nan_values_skipped() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "gappy.csv",
            "time,x,y,value\n2022-01-01 00:00:00,1,2,NaN\n2022-01-01 00:10:00,1,2,0.2\n",
        );
        let track = ObservationSource::new("gappy", &path).load().unwrap();
        assert_eq!(track.len(), 1);
    }
}
