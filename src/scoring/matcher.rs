//! Space/time matching of observations against simulated output

use rstar::primitives::GeomWithData;
use rstar::RTree;

use super::result::SimulatedField;
use crate::observation::ObservationTrack;

type IndexedPoint = GeomWithData<[f64; 2], usize>;

/// Nearest-element lookup over the output mesh
#[derive(Debug)]
pub struct ElementIndex {
    tree: RTree<IndexedPoint>,
}

impl ElementIndex {
    pub fn new(positions: &[[f64; 2]]) -> Self {
        let entries = positions
            .iter()
            .enumerate()
            .map(|(i, p)| GeomWithData::new(*p, i))
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Closest element and its distance
    pub fn nearest(&self, x: f64, y: f64) -> Option<(usize, f64)> {
        self.tree.nearest_neighbor(&[x, y]).map(|entry| {
            let [ex, ey] = *entry.geom();
            (entry.data, ((ex - x).powi(2) + (ey - y).powi(2)).sqrt())
        })
    }
}

/// Observation/model pairs for one track
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchedSeries {
    pub observed: Vec<f64>,
    pub modelled: Vec<f64>,
}

impl MatchedSeries {
    pub fn len(&self) -> usize {
        self.observed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observed.is_empty()
    }
}

/// Pair each observation with the simulated value at the nearest element
///
/// Observations outside the simulated period, beyond `max_distance` from
/// any element, or hitting missing output values are dropped.
pub fn match_track(
    field: &SimulatedField,
    index: &ElementIndex,
    track: &ObservationTrack,
    max_distance: Option<f64>,
) -> MatchedSeries {
    let mut matched = MatchedSeries::default();
    for point in track.points() {
        let Some((element, distance)) = index.nearest(point.x, point.y) else {
            continue;
        };
        if max_distance.is_some_and(|max| distance > max) {
            continue;
        }
        if let Some(model) = field.interpolate(element, point.time) {
            matched.observed.push(point.value);
            matched.modelled.push(model);
        }
    }
    matched
}
