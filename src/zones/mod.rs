//! Roughness zones
//!
//! The base Manning map is prepared with one constant value per zone, so
//! zones are recovered by grouping mesh elements on identical values. Zones
//! are numbered in ascending order of their base value.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::field::ScalarField;
use crate::optim::{OptimError, ParameterDomain, SearchSpace};

#[derive(Debug, Error)]
pub enum ZoneError {
    #[error("Roughness field has no elements")]
    EmptyField,

    #[error("Element {index} has non-finite value {value}")]
    NonFinite { index: usize, value: f64 },

    #[error("Expected {expected} zone values, got {actual}")]
    ValueCount { expected: usize, actual: usize },

    #[error("Field has {actual} elements, zones were built for {expected}")]
    ElementCount { expected: usize, actual: usize },

    #[error("Bounds override for unknown zone {0}")]
    UnknownZone(usize),

    #[error(transparent)]
    Domain(#[from] OptimError),
}

pub type Result<T> = std::result::Result<T, ZoneError>;

/// Spatial partition of the mesh sharing one Manning value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: usize,
    /// Mesh element indices covered by the zone, ascending
    pub elements: Vec<usize>,
    /// Value found in the base file
    pub base_value: f64,
}

impl Zone {
    /// Name of the sampled parameter for this zone
    pub fn parameter_name(&self) -> String {
        parameter_name(self.id)
    }
}

/// Name of the sampled parameter for zone `id`
pub fn parameter_name(id: usize) -> String {
    format!("Manning zone {id}")
}

/// Range sampled for each zone: a default plus per-zone overrides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneBounds {
    #[serde(default = "default_domain")]
    pub default: ParameterDomain,
    #[serde(default)]
    pub overrides: BTreeMap<usize, ParameterDomain>,
}

fn default_domain() -> ParameterDomain {
    ParameterDomain::new(0.001, 81.101).with_step(0.01)
}

impl Default for ZoneBounds {
    fn default() -> Self {
        Self {
            default: default_domain(),
            overrides: BTreeMap::new(),
        }
    }
}

impl ZoneBounds {
    pub fn for_zone(&self, id: usize) -> &ParameterDomain {
        self.overrides.get(&id).unwrap_or(&self.default)
    }
}

/// All zones of a mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneMap {
    zones: Vec<Zone>,
    n_elements: usize,
}

impl ZoneMap {
    /// Group elements of `field` by identical value
    pub fn from_field(field: &ScalarField) -> Result<Self> {
        if field.is_empty() {
            return Err(ZoneError::EmptyField);
        }

        let mut groups: BTreeMap<u64, Vec<usize>> = BTreeMap::new();
        let mut values: BTreeMap<u64, f64> = BTreeMap::new();
        for (index, &value) in field.values().iter().enumerate() {
            if !value.is_finite() {
                return Err(ZoneError::NonFinite { index, value });
            }
            // normalise -0.0 so it groups with 0.0
            let key = (value + 0.0).to_bits();
            groups.entry(key).or_default().push(index);
            values.insert(key, value + 0.0);
        }

        let mut keyed: Vec<(f64, Vec<usize>)> = groups
            .into_iter()
            .map(|(key, elements)| (values[&key], elements))
            .collect();
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));

        let zones = keyed
            .into_iter()
            .enumerate()
            .map(|(id, (base_value, elements))| Zone {
                id,
                elements,
                base_value,
            })
            .collect();

        Ok(Self {
            zones,
            n_elements: field.len(),
        })
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn n_elements(&self) -> usize {
        self.n_elements
    }

    /// Build the search space, one parameter per zone in zone order
    pub fn search_space(&self, bounds: &ZoneBounds) -> Result<SearchSpace> {
        if let Some(id) = bounds.overrides.keys().find(|id| **id >= self.zones.len()) {
            return Err(ZoneError::UnknownZone(*id));
        }
        let mut space = SearchSpace::new();
        for zone in &self.zones {
            space.add(&zone.parameter_name(), *bounds.for_zone(zone.id))?;
        }
        Ok(space)
    }

    /// Copy of `base` with each zone's elements set to its new value
    ///
    /// `values[i]` is the value for zone `i`; elements not covered by any
    /// zone keep their base value.
    pub fn apply(&self, base: &ScalarField, values: &[f64]) -> Result<ScalarField> {
        if values.len() != self.zones.len() {
            return Err(ZoneError::ValueCount {
                expected: self.zones.len(),
                actual: values.len(),
            });
        }
        if base.len() != self.n_elements {
            return Err(ZoneError::ElementCount {
                expected: self.n_elements,
                actual: base.len(),
            });
        }

        let mut field = base.clone();
        let out = field.values_mut();
        for (zone, &value) in self.zones.iter().zip(values) {
            for &element in &zone.elements {
                out[element] = value;
            }
        }
        Ok(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(values: &[f64]) -> ScalarField {
        ScalarField::new("manning", values.to_vec())
    }

    #[test]
    fn test_zones_grouped_by_value() {
        let map = ZoneMap::from_field(&field(&[45.0, 32.0, 45.0, 28.0, 32.0])).unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map.n_elements(), 5);

        let zones = map.zones();
        assert_eq!(zones[0].base_value, 28.0);
        assert_eq!(zones[0].elements, vec![3]);
        assert_eq!(zones[1].base_value, 32.0);
        assert_eq!(zones[1].elements, vec![1, 4]);
        assert_eq!(zones[2].elements, vec![0, 2]);
        assert_eq!(zones[2].parameter_name(), "Manning zone 2");
    }

    #[test]
    fn test_zones_cover_every_element_once() {
        let values: Vec<f64> = (0..100).map(|i| (i % 7) as f64).collect();
        let map = ZoneMap::from_field(&field(&values)).unwrap();
        let mut covered: Vec<usize> = map
            .zones()
            .iter()
            .flat_map(|z| z.elements.iter().copied())
            .collect();
        covered.sort_unstable();
        assert_eq!(covered, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_zones_reject_empty_and_nan() {
        assert!(matches!(ZoneMap::from_field(&field(&[])), Err(ZoneError::EmptyField)));
        assert!(matches!(
            ZoneMap::from_field(&field(&[1.0, f64::NAN])),
            Err(ZoneError::NonFinite { index: 1, .. })
        ));
    }

    #[test]
    fn test_negative_zero_groups_with_zero() {
        let map = ZoneMap::from_field(&field(&[0.0, -0.0])).unwrap();
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_apply_sets_zone_values_only() {
        let base = field(&[45.0, 32.0, 45.0, 28.0, 32.0]);
        let map = ZoneMap::from_field(&base).unwrap();
        let updated = map.apply(&base, &[10.0, 20.0, 30.0]).unwrap();
        assert_eq!(updated.values(), &[30.0, 20.0, 30.0, 10.0, 20.0]);
        assert_eq!(updated.item(), "manning");
        // base untouched
        assert_eq!(base.values()[0], 45.0);
    }

    #[test]
    fn test_apply_checks_lengths() {
        let base = field(&[1.0, 2.0]);
        let map = ZoneMap::from_field(&base).unwrap();
        assert!(matches!(
            map.apply(&base, &[1.0]),
            Err(ZoneError::ValueCount { expected: 2, actual: 1 })
        ));
        assert!(matches!(
            map.apply(&field(&[1.0]), &[1.0, 2.0]),
            Err(ZoneError::ElementCount { .. })
        ));
    }

    #[test]
    fn test_search_space_with_overrides() {
        let map = ZoneMap::from_field(&field(&[1.0, 2.0, 3.0])).unwrap();
        let mut bounds = ZoneBounds::default();
        bounds.overrides.insert(1, ParameterDomain::new(20.0, 40.0));

        let space = map.search_space(&bounds).unwrap();
        assert_eq!(space.len(), 3);
        assert_eq!(space.get("Manning zone 0").unwrap().high, 81.101);
        assert_eq!(space.get("Manning zone 1").unwrap().low, 20.0);

        bounds.overrides.insert(7, ParameterDomain::new(1.0, 2.0));
        assert!(matches!(map.search_space(&bounds), Err(ZoneError::UnknownZone(7))));
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_apply_keeps_zone_structure(
            raw in prop::collection::vec(0u8..6, 1..60),
            offset in 1.0f64..50.0,
        ) {
            let values: Vec<f64> = raw.iter().map(|&v| f64::from(v) * 10.0).collect();
            let base = ScalarField::new("manning", values.clone());
            let map = ZoneMap::from_field(&base).unwrap();

            let new_values: Vec<f64> = map.zones().iter().map(|z| z.base_value + offset).collect();
            let updated = map.apply(&base, &new_values).unwrap();

            // every element moves by the same offset as its zone
            for (old, new) in values.iter().zip(updated.values()) {
                prop_assert!((new - old - offset).abs() < 1e-9);
            }
            prop_assert_eq!(ZoneMap::from_field(&updated).unwrap().len(), map.len());
        }
    }
}
