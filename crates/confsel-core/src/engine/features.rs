//! Population-wide feature assembly.
//!
//! Every conformer contributes one row: the scaled interatomic distances that are
//! short in at least one conformer, followed by one-hot columns for the hydrogen
//! bonds observed anywhere in the population.

use super::config::GeometryCriteria;
use super::error::EngineError;
use crate::core::hbonds::{HydrogenBondDetector, carbon_bound_hydrogens};
use crate::core::io::gjf::GjfFile;
use crate::core::io::traits::GeometryFile;
use crate::core::models::atom::Element;
use crate::core::models::geometry::Geometry;
use itertools::Itertools;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Hydrogen-bond label to one-hot column index, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HydrogenBondVocabulary {
    index: HashMap<String, usize>,
    labels: Vec<String>,
}

impl HydrogenBondVocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the column of `label`, assigning the next free column on first sight.
    pub fn insert(&mut self, label: &str) -> usize {
        if let Some(&column) = self.index.get(label) {
            return column;
        }
        let column = self.labels.len();
        self.index.insert(label.to_string(), column);
        self.labels.push(label.to_string());
        column
    }

    pub fn get(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Dense row-major feature matrix: scaled distance columns, then one-hot columns.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    rows: usize,
    numeric_columns: usize,
    onehot_columns: usize,
    data: Vec<f64>,
}

impl FeatureMatrix {
    /// Builds a matrix from equally long rows. Intended for callers that already
    /// hold features; the pipeline itself goes through [`FeatureBuilder`].
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, EngineError> {
        let columns = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().position(|r| r.len() != columns) {
            return Err(EngineError::Internal(format!(
                "feature row {} has {} columns, expected {}",
                bad,
                rows[bad].len(),
                columns
            )));
        }
        Ok(Self {
            rows: rows.len(),
            numeric_columns: columns,
            onehot_columns: 0,
            data: rows.concat(),
        })
    }

    pub fn nrows(&self) -> usize {
        self.rows
    }

    pub fn ncols(&self) -> usize {
        self.numeric_columns + self.onehot_columns
    }

    pub fn numeric_columns(&self) -> usize {
        self.numeric_columns
    }

    pub fn onehot_columns(&self) -> usize {
        self.onehot_columns
    }

    #[inline]
    pub fn row(&self, i: usize) -> &[f64] {
        let width = self.ncols();
        &self.data[i * width..(i + 1) * width]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        (0..self.rows).map(move |i| self.row(i))
    }
}

/// The assembled features of a whole population.
#[derive(Debug, Clone)]
pub struct PopulationFeatures {
    pub matrix: FeatureMatrix,
    pub vocabulary: HydrogenBondVocabulary,
    /// Hydrogen-bond labels of each conformer, in detection order.
    pub hydrogen_bonds: Vec<Vec<String>>,
    /// Zero-based indices of the carbon-bound hydrogens removed from the distances.
    pub carbon_hydrogens: Vec<usize>,
}

struct Reference {
    path: PathBuf,
    elements: Vec<Element>,
    carbon_hydrogens: Vec<usize>,
}

/// Accumulates conformers one at a time and assembles the feature matrix.
///
/// The first conformer fixes the atom ordering: its carbon-bound hydrogens are
/// removed from every conformer, and every later conformer must have the same
/// element sequence.
pub struct FeatureBuilder {
    criteria: GeometryCriteria,
    detector: HydrogenBondDetector,
    reference: Option<Reference>,
    distances: Vec<Vec<f64>>,
    hydrogen_bonds: Vec<Vec<String>>,
}

impl FeatureBuilder {
    pub fn new(criteria: GeometryCriteria) -> Self {
        Self {
            criteria,
            detector: HydrogenBondDetector::new(
                criteria.bond_length_max,
                criteria.hbond_length_max,
            ),
            reference: None,
            distances: Vec::new(),
            hydrogen_bonds: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.distances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    /// Reads a geometry file and adds it to the population.
    pub fn add_path(&mut self, path: &Path) -> Result<(), EngineError> {
        let geometry = GjfFile::read_from_path(path).map_err(|e| EngineError::Geometry {
            path: path.to_path_buf(),
            source: e,
        })?;
        self.add_geometry(path, &geometry)
    }

    /// Adds an already parsed geometry; `path` identifies it in diagnostics.
    pub fn add_geometry(&mut self, path: &Path, geometry: &Geometry) -> Result<(), EngineError> {
        match &self.reference {
            Some(reference) => Self::check_consistency(reference, path, geometry)?,
            None => {
                let carbon_hydrogens = carbon_bound_hydrogens(geometry);
                info!(
                    "Carbon-hydrogen index: {:?}",
                    carbon_hydrogens.iter().map(|i| i + 1).collect::<Vec<_>>()
                );
                self.reference = Some(Reference {
                    path: path.to_path_buf(),
                    elements: geometry.elements().cloned().collect(),
                    carbon_hydrogens,
                });
            }
        }

        let excluded = self
            .reference
            .as_ref()
            .map_or(&[][..], |r| r.carbon_hydrogens.as_slice());
        let row = geometry.distances().upper_triangle_without(excluded);
        let bonds: Vec<String> = self
            .detector
            .detect(geometry)
            .iter()
            .map(|bond| bond.label())
            .collect();
        debug!(
            path = %path.display(),
            distances = row.len(),
            hydrogen_bonds = bonds.len(),
            "Conformer features extracted."
        );
        self.distances.push(row);
        self.hydrogen_bonds.push(bonds);
        Ok(())
    }

    fn check_consistency(
        reference: &Reference,
        path: &Path,
        geometry: &Geometry,
    ) -> Result<(), EngineError> {
        if geometry.len() != reference.elements.len() {
            return Err(EngineError::InconsistentGeometry {
                path: path.to_path_buf(),
                reason: format!(
                    "has {} atoms but '{}' has {}",
                    geometry.len(),
                    reference.path.display(),
                    reference.elements.len()
                ),
            });
        }
        if let Some((idx, (found, expected))) = geometry
            .elements()
            .zip(&reference.elements)
            .find_position(|(found, expected)| found != expected)
        {
            return Err(EngineError::InconsistentGeometry {
                path: path.to_path_buf(),
                reason: format!(
                    "atom {} is {} but it is {} in '{}'",
                    idx + 1,
                    found,
                    expected,
                    reference.path.display()
                ),
            });
        }
        Ok(())
    }

    /// Filters, scales and concatenates the accumulated features.
    #[instrument(skip_all, name = "feature_assembly")]
    pub fn build(self) -> Result<PopulationFeatures, EngineError> {
        let Some(reference) = self.reference else {
            return Err(EngineError::EmptyPopulation);
        };
        let n = self.distances.len();

        let kept = Self::short_distance_columns(&self.distances, self.criteria.distance_cutoff);
        let scaled = Self::min_max_scale(&self.distances, &kept);
        info!("{} distances are used.", kept.len());

        let mut vocabulary = HydrogenBondVocabulary::new();
        for label in self.hydrogen_bonds.iter().flatten() {
            vocabulary.insert(label);
        }
        info!(
            "{} different hydrogen bonds found in {} conformers.",
            vocabulary.len(),
            n
        );

        let width = kept.len() + vocabulary.len();
        let mut data = Vec::with_capacity(n * width);
        for (row, bonds) in scaled.iter().zip(&self.hydrogen_bonds) {
            let mut onehot = vec![0.0; vocabulary.len()];
            for label in bonds {
                if let Some(column) = vocabulary.get(label) {
                    onehot[column] = 1.0;
                }
            }
            data.extend_from_slice(row);
            data.extend(onehot);
        }

        Ok(PopulationFeatures {
            matrix: FeatureMatrix {
                rows: n,
                numeric_columns: kept.len(),
                onehot_columns: vocabulary.len(),
                data,
            },
            vocabulary,
            hydrogen_bonds: self.hydrogen_bonds,
            carbon_hydrogens: reference.carbon_hydrogens,
        })
    }

    /// Columns whose population minimum lies below `cutoff`.
    fn short_distance_columns(rows: &[Vec<f64>], cutoff: f64) -> Vec<usize> {
        let width = rows.first().map_or(0, Vec::len);
        (0..width)
            .filter(|&col| {
                let min = rows.iter().map(|r| r[col]).fold(f64::INFINITY, f64::min);
                min < cutoff
            })
            .collect()
    }

    /// Min-max scales the selected columns to [0, 1]. Constant columns become 0.
    fn min_max_scale(rows: &[Vec<f64>], columns: &[usize]) -> Vec<Vec<f64>> {
        let bounds: Vec<(f64, f64)> = columns
            .iter()
            .map(|&col| {
                rows.iter()
                    .map(|r| r[col])
                    .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                        (lo.min(v), hi.max(v))
                    })
            })
            .collect();
        rows.iter()
            .map(|r| {
                columns
                    .iter()
                    .zip(&bounds)
                    .map(|(&col, &(lo, hi))| {
                        let range = hi - lo;
                        if range > 0.0 { (r[col] - lo) / range } else { 0.0 }
                    })
                    .collect()
            })
            .collect()
    }
}

/// Reads every file in order and assembles the population features.
pub fn build_from_paths<P: AsRef<Path>>(
    paths: &[P],
    criteria: GeometryCriteria,
) -> Result<PopulationFeatures, EngineError> {
    let mut builder = FeatureBuilder::new(criteria);
    for path in paths {
        builder.add_path(path.as_ref())?;
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use nalgebra::Point3;
    use std::fs;
    use tempfile::tempdir;

    fn geometry(atoms: &[(Element, [f64; 3])]) -> Geometry {
        Geometry::new(
            atoms
                .iter()
                .map(|(e, p)| Atom::new(e.clone(), Point3::new(p[0], p[1], p[2])))
                .collect(),
        )
        .unwrap()
    }

    /// Methanol-like fragment plus a water: C, H(on C), O, H(on O), O(water).
    fn conformer(water_x: f64) -> Geometry {
        geometry(&[
            (Element::C, [0.0, 0.0, 0.0]),
            (Element::H, [-1.0, 0.0, 0.0]),
            (Element::O, [1.4, 0.0, 0.0]),
            (Element::H, [2.4, 0.0, 0.0]),
            (Element::O, [water_x, 0.0, 0.0]),
        ])
    }

    fn build(conformers: &[Geometry]) -> PopulationFeatures {
        let mut builder = FeatureBuilder::new(GeometryCriteria::default());
        for (i, g) in conformers.iter().enumerate() {
            builder
                .add_geometry(Path::new(&format!("conf{}.gjf", i)), g)
                .unwrap();
        }
        builder.build().unwrap()
    }

    #[test]
    fn vocabulary_assigns_columns_in_first_seen_order() {
        let mut vocabulary = HydrogenBondVocabulary::new();
        assert_eq!(vocabulary.insert("O3-H4-O5"), 0);
        assert_eq!(vocabulary.insert("N1-H2-O3"), 1);
        assert_eq!(vocabulary.insert("O3-H4-O5"), 0);
        assert_eq!(vocabulary.get("N1-H2-O3"), Some(1));
        assert_eq!(vocabulary.get("missing"), None);
        assert_eq!(vocabulary.labels(), &["O3-H4-O5", "N1-H2-O3"]);
    }

    #[test]
    fn carbon_hydrogens_come_from_first_conformer() {
        let features = build(&[conformer(4.4), conformer(6.0)]);
        assert_eq!(features.carbon_hydrogens, vec![1]);
    }

    #[test]
    fn numeric_columns_keep_only_short_distances_and_scale_to_unit_interval() {
        // After removing H2: atoms C1, O3, H4, O5 -> 10 upper-triangle entries.
        // Kept: the 4 diagonal zeros, C1-O3 (1.4), C1-H4 (2.4), O3-H4 (1.0) and
        // H4-O5, which varies (2.0 then 3.6) and has a minimum below the cutoff.
        let features = build(&[conformer(4.4), conformer(6.0)]);
        let m = &features.matrix;
        assert_eq!(m.nrows(), 2);
        assert_eq!(m.numeric_columns(), 8);
        for row in m.rows() {
            for &v in &row[..m.numeric_columns()] {
                assert!((0.0..=1.0).contains(&v));
            }
        }
        // Varying column H4-O5 maps min to 0 and max to 1.
        let varying: Vec<usize> = (0..m.numeric_columns())
            .filter(|&c| m.row(0)[c] != m.row(1)[c])
            .collect();
        assert_eq!(varying.len(), 1);
        assert_eq!(m.row(0)[varying[0]], 0.0);
        assert_eq!(m.row(1)[varying[0]], 1.0);
    }

    #[test]
    fn one_hot_columns_follow_numeric_columns() {
        let features = build(&[conformer(4.4), conformer(6.0)]);
        let m = &features.matrix;
        assert_eq!(features.hydrogen_bonds[0], vec!["O3-H4-O5"]);
        assert!(features.hydrogen_bonds[1].is_empty());
        assert_eq!(m.onehot_columns(), 1);
        assert_eq!(m.ncols(), m.numeric_columns() + 1);
        assert_eq!(m.row(0)[m.numeric_columns()], 1.0);
        assert_eq!(m.row(1)[m.numeric_columns()], 0.0);
    }

    #[test]
    fn rebuilding_same_population_is_identical() {
        let population = [conformer(4.4), conformer(6.0), conformer(4.3)];
        let first = build(&population);
        let second = build(&population);
        assert_eq!(first.matrix, second.matrix);
        assert_eq!(first.vocabulary, second.vocabulary);
    }

    #[test]
    fn mismatched_atom_count_fails_fast() {
        let mut builder = FeatureBuilder::new(GeometryCriteria::default());
        builder
            .add_geometry(Path::new("a.gjf"), &conformer(4.4))
            .unwrap();
        let short = geometry(&[(Element::C, [0.0, 0.0, 0.0])]);
        let err = builder
            .add_geometry(Path::new("b.gjf"), &short)
            .unwrap_err();
        assert!(matches!(err, EngineError::InconsistentGeometry { .. }));
    }

    #[test]
    fn mismatched_atom_order_names_first_differing_atom() {
        let mut builder = FeatureBuilder::new(GeometryCriteria::default());
        builder
            .add_geometry(Path::new("a.gjf"), &conformer(4.4))
            .unwrap();
        let swapped = geometry(&[
            (Element::C, [0.0, 0.0, 0.0]),
            (Element::O, [1.4, 0.0, 0.0]),
            (Element::H, [-1.0, 0.0, 0.0]),
            (Element::H, [2.4, 0.0, 0.0]),
            (Element::O, [4.4, 0.0, 0.0]),
        ]);
        match builder.add_geometry(Path::new("b.gjf"), &swapped) {
            Err(EngineError::InconsistentGeometry { reason, .. }) => {
                assert!(reason.starts_with("atom 2 is O"));
            }
            other => panic!("unexpected result: {:?}", other.err()),
        }
    }

    #[test]
    fn empty_builder_reports_empty_population() {
        let builder = FeatureBuilder::new(GeometryCriteria::default());
        assert!(matches!(builder.build(), Err(EngineError::EmptyPopulation)));
    }

    #[test]
    fn build_from_paths_reports_unreadable_files() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("good.gjf");
        fs::write(&good, "O 0.0 0.0 0.0\nH 0.96 0.0 0.0\n").unwrap();
        let missing = dir.path().join("missing.gjf");
        let err = build_from_paths(&[good, missing.clone()], GeometryCriteria::default())
            .unwrap_err();
        match err {
            EngineError::Geometry { path, .. } => assert_eq!(path, missing),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn from_rows_rejects_ragged_rows() {
        assert!(FeatureMatrix::from_rows(&[vec![1.0, 2.0], vec![3.0]]).is_err());
        let m = FeatureMatrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(m.row(1), &[3.0, 4.0]);
    }
}
