use super::atom::{Atom, Element};
use nalgebra::DMatrix;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid coordinate on line {line} (value: '{value}')")]
    InvalidCoordinate { line: usize, value: String },
    #[error("No atom coordinate lines were found")]
    NoAtoms,
}

/// Full pairwise Euclidean distance matrix of a geometry, in Angstroms.
///
/// The matrix is square, symmetric and has a zero diagonal.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    inner: DMatrix<f64>,
}

impl DistanceMatrix {
    pub fn from_atoms(atoms: &[Atom]) -> Self {
        let n = atoms.len();
        let mut inner = DMatrix::zeros(n, n);
        for i in 0..n {
            for j in (i + 1)..n {
                let d = nalgebra::distance(&atoms[i].position, &atoms[j].position);
                inner[(i, j)] = d;
                inner[(j, i)] = d;
            }
        }
        Self { inner }
    }

    pub fn size(&self) -> usize {
        self.inner.nrows()
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.inner[(i, j)]
    }

    /// Index of the atom closest to `i`, excluding `i` itself.
    ///
    /// Ties resolve to the lowest index. Returns `None` for single-atom geometries.
    pub fn nearest_neighbor(&self, i: usize) -> Option<usize> {
        (0..self.size())
            .filter(|&j| j != i)
            .fold(None, |best: Option<(usize, f64)>, j| {
                let d = self.get(i, j);
                match best {
                    Some((_, best_d)) if best_d <= d => best,
                    _ => Some((j, d)),
                }
            })
            .map(|(j, _)| j)
    }

    /// Flattens the upper triangle (diagonal included) of the matrix after removing
    /// the rows and columns listed in `excluded`.
    ///
    /// Entries are emitted row by row, matching the order of a row-major
    /// upper-triangular index walk over the reduced matrix.
    pub fn upper_triangle_without(&self, excluded: &[usize]) -> Vec<f64> {
        let kept: Vec<usize> = (0..self.size())
            .filter(|idx| !excluded.contains(idx))
            .collect();
        let mut values = Vec::with_capacity(kept.len() * (kept.len() + 1) / 2);
        for (a, &i) in kept.iter().enumerate() {
            for &j in &kept[a..] {
                values.push(self.get(i, j));
            }
        }
        values
    }
}

/// One conformer: its atoms in file order and their distance matrix.
#[derive(Debug, Clone)]
pub struct Geometry {
    atoms: Vec<Atom>,
    distances: DistanceMatrix,
}

impl Geometry {
    /// Builds a geometry and its distance matrix.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::NoAtoms`] if `atoms` is empty, since an empty
    /// distance matrix cannot contribute features.
    pub fn new(atoms: Vec<Atom>) -> Result<Self, GeometryError> {
        if atoms.is_empty() {
            return Err(GeometryError::NoAtoms);
        }
        let distances = DistanceMatrix::from_atoms(&atoms);
        Ok(Self { atoms, distances })
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn distances(&self) -> &DistanceMatrix {
        &self.distances
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.atoms.iter().map(|a| &a.element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn atom(element: Element, x: f64, y: f64, z: f64) -> Atom {
        Atom::new(element, Point3::new(x, y, z))
    }

    fn sample_geometry() -> Geometry {
        Geometry::new(vec![
            atom(Element::O, 0.0, 0.0, 0.0),
            atom(Element::H, 0.96, 0.0, 0.0),
            atom(Element::H, -0.24, 0.93, 0.0),
            atom(Element::C, 1.5, -2.0, 0.7),
        ])
        .unwrap()
    }

    #[test]
    fn distance_matrix_is_symmetric_with_zero_diagonal() {
        let geometry = sample_geometry();
        let d = geometry.distances();
        assert_eq!(d.size(), 4);
        for i in 0..d.size() {
            assert_eq!(d.get(i, i), 0.0);
            for j in 0..d.size() {
                assert_eq!(d.get(i, j), d.get(j, i));
            }
        }
    }

    #[test]
    fn distance_matrix_holds_euclidean_distances() {
        let geometry = Geometry::new(vec![
            atom(Element::C, 0.0, 0.0, 0.0),
            atom(Element::C, 3.0, 4.0, 0.0),
        ])
        .unwrap();
        assert!((geometry.distances().get(0, 1) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn new_geometry_rejects_empty_atom_list() {
        assert!(matches!(Geometry::new(Vec::new()), Err(GeometryError::NoAtoms)));
    }

    #[test]
    fn nearest_neighbor_excludes_self() {
        let geometry = sample_geometry();
        assert_eq!(geometry.distances().nearest_neighbor(1), Some(0));
        assert_eq!(geometry.distances().nearest_neighbor(2), Some(0));
    }

    #[test]
    fn nearest_neighbor_is_none_for_single_atom() {
        let geometry = Geometry::new(vec![atom(Element::H, 0.0, 0.0, 0.0)]).unwrap();
        assert_eq!(geometry.distances().nearest_neighbor(0), None);
    }

    #[test]
    fn upper_triangle_includes_diagonal_in_row_major_order() {
        let geometry = Geometry::new(vec![
            atom(Element::C, 0.0, 0.0, 0.0),
            atom(Element::C, 1.0, 0.0, 0.0),
            atom(Element::C, 3.0, 0.0, 0.0),
        ])
        .unwrap();
        let values = geometry.distances().upper_triangle_without(&[]);
        assert_eq!(values, vec![0.0, 1.0, 3.0, 0.0, 2.0, 0.0]);
    }

    #[test]
    fn upper_triangle_drops_excluded_rows_and_columns() {
        let geometry = Geometry::new(vec![
            atom(Element::C, 0.0, 0.0, 0.0),
            atom(Element::H, 1.0, 0.0, 0.0),
            atom(Element::C, 3.0, 0.0, 0.0),
        ])
        .unwrap();
        let values = geometry.distances().upper_triangle_without(&[1]);
        assert_eq!(values, vec![0.0, 3.0, 0.0]);
    }
}
