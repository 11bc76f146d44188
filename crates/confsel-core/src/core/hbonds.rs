//! Geometric hydrogen-bond detection.
//!
//! A hydrogen bond here is purely a distance pattern: a hydrogen that sits within a
//! covalent bond length of one N/O/F atom and within hydrogen-bond range of another.
//! No angular or electronic criteria are applied.

use super::models::atom::Element;
use super::models::geometry::Geometry;
use std::fmt;
use tracing::trace;

/// Default covalent cutoff for N/O/F–H bonds, in Angstroms.
pub const DEFAULT_BOND_LENGTH_MAX: f64 = 1.2;
/// Default hydrogen-bond contact cutoff, in Angstroms.
pub const DEFAULT_HBOND_LENGTH_MAX: f64 = 2.5;

/// A donor–hydrogen···acceptor triple found in one geometry.
///
/// Indices are zero-based positions in the geometry; the rendered label uses
/// one-based indices, e.g. `N1-H2-O3`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HydrogenBond {
    pub donor: usize,
    pub donor_element: Element,
    pub hydrogen: usize,
    pub acceptor: usize,
    pub acceptor_element: Element,
}

impl HydrogenBond {
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for HydrogenBond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}-H{}-{}{}",
            self.donor_element,
            self.donor + 1,
            self.hydrogen + 1,
            self.acceptor_element,
            self.acceptor + 1
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HydrogenBondDetector {
    bond_length_max: f64,
    hbond_length_max: f64,
}

impl Default for HydrogenBondDetector {
    fn default() -> Self {
        Self::new(DEFAULT_BOND_LENGTH_MAX, DEFAULT_HBOND_LENGTH_MAX)
    }
}

impl HydrogenBondDetector {
    pub fn new(bond_length_max: f64, hbond_length_max: f64) -> Self {
        Self {
            bond_length_max,
            hbond_length_max,
        }
    }

    /// Finds every hydrogen bond in `geometry`.
    ///
    /// For each hydrogen, N/O/F atoms within `bond_length_max` are its covalent
    /// partners and those further away but within `hbond_length_max` are its
    /// contacts. One bond is emitted per (partner, contact) pair, hydrogens in index
    /// order, partners and contacts in index order. Duplicates are kept.
    pub fn detect(&self, geometry: &Geometry) -> Vec<HydrogenBond> {
        let atoms = geometry.atoms();
        let distances = geometry.distances();
        let heavy: Vec<usize> = (0..atoms.len())
            .filter(|&i| atoms[i].element.is_hbond_heavy_atom())
            .collect();

        let mut bonds = Vec::new();
        for (h, atom) in atoms.iter().enumerate() {
            if !atom.element.is_hydrogen() {
                continue;
            }
            let mut partners = Vec::new();
            let mut contacts = Vec::new();
            for &j in &heavy {
                let d = distances.get(h, j);
                if d <= self.bond_length_max {
                    partners.push(j);
                } else if d <= self.hbond_length_max {
                    contacts.push(j);
                }
            }
            for &donor in &partners {
                for &acceptor in &contacts {
                    let bond = HydrogenBond {
                        donor,
                        donor_element: atoms[donor].element.clone(),
                        hydrogen: h,
                        acceptor,
                        acceptor_element: atoms[acceptor].element.clone(),
                    };
                    trace!(label = %bond, "Hydrogen bond detected.");
                    bonds.push(bond);
                }
            }
        }
        bonds
    }
}

/// Indices of hydrogens whose nearest neighbour is a carbon atom.
///
/// Distances involving these non-polar hydrogens carry little conformational
/// information and are removed from the numeric features.
pub fn carbon_bound_hydrogens(geometry: &Geometry) -> Vec<usize> {
    let atoms = geometry.atoms();
    let distances = geometry.distances();
    atoms
        .iter()
        .enumerate()
        .filter(|(_, atom)| atom.element.is_hydrogen())
        .filter_map(|(i, _)| {
            distances
                .nearest_neighbor(i)
                .filter(|&j| atoms[j].element.is_carbon())
                .map(|_| i)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use nalgebra::Point3;

    fn atom(element: Element, x: f64) -> Atom {
        Atom::new(element, Point3::new(x, 0.0, 0.0))
    }

    #[test]
    fn detects_single_n_h_o_bond_with_one_based_label() {
        // N at 0.0, H at 1.0 (covalent), O at 3.0 (2.0 from H).
        let geometry =
            Geometry::new(vec![atom(Element::N, 0.0), atom(Element::H, 1.0), atom(Element::O, 3.0)])
                .unwrap();
        let bonds = HydrogenBondDetector::default().detect(&geometry);
        assert_eq!(bonds.len(), 1);
        assert_eq!(bonds[0].label(), "N1-H2-O3");
    }

    #[test]
    fn hydrogen_without_covalent_partner_emits_nothing() {
        let geometry =
            Geometry::new(vec![atom(Element::C, 0.0), atom(Element::H, 1.1), atom(Element::O, 3.0)])
                .unwrap();
        assert!(HydrogenBondDetector::default().detect(&geometry).is_empty());
    }

    #[test]
    fn contacts_beyond_hbond_cutoff_are_ignored() {
        let geometry =
            Geometry::new(vec![atom(Element::O, 0.0), atom(Element::H, 1.0), atom(Element::N, 3.6)])
                .unwrap();
        assert!(HydrogenBondDetector::default().detect(&geometry).is_empty());
    }

    #[test]
    fn emits_cross_product_of_partners_and_contacts() {
        // H at origin, two covalent partners, two contacts (in index order).
        let geometry = Geometry::new(vec![
            Atom::new(Element::H, Point3::new(0.0, 0.0, 0.0)),
            Atom::new(Element::O, Point3::new(1.0, 0.0, 0.0)),
            Atom::new(Element::N, Point3::new(-1.1, 0.0, 0.0)),
            Atom::new(Element::F, Point3::new(0.0, 2.0, 0.0)),
            Atom::new(Element::O, Point3::new(0.0, -2.4, 0.0)),
        ])
        .unwrap();
        let labels: Vec<String> = HydrogenBondDetector::default()
            .detect(&geometry)
            .iter()
            .map(HydrogenBond::label)
            .collect();
        assert_eq!(labels, vec!["O2-H1-F4", "O2-H1-O5", "N3-H1-F4", "N3-H1-O5"]);
    }

    #[test]
    fn custom_cutoffs_are_respected() {
        let geometry =
            Geometry::new(vec![atom(Element::N, 0.0), atom(Element::H, 1.0), atom(Element::O, 3.0)])
                .unwrap();
        let strict = HydrogenBondDetector::new(1.2, 1.9);
        assert!(strict.detect(&geometry).is_empty());
    }

    #[test]
    fn carbon_bound_hydrogens_are_found_by_nearest_neighbor() {
        let geometry = Geometry::new(vec![
            atom(Element::C, 0.0),
            atom(Element::H, 1.09),
            atom(Element::O, 3.0),
            atom(Element::H, 3.97),
        ])
        .unwrap();
        assert_eq!(carbon_bound_hydrogens(&geometry), vec![1]);
    }
}
