//! Reader for Gaussian-style input files (`.gjf`, `.com`).
//!
//! Only the Cartesian atom lines are of interest: an element symbol followed by three
//! coordinates. Route sections, titles, charge/multiplicity lines and any trailing
//! directives are skipped.

use super::traits::GeometryFile;
use crate::core::models::atom::{Atom, Element};
use crate::core::models::geometry::GeometryError;
use nalgebra::Point3;
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::BufRead;
use std::str::FromStr;
use tracing::debug;

/// Symbol (1–3 letters, first uppercase) and three decimal coordinates, each with an
/// optional exponent, separated by runs of whitespace, commas, backslashes or bars.
/// Anchored at the start only, so trailing columns are tolerated.
static ATOM_LINE: Lazy<Regex> = Lazy::new(|| {
    let coordinate = r"(-?\d+\.\d*(?:[eE][-+]?\d+)?)";
    let separator = r"[\s|,\\]+";
    Regex::new(&format!(
        r"^([A-Z][a-z]{{0,2}}){separator}{coordinate}{separator}{coordinate}{separator}{coordinate}"
    ))
    .expect("atom line pattern is valid")
});

pub struct GjfFile;

impl GjfFile {
    fn parse_coordinate(value: &str, line: usize) -> Result<f64, GeometryError> {
        value.parse().map_err(|_| GeometryError::InvalidCoordinate {
            line,
            value: value.to_string(),
        })
    }
}

impl GeometryFile for GjfFile {
    type Error = GeometryError;

    fn read_atoms(reader: &mut impl BufRead) -> Result<Vec<Atom>, Self::Error> {
        let mut atoms = Vec::new();
        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;
            let Some(caps) = ATOM_LINE.captures(line.trim()) else {
                continue;
            };
            let element = match Element::from_str(&caps[1]) {
                Ok(element) => element,
                Err(never) => match never {},
            };
            let x = Self::parse_coordinate(&caps[2], line_num)?;
            let y = Self::parse_coordinate(&caps[3], line_num)?;
            let z = Self::parse_coordinate(&caps[4], line_num)?;
            atoms.push(Atom::new(element, Point3::new(x, y, z)));
        }
        debug!(num_atoms = atoms.len(), "Parsed atom coordinate lines.");
        Ok(atoms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;
    use tempfile::tempdir;

    const WATER_DIMER: &str = "\
%nprocshared=8
%mem=4GB
# B3LYP/6-31G(d) opt

water dimer conformer 1

0 1
O    0.000000   0.000000   0.000000
H    0.957200   0.000000   0.000000
H   -0.239987   0.926627   0.000000
O    2.900000   0.000000   0.000000
H    3.300000   0.800000   0.000000
H    3.300000  -0.800000   0.000000

";

    #[test]
    fn read_from_extracts_atoms_in_file_order() {
        let mut reader = Cursor::new(WATER_DIMER);
        let geometry = GjfFile::read_from(&mut reader).unwrap();
        assert_eq!(geometry.len(), 6);
        let symbols: Vec<&str> = geometry.elements().map(Element::symbol).collect();
        assert_eq!(symbols, vec!["O", "H", "H", "O", "H", "H"]);
        assert_eq!(geometry.atoms()[2].position, Point3::new(-0.239987, 0.926627, 0.0));
    }

    #[test]
    fn header_and_charge_lines_are_ignored() {
        let mut reader = Cursor::new("# hf/sto-3g\n\ntitle\n\n0 1\nC 0.0 0.0 0.0\n");
        let atoms = GjfFile::read_atoms(&mut reader).unwrap();
        assert_eq!(atoms.len(), 1);
        assert_eq!(atoms[0].element, Element::C);
    }

    #[test]
    fn comma_and_backslash_separators_are_accepted() {
        let mut reader = Cursor::new("N,1.0,-2.5,3.\nCl\\0.5\\0.25\\-0.125\n");
        let atoms = GjfFile::read_atoms(&mut reader).unwrap();
        assert_eq!(atoms.len(), 2);
        assert_eq!(atoms[0].position, Point3::new(1.0, -2.5, 3.0));
        assert_eq!(atoms[1].element, Element::Other("Cl".to_string()));
        assert_eq!(atoms[1].position, Point3::new(0.5, 0.25, -0.125));
    }

    #[test]
    fn scientific_notation_coordinates_keep_their_exponent() {
        let mut reader = Cursor::new("C 0.0 0.0 1.5e-2\nH 2.5E+01,-1.0e0,3.0\n");
        let atoms = GjfFile::read_atoms(&mut reader).unwrap();
        assert_eq!(atoms.len(), 2);
        assert_eq!(atoms[0].position, Point3::new(0.0, 0.0, 0.015));
        assert_eq!(atoms[1].position, Point3::new(25.0, -1.0, 3.0));
    }

    #[test]
    fn lines_with_integer_coordinates_or_lowercase_symbols_do_not_match() {
        let mut reader = Cursor::new("C 0 0 0\nc 0.0 0.0 0.0\nC 1.0 2.0\n");
        let atoms = GjfFile::read_atoms(&mut reader).unwrap();
        assert!(atoms.is_empty());
    }

    #[test]
    fn trailing_columns_after_coordinates_are_tolerated() {
        let mut reader = Cursor::new("  O  0.1  0.2  0.3  H  \n");
        let atoms = GjfFile::read_atoms(&mut reader).unwrap();
        assert_eq!(atoms.len(), 1);
        assert_eq!(atoms[0].position, Point3::new(0.1, 0.2, 0.3));
    }

    #[test]
    fn file_without_atom_lines_is_an_error() {
        let mut reader = Cursor::new("# route\n\ntitle\n\n0 1\n");
        let result = GjfFile::read_from(&mut reader);
        assert!(matches!(result, Err(GeometryError::NoAtoms)));
    }

    #[test]
    fn read_from_path_reads_file_and_reports_missing_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("conf.gjf");
        fs::write(&path, WATER_DIMER).unwrap();
        assert_eq!(GjfFile::read_from_path(&path).unwrap().len(), 6);

        let missing = GjfFile::read_from_path(dir.path().join("missing.gjf"));
        assert!(matches!(missing, Err(GeometryError::Io(_))));
    }
}
