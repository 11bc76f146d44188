use crate::core::models::atom::Atom;
use crate::core::models::geometry::{Geometry, GeometryError};
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Defines the interface for reading conformer geometry file formats.
///
/// Implementors only need to extract atoms from a buffered reader; building the
/// [`Geometry`] and reading from paths come for free.
pub trait GeometryFile {
    /// The error type for I/O and parsing operations.
    type Error: Error + From<io::Error> + From<GeometryError>;

    /// Reads the ordered atom list from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or I/O operations encounter issues.
    fn read_atoms(reader: &mut impl BufRead) -> Result<Vec<Atom>, Self::Error>;

    /// Reads a geometry, including its distance matrix, from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or if no atoms can be found.
    fn read_from(reader: &mut impl BufRead) -> Result<Geometry, Self::Error> {
        let atoms = Self::read_atoms(reader)?;
        Ok(Geometry::new(atoms)?)
    }

    /// Reads a geometry from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Geometry, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }
}
