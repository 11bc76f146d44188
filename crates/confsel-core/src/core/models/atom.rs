use nalgebra::Point3;
use std::fmt;
use std::str::FromStr;

/// Chemical element of an atom, as written in the geometry file.
///
/// Only the elements the clustering algorithms distinguish get their own variant.
/// Every other symbol is kept verbatim in [`Element::Other`] so that it still renders
/// back to the text found in the input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Element {
    H,
    C,
    N,
    O,
    F,
    Other(String),
}

impl Element {
    /// Returns `true` for the electronegative atoms that can act as hydrogen-bond
    /// donors or acceptors (N, O and F).
    pub fn is_hbond_heavy_atom(&self) -> bool {
        matches!(self, Element::N | Element::O | Element::F)
    }

    pub fn is_hydrogen(&self) -> bool {
        matches!(self, Element::H)
    }

    pub fn is_carbon(&self) -> bool {
        matches!(self, Element::C)
    }

    pub fn symbol(&self) -> &str {
        match self {
            Element::H => "H",
            Element::C => "C",
            Element::N => "N",
            Element::O => "O",
            Element::F => "F",
            Element::Other(symbol) => symbol,
        }
    }
}

impl FromStr for Element {
    type Err = std::convert::Infallible;

    /// Parses an element symbol. Symbols are case-sensitive, so `"Co"` is cobalt and
    /// never confused with carbon.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "H" => Element::H,
            "C" => Element::C,
            "N" => Element::N,
            "O" => Element::O,
            "F" => Element::F,
            other => Element::Other(other.to_string()),
        })
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A single atom of a conformer.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The chemical element of the atom.
    pub element: Element,
    /// Cartesian coordinates in Angstroms.
    pub position: Point3<f64>,
}

impl Atom {
    pub fn new(element: Element, position: Point3<f64>) -> Self {
        Self { element, position }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_str_maps_known_symbols_to_variants() {
        assert_eq!(Element::from_str("H").unwrap(), Element::H);
        assert_eq!(Element::from_str("C").unwrap(), Element::C);
        assert_eq!(Element::from_str("N").unwrap(), Element::N);
        assert_eq!(Element::from_str("O").unwrap(), Element::O);
        assert_eq!(Element::from_str("F").unwrap(), Element::F);
    }

    #[test]
    fn from_str_keeps_unknown_symbols_verbatim() {
        let cl = Element::from_str("Cl").unwrap();
        assert_eq!(cl, Element::Other("Cl".to_string()));
        assert_eq!(cl.to_string(), "Cl");
    }

    #[test]
    fn from_str_is_case_sensitive() {
        assert_eq!(
            Element::from_str("Co").unwrap(),
            Element::Other("Co".to_string())
        );
        assert!(!Element::from_str("Co").unwrap().is_carbon());
    }

    #[test]
    fn hbond_heavy_atoms_are_nitrogen_oxygen_and_fluorine() {
        assert!(Element::N.is_hbond_heavy_atom());
        assert!(Element::O.is_hbond_heavy_atom());
        assert!(Element::F.is_hbond_heavy_atom());
        assert!(!Element::C.is_hbond_heavy_atom());
        assert!(!Element::H.is_hbond_heavy_atom());
        assert!(!Element::Other("S".to_string()).is_hbond_heavy_atom());
    }

    #[test]
    fn new_atom_stores_element_and_position() {
        let atom = Atom::new(Element::O, Point3::new(1.0, -2.0, 3.5));
        assert_eq!(atom.element, Element::O);
        assert_eq!(atom.position, Point3::new(1.0, -2.0, 3.5));
    }
}
