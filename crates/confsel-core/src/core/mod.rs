//! # Core Module
//!
//! Fundamental building blocks for describing a single conformer and reading or
//! writing the files that surround a clustering run.
//!
//! - **Molecular Representation** ([`models`]) - Atoms, geometries, distance matrices
//!   and per-conformer records
//! - **Hydrogen Bonds** ([`hbonds`]) - Geometric donor/hydrogen/acceptor detection
//! - **File I/O** ([`io`]) - Geometry input files, energy tables and selection reports

pub mod hbonds;
pub mod io;
pub mod models;
