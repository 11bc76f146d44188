//! # Core Models Module
//!
//! Data structures describing one conformer and the records that flow through the
//! clustering pipeline.
//!
//! - [`atom`] - Element symbols and atoms with Cartesian positions
//! - [`geometry`] - Ordered atom lists together with their pairwise distance matrix
//! - [`record`] - Energy table rows and per-conformer clustering records

pub mod atom;
pub mod geometry;
pub mod record;
