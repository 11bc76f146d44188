//! # Workflows Module
//!
//! End-to-end procedures built on top of [`crate::core`] and [`crate::engine`].
//!
//! - **Clustering** ([`cluster`]) - Parses a list of geometry files, sweeps K-means over
//!   the candidate cluster counts and returns the labels at the knee of the inertia curve.
//! - **Selection** ([`select`]) - Clusters the conformers of an energy table, writes the
//!   selection report and copies the lowest-energy conformer of every cluster.

pub mod cluster;
pub mod select;
