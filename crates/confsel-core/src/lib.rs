//! # confsel Core Library
//!
//! Clusters a population of molecular conformers by their geometry and hydrogen-bond
//! patterns, chooses the number of clusters automatically from the K-means inertia
//! curve, and selects the lowest-energy conformer of every cluster.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture so that every stage of the
//! pipeline can be tested in isolation.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Atom`, `Geometry`,
//!   `DistanceMatrix`), geometric hydrogen-bond detection and file I/O for geometry
//!   files, energy tables and selection reports.
//!
//! - **[`engine`]: The Logic Core.** Population-wide feature assembly, the K-means
//!   implementation, the parallel sweep over candidate cluster counts and the knee
//!   selector, together with configuration, errors and progress reporting.
//!
//! - **[`workflows`]: The Public API.** End-to-end procedures that tie `core` and
//!   `engine` together: clustering a list of geometry files, and selecting the
//!   representative conformers listed in an energy table.

pub mod core;
pub mod engine;
pub mod workflows;
