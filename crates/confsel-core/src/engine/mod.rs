//! # Engine Module
//!
//! This module turns a population of parsed conformers into cluster assignments.
//!
//! ## Overview
//!
//! The engine assembles one feature vector per conformer (scaled short interatomic
//! distances followed by one-hot hydrogen-bond columns), runs K-means for every
//! candidate cluster count, and picks the cluster count at the knee of the
//! resulting inertia curve.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Geometric thresholds, the candidate k range and
//!   K-means parameters, assembled through a validating builder
//! - **Features** ([`features`]) - Population-wide feature matrix and hydrogen-bond vocabulary
//! - **Clustering** ([`kmeans`], [`sweep`]) - Lloyd's K-means and the parallel sweep over k
//! - **Knee Selection** ([`knee`]) - Elbow detection on the inertia curve
//! - **Progress Monitoring** ([`progress`]) - Progress events for front ends
//! - **Error Handling** ([`error`]) - Engine-level error type wrapping every lower layer

pub mod config;
pub mod error;
pub mod features;
pub mod kmeans;
pub mod knee;
pub mod progress;
pub mod sweep;
