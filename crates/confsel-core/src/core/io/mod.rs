//! Provides input/output functionality for the files surrounding a clustering run.
//!
//! Geometry input files are read through the [`traits::GeometryFile`] interface, the
//! energy table is parsed into typed records, and selection results are written back
//! out as a combined CSV report.

pub mod energy;
pub mod gjf;
pub mod report;
pub mod traits;
