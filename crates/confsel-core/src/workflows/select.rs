use super::cluster::{self, ClusteringOutcome};
use crate::core::io::energy::EnergyTable;
use crate::core::io::report::SelectionReport;
use crate::core::models::record::ConformerRecord;
use crate::engine::config::ClusteringConfig;
use crate::engine::error::EngineError;
use crate::engine::features::PopulationFeatures;
use crate::engine::progress::ProgressReporter;
use itertools::Itertools;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// Directory, created inside the output directory, that receives the selected files.
pub const SELECTED_DIR: &str = "selected";
pub const GROUP_COLUMN: &str = "group id";
pub const HYDROGEN_BONDS_COLUMN: &str = "hydrogen bonds";

#[derive(Debug, Clone, PartialEq)]
pub struct SelectOptions {
    /// Where the report and the `selected/` directory are written.
    pub output_dir: PathBuf,
}

impl Default for SelectOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
        }
    }
}

/// Conformers ordered by (cluster, original row), plus the representative of each cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub records: Vec<ConformerRecord>,
    /// Indices into `records` of the lowest-energy conformer of each cluster, by
    /// ascending cluster id.
    pub selected: Vec<usize>,
}

impl Selection {
    pub fn selected_records(&self) -> impl Iterator<Item = &ConformerRecord> {
        self.selected.iter().map(|&i| &self.records[i])
    }

    /// Lays the selection out as the report table: the original columns with the
    /// cluster id inserted second and the hydrogen-bond list appended last.
    pub fn to_report(&self, table: &EnergyTable) -> SelectionReport {
        let mut headers = table.headers().to_vec();
        headers.insert(1.min(headers.len()), GROUP_COLUMN.to_string());
        headers.push(HYDROGEN_BONDS_COLUMN.to_string());

        let row_of = |record: &ConformerRecord| {
            let mut fields = table.records()[record.row].fields.clone();
            let group = record.cluster().map_or_else(String::new, |c| c.to_string());
            fields.insert(1.min(fields.len()), group);
            fields.push(record.hydrogen_bonds_cell());
            fields
        };

        SelectionReport {
            headers,
            selected: self.selected_records().map(row_of).collect(),
            all: self.records.iter().map(row_of).collect(),
        }
    }
}

/// Joins the energy table with the per-conformer features, in table order.
pub fn build_records(
    table: &EnergyTable,
    features: &PopulationFeatures,
) -> Result<Vec<ConformerRecord>, EngineError> {
    if features.matrix.nrows() != table.len() {
        return Err(EngineError::LabelMismatch {
            labels: features.matrix.nrows(),
            rows: table.len(),
        });
    }
    Ok(table
        .records()
        .iter()
        .enumerate()
        .map(|(row, record)| {
            ConformerRecord::new(
                row,
                record,
                features.matrix.row(row).to_vec(),
                features.hydrogen_bonds[row].clone(),
            )
        })
        .collect())
}

/// Assigns `labels` to the records, orders them by (cluster, original row) and picks
/// the lowest-energy conformer of every cluster. Ties keep the earliest row.
pub fn select(
    mut records: Vec<ConformerRecord>,
    labels: &[usize],
) -> Result<Selection, EngineError> {
    if labels.len() != records.len() {
        return Err(EngineError::LabelMismatch {
            labels: labels.len(),
            rows: records.len(),
        });
    }
    for (record, &label) in records.iter_mut().zip(labels) {
        record.assign_cluster(label).map_err(|existing| {
            EngineError::Internal(format!(
                "conformer '{}' already belongs to cluster {}",
                record.file, existing
            ))
        })?;
    }
    records.sort_by_key(|r| (r.cluster(), r.row));

    // `min_by` keeps the first of equal minima.
    let selected: Vec<usize> = records
        .iter()
        .enumerate()
        .chunk_by(|(_, r)| r.cluster())
        .into_iter()
        .filter_map(|(_, group)| {
            group
                .min_by(|(_, a), (_, b)| a.energy.total_cmp(&b.energy))
                .map(|(i, _)| i)
        })
        .collect();
    debug!(
        clusters = selected.len(),
        conformers = records.len(),
        "Representatives selected."
    );
    Ok(Selection { records, selected })
}

/// Everything produced by a selection run.
#[derive(Debug, Clone)]
pub struct SelectionOutcome {
    pub clustering: ClusteringOutcome,
    pub selection: Selection,
    pub report: SelectionReport,
    pub report_path: PathBuf,
    /// Destination paths of the copied conformer files.
    pub copied: Vec<PathBuf>,
}

/// Resolves a file id from the energy table; relative ids are taken relative to
/// the directory holding the table.
fn resolve_conformer_path(base: &Path, file: &str) -> PathBuf {
    let path = Path::new(file);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Clusters the conformers listed in `energy_path`, writes the selection report and
/// copies the representative conformers into `selected/`.
///
/// Nothing is written unless clustering succeeds, and an existing `selected/`
/// directory aborts the run before anything is created. The report is written
/// after the copies; if either step fails, `selected/` is removed again.
#[instrument(skip_all, name = "selection_workflow")]
pub fn run(
    energy_path: &Path,
    config: &ClusteringConfig,
    options: &SelectOptions,
    reporter: &ProgressReporter,
) -> Result<SelectionOutcome, EngineError> {
    let table = EnergyTable::read_from_path(energy_path)?;
    info!(
        "Loaded {} conformers from '{}'.",
        table.len(),
        energy_path.display()
    );

    let base = energy_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let paths: Vec<PathBuf> = table
        .files()
        .map(|file| resolve_conformer_path(base, file))
        .collect();

    let clustering = cluster::run(&paths, config, reporter)?;
    let records = build_records(&table, &clustering.features)?;
    let selection = select(records, &clustering.labels)?;
    let report = selection.to_report(&table);

    let selected_dir = options.output_dir.join(SELECTED_DIR);
    if selected_dir.exists() {
        return Err(EngineError::OutputExists { path: selected_dir });
    }

    let (report_path, copied) = reporter.phase("Writing Output", || {
        write_outputs(&selection, &report, &paths, &options.output_dir)
    })?;
    info!(
        "Selected {} of {} conformers; report written to '{}'.",
        copied.len(),
        table.len(),
        report_path.display()
    );

    Ok(SelectionOutcome {
        clustering,
        selection,
        report,
        report_path,
        copied,
    })
}

/// Copies the representatives into `selected/`, then writes the report next to it.
fn write_outputs(
    selection: &Selection,
    report: &SelectionReport,
    sources: &[PathBuf],
    output_dir: &Path,
) -> Result<(PathBuf, Vec<PathBuf>), EngineError> {
    fs::create_dir_all(output_dir).map_err(|e| EngineError::Io {
        path: output_dir.to_path_buf(),
        source: e,
    })?;
    let selected_dir = output_dir.join(SELECTED_DIR);
    let written = copy_selected(selection, sources, &selected_dir).and_then(|copied| {
        write_report(report, output_dir).map(|report_path| (report_path, copied))
    });
    if written.is_err() && selected_dir.is_dir() {
        if let Err(e) = fs::remove_dir_all(&selected_dir) {
            warn!(
                "Could not remove partial output '{}': {}",
                selected_dir.display(),
                e
            );
        }
    }
    written
}

fn write_report(report: &SelectionReport, output_dir: &Path) -> Result<PathBuf, EngineError> {
    let path = output_dir.join(report.file_name());
    report
        .write_to_path(&path)
        .map_err(|e| EngineError::Report {
            path: path.clone(),
            source: e,
        })?;
    Ok(path)
}

fn copy_selected(
    selection: &Selection,
    sources: &[PathBuf],
    selected_dir: &Path,
) -> Result<Vec<PathBuf>, EngineError> {
    fs::create_dir(selected_dir).map_err(|e| EngineError::Io {
        path: selected_dir.to_path_buf(),
        source: e,
    })?;
    selection
        .selected_records()
        .map(|record| {
            let source = &sources[record.row];
            let name = source.file_name().ok_or_else(|| {
                EngineError::Internal(format!("'{}' has no file name", source.display()))
            })?;
            let destination = selected_dir.join(name);
            fs::copy(source, &destination).map_err(|e| EngineError::Io {
                path: source.clone(),
                source: e,
            })?;
            debug!(from = %source.display(), to = %destination.display(), "Copied conformer.");
            Ok(destination)
        })
        .collect()
}
