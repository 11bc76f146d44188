use crate::core::models::record::EnergyRecord;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Header of the column holding conformer energies.
pub const ENERGY_COLUMN: &str = "energy/(kcal/mol)";

#[derive(Debug, Error)]
pub enum EnergyTableError {
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("Energy table '{path}' has no 'energy/(kcal/mol)' column")]
    MissingEnergyColumn { path: String },
    #[error("Invalid energy on data row {row} of '{path}' (value: '{value}')")]
    InvalidEnergy {
        path: String,
        row: usize,
        value: String,
    },
    #[error("Energy table '{path}' contains no conformers")]
    Empty { path: String },
}

/// The parsed energy table: the original header plus one typed record per row.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyTable {
    headers: Vec<String>,
    energy_column: usize,
    records: Vec<EnergyRecord>,
}

impl EnergyTable {
    pub fn read_from_path(path: &Path) -> Result<Self, EnergyTableError> {
        let label = path.to_string_lossy().to_string();
        let reader = csv::Reader::from_path(path).map_err(|e| EnergyTableError::Csv {
            path: label.clone(),
            source: e,
        })?;
        Self::from_csv_reader(reader, &label)
    }

    /// Reads a table from any reader; `label` names the source in error messages.
    pub fn read_from(reader: impl Read, label: &str) -> Result<Self, EnergyTableError> {
        Self::from_csv_reader(csv::Reader::from_reader(reader), label)
    }

    fn from_csv_reader<R: Read>(
        mut reader: csv::Reader<R>,
        label: &str,
    ) -> Result<Self, EnergyTableError> {
        let csv_err = |e| EnergyTableError::Csv {
            path: label.to_string(),
            source: e,
        };

        let headers: Vec<String> = reader
            .headers()
            .map_err(csv_err)?
            .iter()
            .map(str::to_string)
            .collect();
        let energy_column = headers
            .iter()
            .position(|h| h.trim() == ENERGY_COLUMN)
            .ok_or_else(|| EnergyTableError::MissingEnergyColumn {
                path: label.to_string(),
            })?;

        let mut records = Vec::new();
        for (row, result) in reader.records().enumerate() {
            let record = result.map_err(csv_err)?;
            let fields: Vec<String> = record.iter().map(str::to_string).collect();
            let raw_energy = fields[energy_column].trim();
            let energy = raw_energy
                .parse()
                .map_err(|_| EnergyTableError::InvalidEnergy {
                    path: label.to_string(),
                    row: row + 1,
                    value: raw_energy.to_string(),
                })?;
            records.push(EnergyRecord {
                file: fields[0].trim().to_string(),
                energy,
                fields,
            });
        }

        if records.is_empty() {
            return Err(EnergyTableError::Empty {
                path: label.to_string(),
            });
        }
        debug!(
            rows = records.len(),
            columns = headers.len(),
            "Energy table loaded."
        );
        Ok(Self {
            headers,
            energy_column,
            records,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn energy_column(&self) -> usize {
        self.energy_column
    }

    pub fn records(&self) -> &[EnergyRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.file.as_str())
    }
}
