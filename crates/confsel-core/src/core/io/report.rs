use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

/// Line separating the selected conformers from the full table.
pub const SECTION_MARKER: &str = "all conformers";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV writing error: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV writer could not be finalized: {0}")]
    Finalize(String),
}

/// Tabular content of the selection report: one header and two row sections.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionReport {
    pub headers: Vec<String>,
    pub selected: Vec<Vec<String>>,
    pub all: Vec<Vec<String>>,
}

impl SelectionReport {
    /// File name of the report, encoding the number of selected conformers.
    pub fn file_name(&self) -> String {
        format!("selected{}conformers.csv", self.selected.len())
    }

    /// Writes the selected rows, the section marker line, then the full table, each
    /// table section with its own header line.
    pub fn write_to(&self, writer: &mut impl Write) -> Result<(), ReportError> {
        Self::write_section(&mut *writer, &self.headers, &self.selected)?;
        writeln!(writer, "{}", SECTION_MARKER)?;
        Self::write_section(&mut *writer, &self.headers, &self.all)?;
        Ok(())
    }

    pub fn write_to_path(&self, path: &Path) -> Result<(), ReportError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    fn write_section<W: Write>(
        writer: W,
        headers: &[String],
        rows: &[Vec<String>],
    ) -> Result<(), ReportError> {
        let mut csv_writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(writer);
        csv_writer.write_record(headers)?;
        for row in rows {
            csv_writer.write_record(row)?;
        }
        csv_writer
            .into_inner()
            .map_err(|e| ReportError::Finalize(e.error().to_string()))?;
        Ok(())
    }
}
