/// One row of the energy table.
///
/// `file` and `energy` are the typed columns the selector needs; `fields` keeps the
/// raw text of every column in its original order so the report can reproduce them.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyRecord {
    /// Conformer file identifier (first column).
    pub file: String,
    /// Conformer energy in kcal/mol.
    pub energy: f64,
    /// Raw text of all columns, including `file` and `energy`.
    pub fields: Vec<String>,
}

/// Everything the pipeline knows about one conformer after clustering.
#[derive(Debug, Clone, PartialEq)]
pub struct ConformerRecord {
    /// Zero-based row of the conformer in the energy table.
    pub row: usize,
    pub file: String,
    /// Energy in kcal/mol.
    pub energy: f64,
    /// Feature row used for clustering (scaled distances followed by one-hot bonds).
    pub features: Vec<f64>,
    /// Hydrogen-bond labels in detection order.
    pub hydrogen_bonds: Vec<String>,
    cluster: Option<usize>,
}

impl ConformerRecord {
    pub fn new(
        row: usize,
        energy_record: &EnergyRecord,
        features: Vec<f64>,
        hydrogen_bonds: Vec<String>,
    ) -> Self {
        Self {
            row,
            file: energy_record.file.clone(),
            energy: energy_record.energy,
            features,
            hydrogen_bonds,
            cluster: None,
        }
    }

    pub fn cluster(&self) -> Option<usize> {
        self.cluster
    }

    /// Records the cluster this conformer was assigned to.
    ///
    /// Returns the previously assigned cluster if one was already set, in which case
    /// the stored value is left untouched.
    pub fn assign_cluster(&mut self, cluster: usize) -> Result<(), usize> {
        match self.cluster {
            Some(existing) => Err(existing),
            None => {
                self.cluster = Some(cluster);
                Ok(())
            }
        }
    }

    /// Hydrogen-bond labels joined into a single comma-separated cell.
    pub fn hydrogen_bonds_cell(&self) -> String {
        self.hydrogen_bonds.join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn energy_record() -> EnergyRecord {
        EnergyRecord {
            file: "conf1.gjf".to_string(),
            energy: -12.5,
            fields: vec!["conf1.gjf".to_string(), "-12.5".to_string()],
        }
    }

    #[test]
    fn new_record_copies_typed_fields_and_has_no_cluster() {
        let record = ConformerRecord::new(3, &energy_record(), vec![0.5], vec![]);
        assert_eq!(record.row, 3);
        assert_eq!(record.file, "conf1.gjf");
        assert_eq!(record.energy, -12.5);
        assert_eq!(record.cluster(), None);
    }

    #[test]
    fn cluster_can_only_be_assigned_once() {
        let mut record = ConformerRecord::new(0, &energy_record(), vec![], vec![]);
        assert_eq!(record.assign_cluster(2), Ok(()));
        assert_eq!(record.assign_cluster(5), Err(2));
        assert_eq!(record.cluster(), Some(2));
    }

    #[test]
    fn hydrogen_bonds_cell_joins_labels_with_commas() {
        let record = ConformerRecord::new(
            0,
            &energy_record(),
            vec![],
            vec!["N1-H2-O3".to_string(), "O3-H4-N1".to_string()],
        );
        assert_eq!(record.hydrogen_bonds_cell(), "N1-H2-O3,O3-H4-N1");
    }
}
