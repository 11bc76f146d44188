use crate::engine::config::ClusteringConfig;
use crate::engine::error::EngineError;
use crate::engine::features::{self, PopulationFeatures};
use crate::engine::knee;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::sweep::{self, SweepResult};
use std::path::Path;
use tracing::{info, instrument};

/// Result of clustering one population of conformers.
#[derive(Debug, Clone)]
pub struct ClusteringOutcome {
    pub features: PopulationFeatures,
    pub sweep: SweepResult,
    /// Position of the chosen k within `sweep.fits`.
    pub best_index: usize,
    pub best_k: usize,
    /// Cluster label of every conformer at the chosen k, in input order.
    pub labels: Vec<usize>,
}

impl ClusteringOutcome {
    /// Hydrogen-bond labels of every conformer, in input order.
    pub fn hydrogen_bonds(&self) -> &[Vec<String>] {
        &self.features.hydrogen_bonds
    }

    /// File name of the diagnostic elbow plot, naming the last swept k and the chosen one.
    pub fn elbow_plot_name(&self, extension: &str) -> String {
        let max_k = self.sweep.fits.last().map_or(self.best_k, |f| f.k);
        format!("elbow_max{}_best{}.{}", max_k, self.best_k, extension)
    }
}

/// Parses every geometry file, clusters the population for every candidate k and
/// keeps the labels of the k at the knee of the inertia curve.
#[instrument(skip_all, name = "clustering_workflow")]
pub fn run<P: AsRef<Path>>(
    paths: &[P],
    config: &ClusteringConfig,
    reporter: &ProgressReporter,
) -> Result<ClusteringOutcome, EngineError> {
    if paths.is_empty() {
        return Err(EngineError::EmptyPopulation);
    }

    // === Phase 1: Feature assembly ===
    let features = reporter.phase("Feature Assembly", || {
        info!("Building features for {} conformers.", paths.len());
        features::build_from_paths(paths, config.criteria)
    })?;

    // === Phase 2: K-means sweep ===
    let sweep = reporter.phase("K-means Sweep", || {
        sweep::run(&features.matrix, config, reporter)
    })?;

    // === Phase 3: Knee selection ===
    let ks: Vec<f64> = sweep.ks().into_iter().map(|k| k as f64).collect();
    let best_index = knee::find_knee(&ks, &sweep.inertias())?;
    let best = &sweep.fits[best_index];
    let (best_k, labels) = (best.k, best.labels.clone());
    reporter.report(Progress::Message(format!("Best number of clusters: {}", best_k)));
    info!("Best number of clusters is {}.", best_k);

    Ok(ClusteringOutcome {
        features,
        sweep,
        best_index,
        best_k,
        labels,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::engine::config::ClusteringConfigBuilder;
    use std::fs;
    use std::path::PathBuf;

    /// Writes `count` water dimers whose donor-acceptor separation falls into three
    /// well separated families.
    pub(crate) fn write_population(dir: &Path, count: usize) -> Vec<PathBuf> {
        (0..count)
            .map(|i| {
                let family = i % 3;
                let jitter = (i / 3) as f64 * 0.01;
                let separation = [1.8, 2.9, 4.0][family] + jitter;
                let acceptor = 0.96 + separation;
                let content = format!(
                    "%chk=conf{i}.chk\n# opt b3lyp/6-31g(d)\n\nconformer {i}\n\n0 1\n\
                     O 0.000000 0.000000 0.000000\n\
                     H 0.960000 0.000000 0.000000\n\
                     H -0.240000 0.930000 0.000000\n\
                     O {acceptor:.6} 0.000000 0.000000\n\
                     H {h1:.6} 0.930000 0.000000\n\
                     H {h2:.6} -0.930000 0.000000\n\n",
                    h1 = acceptor + 0.24,
                    h2 = acceptor + 0.24,
                );
                let path = dir.join(format!("conf{:02}.gjf", i));
                fs::write(&path, content).unwrap();
                path
            })
            .collect()
    }

    fn config(seed: u64) -> ClusteringConfig {
        ClusteringConfigBuilder::new()
            .max_k(7)
            .seed(seed)
            .build()
            .unwrap()
    }

    #[test]
    fn clustering_groups_conformers_by_family() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_population(dir.path(), 24);
        let outcome = run(&paths, &config(3), &ProgressReporter::new()).unwrap();

        assert_eq!(outcome.sweep.ks(), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(outcome.labels.len(), 24);
        assert_eq!(outcome.best_k, outcome.sweep.fits[outcome.best_index].k);
        assert!(outcome.labels.iter().all(|&l| l < outcome.best_k));
        assert_eq!(outcome.hydrogen_bonds()[0], vec!["O1-H2-O4"]);
        assert!(outcome.hydrogen_bonds()[2].is_empty());
        assert_eq!(
            outcome.elbow_plot_name("svg"),
            format!("elbow_max6_best{}.svg", outcome.best_k)
        );
    }

    #[test]
    fn clustering_is_idempotent_with_fixed_seed() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_population(dir.path(), 24);
        let first = run(&paths, &config(42), &ProgressReporter::new()).unwrap();
        let second = run(&paths, &config(42), &ProgressReporter::new()).unwrap();
        assert_eq!(first.labels, second.labels);
        assert_eq!(first.best_k, second.best_k);
        assert_eq!(first.sweep, second.sweep);
        assert_eq!(first.features.matrix, second.features.matrix);
    }

    #[test]
    fn empty_path_list_is_rejected() {
        let paths: Vec<PathBuf> = Vec::new();
        let err = run(&paths, &config(1), &ProgressReporter::new()).unwrap_err();
        assert!(matches!(err, EngineError::EmptyPopulation));
    }
}
