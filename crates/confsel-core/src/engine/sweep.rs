use super::config::ClusteringConfig;
use super::error::EngineError;
use super::features::FeatureMatrix;
use super::kmeans::{KMeans, KMeansFit};
use super::progress::{Progress, ProgressReporter};
use rand::prelude::*;
use rand::rngs::StdRng;
use tracing::{debug, info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Inertia curve and labels of every candidate k, ordered by ascending k.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepResult {
    /// Base seed the per-k generators were derived from.
    pub seed: u64,
    pub fits: Vec<KMeansFit>,
}

impl SweepResult {
    pub fn len(&self) -> usize {
        self.fits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fits.is_empty()
    }

    pub fn ks(&self) -> Vec<usize> {
        self.fits.iter().map(|f| f.k).collect()
    }

    pub fn inertias(&self) -> Vec<f64> {
        self.fits.iter().map(|f| f.inertia).collect()
    }
}

/// Generator for one k, independent of which worker runs it.
fn rng_for(seed: u64, k: usize) -> StdRng {
    StdRng::seed_from_u64(seed ^ (k as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

fn fit_k(
    matrix: &FeatureMatrix,
    config: &ClusteringConfig,
    seed: u64,
    k: usize,
    reporter: &ProgressReporter,
) -> Result<KMeansFit, EngineError> {
    let fit = KMeans::new(k, config.kmeans).fit(matrix, &mut rng_for(seed, k))?;
    debug!(k, inertia = fit.inertia, iterations = fit.iterations, "Fitted k.");
    reporter.report(Progress::TaskIncrement);
    Ok(fit)
}

/// Runs K-means for every candidate k of `config.k_range`.
///
/// Fits run on a pool of `config.workers` threads (the global pool when unset);
/// the result keeps ascending-k order whatever the scheduling.
#[instrument(skip_all, name = "cluster_sweep")]
pub fn run(
    matrix: &FeatureMatrix,
    config: &ClusteringConfig,
    reporter: &ProgressReporter,
) -> Result<SweepResult, EngineError> {
    let conformers = matrix.nrows();
    let ks = config.k_range.candidates(conformers);
    if ks.is_empty() {
        return Err(EngineError::NoCandidates { conformers });
    }

    let seed = config.seed.unwrap_or_else(|| {
        let seed = thread_rng().r#gen();
        info!("No seed given; using {}.", seed);
        seed
    });
    info!(
        "Sweeping k over {:?} for {} conformers (seed {}).",
        ks, conformers, seed
    );

    reporter.report(Progress::TaskStart {
        total_steps: ks.len() as u64,
    });
    let fits = fit_all(matrix, config, seed, &ks, reporter)?;
    reporter.report(Progress::TaskFinish);

    Ok(SweepResult { seed, fits })
}

#[cfg(feature = "parallel")]
fn fit_all(
    matrix: &FeatureMatrix,
    config: &ClusteringConfig,
    seed: u64,
    ks: &[usize],
    reporter: &ProgressReporter,
) -> Result<Vec<KMeansFit>, EngineError> {
    let sweep = || {
        ks.par_iter()
            .map(|&k| fit_k(matrix, config, seed, k, reporter))
            .collect::<Result<Vec<_>, _>>()
    };
    match config.workers {
        Some(workers) => rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| EngineError::WorkerPool(e.to_string()))?
            .install(sweep),
        None => sweep(),
    }
}

#[cfg(not(feature = "parallel"))]
fn fit_all(
    matrix: &FeatureMatrix,
    config: &ClusteringConfig,
    seed: u64,
    ks: &[usize],
    reporter: &ProgressReporter,
) -> Result<Vec<KMeansFit>, EngineError> {
    ks.iter()
        .map(|&k| fit_k(matrix, config, seed, k, reporter))
        .collect()
}
