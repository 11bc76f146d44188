use crate::core::hbonds::{DEFAULT_BOND_LENGTH_MAX, DEFAULT_HBOND_LENGTH_MAX};
use thiserror::Error;

pub const DEFAULT_DISTANCE_CUTOFF: f64 = 2.5;
pub const DEFAULT_MIN_K: usize = 1;
pub const DEFAULT_K_STEP: usize = 1;
/// The default sweep stops below `conformers / DEFAULT_K_DIVISOR`.
pub const DEFAULT_K_DIVISOR: usize = 5;
pub const DEFAULT_RESTARTS: usize = 10;
pub const DEFAULT_MAX_ITERATIONS: usize = 300;
pub const DEFAULT_TOLERANCE: f64 = 1e-4;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Invalid value for '{param}': {reason}")]
    InvalidValue { param: &'static str, reason: String },
}

/// Distance thresholds used while turning geometries into features, in Angstroms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryCriteria {
    /// Maximum N/O/F–H distance treated as a covalent bond.
    pub bond_length_max: f64,
    /// Maximum N/O/F···H distance treated as a hydrogen-bond contact.
    pub hbond_length_max: f64,
    /// Distance columns whose population minimum reaches this value are dropped.
    pub distance_cutoff: f64,
}

impl Default for GeometryCriteria {
    fn default() -> Self {
        Self {
            bond_length_max: DEFAULT_BOND_LENGTH_MAX,
            hbond_length_max: DEFAULT_HBOND_LENGTH_MAX,
            distance_cutoff: DEFAULT_DISTANCE_CUTOFF,
        }
    }
}

/// Candidate cluster counts for the sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KRange {
    pub min_k: usize,
    /// Exclusive upper bound. `None` derives it from the population size.
    pub max_k: Option<usize>,
    pub step: usize,
}

impl Default for KRange {
    fn default() -> Self {
        Self {
            min_k: DEFAULT_MIN_K,
            max_k: None,
            step: DEFAULT_K_STEP,
        }
    }
}

impl KRange {
    /// Candidate ks for a population of `conformers`, ascending.
    ///
    /// Without an explicit bound the range ends below `conformers / 5`. Values larger
    /// than the population are never produced.
    pub fn candidates(&self, conformers: usize) -> Vec<usize> {
        let upper = self
            .max_k
            .unwrap_or(conformers / DEFAULT_K_DIVISOR)
            .min(conformers + 1);
        (self.min_k.max(1)..upper).step_by(self.step.max(1)).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KMeansConfig {
    /// Number of k-means++ initializations per k; the lowest inertia wins.
    pub restarts: usize,
    pub max_iterations: usize,
    /// Convergence tolerance relative to the mean per-feature variance.
    pub tolerance: f64,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            restarts: DEFAULT_RESTARTS,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClusteringConfig {
    pub criteria: GeometryCriteria,
    pub k_range: KRange,
    pub kmeans: KMeansConfig,
    /// Base seed for all random draws. `None` draws one from the thread RNG.
    pub seed: Option<u64>,
    /// Size of the worker pool for the sweep. `None` uses all logical cores.
    pub workers: Option<usize>,
}

#[derive(Default)]
pub struct ClusteringConfigBuilder {
    bond_length_max: Option<f64>,
    hbond_length_max: Option<f64>,
    distance_cutoff: Option<f64>,
    min_k: Option<usize>,
    max_k: Option<usize>,
    k_step: Option<usize>,
    restarts: Option<usize>,
    max_iterations: Option<usize>,
    tolerance: Option<f64>,
    seed: Option<u64>,
    workers: Option<usize>,
}

impl ClusteringConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bond_length_max(mut self, length: f64) -> Self {
        self.bond_length_max = Some(length);
        self
    }
    pub fn hbond_length_max(mut self, length: f64) -> Self {
        self.hbond_length_max = Some(length);
        self
    }
    pub fn distance_cutoff(mut self, cutoff: f64) -> Self {
        self.distance_cutoff = Some(cutoff);
        self
    }
    pub fn min_k(mut self, k: usize) -> Self {
        self.min_k = Some(k);
        self
    }
    pub fn max_k(mut self, k: usize) -> Self {
        self.max_k = Some(k);
        self
    }
    pub fn k_step(mut self, step: usize) -> Self {
        self.k_step = Some(step);
        self
    }
    pub fn restarts(mut self, restarts: usize) -> Self {
        self.restarts = Some(restarts);
        self
    }
    pub fn max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = Some(iterations);
        self
    }
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn build(self) -> Result<ClusteringConfig, ConfigError> {
        let criteria = GeometryCriteria {
            bond_length_max: positive(
                "bond_length_max",
                self.bond_length_max,
                DEFAULT_BOND_LENGTH_MAX,
            )?,
            hbond_length_max: positive(
                "hbond_length_max",
                self.hbond_length_max,
                DEFAULT_HBOND_LENGTH_MAX,
            )?,
            distance_cutoff: positive(
                "distance_cutoff",
                self.distance_cutoff,
                DEFAULT_DISTANCE_CUTOFF,
            )?,
        };
        if criteria.hbond_length_max <= criteria.bond_length_max {
            return Err(ConfigError::InvalidValue {
                param: "hbond_length_max",
                reason: format!(
                    "must exceed bond_length_max ({} <= {})",
                    criteria.hbond_length_max, criteria.bond_length_max
                ),
            });
        }

        let k_range = KRange {
            min_k: at_least_one("min_k", self.min_k.unwrap_or(DEFAULT_MIN_K))?,
            max_k: self.max_k,
            step: at_least_one("k_step", self.k_step.unwrap_or(DEFAULT_K_STEP))?,
        };
        if let Some(max_k) = k_range.max_k {
            if max_k <= k_range.min_k {
                return Err(ConfigError::InvalidValue {
                    param: "max_k",
                    reason: format!(
                        "exclusive bound {} must exceed min_k {}",
                        max_k, k_range.min_k
                    ),
                });
            }
        }

        let kmeans = KMeansConfig {
            restarts: at_least_one("restarts", self.restarts.unwrap_or(DEFAULT_RESTARTS))?,
            max_iterations: at_least_one(
                "max_iterations",
                self.max_iterations.unwrap_or(DEFAULT_MAX_ITERATIONS),
            )?,
            tolerance: non_negative("tolerance", self.tolerance.unwrap_or(DEFAULT_TOLERANCE))?,
        };

        let workers = match self.workers {
            Some(w) => Some(at_least_one("workers", w)?),
            None => None,
        };

        Ok(ClusteringConfig {
            criteria,
            k_range,
            kmeans,
            seed: self.seed,
            workers,
        })
    }
}

fn positive(param: &'static str, value: Option<f64>, default: f64) -> Result<f64, ConfigError> {
    let value = value.unwrap_or(default);
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::InvalidValue {
            param,
            reason: format!("must be a positive distance, got {}", value),
        })
    }
}

fn non_negative(param: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::InvalidValue {
            param,
            reason: format!("must be non-negative, got {}", value),
        })
    }
}

fn at_least_one(param: &'static str, value: usize) -> Result<usize, ConfigError> {
    if value >= 1 {
        Ok(value)
    } else {
        Err(ConfigError::InvalidValue {
            param,
            reason: "must be at least 1".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_without_overrides_yields_defaults() {
        let config = ClusteringConfigBuilder::new().build().unwrap();
        assert_eq!(config, ClusteringConfig::default());
        assert_eq!(config.criteria.bond_length_max, 1.2);
        assert_eq!(config.criteria.hbond_length_max, 2.5);
        assert_eq!(config.criteria.distance_cutoff, 2.5);
        assert_eq!(config.kmeans.restarts, 10);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn builder_applies_overrides() {
        let config = ClusteringConfigBuilder::new()
            .min_k(2)
            .max_k(20)
            .k_step(5)
            .restarts(3)
            .seed(42)
            .workers(4)
            .build()
            .unwrap();
        assert_eq!(
            config.k_range,
            KRange {
                min_k: 2,
                max_k: Some(20),
                step: 5
            }
        );
        assert_eq!(config.kmeans.restarts, 3);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.workers, Some(4));
    }

    #[test]
    fn builder_rejects_zero_counts() {
        let err = ClusteringConfigBuilder::new().restarts(0).build().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { param: "restarts", .. }));
        let err = ClusteringConfigBuilder::new().workers(0).build().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { param: "workers", .. }));
    }

    #[test]
    fn builder_rejects_inverted_cutoffs() {
        let err = ClusteringConfigBuilder::new()
            .bond_length_max(2.0)
            .hbond_length_max(1.5)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                param: "hbond_length_max",
                ..
            }
        ));
    }

    #[test]
    fn builder_rejects_empty_explicit_k_range() {
        let err = ClusteringConfigBuilder::new().min_k(4).max_k(4).build().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { param: "max_k", .. }));
    }

    #[test]
    fn default_candidates_end_below_a_fifth_of_the_population() {
        let range = KRange::default();
        assert_eq!(range.candidates(30), vec![1, 2, 3, 4, 5]);
        assert!(range.candidates(9).is_empty());
    }

    #[test]
    fn candidates_honor_step_and_population_size() {
        let range = KRange {
            min_k: 1,
            max_k: Some(100),
            step: 5,
        };
        assert_eq!(range.candidates(12), vec![1, 6, 11]);
    }
}
