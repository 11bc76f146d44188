//! Lloyd's K-means with k-means++ seeding and multiple restarts.

use super::config::KMeansConfig;
use super::features::FeatureMatrix;
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Error, PartialEq)]
pub enum KMeansError {
    #[error("Cannot fit {k} clusters to {samples} samples")]
    InvalidClusterCount { k: usize, samples: usize },
}

/// Outcome of the best restart for one k.
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansFit {
    pub k: usize,
    /// Cluster label of each row, in `0..k`.
    pub labels: Vec<usize>,
    /// Row-major `k × features` centroid coordinates.
    pub centroids: Vec<f64>,
    /// Sum of squared distances from each row to its centroid.
    pub inertia: f64,
    pub iterations: usize,
}

#[inline]
fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

pub struct KMeans {
    k: usize,
    config: KMeansConfig,
}

impl KMeans {
    pub fn new(k: usize, config: KMeansConfig) -> Self {
        Self { k, config }
    }

    /// Fits `restarts` independent runs and keeps the one with the lowest inertia.
    pub fn fit(
        &self,
        data: &FeatureMatrix,
        rng: &mut impl Rng,
    ) -> Result<KMeansFit, KMeansError> {
        let n = data.nrows();
        if self.k == 0 || self.k > n {
            return Err(KMeansError::InvalidClusterCount {
                k: self.k,
                samples: n,
            });
        }
        let threshold = self.config.tolerance * mean_variance(data);

        let mut best: Option<KMeansFit> = None;
        for restart in 0..self.config.restarts.max(1) {
            let fit = self.fit_once(data, threshold, rng);
            trace!(
                k = self.k,
                restart,
                inertia = fit.inertia,
                iterations = fit.iterations,
                "K-means restart finished."
            );
            if best.as_ref().is_none_or(|b| fit.inertia < b.inertia) {
                best = Some(fit);
            }
        }
        best.ok_or(KMeansError::InvalidClusterCount {
            k: self.k,
            samples: n,
        })
    }

    fn fit_once(&self, data: &FeatureMatrix, threshold: f64, rng: &mut impl Rng) -> KMeansFit {
        let dim = data.ncols();
        let mut centroids = self.seed_centroids(data, rng);
        let mut labels = vec![0; data.nrows()];
        let mut iterations = 0;

        while iterations < self.config.max_iterations {
            iterations += 1;
            assign(data, &centroids, dim, &mut labels);
            let updated = self.update_centroids(data, &centroids, &labels);
            let shift = squared_distance(&centroids, &updated);
            centroids = updated;
            if shift <= threshold {
                break;
            }
        }

        let inertia = assign(data, &centroids, dim, &mut labels);
        KMeansFit {
            k: self.k,
            labels,
            centroids,
            inertia,
            iterations,
        }
    }

    /// k-means++: the first centroid is a uniformly drawn row, every further one is
    /// drawn with probability proportional to its squared distance to the nearest
    /// centroid chosen so far.
    fn seed_centroids(&self, data: &FeatureMatrix, rng: &mut impl Rng) -> Vec<f64> {
        let n = data.nrows();
        let mut centroids = Vec::with_capacity(self.k * data.ncols());
        let first = rng.gen_range(0..n);
        centroids.extend_from_slice(data.row(first));

        let mut closest: Vec<f64> = data
            .rows()
            .map(|row| squared_distance(row, data.row(first)))
            .collect();
        for _ in 1..self.k {
            let next = match WeightedIndex::new(&closest) {
                Ok(dist) => dist.sample(rng),
                // Every row already coincides with a centroid.
                Err(_) => rng.gen_range(0..n),
            };
            let chosen = data.row(next);
            centroids.extend_from_slice(chosen);
            for (d, row) in closest.iter_mut().zip(data.rows()) {
                *d = d.min(squared_distance(row, chosen));
            }
        }
        centroids
    }

    /// Mean of the rows in each cluster. An emptied cluster is moved onto the row
    /// farthest from its current centroid.
    fn update_centroids(
        &self,
        data: &FeatureMatrix,
        previous: &[f64],
        labels: &[usize],
    ) -> Vec<f64> {
        let dim = data.ncols();
        let mut sums = vec![0.0; self.k * dim];
        let mut counts = vec![0usize; self.k];
        for (row, &label) in data.rows().zip(labels) {
            counts[label] += 1;
            for (s, v) in sums[label * dim..(label + 1) * dim].iter_mut().zip(row) {
                *s += v;
            }
        }

        let mut taken = Vec::new();
        for c in 0..self.k {
            let centroid = &mut sums[c * dim..(c + 1) * dim];
            if counts[c] > 0 {
                let count = counts[c] as f64;
                centroid.iter_mut().for_each(|s| *s /= count);
                continue;
            }
            let farthest = (0..data.nrows())
                .filter(|i| !taken.contains(i))
                .max_by(|&a, &b| {
                    let own = |i: usize| &previous[labels[i] * dim..(labels[i] + 1) * dim];
                    squared_distance(data.row(a), own(a))
                        .total_cmp(&squared_distance(data.row(b), own(b)))
                });
            if let Some(i) = farthest {
                taken.push(i);
                centroid.copy_from_slice(data.row(i));
            }
        }
        sums
    }
}

/// Assigns every row to its nearest centroid (lowest index on ties) and returns the
/// resulting inertia.
fn assign(data: &FeatureMatrix, centroids: &[f64], dim: usize, labels: &mut [usize]) -> f64 {
    let k = if dim == 0 { 1 } else { centroids.len() / dim };
    let mut inertia = 0.0;
    for (row, label) in data.rows().zip(labels.iter_mut()) {
        let (best, best_d) = (0..k)
            .map(|c| (c, squared_distance(row, &centroids[c * dim..(c + 1) * dim])))
            .fold((0, f64::INFINITY), |acc, (c, d)| {
                if d < acc.1 { (c, d) } else { acc }
            });
        *label = best;
        inertia += best_d;
    }
    inertia
}

/// Mean per-column variance, used to make the tolerance scale-free.
fn mean_variance(data: &FeatureMatrix) -> f64 {
    let (n, dim) = (data.nrows(), data.ncols());
    if n == 0 || dim == 0 {
        return 0.0;
    }
    let total: f64 = (0..dim)
        .map(|c| {
            let mean = data.rows().map(|r| r[c]).sum::<f64>() / n as f64;
            data.rows().map(|r| (r[c] - mean).powi(2)).sum::<f64>() / n as f64
        })
        .sum();
    total / dim as f64
}
