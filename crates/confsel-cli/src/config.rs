use crate::cli::ClusteringArgs;
use crate::error::{CliError, Result};
use confsel::engine::config as core_config;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialGeometryConfig {
    #[serde(rename = "bond-length-max")]
    bond_length_max: Option<f64>,
    #[serde(rename = "hbond-length-max")]
    hbond_length_max: Option<f64>,
    #[serde(rename = "distance-cutoff")]
    distance_cutoff: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialClusteringConfig {
    #[serde(rename = "min-k")]
    min_k: Option<usize>,
    #[serde(rename = "max-k")]
    max_k: Option<usize>,
    #[serde(rename = "k-step")]
    k_step: Option<usize>,
    restarts: Option<usize>,
    #[serde(rename = "max-iterations")]
    max_iterations: Option<usize>,
    tolerance: Option<f64>,
    seed: Option<u64>,
    workers: Option<usize>,
}

/// The TOML configuration file; every key is optional.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialRunConfig {
    geometry: Option<PartialGeometryConfig>,
    clustering: Option<PartialClusteringConfig>,
}

impl PartialRunConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Loads the file named by `--config`, or starts from an empty configuration.
    pub fn load(args: &ClusteringArgs) -> Result<Self> {
        match &args.config {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Resolves every value with the precedence `-S` > dedicated flag > file > default.
    pub fn merge_with_cli(
        mut self,
        args: &ClusteringArgs,
    ) -> Result<core_config::ClusteringConfig> {
        let geometry = self.geometry.take().unwrap_or_default();
        let mut clustering = self.clustering.take().unwrap_or_default();
        clustering.seed = args.seed.or(clustering.seed);
        clustering.min_k = args.min_k.or(clustering.min_k);
        clustering.max_k = args.max_k.or(clustering.max_k);
        clustering.k_step = args.k_step.or(clustering.k_step);
        clustering.restarts = args.restarts.or(clustering.restarts);
        self.geometry = Some(geometry);
        self.clustering = Some(clustering);

        self.apply_set_values(&args.set_values)?;

        let geometry = self.geometry.unwrap_or_default();
        let clustering = self.clustering.unwrap_or_default();

        let mut builder = core_config::ClusteringConfigBuilder::new();
        if let Some(v) = geometry.bond_length_max {
            builder = builder.bond_length_max(v);
        }
        if let Some(v) = geometry.hbond_length_max {
            builder = builder.hbond_length_max(v);
        }
        if let Some(v) = geometry.distance_cutoff {
            builder = builder.distance_cutoff(v);
        }
        if let Some(v) = clustering.min_k {
            builder = builder.min_k(v);
        }
        if let Some(v) = clustering.max_k {
            builder = builder.max_k(v);
        }
        if let Some(v) = clustering.k_step {
            builder = builder.k_step(v);
        }
        if let Some(v) = clustering.restarts {
            builder = builder.restarts(v);
        }
        if let Some(v) = clustering.max_iterations {
            builder = builder.max_iterations(v);
        }
        if let Some(v) = clustering.tolerance {
            builder = builder.tolerance(v);
        }
        if let Some(v) = clustering.seed {
            builder = builder.seed(v);
        }
        if let Some(v) = clustering.workers {
            builder = builder.workers(v);
        }

        builder.build().map_err(|e| CliError::Config(e.to_string()))
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };
            let (key, value_str) = (key.trim(), value_str.trim());
            let geometry = || -> PartialGeometryConfig { Default::default() };
            let clustering = || -> PartialClusteringConfig { Default::default() };

            match key {
                "geometry.bond-length-max" => {
                    self.geometry.get_or_insert_with(geometry).bond_length_max =
                        Some(parse_value(key, value_str)?);
                }
                "geometry.hbond-length-max" => {
                    self.geometry.get_or_insert_with(geometry).hbond_length_max =
                        Some(parse_value(key, value_str)?);
                }
                "geometry.distance-cutoff" => {
                    self.geometry.get_or_insert_with(geometry).distance_cutoff =
                        Some(parse_value(key, value_str)?);
                }
                "clustering.min-k" => {
                    self.clustering.get_or_insert_with(clustering).min_k =
                        Some(parse_value(key, value_str)?);
                }
                "clustering.max-k" => {
                    self.clustering.get_or_insert_with(clustering).max_k =
                        Some(parse_value(key, value_str)?);
                }
                "clustering.k-step" => {
                    self.clustering.get_or_insert_with(clustering).k_step =
                        Some(parse_value(key, value_str)?);
                }
                "clustering.restarts" => {
                    self.clustering.get_or_insert_with(clustering).restarts =
                        Some(parse_value(key, value_str)?);
                }
                "clustering.max-iterations" => {
                    self.clustering.get_or_insert_with(clustering).max_iterations =
                        Some(parse_value(key, value_str)?);
                }
                "clustering.tolerance" => {
                    self.clustering.get_or_insert_with(clustering).tolerance =
                        Some(parse_value(key, value_str)?);
                }
                "clustering.seed" => {
                    self.clustering.get_or_insert_with(clustering).seed =
                        Some(parse_value(key, value_str)?);
                }
                "clustering.workers" => {
                    self.clustering.get_or_insert_with(clustering).workers =
                        Some(parse_value(key, value_str)?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        CliError::Config(format!(
            "Invalid {} value for {}: {}",
            std::any::type_name::<T>(),
            key,
            value
        ))
    })
}
