use crate::cli::ClusterArgs;
use crate::config::PartialRunConfig;
use crate::error::{CliError, Result};
use crate::plot;
use crate::utils::progress::CliProgressHandler;
use confsel::{engine::progress::ProgressReporter, workflows::cluster};
use std::path::{Path, PathBuf};
use tracing::info;

pub fn run(args: ClusterArgs, quiet: bool) -> Result<()> {
    let files = discover_files(&args.directory, &args.extension)?;
    info!(
        "Found {} '.{}' file(s) in {}",
        files.len(),
        args.extension,
        args.directory.display()
    );

    let config = PartialRunConfig::load(&args.clustering)?.merge_with_cli(&args.clustering)?;
    let progress_handler = if quiet {
        CliProgressHandler::hidden()
    } else {
        CliProgressHandler::new()
    };
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    let outcome = cluster::run(&files, &config, &reporter)?;

    for (file, label) in files.iter().zip(&outcome.labels) {
        println!("{} {}", file.display(), label);
    }

    if args.clustering.plot {
        let plot_path = plot::write_elbow_plot(&outcome, Path::new("."))?;
        println!("✓ Elbow plot written to: {}", plot_path.display());
    }

    Ok(())
}

/// Files in `directory` with the given extension, sorted by name.
fn discover_files(directory: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let extension = extension.trim_start_matches('.');
    let mut files: Vec<PathBuf> = std::fs::read_dir(directory)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
        })
        .collect();
    files.sort();

    if files.is_empty() {
        return Err(CliError::Argument(format!(
            "No '.{}' files found in {}",
            extension,
            directory.display()
        )));
    }
    Ok(files)
}
