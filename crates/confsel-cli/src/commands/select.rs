use crate::cli::SelectArgs;
use crate::config::PartialRunConfig;
use crate::error::{CliError, Result};
use crate::plot;
use crate::utils::progress::CliProgressHandler;
use confsel::{
    engine::progress::ProgressReporter,
    workflows::select::{self, SelectOptions},
};
use tracing::info;

pub fn run(args: SelectArgs, quiet: bool) -> Result<()> {
    if !args.energy_file.is_file() {
        return Err(CliError::Argument(format!(
            "Energy file not found: {}",
            args.energy_file.display()
        )));
    }

    info!("Merging configuration from file and CLI arguments...");
    let config = PartialRunConfig::load(&args.clustering)?.merge_with_cli(&args.clustering)?;

    let progress_handler = if quiet {
        CliProgressHandler::hidden()
    } else {
        CliProgressHandler::new()
    };
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    let options = SelectOptions {
        output_dir: args.output_dir.clone(),
    };

    println!(
        "Clustering conformers listed in {}...",
        args.energy_file.display()
    );
    info!("Invoking the core selection workflow...");
    let outcome = select::run(&args.energy_file, &config, &options, &reporter)?;

    println!(
        "✓ Best number of clusters: {} (swept k = {:?})",
        outcome.clustering.best_k,
        outcome.clustering.sweep.ks()
    );
    println!(
        "✓ Selected conformers written to: {}",
        outcome.report_path.display()
    );
    println!(
        "✓ Copied {} conformer file(s) to: {}",
        outcome.copied.len(),
        args.output_dir.join(select::SELECTED_DIR).display()
    );

    if args.clustering.plot {
        let plot_path = plot::write_elbow_plot(&outcome.clustering, &args.output_dir)?;
        println!("✓ Elbow plot written to: {}", plot_path.display());
    }

    Ok(())
}
