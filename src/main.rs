use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::info;

use saber::config::Config;
use saber::processing::{BatchProcessor, run_scenario};

#[derive(Debug, Parser)]
#[command(name = "saber", version, about = "Shallow-water reflectance forward model")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a single scenario and print the spectra
    Run {
        #[arg(short, long, default_value = "./data/config/scenario.json")]
        config: PathBuf,
    },
    /// Run the scenario over every pixel of the configured rasters
    Batch {
        #[arg(short, long, default_value = "./data/config/scenario.json")]
        config: PathBuf,
        /// Directory receiving one rrs_<wavelength>.tif per band
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Run { config } => {
            let config = Config::from_file(&config)?;
            let result = run_scenario(&config)?;
            println!("{result}");
        }
        Command::Batch { config, output } => {
            info!("saber {} batch run from {}", saber::version(), config.display());
            let config = Config::from_file(&config)?;

            let processor = BatchProcessor::new(config);
            let result = processor.process()?;
            let written = result.write(&output)?;

            println!(
                "Wrote {} reflectance rasters to {} ({} pixels skipped)",
                written.len(),
                output.display(),
                result.skipped
            );
        }
    }

    Ok(())
}
