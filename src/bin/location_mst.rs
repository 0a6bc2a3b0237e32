use clap::Parser;
use location_mst::config::{CommandLineArgs, Config};
use location_mst::controller::MstControllerBuilder;
use location_mst::logging::{init_logging, init_std_out_logging_thread_local};
use location_mst::scenario::Scenario;
use std::error::Error;
use std::sync::Arc;
use tracing::info;

fn main() -> Result<(), Box<dyn Error>> {
    let std_out_guard = init_std_out_logging_thread_local();

    let args = CommandLineArgs::parse();
    info!("Started with args: {:?}", args);

    // Load and adapt config
    let config = Arc::new(Config::try_from(args)?);

    // Switch to the configured logging, which may add a log file in the output directory
    drop(std_out_guard);
    let _log_guards = init_logging(&config);

    let scenario = Scenario::load(config)?;

    let result = MstControllerBuilder::default()
        .scenario(scenario)
        .build()?
        .run()?;

    info!(
        "Finished with {} tree edges and a total cost of {}",
        result.edges().len(),
        result.total_cost()
    );
    Ok(())
}
