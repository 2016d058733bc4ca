//! forgechain deploys a hand-maintained graph of contracts with `forge create`,
//! feeding each deployed address into the constructor arguments of later contracts.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;

use cli::Cli;
use forgechain_deploy::{BatchOptions, Config, Credentials, Driver, report};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize the logger. Stdout is reserved for the state dump.
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config.tool);

    tracing::info!(
        rpc_url = %cli.rpc_url,
        binary = %config.tool.binary,
        extractor = %config.tool.extractor,
        order = %cli.order,
        contracts = ?cli.contracts,
        "Deploying contracts..."
    );

    let options = BatchOptions {
        ordering: cli.order,
        skip_deployed: cli.skip_deployed,
    };

    let mut driver = Driver::new(
        config.registry(),
        config.tool,
        Credentials::new(cli.rpc_url, cli.private_key),
    );

    let result = driver.deploy_batch(&cli.contracts, options).await;

    // Printed on failure too, so the addresses recorded before the error are not lost.
    let dump = report::render(driver.registry(), &cli.contracts, cli.dump)?;
    println!("{dump}");

    let report = result.context("Deployment batch failed")?;
    tracing::info!(
        deployed = report.deployed.len(),
        skipped = report.skipped.len(),
        "Deployment complete"
    );

    Ok(())
}
