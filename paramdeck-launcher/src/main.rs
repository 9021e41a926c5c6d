mod cli;
mod commands;

use clap::Parser;
use cli::Command;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = cli::Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let store = cli.store_config()?.connect().await?;

    match cli.command {
        Command::Serve {
            host,
            port,
            dist_dir,
        } => commands::serve(store, host, port, dist_dir).await?,
        Command::Show { json } => print!("{}", commands::show(store.as_ref(), json).await?),
        Command::Set(args) => print!("{}", commands::set(store.as_ref(), &args).await?),
        Command::Reset => print!("{}", commands::reset(store.as_ref()).await?),
    }
    Ok(())
}
