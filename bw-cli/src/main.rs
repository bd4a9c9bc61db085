//! BW CLI - Command line tool for bloomwatch region analyses.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "bw-cli",
    version,
    about = "Vegetation bloom analysis toolkit"
)]
struct Cli {
    #[command(flatten)]
    connection: bw_cmd::ConnectionArgs,

    #[command(subcommand)]
    command: bw_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    bw_cmd::run(cli.connection, cli.command).await
}
