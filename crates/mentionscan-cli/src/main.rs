use clap::{Parser, Subcommand};

mod search;
mod store;

#[derive(Debug, Parser)]
#[command(name = "mentionscan")]
#[command(about = "Keyword mention search across social platforms")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run a keyword search and print the merged results.
    Search(search::SearchArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Search(args) => search::run(args).await,
    }
}
