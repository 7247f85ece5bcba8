use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before clap reads RESONANCE_API_URL.
    dotenvy::dotenv().ok();

    let args = cli::Cli::parse();
    resonance::logging::init(args.verbose);

    cli::run(args).await
}
