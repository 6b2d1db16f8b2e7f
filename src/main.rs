use bulwark::cli::{check, run, status, CheckCommand, Cli, Commands};
use clap::Parser;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Run(args) => run::execute(args).await,
        Commands::Status(args) => status::execute(&args.config, args.json),
        Commands::Check(CheckCommand::Config(arg)) => check::execute_config(&arg.config),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
