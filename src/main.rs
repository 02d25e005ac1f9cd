use anyhow::Result;
use bugdash::cli::{self, Commands};
use bugdash::commands;
use bugdash::config::load_config;
use bugdash::observability::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::parse_args();
    init_tracing(cli.verbosity, cli.quiet);

    let config_path = cli.config.clone();
    match cli.into_command() {
        Commands::Init { force } => commands::init_config(&std::env::current_dir()?, force),
        Commands::Serve(args) => {
            let mut config = load_config(config_path.as_deref())?;
            args.apply(&mut config);
            commands::run_serve(config).await
        }
        Commands::Report(args) => {
            let mut config = load_config(config_path.as_deref())?;
            args.apply(&mut config);
            commands::run_report(&config, args.breakdown).await
        }
    }
}
