use clap::Parser;
use miette::Result;
use pxedit::cli::{self, Cli, Commands};
use pxedit::output::Printer;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_env("PXEDIT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let printer = Printer::new();

    match cli.command {
        Commands::Swatch(args) => {
            let config = cli::load_config(cli.config.as_deref())?;
            cli::swatch::run(args, &config, &printer)?
        }
        Commands::Animate(args) => cli::animate::run(args, &printer)?,
        Commands::Resize(args) => {
            let config = cli::load_config(cli.config.as_deref())?;
            cli::resize::run(args, &config, &printer)?
        }
        Commands::Init(args) => cli::init::run(args, &printer)?,
        Commands::Completions(args) => cli::completions::run(args)?,
    }

    Ok(())
}
