use clap::Parser;
use fex::{
    cli::FexCLI,
    config::Config,
    dispatch::Dispatcher,
    repl::{banner, Repl},
    system::HostSystem,
};
use miette::{IntoDiagnostic, Result};

fn main() -> Result<()> {
    let cli = FexCLI::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .init();

    let config = Config::load_or_create(&cli.config_path).into_diagnostic()?;

    let start = match cli.directory {
        Some(dir) => dir,
        None => std::env::current_dir().into_diagnostic()?,
    };
    let system = HostSystem::new(start, config.clone()).into_diagnostic()?;
    let dispatcher = Dispatcher::new(system, &config);

    println!("{}", banner(&config));

    Repl::run(dispatcher)?;

    Ok(())
}
