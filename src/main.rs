use clap::Parser;
use close_forecast::logging::init_logging;
use close_forecast::{app, AppConfig, AppError, Cli};

fn main() {
    if let Err(error) = run() {
        eprintln!("{}", error.user_message());
        std::process::exit(error.exit_code());
    }
}

fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::resolve(&cli)?;
    init_logging(&config.logging.filter, cli.verbose)?;

    app::run(&cli, &config)
}
